use super::AssetResolver;
use crate::config::AssetConfig;

/// Vertex and fragment source text for the demo program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Reads both stages. A stage that cannot be read is logged and left
    /// empty, so the failure surfaces again as a compile error rather than
    /// stopping startup.
    pub fn load_or_empty(resolver: &AssetResolver, config: &AssetConfig) -> Self {
        let read = |name: &str| match resolver.read_text(name) {
            Ok(text) => text,
            Err(e) => {
                log::error!("{}", e);
                String::new()
            }
        };

        Self {
            vertex: read(&config.vertex_shader),
            fragment: read(&config.fragment_shader),
        }
    }
}

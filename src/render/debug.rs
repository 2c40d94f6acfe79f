//! Driver debug output (`GL_KHR_debug`) routed through `log`, with a
//! severity threshold deciding when a message is fatal.

use gl::types::*;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::ffi::{c_void, CStr};
use std::ptr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Notification,
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn from_gl(severity: GLenum) -> Self {
        match severity {
            gl::DEBUG_SEVERITY_HIGH => Severity::High,
            gl::DEBUG_SEVERITY_MEDIUM => Severity::Medium,
            gl::DEBUG_SEVERITY_LOW => Severity::Low,
            _ => Severity::Notification,
        }
    }

    fn log_level(self) -> log::Level {
        match self {
            Severity::Notification => log::Level::Debug,
            Severity::Low => log::Level::Info,
            Severity::Medium | Severity::High => log::Level::Warn,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugAction {
    /// Log at error level and keep rendering.
    Log,
    /// Log, then stop the frame loop and exit with a failure status.
    Trap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugPolicy {
    pub threshold: Severity,
    pub action: DebugAction,
}

impl Default for DebugPolicy {
    fn default() -> Self {
        Self {
            threshold: Severity::Low,
            action: DebugAction::Trap,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Inform,
    Report,
    Fatal,
}

impl DebugPolicy {
    pub fn judge(&self, severity: Severity) -> Verdict {
        if severity < self.threshold {
            return Verdict::Inform;
        }
        match self.action {
            DebugAction::Log => Verdict::Report,
            DebugAction::Trap => Verdict::Fatal,
        }
    }
}

/// Receives driver messages and remembers the first fatal one.
#[derive(Debug)]
pub struct DebugOutput {
    policy: DebugPolicy,
    fault: RefCell<Option<String>>,
}

impl DebugOutput {
    pub fn new(policy: DebugPolicy) -> Self {
        Self {
            policy,
            fault: RefCell::new(None),
        }
    }

    pub fn record(&self, severity: Severity, message: &str) -> Verdict {
        let verdict = self.policy.judge(severity);
        match verdict {
            Verdict::Inform => log::log!(severity.log_level(), "GL: {}", message),
            Verdict::Report => log::error!("GL ({:?}): {}", severity, message),
            Verdict::Fatal => {
                log::error!("GL ({:?}), stopping: {}", severity, message);
                self.fault
                    .borrow_mut()
                    .get_or_insert_with(|| message.to_string());
            }
        }
        verdict
    }

    /// Takes the pending fatal message, if any.
    pub fn take_fault(&self) -> Option<String> {
        self.fault.borrow_mut().take()
    }
}

extern "system" fn message_callback(
    _source: GLenum,
    _gltype: GLenum,
    _id: GLuint,
    severity: GLenum,
    _length: GLsizei,
    message: *const GLchar,
    user_param: *mut c_void,
) {
    if user_param.is_null() || message.is_null() {
        return;
    }
    // SAFETY: user_param is the boxed DebugOutput owned by the DebugHook that
    // registered this callback, and the hook unregisters before freeing it.
    let output = unsafe { &*(user_param as *const DebugOutput) };
    let text = unsafe { CStr::from_ptr(message) }.to_string_lossy();
    output.record(Severity::from_gl(severity), &text);
}

/// Registers [`message_callback`] for the current context.
///
/// Output is synchronous so messages arrive on the rendering thread, inside
/// the GL call that caused them.
pub struct DebugHook {
    output: Box<DebugOutput>,
}

impl DebugHook {
    pub fn install(policy: DebugPolicy) -> Self {
        let output = Box::new(DebugOutput::new(policy));

        if gl::DebugMessageCallback::is_loaded() {
            unsafe {
                gl::Enable(gl::DEBUG_OUTPUT);
                gl::Enable(gl::DEBUG_OUTPUT_SYNCHRONOUS);
                gl::DebugMessageCallback(
                    Some(message_callback),
                    &*output as *const DebugOutput as *const c_void,
                );
            }
            log::info!("GL debug output enabled ({:?})", policy);
        } else {
            log::warn!("glDebugMessageCallback unavailable; driver messages will not be seen");
        }

        Self { output }
    }

    pub fn take_fault(&self) -> Option<String> {
        self.output.take_fault()
    }
}

impl Drop for DebugHook {
    fn drop(&mut self) {
        if gl::DebugMessageCallback::is_loaded() {
            unsafe {
                gl::DebugMessageCallback(None, ptr::null());
            }
        }
    }
}

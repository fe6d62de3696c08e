//! Bridge between the exported C symbols and the renderer
//!
//! This is the only place where failure changes representation. Panics are
//! caught here, every error becomes diagnostic text, and the text lands in
//! the calling thread's output buffer.

use std::any::Any;
use std::ffi::c_char;
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

use crate::buffer;
use crate::config::{self, ProbeConfig};
use crate::error::{INVALID_HANDLE, InstallError, NO_RUNTIME, RenderError};
use crate::handle::Sexp;
use crate::render::{self, Mode};
use crate::runtime::Runtime;

/// Runtime capability and limits set once by the host
struct Installed {
    runtime: &'static dyn Runtime,
    config: ProbeConfig,
}

static INSTALLED: OnceLock<Installed> = OnceLock::new();

/// Install the runtime capability and rendering limits
///
/// Call once at host startup, before any debugger call.
pub fn install(runtime: &'static dyn Runtime, config: ProbeConfig) -> Result<(), InstallError> {
    let max_nodes = config.max_nodes;
    INSTALLED
        .set(Installed { runtime, config })
        .map_err(|_| InstallError::AlreadyInstalled)?;
    tracing::info!(max_nodes, "sexp-probe runtime installed");
    Ok(())
}

/// Install the runtime with limits from the config file, or the defaults
pub fn install_with_config_file(runtime: &'static dyn Runtime) -> Result<(), InstallError> {
    install(runtime, config::load())
}

/// Whether a runtime has been installed
pub fn is_installed() -> bool {
    INSTALLED.get().is_some()
}

/// # Safety
///
/// `x` must be null or a live value of the installed runtime for the call.
pub unsafe fn print_value(x: Sexp) -> *const c_char {
    // SAFETY: forwarded from the caller.
    unsafe { respond(x, Mode::Print) }
}

/// # Safety
///
/// `x` must be null or a live value of the installed runtime for the call.
pub unsafe fn inspect_value(x: Sexp) -> *const c_char {
    // SAFETY: forwarded from the caller.
    unsafe { respond(x, Mode::Inspect) }
}

/// # Safety
///
/// `x` must be null or a live value of the installed runtime for the call.
pub unsafe fn display_value(x: Sexp) -> *const c_char {
    // SAFETY: forwarded from the caller.
    unsafe { respond(x, Mode::Display) }
}

unsafe fn respond(x: Sexp, mode: Mode) -> *const c_char {
    // SAFETY: forwarded from the caller.
    let text = unsafe { render_call(INSTALLED.get(), x, mode) };
    buffer::store(text)
}

/// Render `x`, turning a missing runtime or a panic into text
unsafe fn render_call(installed: Option<&Installed>, x: Sexp, mode: Mode) -> String {
    if x.is_null() {
        return INVALID_HANDLE.to_string();
    }
    let Some(installed) = installed else {
        return NO_RUNTIME.to_string();
    };

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: forwarded from the caller.
        unsafe { render::render(installed.runtime, &installed.config, x, mode) }
    }));
    result.unwrap_or_else(|payload| RenderError::Panic(panic_message(payload.as_ref())).to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic".to_string()
    }
}

//! Exported C symbols
//!
//! The debugger looks these up by name and calls them with a single value
//! handle: `const char* f(SEXP x)`. Each one forwards to the bridge without
//! inspecting its argument. The returned string belongs to the calling
//! thread's buffer and stays valid until that thread's next call.
//!
//! `include/debug.h` is generated from this file by `header-gen`.

use std::ffi::c_char;

use crate::bridge;
use crate::handle::Sexp;

/// Concise one-line representation of `x`
///
/// # Safety
///
/// `x` must be null or a live value of the installed runtime.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn print(x: Sexp) -> *const c_char {
    // SAFETY: forwarded from the caller.
    unsafe { bridge::print_value(x) }
}

/// Node-by-node structure of `x`
///
/// # Safety
///
/// `x` must be null or a live value of the installed runtime.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inspect(x: Sexp) -> *const c_char {
    // SAFETY: forwarded from the caller.
    unsafe { bridge::inspect_value(x) }
}

/// Console-style representation of `x`
///
/// # Safety
///
/// `x` must be null or a live value of the installed runtime.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn display(x: Sexp) -> *const c_char {
    // SAFETY: forwarded from the caller.
    unsafe { bridge::display_value(x) }
}

type Entry = unsafe extern "C" fn(Sexp) -> *const c_char;

/// Keeps the symbols alive when linked as a static library
#[used]
pub static EXPORTS: [Entry; 3] = [print, inspect, display];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbeConfig;
    use crate::test_utils::{TestHeap, TestRuntime};
    use std::ffi::CStr;

    fn setup() {
        // Tests share the process-wide install; the first one wins
        let _ = bridge::install(&TestRuntime, ProbeConfig::default());
    }

    fn call(f: Entry, x: Sexp) -> String {
        let ptr = unsafe { f(x) };
        let text = unsafe { CStr::from_ptr(ptr) };
        text.to_str().unwrap().to_string()
    }

    #[test]
    fn test_exported_symbols_render_strings() {
        setup();
        let heap = TestHeap::new();
        let x = heap.strings(&["a", "b", "c"]);

        assert_eq!(call(print, x), r#"["a", "b", "c"]"#);
        assert!(call(inspect, x).contains("[3]"));
        assert_eq!(call(display, x), r#"[1] "a" "b" "c""#);
    }

    #[test]
    fn test_null_handle_through_symbols() {
        setup();
        for f in EXPORTS {
            assert_eq!(call(f, std::ptr::null_mut()), "<invalid handle: NULL>");
        }
    }

    #[test]
    fn test_buffer_replaced_by_next_call() {
        setup();
        let heap = TestHeap::new();
        let first = unsafe { print(heap.integer(&[1])) };
        let first = unsafe { CStr::from_ptr(first) }.to_str().unwrap().to_string();
        let second = call(print, heap.integer(&[2]));
        assert_eq!(first, "1L");
        assert_eq!(second, "2L");
    }

    #[test]
    fn test_gc_marker_through_symbols() {
        setup();
        let heap = TestHeap::new();
        let x = heap.bare(crate::types::sexptype::FREESXP);
        for f in EXPORTS {
            assert_eq!(call(f, x), "<unexpected transient GC node: FREESXP (31)>");
        }
    }
}

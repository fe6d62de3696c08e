//! Per-thread output buffer
//!
//! The debugger reads the returned pointer after the call and never frees it.
//! Each thread owns one `CString`; storing new text drops the previous one, so
//! a pointer stays valid until the next bridge call on the same thread.

use std::cell::RefCell;
use std::ffi::{CString, c_char};

thread_local! {
    static OUTPUT: RefCell<CString> = RefCell::new(CString::default());
}

/// Escape interior NUL bytes so the C string is never cut short
fn to_c_string(text: String) -> CString {
    match CString::new(text) {
        Ok(c) => c,
        Err(err) => {
            let mut bytes = Vec::with_capacity(err.nul_position() + 8);
            for byte in err.into_vec() {
                if byte == 0 {
                    bytes.extend_from_slice(b"\\0");
                } else {
                    bytes.push(byte);
                }
            }
            // SAFETY: every NUL byte was replaced above.
            unsafe { CString::from_vec_unchecked(bytes) }
        }
    }
}

/// Replace this thread's buffer and return a pointer to its contents
pub fn store(text: String) -> *const c_char {
    let c = to_c_string(text);
    OUTPUT.with(|slot| {
        let mut slot = slot.borrow_mut();
        *slot = c;
        slot.as_ptr()
    })
}

/// Copy of the current buffer contents
#[cfg(test)]
pub fn current() -> String {
    OUTPUT.with(|slot| slot.borrow().to_string_lossy().into_owned())
}

use std::cell::RefCell;
use std::ffi::CString;

use thiserror::Error;

/// Failures of session operations that the caller can recover from.
#[derive(Error, Debug, PartialEq)]
pub enum SessionError {
    #[error("a generation is already in progress")]
    Busy,
    #[error("no generation is in progress")]
    NotGenerating,
    #[error("scenario has no candidates to draw from")]
    NoCandidates,
}

pub type Result<T> = std::result::Result<T, SessionError>;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Store an error message for later retrieval via `pp_last_error`.
pub fn set_last_error(msg: String) {
    log::error!("{}", msg);
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Take the last error message, leaving `None` in its place.
pub fn take_last_error() -> Option<CString> {
    LAST_ERROR.with(|e| e.borrow_mut().take())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_error_is_taken_once() {
        set_last_error("boom".to_string());
        assert_eq!(take_last_error().unwrap().to_str().unwrap(), "boom");
        assert!(take_last_error().is_none());
    }
}

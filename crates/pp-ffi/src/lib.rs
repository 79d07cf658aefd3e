mod types;
mod error;
mod context;
mod roulette;

pub use types::*;
pub use error::*;
pub use context::*;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::Path;

use log::LevelFilter;
use simple_logger::SimpleLogger;

/// Execute a closure that returns a `PPStatus`, catching any panics
/// and converting them into `PPStatus::ErrorInternal`.
fn catch_panic<F: FnOnce() -> PPStatus + std::panic::UnwindSafe>(f: F) -> PPStatus {
    match std::panic::catch_unwind(f) {
        Ok(status) => status,
        Err(_) => {
            set_last_error("internal panic".to_string());
            PPStatus::ErrorInternal
        }
    }
}

fn session_status(e: SessionError) -> PPStatus {
    set_last_error(e.to_string());
    match e {
        SessionError::Busy => PPStatus::ErrorBusy,
        SessionError::NotGenerating | SessionError::NoCandidates => PPStatus::ErrorInternal,
    }
}

/// Hand a Rust string to the caller as a heap-allocated C string.
unsafe fn write_string(text: String, out: *mut *mut c_char) -> PPStatus {
    match CString::new(text) {
        Ok(c) => {
            *out = c.into_raw();
            PPStatus::Ok
        }
        Err(e) => {
            set_last_error(format!("output encoding error: {}", e));
            PPStatus::ErrorInternal
        }
    }
}

/// Saturating conversion for counts handed across the C boundary.
fn count_u32(n: usize) -> u32 {
    n.min(u32::MAX as usize) as u32
}

fn parse_level(level: Option<&str>) -> LevelFilter {
    level
        .and_then(|level| match level.to_lowercase().as_str() {
            "off" | "none" => Some(LevelFilter::Off),
            "trace" => Some(LevelFilter::Trace),
            "debug" => Some(LevelFilter::Debug),
            "info" => Some(LevelFilter::Info),
            "warn" => Some(LevelFilter::Warn),
            "error" => Some(LevelFilter::Error),
            _ => None,
        })
        .unwrap_or(LevelFilter::Warn)
}

/// Install a stderr logger at the given level ("off", "trace", "debug",
/// "info", "warn", "error"). Null or unrecognized levels mean "warn".
///
/// Only the first call in a process takes effect; later calls return
/// `PPStatus::ErrorInternal`.
#[no_mangle]
pub unsafe extern "C" fn pp_logger_init(level: *const c_char) -> PPStatus {
    catch_panic(|| {
        let level = if level.is_null() {
            None
        } else {
            unsafe { CStr::from_ptr(level) }.to_str().ok()
        };
        match SimpleLogger::new().with_level(parse_level(level)).init() {
            Ok(()) => PPStatus::Ok,
            Err(e) => {
                set_last_error(format!("logger init failed: {}", e));
                PPStatus::ErrorInternal
            }
        }
    })
}

/// Create a new playground context on the built-in scenario.
///
/// On success, writes a heap-allocated `PPContext` pointer into `*ctx_out`
/// and returns `PPStatus::Ok`. The caller must later call `pp_context_destroy`
/// to free the context.
#[no_mangle]
pub extern "C" fn pp_context_create(ctx_out: *mut *mut PPContext) -> PPStatus {
    catch_panic(|| {
        if ctx_out.is_null() {
            set_last_error("ctx_out is null".to_string());
            return PPStatus::ErrorInvalidArgument;
        }
        let ctx = Box::new(PPContext::new());
        unsafe {
            *ctx_out = Box::into_raw(ctx);
        }
        PPStatus::Ok
    })
}

/// Destroy a context previously created by `pp_context_create`.
///
/// Passing a null pointer is a no-op and returns `PPStatus::Ok`.
#[no_mangle]
pub unsafe extern "C" fn pp_context_destroy(ctx: *mut PPContext) -> PPStatus {
    if ctx.is_null() {
        return PPStatus::Ok;
    }
    drop(Box::from_raw(ctx));
    PPStatus::Ok
}

/// Load a scenario from a JSON file, replacing the current one.
///
/// Parameters are reset to the scenario defaults and the history is cleared.
#[no_mangle]
pub unsafe extern "C" fn pp_scenario_load(ctx: *mut PPContext, path: *const c_char) -> PPStatus {
    catch_panic(|| {
        if ctx.is_null() || path.is_null() {
            set_last_error("null argument".to_string());
            return PPStatus::ErrorInvalidArgument;
        }
        let ctx = unsafe { &mut *ctx };
        let path_str = match unsafe { CStr::from_ptr(path) }.to_str() {
            Ok(s) => s,
            Err(e) => {
                set_last_error(format!("invalid path: {}", e));
                return PPStatus::ErrorInvalidArgument;
            }
        };

        let scenario = match pp_scenario::Scenario::open(Path::new(path_str)) {
            Ok(s) => s,
            Err(e) => {
                set_last_error(format!("failed to load scenario: {}", e));
                return PPStatus::ErrorScenarioLoad;
            }
        };

        match ctx.set_scenario(scenario) {
            Ok(()) => PPStatus::Ok,
            Err(e) => session_status(e),
        }
    })
}

/// Switch back to the built-in scenario.
#[no_mangle]
pub unsafe extern "C" fn pp_scenario_builtin(ctx: *mut PPContext) -> PPStatus {
    catch_panic(|| {
        if ctx.is_null() {
            set_last_error("null argument".to_string());
            return PPStatus::ErrorInvalidArgument;
        }
        let ctx = unsafe { &mut *ctx };
        match ctx.set_scenario(pp_scenario::Scenario::builtin()) {
            Ok(()) => PPStatus::Ok,
            Err(e) => session_status(e),
        }
    })
}

/// Set temperature, top-K and top-P. Values are clamped to the playground
/// ranges. A nonzero `seed` also reseeds the session's RNGs.
///
/// Returns `PPStatus::ErrorBusy` while a generation is in progress.
#[no_mangle]
pub unsafe extern "C" fn pp_set_params(ctx: *mut PPContext, params: PPParams) -> PPStatus {
    catch_panic(|| {
        if ctx.is_null() {
            set_last_error("null argument".to_string());
            return PPStatus::ErrorInvalidArgument;
        }
        let ctx = unsafe { &mut *ctx };
        if let Err(e) = ctx.set_params(params.to_sampling()) {
            return session_status(e);
        }
        if params.seed != 0 {
            ctx.reseed(params.seed);
        }
        PPStatus::Ok
    })
}

/// Read back the current (clamped) parameters. `seed` is reported as 0.
#[no_mangle]
pub unsafe extern "C" fn pp_get_params(ctx: *const PPContext, out: *mut PPParams) -> PPStatus {
    catch_panic(|| {
        if ctx.is_null() || out.is_null() {
            set_last_error("null argument".to_string());
            return PPStatus::ErrorInvalidArgument;
        }
        let ctx = unsafe { &*ctx };
        unsafe { *out = PPParams::from_sampling(&ctx.params(), 0) };
        PPStatus::Ok
    })
}

/// Number of candidates in the current scenario.
#[no_mangle]
pub unsafe extern "C" fn pp_candidate_count(ctx: *const PPContext, out: *mut u32) -> PPStatus {
    catch_panic(|| {
        if ctx.is_null() || out.is_null() {
            set_last_error("null argument".to_string());
            return PPStatus::ErrorInvalidArgument;
        }
        let ctx = unsafe { &*ctx };
        unsafe { *out = count_u32(ctx.scenario().len()) };
        PPStatus::Ok
    })
}

/// Copy the token text of candidate `id` into a new C string.
///
/// The caller must free the string with `pp_free_string`.
#[no_mangle]
pub unsafe extern "C" fn pp_candidate_token(
    ctx: *const PPContext,
    id: u32,
    out: *mut *mut c_char,
) -> PPStatus {
    catch_panic(|| {
        if ctx.is_null() || out.is_null() {
            set_last_error("null argument".to_string());
            return PPStatus::ErrorInvalidArgument;
        }
        let ctx = unsafe { &*ctx };
        match ctx.scenario().candidate(id) {
            Some(c) => unsafe { write_string(c.token.clone(), out) },
            None => {
                set_last_error(format!("unknown candidate id: {}", id));
                PPStatus::ErrorInvalidArgument
            }
        }
    })
}

/// Write the processed candidates for the current parameters into `buf`, in
/// descending probability order.
///
/// `*out_len` always receives the number of candidates. If `capacity` is
/// smaller than that, nothing is written and `PPStatus::ErrorBufferTooSmall`
/// is returned.
#[no_mangle]
pub unsafe extern "C" fn pp_transform(
    ctx: *mut PPContext,
    buf: *mut PPProcessedCandidate,
    capacity: usize,
    out_len: *mut usize,
) -> PPStatus {
    catch_panic(|| {
        if ctx.is_null() || out_len.is_null() {
            set_last_error("null argument".to_string());
            return PPStatus::ErrorInvalidArgument;
        }
        let ctx = unsafe { &mut *ctx };
        let processed = ctx.processed();
        unsafe { *out_len = processed.len() };

        if capacity < processed.len() || buf.is_null() {
            set_last_error(format!(
                "buffer holds {} candidates, {} needed",
                capacity,
                processed.len()
            ));
            return PPStatus::ErrorBufferTooSmall;
        }

        let out = unsafe { std::slice::from_raw_parts_mut(buf, processed.len()) };
        for (slot, c) in out.iter_mut().zip(processed) {
            *slot = PPProcessedCandidate::from(c);
        }
        PPStatus::Ok
    })
}

/// Generate the next token.
///
/// The callback is invoked once per visual tick (up to `ticks` times) with a
/// highlighted candidate id; pacing the ticks is up to the caller. Afterwards
/// exactly one real draw is made, its id is written to `*out_id`, and the
/// token is appended to the history. Returns `PPStatus::ErrorBusy` if called
/// again from inside the callback.
#[no_mangle]
pub unsafe extern "C" fn pp_generate(
    ctx: *mut PPContext,
    ticks: u32,
    callback: PPRouletteCallback,
    user_data: *mut std::os::raw::c_void,
    out_id: *mut u32,
) -> PPStatus {
    catch_panic(|| {
        if ctx.is_null() || out_id.is_null() {
            set_last_error("null argument".to_string());
            return PPStatus::ErrorInvalidArgument;
        }

        let picks = match unsafe { &mut *ctx }.begin_generate(ticks) {
            Ok(p) => p,
            Err(e) => return session_status(e),
        };

        // No borrow of the context is held while the callback runs.
        for (tick, id) in picks.into_iter().enumerate() {
            unsafe { &mut *ctx }.highlight(id);
            if !roulette::invoke_callback(callback, user_data, id, tick as u32) {
                break;
            }
        }

        match unsafe { &mut *ctx }.finish_generate() {
            Ok(winner) => {
                unsafe { *out_id = winner.id };
                PPStatus::Ok
            }
            Err(e) => session_status(e),
        }
    })
}

/// Clear the generated history.
#[no_mangle]
pub unsafe extern "C" fn pp_reset_history(ctx: *mut PPContext) -> PPStatus {
    catch_panic(|| {
        if ctx.is_null() {
            set_last_error("null argument".to_string());
            return PPStatus::ErrorInvalidArgument;
        }
        let ctx = unsafe { &mut *ctx };
        ctx.reset_history();
        PPStatus::Ok
    })
}

/// The prompt followed by every generated token, as a new C string.
///
/// The caller must free the string with `pp_free_string`.
#[no_mangle]
pub unsafe extern "C" fn pp_text(ctx: *const PPContext, out: *mut *mut c_char) -> PPStatus {
    catch_panic(|| {
        if ctx.is_null() || out.is_null() {
            set_last_error("null argument".to_string());
            return PPStatus::ErrorInvalidArgument;
        }
        let ctx = unsafe { &*ctx };
        unsafe { write_string(ctx.text(), out) }
    })
}

/// Retrieve the last error message.
///
/// Returns a pointer to a C string describing the most recent error, or
/// null if no error has occurred. The caller must free the returned string
/// with `pp_free_string`.
#[no_mangle]
pub extern "C" fn pp_last_error() -> *const c_char {
    match error::take_last_error() {
        Some(e) => e.into_raw(),
        None => std::ptr::null(),
    }
}

/// Free a string previously returned by this library.
#[no_mangle]
pub unsafe extern "C" fn pp_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::raw::c_void;
    use std::ptr;

    fn create() -> *mut PPContext {
        let mut ctx: *mut PPContext = ptr::null_mut();
        assert_eq!(pp_context_create(&mut ctx), PPStatus::Ok);
        assert!(!ctx.is_null());
        ctx
    }

    unsafe fn take_string(s: *mut c_char) -> String {
        let text = CStr::from_ptr(s).to_str().unwrap().to_string();
        pp_free_string(s);
        text
    }

    #[test]
    fn test_count_u32_saturates() {
        assert_eq!(count_u32(10), 10);
        assert_eq!(count_u32(u32::MAX as usize), u32::MAX);
        assert_eq!(count_u32(usize::MAX), u32::MAX);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(Some("TRACE")), LevelFilter::Trace);
        assert_eq!(parse_level(Some("none")), LevelFilter::Off);
        assert_eq!(parse_level(Some("bogus")), LevelFilter::Warn);
        assert_eq!(parse_level(None), LevelFilter::Warn);
    }

    #[test]
    fn test_null_arguments_rejected() {
        assert_eq!(pp_context_create(ptr::null_mut()), PPStatus::ErrorInvalidArgument);
        unsafe {
            assert_eq!(pp_context_destroy(ptr::null_mut()), PPStatus::Ok);
            assert_eq!(
                pp_set_params(ptr::null_mut(), PPParams::default()),
                PPStatus::ErrorInvalidArgument
            );
        }
    }

    #[test]
    fn test_null_arguments_set_last_error() {
        let mut count = 0u32;
        let mut params = PPParams::default();
        let mut text = ptr::null_mut();
        unsafe {
            let statuses = [
                pp_scenario_builtin(ptr::null_mut()),
                pp_get_params(ptr::null(), &mut params),
                pp_candidate_count(ptr::null(), &mut count),
                pp_candidate_token(ptr::null(), 1, &mut text),
                pp_reset_history(ptr::null_mut()),
                pp_text(ptr::null(), &mut text),
            ];
            for status in statuses {
                assert_eq!(status, PPStatus::ErrorInvalidArgument);
                let err = pp_last_error();
                assert!(!err.is_null());
                assert_eq!(take_string(err as *mut c_char), "null argument");
            }
        }
    }

    #[test]
    fn test_transform_reports_len_and_fills_buffer() {
        let ctx = create();
        unsafe {
            let mut len = 0usize;
            let status = pp_transform(ctx, ptr::null_mut(), 0, &mut len);
            assert_eq!(status, PPStatus::ErrorBufferTooSmall);
            assert_eq!(len, 10);

            let mut buf = vec![
                PPProcessedCandidate {
                    id: 0,
                    base_prob: 0.0,
                    adjusted_prob: 0.0,
                    cumulative_prob: 0.0,
                    kept_by_top_k: false,
                    kept_by_top_p: false,
                    final_prob: 0.0,
                };
                len
            ];
            assert_eq!(pp_transform(ctx, buf.as_mut_ptr(), buf.len(), &mut len), PPStatus::Ok);
            assert_eq!(buf[0].id, 1);
            let total: f64 = buf.iter().map(|c| c.final_prob).sum();
            assert!((total - 1.0).abs() < 1e-9);

            pp_context_destroy(ctx);
        }
    }

    #[test]
    fn test_params_roundtrip_clamped() {
        let ctx = create();
        unsafe {
            let params = PPParams {
                temperature: 0.01,
                top_k: 3,
                top_p: 0.9,
                seed: 0,
            };
            assert_eq!(pp_set_params(ctx, params), PPStatus::Ok);
            let mut out = PPParams::default();
            assert_eq!(pp_get_params(ctx, &mut out), PPStatus::Ok);
            assert_eq!(out.temperature, 0.1);
            assert_eq!(out.top_k, 3);
            assert_eq!(out.top_p, 0.9);
            pp_context_destroy(ctx);
        }
    }

    extern "C" fn count_ticks(_id: u32, _tick: u32, user_data: *mut c_void) -> bool {
        let count = unsafe { &mut *(user_data as *mut u32) };
        *count += 1;
        true
    }

    #[test]
    fn test_generate_appends_to_text() {
        let ctx = create();
        unsafe {
            let params = PPParams {
                top_k: 1,
                seed: 9,
                ..PPParams::default()
            };
            assert_eq!(pp_set_params(ctx, params), PPStatus::Ok);

            let mut ticks = 0u32;
            let mut id = 0u32;
            let status = pp_generate(
                ctx,
                DEFAULT_ROULETTE_TICKS,
                Some(count_ticks),
                &mut ticks as *mut u32 as *mut c_void,
                &mut id,
            );
            assert_eq!(status, PPStatus::Ok);
            assert_eq!(ticks, DEFAULT_ROULETTE_TICKS);
            assert_eq!(id, 1);

            let mut token = ptr::null_mut();
            assert_eq!(pp_candidate_token(ctx, id, &mut token), PPStatus::Ok);
            assert_eq!(take_string(token), "好");

            let mut text = ptr::null_mut();
            assert_eq!(pp_text(ctx, &mut text), PPStatus::Ok);
            assert_eq!(take_string(text), "今天天气真好");

            assert_eq!(pp_reset_history(ctx), PPStatus::Ok);
            let mut text = ptr::null_mut();
            assert_eq!(pp_text(ctx, &mut text), PPStatus::Ok);
            assert_eq!(take_string(text), "今天天气真");

            pp_context_destroy(ctx);
        }
    }

    #[test]
    fn test_scenario_load_failure_sets_last_error() {
        let ctx = create();
        unsafe {
            let path = CString::new("/nonexistent/scenario.json").unwrap();
            assert_eq!(pp_scenario_load(ctx, path.as_ptr()), PPStatus::ErrorScenarioLoad);
            let err = pp_last_error();
            assert!(!err.is_null());
            assert!(take_string(err as *mut c_char).starts_with("failed to load scenario"));

            let mut count = 0u32;
            assert_eq!(pp_candidate_count(ctx, &mut count), PPStatus::Ok);
            assert_eq!(count, 10);
            pp_context_destroy(ctx);
        }
    }
}

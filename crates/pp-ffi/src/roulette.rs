use crate::types::PPRouletteCallback;

/// Invoke a roulette callback for one visual tick.
///
/// Returns `true` if ticking should continue, `false` to stop.
/// If there is no callback, returns `true` (continue).
pub fn invoke_callback(
    callback: PPRouletteCallback,
    user_data: *mut std::os::raw::c_void,
    candidate_id: u32,
    tick: u32,
) -> bool {
    match callback {
        Some(cb) => cb(candidate_id, tick, user_data),
        None => true,
    }
}

use rand::Rng;

use crate::candidate::ProcessedCandidate;

/// Draw one candidate from a processed list using the thread-local RNG.
///
/// See [`sample_with`].
pub fn sample(processed: &[ProcessedCandidate]) -> Option<&ProcessedCandidate> {
    sample_with(processed, &mut rand::thread_rng())
}

/// Draw one candidate by inverse-CDF sampling over `final_prob`.
///
/// Consumes exactly one uniform draw `r` in [0, 1) and walks the list in its
/// given order, returning the first candidate with nonzero `final_prob` whose
/// running total reaches `r`. If rounding keeps the total below `r`, the
/// first (highest-ranked) candidate with nonzero `final_prob` is returned.
/// Returns `None` only for an empty list.
pub fn sample_with<'a, R: Rng + ?Sized>(
    processed: &'a [ProcessedCandidate],
    rng: &mut R,
) -> Option<&'a ProcessedCandidate> {
    let r: f64 = rng.gen();

    let mut acc = 0.0f64;
    for c in processed.iter().filter(|c| c.final_prob > 0.0) {
        acc += c.final_prob;
        if acc >= r {
            log::trace!("draw r={:.6} picked '{}' (id {})", r, c.token, c.id);
            return Some(c);
        }
    }

    log::debug!("draw r={:.6} past cumulative total {:.6}, using fallback", r, acc);
    processed
        .iter()
        .find(|c| c.final_prob > 0.0)
        .or_else(|| processed.first())
}

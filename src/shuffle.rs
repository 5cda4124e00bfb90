//! Fair shuffling for candidate pools and the final combined set.
//!
//! `thread_rng` is a ChaCha-based CSPRNG. That is a requirement, not a
//! nicety: students regenerate simulations and could otherwise learn which
//! questions a predictable generator puts "early". Do not swap in a faster
//! linear generator here.

use rand::seq::SliceRandom;
use rand::thread_rng;

/// Unbiased in-place permutation (Fisher–Yates via `SliceRandom`). Produces
/// a full permutation of its input — no omissions, no duplicates — with a
/// non-deterministic outcome.
pub fn fair_shuffle<T>(items: &mut [T]) {
    items.shuffle(&mut thread_rng());
}

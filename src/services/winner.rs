use rand::seq::SliceRandom;

/// Picks one entry uniformly at random. Returns `None` for an empty slice:
/// a raffle with no participants has no winner to draw.
///
/// Statistical uniformity is all that is promised here; the generator is not
/// cryptographic.
pub fn pick<T>(entries: &[T]) -> Option<&T> {
    entries.choose(&mut rand::thread_rng())
}

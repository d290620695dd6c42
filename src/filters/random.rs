use super::FilterError;
use rand::Rng;
use rand::seq::SliceRandom;

/// Pick one element uniformly at random using the thread-local RNG.
///
/// Returns [`FilterError::EmptySequence`] for an empty slice.
pub fn pick_random<T>(items: &[T]) -> Result<&T, FilterError> {
    pick_random_with(items, &mut rand::thread_rng())
}

/// [`pick_random`] with a caller-supplied RNG, for reproducible picks.
pub fn pick_random_with<'a, T, R>(items: &'a [T], rng: &mut R) -> Result<&'a T, FilterError>
where
    R: Rng + ?Sized,
{
    items.choose(rng).ok_or(FilterError::EmptySequence)
}

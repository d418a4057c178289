//! Running aggregates for use with [`apply`](crate::processors::apply).
//!
//! Each constructor returns a function that replaces every value with the
//! aggregate of all values seen so far. The state is shared by every caller
//! of the returned function.

use std::ops::{Add, Div};
use std::sync::{Mutex, MutexGuard};

use crate::core::{Error, Result};

fn lock<S>(state: &Mutex<S>) -> MutexGuard<'_, S> {
    // A panicking caller cannot leave the aggregate half-updated.
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Running arithmetic mean.
///
/// Fails once more values have been seen than `T` can count.
///
/// Example (in pseudocode): `apply({1, 3, 5}, mean()) -> {1, 2, 3}`
pub fn mean<T>() -> impl Fn(T) -> Result<T> + Send + Sync + 'static
where
    T: Copy + Default + Add<Output = T> + Div<Output = T> + TryFrom<u32> + Send + 'static,
{
    let state: Mutex<(T, u32)> = Mutex::new((T::default(), 0));
    move |value: T| -> Result<T> {
        let mut state = lock(&state);
        let count = state
            .1
            .checked_add(1)
            .ok_or_else(|| Error::custom("mean: too many values"))?;
        let divisor =
            T::try_from(count).map_err(|_| Error::custom("mean: count does not fit the value type"))?;
        let total = state.0 + value;
        *state = (total, count);
        Ok(total / divisor)
    }
}

/// Running maximum.
///
/// Example (in pseudocode): `apply({1, 3, 2}, max()) -> {1, 3, 3}`
pub fn max<T>() -> impl Fn(T) -> Result<T> + Send + Sync + 'static
where
    T: PartialOrd + Clone + Send + 'static,
{
    extremum(|candidate, current| candidate > current)
}

/// Running minimum.
///
/// Example (in pseudocode): `apply({3, 1, 2}, min()) -> {3, 1, 1}`
pub fn min<T>() -> impl Fn(T) -> Result<T> + Send + Sync + 'static
where
    T: PartialOrd + Clone + Send + 'static,
{
    extremum(|candidate, current| candidate < current)
}

fn extremum<T, F>(replaces: F) -> impl Fn(T) -> Result<T> + Send + Sync + 'static
where
    T: Clone + Send + 'static,
    F: Fn(&T, &T) -> bool + Send + Sync + 'static,
{
    let best: Mutex<Option<T>> = Mutex::new(None);
    move |value: T| -> Result<T> {
        let mut best = lock(&best);
        match best.as_ref() {
            Some(current) if !replaces(&value, current) => Ok(current.clone()),
            _ => {
                *best = Some(value.clone());
                Ok(value)
            }
        }
    }
}

/// Running sum.
///
/// Example (in pseudocode): `apply({1, 2, 3}, sum()) -> {1, 3, 6}`
pub fn sum<T>() -> impl Fn(T) -> Result<T> + Send + Sync + 'static
where
    T: Copy + Default + Add<Output = T> + Send + 'static,
{
    let total = Mutex::new(T::default());
    move |value: T| -> Result<T> {
        let mut total = lock(&total);
        *total = *total + value;
        Ok(*total)
    }
}

//! Window scans over a sequence sorted along one axis.
//!
//! Given a pivot and a threshold `delta`, the window is the contiguous run of
//! entries whose axis value is within `delta` of the pivot's. Because the
//! sequence is sorted, the run is found by expanding outward from the pivot
//! one step at a time: O(window) per pivot instead of O(n).

use std::ops::RangeInclusive;

/// Inclusive index range of entries within `delta` of `sorted[pivot]`.
///
/// `sorted` must be ascending by `key` and `pivot` must be in bounds. The
/// pivot is always part of the returned range.
///
/// # Examples
///
/// ```
/// use canopy::compute::spatial::window;
///
/// let lats = [1.0, 2.0, 2.5, 3.0, 5.0];
/// assert_eq!(window(&lats, 2, 0.5, |v| *v), 1..=3);
/// assert_eq!(window(&lats, 4, 0.5, |v| *v), 4..=4);
/// ```
pub fn window<T, F>(sorted: &[T], pivot: usize, delta: f64, key: F) -> RangeInclusive<usize>
where
    F: Fn(&T) -> f64,
{
    debug_assert!(pivot < sorted.len(), "pivot {pivot} out of bounds");

    let center = key(&sorted[pivot]);
    let in_band = |item: &T| (key(item) - center).abs() <= delta;

    let mut left = pivot;
    while left > 0 && in_band(&sorted[left - 1]) {
        left -= 1;
    }

    let mut right = pivot;
    while right + 1 < sorted.len() && in_band(&sorted[right + 1]) {
        right += 1;
    }

    left..=right
}

/// The entries of [`window`] as a slice.
pub fn window_slice<T, F>(sorted: &[T], pivot: usize, delta: f64, key: F) -> &[T]
where
    F: Fn(&T) -> f64,
{
    let range = window(sorted, pivot, delta, key);
    &sorted[range]
}

//! Validation and normalization of axis arguments.

use std::fmt;

use smallvec::SmallVec;

use crate::errors::AxisOutOfBounds;
use crate::shape::Rank;

/// A set of non-negative axis indices, stored in ascending order.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct AxisSet(SmallVec<[usize; 4]>);

impl AxisSet {
    pub fn new() -> AxisSet {
        AxisSet(SmallVec::new())
    }

    /// Create the set of axes `0..ndim`.
    pub fn all(ndim: usize) -> AxisSet {
        AxisSet((0..ndim).collect())
    }

    /// Create the set of positions in `mask` which are `true`.
    pub fn from_mask(mask: &[bool]) -> AxisSet {
        AxisSet(
            mask.iter()
                .enumerate()
                .filter_map(|(axis, &set)| set.then_some(axis))
                .collect(),
        )
    }

    pub fn contains(&self, axis: usize) -> bool {
        self.0.binary_search(&axis).is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return the axes in ascending order.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<usize> for AxisSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> AxisSet {
        let mut axes: SmallVec<[usize; 4]> = iter.into_iter().collect();
        axes.sort_unstable();
        axes.dedup();
        AxisSet(axes)
    }
}

impl<const N: usize> From<[usize; N]> for AxisSet {
    fn from(axes: [usize; N]) -> AxisSet {
        axes.into_iter().collect()
    }
}

impl fmt::Display for AxisSet {
    /// Format the set as eg. "AxisSet{0, 2}".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AxisSet{{")?;
        for (i, axis) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", axis)?;
        }
        write!(f, "}}")
    }
}

/// Resolve an index given as a value in `[-len, len-1]` to a positive index in
/// `[0, len)`, or return None if the index is out of bounds.
pub(crate) fn resolve_index(len: usize, index: i64) -> Option<usize> {
    let len = len.min(i64::MAX as usize) as i64;
    if index < -len || index >= len {
        return None;
    }

    if index >= 0 {
        Some(index as usize)
    } else {
        Some((len + index) as usize)
    }
}

/// Validate axes for a tensor of rank `rank` and normalize them into an
/// [`AxisSet`].
///
/// Axes may be negative, in which case they count backwards from the last
/// dimension. Duplicate axes are collapsed.
///
/// If `rank` is unknown, validation always succeeds and the set echoes the
/// non-negative requested axes. Negative axes cannot be normalized until the
/// rank is known, so they are omitted and must be checked again when the
/// operator runs.
///
/// If `rank` is known, every axis must be in `[-rank, rank)`. Otherwise the
/// returned error lists all of the out-of-range axes.
pub fn validate_axes(rank: Rank, axes: &[i64]) -> Result<AxisSet, AxisOutOfBounds> {
    let Rank::Known(ndim) = rank else {
        tracing::trace!(?axes, "deferring axis validation until rank is known");
        return Ok(axes
            .iter()
            .filter_map(|&axis| usize::try_from(axis).ok())
            .collect());
    };

    let mut resolved = SmallVec::<[usize; 4]>::with_capacity(axes.len());
    let mut offending_axes = Vec::new();
    for &axis in axes {
        match resolve_index(ndim, axis) {
            Some(index) => resolved.push(index),
            None => offending_axes.push(axis),
        }
    }

    if !offending_axes.is_empty() {
        offending_axes.sort_unstable();
        offending_axes.dedup();
        return Err(AxisOutOfBounds {
            offending_axes,
            rank: ndim,
        });
    }

    Ok(resolved.into_iter().collect())
}

use smallvec::SmallVec;

use crate::axes::{validate_axes, AxisSet};
use crate::errors::InferError;
use crate::infer::{single_input, InferTypes, TensorInfo};
use crate::shape::Rank;

/// How the axes to reverse are specified.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ReverseMode {
    /// Axes are given as a list of indices.
    Index,

    /// Axes are given as a boolean mask with one entry per dimension.
    Mask,
}

/// Axes argument of the [`Reverse`] operator.
#[derive(Clone, Debug, PartialEq)]
pub enum ReverseAxes {
    /// Axis indices. Negative values count back from the last dimension.
    Index(SmallVec<[i64; 4]>),

    /// Mask where `true` entries mark the axes to reverse.
    Mask(Vec<bool>),
}

impl ReverseAxes {
    pub fn mode(&self) -> ReverseMode {
        match self {
            ReverseAxes::Index(_) => ReverseMode::Index,
            ReverseAxes::Mask(_) => ReverseMode::Mask,
        }
    }

    /// Validate the axes against a rank and return the set of axes to
    /// reverse.
    ///
    /// If the rank is unknown, validation is deferred and always succeeds.
    pub fn resolve(&self, rank: Rank) -> Result<AxisSet, InferError> {
        match self {
            ReverseAxes::Index(axes) => Ok(validate_axes(rank, axes)?),
            ReverseAxes::Mask(mask) => match rank {
                Rank::Known(ndim) if ndim != mask.len() => Err(InferError::MaskLengthMismatch {
                    mask_len: mask.len(),
                    rank: ndim,
                }),
                _ => Ok(AxisSet::from_mask(mask)),
            },
        }
    }
}

/// Reverse operator.
///
/// Reverses the order of elements along the selected axes. The output always
/// has the same element type and shape as the input.
#[derive(Clone, Debug, PartialEq)]
pub struct Reverse {
    pub axes: ReverseAxes,
}

impl Reverse {
    pub fn with_indices(axes: &[i64]) -> Reverse {
        Reverse {
            axes: ReverseAxes::Index(SmallVec::from_slice(axes)),
        }
    }

    pub fn with_mask(mask: &[bool]) -> Reverse {
        Reverse {
            axes: ReverseAxes::Mask(mask.to_vec()),
        }
    }

    pub fn mode(&self) -> ReverseMode {
        self.axes.mode()
    }
}

impl InferTypes for Reverse {
    fn infer_types(&self, inputs: &[TensorInfo]) -> Result<TensorInfo, InferError> {
        let data = single_input(inputs)?;
        self.axes.resolve(data.shape.rank())?;
        Ok(data.clone())
    }
}

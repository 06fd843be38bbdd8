//! Error types reported by element type, shape and axis operations.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

use crate::element_type::ElementType;
use crate::shape::PartialShape;

/// Two element types could not be merged.
#[derive(Clone, Debug, PartialEq)]
pub struct MergeConflict {
    pub a: ElementType,
    pub b: ElementType,
}

impl Display for MergeConflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "element types {} and {} are incompatible", self.a, self.b)
    }
}

impl Error for MergeConflict {}

/// Two known dimension sizes could not be merged.
#[derive(Clone, Debug, PartialEq)]
pub struct DimConflict {
    pub a: usize,
    pub b: usize,
}

impl Display for DimConflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "dimensions {} and {} are incompatible", self.a, self.b)
    }
}

impl Error for DimConflict {}

/// Two shapes could not be merged or broadcast together.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeConflict {
    pub lhs: PartialShape,
    pub rhs: PartialShape,
}

impl Display for ShapeConflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "shapes {} and {} are incompatible", self.lhs, self.rhs)
    }
}

impl Error for ShapeConflict {}

/// Some requested axes are outside the valid range for a tensor's rank.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisOutOfBounds {
    /// The out-of-range axes, as supplied, in ascending order without
    /// duplicates.
    pub offending_axes: Vec<i64>,

    /// Rank the axes were checked against.
    pub rank: usize,
}

impl Display for AxisOutOfBounds {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Some of the provided axes (AxisSet{{")?;
        for (i, axis) in self.offending_axes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", axis)?;
        }
        write!(f, "}}) are out of bounds (input rank: {}).", self.rank)
    }
}

impl Error for AxisOutOfBounds {}

/// Attributes such as the bit width were requested for `Undefined` or
/// `Dynamic`.
#[derive(Clone, Debug, PartialEq)]
pub struct InvalidAttributeQuery {
    pub element_type: ElementType,
}

impl Display for InvalidAttributeQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot query attributes of element type {}",
            self.element_type
        )
    }
}

impl Error for InvalidAttributeQuery {}

/// Errors that occur when inferring the element type and shape of an
/// operator's output.
#[derive(Clone, Debug, PartialEq)]
pub enum InferError {
    /// Input element types could not be merged.
    TypeConflict(MergeConflict),

    /// Input shapes could not be merged.
    ShapeConflict(ShapeConflict),

    /// An axis argument is out of range for the input rank.
    AxisOutOfBounds(AxisOutOfBounds),

    /// An element type attribute was queried on a non-concrete type.
    InvalidAttributeQuery(InvalidAttributeQuery),

    /// Too many or too few inputs were provided for this operator.
    IncorrectInputCount { expected: usize, actual: usize },

    /// The operator does not support the input's element type.
    InvalidElementType {
        op: &'static str,
        element_type: ElementType,
        expected: &'static str,
    },

    /// A reversal mask does not have one entry per input dimension.
    MaskLengthMismatch { mask_len: usize, rank: usize },
}

impl Display for InferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeConflict(err) => err.fmt(f),
            Self::ShapeConflict(err) => err.fmt(f),
            Self::AxisOutOfBounds(err) => err.fmt(f),
            Self::InvalidAttributeQuery(err) => err.fmt(f),
            Self::IncorrectInputCount { expected, actual } => {
                write!(f, "expected {} inputs but got {}", expected, actual)
            }
            Self::InvalidElementType {
                op,
                element_type,
                expected,
            } => write!(
                f,
                "{} expects {} input but the element type is {}",
                op, expected, element_type
            ),
            Self::MaskLengthMismatch { mask_len, rank } => write!(
                f,
                "reversal mask has {} entries but the input rank is {}",
                mask_len, rank
            ),
        }
    }
}

impl Error for InferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::TypeConflict(err) => Some(err),
            Self::ShapeConflict(err) => Some(err),
            Self::AxisOutOfBounds(err) => Some(err),
            Self::InvalidAttributeQuery(err) => Some(err),
            Self::IncorrectInputCount { .. }
            | Self::InvalidElementType { .. }
            | Self::MaskLengthMismatch { .. } => None,
        }
    }
}

impl From<MergeConflict> for InferError {
    fn from(err: MergeConflict) -> Self {
        Self::TypeConflict(err)
    }
}

impl From<ShapeConflict> for InferError {
    fn from(err: ShapeConflict) -> Self {
        Self::ShapeConflict(err)
    }
}

impl From<AxisOutOfBounds> for InferError {
    fn from(err: AxisOutOfBounds) -> Self {
        Self::AxisOutOfBounds(err)
    }
}

impl From<InvalidAttributeQuery> for InferError {
    fn from(err: InvalidAttributeQuery) -> Self {
        Self::InvalidAttributeQuery(err)
    }
}

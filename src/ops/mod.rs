//! Type and shape inference rules for individual operators.

mod binary;
mod reduce;
mod reverse;

pub use binary::{AutoBroadcast, BinaryElementwise};
pub use reduce::{reduce_shape, Reduce, ReduceElement, ReductionKind, Scalar};
pub use reverse::{Reverse, ReverseAxes, ReverseMode};

//! Closed set of operators known to the graph layer.

use std::fmt;

use crate::errors::InferError;
use crate::infer::{InferTypes, TensorInfo, UnaryOp};
use crate::ops::{BinaryElementwise, Reduce, Reverse};

/// An operator whose output type and shape can be inferred.
///
/// New operators are supported by adding a variant and an [`InferTypes`]
/// implementation for its attributes.
#[derive(Clone, Debug, PartialEq)]
pub enum OpKind {
    /// Elementwise operator with one input, eg. `Neg` or `Abs`.
    Unary(&'static str),

    /// Elementwise operator with two inputs, eg. `Add` or `Mul`.
    Binary(&'static str, BinaryElementwise),

    Reduce(Reduce),
    Reverse(Reverse),
}

impl OpKind {
    /// Return the operator's type name, eg. "ReduceMax".
    pub fn name(&self) -> &str {
        match self {
            OpKind::Unary(name) | OpKind::Binary(name, _) => name,
            OpKind::Reduce(op) => op.kind.name(),
            OpKind::Reverse(_) => "Reverse",
        }
    }
}

impl InferTypes for OpKind {
    fn infer_types(&self, inputs: &[TensorInfo]) -> Result<TensorInfo, InferError> {
        match self {
            OpKind::Unary(_) => UnaryOp.infer_types(inputs),
            OpKind::Binary(_, op) => op.infer_types(inputs),
            OpKind::Reduce(op) => op.infer_types(inputs),
            OpKind::Reverse(op) => op.infer_types(inputs),
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Reduce> for OpKind {
    fn from(op: Reduce) -> OpKind {
        OpKind::Reduce(op)
    }
}

impl From<Reverse> for OpKind {
    fn from(op: Reverse) -> OpKind {
        OpKind::Reverse(op)
    }
}

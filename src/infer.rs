//! Traits for type and shape inference and common implementations.

use std::fmt;

use crate::element_type::ElementType;
use crate::errors::InferError;
use crate::shape::PartialShape;

/// Element type and shape of a value in the graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TensorInfo {
    pub element_type: ElementType,
    pub shape: PartialShape,
}

impl TensorInfo {
    pub fn new(element_type: ElementType, shape: impl Into<PartialShape>) -> TensorInfo {
        TensorInfo {
            element_type,
            shape: shape.into(),
        }
    }

    /// Create info for a value whose element type and shape are both unknown.
    pub fn dynamic() -> TensorInfo {
        TensorInfo {
            element_type: ElementType::Dynamic,
            shape: PartialShape::unknown(),
        }
    }
}

impl fmt::Display for TensorInfo {
    /// Format as eg. "f32 {?, 3}".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.element_type, self.shape)
    }
}

/// Infer the element type and shape of an operator's output given its
/// inputs.
///
/// Implementations must not assume anything about inputs beyond what
/// `inputs` says. If inference fails, no output is produced.
pub trait InferTypes {
    fn infer_types(&self, inputs: &[TensorInfo]) -> Result<TensorInfo, InferError>;
}

/// Return the single input of a unary operator.
pub(crate) fn single_input(inputs: &[TensorInfo]) -> Result<&TensorInfo, InferError> {
    match inputs {
        [input] => Ok(input),
        _ => Err(InferError::IncorrectInputCount {
            expected: 1,
            actual: inputs.len(),
        }),
    }
}

/// Inference for elementwise unary operators.
///
/// The output has the same element type and shape as the input.
#[derive(Clone, Debug, PartialEq)]
pub struct UnaryOp;

impl InferTypes for UnaryOp {
    fn infer_types(&self, inputs: &[TensorInfo]) -> Result<TensorInfo, InferError> {
        single_input(inputs).cloned()
    }
}

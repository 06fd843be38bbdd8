use crate::errors::InferError;
use crate::infer::{InferTypes, TensorInfo};

/// Rule for reconciling the shapes of elementwise operator inputs.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum AutoBroadcast {
    /// Input shapes must be compatible without broadcasting.
    None,

    /// NumPy-style broadcasting.
    #[default]
    Numpy,
}

/// Inference for elementwise binary operators (Add, Mul etc.)
///
/// Both inputs must have compatible element types, which are merged to
/// produce the output element type. The output shape is the result of merging
/// or broadcasting the input shapes, depending on `broadcast`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BinaryElementwise {
    pub broadcast: AutoBroadcast,
}

impl InferTypes for BinaryElementwise {
    fn infer_types(&self, inputs: &[TensorInfo]) -> Result<TensorInfo, InferError> {
        let [a, b] = inputs else {
            return Err(InferError::IncorrectInputCount {
                expected: 2,
                actual: inputs.len(),
            });
        };

        let element_type = a.element_type.merge(b.element_type)?;
        let shape = match self.broadcast {
            AutoBroadcast::None => a.shape.merge(&b.shape)?,
            AutoBroadcast::Numpy => a.shape.broadcast_merge(&b.shape)?,
        };

        Ok(TensorInfo {
            element_type,
            shape,
        })
    }
}

#[cfg(test)]
mod tests {
    use tessera_testing::TestCases;

    use super::{AutoBroadcast, BinaryElementwise};
    use crate::element_type::ElementType;
    use crate::errors::{InferError, MergeConflict, ShapeConflict};
    use crate::infer::{InferTypes, TensorInfo};
    use crate::partial_shape;
    use crate::shape::PartialShape;

    #[test]
    fn test_binary_infer() {
        #[derive(Debug)]
        struct Case {
            lhs: TensorInfo,
            rhs: TensorInfo,
            broadcast: AutoBroadcast,
            expected: TensorInfo,
        }

        let cases = [
            Case {
                lhs: TensorInfo::new(ElementType::F32, partial_shape!(2, 3)),
                rhs: TensorInfo::new(ElementType::F32, partial_shape!(2, 3)),
                broadcast: AutoBroadcast::None,
                expected: TensorInfo::new(ElementType::F32, partial_shape!(2, 3)),
            },
            Case {
                lhs: TensorInfo::new(ElementType::Dynamic, partial_shape!(?, 3)),
                rhs: TensorInfo::new(ElementType::I32, partial_shape!(2, ?)),
                broadcast: AutoBroadcast::None,
                expected: TensorInfo::new(ElementType::I32, partial_shape!(2, 3)),
            },
            Case {
                lhs: TensorInfo::new(ElementType::F64, partial_shape!(8, 1, 6)),
                rhs: TensorInfo::new(ElementType::Dynamic, partial_shape!(7, 1)),
                broadcast: AutoBroadcast::Numpy,
                expected: TensorInfo::new(ElementType::F64, partial_shape!(8, 7, 6)),
            },
            Case {
                lhs: TensorInfo::new(ElementType::U8, PartialShape::unknown()),
                rhs: TensorInfo::new(ElementType::U8, partial_shape!(4)),
                broadcast: AutoBroadcast::Numpy,
                expected: TensorInfo::new(ElementType::U8, PartialShape::unknown()),
            },
            Case {
                lhs: TensorInfo::new(ElementType::U8, PartialShape::unknown()),
                rhs: TensorInfo::new(ElementType::U8, partial_shape!(4)),
                broadcast: AutoBroadcast::None,
                expected: TensorInfo::new(ElementType::U8, partial_shape!(4)),
            },
        ];

        cases.test_each(|case| {
            let op = BinaryElementwise {
                broadcast: case.broadcast,
            };
            let output = op.infer_types(&[case.lhs.clone(), case.rhs.clone()]);
            assert_eq!(output.as_ref(), Ok(&case.expected));
        })
    }

    #[test]
    fn test_binary_type_conflict() {
        let op = BinaryElementwise::default();
        let lhs = TensorInfo::new(ElementType::F32, partial_shape!(2));
        let rhs = TensorInfo::new(ElementType::F16, partial_shape!(2));
        assert_eq!(
            op.infer_types(&[lhs, rhs]),
            Err(InferError::TypeConflict(MergeConflict {
                a: ElementType::F32,
                b: ElementType::F16,
            }))
        );
    }

    #[test]
    fn test_binary_shape_conflict() {
        let lhs = TensorInfo::new(ElementType::F32, partial_shape!(2, 3));
        let rhs = TensorInfo::new(ElementType::F32, partial_shape!(1, 3));

        let op = BinaryElementwise {
            broadcast: AutoBroadcast::None,
        };
        assert_eq!(
            op.infer_types(&[lhs.clone(), rhs.clone()]),
            Err(InferError::ShapeConflict(ShapeConflict {
                lhs: lhs.shape.clone(),
                rhs: rhs.shape.clone(),
            }))
        );

        // The same shapes are compatible under broadcasting.
        let op = BinaryElementwise {
            broadcast: AutoBroadcast::Numpy,
        };
        assert_eq!(op.infer_types(&[lhs.clone(), rhs]).unwrap().shape, lhs.shape);
    }

    #[test]
    fn test_binary_input_count() {
        let input = TensorInfo::new(ElementType::F32, partial_shape!(2));
        let err = BinaryElementwise::default()
            .infer_types(&[input])
            .err()
            .unwrap();
        assert_eq!(
            err,
            InferError::IncorrectInputCount {
                expected: 2,
                actual: 1
            }
        );
    }
}

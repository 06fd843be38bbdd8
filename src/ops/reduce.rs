use std::fmt;

use smallvec::SmallVec;

use crate::axes::{validate_axes, AxisSet};
use crate::dimension::Dimension;
use crate::element_type::ElementType;
use crate::errors::InferError;
use crate::infer::{single_input, InferTypes, TensorInfo};
use crate::shape::PartialShape;

/// The combining operation applied by a reduction.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum ReductionKind {
    Max,
    Min,
    Sum,
    Prod,
    LogicalAnd,
    LogicalOr,
}

impl ReductionKind {
    pub fn name(self) -> &'static str {
        match self {
            ReductionKind::Max => "ReduceMax",
            ReductionKind::Min => "ReduceMin",
            ReductionKind::Sum => "ReduceSum",
            ReductionKind::Prod => "ReduceProd",
            ReductionKind::LogicalAnd => "ReduceLogicalAnd",
            ReductionKind::LogicalOr => "ReduceLogicalOr",
        }
    }

    pub fn is_logical(self) -> bool {
        matches!(self, ReductionKind::LogicalAnd | ReductionKind::LogicalOr)
    }

    /// Check that this reduction supports inputs of a given element type.
    ///
    /// Arithmetic reductions reject boolean inputs. Logical reductions
    /// require them. `Dynamic` is accepted by both.
    pub fn check_element_type(self, element_type: ElementType) -> Result<(), InferError> {
        let supported = if self.is_logical() {
            matches!(element_type, ElementType::Boolean | ElementType::Dynamic)
        } else {
            element_type != ElementType::Boolean
        };
        if supported {
            Ok(())
        } else {
            Err(InferError::InvalidElementType {
                op: self.name(),
                element_type,
                expected: if self.is_logical() {
                    "boolean"
                } else {
                    "numeric"
                },
            })
        }
    }

    /// Return the value that every output element takes when reducing over
    /// zero elements.
    ///
    /// Returns `None` if the element type is not concrete or is not supported
    /// by this reduction.
    ///
    /// | Kind | Floats | Integers | Boolean |
    /// |------|--------|----------|---------|
    /// | Max | -inf | type minimum | - |
    /// | Min | +inf | type maximum | - |
    /// | Sum | 0 | 0 | - |
    /// | Prod | 1 | 1 | - |
    /// | LogicalAnd | - | - | true |
    /// | LogicalOr | - | - | false |
    pub fn identity(self, element_type: ElementType) -> Option<Scalar> {
        if !element_type.is_static() || self.check_element_type(element_type).is_err() {
            return None;
        }

        use ReductionKind::*;
        let value = match (self, element_type) {
            (LogicalAnd, _) => Scalar::Bool(true),
            (LogicalOr, _) => Scalar::Bool(false),

            // Half-precision values as IEEE 754 / bfloat16 bit patterns.
            (Max, ElementType::BF16) => Scalar::BF16(0xFF80),
            (Min, ElementType::BF16) => Scalar::BF16(0x7F80),
            (Sum, ElementType::BF16) => Scalar::BF16(0x0000),
            (Prod, ElementType::BF16) => Scalar::BF16(0x3F80),
            (Max, ElementType::F16) => Scalar::F16(0xFC00),
            (Min, ElementType::F16) => Scalar::F16(0x7C00),
            (Sum, ElementType::F16) => Scalar::F16(0x0000),
            (Prod, ElementType::F16) => Scalar::F16(0x3C00),

            (Max, ElementType::U1) | (Sum, ElementType::U1) => Scalar::U1(0),
            (Min, ElementType::U1) | (Prod, ElementType::U1) => Scalar::U1(1),

            (kind, ty) => {
                macro_rules! identity_of {
                    ($variant:ident, $type:ty) => {
                        Scalar::$variant(<$type as ReduceElement>::identity(kind))
                    };
                }
                match ty {
                    ElementType::F32 => identity_of!(F32, f32),
                    ElementType::F64 => identity_of!(F64, f64),
                    ElementType::I8 => identity_of!(I8, i8),
                    ElementType::I16 => identity_of!(I16, i16),
                    ElementType::I32 => identity_of!(I32, i32),
                    ElementType::I64 => identity_of!(I64, i64),
                    ElementType::U8 => identity_of!(U8, u8),
                    ElementType::U16 => identity_of!(U16, u16),
                    ElementType::U32 => identity_of!(U32, u32),
                    ElementType::U64 => identity_of!(U64, u64),
                    _ => return None,
                }
            }
        };
        Some(value)
    }
}

impl fmt::Display for ReductionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single value of any concrete element type.
///
/// Half-precision kinds store their raw bit pattern.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Scalar {
    Bool(bool),
    BF16(u16),
    F16(u16),
    F32(f32),
    F64(f64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U1(u8),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
}

impl Scalar {
    pub fn element_type(self) -> ElementType {
        match self {
            Scalar::Bool(_) => ElementType::Boolean,
            Scalar::BF16(_) => ElementType::BF16,
            Scalar::F16(_) => ElementType::F16,
            Scalar::F32(_) => ElementType::F32,
            Scalar::F64(_) => ElementType::F64,
            Scalar::I8(_) => ElementType::I8,
            Scalar::I16(_) => ElementType::I16,
            Scalar::I32(_) => ElementType::I32,
            Scalar::I64(_) => ElementType::I64,
            Scalar::U1(_) => ElementType::U1,
            Scalar::U8(_) => ElementType::U8,
            Scalar::U16(_) => ElementType::U16,
            Scalar::U32(_) => ElementType::U32,
            Scalar::U64(_) => ElementType::U64,
        }
    }
}

/// Element types which the reference reduction kernels support.
pub trait ReduceElement: Copy + PartialOrd + Send + Sync {
    /// Return the identity of `kind` for this type.
    ///
    /// Must only be called for kinds that [`ReductionKind::check_element_type`]
    /// accepts for this type.
    fn identity(kind: ReductionKind) -> Self;

    /// Combine an accumulated value with the next element.
    fn combine(kind: ReductionKind, acc: Self, value: Self) -> Self;
}

macro_rules! impl_reduce_element_num {
    ($type:ty, $lowest:expr, $highest:expr, $add:expr, $mul:expr) => {
        impl ReduceElement for $type {
            fn identity(kind: ReductionKind) -> Self {
                match kind {
                    ReductionKind::Max => $lowest,
                    ReductionKind::Min => $highest,
                    ReductionKind::Sum => 0 as $type,
                    ReductionKind::Prod => 1 as $type,
                    ReductionKind::LogicalAnd | ReductionKind::LogicalOr => {
                        unreachable!("logical reductions require boolean inputs")
                    }
                }
            }

            fn combine(kind: ReductionKind, acc: Self, value: Self) -> Self {
                match kind {
                    ReductionKind::Max => {
                        if value > acc {
                            value
                        } else {
                            acc
                        }
                    }
                    ReductionKind::Min => {
                        if value < acc {
                            value
                        } else {
                            acc
                        }
                    }
                    ReductionKind::Sum => $add(acc, value),
                    ReductionKind::Prod => $mul(acc, value),
                    ReductionKind::LogicalAnd | ReductionKind::LogicalOr => {
                        unreachable!("logical reductions require boolean inputs")
                    }
                }
            }
        }
    };
}

macro_rules! impl_reduce_element_float {
    ($type:ty) => {
        impl_reduce_element_num!(
            $type,
            <$type>::NEG_INFINITY,
            <$type>::INFINITY,
            <$type as std::ops::Add>::add,
            <$type as std::ops::Mul>::mul
        );
    };
}

// Integer sums and products wrap on overflow.
macro_rules! impl_reduce_element_int {
    ($type:ty) => {
        impl_reduce_element_num!(
            $type,
            <$type>::MIN,
            <$type>::MAX,
            <$type>::wrapping_add,
            <$type>::wrapping_mul
        );
    };
}

impl_reduce_element_float!(f32);
impl_reduce_element_float!(f64);
impl_reduce_element_int!(i8);
impl_reduce_element_int!(i16);
impl_reduce_element_int!(i32);
impl_reduce_element_int!(i64);
impl_reduce_element_int!(u8);
impl_reduce_element_int!(u16);
impl_reduce_element_int!(u32);
impl_reduce_element_int!(u64);

impl ReduceElement for bool {
    fn identity(kind: ReductionKind) -> Self {
        match kind {
            ReductionKind::LogicalAnd => true,
            ReductionKind::LogicalOr => false,
            ReductionKind::Max | ReductionKind::Min | ReductionKind::Sum | ReductionKind::Prod => {
                unreachable!("arithmetic reductions require numeric inputs")
            }
        }
    }

    fn combine(kind: ReductionKind, acc: Self, value: Self) -> Self {
        match kind {
            ReductionKind::LogicalAnd => acc && value,
            ReductionKind::LogicalOr => acc || value,
            ReductionKind::Max | ReductionKind::Min | ReductionKind::Sum | ReductionKind::Prod => {
                unreachable!("arithmetic reductions require numeric inputs")
            }
        }
    }
}

/// Compute the output shape of a reduction over `axes`.
///
/// `axes` must already have been validated against the rank of `shape`.
pub fn reduce_shape(shape: &PartialShape, axes: &AxisSet, keep_dims: bool) -> PartialShape {
    let Some(dims) = shape.dims() else {
        return PartialShape::unknown();
    };

    dims.iter()
        .enumerate()
        .filter_map(|(i, &dim)| {
            if !axes.contains(i) {
                Some(dim)
            } else if keep_dims {
                Some(Dimension::Known(1))
            } else {
                None
            }
        })
        .collect()
}

/// Inference for reduction operators (ReduceMax, ReduceSum etc.)
///
/// The output has the same element type as the input. Reduced dimensions are
/// removed, or retained with size 1 if `keep_dims` is set.
#[derive(Clone, Debug, PartialEq)]
pub struct Reduce {
    pub kind: ReductionKind,

    /// Axes to reduce over. Negative values count from the last dimension.
    /// An empty list reduces nothing.
    pub axes: SmallVec<[i64; 4]>,

    /// True if the reduced dimensions are retained with size 1.
    pub keep_dims: bool,
}

impl Reduce {
    pub fn new(kind: ReductionKind, axes: &[i64], keep_dims: bool) -> Reduce {
        Reduce {
            kind,
            axes: SmallVec::from_slice(axes),
            keep_dims,
        }
    }
}

impl InferTypes for Reduce {
    fn infer_types(&self, inputs: &[TensorInfo]) -> Result<TensorInfo, InferError> {
        let data = single_input(inputs)?;
        self.kind.check_element_type(data.element_type)?;

        let axes = validate_axes(data.shape.rank(), &self.axes)?;
        if !data.shape.rank().is_static() {
            tracing::debug!(op = self.kind.name(), "input rank is unknown");
        }

        Ok(TensorInfo {
            element_type: data.element_type,
            shape: reduce_shape(&data.shape, &axes, self.keep_dims),
        })
    }
}

#[cfg(test)]
mod tests {
    use tessera_testing::TestCases;

    use super::{Reduce, ReductionKind, Scalar};
    use crate::element_type::ElementType;
    use crate::errors::{AxisOutOfBounds, InferError};
    use crate::infer::{InferTypes, TensorInfo};
    use crate::partial_shape;
    use crate::shape::PartialShape;

    #[test]
    fn test_reduce_shape() {
        #[derive(Debug)]
        struct Case {
            input: PartialShape,
            axes: Vec<i64>,
            keep_dims: bool,
            expected: PartialShape,
        }

        let cases = [
            Case {
                input: partial_shape!(3, 3, 3),
                axes: vec![0],
                keep_dims: false,
                expected: partial_shape!(3, 3),
            },
            Case {
                input: partial_shape!(3, 3, 3),
                axes: vec![0, 1],
                keep_dims: false,
                expected: partial_shape!(3),
            },
            Case {
                input: partial_shape!(3, 3, 3),
                axes: vec![0, 1, 2],
                keep_dims: false,
                expected: partial_shape!(),
            },
            Case {
                input: partial_shape!(3, 3, 3),
                axes: vec![2],
                keep_dims: true,
                expected: partial_shape!(3, 3, 1),
            },
            Case {
                input: partial_shape!(2, 3, 4),
                axes: vec![-1, 0],
                keep_dims: true,
                expected: partial_shape!(1, 3, 1),
            },
            // Zero-sized dims reduce like any other.
            Case {
                input: partial_shape!(3, 0),
                axes: vec![1],
                keep_dims: false,
                expected: partial_shape!(3),
            },
            Case {
                input: partial_shape!(0, 0),
                axes: vec![0, 1],
                keep_dims: true,
                expected: partial_shape!(1, 1),
            },
            // Unknown dims are preserved or replaced.
            Case {
                input: partial_shape!(?, 4, ?),
                axes: vec![2],
                keep_dims: false,
                expected: partial_shape!(?, 4),
            },
            Case {
                input: partial_shape!(?, 4, ?),
                axes: vec![0],
                keep_dims: true,
                expected: partial_shape!(1, 4, ?),
            },
            Case {
                input: partial_shape!(5, 6),
                axes: vec![],
                keep_dims: false,
                expected: partial_shape!(5, 6),
            },
            Case {
                input: PartialShape::unknown(),
                axes: vec![0, 7],
                keep_dims: true,
                expected: PartialShape::unknown(),
            },
        ];

        cases.test_each(|case| {
            let op = Reduce::new(ReductionKind::Max, &case.axes, case.keep_dims);
            let input = TensorInfo::new(ElementType::F32, case.input.clone());
            let output = op.infer_types(&[input]).unwrap();
            assert_eq!(output.element_type, ElementType::F32);
            assert_eq!(output.shape, case.expected);
        })
    }

    #[test]
    fn test_reduce_axis_out_of_bounds() {
        let op = Reduce::new(ReductionKind::Sum, &[0, 3], false);
        let input = TensorInfo::new(ElementType::I32, partial_shape!(2, ?, 4));
        let err = op.infer_types(&[input]).err().unwrap();
        assert_eq!(
            err,
            InferError::AxisOutOfBounds(AxisOutOfBounds {
                offending_axes: vec![3],
                rank: 3,
            })
        );
    }

    #[test]
    fn test_reduce_element_types() {
        let boolean = TensorInfo::new(ElementType::Boolean, partial_shape!(4));
        let float = TensorInfo::new(ElementType::F32, partial_shape!(4));
        let dynamic = TensorInfo::new(ElementType::Dynamic, partial_shape!(4));

        let sum = Reduce::new(ReductionKind::Sum, &[0], false);
        let err = sum.infer_types(&[boolean.clone()]).err().unwrap();
        assert_eq!(
            err.to_string(),
            "ReduceSum expects numeric input but the element type is boolean"
        );
        assert!(sum.infer_types(&[dynamic.clone()]).is_ok());

        let all = Reduce::new(ReductionKind::LogicalAnd, &[0], false);
        assert!(all.infer_types(&[boolean]).is_ok());
        assert!(all.infer_types(&[dynamic]).is_ok());
        assert!(matches!(
            all.infer_types(&[float]),
            Err(InferError::InvalidElementType { .. })
        ));
    }

    #[test]
    fn test_reduce_input_count() {
        let op = Reduce::new(ReductionKind::Max, &[0], false);
        let input = TensorInfo::new(ElementType::F32, partial_shape!(4));
        assert_eq!(
            op.infer_types(&[input.clone(), input]),
            Err(InferError::IncorrectInputCount {
                expected: 1,
                actual: 2
            })
        );
    }

    #[test]
    fn test_identity() {
        #[derive(Debug)]
        struct Case {
            kind: ReductionKind,
            ty: ElementType,
            expected: Option<Scalar>,
        }

        let cases = [
            Case {
                kind: ReductionKind::Max,
                ty: ElementType::F32,
                expected: Some(Scalar::F32(f32::NEG_INFINITY)),
            },
            Case {
                kind: ReductionKind::Min,
                ty: ElementType::F64,
                expected: Some(Scalar::F64(f64::INFINITY)),
            },
            Case {
                kind: ReductionKind::Max,
                ty: ElementType::I32,
                expected: Some(Scalar::I32(i32::MIN)),
            },
            Case {
                kind: ReductionKind::Min,
                ty: ElementType::U8,
                expected: Some(Scalar::U8(u8::MAX)),
            },
            Case {
                kind: ReductionKind::Max,
                ty: ElementType::U64,
                expected: Some(Scalar::U64(0)),
            },
            Case {
                kind: ReductionKind::Sum,
                ty: ElementType::I16,
                expected: Some(Scalar::I16(0)),
            },
            Case {
                kind: ReductionKind::Prod,
                ty: ElementType::F32,
                expected: Some(Scalar::F32(1.)),
            },
            Case {
                kind: ReductionKind::Max,
                ty: ElementType::F16,
                expected: Some(Scalar::F16(0xFC00)),
            },
            Case {
                kind: ReductionKind::Prod,
                ty: ElementType::BF16,
                expected: Some(Scalar::BF16(0x3F80)),
            },
            Case {
                kind: ReductionKind::Min,
                ty: ElementType::U1,
                expected: Some(Scalar::U1(1)),
            },
            Case {
                kind: ReductionKind::LogicalAnd,
                ty: ElementType::Boolean,
                expected: Some(Scalar::Bool(true)),
            },
            Case {
                kind: ReductionKind::LogicalOr,
                ty: ElementType::Boolean,
                expected: Some(Scalar::Bool(false)),
            },
            Case {
                kind: ReductionKind::Max,
                ty: ElementType::Dynamic,
                expected: None,
            },
            Case {
                kind: ReductionKind::Sum,
                ty: ElementType::Boolean,
                expected: None,
            },
            Case {
                kind: ReductionKind::LogicalOr,
                ty: ElementType::I8,
                expected: None,
            },
        ];

        cases.test_each(|case| {
            let identity = case.kind.identity(case.ty);
            assert_eq!(identity, case.expected);
            if let Some(identity) = identity {
                assert_eq!(identity.element_type(), case.ty);
            }
        })
    }
}

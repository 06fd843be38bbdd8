//! Minimal owned tensor used by the reference kernels.

use std::error::Error;
use std::fmt;

use crate::element_type::{Element, ElementType};
use crate::infer::TensorInfo;
use crate::shape::Shape;

/// Errors that can occur when constructing a tensor from existing data.
#[derive(Clone, Debug, PartialEq)]
pub enum FromDataError {
    /// Some indices will map to offsets that are beyond the end of the storage.
    StorageLengthMismatch { shape: Shape, len: usize },

    /// The number of elements in the shape overflows `usize`.
    TooManyElements { shape: Shape },
}

impl fmt::Display for FromDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FromDataError::StorageLengthMismatch { shape, len } => write!(
                f,
                "data length {} does not match shape {} ({} elements)",
                len,
                shape,
                shape.num_elements()
            ),
            FromDataError::TooManyElements { shape } => {
                write!(f, "number of elements in shape {} is too large", shape)
            }
        }
    }
}

impl Error for FromDataError {}

/// N-dimensional array with contiguous, row-major storage.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor<T> {
    shape: Shape,
    data: Vec<T>,
}

impl<T> Tensor<T> {
    /// Create a tensor from a shape and row-major data.
    pub fn from_data(shape: impl Into<Shape>, data: Vec<T>) -> Result<Tensor<T>, FromDataError> {
        let shape = shape.into();
        let Some(num_elements) = shape.checked_num_elements() else {
            return Err(FromDataError::TooManyElements { shape });
        };
        if num_elements != data.len() {
            return Err(FromDataError::StorageLengthMismatch {
                shape,
                len: data.len(),
            });
        }
        Ok(Tensor { shape, data })
    }

    /// Create a tensor from data whose length is known to match `shape`.
    pub(crate) fn from_vec_unchecked(shape: Shape, data: Vec<T>) -> Tensor<T> {
        debug_assert_eq!(shape.num_elements(), data.len());
        Tensor { shape, data }
    }

    /// Create a tensor with every element set to `value`.
    ///
    /// Panics if the number of elements overflows `usize`.
    pub fn full(shape: impl Into<Shape>, value: T) -> Tensor<T>
    where
        T: Clone,
    {
        let shape = shape.into();
        let data = vec![value; shape.num_elements()];
        Tensor { shape, data }
    }

    /// Create a scalar (rank 0) tensor.
    pub fn from_scalar(value: T) -> Tensor<T> {
        Tensor {
            shape: Shape::scalar(),
            data: vec![value],
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    /// Return the total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Return the elements in row-major order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Return the row-major strides of each dimension.
    pub fn strides(&self) -> Vec<usize> {
        contiguous_strides(self.shape.dims())
    }

    /// Return the element at a given index, or `None` if the index is out of
    /// bounds.
    pub fn get(&self, index: &[usize]) -> Option<&T> {
        if index.len() != self.ndim() {
            return None;
        }
        let mut offset = 0;
        for ((&i, &size), stride) in index
            .iter()
            .zip(self.shape.dims())
            .zip(self.strides())
        {
            if i >= size {
                return None;
            }
            offset += i * stride;
        }
        self.data.get(offset)
    }
}

impl<T: Element> Tensor<T> {
    /// Return the static element type and shape of this tensor.
    pub fn info(&self) -> TensorInfo {
        TensorInfo::new(ElementType::of::<T>(), &self.shape)
    }
}

/// Return the strides of a contiguous row-major layout with a given shape.
pub(crate) fn contiguous_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    let mut stride: usize = 1;
    for (dim, &size) in shape.iter().enumerate().rev() {
        strides[dim] = stride;
        stride = stride.saturating_mul(size.max(1));
    }
    strides
}

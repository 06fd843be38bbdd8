//! Fully and partially known tensor shapes.

use std::fmt;

use smallvec::SmallVec;

use crate::dimension::Dimension;
use crate::errors::ShapeConflict;

/// Rank of a [`PartialShape`].
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Rank {
    Unknown,
    Known(usize),
}

impl Rank {
    /// Return the rank, if known.
    pub fn get(self) -> Option<usize> {
        match self {
            Rank::Known(n) => Some(n),
            Rank::Unknown => None,
        }
    }

    pub fn is_static(self) -> bool {
        matches!(self, Rank::Known(_))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Known(n) => write!(f, "{}", n),
            Rank::Unknown => write!(f, "?"),
        }
    }
}

/// Write a brace-delimited, comma-separated list (eg. "{2, 3}").
fn fmt_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    write!(f, "{{")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "}}")
}

/// A shape with a known rank and known dimension sizes.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Shape(SmallVec<[usize; 4]>);

impl Shape {
    pub fn new(dims: &[usize]) -> Shape {
        Shape(SmallVec::from_slice(dims))
    }

    /// Return the shape of a scalar (rank 0).
    pub fn scalar() -> Shape {
        Shape(SmallVec::new())
    }

    pub fn ndim(&self) -> usize {
        self.0.len()
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Return the number of elements in a tensor with this shape.
    ///
    /// Panics if the count overflows `usize`. Use
    /// [`checked_num_elements`](Shape::checked_num_elements) for shapes from
    /// untrusted sources.
    pub fn num_elements(&self) -> usize {
        self.0.iter().product()
    }

    /// Return the number of elements in a tensor with this shape, or `None`
    /// if the count overflows `usize`.
    pub fn checked_num_elements(&self) -> Option<usize> {
        if self.0.contains(&0) {
            return Some(0);
        }
        self.0
            .iter()
            .try_fold(1usize, |count, &size| count.checked_mul(size))
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Shape {
        Shape::new(dims)
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Shape {
        Shape::new(&dims)
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Shape {
        Shape(dims.into())
    }
}

impl FromIterator<usize> for Shape {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Shape {
        Shape(iter.into_iter().collect())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_list(f, &self.0)
    }
}

/// A shape whose rank, or the sizes of individual dimensions, may be unknown.
///
/// A `PartialShape` with a known rank and all dimensions known is equivalent
/// to a [`Shape`]. See [`PartialShape::to_shape`].
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct PartialShape {
    /// Dimensions, or `None` if the rank is unknown.
    dims: Option<SmallVec<[Dimension; 4]>>,
}

impl PartialShape {
    /// Create a shape with unknown rank.
    pub fn unknown() -> PartialShape {
        PartialShape { dims: None }
    }

    /// Create a shape with a known rank and the given dimensions.
    pub fn new(dims: &[Dimension]) -> PartialShape {
        PartialShape {
            dims: Some(SmallVec::from_slice(dims)),
        }
    }

    /// Create a shape of rank `ndim` where every dimension is unknown.
    pub fn with_unknown_dims(ndim: usize) -> PartialShape {
        PartialShape {
            dims: Some(SmallVec::from_elem(Dimension::Unknown, ndim)),
        }
    }

    pub fn rank(&self) -> Rank {
        match &self.dims {
            Some(dims) => Rank::Known(dims.len()),
            None => Rank::Unknown,
        }
    }

    /// Return the dimensions, or `None` if the rank is unknown.
    pub fn dims(&self) -> Option<&[Dimension]> {
        self.dims.as_deref()
    }

    /// Return true if the rank and all dimension sizes are known.
    pub fn is_static(&self) -> bool {
        self.dims
            .as_ref()
            .is_some_and(|dims| dims.iter().all(|d| d.is_static()))
    }

    /// Convert to a [`Shape`] if the rank and every dimension are known.
    pub fn to_shape(&self) -> Option<Shape> {
        self.dims.as_ref()?.iter().map(|d| d.get()).collect()
    }

    /// Return true if the ranks match and corresponding dimensions are either
    /// both unknown or both known and equal.
    pub fn same_scheme(&self, other: &PartialShape) -> bool {
        match (&self.dims, &other.dims) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| a.same_scheme(*b))
            }
            _ => false,
        }
    }

    /// Return true if this shape can be merged with `other`.
    pub fn compatible(&self, other: &PartialShape) -> bool {
        self.merge(other).is_ok()
    }

    /// Merge two shapes into the most specific shape consistent with both.
    ///
    /// A shape with unknown rank merges to the other operand. Shapes with the
    /// same rank are merged dimension-wise using [`Dimension::merge`].
    pub fn merge(&self, other: &PartialShape) -> Result<PartialShape, ShapeConflict> {
        let (Some(a), Some(b)) = (&self.dims, &other.dims) else {
            return Ok(if self.dims.is_none() {
                other.clone()
            } else {
                self.clone()
            });
        };

        let conflict = || ShapeConflict {
            lhs: self.clone(),
            rhs: other.clone(),
        };

        if a.len() != b.len() {
            return Err(conflict());
        }

        let dims = a
            .iter()
            .zip(b.iter())
            .map(|(a, b)| a.merge(*b))
            .collect::<Result<SmallVec<_>, _>>()
            .map_err(|_| conflict())?;

        Ok(PartialShape { dims: Some(dims) })
    }

    /// Compute the shape produced by broadcasting two shapes together using
    /// NumPy-style rules.
    ///
    /// Shapes are aligned on their last dimension and the shorter shape is
    /// padded with 1s. Corresponding dimensions must either be equal, or one
    /// of them must be 1. If either rank is unknown, the result has unknown
    /// rank.
    pub fn broadcast_merge(&self, other: &PartialShape) -> Result<PartialShape, ShapeConflict> {
        let (Some(a), Some(b)) = (&self.dims, &other.dims) else {
            return Ok(PartialShape::unknown());
        };

        let out_ndim = a.len().max(b.len());
        let a_pad = out_ndim - a.len();
        let b_pad = out_ndim - b.len();
        let one = Dimension::Known(1);

        let a_iter = std::iter::repeat(one).take(a_pad).chain(a.iter().copied());
        let b_iter = std::iter::repeat(one).take(b_pad).chain(b.iter().copied());

        let mut dims = SmallVec::with_capacity(out_ndim);
        for (a, b) in a_iter.zip(b_iter) {
            let dim = match (a, b) {
                (a, b) if a == b => a,

                // Size-1 dims are broadcast against the other size.
                (Dimension::Known(1), b) => b,
                (a, Dimension::Known(1)) => a,

                // Execution can only succeed if the unknown size matches.
                (Dimension::Unknown, known) | (known, Dimension::Unknown) => known,

                (Dimension::Known(_), Dimension::Known(_)) => {
                    return Err(ShapeConflict {
                        lhs: self.clone(),
                        rhs: other.clone(),
                    });
                }
            };
            dims.push(dim);
        }

        Ok(PartialShape { dims: Some(dims) })
    }
}

impl From<Shape> for PartialShape {
    fn from(shape: Shape) -> PartialShape {
        PartialShape {
            dims: Some(shape.0.into_iter().map(Dimension::Known).collect()),
        }
    }
}

impl From<&Shape> for PartialShape {
    fn from(shape: &Shape) -> PartialShape {
        shape.clone().into()
    }
}

impl From<&[Dimension]> for PartialShape {
    fn from(dims: &[Dimension]) -> PartialShape {
        PartialShape::new(dims)
    }
}

impl<const N: usize> From<[Dimension; N]> for PartialShape {
    fn from(dims: [Dimension; N]) -> PartialShape {
        PartialShape::new(&dims)
    }
}

impl<const N: usize> From<[usize; N]> for PartialShape {
    fn from(dims: [usize; N]) -> PartialShape {
        Shape::from(dims).into()
    }
}

impl FromIterator<Dimension> for PartialShape {
    fn from_iter<I: IntoIterator<Item = Dimension>>(iter: I) -> PartialShape {
        PartialShape {
            dims: Some(iter.into_iter().collect()),
        }
    }
}

impl fmt::Display for PartialShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.dims {
            Some(dims) => fmt_list(f, dims),
            None => write!(f, "?"),
        }
    }
}

/// Construct a [`PartialShape`] from a list of sizes, where `?` denotes an
/// unknown dimension.
///
/// ```
/// use tessera::{partial_shape, Dimension, PartialShape};
///
/// let shape = partial_shape!(?, 3, ?);
/// assert_eq!(
///     shape,
///     PartialShape::new(&[Dimension::Unknown, Dimension::Known(3), Dimension::Unknown])
/// );
/// ```
#[macro_export]
macro_rules! partial_shape {
    (@dim ?) => {
        $crate::Dimension::Unknown
    };
    (@dim $size:expr) => {
        $crate::Dimension::Known($size)
    };
    ($($dim:tt),* $(,)?) => {
        $crate::PartialShape::new(&[$($crate::partial_shape!(@dim $dim)),*])
    };
}

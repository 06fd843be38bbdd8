use std::fmt;

use crate::errors::DimConflict;

/// Extent of a single tensor dimension, which may be unknown until runtime.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum Dimension {
    /// A dimension whose size is known.
    Known(usize),

    /// A dimension whose size is determined at runtime.
    #[default]
    Unknown,
}

impl Dimension {
    /// Return the size of this dimension, if known.
    pub fn get(self) -> Option<usize> {
        match self {
            Dimension::Known(size) => Some(size),
            Dimension::Unknown => None,
        }
    }

    pub fn is_static(self) -> bool {
        matches!(self, Dimension::Known(_))
    }

    /// Return true if both dimensions are unknown, or both are known and
    /// equal.
    pub fn same_scheme(self, other: Dimension) -> bool {
        self == other
    }

    /// Return true if this dimension can be merged with `other`.
    pub fn compatible(self, other: Dimension) -> bool {
        self.merge(other).is_ok()
    }

    /// Merge two dimensions into the most specific dimension consistent with
    /// both.
    ///
    /// An unknown dimension merges to the other operand. Two known dimensions
    /// merge only if they are equal.
    pub fn merge(self, other: Dimension) -> Result<Dimension, DimConflict> {
        match (self, other) {
            (Dimension::Unknown, dim) | (dim, Dimension::Unknown) => Ok(dim),
            (Dimension::Known(a), Dimension::Known(b)) if a == b => Ok(self),
            (Dimension::Known(a), Dimension::Known(b)) => Err(DimConflict { a, b }),
        }
    }
}

impl From<usize> for Dimension {
    fn from(size: usize) -> Dimension {
        Dimension::Known(size)
    }
}

impl From<Option<usize>> for Dimension {
    fn from(size: Option<usize>) -> Dimension {
        size.map(Dimension::Known).unwrap_or(Dimension::Unknown)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Known(size) => write!(f, "{}", size),
            Dimension::Unknown => write!(f, "?"),
        }
    }
}

//! Element types of tensor values.
//!
//! [`ElementType`] is a closed set of scalar kinds. Besides the concrete
//! numeric and boolean kinds it includes two sentinels: `Dynamic`, meaning
//! "not known yet", and `Undefined`. Element types flowing along graph edges
//! are unified using [`ElementType::merge`].

use std::fmt;
use std::str::FromStr;

use crate::errors::{InvalidAttributeQuery, MergeConflict};

/// Scalar kind of the elements of a tensor.
///
/// The ordering of variants is used for `Ord`, which exists only so that
/// element types can be used as keys in ordered collections. It does not
/// reflect any numeric relationship between kinds.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ElementType {
    #[default]
    Undefined,
    Dynamic,
    Boolean,
    BF16,
    F16,
    F32,
    F64,
    I8,
    I16,
    I32,
    I64,
    U1,
    U8,
    U16,
    U32,
    U64,
}

/// Fixed attributes of a concrete element type.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ElementTypeAttrs {
    pub bitwidth: usize,
    pub is_real: bool,
    pub is_signed: bool,
    pub is_quantized: bool,

    /// Name of the C type used to store elements of this kind.
    pub c_type_name: &'static str,
}

impl ElementTypeAttrs {
    const fn new(
        bitwidth: usize,
        is_real: bool,
        is_signed: bool,
        is_quantized: bool,
        c_type_name: &'static str,
    ) -> Self {
        ElementTypeAttrs {
            bitwidth,
            is_real,
            is_signed,
            is_quantized,
            c_type_name,
        }
    }
}

/// Attribute table for concrete kinds, indexed by `ElementType as usize - 2`.
const CONCRETE_ATTRS: [ElementTypeAttrs; 14] = [
    ElementTypeAttrs::new(8, false, true, false, "char"),
    ElementTypeAttrs::new(16, true, true, false, "bfloat16"),
    ElementTypeAttrs::new(16, true, true, false, "float16"),
    ElementTypeAttrs::new(32, true, true, false, "float"),
    ElementTypeAttrs::new(64, true, true, false, "double"),
    ElementTypeAttrs::new(8, false, true, true, "int8_t"),
    ElementTypeAttrs::new(16, false, true, false, "int16_t"),
    ElementTypeAttrs::new(32, false, true, true, "int32_t"),
    ElementTypeAttrs::new(64, false, true, false, "int64_t"),
    ElementTypeAttrs::new(1, false, false, false, "uint8_t"),
    ElementTypeAttrs::new(8, false, false, true, "uint8_t"),
    ElementTypeAttrs::new(16, false, false, false, "uint16_t"),
    ElementTypeAttrs::new(32, false, false, false, "uint32_t"),
    ElementTypeAttrs::new(64, false, false, false, "uint64_t"),
];

impl ElementType {
    /// All element types, in enumeration order.
    pub const ALL: [ElementType; 16] = [
        ElementType::Undefined,
        ElementType::Dynamic,
        ElementType::Boolean,
        ElementType::BF16,
        ElementType::F16,
        ElementType::F32,
        ElementType::F64,
        ElementType::I8,
        ElementType::I16,
        ElementType::I32,
        ElementType::I64,
        ElementType::U1,
        ElementType::U8,
        ElementType::U16,
        ElementType::U32,
        ElementType::U64,
    ];

    /// Return the element type corresponding to the Rust scalar type `T`.
    pub fn of<T: Element>() -> ElementType {
        T::ELEMENT_TYPE
    }

    /// Return the fixed attributes of this kind.
    ///
    /// Fails for `Undefined` and `Dynamic`, which carry no attributes.
    pub fn attributes(self) -> Result<ElementTypeAttrs, InvalidAttributeQuery> {
        match self {
            ElementType::Undefined | ElementType::Dynamic => {
                Err(InvalidAttributeQuery { element_type: self })
            }
            concrete => Ok(CONCRETE_ATTRS[concrete as usize - 2]),
        }
    }

    /// Return true if this is a concrete kind (not `Undefined` or `Dynamic`).
    pub fn is_static(self) -> bool {
        !matches!(self, ElementType::Undefined | ElementType::Dynamic)
    }

    pub fn is_dynamic(self) -> bool {
        self == ElementType::Dynamic
    }

    pub fn bitwidth(self) -> Result<usize, InvalidAttributeQuery> {
        self.attributes().map(|attrs| attrs.bitwidth)
    }

    /// Return the number of bytes needed to store one element.
    ///
    /// Sub-byte kinds round up to one byte.
    pub fn size(self) -> Result<usize, InvalidAttributeQuery> {
        self.bitwidth().map(|bits| bits.div_ceil(8))
    }

    pub fn is_real(self) -> Result<bool, InvalidAttributeQuery> {
        self.attributes().map(|attrs| attrs.is_real)
    }

    pub fn is_integral(self) -> Result<bool, InvalidAttributeQuery> {
        self.is_real().map(|real| !real)
    }

    /// Return true for integer kinds, excluding `Boolean`.
    pub fn is_integral_number(self) -> Result<bool, InvalidAttributeQuery> {
        Ok(self.is_integral()? && self != ElementType::Boolean)
    }

    pub fn is_signed(self) -> Result<bool, InvalidAttributeQuery> {
        self.attributes().map(|attrs| attrs.is_signed)
    }

    pub fn is_quantized(self) -> Result<bool, InvalidAttributeQuery> {
        self.attributes().map(|attrs| attrs.is_quantized)
    }

    /// Return the name of the C type used to store elements of this kind.
    pub fn c_type_name(self) -> Result<&'static str, InvalidAttributeQuery> {
        self.attributes().map(|attrs| attrs.c_type_name)
    }

    /// Return the canonical name of this kind (eg. "f32").
    pub fn name(self) -> &'static str {
        match self {
            ElementType::Undefined => "undefined",
            ElementType::Dynamic => "dynamic",
            ElementType::Boolean => "boolean",
            ElementType::BF16 => "bf16",
            ElementType::F16 => "f16",
            ElementType::F32 => "f32",
            ElementType::F64 => "f64",
            ElementType::I8 => "i8",
            ElementType::I16 => "i16",
            ElementType::I32 => "i32",
            ElementType::I64 => "i64",
            ElementType::U1 => "u1",
            ElementType::U8 => "u8",
            ElementType::U16 => "u16",
            ElementType::U32 => "u32",
            ElementType::U64 => "u64",
        }
    }

    /// Return true if this type can be merged with `other`.
    pub fn compatible(self, other: ElementType) -> bool {
        self == other || self.is_dynamic() || other.is_dynamic()
    }

    /// Merge two element types into the most specific type consistent with
    /// both.
    ///
    ///  - `merge(Dynamic, t)` and `merge(t, Dynamic)` produce `t`
    ///  - `merge(t, t)` produces `t`
    ///  - Any other combination is a conflict.
    ///
    /// `Undefined` only merges with itself or `Dynamic`.
    pub fn merge(self, other: ElementType) -> Result<ElementType, MergeConflict> {
        if self.is_dynamic() {
            Ok(other)
        } else if other.is_dynamic() || self == other {
            Ok(self)
        } else {
            Err(MergeConflict { a: self, b: other })
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unrecognized element type name.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseElementTypeError {
    name: String,
}

impl fmt::Display for ParseElementTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown element type \"{}\"", self.name)
    }
}

impl std::error::Error for ParseElementTypeError {}

impl FromStr for ElementType {
    type Err = ParseElementTypeError;

    /// Parse a canonical element type name, as produced by
    /// [`ElementType::name`].
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        ElementType::ALL
            .into_iter()
            .find(|ty| ty.name() == name)
            .ok_or_else(|| ParseElementTypeError {
                name: name.to_string(),
            })
    }
}

/// Rust scalar types which correspond to an [`ElementType`].
pub trait Element: Copy + Send + Sync + 'static {
    const ELEMENT_TYPE: ElementType;
}

macro_rules! impl_element {
    ($type:ty, $elem_type:ident) => {
        impl Element for $type {
            const ELEMENT_TYPE: ElementType = ElementType::$elem_type;
        }
    };
}

impl_element!(bool, Boolean);
impl_element!(f32, F32);
impl_element!(f64, F64);
impl_element!(i8, I8);
impl_element!(i16, I16);
impl_element!(i32, I32);
impl_element!(i64, I64);
impl_element!(u8, U8);
impl_element!(u16, U16);
impl_element!(u32, U32);
impl_element!(u64, U64);

#[cfg(test)]
mod tests {
    use tessera_testing::TestCases;

    use super::{ElementType, ElementTypeAttrs};
    use crate::errors::{InvalidAttributeQuery, MergeConflict};

    fn concrete_types() -> impl Iterator<Item = ElementType> {
        ElementType::ALL.into_iter().filter(|ty| ty.is_static())
    }

    #[test]
    fn test_attributes() {
        #[derive(Debug)]
        struct Case {
            ty: ElementType,
            bitwidth: usize,
            is_real: bool,
            is_signed: bool,
            is_quantized: bool,
        }

        let cases = [
            Case {
                ty: ElementType::Boolean,
                bitwidth: 8,
                is_real: false,
                is_signed: true,
                is_quantized: false,
            },
            Case {
                ty: ElementType::BF16,
                bitwidth: 16,
                is_real: true,
                is_signed: true,
                is_quantized: false,
            },
            Case {
                ty: ElementType::F32,
                bitwidth: 32,
                is_real: true,
                is_signed: true,
                is_quantized: false,
            },
            Case {
                ty: ElementType::I8,
                bitwidth: 8,
                is_real: false,
                is_signed: true,
                is_quantized: true,
            },
            Case {
                ty: ElementType::I64,
                bitwidth: 64,
                is_real: false,
                is_signed: true,
                is_quantized: false,
            },
            Case {
                ty: ElementType::U1,
                bitwidth: 1,
                is_real: false,
                is_signed: false,
                is_quantized: false,
            },
            Case {
                ty: ElementType::U8,
                bitwidth: 8,
                is_real: false,
                is_signed: false,
                is_quantized: true,
            },
            Case {
                ty: ElementType::U64,
                bitwidth: 64,
                is_real: false,
                is_signed: false,
                is_quantized: false,
            },
        ];

        cases.test_each(|case| {
            let ElementTypeAttrs {
                bitwidth,
                is_real,
                is_signed,
                is_quantized,
                ..
            } = case.ty.attributes().unwrap();
            assert_eq!(bitwidth, case.bitwidth);
            assert_eq!(is_real, case.is_real);
            assert_eq!(is_signed, case.is_signed);
            assert_eq!(is_quantized, case.is_quantized);
        })
    }

    #[test]
    fn test_sentinel_attributes_fail() {
        for ty in [ElementType::Undefined, ElementType::Dynamic] {
            let err = InvalidAttributeQuery { element_type: ty };
            assert!(!ty.is_static());
            assert_eq!(ty.attributes(), Err(err.clone()));
            assert_eq!(ty.bitwidth(), Err(err.clone()));
            assert_eq!(ty.is_signed(), Err(err));
        }
    }

    #[test]
    fn test_size() {
        assert_eq!(ElementType::U1.size(), Ok(1));
        assert_eq!(ElementType::Boolean.size(), Ok(1));
        assert_eq!(ElementType::F16.size(), Ok(2));
        assert_eq!(ElementType::F64.size(), Ok(8));
    }

    #[test]
    fn test_is_integral_number() {
        assert_eq!(ElementType::Boolean.is_integral_number(), Ok(false));
        assert_eq!(ElementType::I32.is_integral_number(), Ok(true));
        assert_eq!(ElementType::F32.is_integral_number(), Ok(false));
    }

    #[test]
    fn test_merge_identity() {
        for ty in concrete_types() {
            assert_eq!(ElementType::Dynamic.merge(ty), Ok(ty));
            assert_eq!(ty.merge(ElementType::Dynamic), Ok(ty));
        }
        assert_eq!(
            ElementType::Dynamic.merge(ElementType::Dynamic),
            Ok(ElementType::Dynamic)
        );
    }

    #[test]
    fn test_merge_idempotent() {
        for ty in ElementType::ALL {
            assert_eq!(ty.merge(ty), Ok(ty));
        }
    }

    #[test]
    fn test_merge_conflict() {
        for a in concrete_types() {
            for b in concrete_types().filter(|&b| b != a) {
                assert_eq!(a.merge(b), Err(MergeConflict { a, b }));
                assert!(!a.compatible(b));
            }
        }

        // `Undefined` behaves as an ordinary kind.
        assert_eq!(
            ElementType::Undefined.merge(ElementType::F32),
            Err(MergeConflict {
                a: ElementType::Undefined,
                b: ElementType::F32,
            })
        );
        assert_eq!(
            ElementType::Undefined.merge(ElementType::Dynamic),
            Ok(ElementType::Undefined)
        );
    }

    #[test]
    fn test_merge_associative() {
        for a in ElementType::ALL {
            for b in ElementType::ALL {
                for c in ElementType::ALL {
                    let lhs = a.merge(b).and_then(|ab| ab.merge(c)).ok();
                    let rhs = b.merge(c).and_then(|bc| a.merge(bc)).ok();
                    assert_eq!(lhs, rhs, "{} {} {}", a, b, c);
                }
            }
        }
    }

    #[test]
    fn test_compatible() {
        assert!(ElementType::F32.compatible(ElementType::F32));
        assert!(ElementType::F32.compatible(ElementType::Dynamic));
        assert!(ElementType::Dynamic.compatible(ElementType::I8));
        assert!(!ElementType::F32.compatible(ElementType::F64));
    }

    #[test]
    fn test_ordering_follows_declaration() {
        let mut sorted = ElementType::ALL;
        sorted.reverse();
        sorted.sort();
        assert_eq!(sorted, ElementType::ALL);
        assert!(ElementType::F64 < ElementType::I8);
    }

    #[test]
    fn test_name_round_trip() {
        for ty in ElementType::ALL {
            assert_eq!(ty.to_string().parse::<ElementType>(), Ok(ty));
        }
        let err = "float32".parse::<ElementType>().err().unwrap();
        assert_eq!(err.to_string(), "unknown element type \"float32\"");
    }

    #[test]
    fn test_of() {
        assert_eq!(ElementType::of::<f32>(), ElementType::F32);
        assert_eq!(ElementType::of::<bool>(), ElementType::Boolean);
        assert_eq!(ElementType::of::<u16>(), ElementType::U16);
        assert_eq!(ElementType::F32.c_type_name(), Ok("float"));
    }
}

use std::fmt;

use serde::de::{Deserialize, Deserializer, Error, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::axes::AxisSet;
use crate::dimension::Dimension;
use crate::element_type::ElementType;
use crate::shape::{PartialShape, Shape};
use crate::tensor::Tensor;

impl Serialize for ElementType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ElementType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<ElementType, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(D::Error::custom)
    }
}

impl Serialize for Dimension {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.get().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Dimension {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Dimension, D::Error> {
        Option::<usize>::deserialize(deserializer).map(Dimension::from)
    }
}

impl Serialize for Shape {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.dims().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Shape {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Shape, D::Error> {
        Vec::<usize>::deserialize(deserializer).map(Shape::from)
    }
}

impl Serialize for PartialShape {
    /// Serialize as `null` if the rank is unknown, or an array of dimensions
    /// otherwise.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.dims() {
            Some(dims) => serializer.collect_seq(dims),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for PartialShape {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<PartialShape, D::Error> {
        let dims = Option::<Vec<Dimension>>::deserialize(deserializer)?;
        Ok(match dims {
            Some(dims) => PartialShape::new(&dims),
            None => PartialShape::unknown(),
        })
    }
}

impl Serialize for AxisSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_slice().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AxisSet {
    /// Deserialize from an array of axes, which may be unsorted and contain
    /// duplicates.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<AxisSet, D::Error> {
        Vec::<usize>::deserialize(deserializer).map(|axes| axes.into_iter().collect())
    }
}

impl<T: Serialize> Serialize for Tensor<T> {
    fn serialize<Sr>(&self, serializer: Sr) -> Result<Sr::Ok, Sr::Error>
    where
        Sr: Serializer,
    {
        let mut tensor = serializer.serialize_struct("Tensor", 2)?;
        tensor.serialize_field("shape", self.shape())?;
        tensor.serialize_field("data", self.data())?;
        tensor.end()
    }
}

struct TensorVisitor<T> {
    marker: std::marker::PhantomData<T>,
}

impl<'de, T: Deserialize<'de>> Visitor<'de> for TensorVisitor<T> {
    type Value = Tensor<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a tensor with \"shape\" and \"data\" fields")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut data: Option<Vec<T>> = None;
        let mut shape: Option<Shape> = None;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "data" => {
                    if data.is_some() {
                        return Err(A::Error::duplicate_field("data"));
                    }
                    data = Some(map.next_value()?);
                }
                "shape" => {
                    if shape.is_some() {
                        return Err(A::Error::duplicate_field("shape"));
                    }
                    shape = Some(map.next_value()?);
                }
                _ => {
                    return Err(A::Error::unknown_field(&key, &["data", "shape"]));
                }
            }
        }

        let Some(shape) = shape else {
            return Err(A::Error::missing_field("shape"));
        };
        let Some(data) = data else {
            return Err(A::Error::missing_field("data"));
        };

        Tensor::from_data(shape, data).map_err(A::Error::custom)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Tensor<T> {
    fn deserialize<D>(deserializer: D) -> Result<Tensor<T>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_struct(
            "Tensor",
            &["shape", "data"],
            TensorVisitor::<T> {
                marker: std::marker::PhantomData,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::axes::AxisSet;
    use crate::dimension::Dimension;
    use crate::element_type::ElementType;
    use crate::partial_shape;
    use crate::shape::{PartialShape, Shape};
    use crate::tensor::Tensor;

    #[test]
    fn test_serialize() {
        assert_eq!(serde_json::to_value(ElementType::BF16).unwrap(), json!("bf16"));
        assert_eq!(serde_json::to_value(Dimension::Known(3)).unwrap(), json!(3));
        assert_eq!(serde_json::to_value(Dimension::Unknown).unwrap(), json!(null));
        assert_eq!(
            serde_json::to_value(partial_shape!(?, 4)).unwrap(),
            json!([null, 4])
        );
        assert_eq!(
            serde_json::to_value(PartialShape::unknown()).unwrap(),
            json!(null)
        );
        assert_eq!(serde_json::to_value(Shape::from([2, 3])).unwrap(), json!([2, 3]));
        assert_eq!(
            serde_json::to_value(AxisSet::from([2, 0])).unwrap(),
            json!([0, 2])
        );
    }

    #[test]
    fn test_deserialize() {
        let ty: ElementType = serde_json::from_str(r#""u1""#).unwrap();
        assert_eq!(ty, ElementType::U1);

        let err = serde_json::from_str::<ElementType>(r#""f8""#).err().unwrap();
        assert!(err.to_string().contains("unknown element type \"f8\""));

        let shape: PartialShape = serde_json::from_str("[2, null, 0]").unwrap();
        assert_eq!(shape, partial_shape!(2, ?, 0));

        let shape: PartialShape = serde_json::from_str("null").unwrap();
        assert_eq!(shape, PartialShape::unknown());

        let axes: AxisSet = serde_json::from_str("[3, 1, 3]").unwrap();
        assert_eq!(axes, AxisSet::from([1, 3]));
    }

    #[test]
    fn test_tensor() {
        struct Case<'a> {
            json: &'a str,
            expected: Result<Tensor<f32>, String>,
        }

        let cases = [
            Case {
                json: r#"{"data":[]}"#,
                expected: Err("missing field `shape`".into()),
            },
            Case {
                json: r#"{"shape":[0], "shape": [0]}"#,
                expected: Err("duplicate field `shape`".into()),
            },
            Case {
                json: r#"{"data": [1.0, 0.5, 2.0, 1.5], "shape": [2, 2]}"#,
                expected: Ok(Tensor::from_data([2, 2], vec![1.0, 0.5, 2.0, 1.5]).unwrap()),
            },
            Case {
                json: r#"{"data": [1.0, 0.5], "shape": [2, 3]}"#,
                expected: Err("data length 2 does not match shape {2, 3}".into()),
            },
            Case {
                json: r#"{"data": [], "shape": [9223372036854775807, 3]}"#,
                expected: Err("number of elements in shape {9223372036854775807, 3} is too large".into()),
            },
        ];

        for Case { json, expected } in cases {
            let actual: Result<Tensor<f32>, String> =
                serde_json::from_str(json).map_err(|e| e.to_string());
            match (actual, expected) {
                (Ok(actual), Ok(expected)) => {
                    assert_eq!(actual, expected);
                    let actual_json = serde_json::to_value(actual).unwrap();
                    let expected_json: serde_json::Value = serde_json::from_str(json).unwrap();
                    assert_eq!(actual_json, expected_json);
                }
                (Err(actual_err), Err(expected_err)) => assert!(
                    actual_err.contains(&expected_err),
                    "expected \"{}\" to contain \"{}\"",
                    actual_err,
                    expected_err
                ),
                (actual, expected) => assert_eq!(actual, expected),
            }
        }
    }
}

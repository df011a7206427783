use crate::error::PairError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tch::{Kind, Tensor};

/// Target value attached to each image.
///
/// A `Scalar` is a class index or regression target; a `Vector` holds
/// dummy-encoded (multi-hot) categories. Both convert to an `f32` tensor:
/// scalars become 0-d tensors, vectors 1-d tensors of the same length.
///
/// # Example
/// ```ignore
/// let label = Label::from(1);
/// assert_eq!(label.to_tensor().double_value(&[]), 1.0);
///
/// let multi = Label::from(vec![0.0, 1.0, 1.0]);
/// assert_eq!(multi.to_tensor().size(), vec![3]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Label {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl Label {
    /// Converts the label into a float tensor on the CPU.
    pub fn to_tensor(&self) -> Tensor {
        match self {
            Label::Scalar(value) => Tensor::from(*value as f32),
            Label::Vector(values) => Tensor::from_slice(values).to_kind(Kind::Float),
        }
    }
}

impl From<f64> for Label {
    fn from(value: f64) -> Self {
        Label::Scalar(value)
    }
}

impl From<i64> for Label {
    fn from(value: i64) -> Self {
        Label::Scalar(value as f64)
    }
}

impl From<i32> for Label {
    fn from(value: i32) -> Self {
        Label::Scalar(value as f64)
    }
}

impl From<usize> for Label {
    fn from(value: usize) -> Self {
        Label::Scalar(value as f64)
    }
}

impl From<Vec<f64>> for Label {
    fn from(values: Vec<f64>) -> Self {
        Label::Vector(values)
    }
}

impl From<Vec<i64>> for Label {
    fn from(values: Vec<i64>) -> Self {
        Label::Vector(values.into_iter().map(|v| v as f64).collect())
    }
}

/// Accepts numbers, booleans and flat arrays of those.
impl TryFrom<Value> for Label {
    type Error = PairError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        fn number(value: &Value) -> Option<f64> {
            match value {
                Value::Number(n) => n.as_f64(),
                Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
                _ => None,
            }
        }

        match &value {
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    number(item).ok_or_else(|| PairError::LabelConversion(item.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Label::Vector),
            other => number(other)
                .map(Label::Scalar)
                .ok_or_else(|| PairError::LabelConversion(other.to_string())),
        }
    }
}

impl From<Label> for Value {
    fn from(label: Label) -> Self {
        match label {
            Label::Scalar(v) => Value::from(v),
            Label::Vector(vs) => Value::from(vs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_label_tensor() {
        let tensor = Label::from(1).to_tensor();
        assert_eq!(tensor.size(), Vec::<i64>::new());
        assert_eq!(tensor.kind(), Kind::Float);
        assert_eq!(tensor.double_value(&[]), 1.0);
    }

    #[test]
    fn test_vector_label_tensor() {
        let tensor = Label::from(vec![0_i64, 1, 2, 0]).to_tensor();
        assert_eq!(tensor.size(), vec![4]);
        assert_eq!(tensor.kind(), Kind::Float);
        assert_eq!(tensor.double_value(&[2]), 2.0);
    }

    #[test]
    fn test_label_from_json() {
        assert_eq!(Label::try_from(json!(3)).unwrap(), Label::Scalar(3.0));
        assert_eq!(
            Label::try_from(json!([1, 0, true])).unwrap(),
            Label::Vector(vec![1.0, 0.0, 1.0])
        );
        assert!(matches!(
            Label::try_from(json!("cat")),
            Err(PairError::LabelConversion(_))
        ));
        assert!(matches!(
            Label::try_from(json!([1, [2]])),
            Err(PairError::LabelConversion(_))
        ));
    }
}

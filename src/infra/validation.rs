//! Utilities for validating constraints on types.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use validator::{Validate, ValidateRequired, ValidationError, ValidationErrors};

/// A type that cannot be instatiated without validating the value within.
/// That is, if you have a [`Valid<T>`], `T` is guaranteed to be valid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Valid<T> {
    value: T,
}

impl<T> Valid<T> {
    /// Constructs a new validated value.
    pub fn new(value: T) -> Result<Valid<T>, ValidationErrors>
    where
        T: Validate,
    {
        value.validate().map(|_| Valid { value })
    }

    /// Returns the validated value.
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// A request field that may be left out, sent as `null`, or given a value.
///
/// `Option<T>` folds the first two together. Use this with
/// `#[serde(default)]` when `null` has to be rejected.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Field<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Field<T> {
    /// The value, if one was given.
    pub fn value(self) -> Option<T> {
        match self {
            Field::Value(value) => Some(value),
            Field::Absent | Field::Null => None,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.map_or(Field::Null, Field::Value))
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Field::Value(value) => serializer.serialize_some(value),
            Field::Absent | Field::Null => serializer.serialize_none(),
        }
    }
}

impl<T> ValidateRequired for Field<T> {
    fn is_some(&self) -> bool {
        !matches!(self, Field::Absent)
    }
}

/// Rejects an explicit `null`.
pub fn not_null<T>(field: &Field<T>) -> Result<(), ValidationError> {
    match field {
        Field::Null => Err(error("null", NULL)),
        Field::Absent | Field::Value(_) => Ok(()),
    }
}

/// A [`ValidationError`] with a human readable message.
pub fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Unwraps a field that validation has already proven present.
/// Reports it as missing otherwise.
pub fn required<T>(field: &'static str, value: Option<T>) -> Result<T, ValidationErrors> {
    value.ok_or_else(|| {
        let mut errors = ValidationErrors::new();
        errors.add(field, error("required", REQUIRED));
        errors
    })
}

pub const REQUIRED: &str = "This field is required.";

pub const NULL: &str = "This field may not be null.";

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Validate, Deserialize)]
    struct Fields {
        #[validate(length(min = 4, max = 5))]
        four_or_five: String,
        #[validate(required(message = "This field is required."))]
        present: Option<String>,
        #[validate(range(min = 18, max = 20))]
        age: u32,
    }

    #[test]
    pub fn valid_value_succeeds() {
        let data = r#"
            {
                "four_or_five": "1234",
                "present": "yes",
                "age": 19
            }
        "#;
        let value = serde_json::from_str::<Fields>(data).unwrap();
        assert!(Valid::new(value).is_ok());
    }

    #[test]
    pub fn invalid_value_fails() {
        let data = r#"
            {
                "four_or_five": "124",
                "present": "yes",
                "age": 19
            }
        "#;
        let value = serde_json::from_str::<Fields>(data).unwrap();
        assert!(Valid::new(value).is_err());
    }

    #[test]
    pub fn missing_required_value_fails() {
        let data = r#"
            {
                "four_or_five": "1234",
                "age": 19
            }
        "#;
        let value = serde_json::from_str::<Fields>(data).unwrap();
        let errors = Valid::new(value).unwrap_err();
        let field_errors = errors.field_errors();
        assert_eq!("required", field_errors["present"][0].code);
    }

    #[test]
    fn required_reports_missing_field() {
        assert_eq!(Ok(3), required("n", Some(3)).map_err(|_| ()));
        let errors = required::<i32>("n", None).unwrap_err();
        assert!(errors.field_errors().contains_key("n"));
    }

    #[derive(Debug, Default, Validate, Deserialize)]
    #[serde(default)]
    struct Nullable {
        #[validate(required(message = "This field is required."), custom(function = "not_null"))]
        name: Field<String>,
    }

    #[test]
    fn field_tells_absent_from_null() {
        let absent: Nullable = serde_json::from_str("{}").unwrap();
        let null: Nullable = serde_json::from_str(r#"{"name":null}"#).unwrap();
        let value: Nullable = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert_eq!(Field::Absent, absent.name);
        assert_eq!(Field::Null, null.name);
        assert_eq!(Field::Value("x".to_string()), value.name);
    }

    #[test]
    fn null_field_is_reported_as_null() {
        let null: Nullable = serde_json::from_str(r#"{"name":null}"#).unwrap();
        let errors = Valid::new(null).unwrap_err();
        assert_eq!("null", errors.field_errors()["name"][0].code);

        let absent: Nullable = serde_json::from_str("{}").unwrap();
        let errors = Valid::new(absent).unwrap_err();
        assert_eq!("required", errors.field_errors()["name"][0].code);
    }
}

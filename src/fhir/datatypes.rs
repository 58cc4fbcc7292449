use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Quantity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Identifier {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// A FHIR extension. The `value[x]` payload is kept untyped so that a
/// malformed value only disappears from the typed accessors instead of
/// failing the whole document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Extension {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,
    #[serde(flatten)]
    pub value: Map<String, Value>,
}

impl Coding {
    pub fn new(system: Option<&str>, code: &str) -> Self {
        Self {
            system: system.map(str::to_string),
            code: Some(code.to_string()),
            ..Default::default()
        }
    }
}

impl Quantity {
    pub fn new(value: f64, code: &str) -> Self {
        Self {
            value: Some(value),
            code: Some(code.to_string()),
            ..Default::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

impl Extension {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, key: &str, value: Value) -> Self {
        self.value.insert(key.to_string(), value);
        self
    }

    pub fn value_integer(&self) -> Option<i64> {
        self.value.get("valueInteger").and_then(Value::as_i64)
    }

    pub fn value_decimal(&self) -> Option<f64> {
        self.value.get("valueDecimal").and_then(Value::as_f64)
    }

    pub fn value_boolean(&self) -> Option<bool> {
        self.value.get("valueBoolean").and_then(Value::as_bool)
    }

    pub fn value_str(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(Value::as_str)
    }

    pub fn value_coding(&self) -> Option<Coding> {
        self.typed_value("valueCoding")
    }

    pub fn value_codeable_concept(&self) -> Option<CodeableConcept> {
        self.typed_value("valueCodeableConcept")
    }

    /// First coding code of a `valueCodeableConcept`, falling back to `valueCoding`.
    pub fn first_code(&self) -> Option<String> {
        self.value_codeable_concept()
            .and_then(|concept| concept.coding.into_iter().next())
            .or_else(|| self.value_coding())
            .and_then(|coding| coding.code)
    }

    fn typed_value<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.value
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

/// Finds the first extension with the given url.
pub fn find_extension<'a>(extensions: &'a [Extension], url: &str) -> Option<&'a Extension> {
    extensions.iter().find(|extension| extension.url == url)
}

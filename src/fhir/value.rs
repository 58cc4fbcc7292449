use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{CodeableConcept, Coding, Quantity};

/// Data types allowed as the suffix of a `value[x]`-style choice element.
const CHOICE_TYPES: &[&str] = &[
    "Base64Binary", "Boolean", "Canonical", "Code", "Date", "DateTime", "Decimal", "Id",
    "Instant", "Integer", "Markdown", "Oid", "PositiveInt", "String", "Time", "UnsignedInt",
    "Uri", "Url", "Uuid", "Address", "Age", "Annotation", "Attachment", "CodeableConcept",
    "Coding", "ContactPoint", "Count", "Distance", "Duration", "HumanName", "Identifier",
    "Money", "Period", "Quantity", "Range", "Ratio", "Reference", "SampledData", "Signature",
    "Timing", "ContactDetail", "Contributor", "DataRequirement", "Expression",
    "ParameterDefinition", "RelatedArtifact", "TriggerDefinition", "UsageContext", "Dosage",
    "Meta",
];

/// A typed `value[x]` payload, tagged with its FHIR data type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value")]
pub enum AnswerValue {
    Boolean(bool),
    Decimal(f64),
    Integer(i64),
    Date(String),
    DateTime(String),
    Time(String),
    String(String),
    Uri(String),
    Coding(Coding),
    CodeableConcept(CodeableConcept),
    Quantity(Quantity),
    Attachment(Value),
    Reference(Value),
    Other { kind: String, value: Value },
}

impl AnswerValue {
    /// Reads the first `<prefix><Type>` entry of a JSON object, e.g. `valueCoding`
    /// for prefix `value`. Only FHIR data type names count as a suffix, so
    /// `valueSet` is not a payload. A malformed payload yields `None`.
    pub fn from_prefixed(fields: &Map<String, Value>, prefix: &str) -> Option<Self> {
        let (kind, value) = fields.iter().find_map(|(key, value)| {
            let kind = key.strip_prefix(prefix)?;
            CHOICE_TYPES.contains(&kind).then_some((kind, value))
        })?;
        Self::from_kind(kind, value)
    }

    /// Builds a payload from a FHIR type name (`Coding`, `Quantity`, ...) and its JSON value.
    pub fn from_kind(kind: &str, value: &Value) -> Option<Self> {
        let text = || value.as_str().map(str::to_string);
        match kind {
            "Boolean" => value.as_bool().map(AnswerValue::Boolean),
            "Decimal" => value.as_f64().map(AnswerValue::Decimal),
            "Integer" | "PositiveInt" | "UnsignedInt" => value.as_i64().map(AnswerValue::Integer),
            "Date" => text().map(AnswerValue::Date),
            "DateTime" | "Instant" => text().map(AnswerValue::DateTime),
            "Time" => text().map(AnswerValue::Time),
            "String" | "Markdown" | "Code" | "Id" => text().map(AnswerValue::String),
            "Uri" | "Url" | "Canonical" => text().map(AnswerValue::Uri),
            "Coding" => serde_json::from_value(value.clone())
                .ok()
                .map(AnswerValue::Coding),
            "CodeableConcept" => serde_json::from_value(value.clone())
                .ok()
                .map(AnswerValue::CodeableConcept),
            "Quantity" => serde_json::from_value(value.clone())
                .ok()
                .map(AnswerValue::Quantity),
            "Attachment" => Some(AnswerValue::Attachment(value.clone())),
            "Reference" => Some(AnswerValue::Reference(value.clone())),
            _ => Some(AnswerValue::Other {
                kind: kind.to_string(),
                value: value.clone(),
            }),
        }
    }

    /// FHIR type name of this payload.
    pub fn kind(&self) -> &str {
        match self {
            AnswerValue::Boolean(_) => "Boolean",
            AnswerValue::Decimal(_) => "Decimal",
            AnswerValue::Integer(_) => "Integer",
            AnswerValue::Date(_) => "Date",
            AnswerValue::DateTime(_) => "DateTime",
            AnswerValue::Time(_) => "Time",
            AnswerValue::String(_) => "String",
            AnswerValue::Uri(_) => "Uri",
            AnswerValue::Coding(_) => "Coding",
            AnswerValue::CodeableConcept(_) => "CodeableConcept",
            AnswerValue::Quantity(_) => "Quantity",
            AnswerValue::Attachment(_) => "Attachment",
            AnswerValue::Reference(_) => "Reference",
            AnswerValue::Other { kind, .. } => kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_prefixed_coding() {
        let fields = object(json!({
            "valueCoding": {"system": "http://loinc.org", "code": "LA2-8", "display": "Male"}
        }));

        let value = AnswerValue::from_prefixed(&fields, "value").unwrap();
        assert_eq!(value.kind(), "Coding");
        match value {
            AnswerValue::Coding(coding) => assert_eq!(coding.code.as_deref(), Some("LA2-8")),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_prefix_requires_type_suffix() {
        let fields = object(json!({"valueSet": "x", "answerString": "yes"}));
        assert!(AnswerValue::from_prefixed(&fields, "value").is_none());
        assert_eq!(
            AnswerValue::from_prefixed(&fields, "answer"),
            Some(AnswerValue::String("yes".to_string()))
        );
    }

    #[test]
    fn test_non_type_suffix_skipped_for_later_payload() {
        let fields = object(json!({"valueSet": "x", "valuePeriod": {"start": "2020"}}));
        let value = AnswerValue::from_prefixed(&fields, "value").unwrap();
        assert_eq!(value.kind(), "Period");
    }

    #[test]
    fn test_malformed_payload_is_dropped() {
        let fields = object(json!({"valueInteger": "ten"}));
        assert!(AnswerValue::from_prefixed(&fields, "value").is_none());
    }

    #[test]
    fn test_unknown_kind_kept_as_other() {
        let value = AnswerValue::from_kind("Period", &json!({"start": "2020"})).unwrap();
        assert_eq!(value.kind(), "Period");
    }
}

//! Extension URLs read by the Questionnaire importer.

pub const MIN_OCCURS: &str = "http://hl7.org/fhir/StructureDefinition/questionnaire-minOccurs";
pub const MAX_OCCURS: &str = "http://hl7.org/fhir/StructureDefinition/questionnaire-maxOccurs";
pub const ITEM_CONTROL: &str = "http://hl7.org/fhir/StructureDefinition/questionnaire-itemControl";
pub const UNIT: &str = "http://hl7.org/fhir/StructureDefinition/questionnaire-unit";
pub const UNIT_OPTION: &str = "http://hl7.org/fhir/StructureDefinition/questionnaire-unitOption";
pub const OPTION_PREFIX: &str = "http://hl7.org/fhir/StructureDefinition/questionnaire-optionPrefix";
pub const ANSWER_REPEATS: &str =
    "http://hl7.org/fhir/StructureDefinition/questionnaire-answerRepeats";
pub const TERMINOLOGY_SERVER: &str = "http://hl7.org/fhir/StructureDefinition/terminology-server";
pub const ORDINAL_VALUE: &str = "http://hl7.org/fhir/StructureDefinition/ordinalValue";
pub const ITEM_WEIGHT: &str = "http://hl7.org/fhir/StructureDefinition/itemWeight";
pub const ARGONAUT_SCORE: &str =
    "http://fhir.org/guides/argonaut-questionnaire/StructureDefinition/extension-score";

pub const MIN_VALUE: &str = "http://hl7.org/fhir/StructureDefinition/minValue";
pub const MAX_VALUE: &str = "http://hl7.org/fhir/StructureDefinition/maxValue";
pub const MIN_LENGTH: &str = "http://hl7.org/fhir/StructureDefinition/minLength";
pub const REGEX: &str = "http://hl7.org/fhir/StructureDefinition/regex";

/// Extensions turned into item restrictions, keyed by restriction name.
pub const RESTRICTIONS: [(&str, &str); 4] = [
    (MIN_VALUE, "minInclusive"),
    (MAX_VALUE, "maxInclusive"),
    (MIN_LENGTH, "minLength"),
    (REGEX, "pattern"),
];

/// Extensions whose first value counts as an answer option's score.
pub const SCORE_EXTENSIONS: [&str; 3] = [ORDINAL_VALUE, ITEM_WEIGHT, ARGONAUT_SCORE];

pub const LOINC_URI: &str = "http://loinc.org";
pub const LOINC: &str = "LOINC";

/// Maps a code system URI to the form model's short name. Only LOINC has a
/// short name; everything else passes through.
pub fn to_internal_code_system(uri: &str) -> String {
    match uri {
        LOINC_URI => LOINC.to_string(),
        other => other.to_string(),
    }
}

/// Inverse of [`to_internal_code_system`].
pub fn to_external_code_system(code_system: &str) -> String {
    match code_system {
        LOINC => LOINC_URI.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loinc_round_trip() {
        assert_eq!(to_internal_code_system("http://loinc.org"), "LOINC");
        assert_eq!(to_external_code_system("LOINC"), "http://loinc.org");
    }

    #[test]
    fn test_other_systems_pass_through() {
        assert_eq!(
            to_internal_code_system("http://snomed.info/sct"),
            "http://snomed.info/sct"
        );
        assert_eq!(to_internal_code_system("http://loinc.org/"), "http://loinc.org/");
        assert_eq!(to_external_code_system("LinkId"), "LinkId");
    }
}

use std::sync::Arc;

use super::{NoUnitConversion, UnitConverter, round_to_significant, significant_digits};
use crate::core::UnitConfig;
use crate::fhir::Quantity;
use crate::form::Unit;

/// Outcome of reconciling a quantity against a question's unit list.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitMatch {
    Matched {
        unit: Unit,
        quantity: Quantity,
        converted: bool,
    },
    NotMatched,
}

impl UnitMatch {
    pub fn is_matched(&self) -> bool {
        matches!(self, UnitMatch::Matched { .. })
    }
}

/// Matches quantity units against unit catalogs, converting into the
/// canonical unit system when no exact match exists.
#[derive(Clone)]
pub struct UnitMatcher {
    converter: Arc<dyn UnitConverter>,
    config: UnitConfig,
}

impl UnitMatcher {
    pub fn new(converter: Arc<dyn UnitConverter>, config: UnitConfig) -> Self {
        Self { converter, config }
    }

    pub fn exact_only() -> Self {
        Self::new(Arc::new(NoUnitConversion), UnitConfig::exact_only())
    }

    pub fn config(&self) -> &UnitConfig {
        &self.config
    }

    pub fn match_unit(&self, candidate: &Quantity, units: &[Unit]) -> UnitMatch {
        let system = self.normalize_system(candidate.system.as_deref());
        let canonical = system.is_some_and(|s| s == self.config.unit_system_uri);

        let mut canonical_unit = None;
        for unit in units {
            if Self::is_exact_match(candidate, system, unit) {
                let mut quantity = candidate.clone();
                quantity.system = system.map(str::to_string);
                return UnitMatch::Matched {
                    unit: unit.clone(),
                    quantity,
                    converted: false,
                };
            }
            if canonical
                && canonical_unit.is_none()
                && unit.system.as_deref() == Some(self.config.unit_system_uri.as_str())
            {
                canonical_unit = Some(unit);
            }
        }

        match canonical_unit {
            Some(target) if self.config.convert_units => self
                .convert_to(candidate, system, target)
                .unwrap_or(UnitMatch::NotMatched),
            _ => UnitMatch::NotMatched,
        }
    }

    fn convert_to(&self, candidate: &Quantity, system: Option<&str>, target: &Unit) -> Option<UnitMatch> {
        let from_code = candidate.code.as_deref()?;
        let to_code = target.code.as_deref()?;
        let value = candidate.value?;

        let converted = self
            .converter
            .convert(from_code, value, to_code)
            .converted_value()?;

        let digits = significant_digits(value);
        let normalized = if digits > 0 {
            round_to_significant(converted, digits)
        } else {
            converted
        };
        tracing::debug!(
            "Converted {} {} to {} {}",
            value,
            from_code,
            normalized,
            to_code
        );

        Some(UnitMatch::Matched {
            unit: target.clone(),
            quantity: Quantity {
                value: Some(normalized),
                code: Some(to_code.to_string()),
                system: system.map(str::to_string),
                ..candidate.clone()
            },
            converted: true,
        })
    }

    /// Units that carry a system match on (system, code) when the candidate
    /// has one too; otherwise the code or the display name must agree.
    fn is_exact_match(candidate: &Quantity, system: Option<&str>, unit: &Unit) -> bool {
        match (system, unit.system.as_deref()) {
            (Some(system), Some(unit_system)) => {
                system == unit_system && candidate.code.is_some() && candidate.code == unit.code
            }
            _ => {
                (candidate.code.is_some() && candidate.code == unit.code)
                    || (candidate.unit.is_some() && candidate.unit == unit.name)
            }
        }
    }

    fn normalize_system<'a>(&self, system: Option<&'a str>) -> Option<&'a str> {
        match system {
            Some(system) if self.config.strip_trailing_slash => {
                Some(system.strip_suffix('/').unwrap_or(system))
            }
            other => other,
        }
    }
}

impl Default for UnitMatcher {
    fn default() -> Self {
        Self::new(Arc::new(NoUnitConversion), UnitConfig::default())
    }
}

impl std::fmt::Debug for UnitMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitMatcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UCUM_URI;
    use crate::normalize::UnitConversion;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingConverter {
        calls: AtomicUsize,
    }

    impl UnitConverter for CountingConverter {
        fn convert(&self, from_code: &str, value: f64, to_code: &str) -> UnitConversion {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match (from_code, to_code) {
                ("mg", "g") => UnitConversion::succeeded(value / 1000.0),
                ("[lb_av]", "kg") => UnitConversion::succeeded(value * 0.45359237),
                _ => UnitConversion::failed(),
            }
        }
    }

    fn matcher() -> (UnitMatcher, Arc<CountingConverter>) {
        let converter = Arc::new(CountingConverter {
            calls: AtomicUsize::new(0),
        });
        (
            UnitMatcher::new(converter.clone(), UnitConfig::default()),
            converter,
        )
    }

    #[test]
    fn test_direct_code_match_skips_conversion() {
        let (matcher, converter) = matcher();
        let result = matcher.match_unit(&Quantity::new(250.0, "mg"), &[Unit::new("mg")]);

        assert!(result.is_matched());
        assert_eq!(converter.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_conversion_into_canonical_unit() {
        let (matcher, converter) = matcher();
        let candidate = Quantity::new(250.0, "mg").with_system(UCUM_URI);
        let result = matcher.match_unit(&candidate, &[Unit::new("g").with_system(UCUM_URI)]);

        match result {
            UnitMatch::Matched {
                unit,
                quantity,
                converted,
            } => {
                assert!(converted);
                assert_eq!(unit.code.as_deref(), Some("g"));
                assert_eq!(quantity.code.as_deref(), Some("g"));
                assert_eq!(quantity.value, Some(0.25));
            }
            UnitMatch::NotMatched => panic!("expected a converted match"),
        }
        assert_eq!(converter.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_converted_value_keeps_input_precision() {
        let (matcher, _) = matcher();
        let candidate = Quantity::new(150.0, "[lb_av]").with_system(UCUM_URI);
        let result = matcher.match_unit(&candidate, &[Unit::new("kg").with_system(UCUM_URI)]);

        let UnitMatch::Matched { quantity, .. } = result else {
            panic!("expected a converted match");
        };
        // 68.0388555 rounded to three significant digits
        assert_eq!(quantity.value, Some(68.0));
    }

    #[test]
    fn test_trailing_slash_on_system_is_ignored() {
        let (matcher, converter) = matcher();
        let candidate = Quantity::new(70.0, "kg").with_system("http://unitsofmeasure.org/");
        let result = matcher.match_unit(&candidate, &[Unit::new("kg").with_system(UCUM_URI)]);

        let UnitMatch::Matched { quantity, converted, .. } = result else {
            panic!("expected an exact match");
        };
        assert!(!converted);
        assert_eq!(quantity.system.as_deref(), Some(UCUM_URI));
        assert_eq!(converter.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_name_match_for_units_without_system() {
        let (matcher, _) = matcher();
        let candidate = Quantity {
            value: Some(5.0),
            unit: Some("pounds".to_string()),
            ..Default::default()
        };
        let units = [Unit::default().with_name("pounds")];
        assert!(matcher.match_unit(&candidate, &units).is_matched());
    }

    #[test]
    fn test_unmatched_unit_is_rejected() {
        let (matcher, _) = matcher();
        let candidate = Quantity::new(3.0, "cm").with_system(UCUM_URI);
        let units = [Unit::new("g").with_system(UCUM_URI)];
        assert_eq!(matcher.match_unit(&candidate, &units), UnitMatch::NotMatched);

        let foreign = Quantity::new(3.0, "mg").with_system("http://example.org/units");
        assert_eq!(matcher.match_unit(&foreign, &units), UnitMatch::NotMatched);
    }

    #[test]
    fn test_exact_only_never_converts() {
        let candidate = Quantity::new(250.0, "mg").with_system(UCUM_URI);
        let units = [Unit::new("g").with_system(UCUM_URI)];
        assert_eq!(
            UnitMatcher::exact_only().match_unit(&candidate, &units),
            UnitMatch::NotMatched
        );
    }
}

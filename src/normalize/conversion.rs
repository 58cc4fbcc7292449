//! The unit-conversion collaborator. Conversion arithmetic lives outside this
//! crate; the importer only asks whether `value` in `from_code` can be
//! expressed in `to_code`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStatus {
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConversion {
    pub status: ConversionStatus,
    pub value: Option<f64>,
}

impl UnitConversion {
    pub fn succeeded(value: f64) -> Self {
        Self {
            status: ConversionStatus::Succeeded,
            value: Some(value),
        }
    }

    pub fn failed() -> Self {
        Self {
            status: ConversionStatus::Failed,
            value: None,
        }
    }

    /// The converted value, if the conversion succeeded.
    pub fn converted_value(&self) -> Option<f64> {
        match self.status {
            ConversionStatus::Succeeded => self.value,
            ConversionStatus::Failed => None,
        }
    }
}

pub trait UnitConverter: Send + Sync {
    fn convert(&self, from_code: &str, value: f64, to_code: &str) -> UnitConversion;
}

/// A converter that never converts; only exact unit matches are accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUnitConversion;

impl UnitConverter for NoUnitConversion {
    fn convert(&self, _from_code: &str, _value: f64, _to_code: &str) -> UnitConversion {
        UnitConversion::failed()
    }
}

impl<F> UnitConverter for F
where
    F: Fn(&str, f64, &str) -> UnitConversion + Send + Sync,
{
    fn convert(&self, from_code: &str, value: f64, to_code: &str) -> UnitConversion {
        self(from_code, value, to_code)
    }
}

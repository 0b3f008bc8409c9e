//! Numbers with an optional unit: gauges, lengths and BOM quantities

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quantity {
    pub number: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Quantity {
    pub fn new(number: f64, unit: Option<String>) -> Self {
        Self { number, unit }
    }

    /// A unitless count
    pub fn count(number: f64) -> Self {
        Self { number, unit: None }
    }

    /// Parse `"2"`, `"0.25 mm2"` or `"1.5 m"`. Without a unit in the text,
    /// `default_unit` applies.
    pub fn parse(input: &str, default_unit: Option<&str>) -> Result<Self, String> {
        let input = input.trim();
        let (number, unit) = match input.split_once(char::is_whitespace) {
            Some((number, unit)) => (number, Some(unit.trim().to_string())),
            None => (input, default_unit.map(str::to_string)),
        };
        let invalid = || {
            format!(
                "'{input}' is not a valid quantity; expected a number, \
                 or a number and a unit separated by a space"
            )
        };
        let number: f64 = number.parse().map_err(|_| invalid())?;
        if !number.is_finite() {
            return Err(invalid());
        }
        Ok(Self { number, unit })
    }

    /// Two decimals when fractional, otherwise an integer
    pub fn number_str(&self) -> String {
        if self.number.fract() != 0.0 {
            format!("{:.2}", self.number)
        } else {
            format!("{}", self.number as i64)
        }
    }

    pub fn unit_str(&self) -> &str {
        self.unit.as_deref().unwrap_or("")
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            number: self.number * factor,
            unit: self.unit.clone(),
        }
    }

    /// Sum of two quantities; `None` if their units differ
    pub fn checked_add(&self, other: &Quantity) -> Option<Quantity> {
        if self.unit != other.unit {
            return None;
        }
        Some(Self {
            number: self.number + other.number,
            unit: self.unit.clone(),
        })
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            Some(unit) => write!(f, "{} {}", self.number_str(), unit),
            None => f.write_str(&self.number_str()),
        }
    }
}

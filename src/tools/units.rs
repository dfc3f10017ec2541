use crate::expr::{format_float, Number};
use agent_playground_macros::tool;
use serde::Deserialize;
use thiserror::Error;

/// Length units, expressed in metres
const LENGTH_TO_METRE: &[(&str, f64)] = &[("cm", 0.01), ("m", 1.0), ("km", 1000.0)];

/// Weight units, expressed in grams
const WEIGHT_TO_GRAM: &[(&str, f64)] = &[("g", 1.0), ("kg", 1000.0)];

pub const UNSUPPORTED_UNITS_MESSAGE: &str = "Error: unsupported or mismatched units";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported or mismatched units: {from} -> {to}")]
pub struct ConversionError {
    pub from: String,
    pub to: String,
}

fn factor(table: &[(&str, f64)], unit: &str) -> Option<f64> {
    table
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, factor)| *factor)
}

/// Convert `value` between two units of the same category via its base unit.
pub fn convert_value(value: f64, from_unit: &str, to_unit: &str) -> Result<f64, ConversionError> {
    for table in [LENGTH_TO_METRE, WEIGHT_TO_GRAM] {
        if let (Some(from), Some(to)) = (factor(table, from_unit), factor(table, to_unit)) {
            return Ok(value * from / to);
        }
    }
    Err(ConversionError {
        from: from_unit.to_string(),
        to: to_unit.to_string(),
    })
}

/// Convert and render as `"<value> <from> = <result> <to>"`.
///
/// ```
/// use agent_playground::tools::units::unit_converter;
/// assert_eq!(unit_converter(100, "cm", "m"), "100 cm = 1.0 m");
/// ```
pub fn unit_converter(value: impl Into<Number>, from_unit: &str, to_unit: &str) -> String {
    let value = value.into();
    match convert_value(value.as_f64(), from_unit, to_unit) {
        Ok(result) => format!(
            "{} {} = {} {}",
            value,
            from_unit,
            format_float(result),
            to_unit
        ),
        Err(_) => UNSUPPORTED_UNITS_MESSAGE.to_string(),
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UnitConverterParams {
    /// The value to convert
    #[schemars(with = "f64")]
    pub value: serde_json::Number,
    /// Source unit (cm, m, km, g, kg)
    pub from_unit: String,
    /// Target unit (cm, m, km, g, kg)
    pub to_unit: String,
}

tool!(
    name = "unit_converter",
    description = "Convert a value between length units (cm, m, km) or weight units (g, kg)",
    params = UnitConverterParams,
    |params: UnitConverterParams| async move {
        Ok(serde_json::Value::String(unit_converter(
            Number::from(&params.value),
            &params.from_unit,
            &params.to_unit,
        )))
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    const LENGTHS: [&str; 3] = ["cm", "m", "km"];
    const WEIGHTS: [&str; 2] = ["g", "kg"];

    #[test]
    fn converts_like_the_worked_example() {
        assert_eq!(unit_converter(100, "cm", "m"), "100 cm = 1.0 m");
        assert_eq!(unit_converter(2.5, "kg", "g"), "2.5 kg = 2500.0 g");
        assert_eq!(unit_converter(1, "km", "cm"), "1 km = 100000.0 cm");
    }

    #[test]
    fn round_trips_within_each_category() {
        for table in [&LENGTHS[..], &WEIGHTS[..]] {
            for from in table {
                for to in table {
                    for value in [0.0, 1.0, 42.5, 1234.5678] {
                        let there = convert_value(value, from, to).unwrap();
                        let back = convert_value(there, to, from).unwrap();
                        assert!(
                            (back - value).abs() <= 1e-9 * value.abs().max(1.0),
                            "{value} {from} -> {to} -> {back}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn cross_category_and_unknown_units_fail() {
        for length in LENGTHS {
            for weight in WEIGHTS {
                assert_eq!(unit_converter(1, length, weight), UNSUPPORTED_UNITS_MESSAGE);
                assert_eq!(unit_converter(1, weight, length), UNSUPPORTED_UNITS_MESSAGE);
            }
        }
        assert_eq!(unit_converter(1, "mi", "km"), UNSUPPORTED_UNITS_MESSAGE);
        assert_eq!(unit_converter(1, "M", "cm"), UNSUPPORTED_UNITS_MESSAGE);
        assert!(convert_value(1.0, "lb", "kg").is_err());
    }
}

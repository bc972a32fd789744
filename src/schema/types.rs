//! XSD simple-type checks for attribute values.

use crate::findings::codes;
use regex::Regex;

/// A failed type check: the rule id to report and the human-readable
/// message, which carries literal bounds where they exist.
#[derive(Debug, Clone)]
pub struct TypeViolation {
    pub rule: &'static str,
    pub message: String,
}

impl TypeViolation {
    fn new(rule: &'static str, message: String) -> Self {
        Self { rule, message }
    }
}

/// A simple type, applied to attribute strings.
#[derive(Debug, Clone)]
pub enum XsdType {
    String {
        /// Anchored full-string match when present.
        pattern: Option<Regex>,
        min_len: Option<usize>,
        max_len: Option<usize>,
        enumeration: Option<&'static [&'static str]>,
    },
    Integer {
        min: Option<i64>,
        max: Option<i64>,
    },
    Decimal {
        min: Option<f64>,
        max: Option<f64>,
        /// Reject NaN and ±INF.
        forbid_non_finite: bool,
    },
    Boolean,
    List(Box<XsdType>),
    Union(Vec<XsdType>),
}

impl XsdType {
    pub fn string() -> Self {
        XsdType::String {
            pattern: None,
            min_len: None,
            max_len: None,
            enumeration: None,
        }
    }

    pub fn string_max_len(max_len: usize) -> Self {
        XsdType::String {
            pattern: None,
            min_len: None,
            max_len: Some(max_len),
            enumeration: None,
        }
    }

    /// Full-string regex pattern. The pattern source is anchored here.
    pub fn pattern(pat: &str) -> Self {
        XsdType::String {
            pattern: Some(Regex::new(&format!("^(?:{})$", pat)).expect("static pattern")),
            min_len: None,
            max_len: None,
            enumeration: None,
        }
    }

    pub fn enumeration(values: &'static [&'static str]) -> Self {
        XsdType::String {
            pattern: None,
            min_len: None,
            max_len: None,
            enumeration: Some(values),
        }
    }

    pub fn integer(min: Option<i64>, max: Option<i64>) -> Self {
        XsdType::Integer { min, max }
    }

    pub fn long() -> Self {
        XsdType::Integer {
            min: Some(i64::MIN),
            max: Some(i64::MAX),
        }
    }

    pub fn int() -> Self {
        XsdType::Integer {
            min: Some(-2147483648),
            max: Some(2147483647),
        }
    }

    pub fn unsigned_int() -> Self {
        XsdType::Integer {
            min: Some(0),
            max: Some(4294967295),
        }
    }

    pub fn non_negative_integer() -> Self {
        XsdType::Integer {
            min: Some(0),
            max: None,
        }
    }

    /// Check a value, returning the first violation.
    pub fn check(&self, value: &str) -> Result<(), TypeViolation> {
        match self {
            XsdType::String {
                pattern,
                min_len,
                max_len,
                enumeration,
            } => {
                let len = value.chars().count();
                if let Some(min) = min_len {
                    if len < *min {
                        return Err(TypeViolation::new(
                            codes::VALUE_OUT_OF_RANGE,
                            format!("String length {} is less than minimum {}", len, min),
                        ));
                    }
                }
                if let Some(max) = max_len {
                    if len > *max {
                        return Err(TypeViolation::new(
                            codes::VALUE_OUT_OF_RANGE,
                            format!("String length {} exceeds maximum {}", len, max),
                        ));
                    }
                }
                if let Some(regex) = pattern {
                    if !regex.is_match(value) {
                        return Err(TypeViolation::new(
                            codes::PATTERN_MISMATCH,
                            format!("Value '{}' does not match the required pattern", value),
                        ));
                    }
                }
                if let Some(values) = enumeration {
                    if !values.contains(&value) {
                        return Err(TypeViolation::new(
                            codes::ENUMERATION_VIOLATION,
                            format!(
                                "Value '{}' is not one of the allowed values: {}",
                                value,
                                values.join(", ")
                            ),
                        ));
                    }
                }
                Ok(())
            }
            XsdType::Integer { min, max } => {
                let parsed: i64 = value.parse().map_err(|_| {
                    TypeViolation::new(
                        codes::INVALID_INTEGER,
                        format!("Invalid integer value: '{}'", value),
                    )
                })?;
                if let Some(min) = min {
                    if parsed < *min {
                        return Err(TypeViolation::new(
                            codes::VALUE_OUT_OF_RANGE,
                            format!("Value {} is less than minimum {}", parsed, min),
                        ));
                    }
                }
                if let Some(max) = max {
                    if parsed > *max {
                        return Err(TypeViolation::new(
                            codes::VALUE_OUT_OF_RANGE,
                            format!("Value {} exceeds maximum {}", parsed, max),
                        ));
                    }
                }
                Ok(())
            }
            XsdType::Decimal {
                min,
                max,
                forbid_non_finite,
            } => {
                let parsed: f64 = value.parse().map_err(|_| {
                    TypeViolation::new(
                        codes::INVALID_DECIMAL,
                        format!("Invalid decimal value: '{}'", value),
                    )
                })?;
                if *forbid_non_finite && !parsed.is_finite() {
                    return Err(TypeViolation::new(
                        codes::VALUE_OUT_OF_RANGE,
                        format!("Value '{}' must be a finite number", value),
                    ));
                }
                if let Some(min) = min {
                    if parsed < *min {
                        return Err(TypeViolation::new(
                            codes::VALUE_OUT_OF_RANGE,
                            format!("Value {} is less than minimum {}", parsed, min),
                        ));
                    }
                }
                if let Some(max) = max {
                    if parsed > *max {
                        return Err(TypeViolation::new(
                            codes::VALUE_OUT_OF_RANGE,
                            format!("Value {} exceeds maximum {}", parsed, max),
                        ));
                    }
                }
                Ok(())
            }
            XsdType::Boolean => match value {
                "true" | "false" | "1" | "0" => Ok(()),
                other => Err(TypeViolation::new(
                    codes::INVALID_BOOLEAN,
                    format!(
                        "Invalid boolean value: '{}'. Expected true, false, 1, or 0",
                        other
                    ),
                )),
            },
            XsdType::List(item) => {
                for (position, token) in value.split_whitespace().enumerate() {
                    if let Err(violation) = item.check(token) {
                        return Err(TypeViolation::new(
                            violation.rule,
                            format!("List item {}: {}", position + 1, violation.message),
                        ));
                    }
                }
                Ok(())
            }
            XsdType::Union(alternatives) => {
                let mut first_violation = None;
                for alt in alternatives {
                    match alt.check(value) {
                        Ok(()) => return Ok(()),
                        Err(v) => {
                            if first_violation.is_none() {
                                first_violation = Some(v);
                            }
                        }
                    }
                }
                match first_violation {
                    Some(v) => Err(v),
                    None => Ok(()),
                }
            }
        }
    }
}

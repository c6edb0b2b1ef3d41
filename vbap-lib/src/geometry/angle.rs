//! Helpers for parsing angles given in degrees or radians.

use serde::de::{Error as DeError, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Angle in degrees that deserialises from a number or a suffixed string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Degrees(pub f32);

impl<'de> Deserialize<'de> for Degrees {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_degrees(deserializer).map(Degrees)
    }
}

/// Deserialize an angle in degrees that may be expressed in radians.
///
/// Accepts plain numbers (degrees) and strings such as `"30"`, `"30deg"`,
/// `"30°"` or `"0.5rad"`.
pub fn deserialize_degrees<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    struct DegreesVisitor;

    impl<'de> Visitor<'de> for DegreesVisitor {
        type Value = f32;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number of degrees or a string like \"30deg\" or \"0.5rad\"")
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: DeError,
        {
            Ok(value as f32)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: DeError,
        {
            Ok(value as f32)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: DeError,
        {
            Ok(value as f32)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: DeError,
        {
            parse_angle_str(value)
                .ok_or_else(|| DeError::custom(format!("invalid angle value \"{}\"", value)))
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: DeError,
        {
            self.visit_str(&value)
        }
    }

    deserializer.deserialize_any(DegreesVisitor)
}

fn parse_angle_str(value: &str) -> Option<f32> {
    let lower = value.trim().to_ascii_lowercase();
    if lower.is_empty() {
        return None;
    }
    if let Some(rad) = lower.strip_suffix("rad") {
        return parse_number(rad).map(f32::to_degrees);
    }
    if let Some(deg) = lower.strip_suffix("deg") {
        return parse_number(deg);
    }
    if let Some(deg) = lower.strip_suffix('°') {
        return parse_number(deg);
    }
    parse_number(&lower)
}

fn parse_number(value: &str) -> Option<f32> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f32>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "deserialize_degrees")]
        angle: f32,
    }

    #[test]
    fn parses_plain_numbers_as_degrees() {
        let holder: Holder = serde_json::from_str(r#"{"angle":45}"#).expect("deserialize");
        assert_eq!(holder.angle, 45.0);
        let holder: Holder = serde_json::from_str(r#"{"angle":-12.5}"#).expect("deserialize");
        assert_eq!(holder.angle, -12.5);
    }

    #[test]
    fn parses_suffixed_strings() {
        let holder: Holder = serde_json::from_str(r#"{"angle":"30deg"}"#).expect("deserialize");
        assert_eq!(holder.angle, 30.0);
        let holder: Holder = serde_json::from_str(r#"{"angle":"90°"}"#).expect("deserialize");
        assert_eq!(holder.angle, 90.0);
        let holder: Holder =
            serde_json::from_str(r#"{"angle":"3.14159265rad"}"#).expect("deserialize");
        assert!((holder.angle - 180.0).abs() < 1e-3);
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_json::from_str::<Holder>(r#"{"angle":"north"}"#).is_err());
        assert!(serde_json::from_str::<Holder>(r#"{"angle":""}"#).is_err());
    }
}

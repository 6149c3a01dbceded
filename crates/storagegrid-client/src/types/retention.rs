//! Object-lock default retention settings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{AsRefStr, Display, EnumString};

/// Object-lock retention mode.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
    AsRefStr, Display, EnumString
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RetentionMode {
    #[default]
    #[serde(alias = "COMPLIANCE", alias = "Compliance")]
    Compliance,
    #[serde(alias = "GOVERNANCE", alias = "Governance")]
    Governance,
}

/// Default retention applied to new objects in a bucket with object lock.
///
/// Only one of `days` or `years` is meaningful. When encoding, `years` is
/// written if it is positive and `days` otherwise. When decoding, both accept
/// either a JSON number or a numeric string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionSetting {
    pub mode: RetentionMode,
    pub days: u32,
    pub years: u32,
}

impl RetentionSetting {
    /// Creates a retention setting measured in days.
    pub fn days(mode: RetentionMode, days: u32) -> Self {
        Self {
            mode,
            days,
            years: 0,
        }
    }

    /// Creates a retention setting measured in years.
    pub fn years(mode: RetentionMode, years: u32) -> Self {
        Self {
            mode,
            days: 0,
            years,
        }
    }
}

#[derive(Serialize)]
struct RetentionWire {
    mode: RetentionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    years: Option<u32>,
}

impl Serialize for RetentionSetting {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let wire = if self.years > 0 {
            RetentionWire {
                mode: self.mode,
                days: None,
                years: Some(self.years),
            }
        } else {
            RetentionWire {
                mode: self.mode,
                days: Some(self.days),
                years: None,
            }
        };
        wire.serialize(serializer)
    }
}

/// Period value as the API may send it.
#[derive(Deserialize)]
#[serde(untagged)]
enum Period {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Period {
    fn into_u32<E: serde::de::Error>(self) -> Result<u32, E> {
        let value = match self {
            Self::Integer(value) => value,
            Self::Float(value) => value as i64,
            // Blank or malformed strings carry no retention period.
            Self::Text(text) => text.trim().parse::<i64>().unwrap_or(0),
        };
        u32::try_from(value).map_err(|_| E::custom(format!("invalid retention period: {value}")))
    }
}

#[derive(Deserialize)]
struct RetentionInput {
    #[serde(default)]
    mode: Option<RetentionMode>,
    #[serde(default)]
    days: Option<Period>,
    #[serde(default)]
    years: Option<Period>,
}

impl<'de> Deserialize<'de> for RetentionSetting {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let input = RetentionInput::deserialize(deserializer)?;
        let days = input.days.map(Period::into_u32).transpose()?.unwrap_or(0);
        let years = input.years.map(Period::into_u32).transpose()?.unwrap_or(0);
        Ok(Self {
            mode: input.mode.unwrap_or_default(),
            days,
            years,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn years_take_priority_when_encoding() {
        let setting = RetentionSetting {
            mode: RetentionMode::Governance,
            days: 30,
            years: 2,
        };
        assert_eq!(
            serde_json::to_value(setting).unwrap(),
            json!({"mode": "governance", "years": 2})
        );
    }

    #[test]
    fn days_always_emitted_without_years() {
        let setting = RetentionSetting::days(RetentionMode::Compliance, 0);
        assert_eq!(
            serde_json::to_value(setting).unwrap(),
            json!({"mode": "compliance", "days": 0})
        );
    }

    #[test]
    fn accepts_numeric_strings_and_numbers() {
        let from_string: RetentionSetting =
            serde_json::from_value(json!({"mode": "compliance", "days": "14"})).unwrap();
        assert_eq!(from_string, RetentionSetting::days(RetentionMode::Compliance, 14));

        let from_number: RetentionSetting =
            serde_json::from_value(json!({"mode": "governance", "years": 3})).unwrap();
        assert_eq!(from_number, RetentionSetting::years(RetentionMode::Governance, 3));

        let from_float: RetentionSetting =
            serde_json::from_value(json!({"mode": "governance", "days": 7.0})).unwrap();
        assert_eq!(from_float.days, 7);
    }

    #[test]
    fn blank_strings_become_zero() {
        let setting: RetentionSetting =
            serde_json::from_value(json!({"mode": "compliance", "days": "", "years": "5"}))
                .unwrap();
        assert_eq!(setting.days, 0);
        assert_eq!(setting.years, 5);
    }

    #[test]
    fn encoded_setting_decodes_to_same_value() {
        for setting in [
            RetentionSetting::days(RetentionMode::Governance, 45),
            RetentionSetting::years(RetentionMode::Compliance, 10),
        ] {
            let text = serde_json::to_string(&setting).unwrap();
            assert_eq!(serde_json::from_str::<RetentionSetting>(&text).unwrap(), setting);
        }
    }

    #[test]
    fn negative_periods_are_rejected() {
        assert!(
            serde_json::from_value::<RetentionSetting>(json!({"mode": "compliance", "days": -1}))
                .is_err()
        );
    }
}

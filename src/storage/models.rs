use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// A persisted advertisement. The title doubles as the store key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ad {
    pub title: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[serde(default)]
    pub conditions: Conditions,
}

impl Ad {
    /// `start_at <= now <= end_at`, both ends inclusive.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.start_at <= now && now <= self.end_at
    }
}

/// Audience predicate attached to an ad.
///
/// Every field defaults to "no restriction": both age bounds zero, empty
/// gender, empty country and platform lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conditions {
    #[serde(default)]
    pub age_start: i32,
    #[serde(default)]
    pub age_end: i32,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub country: Vec<String>,
    #[serde(default)]
    pub platform: Vec<String>,
}

impl Conditions {
    pub fn has_age_restriction(&self) -> bool {
        self.age_start != 0 || self.age_end != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, AsRefStr)]
pub enum Gender {
    #[strum(serialize = "M")]
    Male,
    #[strum(serialize = "F")]
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    Web,
}

impl Platform {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::str::FromStr;

    #[test]
    fn test_ad_json_uses_camel_case() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let ad = Ad {
            title: "spring sale".to_string(),
            start_at: start,
            end_at: start + Duration::days(7),
            conditions: Conditions {
                age_start: 20,
                age_end: 30,
                gender: "F".to_string(),
                country: vec!["TW".to_string(), "JP".to_string()],
                platform: vec!["ios".to_string()],
            },
        };
        let value = serde_json::to_value(&ad).unwrap();
        assert_eq!(value["startAt"], "2024-03-01T00:00:00Z");
        assert_eq!(value["conditions"]["ageStart"], 20);
        assert_eq!(value["conditions"]["country"][1], "JP");
    }

    #[test]
    fn test_missing_conditions_default_to_unrestricted() {
        let ad: Ad = serde_json::from_str(
            r#"{"title":"x","startAt":"2024-01-01T00:00:00Z","endAt":"2024-01-02T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(ad.conditions, Conditions::default());
        assert!(!ad.conditions.has_age_restriction());
    }

    #[test]
    fn test_liveness_bounds_are_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let ad = Ad {
            title: "t".to_string(),
            start_at: start,
            end_at: start + Duration::hours(1),
            conditions: Conditions::default(),
        };
        assert!(ad.is_live_at(start));
        assert!(ad.is_live_at(start + Duration::hours(1)));
        assert!(!ad.is_live_at(start - Duration::seconds(1)));
        assert!(!ad.is_live_at(start + Duration::hours(1) + Duration::seconds(1)));
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(Gender::from_str("M").unwrap(), Gender::Male);
        assert!(Gender::from_str("m").is_err());
        assert_eq!(Platform::from_str("ios").unwrap(), Platform::Ios);
        assert_eq!(Platform::Android.as_str(), "android");
        assert!(Platform::from_str("windows").is_err());
    }
}

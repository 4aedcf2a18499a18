//! Serde helpers for configuration files.

/// Human-readable durations: `"10s"`, `"500ms"`, `"2m"` or bare seconds.
///
/// Use with `#[serde(with = "shared_types::serde_helpers::duration_str")]`.
pub mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    /// Parse the textual forms accepted in config files and env overrides.
    pub fn parse_duration(s: &str) -> Result<Duration, String> {
        let s = s.trim();
        // "ms" must be checked before the bare "s" suffix.
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| format!("invalid milliseconds: {s}"))
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| format!("invalid seconds: {s}"))
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(|_| format!("invalid minutes: {s}"))
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| format!("invalid duration format: {s}"))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_duration_units() {
            assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
            assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
            assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
            assert_eq!(parse_duration(" 30 ").unwrap(), Duration::from_secs(30));
            assert!(parse_duration("soon").is_err());
        }

        #[test]
        fn test_round_trip_through_config_struct() {
            #[derive(serde::Serialize, serde::Deserialize)]
            struct Holder {
                #[serde(with = "super")]
                wait: Duration,
            }

            let json = serde_json::to_string(&Holder {
                wait: Duration::from_millis(1500),
            })
            .unwrap();
            assert_eq!(json, r#"{"wait":"1500ms"}"#);
            let back: Holder = serde_json::from_str(&json).unwrap();
            assert_eq!(back.wait, Duration::from_millis(1500));
        }
    }
}

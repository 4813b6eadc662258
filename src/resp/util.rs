/// Serde adapter storing a `DateTime<Utc>` as unix seconds, which is the
/// representation JWT `iat`/`exp` claims use on the wire.
pub mod date_time_as_unix_seconds {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(date.timestamp())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = i64::deserialize(deserializer)?;
        Utc.timestamp_opt(seconds, 0)
            .single()
            .ok_or_else(|| serde::de::Error::custom("timestamp out of range"))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, SubsecRound, Utc};
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Stamp {
        #[serde(with = "super::date_time_as_unix_seconds")]
        at: DateTime<Utc>,
    }

    #[test]
    fn round_trips_at_second_precision() {
        let stamp = Stamp {
            at: Utc::now().round_subsecs(0),
        };
        let json = serde_json::to_string(&stamp).unwrap();
        let back: Stamp = serde_json::from_str(&json).unwrap();
        assert_eq!(stamp.at, back.at);
    }
}

use std::fmt;

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Timestamp layout used in the history file. Whole seconds only.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Max characters of the model response kept in `summary`.
pub const SUMMARY_MAX_CHARS: usize = 500;

/// Marker appended when `summary` is a truncated prefix.
pub const TRUNCATION_MARKER: &str = "...";

/// On-disk representation of a score that could not be parsed.
pub const SCORE_UNAVAILABLE: &str = "N/A";

/// Overall score parsed from the model critique, or the explicit marker that
/// extraction did not find one.
///
/// Serializes as a JSON number, or the string `"N/A"` when unavailable, so
/// the history file stays human-readable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    Value(f64),
    Unavailable,
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Value(v) => write!(f, "{v}"),
            Score::Unavailable => f.write_str(SCORE_UNAVAILABLE),
        }
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Score::Value(v) => serializer.serialize_f64(*v),
            Score::Unavailable => serializer.serialize_str(SCORE_UNAVAILABLE),
        }
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoreVisitor;

        impl<'de> de::Visitor<'de> for ScoreVisitor {
            type Value = Score;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a number or the string \"{SCORE_UNAVAILABLE}\"")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Score, E> {
                Ok(Score::Value(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Score, E> {
                Ok(Score::Value(v as f64))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Score, E> {
                Ok(Score::Value(v as f64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Score, E> {
                if v == SCORE_UNAVAILABLE {
                    Ok(Score::Unavailable)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }
        }

        deserializer.deserialize_any(ScoreVisitor)
    }
}

/// One persisted evaluation result tied to one transcript.
///
/// INVARIANT: `summary` is always a character prefix of `full_text`, plus the
/// truncation marker when the response exceeded `SUMMARY_MAX_CHARS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub source_name: String,
    pub score: Score,
    pub summary: String,
    pub full_text: String,
}

impl EvaluationRecord {
    /// Builds a record for a freshly produced critique. The timestamp is
    /// taken now and truncated to whole seconds so it round-trips through
    /// the file format unchanged.
    pub fn new(source_name: String, score: Score, full_text: String) -> Self {
        let now = Local::now().naive_local();
        Self {
            timestamp: now.with_nanosecond(0).unwrap_or(now),
            source_name,
            score,
            summary: bounded_summary(&full_text),
            full_text,
        }
    }
}

/// Ordered append-only sequence of evaluation records, oldest first.
pub type HistoryLog = Vec<EvaluationRecord>;

/// First `SUMMARY_MAX_CHARS` characters of `text`, with the truncation marker
/// appended when anything was cut. Counts characters, not bytes, so accented
/// transcript text never splits mid-character.
fn bounded_summary(text: &str) -> String {
    if text.chars().count() <= SUMMARY_MAX_CHARS {
        return text.to_string();
    }
    let mut summary: String = text.chars().take(SUMMARY_MAX_CHARS).collect();
    summary.push_str(TRUNCATION_MARKER);
    summary
}

mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(
        timestamp: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&timestamp.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(de::Error::custom)
    }
}

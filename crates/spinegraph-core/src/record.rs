use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

pub const UNKNOWN_SPEAKER: &str = "Unknown";
pub const OTHER_CATEGORY: &str = "other";

/// Canonical 1-based scene number. Defines record order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ordinal(pub u32);

impl std::fmt::Display for Ordinal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Intensity on the internal [0, 1] scale.
///
/// Conversion from the 1–10 authoring scale happens only at the ingestion
/// boundary (`from_scale10` / `from_raw`); everything past that point sees
/// the normalized value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(transparent)]
pub struct Intensity(f32);

impl Intensity {
    pub const DEFAULT: Self = Self(0.5);

    pub fn new(value: f32) -> Self {
        if value.is_finite() {
            Self(value.clamp(0.0, 1.0))
        } else {
            Self::DEFAULT
        }
    }

    /// 1–10 scale, clamped to [1, 10] before dividing.
    pub fn from_scale10(value: f32) -> Self {
        if !value.is_finite() {
            return Self::DEFAULT;
        }
        Self(value.clamp(1.0, 10.0) / 10.0)
    }

    /// A fraction strictly between 0 and 1 is taken as already normalized;
    /// everything else, `1` included, is read as the 1–10 scale.
    pub fn from_raw(value: f32) -> Self {
        if value.is_finite() && value > 0.0 && value < 1.0 {
            Self::new(value)
        } else {
            Self::from_scale10(value)
        }
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for Intensity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub ordinal: Ordinal,
    pub category: String,
    pub intensity: Intensity,
    pub secondary: Vec<String>,
    pub context: String,
    pub quote: String,
    pub speaker: String,
}

impl Record {
    pub fn new(ordinal: u32, category: &str, intensity: Intensity) -> Self {
        Self {
            ordinal: Ordinal(ordinal),
            category: normalize_category(category),
            intensity,
            secondary: Vec::new(),
            context: String::new(),
            quote: String::new(),
            speaker: UNKNOWN_SPEAKER.to_string(),
        }
    }

    pub fn with_speaker(mut self, speaker: &str) -> Self {
        self.speaker = normalize_speaker(speaker);
        self
    }

    pub fn with_secondary<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.secondary = clean_labels(labels);
        self
    }

    pub fn with_text(mut self, context: &str, quote: &str) -> Self {
        self.context = context.trim().to_string();
        self.quote = quote.trim().to_string();
        self
    }

    /// Grouping key for speaker threads.
    pub fn speaker_key(&self) -> String {
        self.speaker.trim().to_lowercase()
    }

    /// Grouping key for category webs.
    pub fn category_key(&self) -> &str {
        &self.category
    }
}

/// Row as handed over by an ingestion collaborator, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub ordinal: Option<f64>,
    pub category: Option<String>,
    pub intensity: Option<Intensity>,
    pub secondary: Vec<String>,
    pub context: Option<String>,
    pub quote: Option<String>,
    pub speaker: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("record has no ordinal id")]
    MissingOrdinal,
    #[error("record ordinal {0} is not a finite number")]
    NonFiniteOrdinal(f64),
    #[error("record ordinal {0} is outside 1..=u32::MAX")]
    OrdinalOutOfRange(f64),
    #[error("duplicate record ordinal {0}")]
    DuplicateOrdinal(Ordinal),
}

impl TryFrom<RawRecord> for Record {
    type Error = RecordError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let id = raw.ordinal.ok_or(RecordError::MissingOrdinal)?;
        if !id.is_finite() {
            return Err(RecordError::NonFiniteOrdinal(id));
        }
        let id = id.trunc();
        if id < 1.0 || id > f64::from(u32::MAX) {
            return Err(RecordError::OrdinalOutOfRange(id));
        }

        let category = raw.category.as_deref().unwrap_or(OTHER_CATEGORY);
        let speaker = raw.speaker.as_deref().unwrap_or(UNKNOWN_SPEAKER);

        Ok(Record::new(id as u32, category, raw.intensity.unwrap_or_default())
            .with_speaker(speaker)
            .with_secondary(raw.secondary)
            .with_text(
                raw.context.as_deref().unwrap_or_default(),
                raw.quote.as_deref().unwrap_or_default(),
            ))
    }
}

/// Validates raw rows into the ordered record set the engine works on.
///
/// Malformed rows and repeated ordinals are dropped and reported back so the
/// caller can log them; the returned records are sorted by ordinal.
pub fn normalize_records<I>(rows: I) -> (Vec<Record>, Vec<RecordError>)
where
    I: IntoIterator<Item = RawRecord>,
{
    let mut records = Vec::new();
    let mut rejected = Vec::new();
    for raw in rows {
        match Record::try_from(raw) {
            Ok(record) => records.push(record),
            Err(err) => rejected.push(err),
        }
    }
    let (records, dupes) = order_records(records);
    rejected.extend(dupes);
    (records, rejected)
}

/// Sorts by ordinal and keeps the first occurrence of each ordinal.
pub fn order_records(mut records: Vec<Record>) -> (Vec<Record>, Vec<RecordError>) {
    records.sort_by_key(|r| r.ordinal);
    let mut seen = HashSet::new();
    let mut dupes = Vec::new();
    records.retain(|r| {
        if seen.insert(r.ordinal) {
            true
        } else {
            dupes.push(RecordError::DuplicateOrdinal(r.ordinal));
            false
        }
    });
    (records, dupes)
}

pub fn normalize_category(raw: &str) -> String {
    let c = raw.trim().to_lowercase();
    if c.is_empty() {
        OTHER_CATEGORY.to_string()
    } else {
        c
    }
}

pub fn normalize_speaker(raw: &str) -> String {
    let s = raw.trim();
    if s.is_empty() {
        UNKNOWN_SPEAKER.to_string()
    } else {
        s.to_string()
    }
}

fn clean_labels<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    labels
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intensity_scale_conversion_happens_once() {
        assert_eq!(Intensity::from_scale10(7.0).get(), 0.7);
        assert_eq!(Intensity::from_scale10(0.0).get(), 0.1);
        assert_eq!(Intensity::from_scale10(42.0).get(), 1.0);
        assert_eq!(Intensity::from_raw(0.85).get(), 0.85);
        assert_eq!(Intensity::from_raw(10.0).get(), 1.0);
        assert_eq!(Intensity::from_raw(1.0).get(), 0.1);
        assert!(Intensity::from_raw(1.0) < Intensity::from_raw(2.0));
        assert_eq!(Intensity::new(f32::NAN), Intensity::DEFAULT);
        assert_eq!(Intensity::new(-3.0).get(), 0.0);
    }

    #[test]
    fn raw_record_defaults_speaker_and_category() {
        let raw = RawRecord {
            ordinal: Some(4.0),
            category: Some("  Grief ".to_string()),
            speaker: Some("   ".to_string()),
            secondary: vec!["tension".into(), " ".into(), " dread".into()],
            ..RawRecord::default()
        };
        let rec = Record::try_from(raw).expect("valid record");
        assert_eq!(rec.ordinal, Ordinal(4));
        assert_eq!(rec.category, "grief");
        assert_eq!(rec.speaker, UNKNOWN_SPEAKER);
        assert_eq!(rec.secondary, vec!["tension", "dread"]);
        assert_eq!(rec.intensity, Intensity::DEFAULT);
    }

    #[test]
    fn malformed_rows_are_dropped_and_reported() {
        let rows = vec![
            RawRecord {
                ordinal: Some(2.0),
                ..RawRecord::default()
            },
            RawRecord {
                ordinal: Some(f64::NAN),
                ..RawRecord::default()
            },
            RawRecord::default(),
            RawRecord {
                ordinal: Some(1.0),
                ..RawRecord::default()
            },
            RawRecord {
                ordinal: Some(2.0),
                category: Some("hope".into()),
                ..RawRecord::default()
            },
            RawRecord {
                ordinal: Some(0.0),
                ..RawRecord::default()
            },
        ];

        let (records, rejected) = normalize_records(rows);
        let ids: Vec<u32> = records.iter().map(|r| r.ordinal.0).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(records[1].category, OTHER_CATEGORY);
        assert_eq!(rejected.len(), 4);
        assert!(rejected.contains(&RecordError::MissingOrdinal));
        assert!(rejected.contains(&RecordError::DuplicateOrdinal(Ordinal(2))));
    }

    #[test]
    fn speaker_key_is_case_insensitive() {
        let a = Record::new(1, "hope", Intensity::DEFAULT).with_speaker("Victor");
        let b = Record::new(2, "hope", Intensity::DEFAULT).with_speaker(" victor ");
        assert_eq!(a.speaker_key(), b.speaker_key());
    }
}

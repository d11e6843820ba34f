use anyhow::{Context, Result};
use spinegraph_core::record::{normalize_records, Intensity, RawRecord, Record, RecordError};
use std::path::Path;

use crate::fallback::fallback_records;

/// SCENE, ANATOMY, EMOTION_CLUSTER, INTENSITY, SECONDARY_EMOTION,
/// SCENE_CONTEXT, QUOTES
const COLUMNS: usize = 7;
const DEFAULT_SCALE10: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    Csv,
    Fallback,
}

#[derive(Debug, Default)]
pub struct Ingested {
    pub records: Vec<Record>,
    pub rejected: Vec<RecordError>,
    /// Rows with too few columns.
    pub short_rows: usize,
}

/// Splits CSV text into rows of fields. Quoted fields may contain commas,
/// doubled quotes and line breaks.
pub fn split_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => row.push(std::mem::take(&mut field).trim().to_string()),
            '\r' if !in_quotes => {}
            '\n' if !in_quotes => {
                row.push(std::mem::take(&mut field).trim().to_string());
                if row.iter().any(|f| !f.is_empty()) {
                    rows.push(std::mem::take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field.trim().to_string());
        if row.iter().any(|f| !f.is_empty()) {
            rows.push(row);
        }
    }
    rows
}

pub fn parse_csv(text: &str) -> Ingested {
    let mut rows = split_rows(text);
    if rows
        .first()
        .and_then(|r| r.first())
        .is_some_and(|f| f.eq_ignore_ascii_case("scene"))
    {
        rows.remove(0);
    }

    let mut short_rows = 0;
    let raw: Vec<RawRecord> = rows
        .into_iter()
        .filter_map(|cols| {
            if cols.len() < COLUMNS {
                short_rows += 1;
                return None;
            }
            Some(raw_record(&cols))
        })
        .collect();

    let (records, rejected) = normalize_records(raw);
    Ingested {
        records,
        rejected,
        short_rows,
    }
}

fn raw_record(cols: &[String]) -> RawRecord {
    let ordinal = cols[0].parse::<u32>().ok().map(f64::from);
    let (quote, speaker) = split_quote(&cols[6]);
    RawRecord {
        ordinal,
        category: Some(cols[2].clone()).filter(|c| !c.is_empty()),
        intensity: Some(parse_intensity(&cols[3])),
        secondary: parse_secondary(&cols[4]),
        context: Some(cols[5].clone()),
        quote: Some(quote),
        speaker,
    }
}

/// Accepts `7`, `7/10` and `0.7`; anything unreadable is 5/10.
pub fn parse_intensity(raw: &str) -> Intensity {
    let raw = raw.trim();
    if let Some((num, den)) = raw.split_once('/') {
        let num = num.trim().parse::<f32>().ok();
        let den = den.trim().parse::<f32>().ok().filter(|d| *d > 0.0);
        return match (num, den) {
            (Some(n), Some(d)) => Intensity::new(n / d),
            (Some(n), None) => Intensity::from_scale10(n),
            _ => Intensity::from_scale10(DEFAULT_SCALE10),
        };
    }
    match raw.parse::<f32>() {
        Ok(v) if v.is_finite() => Intensity::from_raw(v),
        _ => Intensity::from_scale10(DEFAULT_SCALE10),
    }
}

pub fn parse_secondary(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `"quote text" - Speaker` → (quote, speaker). The split happens on the
/// last ` - ` so hyphenated quotes stay intact.
pub fn split_quote(raw: &str) -> (String, Option<String>) {
    let flat = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let Some((quote, speaker)) = flat.rsplit_once(" - ") else {
        return (flat, None);
    };
    let speaker = speaker.trim();
    let quote = quote.trim();
    let quote = quote
        .strip_prefix('"')
        .and_then(|q| q.strip_suffix('"'))
        .unwrap_or(quote);
    let speaker = (!speaker.is_empty()).then(|| speaker.to_string());
    (quote.to_string(), speaker)
}

pub async fn load_csv(path: &Path) -> Result<Ingested> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read records {}", path.display()))?;
    Ok(parse_csv(&text))
}

/// Reads the CSV at `path`, or the bundled table when there is no path,
/// the file cannot be read, or it yields no records.
pub async fn load_records(path: Option<&Path>) -> (Vec<Record>, RecordSource) {
    let Some(path) = path else {
        tracing::info!("no record file configured, using bundled scenes");
        return (fallback_records(), RecordSource::Fallback);
    };

    match load_csv(path).await {
        Ok(ingested) => {
            for err in &ingested.rejected {
                tracing::debug!(error = %err, "dropped record");
            }
            if ingested.short_rows > 0 {
                tracing::debug!(rows = ingested.short_rows, "skipped short rows");
            }
            if ingested.records.is_empty() {
                tracing::warn!(path = %path.display(), "no usable records, using bundled scenes");
                return (fallback_records(), RecordSource::Fallback);
            }
            tracing::info!(
                path = %path.display(),
                records = ingested.records.len(),
                rejected = ingested.rejected.len(),
                "records loaded"
            );
            (ingested.records, RecordSource::Csv)
        }
        Err(err) => {
            tracing::warn!(error = ?err, "falling back to bundled scenes");
            (fallback_records(), RecordSource::Fallback)
        }
    }
}

//! Job records as returned by scraping sources.
//!
//! Sources disagree on which keys they populate and how they spell them, so a
//! record is a handful of known fields plus an overflow bag for everything
//! else. Decoding never fails on a JSON object: unusable values become absent.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Typed overflow value. Scalars keep their type, anything nested stays JSON.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
    Json(Value),
}

impl FieldValue {
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Boolean(b),
            Value::String(s) => FieldValue::Text(s),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => n.as_f64().map(FieldValue::Float).unwrap_or(FieldValue::Null),
            },
            other => FieldValue::Json(other),
        }
    }

    /// Extract as string, returning None for non-text values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Alternate spellings folded into the known fields.
const KEY_ALIASES: &[(&str, &str)] = &[
    ("job_title", "title"),
    ("company_name", "company"),
    ("link", "job_url"),
    ("apply_url", "job_url_direct"),
    ("posted_at", "date_posted"),
    ("seniority_level", "job_level"),
    ("employment_type", "job_type"),
    ("description_text", "description"),
];

/// One posting as produced by a source adapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawJobRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_url_direct: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_posted: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Keys this struct does not model, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, FieldValue>,
}

impl RawJobRecord {
    /// Build a record from an arbitrary JSON object.
    pub fn from_map(map: Map<String, Value>) -> Self {
        let mut record = RawJobRecord::default();
        let mut aliased = Vec::new();

        for (key, value) in map {
            if let Some((_, canonical)) = KEY_ALIASES.iter().find(|(alias, _)| *alias == key) {
                aliased.push((key, *canonical, value));
                continue;
            }
            if !record.assign(&key, &value) {
                record.extra.insert(key, FieldValue::from_json(value));
            }
        }

        // Aliases only fill fields the canonical key left empty.
        for (key, canonical, value) in aliased {
            if record.is_known(canonical) && !record.has(canonical) && record.assign(canonical, &value) {
                continue;
            }
            record.extra.insert(key, FieldValue::from_json(value));
        }

        record
    }

    /// Build a record from any JSON value; non-objects yield `None`.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::from_map(map)),
            _ => None,
        }
    }

    fn is_known(&self, key: &str) -> bool {
        key == "date_posted" || self.text_slot_ref(key).is_some()
    }

    fn has(&self, key: &str) -> bool {
        if key == "date_posted" {
            return self.date_posted.is_some();
        }
        self.text_slot_ref(key).is_some_and(|slot| slot.is_some())
    }

    /// Store `value` under a known field. Returns false for unknown keys.
    fn assign(&mut self, key: &str, value: &Value) -> bool {
        if key == "date_posted" {
            self.date_posted = parse_posted_date(value);
            return true;
        }
        match self.text_slot(key) {
            Some(slot) => {
                *slot = lenient_text(value);
                true
            }
            None => false,
        }
    }

    fn text_slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            "site" => Some(&mut self.site),
            "title" => Some(&mut self.title),
            "company" => Some(&mut self.company),
            "location" => Some(&mut self.location),
            "job_type" => Some(&mut self.job_type),
            "job_level" => Some(&mut self.job_level),
            "job_url" => Some(&mut self.job_url),
            "job_url_direct" => Some(&mut self.job_url_direct),
            "description" => Some(&mut self.description),
            _ => None,
        }
    }

    fn text_slot_ref(&self, key: &str) -> Option<&Option<String>> {
        match key {
            "site" => Some(&self.site),
            "title" => Some(&self.title),
            "company" => Some(&self.company),
            "location" => Some(&self.location),
            "job_type" => Some(&self.job_type),
            "job_level" => Some(&self.job_level),
            "job_url" => Some(&self.job_url),
            "job_url_direct" => Some(&self.job_url_direct),
            "description" => Some(&self.description),
            _ => None,
        }
    }

    /// Fail-soft text lookup over known fields and the overflow bag.
    pub fn get(&self, key: &str) -> Option<&str> {
        match self.text_slot_ref(key) {
            Some(slot) => slot.as_deref(),
            None => self.extra.get(key).and_then(FieldValue::as_str),
        }
    }

    /// Best link for a reader: the direct employer URL when known.
    pub fn link(&self) -> Option<&str> {
        self.job_url_direct.as_deref().or(self.job_url.as_deref())
    }
}

impl<'de> Deserialize<'de> for RawJobRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Ok(RawJobRecord::from_map(map))
    }
}

/// Any scalar becomes text; null, blanks and NaN placeholders become absent.
fn lenient_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            let placeholder = ["nan", "none", "null"]
                .iter()
                .any(|p| trimmed.eq_ignore_ascii_case(p));
            (!trimmed.is_empty() && !placeholder).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(lenient_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Null | Value::Object(_) => None,
    }
}

/// Accepts `YYYY-MM-DD`, RFC 3339, naive timestamps and epoch seconds/millis.
fn parse_posted_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return Some(date);
            }
            if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
                return Some(ts.date_naive());
            }
            ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|ts| ts.date())
        }
        Value::Number(n) => {
            let raw = n.as_i64()?;
            // Anything past year ~5000 in seconds is really milliseconds.
            let ts = if raw.abs() >= 100_000_000_000 {
                DateTime::from_timestamp_millis(raw)
            } else {
                DateTime::from_timestamp(raw, 0)
            };
            ts.map(|t| t.date_naive())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_fields_and_overflow() {
        let rec: RawJobRecord = serde_json::from_value(json!({
            "site": "linkedin",
            "title": "Backend Engineer",
            "company": "Acme",
            "job_level": "entry level",
            "date_posted": "2025-03-02",
            "is_remote": false,
            "min_amount": 12000,
        }))
        .unwrap();

        assert_eq!(rec.title.as_deref(), Some("Backend Engineer"));
        assert_eq!(rec.job_level.as_deref(), Some("entry level"));
        assert_eq!(rec.date_posted, NaiveDate::from_ymd_opt(2025, 3, 2));
        assert_eq!(rec.extra.get("is_remote"), Some(&FieldValue::Boolean(false)));
        assert_eq!(rec.extra.get("min_amount"), Some(&FieldValue::Integer(12000)));
    }

    #[test]
    fn missing_and_placeholder_values_are_absent() {
        let rec: RawJobRecord = serde_json::from_value(json!({
            "title": "QA",
            "job_level": null,
            "job_type": "",
            "company": "NaN",
            "date_posted": "yesterday",
        }))
        .unwrap();

        assert!(rec.job_level.is_none());
        assert!(rec.job_type.is_none());
        assert!(rec.company.is_none());
        assert!(rec.date_posted.is_none());
        assert!(rec.get("location").is_none());
    }

    #[test]
    fn aliases_fill_empty_fields_only() {
        let rec = RawJobRecord::from_json(json!({
            "job_title": "Data Analyst",
            "company_name": "Globex",
            "link": "https://example.com/jobs/1",
            "seniority_level": "Internship",
            "employment_type": ["fulltime", "parttime"],
        }))
        .unwrap();

        assert_eq!(rec.title.as_deref(), Some("Data Analyst"));
        assert_eq!(rec.company.as_deref(), Some("Globex"));
        assert_eq!(rec.job_url.as_deref(), Some("https://example.com/jobs/1"));
        assert_eq!(rec.job_level.as_deref(), Some("Internship"));
        assert_eq!(rec.job_type.as_deref(), Some("fulltime, parttime"));

        let both = RawJobRecord::from_json(json!({
            "title": "Canonical",
            "job_title": "Alias",
        }))
        .unwrap();
        assert_eq!(both.title.as_deref(), Some("Canonical"));
        assert_eq!(both.get("job_title"), Some("Alias"));
    }

    #[test]
    fn posted_date_formats() {
        let cases = [
            (json!("2024-11-05"), Some((2024, 11, 5))),
            (json!("2024-11-05T10:15:00Z"), Some((2024, 11, 5))),
            (json!("2024-11-05 10:15:00"), Some((2024, 11, 5))),
            (json!(1_730_800_000_000_i64), Some((2024, 11, 5))),
            (json!(1_730_800_000), Some((2024, 11, 5))),
            (json!(null), None),
        ];
        for (value, expected) in cases {
            let got = parse_posted_date(&value);
            let want = expected.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
            assert_eq!(got, want, "value: {value}");
        }
    }

    #[test]
    fn serializes_flat_without_absent_fields() {
        let rec = RawJobRecord::from_json(json!({
            "title": "SRE",
            "date_posted": "2025-01-09",
            "emails": ["a@example.com"],
        }))
        .unwrap();
        let out = serde_json::to_value(&rec).unwrap();
        assert_eq!(out["title"], "SRE");
        assert_eq!(out["date_posted"], "2025-01-09");
        assert_eq!(out["emails"], json!(["a@example.com"]));
        assert!(out.get("company").is_none());
    }

    #[test]
    fn link_prefers_direct_url() {
        let mut rec = RawJobRecord {
            job_url: Some("https://board.example/1".into()),
            ..Default::default()
        };
        assert_eq!(rec.link(), Some("https://board.example/1"));
        rec.job_url_direct = Some("https://careers.example/1".into());
        assert_eq!(rec.link(), Some("https://careers.example/1"));
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(RawJobRecord::from_json(json!([1, 2])).is_none());
        assert!(serde_json::from_value::<RawJobRecord>(json!("x")).is_err());
    }
}

// File: ./src/model/item.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// `DD/MM/YYYY`, the only textual date format produced or consumed.
pub const DATE_FORMAT: &str = "%d/%m/%Y";
/// `HH:MM`, 24-hour clock.
pub const TIME_FORMAT: &str = "%H:%M";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

pub fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), TIME_FORMAT).ok()
}

/// Result of one extraction pass over a piece of text.
/// Every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub date: Option<NaiveDate>,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
    pub description: Option<String>,
}

impl ExtractedFields {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.description.is_none()
    }
}

/// A persisted calendar event. `id` is the only merge key.
///
/// The on-disk field names follow the downstream consumers (`titulo`, `data`,
/// `inicio`, `termino`, `descricao`). Absent values are written as `""` and
/// blank strings load back as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "titulo", default, with = "blank_text")]
    pub title: Option<String>,
    #[serde(with = "external_id")]
    pub id: String,
    #[serde(default, with = "blank_text")]
    pub link: Option<String>,
    #[serde(rename = "data", default, with = "day_month_year")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "inicio", default, with = "hour_minute")]
    pub start: Option<NaiveTime>,
    #[serde(rename = "termino", default, with = "hour_minute")]
    pub end: Option<NaiveTime>,
    #[serde(rename = "descricao", default, with = "blank_text")]
    pub description: Option<String>,
}

impl EventRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            title: None,
            id: id.into(),
            link: None,
            date: None,
            start: None,
            end: None,
            description: None,
        }
    }

    /// Builds a record from a notification's identity and the fields extracted for it.
    pub fn from_fields(id: &str, title: &str, link: &str, fields: ExtractedFields) -> Self {
        let non_blank = |s: &str| {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        };
        Self {
            title: non_blank(title),
            id: id.trim().to_string(),
            link: non_blank(link),
            date: fields.date,
            start: fields.start,
            end: fields.end,
            description: fields.description,
        }
    }

    /// True when everything a calendar entry needs is known.
    pub fn is_complete(&self) -> bool {
        self.title.is_some()
            && !self.id.is_empty()
            && self.date.is_some()
            && self.start.is_some()
            && self.end.is_some()
    }

    pub fn date_string(&self) -> String {
        self.date.map(format_date).unwrap_or_default()
    }

    pub fn start_string(&self) -> String {
        self.start.map(format_time).unwrap_or_default()
    }

    pub fn end_string(&self) -> String {
        self.end.map(format_time).unwrap_or_default()
    }
}

mod blank_text {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(raw.filter(|s| !s.trim().is_empty()))
    }
}

// Older snapshots stored ids as JSON numbers.
mod external_id {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    pub fn serialize<S: Serializer>(value: &str, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match RawId::deserialize(d)? {
            RawId::Text(s) => s.trim().to_string(),
            RawId::Unsigned(n) => n.to_string(),
            RawId::Signed(n) => n.to_string(),
        })
    }
}

mod day_month_year {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_str(&super::format_date(*d)),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(raw.as_deref().and_then(|s| {
            if s.trim().is_empty() {
                return None;
            }
            let parsed = super::parse_date(s);
            if parsed.is_none() {
                log::warn!("Ignoring unreadable stored date '{}'", s);
            }
            parsed
        }))
    }
}

mod hour_minute {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(t) => s.serialize_str(&super::format_time(*t)),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(raw.as_deref().and_then(|s| {
            if s.trim().is_empty() {
                return None;
            }
            let parsed = super::parse_time(s);
            if parsed.is_none() {
                log::warn!("Ignoring unreadable stored time '{}'", s);
            }
            parsed
        }))
    }
}

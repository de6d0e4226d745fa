// File: ./src/model/candidate.rs
//! Combines the card text and the optional detail text into one set of fields.
use crate::model::ExtractedFields;
use crate::model::normalize::collapse_whitespace;
use crate::model::parser::extract_temporal;
use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_DURATION_MINUTES: i64 = 60;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s<>"']+"#).expect("valid url regex"));

static HREF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#).expect("valid href regex")
});

/// Best-effort description from the detail text: the first http(s) URL, else
/// the target of the first embedded link, else the whole text collapsed.
pub fn extract_description(detail: &str) -> Option<String> {
    if let Some(m) = URL_RE.find(detail) {
        return Some(m.as_str().to_string());
    }
    if let Some(caps) = HREF_RE.captures(detail) {
        let target = caps[1].trim();
        if !target.is_empty() {
            return Some(target.to_string());
        }
    }
    let collapsed = collapse_whitespace(detail);
    (!collapsed.is_empty()).then_some(collapsed)
}

fn default_duration(minutes: i64) -> Duration {
    match Duration::try_minutes(minutes) {
        Some(d) if minutes > 0 => d,
        _ => {
            log::warn!(
                "Invalid default duration of {} minutes, using {}",
                minutes,
                DEFAULT_DURATION_MINUTES
            );
            Duration::minutes(DEFAULT_DURATION_MINUTES)
        }
    }
}

/// Builds the fields of one notification.
///
/// Each field comes from the detail text when it has one, else from the card.
/// When neither text has an end, the end is the composed start plus
/// `duration_minutes` (clock arithmetic, no date rollover). A duration that is
/// not a positive, representable number of minutes is replaced by
/// [`DEFAULT_DURATION_MINUTES`].
pub fn build_candidate(
    card_text: &str,
    detail_text: Option<&str>,
    today: NaiveDate,
    duration_minutes: i64,
) -> ExtractedFields {
    let card = extract_temporal(card_text, today);
    let detail = detail_text
        .map(|text| {
            let mut fields = extract_temporal(text, today);
            fields.description = extract_description(text);
            fields
        })
        .unwrap_or_default();

    let start = detail.start.or(card.start);
    let mut end = detail.end.or(card.end);

    if end.is_none()
        && let Some(s) = start
    {
        let (shifted, _) = s.overflowing_add_signed(default_duration(duration_minutes));
        end = Some(shifted);
    }

    ExtractedFields {
        date: detail.date.or(card.date),
        start,
        end,
        description: detail.description.or(card.description),
    }
}

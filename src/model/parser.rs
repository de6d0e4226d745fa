// File: src/model/parser.rs
//! Date and clock-time extraction from notification text.
//!
//! Three independent rules, composed by [`extract_temporal`]:
//! - an explicit `19 de setembro de 2025` date,
//! - the relative words `hoje`, `amanhã`, `depois de amanhã`,
//! - a scan for `H:MM` / `HH:MM` tokens.
use crate::model::ExtractedFields;
use crate::model::normalize::normalize;
use chrono::{Duration, NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

static EXPLICIT_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})\s+de\s+([a-z]+)\s+de\s+(\d{4})\b").expect("valid date regex")
});

static TIME_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2}):(\d{2})\b").expect("valid time regex"));

// Checked in this order; the first hit wins.
const RELATIVE_DAYS: [(&str, i64); 3] = [("depois de amanha", 2), ("amanha", 1), ("hoje", 0)];

/// Resolves a pt-BR month name. Accepts accented and unaccented spellings
/// ("março" / "marco") and any letter case.
pub fn month_from_name(name: &str) -> Option<u32> {
    let month = match normalize(name).as_str() {
        "janeiro" => 1,
        "fevereiro" => 2,
        "marco" => 3,
        "abril" => 4,
        "maio" => 5,
        "junho" => 6,
        "julho" => 7,
        "agosto" => 8,
        "setembro" => 9,
        "outubro" => 10,
        "novembro" => 11,
        "dezembro" => 12,
        _ => return None,
    };
    Some(month)
}

/// Finds `<day> de <month> de <year>` in the text.
///
/// Matches whose month name is unknown, or whose triple is not a real
/// calendar day, are skipped.
pub fn parse_explicit_date(text: &str) -> Option<NaiveDate> {
    let normalized = normalize(text);
    EXPLICIT_DATE_RE.captures_iter(&normalized).find_map(|caps| {
        let day = caps[1].parse::<u32>().ok()?;
        let month = month_from_name(&caps[2])?;
        let year = caps[3].parse::<i32>().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

/// Resolves "depois de amanhã", "amanhã" or "hoje" against `today`.
pub fn parse_relative_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let normalized = normalize(text);
    RELATIVE_DAYS
        .iter()
        .find(|(phrase, _)| normalized.contains(phrase))
        .map(|(_, offset)| today + Duration::days(*offset))
}

/// Collects every valid clock time in order of appearance.
pub fn scan_times(text: &str) -> Vec<NaiveTime> {
    TIME_TOKEN_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let hour = caps[1].parse::<u32>().ok()?;
            let minute = caps[2].parse::<u32>().ok()?;
            NaiveTime::from_hms_opt(hour, minute, 0)
        })
        .collect()
}

/// Extracts date, start and end from a text fragment.
///
/// The explicit date wins over relative words. Times are scanned on the raw
/// text: the first token is the start, the second the end, the rest ignored.
pub fn extract_temporal(text: &str, today: NaiveDate) -> ExtractedFields {
    let date = parse_explicit_date(text).or_else(|| parse_relative_date(text, today));
    let mut times = scan_times(text).into_iter();
    let start = times.next();
    let end = times.next();

    ExtractedFields {
        date,
        start,
        end,
        description: None,
    }
}

// File: ./src/sync.rs
//! Outbound side: pushing stored events to a remote calendar.
//!
//! This crate does not ship a calendar API client. A `CalendarBackend`
//! implementation does the network calls; this module decides what to send
//! and performs the existence-check-then-create-or-update loop keyed by the
//! external id.
use crate::model::EventRecord;
use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::BTreeMap;

/// Private extended property holding the source system's id.
pub const EXTERNAL_ID_PROPERTY: &str = "bitrix_id";
pub const SOURCE_TITLE: &str = "Bitrix";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    pub date_time: String,
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtendedProperties {
    pub private: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSource {
    pub title: String,
    pub url: String,
}

/// Upload payload in the shape calendar APIs expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBody {
    pub summary: String,
    pub start: EventTime,
    pub end: EventTime,
    pub description: String,
    pub extended_properties: ExtendedProperties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<EventSource>,
}

/// Interprets a wall-clock date/time in `tz`. `None` for times that do not
/// exist in that zone (DST gap).
pub fn zoned(date: NaiveDate, time: NaiveTime, tz: Tz) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&date.and_time(time)).earliest()
}

impl EventBody {
    /// Builds the payload, or `None` when the record is incomplete.
    ///
    /// An end clock time at or before the start is taken to be on the next day.
    pub fn from_record(record: &EventRecord, tz: Tz) -> Option<Self> {
        if !record.is_complete() {
            return None;
        }
        let title = record.title.as_deref()?.trim().to_string();
        let date = record.date?;
        let start = zoned(date, record.start?, tz)?;
        let end_time = record.end?;
        let end_date = if end_time <= record.start? {
            date + Duration::days(1)
        } else {
            date
        };
        let end = zoned(end_date, end_time, tz)?;

        let mut lines = vec![
            format!("Fonte: {}", SOURCE_TITLE),
            format!("ID: {}", record.id),
        ];
        let link = record.link.as_deref().map(str::trim).filter(|l| !l.is_empty());
        if let Some(l) = link {
            lines.push(l.to_string());
        }
        if let Some(d) = &record.description {
            lines.push(d.clone());
        }

        let mut private = BTreeMap::new();
        private.insert(EXTERNAL_ID_PROPERTY.to_string(), record.id.clone());

        Some(Self {
            summary: title,
            start: EventTime {
                date_time: start.to_rfc3339(),
                time_zone: tz.name().to_string(),
            },
            end: EventTime {
                date_time: end.to_rfc3339(),
                time_zone: tz.name().to_string(),
            },
            description: lines.join("\n"),
            extended_properties: ExtendedProperties { private },
            source: link.map(|url| EventSource {
                title: SOURCE_TITLE.to_string(),
                url: url.to_string(),
            }),
        })
    }
}

/// Remote calendar operations needed for an idempotent upsert.
/// Every call names the target calendar (`primary` for the account's own).
pub trait CalendarBackend {
    /// Remote event id of the event carrying `external_id`, if any.
    fn find_by_external_id(
        &mut self,
        calendar_id: &str,
        external_id: &str,
    ) -> Result<Option<String>>;
    fn insert(&mut self, calendar_id: &str, body: &EventBody) -> Result<()>;
    fn update(&mut self, calendar_id: &str, remote_id: &str, body: &EventBody) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Upserts every complete record into `calendar_id`. A failing record is
/// logged and counted.
pub fn sync_events(
    backend: &mut dyn CalendarBackend,
    calendar_id: &str,
    records: &[EventRecord],
    tz: Tz,
) -> SyncSummary {
    let mut summary = SyncSummary::default();

    for record in records {
        let Some(body) = EventBody::from_record(record, tz) else {
            log::warn!("Incomplete, skipping: event {}", record.id);
            summary.skipped += 1;
            continue;
        };

        let outcome = backend
            .find_by_external_id(calendar_id, &record.id)
            .and_then(|existing| match existing {
                Some(remote_id) => backend.update(calendar_id, &remote_id, &body).map(|_| true),
                None => backend.insert(calendar_id, &body).map(|_| false),
            });

        match outcome {
            Ok(true) => {
                log::info!("Updated: {} ({})", body.summary, record.id);
                summary.updated += 1;
            }
            Ok(false) => {
                log::info!(
                    "Created: {} ({} {}-{})",
                    body.summary,
                    record.date_string(),
                    record.start_string(),
                    record.end_string()
                );
                summary.created += 1;
            }
            Err(e) => {
                log::error!("Failed to sync '{}' ({}): {}", body.summary, record.id, e);
                summary.failed += 1;
            }
        }
    }

    log::info!(
        "Sync summary for calendar '{}': created={}, updated={}, skipped={}, failed={}",
        calendar_id,
        summary.created,
        summary.updated,
        summary.skipped,
        summary.failed
    );
    summary
}

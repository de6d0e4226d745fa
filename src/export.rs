// File: ./src/export.rs
// Renders the snapshot as an iCalendar file for import into any calendar.
use crate::model::EventRecord;
use crate::sync::EventBody;
use chrono::Utc;
use chrono_tz::Tz;
use icalendar::{Calendar, CalendarDateTime, Component, Event, EventLike};

pub const EXTERNAL_ID_ICS_PROPERTY: &str = "X-NOTIFCAL-EXTERNAL-ID";

fn to_vevent(record: &EventRecord, tz: Tz) -> Option<Event> {
    // Same completeness rule and end-rollover as the sync payload.
    let body = EventBody::from_record(record, tz)?;
    let date = record.date?;
    let start = date.and_time(record.start?);
    let end_time = record.end?;
    let end_date = if end_time <= record.start? {
        date.succ_opt()?
    } else {
        date
    };

    let mut event = Event::new();
    event
        .uid(&format!("{}@notifcal", record.id))
        .summary(&body.summary)
        .description(&body.description)
        .timestamp(Utc::now())
        .starts(CalendarDateTime::WithTimezone {
            date_time: start,
            tzid: tz.name().to_string(),
        })
        .ends(CalendarDateTime::WithTimezone {
            date_time: end_date.and_time(end_time),
            tzid: tz.name().to_string(),
        })
        .add_property(EXTERNAL_ID_ICS_PROPERTY, &record.id);
    if let Some(src) = &body.source {
        event.add_property("URL", &src.url);
    }
    Some(event.done())
}

/// One VCALENDAR with a VEVENT per complete record; incomplete ones are left out.
pub fn to_ics_string(records: &[EventRecord], tz: Tz) -> String {
    let mut calendar = Calendar::new();
    for record in records {
        if let Some(event) = to_vevent(record, tz) {
            calendar.push(event);
        }
    }
    calendar.done().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn test_only_complete_records_are_exported() {
        let mut full = EventRecord::new("55");
        full.title = Some("Retro".into());
        full.date = NaiveDate::from_ymd_opt(2025, 9, 19);
        full.start = NaiveTime::from_hms_opt(10, 30, 0);
        full.end = NaiveTime::from_hms_opt(11, 0, 0);
        let partial = EventRecord::new("56");

        let ics = to_ics_string(&[full, partial], chrono_tz::America::Sao_Paulo);
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert!(ics.contains("UID:55@notifcal"));
        assert!(ics.contains("SUMMARY:Retro"));
        assert!(ics.contains("X-NOTIFCAL-EXTERNAL-ID:55"));
        assert!(ics.contains("DTSTART;TZID=America/Sao_Paulo:20250919T103000"));
        assert!(!ics.contains("56@notifcal"));
    }
}

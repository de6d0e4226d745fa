// File: tests/pipeline_runs.rs
// End-to-end runs against a temporary data directory.
use anyhow::Result;
use chrono::NaiveDate;
use notifcal::config::Config;
use notifcal::context::{AppContext, TestContext};
use notifcal::controller::{Harvester, RunStatus};
use notifcal::source::{Notification, NotificationSource, SnapshotSource};
use notifcal::storage::LocalStorage;
use notifcal::sync::{CalendarBackend, EXTERNAL_ID_PROPERTY, EventBody};
use std::collections::HashMap;
use std::fs;

const PHRASE_CARD: &str = "Você concordou em participar do evento \"Planejamento\" \
                           a ser realizado em Sexta-feira, 19 de setembro de 2025 10:30";

struct FakeSource {
    items: Vec<Notification>,
    details: HashMap<String, String>,
}

impl NotificationSource for FakeSource {
    fn notifications(&mut self) -> Result<Vec<Notification>> {
        Ok(self.items.clone())
    }

    fn fetch_detail(&mut self, n: &Notification) -> Result<String> {
        let id = n.external_id().unwrap_or_default();
        self.details
            .get(&id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("slider did not open"))
    }
}

fn notification(id: &str, card: &str) -> Notification {
    Notification {
        title: format!(" Evento {} ", id),
        id: None,
        url: format!("https://corp.bitrix24.com.br/calendar/?EVENT_ID={}", id),
        card_text: card.to_string(),
        detail_text: None,
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 15).unwrap()
}

#[test]
fn test_fallback_then_detail_improves_record() {
    let ctx = TestContext::new();
    let harvester = Harvester::new(&ctx, Config::default());

    // Run 1: detail view unreachable, card fallback only.
    let mut source = FakeSource {
        items: vec![notification("100", PHRASE_CARD)],
        details: HashMap::new(),
    };
    let report = harvester.run(&mut source, today()).unwrap();
    assert_eq!(report.status, RunStatus::Updated);
    assert_eq!(report.added, 1);
    assert_eq!(report.with_detail, 0);

    let stored = LocalStorage::load_events(&ctx.get_events_json_path().unwrap());
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].title.as_deref(), Some("Evento 100"));
    assert_eq!(stored[0].date_string(), "19/09/2025");
    assert_eq!(stored[0].start_string(), "10:30");
    assert_eq!(stored[0].end_string(), "11:30");
    assert_eq!(stored[0].description, None);

    // Run 2: detail reachable with the real end time and a meeting link.
    source.details.insert(
        "100".into(),
        "Sexta-feira, 19 de setembro de 2025, de 10:30 até 12:00 https://meet.example/xyz".into(),
    );
    let report = harvester.run(&mut source, today()).unwrap();
    assert_eq!(report.added, 0);
    assert_eq!(report.with_detail, 1);

    let stored = LocalStorage::load_events(&ctx.get_events_json_path().unwrap());
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].end_string(), "12:00");
    assert_eq!(stored[0].description.as_deref(), Some("https://meet.example/xyz"));
}

#[test]
fn test_failed_extraction_does_not_erase_previous_values() {
    let ctx = TestContext::new();
    let harvester = Harvester::new(&ctx, Config::default());

    let mut good = FakeSource {
        items: vec![notification("7", PHRASE_CARD)],
        details: HashMap::new(),
    };
    harvester.run(&mut good, today()).unwrap();

    // Same notification, but the card lost its date/time text.
    let mut degraded = FakeSource {
        items: vec![notification("7", "Você concordou em participar do evento")],
        details: HashMap::new(),
    };
    harvester.run(&mut degraded, today()).unwrap();

    let stored = LocalStorage::load_events(&ctx.get_events_json_path().unwrap());
    assert_eq!(stored[0].date_string(), "19/09/2025");
    assert_eq!(stored[0].start_string(), "10:30");
    assert_eq!(stored[0].end_string(), "11:30");
}

#[test]
fn test_gate_and_order() {
    let ctx = TestContext::new();
    let harvester = Harvester::new(&ctx, Config::default());
    let mut source = FakeSource {
        items: vec![
            notification("3", "VOCE CONCORDOU EM PARTICIPAR DO EVENTO hoje 08:00"),
            notification("4", "Você foi convidado para o evento amanhã 09:00"),
            notification("1", PHRASE_CARD),
        ],
        details: HashMap::new(),
    };
    let report = harvester.run(&mut source, today()).unwrap();
    assert_eq!(report.matched, 2);

    let stored = LocalStorage::load_events(&ctx.get_events_json_path().unwrap());
    let ids: Vec<&str> = stored.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "1"]);
    assert_eq!(stored[0].date_string(), "15/09/2025");
}

#[test]
fn test_no_match_keeps_previous_snapshot() {
    let ctx = TestContext::new();
    let json = ctx.get_events_json_path().unwrap();
    fs::write(
        &json,
        r#"[{"titulo": "Antigo", "id": 55, "link": "", "data": "02/09/2025", "inicio": "08:00", "termino": "09:00"}]"#,
    )
    .unwrap();

    let harvester = Harvester::new(&ctx, Config::default());
    let mut source = FakeSource {
        items: vec![notification("9", "Lembrete genérico")],
        details: HashMap::new(),
    };
    let report = harvester.run(&mut source, today()).unwrap();
    assert_eq!(report.status, RunStatus::NoMatchedNotifications);
    assert_eq!(report.total, 1);

    let stored = LocalStorage::load_events(&json);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, "55");
    // The companion module was regenerated too.
    let module = fs::read_to_string(ctx.get_events_module_path().unwrap()).unwrap();
    assert!(module.starts_with("EVENTS = ["));
}

#[test]
fn test_corrupt_snapshot_starts_empty() {
    let ctx = TestContext::new();
    fs::write(ctx.get_events_json_path().unwrap(), "garbage").unwrap();

    let harvester = Harvester::new(&ctx, Config::default());
    let mut source = FakeSource {
        items: vec![notification("1", PHRASE_CARD)],
        details: HashMap::new(),
    };
    let report = harvester.run(&mut source, today()).unwrap();
    assert_eq!(report.total, 1);
}

#[test]
fn test_output_dir_override() {
    let ctx = TestContext::new();
    let out = ctx.root.join("out");
    let config = Config {
        output_dir: Some(out.clone()),
        ..Config::default()
    };
    let harvester = Harvester::new(&ctx, config);
    let mut source = FakeSource {
        items: vec![notification("1", PHRASE_CARD)],
        details: HashMap::new(),
    };
    harvester.run(&mut source, today()).unwrap();
    assert!(out.join("events.json").exists());
    assert!(out.join("events.py").exists());
}

#[test]
fn test_snapshot_source_end_to_end() {
    let ctx = TestContext::new();
    let input = ctx.root.join("notifications.json");
    fs::write(
        &input,
        r#"[
          {"title": "Daily", "url": "https://x/calendar/?EVENT_ID=31",
           "card_text": "Você concordou em participar do evento em 19 de setembro de 2025 10:30",
           "detail_text": "amanhã, de 09:30 até 10:30"},
          {"title": "Sem id", "url": "https://x/calendar/",
           "card_text": "Você concordou em participar do evento"}
        ]"#,
    )
    .unwrap();

    let harvester = Harvester::new(&ctx, Config::default());
    let report = harvester
        .run(&mut SnapshotSource::new(&input), today())
        .unwrap();
    assert_eq!(report.matched, 1);

    let stored = LocalStorage::load_events(&ctx.get_events_json_path().unwrap());
    assert_eq!(stored.len(), 1);
    // Detail text wins over the card.
    assert_eq!(stored[0].date_string(), "16/09/2025");
    assert_eq!(stored[0].start_string(), "09:30");
    assert_eq!(stored[0].end_string(), "10:30");
}

#[test]
fn test_unreadable_input_aborts_run() {
    let ctx = TestContext::new();
    let harvester = Harvester::new(&ctx, Config::default());
    let mut source = SnapshotSource::new(ctx.root.join("missing.json"));
    assert!(harvester.run(&mut source, today()).is_err());
}

#[derive(Default)]
struct RecordingCalendar {
    inserted: Vec<(String, EventBody)>,
}

impl CalendarBackend for RecordingCalendar {
    fn find_by_external_id(&mut self, calendar_id: &str, external_id: &str) -> Result<Option<String>> {
        Ok(self
            .inserted
            .iter()
            .position(|(cal, b)| {
                cal == calendar_id && b.extended_properties.private[EXTERNAL_ID_PROPERTY] == external_id
            })
            .map(|i| i.to_string()))
    }

    fn insert(&mut self, calendar_id: &str, body: &EventBody) -> Result<()> {
        self.inserted.push((calendar_id.to_string(), body.clone()));
        Ok(())
    }

    fn update(&mut self, _calendar_id: &str, remote_id: &str, body: &EventBody) -> Result<()> {
        let i: usize = remote_id.parse()?;
        self.inserted[i].1 = body.clone();
        Ok(())
    }
}

#[test]
fn test_sync_uses_configured_calendar() {
    let ctx = TestContext::new();
    let config = Config {
        calendar_id: "equipe@group.calendar.google.com".into(),
        ..Config::default()
    };
    let harvester = Harvester::new(&ctx, config);
    let mut source = FakeSource {
        items: vec![notification("100", PHRASE_CARD)],
        details: HashMap::new(),
    };
    harvester.run(&mut source, today()).unwrap();

    let mut calendar = RecordingCalendar::default();
    let summary = harvester.sync(&mut calendar).unwrap();
    assert_eq!(summary.created, 1);
    assert_eq!(calendar.inserted.len(), 1);
    assert_eq!(calendar.inserted[0].0, "equipe@group.calendar.google.com");
    assert_eq!(calendar.inserted[0].1.summary, "Evento 100");

    let again = harvester.sync(&mut calendar).unwrap();
    assert_eq!(again.updated, 1);
    assert_eq!(calendar.inserted.len(), 1);
}

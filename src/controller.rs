// File: src/controller.rs
//! One ingestion run: load snapshot, extract, reconcile, persist.
//!
//! Every notification is processed to completion before the next one. A
//! failure inside one notification (no detail, nothing parsed) never stops
//! the run; only reading the inbound list or writing the outputs can.
use crate::config::Config;
use crate::context::AppContext;
use crate::model::EventRecord;
use crate::model::candidate::build_candidate;
use crate::source::{NotificationSource, qualifies};
use crate::storage::LocalStorage;
use crate::sync::{CalendarBackend, SyncSummary, sync_events};
use anyhow::Result;
use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Nothing qualified; the previous snapshot was rewritten unchanged.
    NoMatchedNotifications,
    Updated,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::NoMatchedNotifications => {
                write!(f, "NO_MATCHED_NOTIFICATIONS_KEEPING_PREVIOUS")
            }
            RunStatus::Updated => write!(f, "OK_NOTIFICATIONS_AND_DETAILS"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub status: RunStatus,
    /// Notifications that passed the phrase gate.
    pub matched: usize,
    /// Of those, how many had usable detail text.
    pub with_detail: usize,
    /// Ids that were not in the snapshot before this run.
    pub added: usize,
    /// Size of the store after the run.
    pub total: usize,
}

pub struct Harvester<'a> {
    ctx: &'a dyn AppContext,
    config: Config,
}

impl<'a> Harvester<'a> {
    pub fn new(ctx: &'a dyn AppContext, config: Config) -> Self {
        Self { ctx, config }
    }

    pub fn output_paths(&self) -> Result<(PathBuf, PathBuf)> {
        self.config.output_paths(self.ctx)
    }

    /// Turns qualifying notifications into candidate records, in discovery order.
    pub fn collect_candidates(
        &self,
        source: &mut dyn NotificationSource,
        today: NaiveDate,
    ) -> Result<(Vec<EventRecord>, usize)> {
        let notifications = source.notifications()?;
        let mut candidates = Vec::new();
        let mut with_detail = 0;

        for n in notifications
            .iter()
            .filter(|n| qualifies(&n.card_text, &self.config.target_phrase))
        {
            let Some(id) = n.external_id() else {
                log::warn!("Skipping notification without event id: {}", n.url);
                continue;
            };
            log::info!("Extracting event {} ({})", id, n.title.trim());

            let detail = match source.fetch_detail(n) {
                Ok(text) => {
                    log::debug!("Detail text for {}: {}", id, text);
                    with_detail += 1;
                    Some(text)
                }
                Err(e) => {
                    log::warn!("Could not read details of event {}: {}", id, e);
                    None
                }
            };

            let fields = build_candidate(
                &n.card_text,
                detail.as_deref(),
                today,
                self.config.default_duration_minutes,
            );
            if fields.date.is_none() {
                log::warn!("No date found for event {}; keeping it for a later run", id);
            }
            candidates.push(EventRecord::from_fields(&id, &n.title, &n.url, fields));
        }

        Ok((candidates, with_detail))
    }

    pub fn run(&self, source: &mut dyn NotificationSource, today: NaiveDate) -> Result<RunReport> {
        let (json_path, module_path) = self.output_paths()?;
        let mut store = LocalStorage::load_store(&json_path);
        log::info!("Loaded {} stored events", store.len());

        let (candidates, with_detail) = self.collect_candidates(source, today)?;
        let matched = candidates.len();

        if candidates.is_empty() {
            log::warn!("No notification matched the target phrase; keeping the current snapshot");
            LocalStorage::persist(&json_path, &module_path, store.records())?;
            return Ok(RunReport {
                status: RunStatus::NoMatchedNotifications,
                matched: 0,
                with_detail: 0,
                added: 0,
                total: store.len(),
            });
        }

        let before = store.len();
        store.reconcile(candidates);
        LocalStorage::persist(&json_path, &module_path, store.records())?;

        Ok(RunReport {
            status: RunStatus::Updated,
            matched,
            with_detail,
            added: store.len() - before,
            total: store.len(),
        })
    }

    /// Pushes the stored snapshot to the configured calendar.
    pub fn sync(&self, backend: &mut dyn CalendarBackend) -> Result<SyncSummary> {
        let tz = self
            .config
            .tz()
            .ok_or_else(|| anyhow::anyhow!("Unknown timezone '{}'", self.config.timezone))?;
        let (json_path, _) = self.output_paths()?;
        let records = LocalStorage::load_events(&json_path);
        Ok(sync_events(backend, &self.config.calendar_id, &records, tz))
    }
}

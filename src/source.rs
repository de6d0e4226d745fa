// File: ./src/source.rs
//! Inbound side: notifications handed over by the scraping automation.
use crate::model::normalize::contains_phrase;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

static EVENT_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[?&]EVENT_ID=(\d+)\b").expect("valid event id regex"));

/// One calendar notification as scraped from the web application.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Notification {
    pub title: String,
    /// External id. When missing it is taken from the `EVENT_ID` in `url`.
    #[serde(default)]
    pub id: Option<String>,
    pub url: String,
    pub card_text: String,
    /// Richer text from the event's detail view, if it was captured.
    #[serde(default)]
    pub detail_text: Option<String>,
}

impl Notification {
    pub fn external_id(&self) -> Option<String> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| event_id_from_url(&self.url))
    }
}

/// Pulls the numeric `EVENT_ID` query parameter out of a calendar link.
pub fn event_id_from_url(url: &str) -> Option<String> {
    EVENT_ID_RE.captures(url).map(|c| c[1].to_string())
}

/// True when the card mentions `target_phrase`, ignoring case and accents.
pub fn qualifies(card_text: &str, target_phrase: &str) -> bool {
    contains_phrase(card_text, target_phrase)
}

/// Where notifications and their detail text come from.
pub trait NotificationSource {
    fn notifications(&mut self) -> Result<Vec<Notification>>;

    /// Fetches the detail text for one notification. This may fail (the
    /// detail view can be unreachable); callers treat failure as "no detail".
    fn fetch_detail(&mut self, notification: &Notification) -> Result<String>;
}

/// Reads a JSON list of scraped notifications from disk.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl NotificationSource for SnapshotSource {
    fn notifications(&mut self) -> Result<Vec<Notification>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read notifications from {:?}", self.path))?;
        let items: Vec<Notification> = serde_json::from_str(&content).with_context(|| {
            format!("{:?} is not a list of scraped notifications", self.path)
        })?;
        Ok(items)
    }

    fn fetch_detail(&mut self, notification: &Notification) -> Result<String> {
        notification
            .detail_text
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("no detail captured"))
    }
}

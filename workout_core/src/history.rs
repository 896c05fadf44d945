//! Session history log.
//!
//! Entries are appended once per completed session and never removed.
//! Hiding an entry only flips its visibility flag: list views read
//! [`HistoryLog::visible`], analytics read [`HistoryLog::all`].

use crate::{Error, HistoryEntry, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        Self { entries }
    }

    pub fn append(&mut self, entry: HistoryEntry) {
        tracing::debug!("Appending history entry {} for plan {}", entry.id, entry.plan_id);
        self.entries.push(entry);
    }

    /// Full log, tombstoned entries included
    pub fn all(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Entries shown in the log view
    pub fn visible(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().filter(|e| e.visible)
    }

    pub fn get(&self, id: Uuid) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn set_visible(&mut self, id: Uuid, visible: bool) -> Result<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| Error::NotFound(format!("history entry {}", id)))?;
        entry.visible = visible;
        tracing::info!("History entry {} visible={}", id, visible);
        Ok(())
    }

    /// Flip visibility, returning the new value
    pub fn toggle_visibility(&mut self, id: Uuid) -> Result<bool> {
        let current = self
            .get(id)
            .map(|e| e.visible)
            .ok_or_else(|| Error::NotFound(format!("history entry {}", id)))?;
        self.set_visible(id, !current)?;
        Ok(!current)
    }

    /// Whether this plan already has a visible entry on `date`
    pub fn has_visible_entry(&self, plan_id: Uuid, date: NaiveDate) -> bool {
        self.visible().any(|e| e.plan_id == plan_id && e.date == date)
    }

    /// Every entry on a calendar day, hidden ones included
    pub fn entries_on(&self, date: NaiveDate) -> Vec<&HistoryEntry> {
        self.entries.iter().filter(|e| e.date == date).collect()
    }

    /// Distinct exercise names with a recorded weight anywhere in the log
    pub fn exercise_names(&self) -> BTreeSet<&str> {
        self.entries
            .iter()
            .flat_map(|e| {
                e.weights
                    .iter()
                    .filter(|(_, w)| w.is_some())
                    .map(|(name, _)| name.as_str())
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

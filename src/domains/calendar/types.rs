use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::validation::ISO_DATE_FORMAT;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One Ekadashi in the reference calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub id: Uuid,
    pub name: String,
    pub date: NaiveDate,
}

impl CalendarEntry {
    /// `"<name> (<date>)"`, the label used in selectors and chart buckets
    pub fn label(&self) -> String {
        entry_label(&self.name, &self.date)
    }
}

pub fn entry_label(name: &str, date: &NaiveDate) -> String {
    format!("{} ({})", name, date.format(ISO_DATE_FORMAT))
}

/// Reference data is seeded by administrators of the data store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCalendarEntry {
    pub name: String,
    pub date: NaiveDate,
}

/// How the caller presents the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMode {
    /// Dashboard single-metric view: pre-select a default entry
    Dashboard,
    /// Add-donation form and history filter: start with nothing selected
    Form,
}

/// Entries a user may choose from plus the pre-selected one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarWindow {
    pub today: NaiveDate,
    pub entries: Vec<CalendarEntry>,
    pub selected: Option<Uuid>,
}

impl CalendarWindow {
    pub fn selected_entry(&self) -> Option<&CalendarEntry> {
        self.selected
            .and_then(|id| self.entries.iter().find(|e| e.id == id))
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }
}

/// CalendarEntryRow - SQLite row representation for mapping from database
#[derive(Debug, Clone, FromRow)]
pub struct CalendarEntryRow {
    pub id: String,
    pub ekadashi_name: String,
    pub ekadashi_date: String,
}

impl CalendarEntryRow {
    pub fn into_entity(self) -> DomainResult<CalendarEntry> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|_| DomainError::InvalidUuid(self.id.clone()))?;
        let date = NaiveDate::parse_from_str(&self.ekadashi_date, ISO_DATE_FORMAT)
            .map_err(|_| DomainError::Validation(ValidationError::format(
                "ekadashi_date",
                &format!("Invalid ISO date: {}", self.ekadashi_date),
            )))?;

        Ok(CalendarEntry {
            id,
            name: self.ekadashi_name,
            date,
        })
    }
}

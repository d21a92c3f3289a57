use crate::domains::calendar::types::{CalendarEntry, CalendarEntryRow, NewCalendarEntry};
use crate::errors::{DbError, DomainError, DomainResult};
use crate::validation::ISO_DATE_FORMAT;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{query, query_as, Pool, Sqlite};
use uuid::Uuid;

/// Trait defining Ekadashi calendar repository operations
#[async_trait]
pub trait CalendarRepository: Send + Sync {
    /// Whole calendar, ascending by date
    async fn find_all(&self) -> DomainResult<Vec<CalendarEntry>>;

    /// Most recent entries strictly before `date`, newest first
    async fn find_before(&self, date: NaiveDate, limit: u32) -> DomainResult<Vec<CalendarEntry>>;

    /// Nearest entries on or after `date`, oldest first
    async fn find_on_or_after(&self, date: NaiveDate, limit: u32) -> DomainResult<Vec<CalendarEntry>>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<CalendarEntry>;

    async fn create(&self, new_entry: &NewCalendarEntry) -> DomainResult<CalendarEntry>;
}

/// SQLite implementation for CalendarRepository
#[derive(Debug, Clone)]
pub struct SqliteCalendarRepository {
    pool: Pool<Sqlite>,
}

impl SqliteCalendarRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn map_rows(rows: Vec<CalendarEntryRow>) -> DomainResult<Vec<CalendarEntry>> {
        rows.into_iter().map(CalendarEntryRow::into_entity).collect()
    }
}

#[async_trait]
impl CalendarRepository for SqliteCalendarRepository {
    async fn find_all(&self) -> DomainResult<Vec<CalendarEntry>> {
        let rows = query_as::<_, CalendarEntryRow>(
            "SELECT id, ekadashi_name, ekadashi_date FROM ekadashi_calendar ORDER BY ekadashi_date ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Self::map_rows(rows)
    }

    async fn find_before(&self, date: NaiveDate, limit: u32) -> DomainResult<Vec<CalendarEntry>> {
        let rows = query_as::<_, CalendarEntryRow>(
            "SELECT id, ekadashi_name, ekadashi_date FROM ekadashi_calendar
             WHERE ekadashi_date < ? ORDER BY ekadashi_date DESC LIMIT ?",
        )
        .bind(date.format(ISO_DATE_FORMAT).to_string())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Self::map_rows(rows)
    }

    async fn find_on_or_after(&self, date: NaiveDate, limit: u32) -> DomainResult<Vec<CalendarEntry>> {
        let rows = query_as::<_, CalendarEntryRow>(
            "SELECT id, ekadashi_name, ekadashi_date FROM ekadashi_calendar
             WHERE ekadashi_date >= ? ORDER BY ekadashi_date ASC LIMIT ?",
        )
        .bind(date.format(ISO_DATE_FORMAT).to_string())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Self::map_rows(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<CalendarEntry> {
        let row = query_as::<_, CalendarEntryRow>(
            "SELECT id, ekadashi_name, ekadashi_date FROM ekadashi_calendar WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| DomainError::EntityNotFound("Ekadashi".to_string(), id))?;

        row.into_entity()
    }

    async fn create(&self, new_entry: &NewCalendarEntry) -> DomainResult<CalendarEntry> {
        let entry = CalendarEntry {
            id: Uuid::new_v4(),
            name: new_entry.name.trim().to_string(),
            date: new_entry.date,
        };

        query("INSERT INTO ekadashi_calendar (id, ekadashi_name, ekadashi_date) VALUES (?, ?, ?)")
            .bind(entry.id.to_string())
            .bind(&entry.name)
            .bind(entry.date.format(ISO_DATE_FORMAT).to_string())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        Ok(entry)
    }
}

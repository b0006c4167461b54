use crate::errors::{AppError, AppResult};
use crate::models::{SortKey, StatusFilter, UiPreferences};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

const SCHEMA_SQL: &str = include_str!("schema.sql");

const SEARCH_TERM_KEY: &str = "sellerConsoleSearchTerm";
const STATUS_FILTER_KEY: &str = "sellerConsoleStatusFilter";
const SORT_BY_KEY: &str = "sellerConsoleSortBy";

/// Durable store for the three UI preferences. Read once at startup, written
/// through on every change; missing keys fall back to defaults.
#[derive(Debug)]
pub struct PreferenceStore {
    conn: Mutex<Connection>,
}

impl PreferenceStore {
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Io(err.to_string()))?;
        }
        let conn = Connection::open(path).map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn load(&self) -> AppResult<UiPreferences> {
        let defaults = UiPreferences::default();
        Ok(UiPreferences {
            search_term: self
                .read_value(SEARCH_TERM_KEY)?
                .unwrap_or(defaults.search_term),
            status_filter: self
                .read_value(STATUS_FILTER_KEY)?
                .unwrap_or(defaults.status_filter),
            sort_by: self.read_value(SORT_BY_KEY)?.unwrap_or(defaults.sort_by),
        })
    }

    pub fn set_search_term(&self, term: &str) -> AppResult<()> {
        self.write_value(SEARCH_TERM_KEY, &term)
    }

    pub fn set_status_filter(&self, filter: StatusFilter) -> AppResult<()> {
        self.write_value(STATUS_FILTER_KEY, &filter)
    }

    pub fn set_sort_by(&self, sort_by: SortKey) -> AppResult<()> {
        self.write_value(SORT_BY_KEY, &sort_by)
    }

    fn read_value<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Internal("preference store mutex poisoned".to_string()))?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value_json FROM preferences WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn write_value<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Internal("preference store mutex poisoned".to_string()))?;
        conn.execute(
            "INSERT INTO preferences (key, value_json, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json,
               updated_at = excluded.updated_at",
            params![key, serde_json::to_string(value)?, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

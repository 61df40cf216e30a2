//! In-process stand-in for the hosted backend, used by tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde_json::Value;

use super::{Filter, RemoteClient, RemoteError, conflict_columns};

#[derive(Default)]
pub struct MemoryClient {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    failing: AtomicBool,
    selects: AtomicUsize,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, collection: &str, row: Value) {
        self.tables
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(row);
    }

    pub fn rows(&self, collection: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn select_count(&self) -> usize {
        self.selects.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), RemoteError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(RemoteError::Invalid("backend unavailable".into()))
        } else {
            Ok(())
        }
    }
}

fn sort_key(row: &Value, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

impl RemoteClient for MemoryClient {
    async fn select(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>, RemoteError> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let mut rows: Vec<Value> = self
            .rows(collection)
            .into_iter()
            .filter(|row| filter.matches(row))
            .collect();

        if let Some((column, ascending)) = &filter.order {
            rows.sort_by_key(|row| sort_key(row, column));
            if !ascending {
                rows.reverse();
            }
        }
        Ok(rows)
    }

    async fn upsert(&self, collection: &str, record: Value) -> Result<Value, RemoteError> {
        self.check()?;

        let keys: Vec<&str> = conflict_columns(collection)
            .unwrap_or("id")
            .split(',')
            .collect();

        let mut tables = self.tables.lock().unwrap();
        let table = tables.entry(collection.to_string()).or_default();
        let existing = table
            .iter_mut()
            .find(|row| keys.iter().all(|k| row.get(*k).is_some() && row.get(*k) == record.get(*k)));

        match existing {
            Some(row) => *row = record.clone(),
            None => table.push(record.clone()),
        }
        Ok(record)
    }
}

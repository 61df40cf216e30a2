pub mod auth;
pub mod keyring;
#[cfg(test)]
pub(crate) mod memory;
pub mod records;
pub mod roles;
pub mod snapshot;
pub mod supabase;

use std::future::Future;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub const FOLLOW_UPS: &str = "follow_ups";
pub const NOTIFICATIONS: &str = "notifications";
pub const USER_SETTINGS: &str = "user_settings";
pub const USER_ROLES: &str = "user_roles";
pub const USER_TOURS: &str = "user_tours";

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Not signed in or session expired")]
    Unauthenticated,

    #[error("{0}")]
    Invalid(String),
}

/// Equality constraints and ordering for a `select`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub eq: Vec<(String, String)>,
    pub order: Option<(String, bool)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, column: &str, value: impl ToString) -> Self {
        self.eq.push((column.to_string(), value.to_string()));
        self
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.order = Some((column.to_string(), true));
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some((column.to_string(), false));
        self
    }

    /// Whether a JSON row satisfies every equality constraint.
    pub fn matches(&self, row: &Value) -> bool {
        self.eq.iter().all(|(column, expected)| match row.get(column) {
            Some(Value::String(s)) => s == expected,
            Some(Value::Null) | None => false,
            Some(other) => other.to_string() == *expected,
        })
    }
}

/// Columns identifying a row for upserts, when they differ from `id`.
pub fn conflict_columns(collection: &str) -> Option<&'static str> {
    match collection {
        USER_SETTINGS => Some("user_id"),
        USER_ROLES => Some("user_id,role"),
        USER_TOURS => Some("user_id,tour"),
        _ => None,
    }
}

/// Record storage offered by the hosted backend.
pub trait RemoteClient: Sync {
    fn select(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> impl Future<Output = Result<Vec<Value>, RemoteError>> + Send;

    fn upsert(
        &self,
        collection: &str,
        record: Value,
    ) -> impl Future<Output = Result<Value, RemoteError>> + Send;
}

/// Decode rows into `T`, skipping (and logging) any that don't fit.
pub fn decode_rows<T: DeserializeOwned>(collection: &str, rows: Vec<Value>) -> Vec<T> {
    let total = rows.len();
    let decoded: Vec<T> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("Skipping malformed {} row: {}", collection, e);
                None
            }
        })
        .collect();

    if decoded.len() != total {
        log::info!("{}: kept {} of {} rows", collection, decoded.len(), total);
    }
    decoded
}

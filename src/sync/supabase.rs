use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;

use super::{Filter, RemoteClient, RemoteError, conflict_columns};
use crate::core::session::Session;

/// PostgREST + GoTrue client for a Supabase project.
#[derive(Clone)]
pub struct SupabaseClient {
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
    http: Client,
}

impl SupabaseClient {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, RemoteError> {
        let http = Client::builder().build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            access_token: None,
            http,
        })
    }

    /// A copy of this client that acts as the session's user.
    pub fn with_session(&self, session: &Session) -> Self {
        Self {
            access_token: Some(session.access_token.clone()),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn rest_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", bearer))
    }

    /// POST to the GoTrue token endpoint with the given grant.
    pub(crate) async fn token_grant(&self, grant_type: &str, body: Value) -> Result<Value, RemoteError> {
        let url = format!("{}/auth/v1/token", self.base_url);
        let resp = self
            .http
            .post(&url)
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;

        let text = read_body(resp).await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// PostgREST query parameters for a filtered select.
pub fn select_params(filter: &Filter) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    for (column, value) in &filter.eq {
        params.push((column.clone(), format!("eq.{}", value)));
    }
    if let Some((column, ascending)) = &filter.order {
        let dir = if *ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{}", column, dir)));
    }
    params
}

/// Read a response body, turning non-success statuses into errors.
async fn read_body(resp: reqwest::Response) -> Result<String, RemoteError> {
    let status = resp.status();
    let text = resp.text().await?;

    match status {
        s if s.is_success() => Ok(text),
        StatusCode::UNAUTHORIZED => Err(RemoteError::Unauthenticated),
        s => Err(RemoteError::Status { status: s, body: text }),
    }
}

impl RemoteClient for SupabaseClient {
    async fn select(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>, RemoteError> {
        let url = self.rest_url(collection);
        let resp = self
            .request(Method::GET, &url)
            .query(&select_params(filter))
            .send()
            .await?;

        let text = read_body(resp).await?;
        let rows: Vec<Value> = serde_json::from_str(&text)?;
        log::debug!("Selected {} rows from {}", rows.len(), collection);
        Ok(rows)
    }

    async fn upsert(&self, collection: &str, record: Value) -> Result<Value, RemoteError> {
        let url = self.rest_url(collection);
        let mut req = self
            .request(Method::POST, &url)
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "resolution=merge-duplicates,return=representation");
        if let Some(columns) = conflict_columns(collection) {
            req = req.query(&[("on_conflict", columns)]);
        }

        let resp = req.json(&record).send().await?;
        let text = read_body(resp).await?;

        let mut rows: Vec<Value> = serde_json::from_str(&text)?;
        if rows.is_empty() {
            return Err(RemoteError::Invalid(format!(
                "Upsert into {} returned no rows",
                collection
            )));
        }
        Ok(rows.swap_remove(0))
    }
}

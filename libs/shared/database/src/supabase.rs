use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::error::DatabaseError;

/// Rows per request when paging; PostgREST deployments usually cap at 1000.
pub const PAGE_SIZE: usize = 1000;

/// PostgREST client for the Supabase project.
///
/// Requests run with the service role key: authorization is decided by the
/// cells before any query is issued.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
            service_key: config.supabase_service_role_key.clone(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap, DatabaseError> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.anon_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.service_key))?,
        );

        Ok(headers)
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, DatabaseError>
    where
        T: DeserializeOwned,
    {
        let mut extra = HeaderMap::new();
        if method != Method::GET {
            extra.insert("Prefer", HeaderValue::from_static("return=representation"));
        }
        self.request_with_headers(method, path, body, Some(extra)).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T, DatabaseError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("PostgREST error ({}): {}", status, text);
            return Err(DatabaseError::from_response(status.as_u16(), &text));
        }

        // 204 responses carry no body.
        let payload = if text.trim().is_empty() { "null" } else { text.as_str() };
        Ok(serde_json::from_str(payload)?)
    }

    /// Call a Postgres function through `/rest/v1/rpc/<function>`.
    ///
    /// Each function runs in its own transaction, so multi-row writes issued
    /// through here are atomic.
    pub async fn rpc<T>(&self, function: &str, args: Value) -> Result<T, DatabaseError>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/rpc/{}", function);
        self.request_with_headers(Method::POST, &path, Some(args), None).await
    }

    /// Insert or merge a row keyed by `on_conflict`.
    pub async fn upsert<T>(
        &self,
        table: &str,
        on_conflict: &str,
        body: Value,
    ) -> Result<Vec<T>, DatabaseError>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/{}?on_conflict={}", table, on_conflict);
        let mut headers = HeaderMap::new();
        headers.insert(
            "Prefer",
            HeaderValue::from_static("resolution=merge-duplicates,return=representation"),
        );
        self.request_with_headers(Method::POST, &path, Some(body), Some(headers)).await
    }

    /// Run a select expected to match at most one row.
    pub async fn fetch_optional<T>(&self, path: &str) -> Result<Option<T>, DatabaseError>
    where
        T: DeserializeOwned,
    {
        let rows: Vec<T> = self.request(Method::GET, path, None).await?;
        Ok(rows.into_iter().next())
    }

    /// Exact number of rows matching a select, read from `Content-Range`
    /// without transferring any rows.
    pub async fn count(&self, path: &str) -> Result<u64, DatabaseError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Counting rows at {}", url);

        let mut headers = self.get_headers()?;
        headers.insert("Prefer", HeaderValue::from_static("count=exact"));

        let response = self.client.head(&url).headers(headers).send().await?;
        let status = response.status();
        if !status.is_success() {
            error!("PostgREST count error ({})", status);
            return Err(DatabaseError::from_response(status.as_u16(), ""));
        }

        let range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        parse_total(range).ok_or_else(|| DatabaseError::Api {
            status: status.as_u16(),
            body: format!("missing row count in Content-Range '{}'", range),
        })
    }

    /// Fetch every row of a select, one page of `page_size` at a time.
    ///
    /// `path` must carry an `order` so pages do not overlap.
    pub async fn fetch_all<T>(&self, path: &str, page_size: usize) -> Result<Vec<T>, DatabaseError>
    where
        T: DeserializeOwned,
    {
        let page_size = page_size.max(1);
        let mut rows = Vec::new();
        loop {
            let page_path = format!("{}&limit={}&offset={}", path, page_size, rows.len());
            let page: Vec<T> = self.request(Method::GET, &page_path, None).await?;
            let last = page.len() < page_size;
            rows.extend(page);
            if last {
                return Ok(rows);
            }
        }
    }
}

/// Total from a `Content-Range` value such as `0-24/3573` or `*/0`.
fn parse_total(content_range: &str) -> Option<u64> {
    content_range.rsplit_once('/')?.1.trim().parse().ok()
}

//! HTTP client for the search backend: count, scroll open/continue, and
//! best-effort scroll cleanup, plus the scroll-cursor `RecordSource`.

use crate::error::TransportError;
use crate::source::{Hit, Page, RecordSource};
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

fn count_url(base: &str, index: &str) -> String {
    format!("{}/{}/_count", base.trim_end_matches('/'), index)
}

fn search_url(base: &str, index: &str, keep_alive: &str) -> String {
    format!(
        "{}/{}/_search?scroll={}",
        base.trim_end_matches('/'),
        index,
        keep_alive
    )
}

fn scroll_url(base: &str) -> String {
    format!("{}/_search/scroll", base.trim_end_matches('/'))
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "_scroll_id")]
    scroll_id: Option<String>,
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    #[serde(default)]
    hits: Vec<Hit>,
}

/// Thin blocking client. Credentials ride in a default `Authorization:
/// ApiKey …` header; every request shares one timeout.
pub struct EsClient {
    http: Client,
    base: String,
}

impl EsClient {
    pub fn new(endpoint: &str, api_key: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let mut value = HeaderValue::from_str(&format!("ApiKey {key}"))
                .context("api key is not a valid header value")?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("build http client")?;
        Ok(Self { http, base: endpoint.trim_end_matches('/').to_string() })
    }

    /// Upfront count of documents matching the query.
    pub fn count(&self, index: &str, query: &Value) -> Result<u64, TransportError> {
        let resp: CountResponse =
            self.post_json(&count_url(&self.base, index), &json!({ "query": query }))?;
        Ok(resp.count)
    }

    fn open_scroll(
        &self,
        index: &str,
        query: &Value,
        page_size: usize,
        keep_alive: &str,
    ) -> Result<SearchResponse, TransportError> {
        let body = json!({
            "size": page_size,
            "sort": ["_doc"],
            "query": query,
        });
        self.post_json(&search_url(&self.base, index, keep_alive), &body)
    }

    fn continue_scroll(
        &self,
        scroll_id: &str,
        keep_alive: &str,
    ) -> Result<SearchResponse, TransportError> {
        let body = json!({
            "scroll": keep_alive,
            "scroll_id": scroll_id,
        });
        self.post_json(&scroll_url(&self.base), &body)
    }

    /// Release the server-side scroll context. Failures are logged and
    /// swallowed: the context expires on its own after the keep-alive.
    fn clear_scroll(&self, scroll_id: &str) {
        let body = json!({ "scroll_id": [scroll_id] });
        match self.http.delete(scroll_url(&self.base)).json(&body).send() {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => {
                tracing::debug!("clear scroll returned HTTP {}", resp.status().as_u16());
            }
            Err(e) => {
                tracing::debug!("clear scroll failed: {e}");
            }
        }
    }

    fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &Value,
    ) -> Result<T, TransportError> {
        let resp = self.http.post(url).json(body).send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(TransportError::BadStatus { status: status.as_u16(), body });
        }
        Ok(resp.json()?)
    }
}

/// Scroll cursor over one index: opens the scroll on the first page, then
/// follows `_scroll_id` until the backend hands back an empty page. Finished
/// means finished; there is no rewind and no retry.
pub struct EsScrollSource {
    client: EsClient,
    index: String,
    query: Value,
    page_size: usize,
    keep_alive: String,
    scroll_id: Option<String>,
    finished: bool,
}

impl EsScrollSource {
    pub fn new(
        client: EsClient,
        index: impl Into<String>,
        query: Value,
        page_size: usize,
        keep_alive: impl Into<String>,
    ) -> Self {
        Self {
            client,
            index: index.into(),
            query,
            page_size: page_size.max(1),
            keep_alive: keep_alive.into(),
            scroll_id: None,
            finished: false,
        }
    }
}

impl RecordSource for EsScrollSource {
    fn estimated_total(&mut self) -> Result<u64, TransportError> {
        self.client.count(&self.index, &self.query)
    }

    fn next_page(&mut self) -> Result<Page, TransportError> {
        if self.finished {
            return Ok(Page::new());
        }

        let attempt = match &self.scroll_id {
            None => {
                self.client
                    .open_scroll(&self.index, &self.query, self.page_size, &self.keep_alive)
            }
            Some(id) => self.client.continue_scroll(id, &self.keep_alive),
        };
        let resp = match attempt {
            Ok(resp) => resp,
            Err(e) => {
                self.finished = true;
                return Err(e);
            }
        };

        if resp.hits.hits.is_empty() {
            self.finished = true;
            // Scroll ids can rotate between pages; the one in the final
            // response is the live cursor to release.
            if let Some(id) = resp.scroll_id.or(self.scroll_id.take()) {
                self.client.clear_scroll(&id);
            }
            return Ok(Page::new());
        }

        match resp.scroll_id {
            Some(id) => self.scroll_id = Some(id),
            None => {
                self.finished = true;
                return Err(TransportError::protocol(
                    "search response carried hits but no _scroll_id to continue from",
                ));
            }
        }
        Ok(resp.hits.hits)
    }
}

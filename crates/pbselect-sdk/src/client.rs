//! Async PocketBase records client.
//!
//! Sends compiled [`QueryParameters`] to the records API and hands back the
//! raw JSON or a deserialized record type. Construct a [`Client`] via
//! [`Client::new`], [`Client::from_env`] or [`Client::auto`], then query with
//! [`Client::records`] (typed, selection derived from the record type) or
//! [`Client::select`] (explicit [`SelectionNode`]).
//!
//! Requests that carry a request key cancel any in-flight request with the
//! same key; the superseded call resolves to [`PocketBaseError::Cancelled`].

use crate::auth;
use crate::compile::QueryParameters;
use crate::error::{ApiErrorBody, PocketBaseError};
use crate::pagination::{ListResult, Page};
use crate::query::RecordsQuery;
use crate::record::Record;
use crate::selection::SelectionNode;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::AbortHandle;
use url::Url;

/// Page size used by [`Client::get_full_list`].
const FULL_LIST_BATCH: u32 = 500;

/// In-flight requests by request key, tagged so a finished request only
/// removes its own entry.
#[derive(Debug, Default)]
struct InFlight {
    next: u64,
    tasks: HashMap<String, (u64, AbortHandle)>,
}

/// Releases a keyed request's registry entry however its caller finishes,
/// including when the caller's future is dropped mid-flight.
struct InFlightGuard<'a> {
    in_flight: &'a Mutex<InFlight>,
    key: &'a str,
    id: u64,
    task: AbortHandle,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.task.abort();
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if in_flight
            .tasks
            .get(self.key)
            .is_some_and(|(owner, _)| *owner == self.id)
        {
            in_flight.tasks.remove(self.key);
        }
    }
}

/// The PocketBase API client.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    in_flight: Arc<Mutex<InFlight>>,
}

impl Client {
    /// Create a client for the server at `base_url`, without credentials.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, PocketBaseError> {
        let raw = base_url.as_ref();
        let base_url = Url::parse(raw).map_err(|e| {
            PocketBaseError::Config(format!("Invalid base URL '{}': {}", raw, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(PocketBaseError::Config(format!(
                "Invalid base URL '{}': not a base URL",
                raw
            )));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token: None,
            in_flight: Arc::default(),
        })
    }

    /// Create a client from `POCKETBASE_URL` and `POCKETBASE_TOKEN`.
    pub fn from_env() -> Result<Self, PocketBaseError> {
        let client = Self::new(auth::url_from_env())?;
        Ok(match auth::token_from_env() {
            Ok(token) => client.with_token(token),
            Err(_) => client,
        })
    }

    /// Create a client from `POCKETBASE_URL`, auto-detecting the token
    /// (env -> `~/.pocketbase_token`). No token is fine for public collections.
    pub fn auto() -> Result<Self, PocketBaseError> {
        let client = Self::new(auth::url_from_env())?;
        Ok(match auth::auto_token() {
            Some(token) => client.with_token(token),
            None => client,
        })
    }

    /// Send `token` in the `Authorization` header of every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.is_empty()).then_some(token);
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Typed query whose selection comes from `T`.
    pub fn records<T: Record + DeserializeOwned>(&self) -> RecordsQuery<'_, T> {
        RecordsQuery::new(self, T::selection())
    }

    /// Query with an explicit selection tree.
    pub fn select<T: DeserializeOwned>(&self, selection: SelectionNode) -> RecordsQuery<'_, T> {
        RecordsQuery::new(self, selection)
    }

    /// List records of `collection` and return the raw response body.
    pub async fn send(
        &self,
        collection: &str,
        params: &QueryParameters,
        page: Option<Page>,
    ) -> Result<serde_json::Value, PocketBaseError> {
        let mut pairs = owned_pairs(params);
        if let Some(page) = page {
            pairs.extend(page.to_query_pairs());
        }
        let url = self.records_url(collection, None, &pairs)?;
        self.get_json(url, params.request_key.as_deref()).await
    }

    /// Fetch one page of records.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        collection: &str,
        page: Page,
        params: &QueryParameters,
    ) -> Result<ListResult<T>, PocketBaseError> {
        let value = self.send(collection, params, Some(page)).await?;
        decode(value, collection)
    }

    /// Fetch a single record by id.
    pub async fn get_one<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
        params: &QueryParameters,
    ) -> Result<T, PocketBaseError> {
        let url = self.records_url(collection, Some(id), &owned_pairs(params))?;
        let value = self.get_json(url, params.request_key.as_deref()).await?;
        decode(value, collection)
    }

    /// Fetch the first record matching the parameters.
    pub async fn get_first<T: DeserializeOwned>(
        &self,
        collection: &str,
        params: &QueryParameters,
    ) -> Result<T, PocketBaseError> {
        let page = Page {
            skip_total: true,
            ..Page::new(1, 1)
        };
        let list: ListResult<T> = self.get_list(collection, page, params).await?;
        list.items.into_iter().next().ok_or_else(|| {
            PocketBaseError::NotFound(format!("No '{}' record matches the query", collection))
        })
    }

    /// Fetch every matching record, page by page.
    pub async fn get_full_list<T: DeserializeOwned>(
        &self,
        collection: &str,
        params: &QueryParameters,
    ) -> Result<Vec<T>, PocketBaseError> {
        let mut items = Vec::new();
        let mut page = Page {
            skip_total: true,
            ..Page::new(1, FULL_LIST_BATCH)
        };
        loop {
            let list: ListResult<T> = self.get_list(collection, page, params).await?;
            let fetched = list.items.len();
            items.extend(list.items);
            if fetched < FULL_LIST_BATCH as usize {
                break;
            }
            page.page += 1;
        }
        Ok(items)
    }

    fn records_url(
        &self,
        collection: &str,
        id: Option<&str>,
        pairs: &[(&'static str, String)],
    ) -> Result<Url, PocketBaseError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                PocketBaseError::Config(format!("Invalid base URL '{}'", self.base_url))
            })?;
            segments
                .pop_if_empty()
                .extend(["api", "collections", collection, "records"]);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    async fn get_json(
        &self,
        url: Url,
        request_key: Option<&str>,
    ) -> Result<serde_json::Value, PocketBaseError> {
        let Some(key) = request_key else {
            return self.fetch(url).await;
        };

        let this = self.clone();
        let task = tokio::spawn(async move { this.fetch(url).await });

        let guard = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            in_flight.next += 1;
            let id = in_flight.next;
            if let Some((_, previous)) = in_flight
                .tasks
                .insert(key.to_string(), (id, task.abort_handle()))
            {
                tracing::warn!(request_key = key, "cancelling superseded request");
                previous.abort();
            }
            InFlightGuard {
                in_flight: &self.in_flight,
                key,
                id,
                task: task.abort_handle(),
            }
        };

        let result = task.await;
        drop(guard);

        match result {
            Ok(response) => response,
            Err(e) if e.is_cancelled() => Err(PocketBaseError::Cancelled(key.to_string())),
            Err(e) => Err(PocketBaseError::Internal(format!("Request task failed: {}", e))),
        }
    }

    async fn fetch(&self, url: Url) -> Result<serde_json::Value, PocketBaseError> {
        tracing::debug!(%url, "GET");

        let mut request = self.http.get(url).header(
            "User-Agent",
            format!("pbselect-sdk/{}", env!("CARGO_PKG_VERSION")),
        );
        if let Some(token) = &self.token {
            request = request.header("Authorization", token);
        }

        let response = request.send().await?;

        let status = response.status();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<f64>().ok());
            let text = response.text().await.unwrap_or_default();
            return Err(PocketBaseError::RateLimited {
                retry_after,
                message: text,
            });
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), text));
        }

        Ok(response.json().await?)
    }
}

/// Map a failed response to the most specific error variant.
fn status_error(status: u16, text: String) -> PocketBaseError {
    let body = serde_json::from_str::<ApiErrorBody>(&text)
        .ok()
        .filter(|b| !b.message.is_empty());
    let message = body
        .as_ref()
        .map(|b| b.message.clone())
        .unwrap_or_else(|| text.clone());

    match (status, body) {
        (401, _) => PocketBaseError::Authentication(message),
        (403, _) => PocketBaseError::Forbidden(message),
        (404, _) => PocketBaseError::NotFound(message),
        (status, Some(body)) => PocketBaseError::Api {
            status,
            message: body.message,
            data: body.data,
        },
        (status, None) => PocketBaseError::HttpError { status, body: text },
    }
}

fn owned_pairs(params: &QueryParameters) -> Vec<(&'static str, String)> {
    params
        .to_query_pairs()
        .into_iter()
        .map(|(name, value)| (name, value.to_string()))
        .collect()
}

fn decode<T: DeserializeOwned>(
    value: serde_json::Value,
    collection: &str,
) -> Result<T, PocketBaseError> {
    serde_json::from_value(value).map_err(|e| {
        PocketBaseError::Deserialize(format!("Failed to deserialize '{}' records: {}", collection, e))
    })
}

//! Blocking (synchronous) PocketBase client.
//!
//! This module provides a synchronous wrapper around the async [`Client`](crate::Client).
//! Enable it with the `blocking` feature flag:
//!
//! ```toml
//! [dependencies]
//! pbselect-sdk = { version = "...", features = ["blocking"] }
//! ```
//!
//! The blocking client creates an internal tokio runtime and runs each
//! operation to completion synchronously. Because calls never overlap, a
//! request key never cancels anything here.
//!
//! # Example
//!
//! ```no_run
//! use pbselect_sdk::blocking_client::Client;
//! use pbselect_sdk::SelectionNode;
//!
//! let client = Client::auto().unwrap();
//! let posts = client
//!     .list::<serde_json::Value>(&SelectionNode::new("posts").fields(["title"]), Default::default())
//!     .unwrap();
//! println!("{} posts", posts.total_items);
//! ```

use crate::compile::{compile, QueryParameters};
use crate::error::PocketBaseError;
use crate::pagination::{ListResult, Page};
use crate::record::Record;
use crate::selection::SelectionNode;
use serde::de::DeserializeOwned;

/// A synchronous PocketBase client.
///
/// Wraps the async [`crate::Client`] with an internal tokio runtime. Every
/// method blocks the calling thread until the operation completes.
pub struct Client {
    inner: crate::Client,
    rt: tokio::runtime::Runtime,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("blocking_client::Client")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a blocking client for the server at `base_url`.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, PocketBaseError> {
        Ok(Self {
            inner: crate::Client::new(base_url)?,
            rt: build_runtime()?,
        })
    }

    /// Create a blocking client from `POCKETBASE_URL` and `POCKETBASE_TOKEN`.
    pub fn from_env() -> Result<Self, PocketBaseError> {
        Ok(Self {
            inner: crate::Client::from_env()?,
            rt: build_runtime()?,
        })
    }

    /// Create a blocking client, auto-detecting the token (env -> file).
    pub fn auto() -> Result<Self, PocketBaseError> {
        Ok(Self {
            inner: crate::Client::auto()?,
            rt: build_runtime()?,
        })
    }

    pub fn with_token(self, token: impl Into<String>) -> Self {
        Self {
            inner: self.inner.with_token(token),
            rt: self.rt,
        }
    }

    /// List records and return the raw response body (blocking).
    ///
    /// See [`crate::Client::send`].
    pub fn send(
        &self,
        collection: &str,
        params: &QueryParameters,
        page: Option<Page>,
    ) -> Result<serde_json::Value, PocketBaseError> {
        self.rt.block_on(self.inner.send(collection, params, page))
    }

    /// Fetch one page of records for `selection` (blocking).
    pub fn list<T: DeserializeOwned>(
        &self,
        selection: &SelectionNode,
        page: Page,
    ) -> Result<ListResult<T>, PocketBaseError> {
        let params = compile(selection);
        self.rt
            .block_on(self.inner.get_list(&selection.key, page, &params))
    }

    /// Fetch every record for `selection` (blocking).
    pub fn all<T: DeserializeOwned>(
        &self,
        selection: &SelectionNode,
    ) -> Result<Vec<T>, PocketBaseError> {
        let params = compile(selection);
        self.rt
            .block_on(self.inner.get_full_list(&selection.key, &params))
    }

    /// Fetch one record of `selection`'s collection by id (blocking).
    pub fn view<T: DeserializeOwned>(
        &self,
        selection: &SelectionNode,
        id: &str,
    ) -> Result<T, PocketBaseError> {
        let params = compile(selection);
        self.rt
            .block_on(self.inner.get_one(&selection.key, id, &params))
    }

    /// Fetch one page of a derived record type (blocking).
    pub fn records<T: Record + DeserializeOwned>(
        &self,
        page: Page,
    ) -> Result<ListResult<T>, PocketBaseError> {
        self.list(&T::selection(), page)
    }
}

fn build_runtime() -> Result<tokio::runtime::Runtime, PocketBaseError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| PocketBaseError::Internal(format!("Failed to create tokio runtime: {}", e)))
}

//! Query builder for the records API.
//!
//! Returned by [`Client::records`] and [`Client::select`]. Setters adjust the
//! root of the selection and the page; terminal methods compile the selection
//! and perform the request.

use crate::client::Client;
use crate::compile::{compile, QueryParameters};
use crate::error::PocketBaseError;
use crate::pagination::{ListResult, Page};
use crate::schema::Schema;
use crate::selection::SelectionNode;
use crate::shape::Compiled;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// A pending records query.
#[derive(Debug, Clone)]
pub struct RecordsQuery<'a, T> {
    client: &'a Client,
    selection: SelectionNode,
    page: Page,
    _record: PhantomData<fn() -> T>,
}

impl<'a, T: DeserializeOwned> RecordsQuery<'a, T> {
    pub(crate) fn new(client: &'a Client, selection: SelectionNode) -> Self {
        Self {
            client,
            selection,
            page: Page::default(),
            _record: PhantomData,
        }
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.selection.sort = Some(sort.into());
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.selection.filter = Some(filter.into());
        self
    }

    pub fn request_key(mut self, key: impl Into<String>) -> Self {
        self.selection.request_key = Some(key.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page.page = page;
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.page.per_page = per_page;
        self
    }

    pub fn skip_total(mut self, skip_total: bool) -> Self {
        self.page.skip_total = skip_total;
        self
    }

    pub fn selection(&self) -> &SelectionNode {
        &self.selection
    }

    /// Compiled query parameters for the current selection.
    pub fn params(&self) -> QueryParameters {
        compile(&self.selection)
    }

    /// Check the selection against `schema` before sending it.
    pub fn validate(&self, schema: &Schema) -> Result<Compiled, PocketBaseError> {
        Ok(schema.compile(&self.selection)?)
    }

    /// Fetch the configured page.
    pub async fn send(self) -> Result<ListResult<T>, PocketBaseError> {
        let params = self.params();
        self.client
            .get_list(&self.selection.key, self.page, &params)
            .await
    }

    /// Fetch the first matching record.
    pub async fn first(self) -> Result<T, PocketBaseError> {
        let params = self.params();
        self.client.get_first(&self.selection.key, &params).await
    }

    /// Fetch every matching record.
    pub async fn all(self) -> Result<Vec<T>, PocketBaseError> {
        let params = self.params();
        self.client.get_full_list(&self.selection.key, &params).await
    }

    /// Fetch one record by id.
    pub async fn view(self, id: &str) -> Result<T, PocketBaseError> {
        let params = self.params();
        self.client.get_one(&self.selection.key, id, &params).await
    }
}

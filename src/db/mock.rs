//! In-memory signature stores for testing.
//!
//! `MockStore` holds the three source tables and pivots them on every call.
//! `FailingStore` always fails, standing in for an unreachable database.

use super::SignatureStore;
use crate::error::{ProxyError, Result};
use crate::pivot::{pivot_rows, AnswerRow, FieldNameRow, FieldValueRow, PivotQuery, SignatureRecord};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A store backed by in-memory copies of `answers`, `field_values` and `field_names`.
#[derive(Debug, Default)]
pub struct MockStore {
    answers: Vec<AnswerRow>,
    values: Vec<FieldValueRow>,
    names: Vec<FieldNameRow>,
    calls: AtomicUsize,
}

impl MockStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an answer row.
    pub fn with_answer(
        mut self,
        id: i64,
        user_id: i64,
        first_name: &str,
        last_name: &str,
        created_at: NaiveDateTime,
        form_id: i64,
    ) -> Self {
        self.answers.push(AnswerRow {
            id,
            user_id,
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            created_at,
            form_id,
        });
        self
    }

    /// Registers a field name, returning the store.
    pub fn with_field_name(mut self, id: i64, name: &str) -> Self {
        self.names.push(FieldNameRow {
            id,
            name: name.to_string(),
        });
        self
    }

    /// Adds an attribute value for a user.
    pub fn with_value(mut self, user_id: i64, field_name_id: i64, value: &str) -> Self {
        self.values.push(FieldValueRow {
            user_id,
            field_name_id,
            value: Some(value.to_string()),
        });
        self
    }

    /// Number of times `fetch_signatures` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignatureStore for MockStore {
    async fn fetch_signatures(&self, query: &PivotQuery) -> Result<Vec<SignatureRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(pivot_rows(&self.answers, &self.values, &self.names, query))
    }
}

/// A store whose every fetch fails with a connection error.
#[derive(Debug, Clone)]
pub struct FailingStore {
    message: String,
}

impl FailingStore {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for FailingStore {
    fn default() -> Self {
        Self::new("Cannot connect to localhost:5439. Check that the server is running.")
    }
}

#[async_trait]
impl SignatureStore for FailingStore {
    async fn fetch_signatures(&self, _query: &PivotQuery) -> Result<Vec<SignatureRecord>> {
        Err(ProxyError::connection(self.message.clone()))
    }
}

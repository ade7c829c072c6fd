//! Clipboard-history server API.
//!
//! [`HistoryApi`] is the seam between the UI and the network; the
//! production implementation is [`HttpHistoryClient`].

pub mod client;
pub mod error;
pub mod models;

use async_trait::async_trait;

pub use client::HttpHistoryClient;
pub use error::{ApiError, Result};
pub use models::{
    AuthStatus, BatchDeleteResult, Credentials, FavoriteState, FileBlob, Health, HistoryPage,
    HistoryQuery, Record, RecordType, Stats,
};

/// Operations the client performs against the server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryApi: Send + Sync {
    /// `GET /health` (no session required).
    async fn health(&self) -> Result<Health>;

    /// `GET /api/check-auth`.
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// `POST /api/login`. Fails with [`ApiError::Unauthorized`] on bad credentials.
    async fn login(&self, credentials: Credentials) -> Result<()>;

    /// `POST /api/logout`.
    async fn logout(&self) -> Result<()>;

    /// `GET /api/history`.
    async fn list_history(&self, query: HistoryQuery) -> Result<HistoryPage>;

    /// `POST /api/history/{id}/favorite`.
    async fn toggle_favorite(&self, id: i64) -> Result<FavoriteState>;

    /// `DELETE /api/history/{id}`.
    async fn delete_record(&self, id: i64) -> Result<()>;

    /// `POST /api/history/batch-delete` with the ids as a JSON array.
    async fn batch_delete(&self, ids: Vec<i64>) -> Result<BatchDeleteResult>;

    /// `GET /api/file/{id}`.
    async fn fetch_file(&self, id: i64) -> Result<FileBlob>;

    /// `GET /api/stats`.
    async fn stats(&self) -> Result<Stats>;
}

//! Remote catalog access.
//!
//! [`ShowSource`] is the seam between the search core and the network. The
//! production implementation is [`tvmaze::TvMazeClient`]; tests substitute
//! in-memory fakes.

pub mod tvmaze;

pub use tvmaze::TvMazeClient;

use crate::domain::ShowId;
use crate::models::{Episode, Season, ShowDetail, ShowSummary};
use thiserror::Error;

/// Failure taxonomy for catalog calls.
///
/// Cloneable so a failure can be stored in a published state snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Unreachable host, timeout, transport failure or undecodable body.
    #[error("network error: {0}")]
    Network(String),

    #[error("resource not found")]
    NotFound,

    #[error("server error: HTTP {0}")]
    Server(u16),

    #[error("unexpected error: {0}")]
    Generic(String),

    /// Rejected locally before any request was made.
    #[error("invalid request: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    NotFound,
    Server,
    Generic,
    Validation,
}

impl GatewayError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::Network,
            Self::NotFound => ErrorKind::NotFound,
            Self::Server(_) => ErrorKind::Server,
            Self::Generic(_) => ErrorKind::Generic,
            Self::Validation(_) => ErrorKind::Validation,
        }
    }

    /// Message suitable for showing to an end user.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Network => "Connection error. Check your internet connection.",
            ErrorKind::NotFound => "Show not found",
            ErrorKind::Server => "Server error. Try again later.",
            ErrorKind::Generic => "An unexpected error occurred",
            ErrorKind::Validation => "Invalid request",
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Read-only access to the remote show catalog.
///
/// # Examples
///
/// ```rust,ignore
/// use tvapi::clients::{GatewayError, ShowSource};
/// use std::sync::Arc;
///
/// async fn first_hit(source: Arc<dyn ShowSource>) -> Result<Option<String>, GatewayError> {
///     let shows = source.search_shows("breaking bad").await?;
///     Ok(shows.into_iter().next().map(|s| s.name))
/// }
/// ```
#[async_trait::async_trait]
pub trait ShowSource: Send + Sync {
    /// Searches shows by free text. Results are ordered by relevance,
    /// best first.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Validation`] for an empty query
    /// - [`GatewayError::Network`], [`GatewayError::Server`] or
    ///   [`GatewayError::Generic`] when the call fails
    async fn search_shows(&self, query: &str) -> Result<Vec<ShowSummary>, GatewayError>;

    /// Fetches a single show.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::NotFound`] if the id does not exist
    /// - [`GatewayError::Validation`] for id 0
    async fn show_details(&self, id: ShowId) -> Result<ShowDetail, GatewayError>;

    /// Lists every episode of a show in airing order.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`ShowSource::show_details`].
    async fn show_episodes(&self, id: ShowId) -> Result<Vec<Episode>, GatewayError>;

    /// Lists the seasons of a show.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`ShowSource::show_details`].
    async fn show_seasons(&self, id: ShowId) -> Result<Vec<Season>, GatewayError>;
}

//! The fetch collaborator seam.
//!
//! The engine never talks to the network. It asks a [`CandidateFetcher`] for
//! one page of candidates and receives the backend's response envelope
//! (`isSuccess`, `data`, `message`) or a [`FetchError`].
//!
//! # Example
//!
//! ```
//! use larder::{Candidate, FetchResponse, fetch::fetcher_fn};
//!
//! let fetcher = fetcher_fn(|request| async move {
//!     let rows = vec![Candidate::new("42", "SKU-1", "Rice 5kg")];
//!     Ok(FetchResponse::success(
//!         rows.into_iter()
//!             .filter(|c| c.primary_label.contains(&request.query))
//!             .collect(),
//!     ))
//! });
//! # let _ = fetcher;
//! ```

use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::candidate::{Candidate, IntoCandidate};
use crate::error::FetchError;

// ============================================================================
// Request / Response
// ============================================================================

/// One page request sent to a fetch collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchRequest {
    /// Search text; empty for the default page.
    pub query: String,
    /// 1-based page number.
    pub page: u32,
    /// Rows per page.
    pub page_size: u32,
}

/// A fetch collaborator's answer, already mapped to candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResponse {
    pub is_success: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<Candidate>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
}

impl FetchResponse {
    /// A successful response carrying `data`.
    pub fn success(data: Vec<Candidate>) -> Self {
        Self {
            is_success: true,
            data,
            message: String::new(),
        }
    }

    /// A non-success response with a server message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            is_success: false,
            data: Vec::new(),
            message: message.into(),
        }
    }
}

/// The backend's response envelope over domain records.
///
/// ```
/// use larder::{ServiceResponse, domain::ItemRecord};
///
/// let body = r#"{"isSuccess":true,"data":[{"id":"42","code":"SKU-1","name":"Rice 5kg"}]}"#;
/// let response = ServiceResponse::<ItemRecord>::from_json(body)?.into_fetch_response();
/// assert_eq!(response.data[0].display_text(), "SKU-1 - Rice 5kg");
/// # Ok::<(), larder::FetchError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct ServiceResponse<T> {
    pub is_success: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T: DeserializeOwned> ServiceResponse<T> {
    /// Decode an envelope from a JSON body.
    pub fn from_json(body: &str) -> Result<Self, FetchError> {
        Ok(serde_json::from_str(body)?)
    }
}

impl<T: IntoCandidate> ServiceResponse<T> {
    /// Map the records to candidates, preserving response order.
    pub fn into_fetch_response(self) -> FetchResponse {
        FetchResponse {
            is_success: self.is_success,
            data: self
                .data
                .into_iter()
                .map(IntoCandidate::into_candidate)
                .collect(),
            message: self.message.unwrap_or_default(),
        }
    }
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_empty<'de, D, V>(deserializer: D) -> Result<V, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de> + Default,
{
    Ok(Option::<V>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Fetcher Trait
// ============================================================================

/// Supplies candidate pages. Implemented per domain (items, recipes, ...).
pub trait CandidateFetcher: Send + Sync {
    /// Fetch one page. Errors and non-success envelopes are both reported to
    /// the user by the caller; implementations should not notify themselves.
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<FetchResponse, FetchError>>;
}

impl<F: CandidateFetcher + ?Sized> CandidateFetcher for Arc<F> {
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<FetchResponse, FetchError>> {
        (**self).fetch(request)
    }
}

/// A fetcher backed by a closure returning a future.
pub struct FnFetcher<F> {
    f: F,
}

/// Wrap a closure as a [`CandidateFetcher`].
pub fn fetcher_fn<F, Fut>(f: F) -> FnFetcher<F>
where
    F: Fn(FetchRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<FetchResponse, FetchError>> + Send + 'static,
{
    FnFetcher { f }
}

impl<F, Fut> CandidateFetcher for FnFetcher<F>
where
    F: Fn(FetchRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<FetchResponse, FetchError>> + Send + 'static,
{
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<FetchResponse, FetchError>> {
        (self.f)(request).boxed()
    }
}

impl<F> std::fmt::Debug for FnFetcher<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFetcher").finish_non_exhaustive()
    }
}

// ============================================================================
// Local Filtering
// ============================================================================

/// Controls how local filtering handles letter case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseSensitivity {
    /// "Rice" won't match "rice".
    CaseSensitive,
    /// "Rice" will match "rice".
    #[default]
    CaseInsensitive,
}

/// Adapts a backend that cannot search: always requests the unfiltered page
/// and keeps candidates whose primary or secondary label contains the query.
#[derive(Debug)]
pub struct LocalFilter<F> {
    inner: F,
    case_sensitivity: CaseSensitivity,
}

impl<F: CandidateFetcher> LocalFilter<F> {
    /// Wrap `inner` with case-insensitive matching.
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            case_sensitivity: CaseSensitivity::CaseInsensitive,
        }
    }

    /// Set case sensitivity using builder pattern.
    pub fn with_case_sensitivity(mut self, sensitivity: CaseSensitivity) -> Self {
        self.case_sensitivity = sensitivity;
        self
    }

    /// Whether `candidate` matches `query` under this filter's settings.
    pub fn matches(&self, candidate: &Candidate, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return true;
        }

        match self.case_sensitivity {
            CaseSensitivity::CaseSensitive => {
                candidate.primary_label.contains(query) || candidate.secondary_label.contains(query)
            }
            CaseSensitivity::CaseInsensitive => {
                let query = query.to_lowercase();
                candidate.primary_label.to_lowercase().contains(&query)
                    || candidate.secondary_label.to_lowercase().contains(&query)
            }
        }
    }
}

impl<F: CandidateFetcher> CandidateFetcher for LocalFilter<F> {
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<FetchResponse, FetchError>> {
        async move {
            let query = request.query.clone();
            let unfiltered = FetchRequest {
                query: String::new(),
                ..request
            };
            let mut response = self.inner.fetch(unfiltered).await?;
            if response.is_success {
                response.data.retain(|c| self.matches(c, &query));
            }
            Ok(response)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecipeRecord;

    fn recipes() -> Vec<Candidate> {
        vec![
            Candidate::new("r1", "NG-01", "Nasi Goreng"),
            Candidate::new("r2", "MG-01", "Mie Goreng"),
            Candidate::new("r3", "ET-01", "Es Teh"),
        ]
    }

    #[tokio::test]
    async fn test_local_filter_matches_either_label() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let filter = LocalFilter::new(fetcher_fn(move |request: FetchRequest| {
            seen_clone.lock().push(request.query.clone());
            async move { Ok(FetchResponse::success(recipes())) }
        }));

        let request = FetchRequest {
            query: "goreng".into(),
            page: 1,
            page_size: 100,
        };
        let response = filter.fetch(request).await.unwrap();

        let ids: Vec<_> = response.data.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
        assert_eq!(*seen.lock(), vec![String::new()]);
    }

    #[test]
    fn test_local_filter_case_sensitive() {
        let filter = LocalFilter::new(fetcher_fn(|_| async { Ok(FetchResponse::success(vec![])) }))
            .with_case_sensitivity(CaseSensitivity::CaseSensitive);
        let candidate = Candidate::new("r3", "ET-01", "Es Teh");

        assert!(filter.matches(&candidate, "Teh"));
        assert!(!filter.matches(&candidate, "teh"));
        assert!(filter.matches(&candidate, "  "));
    }

    #[test]
    fn test_service_response_null_data() {
        let response = ServiceResponse::<RecipeRecord>::from_json(
            r#"{"isSuccess":false,"data":null,"message":"branch not selected"}"#,
        )
        .unwrap()
        .into_fetch_response();

        assert!(!response.is_success);
        assert!(response.data.is_empty());
        assert_eq!(response.message, "branch not selected");
    }

    #[test]
    fn test_service_response_decode_error() {
        let err = ServiceResponse::<RecipeRecord>::from_json("not json").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }
}

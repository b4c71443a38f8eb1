//! Epoch-checked application of fetch results.
//!
//! Every fetch is tagged with the session epoch at the moment it is issued.
//! When the fetch resolves, its result is applied only if that epoch is still
//! the session's current one; anything older is dropped without touching the
//! candidate list or notifying the user. The last-issued search therefore
//! always determines the visible list, whatever order responses arrive in.
//!
//! Hosts that run their own I/O can use the sans-IO pair
//! [`AsyncResultGuard::begin`] / [`AsyncResultGuard::complete`]; everyone else
//! uses [`AsyncResultGuard::issue`], which wraps both around the fetcher call.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;

use crate::candidate::{CandidateKind, CandidateList};
use crate::error::FetchError;
use crate::fetch::{CandidateFetcher, FetchRequest, FetchResponse};
use crate::notify::{Notification, Notifier};
use crate::search::SearchSession;

// ============================================================================
// Tickets and Outcomes
// ============================================================================

/// Proof that a fetch was issued under a particular epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    epoch: u64,
    query: String,
}

impl FetchTicket {
    /// Epoch captured when the fetch was issued.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Query text the fetch was issued with.
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The result was current and replaced the candidate list.
    Applied { epoch: u64, count: usize },
    /// A newer fetch was issued meanwhile; the result was dropped.
    Stale { epoch: u64, current: u64 },
    /// The fetch was current but failed; the user was notified.
    Failed { epoch: u64 },
}

impl GuardOutcome {
    /// Whether the candidate list was replaced.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// Whether the result belonged to a superseded epoch.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }
}

// ============================================================================
// Guard
// ============================================================================

#[derive(Debug, Default)]
struct GuardState {
    session: SearchSession,
    candidates: Arc<CandidateList>,
}

/// Owns a combobox's [`SearchSession`] and candidate list and applies fetch
/// results to them under the epoch rule.
///
/// Cloning yields another handle onto the same session.
pub struct AsyncResultGuard<F> {
    state: Arc<Mutex<GuardState>>,
    fetcher: Arc<F>,
    notifier: Arc<dyn Notifier>,
    kind: CandidateKind,
    page: u32,
    page_size: u32,
}

impl<F> Clone for AsyncResultGuard<F> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            fetcher: self.fetcher.clone(),
            notifier: self.notifier.clone(),
            kind: self.kind,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

impl<F: CandidateFetcher + 'static> AsyncResultGuard<F> {
    /// Create a guard with a fresh session and an empty, never-loaded list.
    pub fn new(fetcher: Arc<F>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            state: Arc::new(Mutex::new(GuardState::default())),
            fetcher,
            notifier,
            kind: CandidateKind::default(),
            page: 1,
            page_size: 100,
        }
    }

    /// Set the wording used for failure notifications using builder pattern.
    pub fn with_kind(mut self, kind: CandidateKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the page requested from the fetcher using builder pattern.
    pub fn with_page(mut self, page: u32, page_size: u32) -> Self {
        self.page = page.max(1);
        self.page_size = page_size.max(1);
        self
    }

    /// What this guard's combobox looks up.
    pub fn kind(&self) -> CandidateKind {
        self.kind
    }

    /// Start a fetch: advance the epoch and mark the session loading.
    ///
    /// A blank `query` is sent as `""`, the default candidate page.
    #[tracing::instrument(skip(self), target = "larder::guard", level = "trace")]
    pub fn begin(&self, query: &str) -> FetchTicket {
        let query = if query.trim().is_empty() { "" } else { query };
        let epoch = self.state.lock().session.advance(query);
        tracing::debug!(target: "larder::guard", epoch, query, "search issued");
        FetchTicket {
            epoch,
            query: query.to_owned(),
        }
    }

    /// The request a fetcher should receive for `ticket`.
    pub fn request_for(&self, ticket: &FetchTicket) -> FetchRequest {
        FetchRequest {
            query: ticket.query.clone(),
            page: self.page,
            page_size: self.page_size,
        }
    }

    /// Apply a fetch result if `ticket` is still the latest epoch.
    pub fn complete(
        &self,
        ticket: &FetchTicket,
        result: Result<FetchResponse, FetchError>,
    ) -> GuardOutcome {
        let epoch = ticket.epoch;
        let mut state = self.state.lock();
        if !state.session.is_current(epoch) {
            let current = state.session.epoch;
            tracing::debug!(target: "larder::guard", epoch, current, "stale response dropped");
            return GuardOutcome::Stale { epoch, current };
        }
        state.session.loading = false;

        let message = match result {
            Ok(response) if response.is_success => {
                let count = response.data.len();
                let next = state.candidates.replaced_by(response.data);
                state.candidates = Arc::new(next);
                tracing::debug!(target: "larder::guard", epoch, count, "candidates applied");
                return GuardOutcome::Applied { epoch, count };
            }
            Ok(response) => {
                tracing::error!(
                    target: "larder::guard",
                    epoch,
                    message = %response.message,
                    "fetch reported failure"
                );
                if response.message.is_empty() {
                    self.kind.failure_message(&ticket.query)
                } else {
                    response.message
                }
            }
            Err(err) => {
                tracing::error!(target: "larder::guard", epoch, error = %err, "fetch failed");
                self.kind.failure_message(&ticket.query)
            }
        };
        drop(state);

        self.notifier.notify(Notification::error(message));
        GuardOutcome::Failed { epoch }
    }

    /// Issue a fetch for `query`.
    ///
    /// The epoch is advanced before this returns, so issuing a second search
    /// immediately supersedes the first even if neither task has been polled.
    pub fn issue(&self, query: &str) -> SearchTask {
        let ticket = self.begin(query);
        let request = self.request_for(&ticket);
        let guard = self.clone();
        let epoch = ticket.epoch;
        let query = ticket.query.clone();

        let future = async move {
            let result = guard.fetcher.fetch(request).await;
            guard.complete(&ticket, result)
        }
        .boxed();

        SearchTask {
            epoch,
            query,
            future,
        }
    }

    /// A snapshot of the session.
    pub fn session(&self) -> SearchSession {
        self.state.lock().session.clone()
    }

    /// The latest issued epoch.
    pub fn epoch(&self) -> u64 {
        self.state.lock().session.epoch
    }

    /// Whether the latest issued fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.state.lock().session.loading
    }

    /// The current candidate list.
    pub fn candidates(&self) -> Arc<CandidateList> {
        self.state.lock().candidates.clone()
    }
}

impl<F> std::fmt::Debug for AsyncResultGuard<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("AsyncResultGuard")
            .field("session", &state.session)
            .field("candidates", &state.candidates.len())
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Search Task
// ============================================================================

/// An issued fetch. Drive it to completion on any executor; dropping it
/// leaves the session loading until a newer fetch is issued.
#[must_use = "a search task does nothing unless polled"]
pub struct SearchTask {
    epoch: u64,
    query: String,
    future: BoxFuture<'static, GuardOutcome>,
}

impl SearchTask {
    /// Epoch the task was issued under.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Query text the task was issued with.
    pub fn query(&self) -> &str {
        &self.query
    }
}

impl Future for SearchTask {
    type Output = GuardOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.future.poll_unpin(cx)
    }
}

impl std::fmt::Debug for SearchTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchTask")
            .field("epoch", &self.epoch)
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Candidate;
    use crate::fetch::fetcher_fn;
    use crate::notify::SignalNotifier;

    struct Unreachable;

    impl CandidateFetcher for Unreachable {
        fn fetch(&self, _: FetchRequest) -> BoxFuture<'_, Result<FetchResponse, FetchError>> {
            futures_util::future::ready(Err(FetchError::Cancelled)).boxed()
        }
    }

    fn guard() -> (AsyncResultGuard<Unreachable>, Arc<SignalNotifier>, Arc<Mutex<Vec<String>>>) {
        let notifier = Arc::new(SignalNotifier::new());
        let messages = Arc::new(Mutex::new(Vec::new()));
        let messages_clone = messages.clone();
        notifier
            .notified
            .connect(move |n: &Notification| messages_clone.lock().push(n.message.clone()));

        let guard = AsyncResultGuard::new(Arc::new(Unreachable), notifier.clone())
            .with_kind(CandidateKind::Recipes);
        (guard, notifier, messages)
    }

    fn rows(ids: &[&str]) -> FetchResponse {
        FetchResponse::success(ids.iter().map(|id| Candidate::new(*id, *id, "")).collect())
    }

    #[test]
    fn test_current_result_applied() {
        let (guard, _notifier, messages) = guard();
        let ticket = guard.begin("nasi");
        assert!(guard.is_loading());

        let outcome = guard.complete(&ticket, Ok(rows(&["r1", "r2"])));
        assert_eq!(outcome, GuardOutcome::Applied { epoch: 1, count: 2 });
        assert!(!guard.is_loading());
        assert_eq!(guard.candidates().len(), 2);
        assert_eq!(guard.candidates().revision(), 1);
        assert!(messages.lock().is_empty());
    }

    #[test]
    fn test_stale_result_dropped() {
        let (guard, _notifier, messages) = guard();
        let first = guard.begin("n");
        let second = guard.begin("nasi");

        let outcome = guard.complete(&second, Ok(rows(&["b"])));
        assert!(outcome.is_applied());

        let outcome = guard.complete(&first, Ok(rows(&["a1", "a2"])));
        assert_eq!(outcome, GuardOutcome::Stale { epoch: 1, current: 2 });
        assert_eq!(guard.candidates().get(0).map(|c| c.id.as_str()), Some("b"));

        let outcome = guard.complete(&first, Err(FetchError::transport("timeout")));
        assert!(outcome.is_stale());
        assert!(messages.lock().is_empty());
    }

    #[test]
    fn test_failure_notifies_and_keeps_list() {
        let (guard, _notifier, messages) = guard();
        let ticket = guard.begin("");
        guard.complete(&ticket, Ok(rows(&["r1"])));

        let ticket = guard.begin("");
        let outcome = guard.complete(&ticket, Ok(FetchResponse::failure("")));
        assert_eq!(outcome, GuardOutcome::Failed { epoch: 2 });

        let ticket = guard.begin("mie");
        guard.complete(&ticket, Ok(FetchResponse::failure("branch not selected")));

        let ticket = guard.begin("mie");
        guard.complete(&ticket, Err(FetchError::transport("connection reset")));

        assert_eq!(
            *messages.lock(),
            vec![
                "Failed to load recipes".to_string(),
                "branch not selected".to_string(),
                "Failed to search recipes".to_string(),
            ]
        );
        assert_eq!(guard.candidates().len(), 1);
        assert!(!guard.is_loading());
    }

    #[test]
    fn test_request_uses_configured_page() {
        let (guard, _notifier, _messages) = guard();
        let guard = guard.with_page(2, 25);
        let ticket = guard.begin("teh");
        assert_eq!(
            guard.request_for(&ticket),
            FetchRequest {
                query: "teh".into(),
                page: 2,
                page_size: 25,
            }
        );
    }

    #[test]
    fn test_blank_query_requests_default_page() {
        let (guard, _notifier, messages) = guard();
        let ticket = guard.begin("   ");
        assert_eq!(ticket.query(), "");
        assert_eq!(guard.request_for(&ticket).query, "");
        assert_eq!(guard.session().query_text, "");

        guard.complete(&ticket, Err(FetchError::transport("offline")));
        assert_eq!(*messages.lock(), vec!["Failed to load recipes".to_string()]);

        let ticket = guard.begin(" mie ");
        assert_eq!(guard.request_for(&ticket).query, " mie ");
    }

    #[tokio::test]
    async fn test_issue_bumps_epoch_before_polling() {
        let fetcher = Arc::new(fetcher_fn(|request: FetchRequest| async move {
            Ok(FetchResponse::success(vec![Candidate::new(
                request.query.clone(),
                request.query,
                "",
            )]))
        }));
        let guard = AsyncResultGuard::new(fetcher, Arc::new(SignalNotifier::new()));

        let a = guard.issue("a");
        let b = guard.issue("b");
        assert_eq!((a.epoch(), b.epoch()), (1, 2));

        assert!(b.await.is_applied());
        assert!(a.await.is_stale());
        assert_eq!(guard.candidates().get(0).map(|c| c.id.as_str()), Some("b"));
    }
}

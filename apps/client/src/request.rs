//! Uniform `{data, loading, error}` tracking around backend calls.
//!
//! A [`RequestTracker`] wraps any async operation returning
//! `Result<T, ClientError>`. It never propagates the failure itself; callers
//! read the returned `Option` or the observable state. Each call takes a
//! request token and only the most recently issued call may write state, so a
//! slow earlier response cannot overwrite a newer one.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::errors::{error_message, ClientError};
use crate::notifications::{NewNotification, Notifier};

const SUPERSEDED: &str = "Request superseded by a newer call";

#[derive(Debug, Clone, PartialEq)]
pub struct RequestState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

pub type SuccessCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&str) + Send + Sync>;

pub struct RequestOptions<T> {
    /// Shown as a success notification when set.
    pub success_message: Option<String>,
    /// Errors are shown as notifications unless this is set.
    pub suppress_error_message: bool,
    pub on_success: Option<SuccessCallback<T>>,
    pub on_error: Option<ErrorCallback>,
}

impl<T> Default for RequestOptions<T> {
    fn default() -> Self {
        Self {
            success_message: None,
            suppress_error_message: false,
            on_success: None,
            on_error: None,
        }
    }
}

impl<T> RequestOptions<T> {
    pub fn success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    pub fn suppress_error_message(mut self) -> Self {
        self.suppress_error_message = true;
        self
    }

    pub fn on_success(mut self, f: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(f));
        self
    }
}

pub struct RequestTracker<T> {
    label: &'static str,
    state: watch::Sender<RequestState<T>>,
    latest: AtomicU64,
    notifier: Option<Arc<dyn Notifier>>,
    options: RequestOptions<T>,
}

impl<T: Clone + Send + Sync + 'static> RequestTracker<T> {
    pub fn new(label: &'static str, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_options(label, Some(notifier), RequestOptions::default())
    }

    pub fn with_options(
        label: &'static str,
        notifier: Option<Arc<dyn Notifier>>,
        options: RequestOptions<T>,
    ) -> Self {
        let (state, _) = watch::channel(RequestState::default());
        Self {
            label,
            state,
            latest: AtomicU64::new(0),
            notifier,
            options,
        }
    }

    pub fn state(&self) -> RequestState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestState<T>> {
        self.state.subscribe()
    }

    /// Runs `operation`, tracking its lifecycle. Resolves to `None` on failure
    /// and when a newer call was issued before this one completed.
    pub async fn execute<F>(&self, operation: F) -> Option<T>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        self.settle(operation).await.into_result().ok()
    }

    /// Like [`execute`](Self::execute) but re-raises when the call yields no
    /// result.
    pub async fn execute_or_raise<F>(&self, operation: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        self.settle(operation).await.into_result()
    }

    /// Returns to `{data: None, loading: false, error: None}`. Calls still in
    /// flight are treated as superseded.
    pub fn reset(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(RequestState::default());
    }

    /// Runs `operation` and reports whether its outcome was applied or
    /// discarded because a newer call (or a reset) took over.
    pub async fn settle<F>(&self, operation: F) -> Settled<T>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        debug!("{} request #{token} started", self.label);

        let outcome = operation.await;
        let message = outcome.as_ref().err().map(|e| error_message(e));

        // The token is compared under the state lock, so a concurrent reset
        // either lands before this check or overwrites this write.
        let mut applied = false;
        self.state.send_if_modified(|s| {
            if self.latest.load(Ordering::SeqCst) != token {
                return false;
            }
            *s = RequestState {
                data: outcome.as_ref().ok().cloned(),
                loading: false,
                error: message.clone(),
            };
            applied = true;
            true
        });

        if !applied {
            debug!("{} request #{token} superseded; discarding result", self.label);
            return Settled::Superseded(outcome);
        }

        match &outcome {
            Ok(value) => {
                if let (Some(message), Some(notifier)) =
                    (&self.options.success_message, &self.notifier)
                {
                    notifier.notify(NewNotification::success(message.clone()));
                }
                if let Some(on_success) = &self.options.on_success {
                    on_success(value);
                }
            }
            Err(_) => {
                let message = message.unwrap_or_default();
                warn!("{} request #{token} failed: {message}", self.label);
                if !self.options.suppress_error_message {
                    if let Some(notifier) = &self.notifier {
                        notifier.notify(NewNotification::error(message.clone()));
                    }
                }
                if let Some(on_error) = &self.options.on_error {
                    on_error(&message);
                }
            }
        }
        Settled::Latest(outcome)
    }
}

/// How a tracked call ended.
#[derive(Debug)]
pub enum Settled<T> {
    /// The call was still the latest; its outcome is now the tracker state.
    Latest(Result<T, ClientError>),
    /// A newer call or a reset took over; nothing was written or announced.
    Superseded(Result<T, ClientError>),
}

impl<T> Settled<T> {
    pub fn is_superseded(&self) -> bool {
        matches!(self, Settled::Superseded(_))
    }

    pub fn into_result(self) -> Result<T, ClientError> {
        match self {
            Settled::Latest(outcome) => outcome,
            Settled::Superseded(Err(e)) => Err(e),
            Settled::Superseded(Ok(_)) => Err(ClientError::Other(SUPERSEDED.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use parking_lot::Mutex;

    use super::*;
    use crate::notifications::{NotificationCenter, NotificationKind};

    fn tracker(center: &Arc<NotificationCenter>) -> RequestTracker<String> {
        RequestTracker::new("test", center.clone())
    }

    #[tokio::test]
    async fn test_failure_resolves_none_with_error_state() {
        let center = Arc::new(NotificationCenter::default());
        let tracker = tracker(&center);

        let result = tracker
            .execute(async { Err(ClientError::Other("boom".to_string())) })
            .await;

        assert_eq!(result, None);
        assert_eq!(
            tracker.state(),
            RequestState {
                data: None,
                loading: false,
                error: Some("boom".to_string()),
            }
        );
        let notes = center.snapshot();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Error);
        assert_eq!(notes[0].message, "boom");
    }

    #[tokio::test]
    async fn test_success_stores_data() {
        let center = Arc::new(NotificationCenter::default());
        let tracker = tracker(&center);

        let result = tracker.execute(async { Ok("V".to_string()) }).await;

        assert_eq!(result.as_deref(), Some("V"));
        assert_eq!(
            tracker.state(),
            RequestState {
                data: Some("V".to_string()),
                loading: false,
                error: None,
            }
        );
        assert!(center.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_loading_is_observable_while_in_flight() {
        let tracker = Arc::new(RequestTracker::<u32>::with_options(
            "slow",
            None,
            RequestOptions::default(),
        ));
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let worker = {
            let tracker = tracker.clone();
            tokio::spawn(async move {
                tracker
                    .execute(async move {
                        let _ = release_rx.await;
                        Ok(7)
                    })
                    .await
            })
        };

        let mut rx = tracker.subscribe();
        rx.wait_for(|s| s.loading).await.unwrap();
        assert_eq!(tracker.state().error, None);

        release_tx.send(()).unwrap();
        assert_eq!(worker.await.unwrap(), Some(7));
        assert!(!tracker.state().loading);
    }

    #[tokio::test]
    async fn test_options_fire_notifications_and_callbacks() {
        let center = Arc::new(NotificationCenter::default());
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let on_ok = seen.clone();
        let on_err = seen.clone();
        let tracker = RequestTracker::with_options(
            "opts",
            Some(center.clone() as Arc<dyn Notifier>),
            RequestOptions::default()
                .success_message("Saved")
                .suppress_error_message()
                .on_success(move |v: &String| on_ok.lock().push(format!("ok:{v}")))
                .on_error(move |m| on_err.lock().push(format!("err:{m}"))),
        );

        tracker.execute(async { Ok("a".to_string()) }).await;
        tracker
            .execute(async { Err(ClientError::Network("offline".to_string())) })
            .await;

        assert_eq!(*seen.lock(), vec!["ok:a".to_string(), "err:offline".to_string()]);
        let notes = center.snapshot();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Success);
        assert_eq!(notes[0].message, "Saved");
    }

    #[tokio::test]
    async fn test_reset_returns_to_initial_state() {
        let tracker = RequestTracker::<String>::with_options("reset", None, RequestOptions::default());
        tracker
            .execute(async { Err(ClientError::Other("boom".to_string())) })
            .await;

        tracker.reset();

        assert_eq!(tracker.state(), RequestState::default());
    }

    #[tokio::test]
    async fn test_execute_or_raise_surfaces_error() {
        let tracker = RequestTracker::<String>::with_options("raise", None, RequestOptions::default());

        let err = tracker
            .execute_or_raise(async {
                Err(ClientError::Service {
                    status: 422,
                    message: "name is required".to_string(),
                    details: None,
                })
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), "422");
        assert_eq!(err.to_string(), "name is required");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        let center = Arc::new(NotificationCenter::default());
        let tracker = Arc::new(tracker(&center));

        let slow = {
            let tracker = tracker.clone();
            tokio::spawn(async move {
                tracker
                    .execute(async {
                        tokio::time::sleep(Duration::from_millis(500)).await;
                        Ok("slow".to_string())
                    })
                    .await
            })
        };
        // Let the slow call take its token first.
        tokio::task::yield_now().await;

        let fast = tracker
            .execute(async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok("fast".to_string())
            })
            .await;

        assert_eq!(fast.as_deref(), Some("fast"));
        assert_eq!(slow.await.unwrap(), None);
        assert_eq!(tracker.state().data.as_deref(), Some("fast"));
        assert!(!tracker.state().loading);
    }

    #[tokio::test]
    async fn test_reset_while_in_flight_keeps_initial_state() {
        let center = Arc::new(NotificationCenter::default());
        let tracker = Arc::new(tracker(&center));
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let worker = {
            let tracker = tracker.clone();
            tokio::spawn(async move {
                tracker
                    .settle(async move {
                        let _ = release_rx.await;
                        Err(ClientError::Other("late".to_string()))
                    })
                    .await
            })
        };
        tracker.subscribe().wait_for(|s| s.loading).await.unwrap();

        tracker.reset();
        release_tx.send(()).unwrap();
        let settled = worker.await.unwrap();

        assert!(settled.is_superseded());
        assert_eq!(settled.into_result().unwrap_err().to_string(), "late");
        assert_eq!(tracker.state(), RequestState::default());
        assert!(center.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_settle_reports_latest_outcome() {
        let tracker = RequestTracker::<u32>::with_options("settle", None, RequestOptions::default());

        let settled = tracker.settle(async { Ok(3) }).await;

        assert!(!settled.is_superseded());
        assert_eq!(settled.into_result().unwrap(), 3);
        assert_eq!(tracker.state().data, Some(3));
    }
}

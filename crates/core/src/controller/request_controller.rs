use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use super::events::{ControllerEvent, ControllerEventKind};
use super::state::{AnalysisRequest, FailureInfo, RequestState};
use super::Refusal;
use crate::config::ClientConfig;
use crate::report::{normalize, Report};
use crate::transport::{AnalysisTransport, AnalyzeBody, HttpTransport, TransportError};

/// Everything the controller mutates, kept behind one lock
#[derive(Debug, Default)]
struct Session {
    state: RequestState,
    /// Last request that reached the network, kept for credential retries
    last_request: Option<AnalysisRequest>,
    /// Credential reused by later submissions that do not bring their own
    retained_credential: Option<String>,
    attempts: u64,
}

impl Session {
    /// Move to InFlight and build the wire body for this attempt
    fn begin(&mut self, request: AnalysisRequest) -> (u64, AnalyzeBody) {
        let custom_api_key = request
            .credential
            .clone()
            .or_else(|| self.retained_credential.clone());
        let body = AnalyzeBody {
            idea: request.idea.clone(),
            industry: request.industry.clone(),
            custom_api_key,
        };

        self.attempts += 1;
        self.last_request = Some(request);
        self.state = RequestState::InFlight;
        (self.attempts, body)
    }
}

/// Drives analysis requests through their lifecycle.
///
/// Cloning is cheap and every clone drives the same state, so one handle can
/// live in the presentation layer while another awaits a submission.
///
/// ## Usage
///
/// ```rust,ignore
/// use founderslens_core::config::ClientConfig;
/// use founderslens_core::controller::{AnalysisRequest, RequestController};
///
/// let controller = RequestController::from_config(&ClientConfig::default())?;
/// controller.submit(AnalysisRequest::new("Pet insurance", "Fintech")).await?;
/// if let Some(report) = controller.report().await {
///     println!("viability: {}", report.viability_score);
/// }
/// ```
#[derive(Clone)]
pub struct RequestController {
    transport: Arc<dyn AnalysisTransport>,
    session: Arc<RwLock<Session>>,
    event_tx: Option<mpsc::Sender<ControllerEvent>>,
}

impl RequestController {
    /// Create a controller over any transport
    pub fn new(transport: Arc<dyn AnalysisTransport>) -> Self {
        Self {
            transport,
            session: Arc::new(RwLock::new(Session::default())),
            event_tx: None,
        }
    }

    /// Create a controller talking HTTP to the configured service.
    ///
    /// A configured API key is used as the starting credential.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config)?;
        let session = Session {
            retained_credential: config.api_key.clone(),
            ..Session::default()
        };

        Ok(Self {
            transport: Arc::new(transport),
            session: Arc::new(RwLock::new(session)),
            event_tx: None,
        })
    }

    /// Publish transitions on the given channel
    pub fn with_event_channel(mut self, tx: mpsc::Sender<ControllerEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Snapshot of the current state
    pub async fn state(&self) -> RequestState {
        self.session.read().await.state.clone()
    }

    /// The report, if the last attempt succeeded
    pub async fn report(&self) -> Option<Report> {
        self.session.read().await.state.report().cloned()
    }

    /// Credential that the next submission will use when it brings none
    pub async fn retained_credential(&self) -> Option<String> {
        self.session.read().await.retained_credential.clone()
    }

    /// Submit a new analysis and wait for it to resolve.
    ///
    /// Returns once the state is `Succeeded` or `Failed`. Refused without any
    /// state change when a field is blank or another request is in flight.
    #[tracing::instrument(skip(self, request), fields(industry = %request.industry.trim()))]
    pub async fn submit(&self, request: AnalysisRequest) -> Result<(), Refusal> {
        let request = request.validated().map_err(|refusal| {
            tracing::debug!(%refusal, "Submission refused");
            refusal
        })?;

        let (attempt, body) = {
            let mut session = self.session.write().await;
            if session.state.is_in_flight() {
                tracing::warn!("Submission refused: a request is already in flight");
                return Err(Refusal::InFlight);
            }
            session.begin(request)
        };

        tracing::info!(
            attempt,
            with_key = body.custom_api_key.is_some(),
            "Analysis submitted"
        );
        self.emit(ControllerEvent::new(ControllerEventKind::Submitted, attempt))
            .await;

        self.execute(attempt, body).await;
        Ok(())
    }

    /// Re-issue the last idea and industry with an alternate credential.
    ///
    /// Only allowed while the state is `Failed` with `QuotaExhausted`.
    #[tracing::instrument(skip(self, key))]
    pub async fn retry_with_credential(&self, key: impl Into<String>) -> Result<(), Refusal> {
        let key = key.into();
        let key = key.trim();
        if key.is_empty() {
            return Err(Refusal::EmptyCredential);
        }

        let (attempt, body) = {
            let mut session = self.session.write().await;
            if session.state.is_in_flight() {
                return Err(Refusal::InFlight);
            }
            if !session.state.can_retry_with_credential() {
                return Err(Refusal::NotQuotaFailure);
            }
            let Some(last) = session.last_request.clone() else {
                return Err(Refusal::NotQuotaFailure);
            };
            session.begin(AnalysisRequest {
                credential: Some(key.to_string()),
                ..last
            })
        };

        tracing::info!(attempt, "Retrying analysis with alternate credential");
        self.emit(ControllerEvent::new(
            ControllerEventKind::RetryRequested,
            attempt,
        ))
        .await;

        self.execute(attempt, body).await;
        Ok(())
    }

    /// Return a finished attempt to `Idle`, clearing report or failure.
    ///
    /// No-op from `Idle`; refused while a request is in flight.
    pub async fn dismiss(&self) -> Result<(), Refusal> {
        let attempt = {
            let mut session = self.session.write().await;
            if session.state.is_in_flight() {
                return Err(Refusal::InFlight);
            }
            if session.state.is_idle() {
                return Ok(());
            }
            session.state = RequestState::Idle;
            session.attempts
        };

        tracing::debug!(attempt, "Analysis dismissed");
        self.emit(ControllerEvent::new(ControllerEventKind::Dismissed, attempt))
            .await;
        Ok(())
    }

    /// Run one attempt on the transport and record its outcome.
    ///
    /// The attempt runs on its own task, so the outcome is recorded even when
    /// the caller stops awaiting `submit`.
    async fn execute(&self, attempt: u64, body: AnalyzeBody) {
        let this = self.clone();
        let task = tokio::spawn(async move {
            let outcome = this.transport.analyze(&body).await;
            this.record(attempt, body.custom_api_key, outcome).await;
        });

        if let Err(e) = task.await {
            tracing::error!(attempt, error = %e, "Analysis task aborted");
            self.record(attempt, None, Err(TransportError::Network(e.to_string())))
                .await;
        }
    }

    async fn record(
        &self,
        attempt: u64,
        credential: Option<String>,
        outcome: Result<Value, TransportError>,
    ) {
        let event = {
            let mut session = self.session.write().await;
            if session.attempts != attempt || !session.state.is_in_flight() {
                return;
            }
            match outcome {
                Ok(raw) => {
                    let report = normalize(&raw);
                    tracing::info!(
                        attempt,
                        viability_score = report.viability_score,
                        "Analysis succeeded"
                    );
                    if let Some(key) = credential {
                        session.retained_credential = Some(key);
                    }
                    session.state = RequestState::Succeeded(report);
                    ControllerEvent::new(ControllerEventKind::Succeeded, attempt)
                }
                Err(e) => {
                    let category = e.category();
                    tracing::warn!(attempt, ?category, error = %e, "Analysis failed");
                    session.state = RequestState::Failed(FailureInfo::from(category));
                    ControllerEvent::new(ControllerEventKind::Failed, attempt)
                        .with_category(category)
                }
            }
        };

        self.emit(event).await;
    }

    async fn emit(&self, event: ControllerEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::FailureCategory;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::{oneshot, Notify};
    use tokio_test::{assert_err, assert_ok};

    /// Replays canned outcomes and records every body it was sent
    #[derive(Default)]
    struct ScriptedTransport {
        outcomes: Mutex<VecDeque<Result<Value, TransportError>>>,
        sent: Mutex<Vec<AnalyzeBody>>,
    }

    impl ScriptedTransport {
        fn with(outcomes: Vec<Result<Value, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes.into()),
                sent: Mutex::new(Vec::new()),
            })
        }

        fn sent(&self) -> Vec<AnalyzeBody> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AnalysisTransport for ScriptedTransport {
        async fn analyze(&self, body: &AnalyzeBody) -> Result<Value, TransportError> {
            self.sent.lock().unwrap().push(body.clone());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Network("script exhausted".into())))
        }
    }

    /// Holds the request open until released
    struct GatedTransport {
        started: Mutex<Option<oneshot::Sender<()>>>,
        release: Notify,
    }

    #[async_trait]
    impl AnalysisTransport for GatedTransport {
        async fn analyze(&self, _body: &AnalyzeBody) -> Result<Value, TransportError> {
            let started = self.started.lock().unwrap().take();
            if let Some(tx) = started {
                let _ = tx.send(());
            }
            self.release.notified().await;
            Ok(json!({"strategy": {"viability_score": 70}}))
        }
    }

    struct PanickingTransport;

    #[async_trait]
    impl AnalysisTransport for PanickingTransport {
        async fn analyze(&self, _body: &AnalyzeBody) -> Result<Value, TransportError> {
            panic!("transport blew up");
        }
    }

    fn quota() -> Result<Value, TransportError> {
        Err(TransportError::Status {
            status: 429,
            body: "quota".to_string(),
        })
    }

    fn success() -> Result<Value, TransportError> {
        Ok(json!({
            "research": {"competitors": [{"name": "A", "market_share": "42%"}]},
            "strategy": {"viability_score": 81}
        }))
    }

    #[tokio::test]
    async fn test_submit_success() {
        let transport = ScriptedTransport::with(vec![success()]);
        let controller = RequestController::new(transport.clone());

        assert_ok!(
            controller
                .submit(AnalysisRequest::new("Pet insurance", "Fintech"))
                .await
        );

        let report = controller.report().await.unwrap();
        assert_eq!(report.viability_score, 81);
        assert_eq!(report.competitors.len(), 1);

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].idea, "Pet insurance");
        assert!(sent[0].custom_api_key.is_none());
    }

    #[tokio::test]
    async fn test_empty_industry_never_reaches_network() {
        let transport = ScriptedTransport::with(vec![success()]);
        let controller = RequestController::new(transport.clone());

        let refusal = controller
            .submit(AnalysisRequest::new("Pet insurance", "   "))
            .await;

        assert_eq!(refusal, Err(Refusal::EmptyIndustry));
        assert!(controller.state().await.is_idle());
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_submit_while_in_flight_is_refused() {
        let (started_tx, started_rx) = oneshot::channel();
        let transport = Arc::new(GatedTransport {
            started: Mutex::new(Some(started_tx)),
            release: Notify::new(),
        });
        let controller = RequestController::new(transport.clone());

        let background = controller.clone();
        let pending = tokio::spawn(async move {
            background
                .submit(AnalysisRequest::new("Idea", "Industry"))
                .await
        });
        started_rx.await.unwrap();

        assert!(controller.state().await.is_in_flight());
        assert_eq!(
            controller.submit(AnalysisRequest::new("Other", "Thing")).await,
            Err(Refusal::InFlight)
        );
        assert_eq!(controller.dismiss().await, Err(Refusal::InFlight));
        assert!(controller.state().await.is_in_flight());

        transport.release.notify_one();
        assert_ok!(pending.await.unwrap());
        assert_eq!(controller.report().await.unwrap().viability_score, 70);
    }

    #[tokio::test]
    async fn test_quota_failure_then_retry_with_credential() {
        let transport = ScriptedTransport::with(vec![quota(), success()]);
        let controller = RequestController::new(transport.clone());

        assert_ok!(
            controller
                .submit(AnalysisRequest::new("Pet insurance", "Fintech"))
                .await
        );
        let state = controller.state().await;
        let failure = state.failure().unwrap();
        assert_eq!(failure.category, FailureCategory::QuotaExhausted);
        assert_eq!(failure.message, "Daily API Quota Exceeded");

        assert_ok!(controller.retry_with_credential("sk-alternate").await);

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].idea, "Pet insurance");
        assert_eq!(sent[1].industry, "Fintech");
        assert_eq!(sent[1].custom_api_key.as_deref(), Some("sk-alternate"));
        assert!(controller.report().await.is_some());
    }

    #[tokio::test]
    async fn test_accepted_credential_is_reused() {
        let transport = ScriptedTransport::with(vec![quota(), success(), success()]);
        let controller = RequestController::new(transport.clone());

        assert_ok!(controller.submit(AnalysisRequest::new("A", "B")).await);
        assert_ok!(controller.retry_with_credential("sk-alt").await);
        assert_eq!(
            controller.retained_credential().await.as_deref(),
            Some("sk-alt")
        );

        assert_ok!(controller.dismiss().await);
        assert_ok!(controller.submit(AnalysisRequest::new("C", "D")).await);

        let sent = transport.sent();
        assert_eq!(sent[2].idea, "C");
        assert_eq!(sent[2].custom_api_key.as_deref(), Some("sk-alt"));
    }

    #[tokio::test]
    async fn test_failed_credential_is_not_retained() {
        let transport = ScriptedTransport::with(vec![quota(), quota()]);
        let controller = RequestController::new(transport.clone());

        assert_ok!(controller.submit(AnalysisRequest::new("A", "B")).await);
        assert_ok!(controller.retry_with_credential("sk-also-empty").await);

        assert!(controller.state().await.can_retry_with_credential());
        assert!(controller.retained_credential().await.is_none());
    }

    #[tokio::test]
    async fn test_retry_requires_quota_failure() {
        let transport = ScriptedTransport::with(vec![Err(TransportError::Status {
            status: 500,
            body: String::new(),
        })]);
        let controller = RequestController::new(transport.clone());

        assert_eq!(
            controller.retry_with_credential("sk").await,
            Err(Refusal::NotQuotaFailure)
        );

        assert_ok!(controller.submit(AnalysisRequest::new("A", "B")).await);
        let state = controller.state().await;
        assert_eq!(
            state.failure().unwrap().category,
            FailureCategory::TransportOrServerError
        );
        assert_err!(controller.retry_with_credential("sk").await);
        assert_eq!(
            controller.retry_with_credential("  ").await,
            Err(Refusal::EmptyCredential)
        );
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_dismiss_clears_failure() {
        let transport = ScriptedTransport::with(vec![quota()]);
        let controller = RequestController::new(transport);

        assert_ok!(controller.submit(AnalysisRequest::new("A", "B")).await);
        assert!(controller.state().await.failure().is_some());

        assert_ok!(controller.dismiss().await);
        let state = controller.state().await;
        assert_eq!(state, RequestState::Idle);
        assert!(state.failure().is_none());

        // Dismissing again is a no-op
        assert_ok!(controller.dismiss().await);
    }

    #[tokio::test]
    async fn test_events_follow_transitions() {
        let transport = ScriptedTransport::with(vec![quota(), success()]);
        let (tx, mut rx) = mpsc::channel(16);
        let controller = RequestController::new(transport).with_event_channel(tx);

        assert_ok!(controller.submit(AnalysisRequest::new("A", "B")).await);
        assert_ok!(controller.retry_with_credential("sk").await);
        assert_ok!(controller.dismiss().await);
        drop(controller);

        let mut kinds = Vec::new();
        while let Some(event) = rx.recv().await {
            kinds.push((event.kind, event.attempt, event.category));
        }
        assert_eq!(
            kinds,
            vec![
                (ControllerEventKind::Submitted, 1, None),
                (
                    ControllerEventKind::Failed,
                    1,
                    Some(FailureCategory::QuotaExhausted)
                ),
                (ControllerEventKind::RetryRequested, 2, None),
                (ControllerEventKind::Succeeded, 2, None),
                (ControllerEventKind::Dismissed, 2, None),
            ]
        );
    }

    #[tokio::test]
    async fn test_abandoned_submit_still_resolves() {
        let (started_tx, started_rx) = oneshot::channel();
        let transport = Arc::new(GatedTransport {
            started: Mutex::new(Some(started_tx)),
            release: Notify::new(),
        });
        let (tx, mut rx) = mpsc::channel(16);
        let controller = RequestController::new(transport.clone()).with_event_channel(tx);

        let abandoned = tokio::time::timeout(
            Duration::from_millis(50),
            controller.submit(AnalysisRequest::new("Idea", "Industry")),
        )
        .await;
        assert!(abandoned.is_err());
        started_rx.await.unwrap();
        assert!(controller.state().await.is_in_flight());

        transport.release.notify_one();
        loop {
            let event = rx.recv().await.unwrap();
            if event.kind == ControllerEventKind::Succeeded {
                break;
            }
        }

        assert_eq!(controller.report().await.unwrap().viability_score, 70);
        assert_ok!(controller.dismiss().await);
        assert!(controller.state().await.is_idle());
    }

    #[tokio::test]
    async fn test_panicking_transport_records_failure() {
        let controller = RequestController::new(Arc::new(PanickingTransport));

        assert_ok!(controller.submit(AnalysisRequest::new("A", "B")).await);

        let state = controller.state().await;
        assert_eq!(
            state.failure().unwrap().category,
            FailureCategory::TransportOrServerError
        );
        assert_ok!(controller.dismiss().await);
    }
}

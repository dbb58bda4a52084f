//! Generation state machine with latest-wins completion.
//!
//! Every configuration change that passes the readiness check starts a new attempt
//! tagged with a monotonically increasing sequence number. When an attempt completes
//! its tag is compared with the most recently *initiated* one; anything older is
//! dropped without touching displayed state. No cancellation is sent to the encoder.
//!
//! ```text
//! Idle ──ready change──▶ Generating ──ok──▶ Ready
//!                            │
//!                            └──err──▶ Failed   (previous image kept)
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::EncodeError;
use crate::models::{PayloadConfig, RenderParams};
use crate::payload;
use crate::render::{QrEncoder, RenderedImage};

/// User-facing message for a failed attempt; the cause is appended
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate QR code";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPhase {
    Idle,
    Generating,
    Ready,
    Failed,
}

/// What the preview currently shows
#[derive(Debug, Clone)]
pub struct DisplayState {
    pub phase: GenerationPhase,
    /// Last successfully rendered image. Survives later failures and not-ready edits.
    pub image: Option<Arc<RenderedImage>>,
    pub error: Option<String>,
    /// Sequence number of the attempt that produced `image`
    pub image_sequence: Option<u64>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self { phase: GenerationPhase::Idle, image: None, error: None, image_sequence: None }
    }
}

/// Result of feeding one configuration change through the controller
#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    /// The configuration was incomplete; nothing was attempted
    NotReady,
    /// This attempt's image is now displayed
    Rendered(Arc<RenderedImage>),
    /// This attempt failed; the message is now displayed
    Failed(String),
    /// A newer attempt was started before this one finished; its result was discarded
    Superseded { sequence: u64, latest: u64 },
}

/// An initiated attempt waiting for the encoder
#[derive(Debug, Clone)]
pub struct Attempt {
    pub sequence: u64,
    pub payload: String,
    pub params: RenderParams,
}

pub struct GenerationController {
    encoder: Arc<dyn QrEncoder>,
    latest: AtomicU64,
    state: Mutex<DisplayState>,
    timeout: Option<Duration>,
}

impl GenerationController {
    pub fn new(encoder: Arc<dyn QrEncoder>) -> Self {
        Self {
            encoder,
            latest: AtomicU64::new(0),
            state: Mutex::new(DisplayState::default()),
            timeout: None,
        }
    }

    /// Fail attempts whose encoder call takes longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Snapshot of what should be displayed
    pub fn state(&self) -> DisplayState {
        self.lock_state().clone()
    }

    /// Sequence number of the most recently initiated attempt (0 before the first)
    pub fn latest_sequence(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// React to a configuration change: check readiness, encode, apply.
    pub async fn on_config_change(&self, config: &PayloadConfig) -> GenerationOutcome {
        match self.begin(config) {
            Some(attempt) => self.run(attempt).await,
            None => GenerationOutcome::NotReady,
        }
    }

    /// Start an attempt if the configuration is ready.
    ///
    /// Returns `None` and leaves displayed state alone when it is not; an attempt
    /// already in flight is not superseded by a not-ready edit.
    pub fn begin(&self, config: &PayloadConfig) -> Option<Attempt> {
        let payload = payload::encode_if_ready(config)?;

        let mut state = self.lock_state();
        let sequence = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        state.phase = GenerationPhase::Generating;
        drop(state);

        debug!(sequence, kind = %config.kind, "generation attempt started");
        Some(Attempt { sequence, payload, params: config.render_params.clone() })
    }

    /// Call the encoder for `attempt` and apply the result if it is still current.
    pub async fn run(&self, attempt: Attempt) -> GenerationOutcome {
        let encode = self.encoder.encode(&attempt.payload, &attempt.params);
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, encode)
                .await
                .unwrap_or_else(|_| Err(EncodeError::Timeout(timeout_millis(limit)))),
            None => encode.await,
        };
        self.apply(attempt.sequence, result)
    }

    /// Apply a finished attempt. Results from superseded attempts are discarded.
    pub fn apply(
        &self,
        sequence: u64,
        result: Result<RenderedImage, EncodeError>,
    ) -> GenerationOutcome {
        let mut state = self.lock_state();

        // Compared under the state lock so a concurrent `begin` cannot slip in between
        let latest = self.latest.load(Ordering::SeqCst);
        if sequence != latest {
            debug!(sequence, latest, "discarding stale generation result");
            return GenerationOutcome::Superseded { sequence, latest };
        }

        match result {
            Ok(image) => {
                let image = Arc::new(image);
                state.phase = GenerationPhase::Ready;
                state.image = Some(Arc::clone(&image));
                state.image_sequence = Some(sequence);
                state.error = None;
                info!(sequence, "QR code generated");
                GenerationOutcome::Rendered(image)
            }
            Err(e) => {
                let message = format!("{}: {}", GENERATION_FAILED_MESSAGE, e);
                state.phase = GenerationPhase::Failed;
                state.error = Some(message.clone());
                warn!(sequence, error = %e, "QR generation failed");
                GenerationOutcome::Failed(message)
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, DisplayState> {
        // State is plain data; a panic elsewhere cannot leave it half-written
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn timeout_millis(limit: Duration) -> u64 {
    u64::try_from(limit.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tokio::sync::oneshot;

    use super::*;
    use crate::models::ContentKind;
    use crate::render::{EncodeFuture, render_payload};

    fn url(text: &str) -> PayloadConfig {
        PayloadConfig::new(ContentKind::Url).with_text(text)
    }

    fn rendered(payload: &str) -> RenderedImage {
        render_payload(payload, &RenderParams::default()).unwrap()
    }

    /// Encoder whose calls block until the test releases them, keyed by payload
    #[derive(Default)]
    struct GatedEncoder {
        gates: Mutex<HashMap<String, oneshot::Receiver<Result<RenderedImage, EncodeError>>>>,
    }

    impl GatedEncoder {
        fn gate(&self, payload: &str) -> oneshot::Sender<Result<RenderedImage, EncodeError>> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(payload.to_string(), rx);
            tx
        }
    }

    impl QrEncoder for GatedEncoder {
        fn encode<'a>(&'a self, payload: &'a str, _params: &'a RenderParams) -> EncodeFuture<'a> {
            let rx = self.gates.lock().unwrap().remove(payload);
            Box::pin(async move {
                match rx {
                    Some(rx) => rx.await.unwrap_or(Err(EncodeError::Task("gate dropped".into()))),
                    None => Err(EncodeError::Symbol("no gate".into())),
                }
            })
        }
    }

    /// Encoder that never completes
    struct StuckEncoder;

    impl QrEncoder for StuckEncoder {
        fn encode<'a>(&'a self, _payload: &'a str, _params: &'a RenderParams) -> EncodeFuture<'a> {
            Box::pin(std::future::pending())
        }
    }

    fn controller(encoder: Arc<dyn QrEncoder>) -> Arc<GenerationController> {
        Arc::new(GenerationController::new(encoder))
    }

    #[test]
    fn test_initial_state_idle() {
        let ctrl = controller(Arc::new(GatedEncoder::default()));
        let state = ctrl.state();
        assert_eq!(state.phase, GenerationPhase::Idle);
        assert!(state.image.is_none());
        assert!(state.error.is_none());
        assert_eq!(ctrl.latest_sequence(), 0);
    }

    #[test]
    fn test_not_ready_stays_idle_without_attempt() {
        let ctrl = controller(Arc::new(GatedEncoder::default()));
        assert!(ctrl.begin(&url("")).is_none());
        assert_eq!(ctrl.state().phase, GenerationPhase::Idle);
        assert_eq!(ctrl.latest_sequence(), 0);
    }

    #[test]
    fn test_begin_encodes_payload_and_marks_generating() {
        let ctrl = controller(Arc::new(GatedEncoder::default()));
        let attempt = ctrl.begin(&url("example.com")).unwrap();

        assert_eq!(attempt.sequence, 1);
        assert_eq!(attempt.payload, "https://example.com");
        assert_eq!(ctrl.state().phase, GenerationPhase::Generating);
    }

    #[test]
    fn test_apply_in_reverse_completion_order_keeps_latest() {
        let ctrl = controller(Arc::new(GatedEncoder::default()));
        let a = ctrl.begin(&url("a.example")).unwrap();
        let b = ctrl.begin(&url("b.example")).unwrap();

        let out_b = ctrl.apply(b.sequence, Ok(rendered(&b.payload)));
        assert!(matches!(out_b, GenerationOutcome::Rendered(_)));

        let out_a = ctrl.apply(a.sequence, Ok(rendered(&a.payload)));
        assert!(matches!(out_a, GenerationOutcome::Superseded { sequence: 1, latest: 2 }));

        let state = ctrl.state();
        assert_eq!(state.phase, GenerationPhase::Ready);
        assert_eq!(state.image.unwrap().payload, "https://b.example");
        assert_eq!(state.image_sequence, Some(2));
    }

    #[test]
    fn test_stale_failure_does_not_overwrite_newer_success() {
        let ctrl = controller(Arc::new(GatedEncoder::default()));
        let a = ctrl.begin(&url("a.example")).unwrap();
        let b = ctrl.begin(&url("b.example")).unwrap();

        ctrl.apply(b.sequence, Ok(rendered(&b.payload)));
        ctrl.apply(a.sequence, Err(EncodeError::Symbol("boom".into())));

        let state = ctrl.state();
        assert_eq!(state.phase, GenerationPhase::Ready);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_failure_keeps_previous_image() {
        let ctrl = controller(Arc::new(GatedEncoder::default()));
        let first = ctrl.begin(&url("ok.example")).unwrap();
        ctrl.apply(first.sequence, Ok(rendered(&first.payload)));

        let second = ctrl.begin(&url("bad.example")).unwrap();
        let outcome = ctrl.apply(second.sequence, Err(EncodeError::Capacity { level: "H".into() }));

        match outcome {
            GenerationOutcome::Failed(message) => {
                assert!(message.starts_with(GENERATION_FAILED_MESSAGE));
                assert!(message.contains("too long"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        let state = ctrl.state();
        assert_eq!(state.phase, GenerationPhase::Failed);
        assert_eq!(state.image.unwrap().payload, "https://ok.example");
        assert!(state.error.is_some());
    }

    #[test]
    fn test_success_clears_previous_error() {
        let ctrl = controller(Arc::new(GatedEncoder::default()));
        let a = ctrl.begin(&url("a.example")).unwrap();
        ctrl.apply(a.sequence, Err(EncodeError::Symbol("boom".into())));
        assert!(ctrl.state().error.is_some());

        let b = ctrl.begin(&url("b.example")).unwrap();
        ctrl.apply(b.sequence, Ok(rendered(&b.payload)));
        assert!(ctrl.state().error.is_none());
    }

    #[test]
    fn test_not_ready_edit_keeps_image_and_in_flight_attempt() {
        let ctrl = controller(Arc::new(GatedEncoder::default()));
        let a = ctrl.begin(&url("a.example")).unwrap();

        // User clears the field while A is outstanding
        assert!(ctrl.begin(&url("")).is_none());

        let outcome = ctrl.apply(a.sequence, Ok(rendered(&a.payload)));
        assert!(matches!(outcome, GenerationOutcome::Rendered(_)));
        assert!(ctrl.state().image.is_some());
    }

    #[tokio::test]
    async fn test_latest_initiated_wins_when_earlier_resolves_last() {
        let encoder = Arc::new(GatedEncoder::default());
        let release_a = encoder.gate("https://a.example");
        let release_b = encoder.gate("https://b.example");
        let ctrl = controller(encoder);

        let attempt_a = ctrl.begin(&url("a.example")).unwrap();
        let attempt_b = ctrl.begin(&url("b.example")).unwrap();

        let task_a = tokio::spawn({
            let ctrl = Arc::clone(&ctrl);
            async move { ctrl.run(attempt_a).await }
        });
        let task_b = tokio::spawn({
            let ctrl = Arc::clone(&ctrl);
            async move { ctrl.run(attempt_b).await }
        });

        release_b.send(Ok(rendered("https://b.example"))).unwrap();
        let outcome_b = task_b.await.unwrap();
        assert!(matches!(outcome_b, GenerationOutcome::Rendered(_)));

        release_a.send(Ok(rendered("https://a.example"))).unwrap();
        let outcome_a = task_a.await.unwrap();
        assert!(matches!(outcome_a, GenerationOutcome::Superseded { .. }));

        assert_eq!(ctrl.state().image.unwrap().payload, "https://b.example");
    }

    #[tokio::test]
    async fn test_on_config_change_not_ready() {
        let ctrl = controller(Arc::new(GatedEncoder::default()));
        let outcome = ctrl.on_config_change(&PayloadConfig::new(ContentKind::Wifi)).await;
        assert!(matches!(outcome, GenerationOutcome::NotReady));
    }

    #[tokio::test]
    async fn test_on_config_change_with_real_encoder() {
        let ctrl = controller(Arc::new(crate::render::QrCodeEncoder::new()));
        let outcome = ctrl.on_config_change(&url("example.com")).await;

        match outcome {
            GenerationOutcome::Rendered(image) => assert_eq!(image.payload, "https://example.com"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(ctrl.state().phase, GenerationPhase::Ready);
    }

    #[tokio::test]
    async fn test_timeout_becomes_failure() {
        let ctrl = GenerationController::new(Arc::new(StuckEncoder))
            .with_timeout(Some(Duration::from_millis(20)));

        let outcome = ctrl.on_config_change(&url("example.com")).await;
        match outcome {
            GenerationOutcome::Failed(message) => assert!(message.contains("timed out after 20 ms")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(ctrl.state().phase, GenerationPhase::Failed);
    }

    #[test]
    fn test_timeout_millis_saturates() {
        assert_eq!(timeout_millis(Duration::from_millis(20)), 20);
        assert_eq!(timeout_millis(Duration::MAX), u64::MAX);
    }
}

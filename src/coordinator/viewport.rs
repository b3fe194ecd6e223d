//! Viewport coordinator: drives one viewport's guest interaction.
//!
//! [`ViewportCoordinator`] is an actor: all of its state is mutated inside
//! [`run`](ViewportCoordinator::run), which serialises local commands,
//! inbound bus envelopes, gesture poll ticks and the completions of the
//! network calls it spawned.
//!
//! # Flow
//!
//! ```text
//! Command::Submit / accepted wave
//!   └─▶ AwaitingCapture: capture (submit quality)
//!         └─▶ Loading: spawn AnalysisClient::analyze
//!               ├─ Ok  → ShowingResult, broadcast Result, render (stop mascot,
//!               │        narrate after delay)
//!               └─ Err → alert, Idle, gesture polling re-armed
//!
//! Command::Reset ──▶ broadcast Reset, then apply reset locally
//! bus Result     ──▶ render without rebroadcast   (roles that render results)
//! bus Reset      ──▶ apply reset without rebroadcast
//! ```
//!
//! Every spawned call reports back tagged with the epoch it started in.
//! The epoch is bumped on each reset and whenever a remote result replaces
//! local work, so completions from a superseded interaction are dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::assets::AvatarCatalog;
use crate::bus::{Envelope, MessageBus, OrchestrationMessage};
use crate::capture::{CapturePurpose, CaptureService};
use crate::compositor::ColorKeyCompositor;
use crate::config::{AppConfig, ViewRole};
use crate::gesture::{GestureSession, PollContext, SkipReason};
use crate::narration::NarrationService;
use crate::remote::{AnalysisClient, AnalysisError, GestureDetector, GuestResult};

use super::command::Command;
use super::state::InteractionState;
use super::view::ViewSink;

pub const ALERT_EMPTY_NAME: &str = "Please enter your name.";
pub const ALERT_CAPTURE: &str = "Could not access webcam. Please allow permissions.";
pub const ALERT_ANALYSIS: &str = "Error during analysis. Please try again.";
pub const ALERT_CONNECTION: &str = "Failed to connect to server.";

/// Guest-visible alert for a failed analysis call.
pub fn alert_for(error: &AnalysisError) -> &'static str {
    match error {
        AnalysisError::Request(_) | AnalysisError::Timeout => ALERT_CONNECTION,
        AnalysisError::Parse(_) | AnalysisError::Backend(_) => ALERT_ANALYSIS,
    }
}

// ---------------------------------------------------------------------------
// Settings and collaborators
// ---------------------------------------------------------------------------

/// Tunables the coordinator reads from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub gesture_enabled: bool,
    pub gesture_interval: Duration,
    /// Name submitted when a wave triggers the analysis.
    pub trigger_name: String,
    pub narration_delay: Duration,
    /// Narration text when the backend sends no message; `{name}` is
    /// replaced with the guest's name.
    pub narration_template: String,
}

impl CoordinatorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            gesture_enabled: config.gesture.enabled,
            gesture_interval: config.gesture.interval(),
            trigger_name: config.gesture.trigger_name.clone(),
            narration_delay: config.narration.delay(),
            narration_template: config.narration.template.clone(),
        }
    }
}

/// Everything the coordinator drives.
///
/// `capture` and `detector` are dropped on roles that do not own capture;
/// `compositor` is dropped on roles that do not render results.
pub struct Collaborators {
    pub bus: Arc<dyn MessageBus>,
    pub analysis: Arc<dyn AnalysisClient>,
    pub capture: Option<CaptureService>,
    pub detector: Option<Arc<dyn GestureDetector>>,
    pub compositor: Option<ColorKeyCompositor>,
    pub narration: NarrationService,
    pub view: Arc<dyn ViewSink>,
    pub avatars: AvatarCatalog,
}

/// Completions reported by spawned tasks.
#[derive(Debug)]
enum Event {
    Analysis {
        epoch: u64,
        result: Result<GuestResult, AnalysisError>,
    },
    GesturePolled {
        epoch: u64,
        detected: bool,
    },
    NarrationDue {
        epoch: u64,
    },
}

// ---------------------------------------------------------------------------
// ViewportCoordinator
// ---------------------------------------------------------------------------

/// The interaction state machine of one viewport process.
///
/// ```rust,no_run
/// # use kiosk_greeter::coordinator::{Collaborators, CoordinatorSettings, ViewportCoordinator};
/// # use kiosk_greeter::config::AppConfig;
/// # async fn example(parts: Collaborators) {
/// let config = AppConfig::default();
/// let coordinator = ViewportCoordinator::new(
///     config.role,
///     CoordinatorSettings::from_config(&config),
///     parts,
/// );
///
/// let (command_tx, command_rx) = tokio::sync::mpsc::channel(16);
/// # let _ = command_tx;
/// coordinator.run(command_rx).await;
/// # }
/// ```
pub struct ViewportCoordinator {
    role: ViewRole,
    origin: Uuid,
    settings: CoordinatorSettings,

    state: InteractionState,
    live: Option<GuestResult>,
    session: GestureSession,
    epoch: u64,

    bus: Arc<dyn MessageBus>,
    analysis: Arc<dyn AnalysisClient>,
    capture: Option<CaptureService>,
    detector: Option<Arc<dyn GestureDetector>>,
    compositor: Option<ColorKeyCompositor>,
    narration: NarrationService,
    view: Arc<dyn ViewSink>,
    avatars: AvatarCatalog,

    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
}

impl ViewportCoordinator {
    pub fn new(role: ViewRole, settings: CoordinatorSettings, parts: Collaborators) -> Self {
        let Collaborators {
            bus,
            analysis,
            mut capture,
            mut detector,
            mut compositor,
            narration,
            view,
            avatars,
        } = parts;

        if !role.owns_capture() && (capture.is_some() || detector.is_some()) {
            log::debug!("coordinator: {} role does not own capture, dropping it", role.label());
            capture = None;
            detector = None;
        }
        if !role.renders_results() && compositor.take().is_some() {
            log::debug!("coordinator: {} role does not render, dropping compositor", role.label());
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            role,
            origin: Uuid::new_v4(),
            settings,
            state: InteractionState::Idle,
            live: None,
            session: GestureSession::new(),
            epoch: 0,
            bus,
            analysis,
            capture,
            detector,
            compositor,
            narration,
            view,
            avatars,
            events_tx,
            events_rx,
        }
    }

    pub fn role(&self) -> ViewRole {
        self.role
    }

    /// Id stamped on every envelope this viewport publishes.
    pub fn origin(&self) -> Uuid {
        self.origin
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// The result currently rendered, if any.
    pub fn live(&self) -> Option<&GuestResult> {
        self.live.as_ref()
    }

    pub fn session(&self) -> &GestureSession {
        &self.session
    }

    pub fn compositor_running(&self) -> bool {
        self.compositor
            .as_ref()
            .is_some_and(ColorKeyCompositor::is_running)
    }

    pub fn is_narrating(&self) -> bool {
        self.narration.is_speaking()
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Show the idle view and start the mascot, if this role renders it.
    pub fn start(&mut self) {
        log::info!(
            "coordinator: {} viewport {} ready",
            self.role.label(),
            self.origin
        );
        self.view.show_capture();
        if let Some(compositor) = self.compositor.as_mut() {
            compositor.start();
        }
    }

    /// Run until `commands` is closed or the bus goes away.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        let mut inbound = self.bus.subscribe();
        let mut ticker = tokio::time::interval(self.settings.gesture_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let polling = self.polling_allowed();

        self.start();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                envelope = inbound.recv() => match envelope {
                    Ok(envelope) => self.handle_envelope(envelope).await,
                    Err(RecvError::Lagged(missed)) => {
                        log::warn!("coordinator: bus lagged, {missed} message(s) lost");
                    }
                    Err(RecvError::Closed) => {
                        log::error!("coordinator: bus closed");
                        break;
                    }
                },
                Some(event) = self.events_rx.recv() => self.handle_event(event).await,
                _ = ticker.tick(), if polling => {
                    if let Err(reason) = self.gesture_tick() {
                        log::trace!("gesture: tick skipped ({reason:?})");
                    }
                }
            }
        }

        log::info!("coordinator: shutting down");
        self.narration.cancel().await;
        if let Some(compositor) = self.compositor.as_mut() {
            compositor.stop().await;
        }
    }

    // -----------------------------------------------------------------------
    // Inputs
    // -----------------------------------------------------------------------

    pub async fn handle_command(&mut self, command: Command) {
        log::debug!("coordinator: command {command:?} in {}", self.state.label());
        match command {
            Command::Submit { name } => {
                if name.trim().is_empty() {
                    if self.role.owns_capture() && self.state == InteractionState::Idle {
                        self.view.alert(ALERT_EMPTY_NAME);
                    }
                    return;
                }
                self.submit(&name);
            }
            Command::Reset => {
                self.apply_reset().await;
                self.publish(OrchestrationMessage::Reset).await;
            }
            Command::ToggleNarration => self.toggle_narration().await,
        }
    }

    /// React to a message from another viewport.
    pub async fn handle_envelope(&mut self, envelope: Envelope) {
        if envelope.origin == self.origin || envelope.topic != self.bus.topic() {
            return;
        }
        match envelope.message {
            OrchestrationMessage::Result(result) => self.accept_remote_result(result).await,
            OrchestrationMessage::Reset => {
                log::debug!("coordinator: remote reset from {}", envelope.origin);
                self.apply_reset().await;
            }
        }
    }

    /// Wait for the next completion from a spawned task and apply it.
    pub async fn pump_event(&mut self) {
        if let Some(event) = self.events_rx.recv().await {
            self.handle_event(event).await;
        }
    }

    async fn handle_event(&mut self, event: Event) {
        match event {
            Event::Analysis { epoch, result } => self.finish_analysis(epoch, result).await,
            Event::GesturePolled { epoch, detected } => self.finish_poll(epoch, detected),
            Event::NarrationDue { epoch } => {
                if epoch == self.epoch && self.state == InteractionState::ShowingResult {
                    self.narrate().await;
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Submit
    // -----------------------------------------------------------------------

    fn submit(&mut self, name: &str) {
        if !self.role.owns_capture() {
            log::debug!("coordinator: submit ignored on {} viewport", self.role.label());
            return;
        }
        if self.state != InteractionState::Idle {
            log::debug!("coordinator: submit ignored while {}", self.state.label());
            return;
        }
        let Some(capture) = self.capture.as_ref() else {
            log::warn!("coordinator: submit without a capture source");
            self.view.alert(ALERT_CAPTURE);
            return;
        };

        self.state = InteractionState::AwaitingCapture;
        self.view.show_busy(true);

        let still = match capture.capture_frame(CapturePurpose::Submit) {
            Ok(still) => still,
            Err(e) => {
                log::warn!("coordinator: capture failed: {e}");
                self.view.show_busy(false);
                self.view.alert(ALERT_CAPTURE);
                self.state = InteractionState::Idle;
                self.session.rearm();
                return;
            }
        };

        self.state = InteractionState::Loading;
        log::info!(
            "coordinator: analysing {} byte photo for {name:?}",
            still.bytes().len()
        );

        let analysis = Arc::clone(&self.analysis);
        let events = self.events_tx.clone();
        let epoch = self.epoch;
        let name = name.trim().to_string();
        tokio::spawn(async move {
            let result = analysis.analyze(&still, &name).await;
            let _ = events.send(Event::Analysis { epoch, result });
        });
    }

    async fn finish_analysis(&mut self, epoch: u64, result: Result<GuestResult, AnalysisError>) {
        if epoch != self.epoch || self.state != InteractionState::Loading {
            log::debug!("coordinator: dropping stale analysis result");
            return;
        }
        self.view.show_busy(false);

        match result {
            Ok(result) => {
                self.session.reset();
                log::info!(
                    "coordinator: {} ({}, {})",
                    result.name,
                    result.gender.as_str(),
                    result.attire.as_str()
                );
                self.state = InteractionState::ShowingResult;
                self.publish(OrchestrationMessage::Result(result.clone()))
                    .await;
                self.present(result).await;
            }
            Err(e) => {
                log::warn!("coordinator: analysis failed: {e}");
                self.view.alert(alert_for(&e));
                self.state = InteractionState::Idle;
                self.session.rearm();
            }
        }
    }

    // -----------------------------------------------------------------------
    // Results
    // -----------------------------------------------------------------------

    async fn accept_remote_result(&mut self, result: GuestResult) {
        if !self.role.renders_results() {
            log::trace!("coordinator: {} viewport ignores results", self.role.label());
            return;
        }
        if self.state == InteractionState::ShowingResult && self.live.as_ref() == Some(&result) {
            log::debug!("coordinator: duplicate result for {}", result.name);
            return;
        }

        log::info!("coordinator: remote result for {}", result.name);
        self.epoch += 1;
        self.state = InteractionState::ShowingResult;
        self.view.show_busy(false);
        self.session.reset();
        self.present(result).await;
    }

    /// Render `result`, stop the mascot and schedule the narration.
    async fn present(&mut self, result: GuestResult) {
        if !self.role.renders_results() {
            return;
        }

        let avatar = self.avatars.resolve(&result.gender, &result.attire);
        self.view.show_result(&result.greeting(), &avatar);

        if let Some(compositor) = self.compositor.as_mut() {
            compositor.stop().await;
        }
        self.narration.cancel().await;
        self.live = Some(result);

        let events = self.events_tx.clone();
        let epoch = self.epoch;
        let delay = self.settings.narration_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(Event::NarrationDue { epoch });
        });
    }

    /// What the narration says for `result`.
    pub fn narration_text(&self, result: &GuestResult) -> String {
        match result.message.as_deref().map(str::trim) {
            Some(message) if !message.is_empty() => message.to_string(),
            _ => self
                .settings
                .narration_template
                .replace("{name}", &result.name),
        }
    }

    async fn narrate(&mut self) {
        let Some(result) = self.live.as_ref() else {
            return;
        };
        let text = self.narration_text(result);
        let gender = result.gender.clone();
        self.narration.speak(&text, &gender).await;
    }

    async fn toggle_narration(&mut self) {
        if self.state != InteractionState::ShowingResult || self.live.is_none() {
            log::debug!("coordinator: nothing to read");
            return;
        }
        if self.narration.is_speaking() {
            self.narration.cancel().await;
        } else {
            self.narrate().await;
        }
    }

    // -----------------------------------------------------------------------
    // Reset
    // -----------------------------------------------------------------------

    async fn apply_reset(&mut self) {
        self.epoch += 1;
        self.state = InteractionState::Idle;
        self.live = None;

        self.narration.cancel().await;
        self.view.show_busy(false);
        self.view.show_capture();
        if let Some(compositor) = self.compositor.as_mut() {
            compositor.start();
        }

        self.session.reset();
        if let Some(detector) = self.detector.as_ref() {
            let detector = Arc::clone(detector);
            tokio::spawn(async move {
                if let Err(e) = detector.reset().await {
                    log::debug!("gesture: wave reset failed: {e}");
                }
            });
        }
    }

    // -----------------------------------------------------------------------
    // Gesture polling
    // -----------------------------------------------------------------------

    fn polling_allowed(&self) -> bool {
        self.settings.gesture_enabled
            && self.role.owns_capture()
            && self.capture.is_some()
            && self.detector.is_some()
    }

    /// One gesture poll tick.  Returns why nothing was sent, if so.
    pub fn gesture_tick(&mut self) -> Result<(), SkipReason> {
        let ctx = PollContext {
            role_allows: self.polling_allowed(),
            idle: self.state == InteractionState::Idle,
            source_ready: self.capture.as_ref().is_some_and(CaptureService::is_ready),
        };
        self.session.check(ctx)?;

        let (Some(capture), Some(detector)) = (self.capture.as_ref(), self.detector.as_ref())
        else {
            return Err(SkipReason::RoleExcluded);
        };
        let still = capture.capture_frame(CapturePurpose::Poll).map_err(|e| {
            log::debug!("gesture: poll capture failed: {e}");
            SkipReason::SourceNotReady
        })?;

        self.session.begin_poll();

        let detector = Arc::clone(detector);
        let events = self.events_tx.clone();
        let epoch = self.epoch;
        tokio::spawn(async move {
            let detected = detector.detect(&still).await.unwrap_or(false);
            let _ = events.send(Event::GesturePolled { epoch, detected });
        });
        Ok(())
    }

    fn finish_poll(&mut self, epoch: u64, detected: bool) {
        if epoch != self.epoch {
            log::trace!("gesture: dropping stale poll result");
            return;
        }
        let idle = self.state == InteractionState::Idle;
        if self.session.finish_poll(detected, idle) {
            log::info!("gesture: wave detected, submitting");
            let name = self.settings.trigger_name.clone();
            self.submit(&name);
        }
    }

    // -----------------------------------------------------------------------
    // Bus
    // -----------------------------------------------------------------------

    async fn publish(&self, message: OrchestrationMessage) {
        let envelope = Envelope::new(self.bus.topic(), self.origin, message);
        if let Err(e) = self.bus.publish(&envelope).await {
            log::warn!("coordinator: broadcast failed: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Lead-capture dialog.
//!
//! The popup is an async state machine:
//!
//! ```text
//! Closed ──(auto-open timer)──▶ Open ──submit──▶ Submitting ──ok──▶ Submitted
//!    ▲                           │  ▲                 │                 │
//!    └────────── dismiss ────────┘  └──── failure ────┘   (auto-close)  │
//!    └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both timers are Tokio tasks racing a sleep against a teardown channel.
//! [`LeadDialog::unmount`] (or dropping the dialog) fires the channel, so a
//! timer never acts on a dialog that is gone.

use std::sync::Arc;
use std::time::Duration;

use kravy_core::enquiry::EnquiryRequest;
use tokio::sync::{RwLock, watch};
use tracing::{debug, warn};

use crate::phone::{INVALID_PHONE_MESSAGE, is_valid_mobile};
use crate::session::{DisplayPolicy, SessionMemory};
use crate::submitter::EnquirySubmitter;

/// Delay between mounting and the popup opening.
pub const AUTO_OPEN_DELAY: Duration = Duration::from_millis(1800);

/// Delay between a successful submission and the popup closing.
pub const AUTO_CLOSE_DELAY: Duration = Duration::from_millis(1400);

/// Origin tag sent with every popup submission.
pub const POPUP_SOURCE: &str = "popup";

/// Shown after the backend accepted the enquiry.
pub const SUCCESS_MESSAGE: &str = "Thanks! We’ll contact you shortly.";

/// Shown when a submission failed without a usable server message.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Failed to submit. Try again.";

/// Where the dialog is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogPhase {
    /// Not visible.
    Closed,
    /// Visible and accepting input.
    Open,
    /// A request is in flight; the submit control is disabled.
    Submitting,
    /// The backend accepted the enquiry; the dialog closes shortly.
    Submitted,
}

/// Snapshot of everything the dialog would render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogView {
    pub phase: DialogPhase,
    pub name: String,
    pub phone: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl DialogView {
    /// Whether the dialog is on screen.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.phase != DialogPhase::Closed
    }

    /// Whether the submit control accepts clicks.
    #[must_use]
    pub fn submit_enabled(&self) -> bool {
        self.phase != DialogPhase::Submitting
    }

    /// Label of the submit control.
    #[must_use]
    pub fn submit_label(&self) -> &'static str {
        if self.phase == DialogPhase::Submitting {
            "Submitting..."
        } else {
            "Get Callback"
        }
    }
}

/// Tunables for a [`LeadDialog`].
#[derive(Debug, Clone)]
pub struct DialogConfig {
    pub open_delay: Duration,
    pub close_delay: Duration,
    pub policy: DisplayPolicy,
    pub source: String,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            open_delay: AUTO_OPEN_DELAY,
            close_delay: AUTO_CLOSE_DELAY,
            policy: DisplayPolicy::default(),
            source: POPUP_SOURCE.to_owned(),
        }
    }
}

/// What a call to [`LeadDialog::submit`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The backend accepted the enquiry.
    Accepted,
    /// The phone guard failed; nothing was sent.
    Invalid,
    /// The request was sent and failed; the dialog stays open for a retry.
    Failed,
    /// Nothing happened: the dialog was not open, a request was already in
    /// flight, or the dialog was dismissed or unmounted before the reply.
    Ignored,
}

#[derive(Debug)]
struct DialogState {
    phase: DialogPhase,
    name: String,
    phone: String,
    error: Option<String>,
    success: Option<String>,
    /// Generated each time the dialog opens; reused by every retry from
    /// that opening.
    idempotency_key: Option<String>,
}

impl DialogState {
    fn new() -> Self {
        Self {
            phase: DialogPhase::Closed,
            name: String::new(),
            phone: String::new(),
            error: None,
            success: None,
            idempotency_key: None,
        }
    }

    fn open(&mut self) {
        self.phase = DialogPhase::Open;
        self.error = None;
        self.success = None;
        self.idempotency_key = Some(uuid::Uuid::new_v4().to_string());
    }

    fn view(&self) -> DialogView {
        DialogView {
            phase: self.phase,
            name: self.name.clone(),
            phone: self.phone.clone(),
            error: self.error.clone(),
            success: self.success.clone(),
        }
    }
}

/// The lead-capture popup.
///
/// Must be mounted inside a Tokio runtime; timers are spawned tasks.
pub struct LeadDialog {
    state: Arc<RwLock<DialogState>>,
    submitter: Arc<dyn EnquirySubmitter>,
    config: DialogConfig,
    teardown: watch::Sender<bool>,
}

impl std::fmt::Debug for LeadDialog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeadDialog")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LeadDialog {
    /// Mount a dialog and, if the display policy allows, schedule its
    /// auto-open.
    #[must_use]
    pub fn mount(
        submitter: Arc<dyn EnquirySubmitter>,
        config: DialogConfig,
        session: Arc<dyn SessionMemory>,
    ) -> Self {
        let (teardown, _) = watch::channel(false);
        let dialog = Self {
            state: Arc::new(RwLock::new(DialogState::new())),
            submitter,
            config,
            teardown,
        };

        if dialog.config.policy.should_show(session.as_ref()) {
            dialog.schedule_open(session);
        } else {
            debug!(policy = %dialog.config.policy, "popup already shown this session");
        }

        dialog
    }

    /// Current render state.
    pub async fn view(&self) -> DialogView {
        self.state.read().await.view()
    }

    /// Whether [`unmount`](Self::unmount) has not been called yet.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        !*self.teardown.borrow()
    }

    /// Update the name input.
    pub async fn set_name(&self, name: impl Into<String>) {
        self.state.write().await.name = name.into();
    }

    /// Update the phone input.
    pub async fn set_phone(&self, phone: impl Into<String>) {
        self.state.write().await.phone = phone.into();
    }

    /// Close the dialog without submitting (backdrop click or close control).
    pub async fn dismiss(&self) {
        let mut state = self.state.write().await;
        if state.phase != DialogPhase::Closed {
            debug!(phase = ?state.phase, "popup dismissed");
            state.phase = DialogPhase::Closed;
        }
    }

    /// Submit the form.
    ///
    /// Only acts while the dialog is [`DialogPhase::Open`]. Runs the phone
    /// guard, then sends one request and waits for the reply.
    pub async fn submit(&self) -> SubmitOutcome {
        if !self.is_mounted() {
            return SubmitOutcome::Ignored;
        }

        let request = {
            let mut state = self.state.write().await;
            if state.phase != DialogPhase::Open {
                return SubmitOutcome::Ignored;
            }
            state.error = None;
            state.success = None;

            if !is_valid_mobile(&state.phone) {
                state.error = Some(INVALID_PHONE_MESSAGE.to_owned());
                return SubmitOutcome::Invalid;
            }

            state.phase = DialogPhase::Submitting;
            EnquiryRequest {
                name: Some(state.name.clone()),
                phone: Some(state.phone.clone()),
                source: Some(self.config.source.clone()),
                idempotency_key: state.idempotency_key.clone(),
                ..Default::default()
            }
        };

        let result = self.submitter.submit(&request).await;

        let mut state = self.state.write().await;
        if state.phase != DialogPhase::Submitting || !self.is_mounted() {
            debug!("reply arrived after the popup went away, discarding");
            return SubmitOutcome::Ignored;
        }

        match result {
            Ok(_) => {
                state.phase = DialogPhase::Submitted;
                state.success = Some(SUCCESS_MESSAGE.to_owned());
                drop(state);
                self.schedule_close();
                SubmitOutcome::Accepted
            }
            Err(err) => {
                warn!(error = %err, "enquiry submission failed");
                state.phase = DialogPhase::Open;
                state.error = Some(
                    err.server_message()
                        .unwrap_or(DEFAULT_FAILURE_MESSAGE)
                        .to_owned(),
                );
                SubmitOutcome::Failed
            }
        }
    }

    /// Tear the dialog down. Pending timers never fire afterwards.
    pub fn unmount(&self) {
        self.teardown.send_replace(true);
    }

    fn schedule_open(&self, session: Arc<dyn SessionMemory>) {
        let state = Arc::clone(&self.state);
        let mut teardown = self.teardown.subscribe();
        let delay = self.config.open_delay;

        tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(delay) => {
                    if *teardown.borrow() {
                        return;
                    }
                    let mut state = state.write().await;
                    if state.phase == DialogPhase::Closed {
                        state.open();
                        session.mark_popup_seen();
                        debug!("popup opened");
                    }
                }
                _ = teardown.changed() => {}
            }
        });
    }

    fn schedule_close(&self) {
        let state = Arc::clone(&self.state);
        let mut teardown = self.teardown.subscribe();
        let delay = self.config.close_delay;

        tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(delay) => {
                    if *teardown.borrow() {
                        return;
                    }
                    let mut state = state.write().await;
                    if state.phase == DialogPhase::Submitted {
                        state.phase = DialogPhase::Closed;
                    }
                }
                _ = teardown.changed() => {}
            }
        });
    }
}

impl Drop for LeadDialog {
    fn drop(&mut self) {
        self.unmount();
    }
}

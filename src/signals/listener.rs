//! # Signal listener: interrupt → (confirm) → shutdown.
//!
//! ```text
//! loop {
//!   ├─► bridge.wait()  (or token cancelled → Err(Canceled))
//!   ├─► bridge.clear()
//!   └─► match mode
//!         ├─ Immediate ─────────────► fire()
//!         └─ Confirm / ConfirmOrForceOnRepeat:
//!              spawn_blocking(prompt.confirm) and race it against:
//!                ├─ answer Yes ─────────► fire()
//!                ├─ answer No ──────────► log, resume
//!                ├─ channel closed ─────► ForceOnRepeat: fire() | Confirm: log, resume
//!                ├─ repeated interrupt ─► ForceOnRepeat: fire() | Confirm: log, keep waiting
//!                └─ token cancelled ────► Err(Canceled)
//! }
//! ```
//!
//! `fire()` runs the shutdown callback behind an `armed` flag: a call that
//! arrives while the callback is still running is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{PromptError, TaskError};
use crate::signals::{Confirmation, ConfirmPrompt, ShutdownBridge, ShutdownMode};

/// Question shown to the operator.
pub const CONFIRM_QUESTION: &str =
    "Ctrl-C! Confirm to end all missions and shut down mission control? Y/N:";

/// Turns interrupts observed on a [`ShutdownBridge`] into shutdown requests.
pub struct SignalBridge {
    bridge: ShutdownBridge,
    mode: ShutdownMode,
    prompt: Arc<dyn ConfirmPrompt>,
    on_shutdown: Arc<dyn Fn() + Send + Sync>,
    armed: AtomicBool,
}

impl SignalBridge {
    /// Creates a listener; `on_shutdown` is invoked for every accepted shutdown request.
    pub fn new(
        bridge: ShutdownBridge,
        mode: ShutdownMode,
        prompt: Arc<dyn ConfirmPrompt>,
        on_shutdown: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            bridge,
            mode,
            prompt,
            on_shutdown: Arc::new(on_shutdown),
            armed: AtomicBool::new(true),
        }
    }

    /// Active shutdown mode.
    pub fn mode(&self) -> ShutdownMode {
        self.mode
    }

    /// Handles interrupts until `token` is cancelled.
    ///
    /// Never returns `Ok`; cancellation yields `Err(TaskError::Canceled)`.
    pub async fn listen(&self, token: CancellationToken) -> Result<(), TaskError> {
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("signal listener cancelled");
                    return Err(TaskError::Canceled);
                }
                _ = self.bridge.wait() => {}
            }
            self.bridge.clear();
            info!(mode = %self.mode, "interrupt received");

            if self.mode.asks() {
                self.confirm(&token).await?;
            } else {
                self.fire();
            }
        }
    }

    async fn confirm(&self, token: &CancellationToken) -> Result<(), TaskError> {
        let prompt = Arc::clone(&self.prompt);
        let mut answer = tokio::task::spawn_blocking(move || prompt.confirm(CONFIRM_QUESTION));

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("signal listener cancelled while awaiting confirmation");
                    return Err(TaskError::Canceled);
                }
                res = &mut answer => {
                    match res {
                        Ok(res) => self.on_answer(res),
                        Err(join) => error!(error = %join, "confirmation prompt panicked"),
                    }
                    return Ok(());
                }
                _ = self.bridge.wait() => {
                    self.bridge.clear();
                    if self.mode == ShutdownMode::ConfirmOrForceOnRepeat {
                        warn!("interrupt repeated while confirmation pending, forcing shutdown");
                        self.fire();
                        return Ok(());
                    }
                    error!("response required, none was given");
                }
            }
        }
    }

    fn on_answer(&self, res: Result<Confirmation, PromptError>) {
        match res {
            Ok(Confirmation::Yes) => {
                info!("shutdown confirmed");
                self.fire();
            }
            Ok(Confirmation::No) => info!("shutdown declined"),
            Err(PromptError::Closed) if self.mode == ShutdownMode::ConfirmOrForceOnRepeat => {
                warn!("confirmation channel closed, forcing shutdown");
                self.fire();
            }
            Err(PromptError::Closed) => error!("response required, none was given"),
            Err(e) => error!(error = %e, "confirmation failed, shutdown declined"),
        }
    }

    fn fire(&self) {
        if self
            .armed
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("shutdown callback already running");
            return;
        }
        (self.on_shutdown)();
        self.armed.store(true, Ordering::SeqCst);
    }
}

//! Update scheduler
//!
//! The UpdateScheduler is responsible for:
//! - Validating settings before the first update
//! - Forcing reconfiguration while settings are blank or rejected
//! - Sending one update per interval once a first update succeeded
//! - Stopping as soon as cancellation is requested
//!
//! ## State Machine
//!
//! ```text
//!                 invalid / update failed
//!              ┌──────────────────────────┐
//!              ▼                          │
//! ┌──────────────────────┐   first   ┌─────────┐   interval elapsed
//! │ Unconfigured /       │  success  │ Active  │──── update, re-arm ───┐
//! │ NeedsReconfiguration │──────────▶│         │◀──────────────────────┘
//! └──────────────────────┘           └─────────┘
//!              │                          │
//!              └──────── cancelled ───────┴──────▶ Terminated
//! ```
//!
//! ## Failure Handling
//!
//! Transport and provider errors never stop the loop. Before activation they
//! are shown in a blocking dialog and the user is sent back to the settings;
//! once active they only surface through the optional notification and the
//! interval is left unchanged.

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::classifier::{OutcomeCode, UpdateOutcome, classify};
use crate::config::{self, Configuration, SchedulerConfig};
use crate::error::Result;
use crate::traits::{
    AbortWaiter, Dialog, Notification, SettingsSource, Severity, UpdateTransport, UserInterface,
};

/// Events emitted by the UpdateScheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// Scheduler started
    Started,

    /// Hostname, username or password missing
    Unconfigured,

    /// One update request completed (or failed to complete)
    UpdateAttempted {
        code: OutcomeCode,
        succeeded: bool,
    },

    /// First update succeeded, periodic updates armed
    Activated {
        interval_secs: u64,
        next_update_at: Option<DateTime<Utc>>,
    },

    /// Update failed before activation, user sent to the settings
    ReconfigurationRequired {
        code: OutcomeCode,
        reason: String,
    },

    /// Scheduler stopped
    Stopped {
        reason: String,
    },
}

/// Where the scheduler is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleState {
    /// Settings incomplete (initial state)
    Unconfigured,

    /// Settings complete but the last update was rejected
    NeedsReconfiguration,

    /// Periodic updates with the configuration captured at activation
    Active {
        interval_secs: u64,
        config: Configuration,
    },

    /// Cancellation observed, loop finished
    Terminated,
}

impl ScheduleState {
    /// The -1 / 0 / >0 period encoding; `None` once terminated
    pub fn next_interval_seconds(&self) -> Option<i64> {
        match self {
            ScheduleState::Unconfigured => Some(-1),
            ScheduleState::NeedsReconfiguration => Some(0),
            ScheduleState::Active { interval_secs, .. } => {
                Some(i64::try_from(*interval_secs).unwrap_or(i64::MAX))
            }
            ScheduleState::Terminated => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ScheduleState::Active { .. })
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, ScheduleState::Terminated)
    }
}

/// Periodic No-IP update loop
///
/// Owns the [`ScheduleState`] and drives it through [`UpdateScheduler::step`].
/// All host interaction goes through the injected collaborators.
///
/// ## Lifecycle
///
/// 1. Create with [`UpdateScheduler::new()`]
/// 2. Start with [`UpdateScheduler::run()`]
/// 3. Runs until the [`AbortWaiter`] reports cancellation
///
/// ## Threading
///
/// One sequential loop on a single task. The only suspension points are the
/// collaborator calls; nothing is shared across tasks.
pub struct UpdateScheduler {
    /// Host settings storage
    settings: Box<dyn SettingsSource>,

    /// Dialogs, configuration UI and notifications
    ui: Box<dyn UserInterface>,

    /// Provider update client
    transport: Box<dyn UpdateTransport>,

    /// Interruptible wait
    waiter: Box<dyn AbortWaiter>,

    /// User-Agent sent with every update
    user_agent: String,

    /// Dialog and notification title
    client_name: String,

    /// Pause after the configuration UI returns
    reconfigure_delay_secs: u64,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<SchedulerEvent>,
}

impl UpdateScheduler {
    /// Create a new scheduler
    ///
    /// # Returns
    ///
    /// A tuple of (scheduler, event_receiver) where event_receiver yields scheduler events
    pub fn new(
        settings: Box<dyn SettingsSource>,
        ui: Box<dyn UserInterface>,
        transport: Box<dyn UpdateTransport>,
        waiter: Box<dyn AbortWaiter>,
        config: SchedulerConfig,
    ) -> Result<(Self, mpsc::Receiver<SchedulerEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let scheduler = Self {
            settings,
            ui,
            transport,
            waiter,
            user_agent: config.user_agent,
            client_name: config.client_name,
            reconfigure_delay_secs: config.reconfigure_delay_secs,
            event_tx: tx,
        };

        Ok((scheduler, rx))
    }

    /// Run the scheduler
    ///
    /// Starts in [`ScheduleState::Unconfigured`] and steps until terminated.
    pub async fn run(&self) -> Result<()> {
        self.emit_event(SchedulerEvent::Started);
        info!(
            "Update scheduler started (provider: {})",
            self.transport.provider_name()
        );

        let mut state = ScheduleState::Unconfigured;
        while !state.is_terminated() {
            state = self.step(state).await;
            debug!("period: {:?}", state.next_interval_seconds());
        }

        info!("Shutdown requested, update scheduler stopped");
        self.emit_event(SchedulerEvent::Stopped {
            reason: "Shutdown signal".to_string(),
        });
        Ok(())
    }

    /// Advance the state machine by one transition
    pub async fn step(&self, state: ScheduleState) -> ScheduleState {
        match state {
            ScheduleState::Unconfigured | ScheduleState::NeedsReconfiguration => {
                self.validate_and_activate().await
            }
            ScheduleState::Active {
                interval_secs,
                config,
            } => self.periodic_update(interval_secs, config).await,
            ScheduleState::Terminated => ScheduleState::Terminated,
        }
    }

    /// Read and validate settings, then try the first update
    async fn validate_and_activate(&self) -> ScheduleState {
        let config = match self.settings.get_settings().await {
            Ok(raw) => config::validate(&raw).into_valid(),
            Err(e) => {
                error!("Failed to read settings: {}", e);
                None
            }
        };

        let Some(config) = config else {
            warn!("Hostname, username or password not configured");
            self.emit_event(SchedulerEvent::Unconfigured);
            self.show_dialog(Dialog::new(
                &self.client_name,
                "Configuration required",
                "Hostname, username and password must be set.",
                "Opening the settings now.",
            ))
            .await;
            return self.reconfigure(ScheduleState::Unconfigured).await;
        };

        let outcome = self.attempt_update(&config).await;
        if outcome.succeeded {
            let interval_secs = config.interval_secs();
            let next_update_at = next_update_at(interval_secs);
            info!(
                "Update for {} succeeded, next update in {}s",
                config.hostname, interval_secs
            );
            self.emit_event(SchedulerEvent::Activated {
                interval_secs,
                next_update_at,
            });
            return ScheduleState::Active {
                interval_secs,
                config,
            };
        }

        self.emit_event(SchedulerEvent::ReconfigurationRequired {
            code: outcome.code,
            reason: outcome.reason.clone(),
        });
        self.show_dialog(Dialog::new(
            &self.client_name,
            "Update failed",
            outcome.display_message(),
            "Please check your settings.",
        ))
        .await;
        self.reconfigure(ScheduleState::NeedsReconfiguration).await
    }

    /// Open the configuration UI, then pause before re-validating
    async fn reconfigure(&self, next: ScheduleState) -> ScheduleState {
        if let Err(e) = self.ui.open_configuration_ui().await {
            warn!("Failed to open configuration UI: {}", e);
        }

        if self.waiter.wait_or_abort(self.reconfigure_delay_secs).await {
            return ScheduleState::Terminated;
        }
        next
    }

    /// Wait one interval, then update and re-arm the same interval
    async fn periodic_update(&self, interval_secs: u64, config: Configuration) -> ScheduleState {
        if self.waiter.wait_or_abort(interval_secs).await {
            return ScheduleState::Terminated;
        }

        let outcome = self.attempt_update(&config).await;

        let show_notifications = match self.settings.get_settings().await {
            Ok(raw) => raw.shownotif,
            Err(e) => {
                warn!("Failed to read settings, keeping notification preference: {}", e);
                config.show_notifications
            }
        };

        if show_notifications {
            let severity = if outcome.succeeded {
                Severity::Info
            } else {
                Severity::Error
            };
            let message = if outcome.raw_response.is_empty() {
                outcome.reason.as_str()
            } else {
                outcome.raw_response.trim()
            };
            let notification = Notification::new(&self.client_name, message, severity);
            if let Err(e) = self.ui.show_notification(notification).await {
                warn!("Failed to show notification: {}", e);
            }
        }

        if let Some(at) = next_update_at(interval_secs) {
            debug!("Next update at {}", at.to_rfc3339());
        }

        ScheduleState::Active {
            interval_secs,
            config,
        }
    }

    /// Perform one update request and classify the result
    async fn attempt_update(&self, config: &Configuration) -> UpdateOutcome {
        debug!(
            "Calling update API ({}) for {}",
            self.transport.provider_name(),
            config.hostname
        );

        let outcome = match self
            .transport
            .perform_update(config, &self.user_agent)
            .await
        {
            Ok(body) => classify(&body),
            Err(e) => UpdateOutcome::transport_failure(e.reason),
        };

        if outcome.succeeded {
            debug!("response: {}", outcome.raw_response.trim());
        } else {
            error!(
                "Update failed ({}): response: {:?}, reason: {}",
                outcome.code,
                outcome.raw_response.trim(),
                outcome.reason
            );
        }
        debug!("reason: {}", outcome.reason);

        self.emit_event(SchedulerEvent::UpdateAttempted {
            code: outcome.code,
            succeeded: outcome.succeeded,
        });
        outcome
    }

    async fn show_dialog(&self, dialog: Dialog) {
        if let Err(e) = self.ui.show_blocking_dialog(dialog).await {
            warn!("Failed to show dialog: {}", e);
        }
    }

    /// Emit a scheduler event
    fn emit_event(&self, event: SchedulerEvent) {
        // Never block the loop on a slow observer
        if let Err(mpsc::error::TrySendError::Full(_)) = self.event_tx.try_send(event) {
            warn!("Event channel full, dropping event");
        }
    }
}

fn next_update_at(interval_secs: u64) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(interval_secs).ok()?;
    Utc::now().checked_add_signed(TimeDelta::try_seconds(secs)?)
}

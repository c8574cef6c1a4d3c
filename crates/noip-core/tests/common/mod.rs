//! Test doubles and common utilities for scheduler contract tests
//!
//! Every double is a cheap clonable handle: the test keeps one clone for
//! assertions and boxes another into the scheduler.

#![allow(dead_code)]

use noip_core::config::{Configuration, RawSettings, SchedulerConfig};
use noip_core::error::{Result, TransportError};
use noip_core::settings::MemorySettings;
use noip_core::traits::{
    AbortWaiter, Dialog, Notification, SettingsSource, UpdateTransport, UserInterface,
};
use noip_core::{SchedulerEvent, UpdateScheduler};
use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

pub const HOST: &str = "home.ddns.net";
pub const USERNAME: &str = "alice@example.com";
pub const PASSWORD: &str = "hunter2-very-secret";
pub const USER_AGENT: &str = "noipd-test/0.1 ops@example.com";

/// Complete settings with the given interval
pub fn valid_settings(interval_hours: u32) -> RawSettings {
    RawSettings::new(HOST, USERNAME, PASSWORD)
        .with_interval(NonZeroU32::new(interval_hours).expect("non-zero interval"))
}

/// Scheduler config with no pause after reconfiguration
pub fn test_config() -> SchedulerConfig {
    SchedulerConfig::new(USER_AGENT)
        .with_client_name("Test Updater")
        .with_reconfigure_delay_secs(0)
}

/// A transport that replays scripted responses
///
/// Once the script is exhausted the last response repeats.
#[derive(Clone)]
pub struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<std::result::Result<String, TransportError>>>>,
    last: Arc<Mutex<std::result::Result<String, TransportError>>>,
    calls: Arc<AtomicUsize>,
    user_agents: Arc<Mutex<Vec<String>>>,
    hostnames: Arc<Mutex<Vec<String>>>,
}

impl ScriptedTransport {
    pub fn new(
        script: impl IntoIterator<Item = std::result::Result<String, TransportError>>,
    ) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            last: Arc::new(Mutex::new(Err(TransportError::new("no scripted response")))),
            calls: Arc::new(AtomicUsize::new(0)),
            user_agents: Arc::new(Mutex::new(Vec::new())),
            hostnames: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always answer with `body`
    pub fn always(body: &str) -> Self {
        Self::new([Ok(body.to_string())])
    }

    /// Get the number of times perform_update() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn user_agents(&self) -> Vec<String> {
        self.user_agents.lock().unwrap().clone()
    }

    pub fn hostnames(&self) -> Vec<String> {
        self.hostnames.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl UpdateTransport for ScriptedTransport {
    async fn perform_update(
        &self,
        config: &Configuration,
        user_agent: &str,
    ) -> std::result::Result<String, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.user_agents.lock().unwrap().push(user_agent.to_string());
        self.hostnames.lock().unwrap().push(config.hostname.clone());

        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            *last = next;
        }
        last.clone()
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// A user interface that records every call
///
/// Optionally replaces the settings when the configuration UI is opened,
/// simulating a user fixing their account details.
#[derive(Clone, Default)]
pub struct RecordingUi {
    config_ui_opens: Arc<AtomicUsize>,
    dialogs: Arc<Mutex<Vec<Dialog>>>,
    notifications: Arc<Mutex<Vec<Notification>>>,
    fix: Option<(MemorySettings, RawSettings)>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `fixed` into `settings` when the configuration UI opens
    pub fn fixing(settings: MemorySettings, fixed: RawSettings) -> Self {
        Self {
            fix: Some((settings, fixed)),
            ..Self::default()
        }
    }

    pub fn config_ui_opens(&self) -> usize {
        self.config_ui_opens.load(Ordering::SeqCst)
    }

    pub fn dialogs(&self) -> Vec<Dialog> {
        self.dialogs.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl UserInterface for RecordingUi {
    async fn open_configuration_ui(&self) -> Result<()> {
        self.config_ui_opens.fetch_add(1, Ordering::SeqCst);
        if let Some((settings, fixed)) = &self.fix {
            settings.set(fixed.clone()).await;
        }
        Ok(())
    }

    async fn show_blocking_dialog(&self, dialog: Dialog) -> Result<()> {
        self.dialogs.lock().unwrap().push(dialog);
        Ok(())
    }

    async fn show_notification(&self, notification: Notification) -> Result<()> {
        self.notifications.lock().unwrap().push(notification);
        Ok(())
    }
}

/// A user interface whose every call fails, e.g. no display attached
#[derive(Clone, Default)]
pub struct FailingUi {
    calls: Arc<AtomicUsize>,
}

impl FailingUi {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(noip_core::Error::ui("no display available"))
    }
}

#[async_trait::async_trait]
impl UserInterface for FailingUi {
    async fn open_configuration_ui(&self) -> Result<()> {
        self.fail()
    }

    async fn show_blocking_dialog(&self, _dialog: Dialog) -> Result<()> {
        self.fail()
    }

    async fn show_notification(&self, _notification: Notification) -> Result<()> {
        self.fail()
    }
}

/// A waiter that returns scripted results without sleeping
///
/// Reports "aborted" once the script is exhausted so every run terminates.
#[derive(Clone)]
pub struct ScriptedWaiter {
    script: Arc<Mutex<VecDeque<bool>>>,
    requested: Arc<Mutex<Vec<u64>>>,
}

impl ScriptedWaiter {
    /// `completed_waits` waits elapse normally, the next one is aborted
    pub fn aborting_after(completed_waits: usize) -> Self {
        Self {
            script: Arc::new(Mutex::new(vec![false; completed_waits].into())),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Durations requested so far, in call order
    pub fn requested(&self) -> Vec<u64> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AbortWaiter for ScriptedWaiter {
    async fn wait_or_abort(&self, seconds: u64) -> bool {
        self.requested.lock().unwrap().push(seconds);
        self.script.lock().unwrap().pop_front().unwrap_or(true)
    }
}

/// A settings source that always fails
pub struct BrokenSettings;

#[async_trait::async_trait]
impl SettingsSource for BrokenSettings {
    async fn get_settings(&self) -> Result<RawSettings> {
        Err(noip_core::Error::settings("settings store unavailable"))
    }
}

/// Build a scheduler from test doubles
pub fn scheduler(
    settings: impl SettingsSource + 'static,
    ui: &RecordingUi,
    transport: &ScriptedTransport,
    waiter: impl AbortWaiter + 'static,
) -> (UpdateScheduler, mpsc::Receiver<SchedulerEvent>) {
    UpdateScheduler::new(
        Box::new(settings),
        Box::new(ui.clone()),
        Box::new(transport.clone()),
        Box::new(waiter),
        test_config(),
    )
    .expect("scheduler construction succeeds")
}

/// Drain all events currently buffered
pub fn drain(rx: &mut mpsc::Receiver<SchedulerEvent>) -> Vec<SchedulerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

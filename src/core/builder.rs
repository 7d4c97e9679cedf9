use std::sync::Arc;

use crate::{
    config::Config,
    connect::Connector,
    error::ConfigError,
    observers::{Observer, ObserverSet},
    signals::{ConfirmPrompt, ShutdownBridge, StdinPrompt},
};
use super::supervisor::Supervisor;

/// Builder for constructing a Supervisor with its collaborators.
pub struct SupervisorBuilder {
    cfg: Config,
    connector: Option<Arc<dyn Connector>>,
    bridge: Option<ShutdownBridge>,
    prompt: Option<Arc<dyn ConfirmPrompt>>,
    observers: ObserverSet,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            connector: None,
            bridge: None,
            prompt: None,
            observers: ObserverSet::default(),
        }
    }

    /// Sets the blocking connector used for both the primary and the heartbeat connection. Required.
    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Sets the interrupt bridge.
    ///
    /// Defaults to a fresh [`ShutdownBridge::new`] that nothing outside the
    /// supervisor can set; pass [`ShutdownBridge::install_os_handler`] to react to Ctrl-C.
    pub fn bridge(mut self, bridge: ShutdownBridge) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Sets the confirmation prompt (defaults to [`StdinPrompt`]).
    pub fn prompt(mut self, prompt: Arc<dyn ConfirmPrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Adds a scheduling observer. Observers are called in registration order.
    pub fn observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Builds and returns the Supervisor instance.
    ///
    /// Fails with [`ConfigError::MissingConnector`] when no connector was set.
    pub fn build(self) -> Result<Arc<Supervisor>, ConfigError> {
        let connector = self.connector.ok_or(ConfigError::MissingConnector)?;
        let bridge = self.bridge.unwrap_or_default();
        let prompt = self
            .prompt
            .unwrap_or_else(|| Arc::new(StdinPrompt) as Arc<dyn ConfirmPrompt>);

        Ok(Arc::new(Supervisor::new_internal(
            self.cfg,
            connector,
            bridge,
            prompt,
            Arc::new(self.observers),
        )))
    }
}

use std::sync::Arc;

use nova_database::{BackendClient, Database};
use nova_gate::{CommandDispatchGate, ConfigCache, CooldownTracker};

pub type Error = anyhow::Error;

/// Shared state handed to every command and event handler.
#[derive(Clone, Debug)]
pub struct Data {
    pub db: Database,
    /// Dashboard backend, when guild configs are served over HTTP instead of
    /// read from Postgres.
    pub backend: Option<BackendClient>,
    pub gate: Arc<CommandDispatchGate>,
    /// Delete a guild's stored config when the bot leaves it.
    pub delete_config_on_leave: bool,
}

impl Data {
    pub fn new(db: Database, backend: Option<BackendClient>, configs: Arc<ConfigCache>) -> Self {
        let gate = CommandDispatchGate::new(configs, Arc::new(CooldownTracker::new()));
        Self {
            db,
            backend,
            gate: Arc::new(gate),
            delete_config_on_leave: false,
        }
    }

    pub fn with_delete_config_on_leave(mut self, enabled: bool) -> Self {
        self.delete_config_on_leave = enabled;
        self
    }

    pub fn configs(&self) -> &ConfigCache {
        self.gate.configs()
    }
}

pub type Context<'a> = poise::Context<'a, Data, Error>;

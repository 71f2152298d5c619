//! Application state for the workshop engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::payroll::{InMemoryPayPeriodStore, PayrollService};

/// Shared application state.
///
/// Holds the loaded configuration and the payroll service with its
/// pay period store.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    payroll: Arc<PayrollService<InMemoryPayPeriodStore>>,
}

impl AppState {
    /// Creates a new application state backed by an empty in-memory store.
    pub fn new(config: ConfigLoader) -> Self {
        Self::with_store(config, InMemoryPayPeriodStore::new())
    }

    /// Creates a new application state over an existing store.
    pub fn with_store(config: ConfigLoader, store: InMemoryPayPeriodStore) -> Self {
        let payroll = PayrollService::new(store, config.policy().clone());
        Self {
            config: Arc::new(config),
            payroll: Arc::new(payroll),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the payroll service.
    pub fn payroll(&self) -> &PayrollService<InMemoryPayPeriodStore> {
        &self.payroll
    }
}

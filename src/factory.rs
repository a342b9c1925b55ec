// ABOUTME: Connection factory: provider name -> backend profile -> registered native connector
// ABOUTME: Deliberately thin; no connection-string parsing, no pooling policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Connection Factory
//!
//! The only backend bootstrapping this crate does: resolve a provider name,
//! look up the registered [`NativeConnector`] for it, and hand back an open
//! [`Access`]. Driver integrations register themselves here once at startup;
//! tests register scripted fakes the same way.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::access::Access;
use crate::backends::BackendProfile;
use crate::errors::{AccessError, AccessResult};
use crate::native::NativeConnector;
use crate::types::Provider;

/// Registry of native connectors, one per provider.
#[derive(Default)]
pub struct AccessFactory {
    connectors: HashMap<Provider, Box<dyn NativeConnector>>,
}

impl AccessFactory {
    /// An empty factory with no connectors registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the native connector for a provider, replacing any previous
    /// registration.
    pub fn register(&mut self, provider: Provider, connector: Box<dyn NativeConnector>) {
        debug!(provider = provider.name(), "connector registered");
        self.connectors.insert(provider, connector);
    }

    /// Open a connection for a provider name.
    ///
    /// The name is resolved case-insensitively; the connection string is
    /// passed to the native connector verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the provider name is not recognized
    /// - no connector is registered for the provider
    /// - the native connect fails
    pub fn open(&self, provider_name: &str, connection_string: &str) -> AccessResult<Access> {
        let provider =
            Provider::from_name(provider_name).ok_or_else(|| AccessError::UnsupportedProvider {
                name: provider_name.to_owned(),
            })?;
        let connector = self
            .connectors
            .get(&provider)
            .ok_or(AccessError::ConnectorNotRegistered { provider })?;
        info!(provider = provider.name(), "opening connection");
        Access::open(
            BackendProfile::for_provider(provider),
            connector.as_ref(),
            connection_string,
        )
    }
}

//! Credential availability: where the API key comes from, and the gate that
//! keeps generation closed until a usable key is confirmed.

use log::{info, warn};
use std::sync::{Arc, RwLock};

/// Environment variables consulted, in order, when no key is configured
pub const CREDENTIAL_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Shared source of the API key, read at call time
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    selected: Arc<RwLock<Option<String>>>,
    configured: Option<String>,
}

impl CredentialStore {
    /// Create a store seeded with the key from configuration, if any
    pub fn new(configured: Option<String>) -> Self {
        Self {
            selected: Arc::new(RwLock::new(None)),
            configured: non_empty(configured),
        }
    }

    /// Resolve the key: runtime selection, then configuration, then environment
    pub fn current(&self) -> Option<String> {
        self.selected_key()
            .or_else(|| self.configured.clone())
            .or_else(|| {
                CREDENTIAL_ENV_VARS
                    .iter()
                    .find_map(|var| non_empty(std::env::var(var).ok()))
            })
    }

    fn selected_key(&self) -> Option<String> {
        self.selected.read().ok().and_then(|guard| guard.clone())
    }

    /// Store a key chosen at runtime; blank keys clear the selection
    pub fn select(&self, key: &str) {
        if let Ok(mut guard) = self.selected.write() {
            *guard = non_empty(Some(key.to_string()));
        }
    }

    /// Forget the runtime selection
    pub fn forget(&self) {
        if let Ok(mut guard) = self.selected.write() {
            *guard = None;
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    /// Not checked yet
    Unchecked,
    /// No key could be found
    Missing,
    /// A key is available
    Available,
    /// A key was found but the API refused it; a new one must be selected
    Rejected,
}

/// Guard that blocks generation until a usable key is confirmed
#[derive(Debug, Clone)]
pub struct CredentialGate {
    enabled: bool,
    store: CredentialStore,
    status: CredentialStatus,
}

impl CredentialGate {
    pub fn new(enabled: bool, store: CredentialStore) -> Self {
        Self {
            enabled,
            store,
            status: CredentialStatus::Unchecked,
        }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn status(&self) -> CredentialStatus {
        self.status
    }

    /// Whether generation calls may be issued
    pub fn is_open(&self) -> bool {
        !self.enabled || self.status == CredentialStatus::Available
    }

    /// Look for a key; a rejected key stays rejected until a new one is selected
    pub fn check(&mut self) -> CredentialStatus {
        if self.status == CredentialStatus::Rejected {
            return self.status;
        }
        self.status = if self.store.current().is_some() {
            CredentialStatus::Available
        } else {
            CredentialStatus::Missing
        };
        info!("Credential check: {:?}", self.status);
        self.status
    }

    /// Accept a key from the selection affordance and re-check.
    ///
    /// A blank key is not a selection: the status is left as it was.
    pub fn select(&mut self, key: &str) -> CredentialStatus {
        if key.trim().is_empty() {
            warn!("Ignoring blank API key selection");
            return self.status;
        }
        self.store.select(key);
        self.status = CredentialStatus::Unchecked;
        self.check()
    }

    /// Re-engage the gate after the API refused the key
    pub fn reject(&mut self) {
        warn!("API rejected the credential; selection required");
        self.store.forget();
        if self.enabled {
            self.status = CredentialStatus::Rejected;
        }
    }
}

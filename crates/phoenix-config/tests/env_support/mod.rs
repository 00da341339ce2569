//! Serialised access to the process environment for integration tests.

use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use phoenix_config::{PARAMETERS, RESOURCE_INSTANCE_ENV};

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Holds the environment lock and restores every touched variable on drop.
///
/// Every `OCF_RESKEY_*` variable the agent knows is cleared on creation so
/// the host environment cannot leak into assertions.
pub struct EnvScope {
    previous: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvScope {
    pub fn new() -> Self {
        let guard = ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut scope = Self {
            previous: Vec::new(),
            _guard: guard,
        };
        let keys: Vec<String> = PARAMETERS
            .iter()
            .map(|spec| spec.env_key())
            .chain([String::from(RESOURCE_INSTANCE_ENV)])
            .collect();
        for key in keys {
            scope.remove(&key);
        }
        scope
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.remember(key);
        // Environment mutation is unsafe in edition 2024; the mutex keeps
        // tests in this binary from racing.
        unsafe { std::env::set_var(key, value) };
    }

    pub fn remove(&mut self, key: &str) {
        self.remember(key);
        unsafe { std::env::remove_var(key) };
    }

    fn remember(&mut self, key: &str) {
        if self.previous.iter().all(|(known, _)| known != key) {
            self.previous
                .push((key.to_owned(), std::env::var_os(key)));
        }
    }
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..).rev() {
            match value {
                Some(value) => unsafe { std::env::set_var(&key, value) },
                None => unsafe { std::env::remove_var(&key) },
            }
        }
    }
}

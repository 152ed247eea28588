//! Helpers shared by unit tests that touch process environment variables.

use std::sync::{Mutex, MutexGuard};

static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Serialise access to the environment across every test module.
pub(crate) fn lock_env() -> MutexGuard<'static, ()> {
    ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner())
}

/// Sets (or removes) a variable and restores the previous value on drop.
pub(crate) struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl EnvVarGuard {
    pub(crate) fn set(key: &'static str, value: Option<&str>) -> Self {
        let previous = std::env::var(key).ok();
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
        Self { key, previous }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match self.previous.as_deref() {
            Some(value) => std::env::set_var(self.key, value),
            None => std::env::remove_var(self.key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_restores_previous_value() {
        let _lock = lock_env();
        let key = "GALLERY_TEST_SUPPORT_SCRATCH";
        std::env::remove_var(key);

        {
            let _outer = EnvVarGuard::set(key, Some("outer"));
            {
                let _inner = EnvVarGuard::set(key, None);
                assert!(std::env::var(key).is_err());
            }
            assert_eq!(std::env::var(key).as_deref(), Ok("outer"));
        }
        assert!(std::env::var(key).is_err());
    }
}

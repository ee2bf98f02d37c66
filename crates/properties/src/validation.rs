//! Validation toggle and context.
//!
//! Type checks can be expensive for large array values, so they are gated by a
//! process-wide flag. [`ValidationContext`] carries the same switch explicitly
//! for callers that prefer not to depend on global state.

use std::sync::atomic::{AtomicBool, Ordering};

/// Environment variable read by [`ValidationContext::from_env`].
pub const VALIDATION_ENV: &str = "VIZPROPS_VALIDATION";

static SHOULD_VALIDATE: AtomicBool = AtomicBool::new(true);

/// Whether property type validation is currently enabled (default: `true`).
pub fn validation_on() -> bool {
    SHOULD_VALIDATE.load(Ordering::Relaxed)
}

/// Set the process-wide flag, returning the previous value.
pub fn set_validation(enabled: bool) -> bool {
    SHOULD_VALIDATE.swap(enabled, Ordering::Relaxed)
}

/// Run `f` with property validation disabled, restoring the flag afterwards.
pub fn without_property_validation<T>(f: impl FnOnce() -> T) -> T {
    let _guard = ValidationGuard::disable();
    f()
}

/// Restores the previous toggle value when dropped.
#[must_use = "validation is restored as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ValidationGuard {
    previous: bool,
}

impl ValidationGuard {
    pub fn set(enabled: bool) -> Self {
        Self {
            previous: set_validation(enabled),
        }
    }

    pub fn disable() -> Self {
        Self::set(false)
    }
}

impl Drop for ValidationGuard {
    fn drop(&mut self) {
        set_validation(self.previous);
    }
}

/// Explicit validation switch threaded through property operations.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ValidationContext {
    enabled: bool,
}

impl ValidationContext {
    pub const fn enabled() -> Self {
        Self { enabled: true }
    }

    pub const fn disabled() -> Self {
        Self { enabled: false }
    }

    /// Snapshot of the process-wide toggle.
    pub fn current() -> Self {
        Self {
            enabled: validation_on(),
        }
    }

    /// Read [`VALIDATION_ENV`]; unset means enabled.
    pub fn from_env() -> Self {
        let ctx = Self::parse(std::env::var(VALIDATION_ENV).ok().as_deref());
        tracing::debug!(enabled = ctx.enabled, "property validation configured from environment");
        ctx
    }

    /// `0`, `false`, `off` and `no` (any case) disable; anything else enables.
    pub fn parse(raw: Option<&str>) -> Self {
        let enabled = match raw.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) => !matches!(s.as_str(), "0" | "false" | "off" | "no"),
            None => true,
        };
        Self { enabled }
    }

    pub fn is_enabled(self) -> bool {
        self.enabled
    }

    /// Copy this context into the process-wide toggle.
    pub fn install(self) {
        set_validation(self.enabled);
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::enabled()
    }
}

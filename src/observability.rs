//! Optional error reporting to Sentry.
//!
//! Reporting is off unless `SENTRY_DSN` is set. `SENTRY_ENVIRONMENT` and
//! `SENTRY_RELEASE` are forwarded when present. Every capture carries
//! `component` plus `operation` or `handler` tags.

use std::borrow::Cow;
use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

static ENABLED: AtomicBool = AtomicBool::new(false);

const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Keeps the Sentry client alive. Dropping it flushes pending events.
pub struct Reporting {
    guard: Option<sentry::ClientInitGuard>,
}

impl Reporting {
    pub fn is_enabled(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Reporting {
    fn drop(&mut self) {
        if self.guard.is_some() {
            ENABLED.store(false, Ordering::Relaxed);
        }
    }
}

/// Initialise reporting from the environment.
pub fn init() -> Reporting {
    init_with(
        env_value("SENTRY_DSN").as_deref(),
        env_value("SENTRY_ENVIRONMENT"),
        env_value("SENTRY_RELEASE"),
    )
}

pub fn init_with(dsn: Option<&str>, environment: Option<String>, release: Option<String>) -> Reporting {
    let Some(raw) = dsn.map(str::trim).filter(|dsn| !dsn.is_empty()) else {
        ENABLED.store(false, Ordering::Relaxed);
        return Reporting { guard: None };
    };

    let dsn = match raw.parse::<sentry::types::Dsn>() {
        Ok(dsn) => dsn,
        Err(e) => {
            log::warn!("observability init: invalid SENTRY_DSN: {}", e);
            ENABLED.store(false, Ordering::Relaxed);
            return Reporting { guard: None };
        }
    };

    let guard = sentry::init(sentry::ClientOptions {
        dsn: Some(dsn),
        environment: environment.map(Cow::Owned),
        release: release.map(Cow::Owned),
        attach_stacktrace: true,
        shutdown_timeout: FLUSH_TIMEOUT,
        ..Default::default()
    });

    let enabled = guard.is_enabled();
    ENABLED.store(enabled, Ordering::Relaxed);
    if enabled {
        log::info!("observability init: error reporting enabled");
    }
    Reporting {
        guard: enabled.then_some(guard),
    }
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Report `err` with the given tags. No-op when reporting is off.
pub fn capture_error<E: Error + ?Sized>(err: &E, tags: &[(&str, &str)]) {
    if is_enabled() {
        report(err, tags);
    }
}

fn report<E: Error + ?Sized>(err: &E, tags: &[(&str, &str)]) {
    sentry::with_scope(
        |scope| {
            for (key, value) in tags {
                scope.set_tag(key, value);
            }
        },
        || {
            sentry::capture_error(err);
        },
    );
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

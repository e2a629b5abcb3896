// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-mismatch diagnostics.
//!
//! Lenient accessors never fail when the stored kind differs from the
//! requested one; they return the default and report a
//! [`TypeMismatchWarning`] here. A report:
//!
//! - is logged through the `log` facade at the configured level,
//! - bumps a process-wide counter ([`mismatch_count`]),
//! - is pushed to every active [`capture_mismatches`] scope on this thread.
//!
//! Settings live in a lock-free `ArcSwapOption` so [`install`] can be called
//! at any time without blocking readers.

use crate::config::DiagnosticsConfig;
use crate::tag::TypeTag;
use arc_swap::ArcSwapOption;
use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static SETTINGS: ArcSwapOption<DiagnosticsConfig> = ArcSwapOption::const_empty();
static MISMATCHES: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static CAPTURES: RefCell<Vec<Vec<TypeMismatchWarning>>> = const { RefCell::new(Vec::new()) };
}

/// Non-fatal report: the value stored at `key` cannot be viewed as the
/// requested kind, so `default` was returned instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatchWarning {
    pub key: String,
    pub expected: TypeTag,
    pub actual: TypeTag,
    /// Rendered default that was handed back to the caller.
    pub default: String,
}

impl fmt::Display for TypeMismatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "key '{}' expected {} but value was a {}; the default value {} was returned",
            self.key, self.expected, self.actual, self.default
        )
    }
}

/// Replace the process-wide diagnostics settings.
pub fn install(config: DiagnosticsConfig) {
    SETTINGS.store(Some(Arc::new(config)));
}

/// Restore default settings.
pub fn reset() {
    SETTINGS.store(None);
}

/// Current settings (defaults when nothing was installed).
pub fn settings() -> DiagnosticsConfig {
    SETTINGS
        .load_full()
        .map(|cfg| (*cfg).clone())
        .unwrap_or_default()
}

/// Total mismatches reported by this process.
pub fn mismatch_count() -> u64 {
    MISMATCHES.load(Ordering::Relaxed)
}

/// Report a mismatch. Called by the lenient accessors.
pub(crate) fn report(warning: TypeMismatchWarning) {
    MISMATCHES.fetch_add(1, Ordering::Relaxed);

    if let Some(level) = mismatch_log_level() {
        log::log!(level, "[StateBundle] {}", warning);
    }

    CAPTURES.with(|stack| {
        for scope in stack.borrow_mut().iter_mut() {
            scope.push(warning.clone());
        }
    });
}

/// Level mismatches are logged at, `None` when logging is off.
fn mismatch_log_level() -> Option<log::Level> {
    match SETTINGS.load().as_deref() {
        Some(cfg) if !cfg.log_mismatches => None,
        Some(cfg) => Some(cfg.mismatch_level.to_log()),
        None => Some(log::Level::Warn),
    }
}

/// Run `f` and collect every mismatch reported on this thread while it runs.
///
/// Scopes nest; an inner scope's reports are also seen by outer scopes.
pub fn capture_mismatches<R>(f: impl FnOnce() -> R) -> (R, Vec<TypeMismatchWarning>) {
    struct Scope;

    impl Drop for Scope {
        fn drop(&mut self) {
            CAPTURES.with(|stack| {
                stack.borrow_mut().pop();
            });
        }
    }

    CAPTURES.with(|stack| stack.borrow_mut().push(Vec::new()));
    let scope = Scope;
    let result = f();
    let captured = CAPTURES.with(|stack| {
        stack
            .borrow_mut()
            .last_mut()
            .map(std::mem::take)
            .unwrap_or_default()
    });
    drop(scope);
    (result, captured)
}

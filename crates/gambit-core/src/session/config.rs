//! Scheduler configuration

use serde::{Deserialize, Serialize};

use crate::schedule::{DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_NEW, DEFAULT_MAX_REVIEW};

/// Positions presented when the performance store cannot be read
pub const DEFAULT_FALLBACK_SIZE: usize = 20;

/// Per-session caps
///
/// The interval ladder and ranking weights are fixed and not configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// New positions per queue
    pub max_new: usize,
    /// Due positions per queue
    pub max_review: usize,
    /// Wrong answers before auto-reveal
    pub max_attempts: u32,
    /// Queue size in degraded mode
    pub fallback_size: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_new: DEFAULT_MAX_NEW,
            max_review: DEFAULT_MAX_REVIEW,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            fallback_size: DEFAULT_FALLBACK_SIZE,
        }
    }
}

impl SchedulerConfig {
    /// Defaults, overridden by `GAMBIT_MAX_NEW`, `GAMBIT_MAX_REVIEW` and
    /// `GAMBIT_FALLBACK_SIZE` when set
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults, overridden through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = parse_var(&lookup, "GAMBIT_MAX_NEW") {
            config.max_new = v;
        }
        if let Some(v) = parse_var(&lookup, "GAMBIT_MAX_REVIEW") {
            config.max_review = v;
        }
        if let Some(v) = parse_var(&lookup, "GAMBIT_FALLBACK_SIZE") {
            config.fallback_size = v;
        }

        config
    }
}

fn parse_var(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<usize> {
    let raw = lookup(name)?;
    match raw.trim().parse::<usize>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}='{}'", name, raw);
            None
        }
    }
}

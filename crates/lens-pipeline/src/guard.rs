//! Write guard: policy that can veto persisting stages for a class.

use lens_config::GuardConfig;
use lens_core::enums::StageType;

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Deny { reason: String },
}

impl GuardDecision {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Consulted before every persisting stage.
pub trait WriteGuard: Send + Sync {
    fn check(&self, class_id: &str, stage: StageType) -> GuardDecision;
}

/// Guard that never denies.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl WriteGuard for AllowAll {
    fn check(&self, _class_id: &str, _stage: StageType) -> GuardDecision {
        GuardDecision::Allow
    }
}

/// Denies every stage for classes listed in `guard.restricted_classes`.
#[derive(Debug, Clone, Default)]
pub struct RestrictedClassGuard {
    config: GuardConfig,
}

impl RestrictedClassGuard {
    #[must_use]
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            config: GuardConfig {
                restricted_classes: classes.into_iter().map(Into::into).collect(),
            },
        }
    }

    #[must_use]
    pub fn from_config(config: &GuardConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl WriteGuard for RestrictedClassGuard {
    fn check(&self, class_id: &str, _stage: StageType) -> GuardDecision {
        if self.config.is_restricted(class_id) {
            GuardDecision::Deny {
                reason: format!("class '{class_id}' is restricted; results are not saved"),
            }
        } else {
            GuardDecision::Allow
        }
    }
}

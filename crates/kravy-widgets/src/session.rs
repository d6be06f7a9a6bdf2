//! When the lead-capture dialog is allowed to appear.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

/// Per-visitor memory of whether the popup has already been shown.
///
/// Injected into the dialog so the policy can be tested without a browser
/// session store.
pub trait SessionMemory: Send + Sync {
    /// Whether the popup has been shown in this session.
    fn has_seen_popup(&self) -> bool;

    /// Record that the popup has been shown.
    fn mark_popup_seen(&self);
}

/// Process-local [`SessionMemory`].
#[derive(Debug, Default)]
pub struct InMemorySession {
    seen: AtomicBool,
}

impl InMemorySession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionMemory for InMemorySession {
    fn has_seen_popup(&self) -> bool {
        self.seen.load(Ordering::Acquire)
    }

    fn mark_popup_seen(&self) {
        self.seen.store(true, Ordering::Release);
    }
}

/// Display policy for the lead-capture dialog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayPolicy {
    /// Open on every page load, regardless of history.
    #[default]
    EveryLoad,
    /// Open only if this session has not seen the popup yet.
    OncePerSession,
}

impl DisplayPolicy {
    /// Whether a freshly mounted dialog should schedule its auto-open.
    #[must_use]
    pub fn should_show(self, session: &dyn SessionMemory) -> bool {
        match self {
            Self::EveryLoad => true,
            Self::OncePerSession => !session.has_seen_popup(),
        }
    }

    /// Stable identifier used in configuration and markup.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EveryLoad => "every-load",
            Self::OncePerSession => "once-per-session",
        }
    }
}

impl std::fmt::Display for DisplayPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`DisplayPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown display policy '{0}', expected 'every-load' or 'once-per-session'")]
pub struct UnknownPolicy(pub String);

impl FromStr for DisplayPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "every-load" | "always" => Ok(Self::EveryLoad),
            "once-per-session" | "once" => Ok(Self::OncePerSession),
            _ => Err(UnknownPolicy(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn every_load_ignores_history() {
        let session = InMemorySession::new();
        session.mark_popup_seen();
        assert!(DisplayPolicy::EveryLoad.should_show(&session));
    }

    #[test]
    fn once_per_session_respects_history() {
        let session = InMemorySession::new();
        assert!(DisplayPolicy::OncePerSession.should_show(&session));
        session.mark_popup_seen();
        assert!(!DisplayPolicy::OncePerSession.should_show(&session));
    }

    #[test]
    fn parses_config_values() {
        assert_eq!(
            "Once-Per-Session".parse::<DisplayPolicy>().unwrap(),
            DisplayPolicy::OncePerSession
        );
        assert_eq!("always".parse::<DisplayPolicy>().unwrap(), DisplayPolicy::EveryLoad);
        assert!("sometimes".parse::<DisplayPolicy>().is_err());
    }
}

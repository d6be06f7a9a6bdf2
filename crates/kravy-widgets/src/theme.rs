//! Light/dark theme toggle.
//!
//! The stored preference lives behind [`ThemePreference`] so the toggle can
//! be exercised without a browser. Until the toggle is mounted it cannot
//! know which theme the visitor stored, so it renders a neutral placeholder
//! instead of guessing.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// Accessible label shared by the placeholder and the live control.
pub const TOGGLE_LABEL: &str = "Toggle theme";

/// Colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Read/write access to the visitor's stored theme.
pub trait ThemePreference: Send + Sync {
    /// Stored theme, or `None` if nothing is stored yet.
    fn theme(&self) -> Option<Theme>;

    fn set_theme(&self, theme: Theme);
}

/// Process-local [`ThemePreference`].
#[derive(Debug, Default)]
pub struct MemoryThemePreference {
    theme: Mutex<Option<Theme>>,
}

impl MemoryThemePreference {
    #[must_use]
    pub fn new(initial: Option<Theme>) -> Self {
        Self {
            theme: Mutex::new(initial),
        }
    }
}

impl ThemePreference for MemoryThemePreference {
    fn theme(&self) -> Option<Theme> {
        *self.theme.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_theme(&self, theme: Theme) {
        *self.theme.lock().unwrap_or_else(PoisonError::into_inner) = Some(theme);
    }
}

/// Icon shown on the live control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeIcon {
    Sun,
    Moon,
}

/// What the toggle renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeControl {
    /// Inert control with an invisible icon, used before mount.
    Placeholder,
    /// Clickable control showing the active theme.
    Toggle { current: Theme, icon: ThemeIcon },
}

/// The theme toggle component.
pub struct ThemeToggle {
    preference: Arc<dyn ThemePreference>,
    mounted: bool,
}

impl std::fmt::Debug for ThemeToggle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeToggle")
            .field("mounted", &self.mounted)
            .finish_non_exhaustive()
    }
}

impl ThemeToggle {
    #[must_use]
    pub fn new(preference: Arc<dyn ThemePreference>) -> Self {
        Self {
            preference,
            mounted: false,
        }
    }

    /// Mark the toggle as mounted on the client; from now on it reflects
    /// the stored preference.
    pub fn mount(&mut self) {
        self.mounted = true;
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Current render state.
    #[must_use]
    pub fn render(&self) -> ThemeControl {
        if !self.mounted {
            return ThemeControl::Placeholder;
        }
        let current = self.current();
        let icon = match current {
            Theme::Dark => ThemeIcon::Moon,
            Theme::Light => ThemeIcon::Sun,
        };
        ThemeControl::Toggle { current, icon }
    }

    /// Flip the stored theme. The placeholder is inert, so this does
    /// nothing before mount.
    pub fn activate(&self) -> Option<Theme> {
        if !self.mounted {
            return None;
        }
        let next = self.current().toggled();
        self.preference.set_theme(next);
        tracing::debug!(theme = ?next, "theme toggled");
        Some(next)
    }

    /// Anything other than an explicit dark preference counts as light.
    fn current(&self) -> Theme {
        match self.preference.theme() {
            Some(Theme::Dark) => Theme::Dark,
            Some(Theme::Light) | None => Theme::Light,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toggle(initial: Option<Theme>) -> (Arc<MemoryThemePreference>, ThemeToggle) {
        let preference = Arc::new(MemoryThemePreference::new(initial));
        let toggle = ThemeToggle::new(Arc::clone(&preference) as Arc<dyn ThemePreference>);
        (preference, toggle)
    }

    #[test]
    fn renders_placeholder_until_mounted() {
        let (preference, toggle) = toggle(Some(Theme::Dark));
        assert_eq!(toggle.render(), ThemeControl::Placeholder);
        assert_eq!(toggle.activate(), None);
        assert_eq!(preference.theme(), Some(Theme::Dark));
    }

    #[test]
    fn mounted_toggle_reflects_stored_theme() {
        let (_, mut toggle) = toggle(Some(Theme::Dark));
        toggle.mount();
        assert_eq!(
            toggle.render(),
            ThemeControl::Toggle {
                current: Theme::Dark,
                icon: ThemeIcon::Moon
            }
        );
    }

    #[test]
    fn activate_flips_and_persists() {
        let (preference, mut toggle) = toggle(Some(Theme::Dark));
        toggle.mount();

        assert_eq!(toggle.activate(), Some(Theme::Light));
        assert_eq!(preference.theme(), Some(Theme::Light));
        assert_eq!(toggle.activate(), Some(Theme::Dark));
        assert_eq!(preference.theme(), Some(Theme::Dark));
    }

    #[test]
    fn unset_preference_counts_as_light() {
        let (preference, mut toggle) = toggle(None);
        toggle.mount();
        assert!(matches!(
            toggle.render(),
            ThemeControl::Toggle {
                icon: ThemeIcon::Sun,
                ..
            }
        ));
        assert_eq!(toggle.activate(), Some(Theme::Dark));
        assert_eq!(preference.theme(), Some(Theme::Dark));
    }

    #[test]
    fn theme_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Theme::Dark).ok().as_deref(), Some("\"dark\""));
    }
}

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::storage::{KeyValueStore, StorageError};

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("Unknown theme: {}", other)),
        }
    }
}

/// Theme read once at startup and written back on every change.
pub struct ThemePreference {
    store: Arc<dyn KeyValueStore>,
    current: Theme,
}

impl ThemePreference {
    /// Stored value first, then the platform dark-mode hint, then light.
    pub fn load(store: Arc<dyn KeyValueStore>, prefers_dark: bool) -> Self {
        let stored = store.get(THEME_KEY).and_then(|raw| raw.parse().ok());
        let current = stored.unwrap_or(if prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        });
        Self { store, current }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn set(&mut self, theme: Theme) -> Result<(), StorageError> {
        self.store.set(THEME_KEY, theme.as_str())?;
        self.current = theme;
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<Theme, StorageError> {
        let next = self.current.toggled();
        self.set(next)?;
        Ok(next)
    }
}

//! Theme preference store.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::{
    storage::Storage,
    store::{read_lock, write_lock},
};

/// Storage namespace for the persisted theme preference.
pub const THEME_NAMESPACE: &str = "theme";

/// Rendering theme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

type Listener = Box<dyn Fn(Theme) + Send + Sync>;

/// Single persisted theme value with a toggle operation.
pub struct ThemeStore {
    theme: RwLock<Theme>,
    storage: Storage,
    listeners: RwLock<Vec<Listener>>,
}

impl ThemeStore {
    pub fn new(storage: Storage) -> Self {
        let theme = match storage.load::<Theme>(THEME_NAMESPACE) {
            Ok(Some(theme)) => theme,
            Ok(None) => Theme::default(),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load persisted theme, using default");
                Theme::default()
            }
        };

        Self {
            theme: RwLock::new(theme),
            storage,
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn current(&self) -> Theme {
        *read_lock(&self.theme)
    }

    pub fn set(&self, theme: Theme) {
        let value = {
            let mut current = write_lock(&self.theme);
            *current = theme;
            if let Err(err) = self.storage.save(THEME_NAMESPACE, &*current) {
                tracing::error!(error = %err, "Failed to persist theme preference");
            }
            *current
        };

        for listener in read_lock(&self.listeners).iter() {
            listener(value);
        }
    }

    /// Flips between dark and light, returning the new value.
    pub fn toggle(&self) -> Theme {
        let next = self.current().toggled();
        self.set(next);
        next
    }

    pub fn subscribe(&self, listener: impl Fn(Theme) + Send + Sync + 'static) {
        write_lock(&self.listeners).push(Box::new(listener));
    }
}

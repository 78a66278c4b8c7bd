//! Theme preference store.
//!
//! Each [`ThemeStore`] owns its state and its storage backend; nothing is
//! process-global, so two stores never observe each other's changes.

use std::future::Future;
use std::str::FromStr;

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, watch};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::user_preferences::{ActiveModel as PreferenceActive, Entity as Preferences},
    error::{AppError, AppResult},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }
}

impl FromStr for Theme {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(AppError::BadRequest(format!("Unknown theme {other}"))),
        }
    }
}

pub trait ThemeStorage: Send + Sync {
    fn load(&self) -> impl Future<Output = AppResult<Option<Theme>>> + Send;
    fn save(&self, theme: Theme) -> impl Future<Output = AppResult<()>> + Send;
}

pub struct ThemeStore<S> {
    storage: S,
    tx: watch::Sender<Theme>,
}

impl<S: ThemeStorage> ThemeStore<S> {
    /// Load the persisted theme, falling back to [`Theme::System`].
    pub async fn init(storage: S) -> AppResult<Self> {
        let theme = storage.load().await?.unwrap_or_default();
        let (tx, _rx) = watch::channel(theme);
        Ok(Self { storage, tx })
    }

    pub fn current(&self) -> Theme {
        *self.tx.borrow()
    }

    /// Persist `theme` and notify subscribers if it changed.
    pub async fn apply(&self, theme: Theme) -> AppResult<Theme> {
        self.storage.save(theme).await?;
        self.tx.send_if_modified(|current| {
            let changed = *current != theme;
            *current = theme;
            changed
        });
        Ok(theme)
    }

    pub fn subscribe(&self) -> watch::Receiver<Theme> {
        self.tx.subscribe()
    }
}

#[derive(Default)]
pub struct MemoryThemeStorage {
    value: Mutex<Option<Theme>>,
}

impl MemoryThemeStorage {
    pub fn with(theme: Theme) -> Self {
        Self {
            value: Mutex::new(Some(theme)),
        }
    }
}

impl ThemeStorage for MemoryThemeStorage {
    async fn load(&self) -> AppResult<Option<Theme>> {
        Ok(*self.value.lock().await)
    }

    async fn save(&self, theme: Theme) -> AppResult<()> {
        *self.value.lock().await = Some(theme);
        Ok(())
    }
}

/// Theme persisted per user in `user_preferences`.
pub struct DbThemeStorage {
    orm: DatabaseConnection,
    user_id: Uuid,
}

impl DbThemeStorage {
    pub fn new(orm: DatabaseConnection, user_id: Uuid) -> Self {
        Self { orm, user_id }
    }
}

impl ThemeStorage for DbThemeStorage {
    async fn load(&self) -> AppResult<Option<Theme>> {
        let row = Preferences::find_by_id(self.user_id).one(&self.orm).await?;
        match row {
            Some(pref) => Ok(Some(pref.theme.parse()?)),
            None => Ok(None),
        }
    }

    async fn save(&self, theme: Theme) -> AppResult<()> {
        let existing = Preferences::find_by_id(self.user_id).one(&self.orm).await?;
        match existing {
            Some(pref) => {
                let mut active: PreferenceActive = pref.into();
                active.theme = Set(theme.as_str().to_string());
                active.updated_at = Set(chrono::Utc::now().fixed_offset());
                active.update(&self.orm).await?;
            }
            None => {
                PreferenceActive {
                    user_id: Set(self.user_id),
                    theme: Set(theme.as_str().to_string()),
                    ..Default::default()
                }
                .insert(&self.orm)
                .await?;
            }
        }
        Ok(())
    }
}

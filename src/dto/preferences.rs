use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::theme::Theme;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct ThemePreference {
    pub theme: Theme,
}

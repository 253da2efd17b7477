// src/models/settings.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccentColor {
    #[default]
    Indigo,
    Blue,
    Purple,
    Pink,
    Rose,
    Orange,
}

/// Preferências de aparência, guardadas em `users.settings`. Chaves desconhecidas
/// no blob são preservadas na atualização.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub theme: Theme,
    pub accent_color: AccentColor,
}

impl UserSettings {
    /// Lê as preferências do blob de settings, caindo nos
    /// padrões para o que faltar ou estiver ilegível.
    pub fn from_blob(blob: &serde_json::Value) -> Self {
        serde_json::from_value(blob.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[schema(example = "dark")]
    pub theme: Option<Theme>,

    #[schema(example = "rose")]
    pub accent_color: Option<AccentColor>,
}

impl UpdateSettingsRequest {
    /// Mescla as mudanças pedidas num blob de settings existente.
    pub fn apply_to(&self, blob: &serde_json::Value) -> serde_json::Value {
        let mut merged = match blob {
            serde_json::Value::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        };
        let current = UserSettings::from_blob(blob);
        let next = UserSettings {
            theme: self.theme.unwrap_or(current.theme),
            accent_color: self.accent_color.unwrap_or(current.accent_color),
        };
        if let serde_json::Value::Object(fields) = serde_json::json!(next) {
            merged.extend(fields);
        }
        serde_json::Value::Object(merged)
    }
}

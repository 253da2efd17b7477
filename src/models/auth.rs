// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::rbac::PermissionLevel;

// Uma linha da tabela `users`
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,

    #[serde(skip_serializing)]
    pub password: String,

    pub settings: serde_json::Value,
    pub view: serde_json::Value,
    pub permission: PermissionLevel,
    pub change_password_on_next: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

// O que a API expõe de uma conta
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    #[schema(example = "Admin")]
    pub first_name: String,
    #[schema(example = "User")]
    pub last_name: String,
    #[schema(example = "admin")]
    pub username: String,
    #[schema(example = "admin@example.com")]
    pub email: String,
    pub permission: PermissionLevel,
    #[schema(example = "Root")]
    pub permission_label: String,
    pub change_password_on_next: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            permission_label: user.permission.label().to_string(),
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            email: user.email,
            permission: user.permission,
            change_password_on_next: user.change_password_on_next,
            created_at: user.created_at,
        }
    }
}

// Campos necessários para criar uma conta
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub permission: PermissionLevel,
    pub change_password_on_next: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "admin@example.com")]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[schema(example = "admin123")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserSummary,
}

/// Payload do JWT. Autossuficiente: o portão nunca lê o banco para
/// autorizar uma requisição.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    #[serde(default)]
    pub permission: Option<PermissionLevel>,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    /// Tokens sem a claim de permissão são tratados como Viewer.
    pub fn permission(&self) -> PermissionLevel {
        self.permission.unwrap_or_default()
    }
}

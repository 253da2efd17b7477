// src/models/profile.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{auth::Claims, rbac::PermissionLevel};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: Uuid,
    #[schema(example = "Admin User")]
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    /// Primeira letra do nome, depois `.` e a primeira letra do sobrenome.
    #[schema(example = "A.U")]
    pub initials: String,
    #[schema(example = "admin")]
    pub username: String,
    pub email: String,
    pub permission: PermissionLevel,
    #[schema(example = "Root")]
    pub permission_label: String,
}

/// Separa o nome de exibição em nome/sobrenome quando o token não os traz.
fn name_parts(claims: &Claims) -> (String, String) {
    let mut words = claims.name.split_whitespace();
    let first = if claims.first_name.is_empty() {
        words.next().unwrap_or_default().to_string()
    } else {
        claims.first_name.clone()
    };
    let last = if claims.last_name.is_empty() {
        claims.name.split_whitespace().nth(1).unwrap_or_default().to_string()
    } else {
        claims.last_name.clone()
    };
    (first, last)
}

impl From<&Claims> for ProfileView {
    fn from(claims: &Claims) -> Self {
        let (first_name, last_name) = name_parts(claims);

        let full_name = if !claims.first_name.is_empty() && !claims.last_name.is_empty() {
            format!("{} {}", claims.first_name, claims.last_name)
        } else if !claims.name.is_empty() {
            claims.name.clone()
        } else {
            "User".to_string()
        };

        let mut initials: String = first_name.chars().take(1).collect();
        if let Some(c) = last_name.chars().next() {
            initials.push('.');
            initials.push(c);
        }

        let username = if !claims.username.is_empty() {
            claims.username.clone()
        } else {
            claims
                .email
                .split('@')
                .next()
                .filter(|local| !local.is_empty())
                .unwrap_or("user")
                .to_string()
        };

        let permission = claims.permission();

        Self {
            id: claims.sub,
            full_name,
            first_name,
            last_name,
            initials,
            username,
            email: claims.email.clone(),
            permission,
            permission_label: permission.label().to_string(),
        }
    }
}

impl ProfileView {
    /// "Nome S." como aparece no cabeçalho.
    pub fn display_name(&self) -> String {
        match self.last_name.chars().next() {
            Some(c) => format!("{} {}.", self.first_name, c),
            None => self.first_name.clone(),
        }
    }

    /// Primeira letra de cada palavra do nome completo, em maiúscula.
    pub fn header_initials(&self) -> String {
        self.full_name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .collect::<String>()
            .to_uppercase()
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    #[validate(length(min = 1, message = "First name is required"))]
    #[schema(example = "Ada")]
    pub first_name: String,

    #[validate(length(min = 1, message = "Last name is required"))]
    #[schema(example = "Lovelace")]
    pub last_name: String,

    #[validate(length(min = 3, max = 32, message = "Username must be 3 to 32 characters"))]
    #[schema(example = "ada")]
    pub username: String,
}

impl UpdateProfilePayload {
    /// Remove espaços nas pontas. Rodar antes de `validate` para campos em branco falharem.
    pub fn trimmed(self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            username: self.username.trim().to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    #[validate(length(min = 1, message = "Password is required"))]
    pub current_password: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

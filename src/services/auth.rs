// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::{
        auth::{Claims, NewUser, User},
        rbac::PermissionLevel,
    },
};

/// Sessões duram 30 dias, como o cookie do dashboard.
pub const TOKEN_TTL_DAYS: i64 = 30;

/// Chaves de assinatura HS256.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: chrono::Duration::days(TOKEN_TTL_DAYS),
        }
    }

    pub fn with_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.ttl;

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            name: user.full_name(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
            permission: Some(user.permission),
            exp: expires_at.timestamp().max(0) as usize,
            iat: now.timestamp().max(0) as usize,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Só verifica assinatura e expiração; não lê o banco.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::InvalidToken)
    }
}

pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, cost))
        .await
        .map_err(|e| anyhow::anyhow!("password hashing task failed: {}", e))??;
    Ok(hashed)
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("password verification task failed: {}", e))??;
    Ok(valid)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    keys: TokenKeys,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, keys: TokenKeys) -> Self {
        Self { user_repo, keys, bcrypt_cost: bcrypt::DEFAULT_COST }
    }

    pub fn keys(&self) -> &TokenKeys {
        &self.keys
    }

    /// E-mail desconhecido e senha errada são indistinguíveis para quem chama.
    pub async fn login_user(&self, email: &str, password: &str) -> Result<(String, User), AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password).await? {
            tracing::info!("Rejected login for {}", email);
            return Err(AppError::InvalidCredentials);
        }

        let token = self.keys.issue(&user)?;
        tracing::info!("🔑 {} signed in (permission {})", user.username, user.permission);
        Ok((token, user))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        self.keys.decode(token)
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !verify_password(current_password, &user.password).await? {
            return Err(AppError::WrongCurrentPassword);
        }

        let new_hash = hash_password(new_password, self.bcrypt_cost).await?;
        self.user_repo.update_password(user_id, &new_hash).await?;
        tracing::info!("Password changed for {}", user.username);
        Ok(())
    }

    /// Cria a conta Root a não ser que o e-mail já esteja em uso.
    /// Retorna `None` quando a conta já existia.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<Option<User>, AppError> {
        if self.user_repo.find_by_email(email).await?.is_some() {
            return Ok(None);
        }

        let password_hash = hash_password(password, self.bcrypt_cost).await?;
        let username = email.split('@').next().unwrap_or("admin").to_string();

        let new_user = NewUser {
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            username,
            email: email.to_string(),
            password_hash,
            permission: PermissionLevel::ROOT,
            change_password_on_next: true,
        };

        let user = self.user_repo.create_user(self.user_repo.pool(), &new_user).await?;
        Ok(Some(user))
    }
}

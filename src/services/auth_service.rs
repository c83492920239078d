//! Authentication service.
//!
//! Handles user authentication, JWT token management, and password hashing.

use std::sync::Arc;

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::user::User;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// Display name
    pub name: String,
    /// Email
    pub email: String,
    /// Role name
    pub role: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Successful login payload
#[derive(Debug, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
}

/// Authentication service
pub struct AuthService {
    db: PgPool,
    config: Arc<Config>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(db: PgPool, config: Arc<Config>) -> Self {
        let secret = config.jwt_secret.clone();
        Self {
            db,
            config,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Authenticate a user by email and password, returning a signed token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !verify(password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?
        {
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        let token = self.generate_token(&user)?;

        Ok(LoginResult {
            token,
            expires_in: self.config.jwt_expiration_secs,
            user,
        })
    }

    /// Generate a signed access token for a user.
    pub fn generate_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.config.jwt_expiration_secs)).timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Validate a bearer token and return its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims)
    }

    /// Hash a password with bcrypt
    pub fn hash_password(password: &str) -> Result<String> {
        hash(password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against a bcrypt hash
    pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
        verify(password, password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Arc<Config> {
        Arc::new(Config {
            database_url: "postgres://unused".to_string(),
            bind_address: "127.0.0.1:0".to_string(),
            log_level: "info".to_string(),
            storage_backend: "filesystem".to_string(),
            storage_path: "/tmp".to_string(),
            local_files_base_url: "/files".to_string(),
            repair_attachments_bucket: None,
            purchase_attachments_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            jwt_secret: "test-secret".to_string(),
            jwt_expiration_secs: 3600,
        })
    }

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Coach Ravi".to_string(),
            email: "ravi@example.org".to_string(),
            password_hash: String::new(),
            role: "coach".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hashed = AuthService::hash_password("s3cret").unwrap();
        assert!(AuthService::verify_password("s3cret", &hashed).unwrap());
        assert!(!AuthService::verify_password("wrong", &hashed).unwrap());
    }

    #[tokio::test]
    async fn test_token_roundtrip_carries_role() {
        let pool = PgPool::connect_lazy("postgres://unused@localhost/unused").unwrap();
        let service = AuthService::new(pool, test_config());
        let user = test_user();

        let token = service.generate_token(&user).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, "coach");
        assert_eq!(claims.email, user.email);
    }

    #[tokio::test]
    async fn test_validate_rejects_garbage_token() {
        let pool = PgPool::connect_lazy("postgres://unused@localhost/unused").unwrap();
        let service = AuthService::new(pool, test_config());
        assert!(service.validate_token("not-a-jwt").is_err());
    }

    #[tokio::test]
    async fn test_validate_rejects_token_signed_with_other_secret() {
        let pool = PgPool::connect_lazy("postgres://unused@localhost/unused").unwrap();
        let service = AuthService::new(pool.clone(), test_config());

        let mut other_config = (*test_config()).clone();
        other_config.jwt_secret = "different-secret".to_string();
        let other = AuthService::new(pool, Arc::new(other_config));

        let token = other.generate_token(&test_user()).unwrap();
        assert!(service.validate_token(&token).is_err());
    }
}

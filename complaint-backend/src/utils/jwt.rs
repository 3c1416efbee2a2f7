// src/utils/jwt.rs

use crate::config::JwtSettings;
use crate::domain::user_role::UserRole;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// JWT関連のエラー
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Failed to encode JWT: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Failed to decode JWT: {0}")]
    DecodingError(String),

    #[error("JWT token has expired")]
    TokenExpired,

    #[error("Invalid JWT token")]
    InvalidToken,

    #[error("Invalid JWT configuration: {0}")]
    ConfigurationError(String),
}

/// 外部の認証サービスが発行するアクセストークンのClaims
///
/// ロールは参考情報で、認可には常にユーザーディレクトリの値を使う。
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessTokenClaims {
    /// Subject (user ID)
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

impl AccessTokenClaims {
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::InvalidToken)
    }
}

/// JWT検証・発行
pub struct JwtManager {
    settings: JwtSettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtManager {
    pub fn new(settings: JwtSettings) -> Result<Self, JwtError> {
        if settings.secret.len() < 32 {
            return Err(JwtError::ConfigurationError(
                "JWT secret key must be at least 32 characters".to_string(),
            ));
        }
        if settings.expiry_minutes <= 0 {
            return Err(JwtError::ConfigurationError(
                "Token expiry must be positive".to_string(),
            ));
        }

        let encoding_key = EncodingKey::from_secret(settings.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(settings.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&settings.issuer]);
        validation.set_audience(&[&settings.audience]);
        validation.validate_exp = true;

        Ok(Self {
            settings,
            encoding_key,
            decoding_key,
            validation,
        })
    }

    /// アクセストークンを生成（シードツールとテスト用）
    pub fn generate_access_token(&self, user_id: Uuid, role: UserRole) -> Result<String, JwtError> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.settings.expiry_minutes);

        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            role: Some(role),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.settings.issuer.clone(),
            aud: self.settings.audience.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(JwtError::EncodingError)
    }

    /// アクセストークンを検証・デコード
    pub fn verify_access_token(&self, token: &str) -> Result<AccessTokenClaims, JwtError> {
        decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::DecodingError(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn manager() -> JwtManager {
        JwtManager::new(AppConfig::for_testing().jwt).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let manager = manager();
        let user_id = Uuid::new_v4();
        let token = manager
            .generate_access_token(user_id, UserRole::Provider)
            .unwrap();

        let claims = manager.verify_access_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.role, Some(UserRole::Provider));
    }

    #[test]
    fn test_rejects_foreign_signature() {
        let mut other = AppConfig::for_testing().jwt;
        other.secret = "another-secret-key-that-is-at-least-32-chars".to_string();
        let token = JwtManager::new(other)
            .unwrap()
            .generate_access_token(Uuid::new_v4(), UserRole::Admin)
            .unwrap();

        assert!(manager().verify_access_token(&token).is_err());
    }

    #[test]
    fn test_rejects_wrong_audience() {
        let mut other = AppConfig::for_testing().jwt;
        other.audience = "someone-else".to_string();
        let token = JwtManager::new(other)
            .unwrap()
            .generate_access_token(Uuid::new_v4(), UserRole::Citizen)
            .unwrap();

        assert!(manager().verify_access_token(&token).is_err());
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let mut settings = AppConfig::for_testing().jwt;
        settings.secret = "short".to_string();
        assert!(matches!(
            JwtManager::new(settings),
            Err(JwtError::ConfigurationError(_))
        ));
    }
}

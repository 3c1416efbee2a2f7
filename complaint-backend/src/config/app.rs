use std::env;
use std::net::IpAddr;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub body_limit: usize,
}

#[derive(Clone, Debug)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    /// 発行するトークンの有効期限（分）。シードとテストのトークン発行でのみ使う。
    pub expiry_minutes: i64,
}

#[derive(Clone, Debug)]
pub struct RateLimitSettings {
    pub window_ms: u64,
    pub max_requests: usize,
    /// X-Forwarded-For を信用するリバースプロキシ
    pub trusted_proxies: Vec<IpAddr>,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub api_version: String,
    pub cors_allowed_origins: Vec<String>,
    pub database_url: String,
    pub jwt: JwtSettings,
    pub rate_limit: RateLimitSettings,
    pub server: ServerConfig,
}

const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024; // 10MB

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("Invalid {} value: '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_ip_list(key: &str) -> Result<Vec<IpAddr>, String> {
    parse_origins(&var_or(key, ""))
        .into_iter()
        .map(|raw| {
            raw.parse()
                .map_err(|_| format!("Invalid {} value: '{}'", key, raw))
        })
        .collect()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok(); // .env がなくてもエラーにしない

        let jwt_secret = env::var("JWT_SECRET")
            .or_else(|_| env::var("JWT_SECRET_KEY"))
            .map_err(|_| "JWT_SECRET or JWT_SECRET_KEY must be set")?;
        if jwt_secret.len() < 32 {
            return Err("JWT secret key must be at least 32 characters".to_string());
        }

        Ok(Self {
            environment: var_or("ENVIRONMENT", "development"),
            host: var_or("HOST", "127.0.0.1"),
            port: parse_var("PORT", 5000)?,
            api_version: var_or("API_VERSION", "v1"),
            cors_allowed_origins: parse_origins(&var_or(
                "CORS_ALLOWED_ORIGINS",
                "http://localhost:5173",
            )),
            database_url: env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            jwt: JwtSettings {
                secret: jwt_secret,
                issuer: var_or("JWT_ISSUER", "complaint-backend"),
                audience: var_or("JWT_AUDIENCE", "complaint-backend-users"),
                expiry_minutes: parse_var("JWT_EXPIRY_MINUTES", 60 * 24 * 7)?,
            },
            rate_limit: RateLimitSettings {
                window_ms: parse_var("RATE_LIMIT_WINDOW_MS", 15 * 60 * 1000)?,
                max_requests: parse_var("RATE_LIMIT_MAX_REQUESTS", 100)?,
                trusted_proxies: parse_ip_list("RATE_LIMIT_TRUSTED_PROXIES")?,
            },
            server: ServerConfig {
                body_limit: DEFAULT_BODY_LIMIT,
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `/api/v1` のようなAPIプレフィックス
    pub fn api_prefix(&self) -> String {
        format!("/api/{}", self.api_version)
    }

    /// テスト用の設定を作成
    pub fn for_testing() -> Self {
        Self {
            environment: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 5000,
            api_version: "v1".to_string(),
            cors_allowed_origins: vec!["http://localhost:5173".to_string()],
            database_url: "sqlite::memory:".to_string(),
            jwt: JwtSettings {
                secret: "test-secret-key-that-is-at-least-32-characters-long".to_string(),
                issuer: "complaint-backend".to_string(),
                audience: "complaint-backend-users".to_string(),
                expiry_minutes: 60,
            },
            rate_limit: RateLimitSettings {
                window_ms: 15 * 60 * 1000,
                max_requests: 10_000,
                trusted_proxies: Vec::new(),
            },
            server: ServerConfig {
                body_limit: DEFAULT_BODY_LIMIT,
            },
        }
    }
}

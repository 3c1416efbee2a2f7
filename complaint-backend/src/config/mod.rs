// src/config/mod.rs
pub mod app;

pub use app::{AppConfig, JwtSettings, RateLimitSettings, ServerConfig};

// Backward compatibility
pub type Config = AppConfig;

// src/middleware/mod.rs

pub mod auth;
pub mod rate_limit;

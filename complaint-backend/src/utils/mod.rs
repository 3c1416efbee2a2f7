// src/utils/mod.rs

pub mod jwt;
pub mod permission;
pub mod validation;

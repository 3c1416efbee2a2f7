// src/api/dto/mod.rs
pub mod analytics_dto;
pub mod complaint_dto;
pub mod department_dto;
pub mod user_dto;

// src/repository/mod.rs
pub mod complaint_repository;
pub mod department_repository;
pub mod user_repository;

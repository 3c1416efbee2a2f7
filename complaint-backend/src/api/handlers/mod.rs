// src/api/handlers/mod.rs
pub mod complaint_handler;
pub mod department_handler;
pub mod realtime_handler;
pub mod system_handler;
pub mod user_handler;

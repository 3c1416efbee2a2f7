// src/service/mod.rs
pub mod analytics_service;
pub mod complaint_service;
pub mod department_service;
pub mod notification_service;
pub mod routing_service;
pub mod user_service;

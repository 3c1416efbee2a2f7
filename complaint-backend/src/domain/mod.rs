// src/domain/mod.rs
pub mod complaint_attachment_model;
pub mod complaint_category;
pub mod complaint_model;
pub mod complaint_priority;
pub mod complaint_status;
pub mod complaint_update_model;
pub mod department_model;
pub mod department_staff_model;
pub mod geo;
pub mod user_model;
pub mod user_role;

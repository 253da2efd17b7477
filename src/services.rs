pub mod auth;
pub mod import_service;
pub mod report;

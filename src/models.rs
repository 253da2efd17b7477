pub mod auth;
pub mod dashboard;
pub mod product;
pub mod profile;
pub mod rbac;
pub mod settings;

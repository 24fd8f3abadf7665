pub mod asset;
pub mod auth;
pub mod persona;
pub mod rbac;
pub mod section;

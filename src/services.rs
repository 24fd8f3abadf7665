pub mod asset_service;
pub mod auth;
pub mod autosave;
pub mod color;
pub mod file_service;
pub mod font_service;
pub mod logo;
pub mod optimistic;
pub mod package_service;
pub mod persona_service;
pub mod section_service;

pub mod assets;
pub mod auth;
pub mod colors;
pub mod fonts;
pub mod personas;
pub mod sections;

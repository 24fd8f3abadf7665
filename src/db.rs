pub mod user_repo;
pub use user_repo::UserRepository;
pub mod asset_repo;
pub use asset_repo::AssetRepository;
pub mod persona_repo;
pub use persona_repo::{PersonaFields, PersonaRepository};
pub mod section_repo;
pub use section_repo::{SectionRepository, SectionStore};

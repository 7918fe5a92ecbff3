pub mod convert;
pub mod export;
pub mod multi_experience;
pub mod reset_spawns;
pub mod validate;

pub mod border;
pub mod button;
pub mod disambiguate;
pub mod screenshot;
pub mod types;

pub mod automation;
pub mod config;
pub mod detector;
pub mod errors;
pub mod geometry;
pub mod perception;
pub mod window;

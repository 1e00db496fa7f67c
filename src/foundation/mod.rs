pub mod angle;
pub mod core;
pub mod error;

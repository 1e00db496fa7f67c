pub mod engine;
pub mod minimap;
pub mod path;

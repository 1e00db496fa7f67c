pub mod controller;
pub mod overview;
pub mod pose;

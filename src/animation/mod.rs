pub mod ease;
pub mod timer;
pub mod tween;

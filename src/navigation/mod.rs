//! Navigation state machine: turns reader intents and elapsed time into page creation, camera
//! moves, scroll sessions and prompts.

mod hooks;
pub mod intent;
mod jobs;
pub mod session;

pub use crate::config::Branch;
pub use intent::{Intent, MenuAction, NavKey, Prompt, SessionEvent, SessionSnapshot, Toast};
pub use session::{CameraDriver, NavigationState, Session};

use crate::{
    camera::pose::CameraPose,
    config::Branch,
    foundation::core::Millis,
    navigation::session::{CameraDriver, NavigationState},
    scroll::engine::ScrollStatus,
};

/// Directional keys the engine reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum NavKey {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuAction {
    Overview,
    CloseUp,
    Restart,
    OtherEnding,
    AllPages,
}

/// One user input, as delivered by the host.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    Next,
    Prev,
    /// Pointer click at screen x; the left half goes back, the right half forward.
    Click { x: f64 },
    Key { key: NavKey },
    /// Jump to a 0-based index through the progress slider.
    SliderJump { index: usize },
    /// Absolute scroll offset inside the active scroll region.
    Scroll { offset: f64 },
    /// Scroll position expressed as path progress.
    ScrollProgress { progress: f64 },
    Wheel { delta_y: f64 },
    ToggleOverview,
    OverviewSelect { id: String },
    OverviewHover { id: String, on: bool },
    Menu { action: MenuAction },
    ChooseBranch { branch: Branch },
    ConfirmReload,
    CancelReload,
    Resize { width: f64, height: f64 },
}

/// Modal prompt currently shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Prompt {
    BranchChoice,
    Reload,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Toast {
    pub message: String,
    pub shown_at: Millis,
}

/// Notifications for UI wiring, drained with [`crate::Session::drain_events`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    PageCreated { id: String, index: usize },
    Navigated { id: String, index: usize },
    PageRevealed { id: String },
    ScrollArmed { id: String },
    ScrollDone { id: String },
    ScrollKilled { id: String },
    PromptOpened { prompt: Prompt },
    PromptClosed { prompt: Prompt },
    ToastShown { message: String },
    ToastHidden,
    OverviewEntered,
    OverviewExited,
    BranchSelected { branch: Branch },
    EndingReached { branch: Branch },
    AllPagesProgress { created: usize, total: usize },
    AllPagesComplete,
    Reloaded,
}

/// Serializable view of everything a host renders.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SessionSnapshot {
    pub now_ms: Millis,
    pub state: NavigationState,
    pub page_id: Option<String>,
    pub page_info: String,
    pub next_enabled: bool,
    pub prev_enabled: bool,
    pub camera: CameraPose,
    pub driver: CameraDriver,
    pub scroll_blocked: bool,
    pub scroll: Option<ScrollStatus>,
    pub prompt: Option<Prompt>,
    pub toast: Option<Toast>,
    pub active_pages: usize,
    pub created_pages: usize,
}

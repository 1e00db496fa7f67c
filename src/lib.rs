//! pagewalk is a headless camera and navigation engine for spatial picture books.
//!
//! Pages sit at fixed positions in one large world. A camera glides between them, follows
//! motion paths driven by scroll progress, and zooms out to an overview of every page created
//! so far. A two-armed branch splits the book, and reveal batches show pages one by one while
//! the reader scrolls.
//!
//! # Session model
//!
//! 1. **Load**: [`PageDataset`] (ordered page descriptors) and [`EngineConfig`] (timing, view
//!    and narrative tables), both validated up front.
//! 2. **Drive**: a [`Session`] takes [`Intent`]s from the host and a clock advanced with
//!    [`Session::advance`]. Camera settles and deferred actions fire in time order.
//! 3. **Observe**: the camera pose, page flags, prompts and the [`SessionEvent`] log describe
//!    what a renderer should show. [`Session::snapshot`] bundles them for serialization.
//!
//! The session never reads the wall clock and owns no threads, so a script of intents and
//! clock steps always replays to the same state. Image lookup goes through an
//! [`ImageProbe`]; [`MemoryProbe`] serves tests and [`FsImageProbe`] a book directory.
//!
//! The [`offline`] module holds the authoring tools behind the `pagewalk` binary: rotation
//! patches for `pages.json` and thumbnail generation.
#![forbid(unsafe_code)]

pub mod animation;
pub mod assets;
pub mod camera;
pub mod config;
pub mod dataset;
pub mod foundation;
pub mod navigation;
pub mod offline;
pub mod registry;
pub mod scroll;

pub use animation::{
    ease::Ease,
    timer::{TimerQueue, TimerToken},
    tween::{Lerp, Tween},
};
pub use assets::{
    probe::{FsImageProbe, ImageProbe, MemoryProbe},
    resolver::{ImageResolver, ImageSource},
};
pub use camera::{controller::CameraController, pose::CameraPose};
pub use config::{Branch, BranchConfig, EngineConfig, NarrativeTable, RevealBatch};
pub use dataset::{PageDataset, PageDescriptor, PageKind};
pub use foundation::{
    core::{Millis, Viewport, WorldBounds},
    error::{PagewalkError, PagewalkResult},
};
pub use navigation::{
    CameraDriver, Intent, MenuAction, NavKey, NavigationState, Prompt, Session, SessionEvent,
    SessionSnapshot,
};
pub use registry::{PageInstance, PageRegistry};
pub use scroll::engine::{ScrollPathEngine, ScrollPhase};

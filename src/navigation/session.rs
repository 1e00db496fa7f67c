use std::{collections::HashSet, sync::Arc};

use crate::{
    animation::timer::{TimerQueue, TimerToken},
    assets::resolver::ImageResolver,
    camera::{
        controller::{CameraController, MoveId},
        overview::{OverviewAffordances, dim_all_except},
        pose::CameraPose,
    },
    config::{Branch, EngineConfig},
    dataset::PageDataset,
    foundation::{
        core::{Millis, Vec2, Viewport, WorldBounds},
        error::{PagewalkError, PagewalkResult},
    },
    navigation::{
        intent::{Intent, MenuAction, NavKey, Prompt, SessionEvent, SessionSnapshot, Toast},
        jobs::Job,
    },
    registry::{Ensured, PageRegistry},
    scroll::engine::{ScrollPathEngine, ScrollStatus},
};

const SLIDER_WARNING: &str = "Later pages unlock as you keep reading.";

/// Which subsystem is currently allowed to move the camera.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraDriver {
    #[default]
    Idle,
    /// A centering move started by navigation.
    Manual,
    ScrollPath,
    Overview,
}

/// Flags of the navigation state machine.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct NavigationState {
    /// Index into the active sequence.
    pub current: usize,
    pub click_locked: bool,
    pub overview: bool,
    pub all_pages: bool,
    pub modal_open: bool,
    pub branch: Option<Branch>,
    /// Display index while a reveal batch is being scrolled through.
    pub special_progress_index: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub(super) enum Deferred {
    Unlock,
    AutoAdvance,
    DegenerateAdvance,
    PageAutoAdvance,
    OpenBranchPrompt,
    RevealHandOff { trigger: String },
    BranchNext,
    HideToast,
    JobStep,
}

/// Continuation run when a camera move settles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum AfterMove {
    Nothing,
    Settle { index: usize, fresh: bool },
    OverviewEntered,
    OverviewExited { then: Option<ExitThen> },
    ReplayArrived { branch: Branch },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum ExitThen {
    CenterOn(usize),
    OtherEnding,
    AllPages,
}

/// One reader's walk through a page dataset.
///
/// Single-threaded and deterministic: the host feeds [`Intent`]s through [`Session::handle`]
/// and wall-clock progress through [`Session::advance`]. Timers and camera settles are
/// processed in due order, so a whole walk can be replayed from a script.
pub struct Session {
    pub(super) dataset: Arc<PageDataset>,
    pub(super) config: EngineConfig,
    pub(super) resolver: Arc<ImageResolver>,
    pub(super) registry: PageRegistry,
    pub(super) camera: CameraController,
    pub(super) scroll: ScrollPathEngine,
    pub(super) affordances: OverviewAffordances,
    pub(super) timers: TimerQueue<Deferred>,
    pub(super) state: NavigationState,
    pub(super) driver: CameraDriver,
    pub(super) now: Millis,
    pub(super) pending_move: Option<(MoveId, AfterMove)>,
    pub(super) prompt: Option<Prompt>,
    pub(super) toast: Option<Toast>,
    pub(super) toast_timer: Option<TimerToken>,
    pub(super) unlock_timer: Option<TimerToken>,
    /// The pending follow-up move of the current page (auto-advance, prompt, hand-off).
    pub(super) nav_timer: Option<TimerToken>,
    pub(super) slider_rejections: u32,
    pub(super) scroll_offset: f64,
    pub(super) prepared_batches: HashSet<String>,
    pub(super) job: Option<Job>,
    pub(super) events: Vec<SessionEvent>,
}

impl Session {
    /// Start a session on the first page. Every non-blank image is resolved up front.
    #[tracing::instrument(skip_all, fields(pages = dataset.len()))]
    pub fn new(
        dataset: Arc<PageDataset>,
        config: EngineConfig,
        resolver: Arc<ImageResolver>,
    ) -> PagewalkResult<Self> {
        config.validate()?;
        if dataset.is_empty() {
            return Err(PagewalkError::dataset("dataset has no pages"));
        }
        let mut session = Self::build(dataset, config, resolver, 0);
        session.boot();
        Ok(session)
    }

    fn build(
        dataset: Arc<PageDataset>,
        config: EngineConfig,
        resolver: Arc<ImageResolver>,
        now: Millis,
    ) -> Self {
        let registry = PageRegistry::new(Arc::clone(&dataset));
        Self {
            camera: CameraController::new(config.viewport, config.base_view_scale, config.ease),
            scroll: ScrollPathEngine::new(config.scroll.clone()),
            dataset,
            resolver,
            registry,
            affordances: OverviewAffordances::default(),
            timers: TimerQueue::new(),
            state: NavigationState::default(),
            driver: CameraDriver::Idle,
            now,
            pending_move: None,
            prompt: None,
            toast: None,
            toast_timer: None,
            unlock_timer: None,
            nav_timer: None,
            slider_rejections: 0,
            scroll_offset: 0.0,
            prepared_batches: HashSet::new(),
            job: None,
            events: Vec::new(),
            config,
        }
    }

    fn boot(&mut self) {
        let ids: Vec<&str> = self
            .dataset
            .iter()
            .filter(|p| !p.kind.is_blank())
            .map(|p| p.id.as_str())
            .collect();
        let resolved = self.resolver.preload(ids.as_slice());
        let missing = resolved.iter().filter(|s| s.is_placeholder()).count();
        tracing::info!(images = resolved.len(), missing, "images preloaded");

        if self.registry.ensure(0, &self.resolver) == Some(Ensured::Created) {
            self.push_created(0);
        }
        self.center_on(0, 0, false, AfterMove::Settle { index: 0, fresh: true });
        self.run_until(self.now);
    }

    // ---- host surface ----

    /// Apply one input, then settle anything due at the current time.
    pub fn handle(&mut self, intent: Intent) {
        tracing::trace!(?intent, now = self.now, "intent");
        match intent {
            Intent::Next => self.go_next(),
            Intent::Prev => self.go_prev(),
            Intent::Click { x } => self.click(x),
            Intent::Key { key } => match key {
                NavKey::ArrowRight | NavKey::ArrowDown => self.go_next(),
                NavKey::ArrowLeft | NavKey::ArrowUp => self.go_prev(),
            },
            Intent::SliderJump { index } => self.slider_jump(index),
            Intent::Scroll { offset } => self.scroll_to_offset(offset),
            Intent::ScrollProgress { progress } => self.scroll_to_progress(progress),
            Intent::Wheel { delta_y } => self.wheel(delta_y),
            Intent::ToggleOverview => {
                if self.state.overview {
                    self.exit_overview(None);
                } else {
                    self.enter_overview(true);
                }
            }
            Intent::OverviewSelect { id } => self.overview_select(&id),
            Intent::OverviewHover { id, on } => {
                self.affordances.hover(&mut self.registry, &id, on);
            }
            Intent::Menu { action } => self.menu(action),
            Intent::ChooseBranch { branch } => {
                if self.prompt == Some(Prompt::BranchChoice) {
                    self.close_prompt();
                    self.apply_branch(branch, true);
                }
            }
            Intent::ConfirmReload => {
                if self.prompt == Some(Prompt::Reload) {
                    self.restart();
                }
            }
            Intent::CancelReload => {
                if self.prompt == Some(Prompt::Reload) {
                    self.close_prompt();
                }
            }
            Intent::Resize { width, height } => self.resize(width, height),
        }
        self.run_until(self.now);
    }

    /// Move the clock forward by `dt_ms`, firing timers and camera settles in order.
    pub fn advance(&mut self, dt_ms: Millis) {
        let target = self.now.saturating_add(dt_ms);
        self.run_until(target);
    }

    /// Session clock in milliseconds since boot.
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Navigation flags: current index, locks, modal, overview, branch.
    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// Configuration the session was built with, viewport updated by resizes.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Active page sequence and every instance created so far.
    pub fn registry(&self) -> &PageRegistry {
        &self.registry
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    /// Camera pose at the current time, mid-move included.
    pub fn camera_pose(&self) -> CameraPose {
        self.camera.pose()
    }

    /// Which source owns the camera. Only changes while no move is running.
    pub fn camera_driver(&self) -> CameraDriver {
        self.driver
    }

    pub fn scroll(&self) -> &ScrollPathEngine {
        &self.scroll
    }

    /// Live scroll session of the current page, if it has a motion path.
    pub fn scroll_status(&self) -> Option<ScrollStatus> {
        self.scroll.status()
    }

    /// No scroll region is live; the document should not scroll.
    pub fn scroll_blocked(&self) -> bool {
        !self.scroll.is_tracking()
    }

    /// Modal prompt waiting for an answer.
    pub fn prompt(&self) -> Option<Prompt> {
        self.prompt
    }

    /// Transient message, cleared after its dismiss delay.
    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    /// Index of the current page in the active sequence.
    pub fn current(&self) -> usize {
        self.state.current
    }

    /// Index shown in the page indicator.
    pub fn display_index(&self) -> usize {
        self.state
            .special_progress_index
            .unwrap_or(self.state.current)
    }

    pub fn current_page_id(&self) -> Option<&str> {
        self.registry.id_at(self.state.current)
    }

    /// `"n / total"` for the page indicator, 1-based.
    pub fn page_info(&self) -> String {
        format!("{} / {}", self.display_index() + 1, self.registry.len())
    }

    /// Whether the next button has a page to go to.
    pub fn next_enabled(&self) -> bool {
        self.state.current + 1 < self.registry.len()
    }

    pub fn prev_enabled(&self) -> bool {
        self.state.current > 0
    }

    /// Highest index the slider may jump to.
    pub fn slider_max(&self) -> usize {
        self.registry.max_instantiated_index().unwrap_or(0)
    }

    /// The other-ending action needs a chosen branch.
    pub fn other_ending_enabled(&self) -> bool {
        self.state.branch.is_some()
    }

    /// Entry-animation offset of a page at the current time.
    pub fn page_offset(&self, id: &str) -> Vec2 {
        self.registry
            .instance(id)
            .map_or(Vec2::ZERO, |inst| inst.slide_offset(self.now))
    }

    /// Events recorded since the last drain, oldest first.
    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Serializable view of everything a host renders.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            now_ms: self.now,
            state: self.state.clone(),
            page_id: self.current_page_id().map(str::to_string),
            page_info: self.page_info(),
            next_enabled: self.next_enabled(),
            prev_enabled: self.prev_enabled(),
            camera: self.camera.pose(),
            driver: self.driver,
            scroll_blocked: self.scroll_blocked(),
            scroll: self.scroll.status(),
            prompt: self.prompt,
            toast: self.toast.clone(),
            active_pages: self.registry.len(),
            created_pages: self.registry.instance_count(),
        }
    }

    // ---- event loop ----

    pub(super) fn run_until(&mut self, target: Millis) {
        loop {
            let settle = self.camera.next_settle_due().filter(|&t| t <= target);
            let timer = self.timers.next_due().filter(|&t| t <= target);
            // Settles win ties so continuations see the camera at rest.
            match (settle, timer) {
                (Some(s), Some(t)) if t < s => self.fire_due(t),
                (Some(s), _) => {
                    self.now = self.now.max(s);
                    if let Some(id) = self.camera.tick(self.now) {
                        self.on_move_settled(id);
                    }
                }
                (None, Some(t)) => self.fire_due(t),
                (None, None) => break,
            }
        }
        self.now = self.now.max(target);
        if let Some(id) = self.camera.tick(self.now) {
            self.on_move_settled(id);
        }
    }

    fn on_move_settled(&mut self, id: MoveId) {
        let after = match self.pending_move.take() {
            Some((pending, after)) if pending == id => after,
            other => {
                self.pending_move = other;
                self.refresh_driver();
                return;
            }
        };
        self.refresh_driver();
        match after {
            AfterMove::Nothing => {}
            AfterMove::Settle { index, fresh } => self.on_page_settled(index, fresh),
            AfterMove::OverviewEntered => self.unlock(),
            AfterMove::OverviewExited { then } => {
                self.unlock();
                self.affordances.detach(&mut self.registry);
                if let Some(id) = self.current_id() {
                    dim_all_except(&mut self.registry, &id);
                }
                self.refresh_driver();
                self.events.push(SessionEvent::OverviewExited);
                if let Some(then) = then {
                    self.run_exit_then(then);
                }
            }
            AfterMove::ReplayArrived { branch } => {
                self.job = None;
                self.unlock();
                tracing::info!(?branch, "replay reached branch anchor");
                self.apply_branch(branch, true);
            }
        }
    }

    fn fire_due(&mut self, due: Millis) {
        self.now = self.now.max(due);
        if let Some((token, action)) = self.timers.pop_due(self.now) {
            self.fire(token, action);
        }
    }

    fn fire(&mut self, token: TimerToken, action: Deferred) {
        tracing::trace!(?action, now = self.now, pending = self.timers.len(), "timer fired");
        match action {
            Deferred::Unlock => {
                if self.unlock_timer == Some(token) {
                    self.unlock_timer = None;
                }
                self.state.click_locked = false;
            }
            Deferred::HideToast => {
                self.toast_timer = None;
                if self.toast.take().is_some() {
                    self.events.push(SessionEvent::ToastHidden);
                }
            }
            Deferred::JobStep => self.step_job(),
            follow_up => {
                if self.nav_timer != Some(token) {
                    return;
                }
                self.nav_timer = None;
                self.run_follow_up(follow_up);
            }
        }
    }

    /// Page-scoped moves scheduled from a settle or a scroll frame. Only the one holding
    /// `nav_timer` ever runs; any navigation in between cancels it.
    fn run_follow_up(&mut self, action: Deferred) {
        match action {
            Deferred::AutoAdvance => {
                if let Some(id) = self.current_id()
                    && let Some(inst) = self.registry.instance_mut(&id)
                {
                    inst.flags.auto_nav_scheduled = false;
                }
                if self.can_auto_advance() && self.scroll.at_max() && !self.redirect_forward() {
                    self.advance_from_current();
                }
            }
            Deferred::DegenerateAdvance | Deferred::PageAutoAdvance => {
                if self.can_auto_advance() && !self.redirect_forward() {
                    self.advance_from_current();
                }
            }
            Deferred::OpenBranchPrompt => {
                if self.state.branch.is_none()
                    && !self.state.all_pages
                    && !self.state.overview
                    && self.prompt.is_none()
                {
                    self.open_prompt(Prompt::BranchChoice);
                }
            }
            Deferred::RevealHandOff { trigger } => self.reveal_hand_off(&trigger),
            Deferred::BranchNext => self.go_next(),
            Deferred::Unlock | Deferred::HideToast | Deferred::JobStep => {}
        }
    }

    /// Schedule the follow-up move for the current page, replacing any pending one.
    pub(super) fn schedule_follow_up(&mut self, delay_ms: Millis, action: Deferred) {
        self.cancel_follow_up();
        self.nav_timer = Some(self.timers.schedule(self.now, delay_ms, action));
    }

    /// Returns `true` when a pending follow-up was dropped.
    pub(super) fn cancel_follow_up(&mut self) -> bool {
        self.nav_timer
            .take()
            .is_some_and(|t| self.timers.cancel(t))
    }

    // ---- navigation ----

    /// Transitions are ignored while locked, in overview or behind a modal.
    fn transitions_blocked(&self) -> bool {
        self.state.click_locked || self.state.overview || self.state.modal_open
    }

    fn can_auto_advance(&self) -> bool {
        !self.transitions_blocked()
            && self.job.is_none()
            && self.state.current + 1 < self.registry.len()
    }

    pub(super) fn current_id(&self) -> Option<String> {
        self.current_page_id().map(str::to_string)
    }

    fn go_next(&mut self) {
        if self.transitions_blocked() || self.job.is_some() {
            return;
        }
        if self.redirect_forward() {
            return;
        }
        if let Some(id) = self.current_id()
            && self.config.narrative.reveal_batch_for(&id).is_some()
        {
            tracing::debug!(page = %id, "manual next ignored on reveal trigger");
            return;
        }
        if self.state.current + 1 >= self.registry.len() {
            return;
        }
        self.advance_from_current();
    }

    fn go_prev(&mut self) {
        if self.transitions_blocked() || self.job.is_some() || self.state.current == 0 {
            return;
        }
        let target = self.state.current - 1;
        if !self.registry.is_instantiated(target) {
            return;
        }
        self.kill_scroll();
        self.lock();
        let dur = self.config.center_duration_ms();
        self.center_on(
            target,
            dur,
            false,
            AfterMove::Settle {
                index: target,
                fresh: false,
            },
        );
    }

    fn click(&mut self, x: f64) {
        if x < self.camera.viewport().width / 2.0 {
            self.go_prev();
        } else {
            self.go_next();
        }
    }

    /// Forward moves that turn into something else: an ending opens the overview, the branch
    /// anchor asks for a choice. Returns `true` when the move was redirected.
    pub(super) fn redirect_forward(&mut self) -> bool {
        let Some(id) = self.current_id() else {
            return true;
        };
        if let (Some(branch), Some(cfg)) = (self.state.branch, self.config.narrative.branch.as_ref())
            && self.registry.ending_of(branch, cfg).as_deref() == Some(id.as_str())
        {
            tracing::info!(?branch, page = %id, "ending reached");
            self.events.push(SessionEvent::EndingReached { branch });
            self.enter_overview(false);
            return true;
        }
        if self.state.branch.is_none()
            && !self.state.all_pages
            && self.config.narrative.is_branch_anchor(&id)
        {
            self.open_prompt(Prompt::BranchChoice);
            return true;
        }
        false
    }

    /// Step to `current + 1`, creating it when needed.
    pub(super) fn advance_from_current(&mut self) {
        let target = self.state.current + 1;
        if target >= self.registry.len() {
            return;
        }
        self.lock();
        self.kill_scroll();
        self.enter_page(target);
    }

    /// Center on `index`; a page created here slides in first.
    pub(super) fn enter_page(&mut self, index: usize) {
        let dur = self.config.center_duration_ms();
        match self.registry.ensure(index, &self.resolver) {
            Some(Ensured::Created) => {
                let (now, ease) = (self.now, self.config.ease);
                if let Some(inst) = self.registry.get_mut(index) {
                    inst.start_slide_in(now, dur, ease);
                }
                self.push_created(index);
                self.center_on(index, dur, false, AfterMove::Settle { index, fresh: true });
            }
            Some(Ensured::Existing) => {
                self.center_on(index, dur, false, AfterMove::Settle { index, fresh: false });
            }
            None => self.unlock(),
        }
    }

    /// Start the centering move for `index` and make it current.
    ///
    /// A scroll session on another page is killed first. Unless `hold_lock` is set, the click
    /// lock is released after the debounce even if the move is still running.
    pub(super) fn center_on(
        &mut self,
        index: usize,
        duration_ms: Millis,
        hold_lock: bool,
        after: AfterMove,
    ) {
        let Some(desc) = self.registry.descriptor_at(index) else {
            tracing::warn!(index, "center target outside active sequence");
            return;
        };
        let id = desc.id.clone();
        let anchor = desc.anchor_point();
        let rot = self
            .registry
            .instance(&id)
            .map_or(desc.world.rot, |inst| inst.rot);
        if self.scroll.active_page().is_some_and(|p| p != id) {
            self.kill_scroll();
        }
        self.cancel_follow_up();
        self.state.current = index;
        dim_all_except(&mut self.registry, &id);
        if !hold_lock {
            self.schedule_unlock();
        }
        let move_id = self.camera.center_on(anchor, rot, self.now, duration_ms);
        self.driver = CameraDriver::Manual;
        self.pending_move = Some((move_id, after));
        self.events.push(SessionEvent::Navigated { id, index });
    }

    fn on_page_settled(&mut self, index: usize, fresh: bool) {
        if index != self.state.current {
            return;
        }
        let Some(desc) = self.registry.descriptor_at(index) else {
            return;
        };
        let id = desc.id.clone();
        if desc.drives_scroll() {
            self.arm_scroll(index);
        }
        if fresh && let Some(delay) = self.config.narrative.auto_advance_for(&id) {
            self.schedule_follow_up(delay, Deferred::PageAutoAdvance);
        }
    }

    fn slider_jump(&mut self, index: usize) {
        if self.transitions_blocked() || self.job.is_some() {
            return;
        }
        let max = self.registry.max_instantiated_index().unwrap_or(0);
        if index > max {
            self.slider_rejections += 1;
            tracing::debug!(index, max, rejections = self.slider_rejections, "slider jump rejected");
            if self.slider_rejections >= self.config.slider_warning_threshold {
                self.slider_rejections = 0;
                self.show_toast(SLIDER_WARNING);
            }
            return;
        }
        self.slider_rejections = 0;
        if index == self.state.current || !self.registry.is_instantiated(index) {
            return;
        }
        self.kill_scroll();
        self.lock();
        let dur = self.config.center_duration_ms();
        self.center_on(index, dur, false, AfterMove::Settle { index, fresh: false });
    }

    fn resize(&mut self, width: f64, height: f64) {
        let viewport = match Viewport::new(width, height) {
            Ok(vp) => vp,
            Err(err) => {
                tracing::warn!(%err, "resize ignored");
                return;
            }
        };
        self.config.viewport = viewport;
        self.camera.set_viewport(viewport);
        let relaid = self.scroll.relayout(viewport);
        if self.camera.is_animating() {
            return;
        }
        if self.state.overview {
            if let Some(bounds) = self.overview_bounds() {
                let pose = self.camera.overview_pose(&bounds, self.config.overview_fill);
                self.camera.set_immediate(pose);
            }
        } else if relaid.is_some() {
            if let Some(p) = self.scroll.progress() {
                self.scroll_to_progress(p);
            }
        } else if let Some(desc) = self.registry.descriptor_at(self.state.current) {
            // Same page, new viewport center: no navigation side effects.
            let rot = self
                .registry
                .instance(&desc.id)
                .map_or(desc.world.rot, |inst| inst.rot);
            let pose = self.camera.centered_pose(desc.anchor_point(), rot);
            self.camera.set_immediate(pose);
        }
    }

    // ---- overview ----

    fn overview_bounds(&self) -> Option<WorldBounds> {
        self.registry
            .instantiated_bounds()
            .or_else(|| self.dataset.world_bounds())
    }

    pub(super) fn enter_overview(&mut self, highlight: bool) {
        if self.state.overview || self.job.is_some() {
            return;
        }
        let Some(bounds) = self.overview_bounds() else {
            return;
        };
        self.kill_scroll();
        self.state.overview = true;
        self.lock();
        self.camera.save_pose();
        let target = self.camera.overview_pose(&bounds, self.config.overview_fill);
        let focus = highlight.then(|| self.current_id()).flatten();
        self.affordances
            .attach(&mut self.registry, &self.resolver, focus.as_deref());
        let id = self
            .camera
            .animate(target, self.now, self.config.overview_duration_ms());
        self.driver = CameraDriver::Overview;
        self.pending_move = Some((id, AfterMove::OverviewEntered));
        tracing::debug!(scale = target.scale, "entering overview");
        self.events.push(SessionEvent::OverviewEntered);
    }

    pub(super) fn exit_overview(&mut self, then: Option<ExitThen>) {
        if !self.state.overview {
            if let Some(then) = then {
                self.run_exit_then(then);
            }
            return;
        }
        self.state.overview = false;
        self.lock();
        let target = match self.camera.take_saved() {
            Some(pose) => pose,
            None => {
                let anchor = self
                    .registry
                    .descriptor_at(self.state.current)
                    .map(|d| (d.anchor_point(), d.world.rot));
                let mut pose = match anchor {
                    Some((p, rot)) => self.camera.centered_pose(p, rot),
                    None => self.camera.pose(),
                };
                pose.scale = self.config.base_view_scale;
                pose
            }
        };
        let id = self
            .camera
            .animate(target, self.now, self.config.overview_duration_ms());
        self.driver = CameraDriver::Overview;
        self.pending_move = Some((id, AfterMove::OverviewExited { then }));
    }

    fn run_exit_then(&mut self, then: ExitThen) {
        match then {
            ExitThen::CenterOn(index) => {
                self.lock();
                let dur = self.config.center_duration_ms();
                self.center_on(index, dur, false, AfterMove::Settle { index, fresh: false });
            }
            ExitThen::OtherEnding => self.other_ending(),
            ExitThen::AllPages => self.start_all_pages(),
        }
    }

    fn overview_select(&mut self, id: &str) {
        if !self.state.overview || self.state.click_locked || self.job.is_some() {
            return;
        }
        let Some(index) = self.registry.index_of(id) else {
            tracing::debug!(page = %id, "overview click on unreachable page");
            return;
        };
        if !self.registry.is_instantiated(index) {
            return;
        }
        self.exit_overview(Some(ExitThen::CenterOn(index)));
    }

    // ---- menu, prompts, branch ----

    fn menu(&mut self, action: MenuAction) {
        if self.job.is_some() || self.state.modal_open {
            return;
        }
        tracing::debug!(?action, "menu");
        match action {
            MenuAction::Overview => self.enter_overview(true),
            MenuAction::CloseUp => self.exit_overview(None),
            MenuAction::Restart => self.open_prompt(Prompt::Reload),
            MenuAction::OtherEnding => self.exit_overview(Some(ExitThen::OtherEnding)),
            MenuAction::AllPages => self.exit_overview(Some(ExitThen::AllPages)),
        }
    }

    fn other_ending(&mut self) {
        match self.state.branch {
            Some(branch) => self.start_replay(branch.other()),
            None => self.open_prompt(Prompt::BranchChoice),
        }
    }

    pub(super) fn open_prompt(&mut self, prompt: Prompt) {
        if prompt == Prompt::BranchChoice && self.config.narrative.branch.is_none() {
            return;
        }
        self.cancel_follow_up();
        self.state.modal_open = true;
        self.prompt = Some(prompt);
        self.events.push(SessionEvent::PromptOpened { prompt });
    }

    fn close_prompt(&mut self) {
        self.state.modal_open = false;
        if let Some(prompt) = self.prompt.take() {
            self.events.push(SessionEvent::PromptClosed { prompt });
        }
    }

    /// Rebuild the active sequence for `branch` and clamp the current index into it.
    pub(super) fn apply_branch(&mut self, branch: Branch, auto_next: bool) {
        let Some(cfg) = self.config.narrative.branch.clone() else {
            return;
        };
        if !self.registry.select_branch(branch, &cfg) {
            return;
        }
        self.kill_scroll();
        self.state.branch = Some(branch);
        let last = self.registry.len().saturating_sub(1);
        if self.state.current > last {
            self.state.current = last;
        }
        tracing::info!(?branch, pages = self.registry.len(), "branch selected");
        self.events.push(SessionEvent::BranchSelected { branch });
        if auto_next
            && let Some(anchor) = self.registry.index_of(&cfg.anchor)
            && anchor + 1 < self.registry.len()
        {
            self.schedule_follow_up(self.config.branch_advance_delay_ms, Deferred::BranchNext);
        }
    }

    fn restart(&mut self) {
        tracing::info!("session restart");
        let mut fresh = Self::build(
            Arc::clone(&self.dataset),
            self.config.clone(),
            Arc::clone(&self.resolver),
            self.now,
        );
        fresh.events.push(SessionEvent::Reloaded);
        fresh.boot();
        *self = fresh;
    }

    fn show_toast(&mut self, message: &str) {
        if let Some(t) = self.toast_timer.take() {
            self.timers.cancel(t);
        }
        self.toast = Some(Toast {
            message: message.to_string(),
            shown_at: self.now,
        });
        self.toast_timer = Some(self.timers.schedule(
            self.now,
            self.config.toast_dismiss_ms,
            Deferred::HideToast,
        ));
        self.events.push(SessionEvent::ToastShown {
            message: message.to_string(),
        });
    }

    // ---- lock & driver bookkeeping ----

    pub(super) fn lock(&mut self) {
        self.state.click_locked = true;
        if let Some(t) = self.unlock_timer.take() {
            self.timers.cancel(t);
        }
    }

    pub(super) fn unlock(&mut self) {
        self.state.click_locked = false;
        if let Some(t) = self.unlock_timer.take() {
            self.timers.cancel(t);
        }
    }

    fn schedule_unlock(&mut self) {
        if let Some(t) = self.unlock_timer.take() {
            self.timers.cancel(t);
        }
        self.unlock_timer = Some(self.timers.schedule(
            self.now,
            self.config.unlock_debounce_ms,
            Deferred::Unlock,
        ));
    }

    pub(super) fn refresh_driver(&mut self) {
        if self.camera.is_animating() {
            return;
        }
        self.driver = if self.state.overview {
            CameraDriver::Overview
        } else if self.scroll.is_tracking() {
            CameraDriver::ScrollPath
        } else {
            CameraDriver::Idle
        };
    }

    pub(super) fn push_created(&mut self, index: usize) {
        if let Some(id) = self.registry.id_at(index) {
            self.events.push(SessionEvent::PageCreated {
                id: id.to_string(),
                index,
            });
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/navigation/session.rs"]
mod tests;

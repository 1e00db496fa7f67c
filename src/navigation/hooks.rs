//! Scroll-driven behavior layered on the navigation session: arming a page's path, applying
//! each progress frame to the camera, reveal batches and the at-max auto-advance.

use crate::{
    camera::{overview::dim_all_except, pose::CameraPose},
    config::RevealBatch,
    foundation::core::Point,
    navigation::{
        intent::SessionEvent,
        session::{CameraDriver, Deferred, Session},
    },
    registry::Ensured,
    scroll::engine::{ArmOutcome, ScrollFrame},
};

impl Session {
    /// Arm the motion path of the page at `index`, which the camera has just settled on.
    pub(super) fn arm_scroll(&mut self, index: usize) {
        let Some(desc) = self.registry.descriptor_at(index) else {
            return;
        };
        let id = desc.id.clone();
        let center = self
            .registry
            .instance(&id)
            .map_or(desc.center(), |inst| inst.center);
        match self.scroll.arm(desc, center, index) {
            ArmOutcome::NoPath => {}
            ArmOutcome::Degenerate { anchor } => self.settle_degenerate(index, &id, anchor),
            ArmOutcome::Armed => {
                if let Some(batch) = self.config.narrative.reveal_batch_for(&id).cloned() {
                    self.prepare_batch(&batch);
                }
                self.scroll.attach(self.camera.viewport());
                self.scroll_offset = 0.0;
                if let Some(inst) = self.registry.instance_mut(&id) {
                    inst.flags.scroll_done = false;
                }
                self.unlock();
                self.refresh_driver();
                self.events.push(SessionEvent::ScrollArmed { id });
            }
        }
    }

    /// A path too short to follow: look at its first point and move on after a pause.
    fn settle_degenerate(&mut self, index: usize, id: &str, anchor: Point) {
        tracing::debug!(page = %id, x = anchor.x, y = anchor.y, "degenerate scroll path");
        self.unlock();
        let Some(delay) = self.config.degenerate_auto_advance_ms else {
            return;
        };
        if !self.state.modal_open && index + 1 < self.registry.len() {
            self.schedule_follow_up(delay, Deferred::DegenerateAdvance);
        }
    }

    /// Tear down the live scroll session, if any. Safe to call repeatedly.
    ///
    /// Whatever follow-up the page had pending is cancelled with it.
    pub(super) fn kill_scroll(&mut self) {
        let cancelled = self.cancel_follow_up();
        let id = self.scroll.active_page().map(str::to_string);
        if !self.scroll.kill() {
            return;
        }
        self.scroll_offset = 0.0;
        self.state.special_progress_index = None;
        if let Some(id) = id {
            if let Some(inst) = self.registry.instance_mut(&id) {
                inst.flags.auto_nav_scheduled = false;
                // A prompt or hand-off that never ran may be scheduled again on a later visit.
                if cancelled {
                    inst.flags.choice_prompted = false;
                    inst.flags.advance_scheduled = false;
                }
            }
            self.events.push(SessionEvent::ScrollKilled { id });
        }
        self.refresh_driver();
    }

    pub(super) fn scroll_to_offset(&mut self, offset: f64) {
        let Some(region) = self.scroll.region() else {
            return;
        };
        if !self.scroll.is_tracking() {
            return;
        }
        let offset = offset.clamp(0.0, region.max_offset());
        self.scroll_offset = offset;
        if let Some(frame) = self.scroll.update(offset, self.camera.viewport()) {
            self.apply_frame(frame);
        }
    }

    pub(super) fn scroll_to_progress(&mut self, progress: f64) {
        let Some(region) = self.scroll.region() else {
            return;
        };
        self.scroll_offset = region.offset_for(progress);
        if let Some(frame) = self.scroll.update_progress(progress, self.camera.viewport()) {
            self.apply_frame(frame);
        }
    }

    /// Downward wheel at the end of a path moves on; otherwise the wheel scrolls the region.
    pub(super) fn wheel(&mut self, delta_y: f64) {
        if delta_y > 0.0 && self.overflow_armed() {
            if self.state.click_locked
                || self.state.modal_open
                || self.state.overview
                || self.state.current + 1 >= self.registry.len()
            {
                return;
            }
            tracing::debug!(page = self.state.current, "overflow wheel advance");
            self.advance_from_current();
            return;
        }
        if self.scroll.is_tracking() {
            self.scroll_to_offset(self.scroll_offset + delta_y);
        }
    }

    /// At max on a page whose end is not claimed by the branch prompt or a reveal batch.
    fn overflow_armed(&self) -> bool {
        if !self.scroll.at_max() {
            return false;
        }
        let Some(id) = self.scroll.active_page() else {
            return false;
        };
        let narrative = &self.config.narrative;
        !narrative.is_branch_anchor(id) && narrative.reveal_batch_for(id).is_none()
    }

    fn apply_frame(&mut self, frame: ScrollFrame) {
        let Some(id) = self.scroll.active_page().map(str::to_string) else {
            return;
        };
        let Some(index) = self.registry.index_of(&id) else {
            return;
        };
        let scale = self.camera.pose().scale;
        self.camera.set_immediate(CameraPose::new(
            frame.translation.x,
            frame.translation.y,
            frame.rotation_deg,
            scale,
        ));
        self.driver = CameraDriver::ScrollPath;
        if let Some(inst) = self.registry.instance_mut(&id) {
            inst.live_rot = frame.live_rot;
        }

        let batch = self.config.narrative.reveal_batch_for(&id).cloned();
        if let Some(batch) = &batch {
            self.reveal_progress(batch, frame.progress);
        }

        if frame.done {
            if let Some(inst) = self.registry.instance_mut(&id) {
                inst.flags.scroll_done = true;
            }
            self.unlock();
            if frame.done_reached {
                tracing::debug!(page = %id, "scroll done");
                self.events.push(SessionEvent::ScrollDone { id: id.clone() });
            }
            if let Some(batch) = &batch {
                self.maybe_hand_off(batch, &id, frame.progress);
            }
        }

        if self.config.narrative.is_branch_anchor(&id) {
            self.maybe_prompt_branch(&id, frame.progress);
        } else if batch.is_none() {
            if frame.reached_max {
                self.schedule_auto_advance(index, &id);
            } else if frame.left_max {
                self.cancel_follow_up();
                if let Some(inst) = self.registry.instance_mut(&id) {
                    inst.flags.auto_nav_scheduled = false;
                }
            }
        }
    }

    fn schedule_auto_advance(&mut self, index: usize, id: &str) {
        if self.state.click_locked
            || self.state.modal_open
            || index + 1 >= self.registry.len()
        {
            return;
        }
        let Some(inst) = self.registry.instance_mut(id) else {
            return;
        };
        if inst.flags.auto_nav_scheduled {
            return;
        }
        inst.flags.auto_nav_scheduled = true;
        self.schedule_follow_up(self.config.auto_advance_ms, Deferred::AutoAdvance);
    }

    fn maybe_prompt_branch(&mut self, id: &str, progress: f64) {
        if progress < self.config.scroll.max_threshold
            || self.state.branch.is_some()
            || self.state.all_pages
        {
            return;
        }
        let Some(inst) = self.registry.instance_mut(id) else {
            return;
        };
        if inst.flags.choice_prompted {
            return;
        }
        inst.flags.choice_prompted = true;
        self.schedule_follow_up(self.config.modal_delay_ms, Deferred::OpenBranchPrompt);
    }

    /// Instantiate a batch's pages hidden. Runs once per batch; later arms keep what was
    /// already revealed.
    fn prepare_batch(&mut self, batch: &RevealBatch) {
        if !self.prepared_batches.insert(batch.trigger.clone()) {
            return;
        }
        self.resolver.preload(batch.pages.as_slice());
        for pid in &batch.pages {
            let Some(index) = self.registry.index_of(pid) else {
                tracing::warn!(page = %pid, trigger = %batch.trigger, "reveal page not in active sequence");
                continue;
            };
            if self.registry.ensure(index, &self.resolver) == Some(Ensured::Created) {
                self.push_created(index);
            }
            if let Some(inst) = self.registry.instance_mut(pid) {
                inst.flags.sequence_member = true;
                inst.flags.visible = false;
            }
        }
        tracing::debug!(trigger = %batch.trigger, pages = batch.pages.len(), "reveal batch prepared");
    }

    fn reveal_progress(&mut self, batch: &RevealBatch, progress: f64) {
        let mut last_shown: Option<(usize, &str)> = None;
        for (i, pid) in batch.pages.iter().enumerate() {
            if progress < batch.threshold(i) {
                continue;
            }
            let Some(index) = self.registry.index_of(pid) else {
                continue;
            };
            let Some(inst) = self.registry.instance_mut(pid) else {
                continue;
            };
            if !inst.flags.visible {
                inst.flags.visible = true;
                self.events
                    .push(SessionEvent::PageRevealed { id: pid.clone() });
            }
            last_shown = Some((index, pid));
        }
        let Some((index, pid)) = last_shown else {
            return;
        };
        if self.state.special_progress_index != Some(index) {
            self.state.special_progress_index = Some(index);
            dim_all_except(&mut self.registry, pid);
        }
        let is_last = batch.pages.last().is_some_and(|l| l == pid);
        if is_last && progress >= batch.unlock_at {
            self.unlock();
        }
    }

    fn maybe_hand_off(&mut self, batch: &RevealBatch, trigger: &str, progress: f64) {
        if progress < batch.advance_after || batch.advance_to.is_none() {
            return;
        }
        let last_visible = batch
            .pages
            .last()
            .and_then(|l| self.registry.instance(l))
            .is_some_and(|inst| inst.flags.visible);
        if !last_visible {
            return;
        }
        let Some(inst) = self.registry.instance_mut(trigger) else {
            return;
        };
        if inst.flags.advance_scheduled {
            return;
        }
        inst.flags.advance_scheduled = true;
        self.schedule_follow_up(
            batch.advance_delay_ms,
            Deferred::RevealHandOff {
                trigger: trigger.to_string(),
            },
        );
    }

    /// Leave a finished reveal batch for its configured follow-up page.
    pub(super) fn reveal_hand_off(&mut self, trigger: &str) {
        if self.state.click_locked || self.state.modal_open || self.state.overview {
            return;
        }
        if self.current_page_id() != Some(trigger) {
            return;
        }
        let Some(target) = self
            .config
            .narrative
            .reveal_batch_for(trigger)
            .and_then(|b| b.advance_to.as_deref())
            .and_then(|id| self.registry.index_of(id))
        else {
            tracing::warn!(trigger = %trigger, "reveal hand-off target not in active sequence");
            return;
        };
        tracing::debug!(trigger = %trigger, target, "reveal batch hand-off");
        self.lock();
        self.kill_scroll();
        self.enter_page(target);
    }
}

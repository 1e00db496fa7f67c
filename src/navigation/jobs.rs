//! Multi-step operations that hold the click lock and yield to the timer queue between steps.

use crate::{
    camera::overview::dim_all_except,
    config::Branch,
    navigation::{
        intent::SessionEvent,
        session::{AfterMove, Deferred, Session},
    },
    registry::Ensured,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Job {
    /// Create every remaining page of the active sequence, one per step.
    AllPages { next: usize },
    /// Walk forward to the branch anchor, then take `branch`.
    Replay { branch: Branch, anchor: usize },
}

impl Session {
    pub(super) fn step_job(&mut self) {
        match self.job {
            Some(Job::AllPages { next }) => self.step_all_pages(next),
            Some(Job::Replay { branch, anchor }) => self.step_replay(branch, anchor),
            None => {}
        }
    }

    #[tracing::instrument(skip_all)]
    pub(super) fn start_all_pages(&mut self) {
        if self.job.is_some() || self.state.overview {
            return;
        }
        self.kill_scroll();
        self.lock();
        self.state.all_pages = true;
        if self.state.branch.is_none()
            && let Some(default) = self.config.narrative.branch.as_ref().map(|b| b.default_branch)
        {
            self.apply_branch(default, false);
        }

        let start = self.state.current + 1;
        let pending: Vec<String> = (start..self.registry.len())
            .filter(|&i| !self.registry.is_instantiated(i))
            .filter_map(|i| self.registry.descriptor_at(i))
            .filter(|d| !d.kind.is_blank())
            .map(|d| d.id.clone())
            .collect();
        self.resolver.preload(pending.as_slice());
        tracing::info!(pending = pending.len(), "generating remaining pages");

        self.job = Some(Job::AllPages { next: start });
        self.step_all_pages(start);
    }

    fn step_all_pages(&mut self, next: usize) {
        let total = self.registry.len();
        let mut index = next;
        while index < total && self.registry.is_instantiated(index) {
            index += 1;
        }
        if index >= total {
            self.finish_all_pages();
            return;
        }
        if self.registry.ensure(index, &self.resolver) == Some(Ensured::Created) {
            self.push_created(index);
        }
        self.job = Some(Job::AllPages { next: index + 1 });
        self.events.push(SessionEvent::AllPagesProgress {
            created: index + 1,
            total,
        });
        self.timers
            .schedule(self.now, self.config.all_pages_yield_ms, Deferred::JobStep);
    }

    fn finish_all_pages(&mut self) {
        let batch_pages: Vec<String> = self
            .config
            .narrative
            .reveal_batches
            .iter()
            .flat_map(|b| b.pages.iter().cloned())
            .collect();
        for id in &batch_pages {
            if let Some(inst) = self.registry.instance_mut(id) {
                inst.flags.visible = true;
            }
        }
        self.job = None;
        self.state.all_pages = false;
        self.unlock();
        if let Some(id) = self.current_id() {
            dim_all_except(&mut self.registry, &id);
        }
        tracing::info!(pages = self.registry.instance_count(), "all pages generated");
        self.events.push(SessionEvent::AllPagesComplete);
    }

    /// Re-walk the reading order up to the branch anchor and take `branch` there.
    #[tracing::instrument(skip(self))]
    pub(super) fn start_replay(&mut self, branch: Branch) {
        if self.job.is_some() {
            return;
        }
        let Some(anchor) = self
            .config
            .narrative
            .branch
            .as_ref()
            .and_then(|cfg| self.registry.index_of(&cfg.anchor))
        else {
            tracing::warn!("branch anchor not in active sequence, replay skipped");
            return;
        };
        self.kill_scroll();
        self.lock();
        self.job = Some(Job::Replay { branch, anchor });
        self.step_replay(branch, anchor);
    }

    fn step_replay(&mut self, branch: Branch, anchor: usize) {
        while self.state.current < anchor {
            let next = self.state.current + 1;
            match self.registry.ensure(next, &self.resolver) {
                Some(Ensured::Existing) => self.state.current = next,
                Some(Ensured::Created) => {
                    self.push_created(next);
                    self.center_on(next, 0, true, AfterMove::Nothing);
                    self.timers
                        .schedule(self.now, self.config.replay_step_ms, Deferred::JobStep);
                    return;
                }
                None => break,
            }
        }
        let dur = self.config.center_duration_ms();
        self.center_on(anchor, dur, true, AfterMove::ReplayArrived { branch });
    }
}

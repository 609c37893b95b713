//! Drag-driven frame loop and the scheduler seam it runs on.
//!
//! A view only animates while a drag is in progress. Pointer-down starts the
//! loop by requesting one presentation-synchronized callback; every tick
//! requests the next one after drawing; pointer-up cancels whatever callback
//! is still outstanding.

use std::collections::VecDeque;

/// Identifies one requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// Source of presentation-synchronized frame callbacks.
pub trait FrameScheduler {
    /// Requests one callback and returns its token.
    fn request_frame(&mut self) -> FrameToken;

    /// Withdraws a requested callback. Unknown tokens are ignored.
    fn cancel_frame(&mut self, token: FrameToken);
}

/// Whether a view is animating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// No callback scheduled.
    #[default]
    Idle,
    /// Drag in progress. `pending` is `None` only while a tick is running.
    Dragging { pending: Option<FrameToken> },
}

/// The per-view frame loop.
#[derive(Debug, Clone, Default)]
pub struct FrameLoop {
    state: LoopState,
}

impl FrameLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// The outstanding callback, `None` when nothing is scheduled.
    ///
    /// This is also `None` while a tick runs, between [`Self::begin_tick`]
    /// and [`Self::finish_tick`]; use [`Self::is_active`] to test for idle.
    #[must_use]
    pub fn handle(&self) -> Option<FrameToken> {
        match self.state {
            LoopState::Idle => None,
            LoopState::Dragging { pending } => pending,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, LoopState::Dragging { .. })
    }

    /// Starts animating. Returns `false` if a loop was already running.
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) -> bool {
        if self.is_active() {
            return false;
        }
        let token = scheduler.request_frame();
        log::debug!("frame loop started ({token:?})");
        self.state = LoopState::Dragging {
            pending: Some(token),
        };
        true
    }

    /// Stops animating and cancels the outstanding callback. Safe when idle.
    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) {
        if let LoopState::Dragging { pending } = self.state {
            if let Some(token) = pending {
                scheduler.cancel_frame(token);
            }
            log::debug!("frame loop stopped");
        }
        self.state = LoopState::Idle;
    }

    /// Claims a fired callback. Returns `true` if `token` is the outstanding
    /// one and the caller should run a tick; stale tokens are rejected.
    pub fn begin_tick(&mut self, token: FrameToken) -> bool {
        match self.state {
            LoopState::Dragging {
                pending: Some(pending),
            } if pending == token => {
                self.state = LoopState::Dragging { pending: None };
                true
            }
            _ => false,
        }
    }

    /// Requests the next callback after a tick has drawn.
    pub fn finish_tick(&mut self, scheduler: &mut dyn FrameScheduler) {
        if let LoopState::Dragging { pending: None } = self.state {
            self.state = LoopState::Dragging {
                pending: Some(scheduler.request_frame()),
            };
        }
    }
}

/// Deterministic scheduler for headless hosts and tests: callbacks fire
/// only when [`ManualScheduler::step`] is called.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    queue: VecDeque<FrameToken>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires every callback requested so far, oldest first.
    pub fn step(&mut self) -> Vec<FrameToken> {
        self.queue.drain(..).collect()
    }

    /// Number of callbacks waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameToken {
        self.next_id += 1;
        let token = FrameToken(self.next_id);
        self.queue.push_back(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        self.queue.retain(|&queued| queued != token);
    }
}

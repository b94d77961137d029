use crate::surface::DirtyReasons;

/// Render state of a program.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameState {
    #[default]
    Idle,
    /// One render is queued; further invalidations fold into it.
    Scheduled,
    Rendering,
}

/// Dirty-flag, single-flight render loop.
///
/// `Idle -> Scheduled -> Rendering -> Idle`. Invalidations collapse into one scheduled render;
/// an invalidation that lands mid-render schedules exactly one more.
#[derive(Clone, Debug, Default)]
pub struct FrameLoop {
    state: FrameState,
    pending: DirtyReasons,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn is_scheduled(&self) -> bool {
        self.state == FrameState::Scheduled
    }

    /// Record `reasons`. Returns `true` when this call moved the loop out of `Idle`.
    pub fn invalidate(&mut self, reasons: DirtyReasons) -> bool {
        self.pending.merge(reasons);
        match self.state {
            FrameState::Idle => {
                self.state = FrameState::Scheduled;
                true
            }
            FrameState::Scheduled | FrameState::Rendering => false,
        }
    }

    /// Enter `Rendering` and hand out the accumulated reasons, or `None` when nothing is queued.
    pub fn begin(&mut self) -> Option<DirtyReasons> {
        if self.state != FrameState::Scheduled {
            return None;
        }
        self.state = FrameState::Rendering;
        Some(std::mem::take(&mut self.pending))
    }

    /// Leave `Rendering`; reschedules when invalidated meanwhile.
    pub fn finish(&mut self) {
        if self.state != FrameState::Rendering {
            return;
        }
        self.state = if self.pending.any() {
            FrameState::Scheduled
        } else {
            FrameState::Idle
        };
    }

    /// Drop any queued work.
    pub fn cancel(&mut self) {
        self.state = FrameState::Idle;
        self.pending = DirtyReasons::default();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/program/frame_loop.rs"]
mod tests;

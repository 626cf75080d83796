//! Start/stop bookkeeping for the per-frame draw cycle.
//!
//! The host drives ticks from its frame callback (winit `RedrawRequested`);
//! this type decides whether a tick draws. Once stopped a loop never draws
//! again, a new session brings a new loop.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug)]
pub struct RenderLoop {
    state: LoopState,
    frames: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Idle,
            frames: 0,
        }
    }

    pub fn start(&mut self) {
        if self.state == LoopState::Idle {
            self.state = LoopState::Running;
        }
    }

    pub fn stop(&mut self) {
        self.state = LoopState::Stopped;
    }

    #[inline]
    pub fn state(&self) -> LoopState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Frames drawn so far.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Issues exactly one draw if running. Returns whether it drew.
    pub fn tick(&mut self, draw: impl FnOnce()) -> bool {
        if !self.is_running() {
            return false;
        }
        draw();
        self.frames += 1;
        true
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_loop_does_not_draw() {
        let mut lp = RenderLoop::new();
        let mut draws = 0;
        assert!(!lp.tick(|| draws += 1));
        assert_eq!(draws, 0);
        assert_eq!(lp.state(), LoopState::Idle);
    }

    #[test]
    fn one_draw_per_tick_while_running() {
        let mut lp = RenderLoop::new();
        lp.start();
        let mut draws = 0;
        for _ in 0..5 {
            assert!(lp.tick(|| draws += 1));
        }
        assert_eq!(draws, 5);
        assert_eq!(lp.frames(), 5);
    }

    #[test]
    fn stopped_loop_never_restarts() {
        let mut lp = RenderLoop::new();
        lp.start();
        lp.stop();
        lp.start();

        let mut draws = 0;
        assert!(!lp.tick(|| draws += 1));
        assert_eq!(draws, 0);
        assert_eq!(lp.state(), LoopState::Stopped);
    }
}

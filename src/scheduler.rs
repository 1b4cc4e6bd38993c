use crate::errors::{BufferError, SchedulerError};
use crate::frame_clock::{FrameClock, FrameTiming};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Uninitialized,
    // Slot 0 still holds the uploaded seed; nothing has been captured yet.
    FirstFrame,
    SteadyState,
}

/// Where a frame's draw takes its particle count from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawSource {
    // The host-known seed count, used once.
    Seeded { count: u32 },
    // However many records the previous frame captured into `source`.
    Captured { source: usize },
}

/// The GPU side of one frame, as seen by the scheduler.
///
/// Calls arrive in a fixed order: `write_uniforms`, `clear`, `begin_capture`,
/// `draw`, `end_capture`, `swap`.
pub trait FeedbackTarget {
    /// Records each slot can hold.
    fn capacity(&self) -> u32;
    fn active_index(&self) -> usize;
    fn other_index(&self) -> usize;
    fn write_uniforms(&mut self, timing: &FrameTiming);
    fn clear(&mut self);
    fn begin_capture(&mut self, source: usize, target: usize);
    fn draw(&mut self, draw: DrawSource);
    fn end_capture(&mut self);
    fn swap(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub timing: FrameTiming,
    pub draw: DrawSource,
    pub source: usize,
    pub target: usize,
}

#[derive(Debug)]
pub struct FrameScheduler {
    state: SchedulerState,
    clock: Option<FrameClock>,
    capacity: u32,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        FrameScheduler::new()
    }
}

impl FrameScheduler {
    pub fn new() -> Self {
        FrameScheduler {
            state: SchedulerState::Uninitialized,
            clock: None,
            capacity: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn initialize(&mut self, capacity: u32, now: f64) -> Result<(), SchedulerError> {
        if capacity == 0 {
            return Err(BufferError::EmptyCapacity.into());
        }
        self.capacity = capacity;
        self.clock = Some(FrameClock::start(now));
        self.state = SchedulerState::FirstFrame;
        Ok(())
    }

    /// Advances the simulation by one frame and draws it.
    ///
    /// Afterwards the buffer that was "other" is active and holds this frame's state.
    pub fn step<T: FeedbackTarget>(
        &mut self,
        now: f64,
        target: &mut T,
    ) -> Result<FrameReport, SchedulerError> {
        let clock = self.clock.as_mut().ok_or(SchedulerError::NotInitialized)?;
        if self.capacity > target.capacity() {
            return Err(SchedulerError::CapacityExceeded {
                scheduled: self.capacity,
                available: target.capacity(),
            });
        }
        let timing = clock.tick(now);

        let source = target.active_index();
        let destination = target.other_index();
        target.write_uniforms(&timing);
        target.clear();
        target.begin_capture(source, destination);
        let draw = match self.state {
            SchedulerState::FirstFrame => DrawSource::Seeded {
                count: self.capacity,
            },
            _ => DrawSource::Captured { source },
        };
        target.draw(draw);
        target.end_capture();
        target.swap();

        if self.state == SchedulerState::FirstFrame {
            log::debug!("First frame drawn from {} seeded particles", self.capacity);
            self.state = SchedulerState::SteadyState;
        }
        Ok(FrameReport {
            timing,
            draw,
            source,
            target: destination,
        })
    }
}

//! A `FeedbackTarget` that runs an update kernel on the host.
//!
//! It keeps the same two-slot layout and the same captured-count bookkeeping
//! as the GPU path, which makes whole-frame behavior checkable in plain tests.

use crate::buffer_pair::{seeded_contents, BufferPair};
use crate::errors::BufferError;
use crate::frame_clock::FrameTiming;
use crate::kernel::UpdateKernel;
use crate::particle::Particle;
use crate::scheduler::{DrawSource, FeedbackTarget};

#[derive(Debug, Clone, Default)]
struct CpuSlot {
    particles: Vec<Particle>,
    // Number of records written by the last capture pass into this slot.
    captured: u32,
}

pub struct CpuFeedback<K: UpdateKernel> {
    kernel: K,
    buffers: BufferPair<CpuSlot>,
    timing: FrameTiming,
    capture: Option<(usize, usize)>,
    draw: Option<DrawSource>,
    last_drawn: Vec<Particle>,
}

impl<K: UpdateKernel> CpuFeedback<K> {
    pub fn initialize(kernel: K, capacity: u32, seed: &[Particle]) -> Result<Self, BufferError> {
        let seeded = seeded_contents(capacity, seed)?;
        let zeroed = vec![Particle::default(); capacity as usize];
        Ok(CpuFeedback {
            kernel,
            buffers: BufferPair::new(
                CpuSlot {
                    particles: seeded,
                    captured: 0,
                },
                CpuSlot {
                    particles: zeroed,
                    captured: 0,
                },
            ),
            timing: FrameTiming {
                time: 0.0,
                delta: 0.0,
            },
            capture: None,
            draw: None,
            last_drawn: vec![],
        })
    }

    /// The records the active slot holds, i.e. the state after the last step.
    pub fn active_particles(&self) -> &[Particle] {
        &self.buffers.active().particles
    }

    pub fn captured_count(&self, slot: usize) -> u32 {
        self.buffers.slot(slot).captured
    }

    /// The input records replayed by the most recent draw.
    pub fn last_drawn(&self) -> &[Particle] {
        &self.last_drawn
    }
}

impl<K: UpdateKernel> FeedbackTarget for CpuFeedback<K> {
    fn capacity(&self) -> u32 {
        self.buffers.active().particles.len() as u32
    }

    fn active_index(&self) -> usize {
        self.buffers.active_index()
    }

    fn other_index(&self) -> usize {
        self.buffers.other_index()
    }

    fn write_uniforms(&mut self, timing: &FrameTiming) {
        self.timing = *timing;
    }

    fn clear(&mut self) {}

    fn begin_capture(&mut self, source: usize, target: usize) {
        self.buffers.slot_mut(target).captured = 0;
        self.capture = Some((source, target));
    }

    fn draw(&mut self, draw: DrawSource) {
        self.draw = Some(draw);
    }

    fn end_capture(&mut self) {
        let (source, target) = match self.capture.take() {
            Some(roles) => roles,
            None => return,
        };
        let count = match self.draw.take() {
            Some(DrawSource::Seeded { count }) => count,
            Some(DrawSource::Captured { source }) => self.buffers.slot(source).captured,
            None => return,
        };
        let input = &self.buffers.slot(source).particles[..count as usize];
        let time = self.timing.time as f32;
        let dt = self.timing.delta as f32;
        let output: Vec<Particle> = input
            .iter()
            .enumerate()
            .map(|(index, particle)| self.kernel.update(particle, index as u32, time, dt))
            .collect();
        self.last_drawn = input.to_vec();

        let slot = self.buffers.slot_mut(target);
        slot.particles[..output.len()].copy_from_slice(&output);
        slot.captured = output.len() as u32;
    }

    fn swap(&mut self) {
        self.buffers.swap();
    }
}

use crate::buffer_util::{make_buffer_init, SizedBuffer};
use crate::errors::BufferError;
use crate::particle::Particle;
use crate::program::ParticleProgram;

/// Two slots, one read from ("active") and one written to ("other") each frame.
#[derive(Debug, Clone)]
pub struct BufferPair<T> {
    slots: [T; 2],
    active: usize,
}

impl<T> BufferPair<T> {
    pub fn new(first: T, second: T) -> Self {
        BufferPair {
            slots: [first, second],
            active: 0,
        }
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn other_index(&self) -> usize {
        !self.active & 1
    }

    pub fn active(&self) -> &T {
        &self.slots[self.active_index()]
    }

    pub fn other(&self) -> &T {
        &self.slots[self.other_index()]
    }

    pub fn slot(&self, index: usize) -> &T {
        &self.slots[index]
    }

    pub fn slot_mut(&mut self, index: usize) -> &mut T {
        &mut self.slots[index]
    }

    pub fn swap(&mut self) {
        self.active = self.other_index();
    }
}

/// Checks a requested capacity and seed, returning the zero-padded contents of slot 0.
pub fn seeded_contents(capacity: u32, seed: &[Particle]) -> Result<Vec<Particle>, BufferError> {
    if capacity == 0 {
        return Err(BufferError::EmptyCapacity);
    }
    if seed.len() > capacity as usize {
        return Err(BufferError::SeedOverflow {
            seeded: seed.len(),
            capacity,
        });
    }
    let mut contents = seed.to_vec();
    contents.resize(capacity as usize, Particle::default());
    Ok(contents)
}

// Matches `DrawArgs` in particle_layout.wgsl.tera and wgpu's non-indexed indirect layout.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawArgs {
    pub vertex_count: u32,
    // Raised by the update kernel to the number of records captured.
    pub instance_count: u32,
    pub first_vertex: u32,
    pub first_instance: u32,
}

impl DrawArgs {
    pub const INSTANCE_COUNT_OFFSET: wgpu::BufferAddress = 4;

    pub fn empty_capture() -> Self {
        DrawArgs {
            vertex_count: crate::program::SPRITE_CORNERS,
            ..DrawArgs::default()
        }
    }
}

// One half of the pair: the particle records and the capture state written alongside them.
pub struct ParticleSlot {
    pub particles: SizedBuffer,
    pub capture_args: SizedBuffer,
    pub capture_bind_group: wgpu::BindGroup,
}

pub struct ParticleBufferPair {
    capacity: u32,
    pair: BufferPair<ParticleSlot>,
}

impl ParticleBufferPair {
    pub fn initialize(
        device: &wgpu::Device,
        program: &ParticleProgram,
        capacity: u32,
        seed: &[Particle],
    ) -> Result<Self, BufferError> {
        let seeded = seeded_contents(capacity, seed)?;
        let zeroed = vec![Particle::default(); capacity as usize];
        log::info!(
            "Allocating particle buffers: {} records of {} bytes",
            capacity,
            Particle::STRIDE
        );
        let first = ParticleBufferPair::make_slot(device, program, &seeded, 0);
        let second = ParticleBufferPair::make_slot(device, program, &zeroed, 1);
        Ok(ParticleBufferPair {
            capacity,
            pair: BufferPair::new(first, second),
        })
    }

    fn make_slot(
        device: &wgpu::Device,
        program: &ParticleProgram,
        contents: &[Particle],
        index: usize,
    ) -> ParticleSlot {
        let particles = make_buffer_init(
            device,
            bytemuck::cast_slice(contents),
            wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            &format!("Particle buffer {}", index),
        );
        let capture_args = make_buffer_init(
            device,
            bytemuck::bytes_of(&DrawArgs::empty_capture()),
            wgpu::BufferUsages::INDIRECT | wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            &format!("Capture args {}", index),
        );
        let capture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("Capture target {}", index)),
            layout: program.capture_layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: particles.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: capture_args.buffer.as_entire_binding(),
                },
            ],
        });
        ParticleSlot {
            particles,
            capture_args,
            capture_bind_group,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn active_index(&self) -> usize {
        self.pair.active_index()
    }

    pub fn other_index(&self) -> usize {
        self.pair.other_index()
    }

    pub fn slot(&self, index: usize) -> &ParticleSlot {
        self.pair.slot(index)
    }

    pub fn swap(&mut self) {
        self.pair.swap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_complementary() {
        let mut pair = BufferPair::new("a", "b");
        for _ in 0..5 {
            assert_ne!(pair.active_index(), pair.other_index());
            assert_eq!(pair.active_index() + pair.other_index(), 1);
            let (active, other) = (pair.active_index(), pair.other_index());
            pair.swap();
            assert_eq!(pair.active_index(), other);
            assert_eq!(pair.other_index(), active);
        }
    }

    #[test]
    fn swap_moves_no_data() {
        let mut pair = BufferPair::new(vec![1], vec![2]);
        assert_eq!(pair.active(), &vec![1]);
        pair.swap();
        assert_eq!(pair.active(), &vec![2]);
        assert_eq!(pair.other(), &vec![1]);
        assert_eq!(pair.slot(0), &vec![1]);
    }

    #[test]
    fn seeded_contents_pads_with_zero_records() {
        let seed = [Particle::at([0.1, 0.0, 0.0], 5.0)];
        let contents = seeded_contents(3, &seed).unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0], seed[0]);
        assert_eq!(contents[2], Particle::default());
    }

    #[test]
    fn seeded_contents_rejects_bad_capacity() {
        assert_eq!(seeded_contents(0, &[]), Err(BufferError::EmptyCapacity));
        let seed = vec![Particle::default(); 4];
        assert_eq!(
            seeded_contents(2, &seed),
            Err(BufferError::SeedOverflow {
                seeded: 4,
                capacity: 2
            })
        );
    }

    #[test]
    fn draw_args_layout() {
        assert_eq!(std::mem::size_of::<DrawArgs>(), 16);
        let args = DrawArgs {
            instance_count: 7,
            ..DrawArgs::empty_capture()
        };
        let words: &[u32] = bytemuck::cast_slice(bytemuck::bytes_of(&args));
        assert_eq!(words[DrawArgs::INSTANCE_COUNT_OFFSET as usize / 4], 7);
    }
}

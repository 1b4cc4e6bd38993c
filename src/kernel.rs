//! Host-side statement of what the update kernels in `shaders/` compute.
//!
//! The GPU never reads anything from here; these mirror the WGSL line for line
//! so the per-particle rules can be checked without a device.

use cgmath::{InnerSpace, Vector2, Vector3};

use crate::demo_params::SimulationParams;
use crate::particle::Particle;

/// Pseudo-random value in [0, 1] derived only from its inputs.
///
/// Same expression as `respawn_hash` in `dense_update.wgsl`. Identical inputs
/// give identical outputs on one platform; bit equality across GPUs and math
/// libraries is not promised.
pub fn respawn_hash(time: f32, index: u32, offset: f32) -> f32 {
    let seed = Vector2::new(time + offset, index as f32);
    let x = seed.dot(Vector2::new(12.9898, 78.233)).sin() * 43758.5453;
    x - x.floor()
}

/// Where a particle lands in clip space (w = 1), as `clip_center` in the shaders.
///
/// x and y pass through. z in [-1, 1] is remapped into wgpu's [0, 1] depth range
/// and clamped, so no particle is dropped by depth clipping.
pub fn clip_center(position: [f32; 3]) -> [f32; 4] {
    let [x, y, z] = position;
    [x, y, (z * 0.5 + 0.5).clamp(0.0, 1.0), 1.0]
}

// WGSL `mix`.
fn mix(range: [f32; 2], t: f32) -> f32 {
    range[0] * (1.0 - t) + range[1] * t
}

pub trait UpdateKernel {
    fn update(&self, particle: &Particle, index: u32, time: f32, dt: f32) -> Particle;
}

/// Slides every particle along +x at one unit per second, wrapping at x = 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleKernel;

impl UpdateKernel for SimpleKernel {
    fn update(&self, particle: &Particle, _index: u32, _time: f32, dt: f32) -> Particle {
        let mut position = Vector3::from(particle.position) + Vector3::unit_x() * dt;
        if position.x > 1.0 {
            position.x = -1.0;
        }
        Particle {
            position: position.into(),
            ..*particle
        }
    }
}

/// Linear integration under gravity; expired particles respawn at the emitter.
#[derive(Debug, Clone, Copy)]
pub struct DenseKernel {
    pub params: SimulationParams,
}

impl DenseKernel {
    pub fn new(params: &SimulationParams) -> Self {
        DenseKernel { params: *params }
    }

    pub fn respawn(&self, index: u32, time: f32) -> Particle {
        let r = |offset: f32| respawn_hash(time, index, offset);
        let direction = Vector3::new(r(0.0) * 2.0 - 1.0, 1.0 + r(1.0), r(2.0) * 2.0 - 1.0).normalize();
        let speed = mix(self.params.speed_range, r(3.0));
        Particle {
            position: self.params.emission_point,
            velocity: (direction * speed).into(),
            life: mix(self.params.life_range, r(4.0)),
            size: mix(self.params.size_range, r(5.0)),
        }
    }
}

impl UpdateKernel for DenseKernel {
    fn update(&self, particle: &Particle, index: u32, time: f32, dt: f32) -> Particle {
        let velocity =
            Vector3::from(particle.velocity) + Vector3::from(self.params.gravity) * dt;
        let position = Vector3::from(particle.position) + velocity * dt;
        let life = particle.life - dt;
        if life < 0.0 {
            return self.respawn(index, time);
        }
        Particle {
            position: position.into(),
            velocity: velocity.into(),
            life,
            size: particle.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn in_range(value: f32, range: [f32; 2]) -> bool {
        value >= range[0] - 1e-5 && value <= range[1] + 1e-5
    }

    #[test]
    fn hash_is_deterministic() {
        for index in [0, 1, 17, 99_999] {
            for offset in 0..6 {
                let a = respawn_hash(3.25, index, offset as f32);
                let b = respawn_hash(3.25, index, offset as f32);
                assert_eq!(a.to_bits(), b.to_bits());
                assert!(a >= 0.0 && a <= 1.0, "hash out of range: {}", a);
            }
        }
    }

    #[test]
    fn respawn_is_deterministic() {
        let kernel = DenseKernel::new(&SimulationParams::default());
        assert_eq!(kernel.respawn(42, 1.5), kernel.respawn(42, 1.5));
        assert_ne!(kernel.respawn(42, 1.5), kernel.respawn(43, 1.5));
    }

    #[test]
    fn respawn_stays_in_ranges() {
        let params = SimulationParams::default();
        let kernel = DenseKernel::new(&params);
        for index in 0..1000 {
            let p = kernel.respawn(index, 0.37);
            assert_eq!(p.position, params.emission_point);
            assert!(in_range(p.life, params.life_range));
            assert!(in_range(p.size, params.size_range));
            let speed = Vector3::from(p.velocity).magnitude();
            assert!(speed >= params.speed_range[0] - 1e-4);
            assert!(speed <= params.speed_range[1] + 1e-4);
        }
    }

    #[test]
    fn life_decreases_until_respawn() {
        let params = SimulationParams::default();
        let kernel = DenseKernel::new(&params);
        let mut rng = rand::thread_rng();
        for index in 0..500 {
            let particle = Particle {
                position: [rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 0.0],
                velocity: [rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 0.0],
                life: rng.gen_range(0.0..3.0),
                size: 4.0,
            };
            let dt = rng.gen_range(0.001..0.1);
            let next = kernel.update(&particle, index, 10.0, dt);
            if particle.life - dt < 0.0 {
                assert!(in_range(next.life, params.life_range));
            } else {
                assert_eq!(next.life, particle.life - dt);
                assert_eq!(next.size, particle.size);
            }
            assert!(next.life >= 0.0);
        }
    }

    #[test]
    fn integrates_velocity_before_position() {
        let params = SimulationParams {
            gravity: [0.0, -2.0, 0.0],
            ..SimulationParams::default()
        };
        let kernel = DenseKernel::new(&params);
        let particle = Particle {
            position: [0.0, 0.0, 0.0],
            velocity: [1.0, 0.0, 0.0],
            life: 5.0,
            size: 3.0,
        };
        let next = kernel.update(&particle, 0, 0.0, 0.5);
        assert_eq!(next.velocity, [1.0, -1.0, 0.0]);
        assert_eq!(next.position, [0.5, -0.5, 0.0]);
        assert_eq!(next.life, 4.5);
    }

    #[test]
    fn clip_depth_is_remapped() {
        assert_eq!(clip_center([0.25, -0.5, -1.0]), [0.25, -0.5, 0.0, 1.0]);
        assert_eq!(clip_center([0.0, 0.0, 0.0])[2], 0.5);
        assert_eq!(clip_center([0.0, 0.0, 1.0])[2], 1.0);
        assert_eq!(clip_center([0.0, 0.0, -7.0])[2], 0.0);
        assert_eq!(clip_center([0.0, 0.0, 3.0])[2], 1.0);
    }

    #[test]
    fn simple_kernel_wraps() {
        let kernel = SimpleKernel;
        let moved = kernel.update(&Particle::at([0.2, 0.0, 0.0], 5.0), 0, 0.0, 0.05);
        assert!((moved.position[0] - 0.25).abs() < 1e-6);
        let wrapped = kernel.update(&Particle::at([0.99, 0.0, 0.0], 5.0), 0, 0.0, 0.05);
        assert_eq!(wrapped.position[0], -1.0);
        assert_eq!(wrapped.size, 5.0);
    }
}

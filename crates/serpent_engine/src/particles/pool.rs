//! Free-list particle pool
//!
//! The free list and the active list are disjoint and together hold every
//! particle the pool ever allocated. An empty free list never refuses a spawn;
//! a new particle is constructed instead and the pool grows.

use super::particle::{Particle, ParticleSpawn};
use crate::foundation::time::FRAME_MS;

/// Pre-allocated, recycled particle storage
#[derive(Debug, Clone)]
pub struct ParticlePool {
    pool: Vec<Particle>,
    active: Vec<Particle>,
    nominal_size: usize,
    allocated: usize,
}

impl ParticlePool {
    /// Pre-allocate `size` inactive particles
    pub fn new(size: usize) -> Self {
        Self {
            pool: (0..size).map(|_| Particle::inactive()).collect(),
            active: Vec::with_capacity(size),
            nominal_size: size,
            allocated: size,
        }
    }

    /// Activate a particle, reusing a free one when possible
    pub fn spawn(&mut self, spawn: &ParticleSpawn) -> &mut Particle {
        let particle = match self.pool.pop() {
            Some(mut particle) => {
                particle.reset(spawn);
                particle
            }
            None => {
                self.allocated += 1;
                log::debug!(
                    "Particle pool exhausted, growing to {} (nominal {})",
                    self.allocated,
                    self.nominal_size
                );
                Particle::new(spawn)
            }
        };

        let index = self.active.len();
        self.active.push(particle);
        &mut self.active[index]
    }

    /// Advance every active particle and recycle the dead ones
    pub fn update(&mut self, delta_time: f32) {
        let step = delta_time / FRAME_MS;
        let mut i = 0;
        while i < self.active.len() {
            self.active[i].update(step);
            if self.active[i].active {
                i += 1;
            } else {
                let dead = self.active.swap_remove(i);
                self.pool.push(dead);
            }
        }
    }

    /// Return every active particle to the free list
    pub fn clear(&mut self) {
        for mut particle in self.active.drain(..) {
            particle.active = false;
            self.pool.push(particle);
        }
    }

    /// Particles in flight
    pub fn active(&self) -> &[Particle] {
        &self.active
    }

    /// Number of particles in flight
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of particles in the free list
    pub fn free_count(&self) -> usize {
        self.pool.len()
    }

    /// Particles ever allocated, free plus active
    pub const fn total_allocated(&self) -> usize {
        self.allocated
    }

    /// Size requested at construction
    pub const fn nominal_size(&self) -> usize {
        self.nominal_size
    }
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::new(200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_disjoint_and_complete(pool: &ParticlePool) {
        assert_eq!(pool.free_count() + pool.active_count(), pool.total_allocated());
        assert!(pool.active().iter().all(|particle| particle.active));
    }

    #[test]
    fn test_pool_of_two_three_spawns() {
        let mut pool = ParticlePool::new(2);
        for _ in 0..3 {
            pool.spawn(&ParticleSpawn::default());
        }
        assert_eq!(pool.active_count(), 3);
        assert_eq!(pool.free_count(), 0);
        assert_eq!(pool.total_allocated(), 3);
        assert_disjoint_and_complete(&pool);
    }

    #[test]
    fn test_overflow_constructs_exactly_k() {
        let n = 16;
        let k = 5;
        let mut pool = ParticlePool::new(n);
        for _ in 0..n + k {
            pool.spawn(&ParticleSpawn::default());
        }
        assert_eq!(pool.active_count(), n + k);
        assert_eq!(pool.total_allocated() - pool.nominal_size(), k);
    }

    #[test]
    fn test_dead_particles_return_to_free_list() {
        let mut pool = ParticlePool::new(4);
        pool.spawn(&ParticleSpawn::default().with_fade_rate(0.25));
        pool.spawn(&ParticleSpawn::default().with_fade_rate(0.01));

        for _ in 0..3 {
            pool.update(FRAME_MS);
            assert_eq!(pool.active_count(), 2);
        }
        pool.update(FRAME_MS);
        assert_eq!(pool.active_count(), 1);
        assert_eq!(pool.free_count(), 3);
        assert_disjoint_and_complete(&pool);
    }

    #[test]
    fn test_reuse_does_not_grow() {
        let mut pool = ParticlePool::new(1);
        for _ in 0..10 {
            pool.spawn(&ParticleSpawn::default().with_fade_rate(1.0));
            pool.update(FRAME_MS);
        }
        assert_eq!(pool.total_allocated(), 1);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_spawn_returns_configurable_particle() {
        let mut pool = ParticlePool::new(1);
        let particle = pool.spawn(&ParticleSpawn::at(3.0, 4.0));
        particle.rotation = 1.5;
        assert_eq!(pool.active()[0].rotation, 1.5);
    }

    #[test]
    fn test_clear_recycles_everything() {
        let mut pool = ParticlePool::new(2);
        pool.spawn(&ParticleSpawn::default());
        pool.spawn(&ParticleSpawn::default());
        pool.spawn(&ParticleSpawn::default());
        pool.clear();
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.free_count(), 3);
    }
}

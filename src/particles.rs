use glam::{Vec3, Vec4};
use rand::Rng;

/// Alpha lost per second once a particle is live.
const FADE_PER_SECOND: f32 = 2.5;

/// Seconds a particle lives after being emitted.
const LIFETIME: f32 = 1.0;

/// One pooled particle. Owned solely by the pool; `life <= 0` marks the slot
/// as free.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub color: Vec4,
    pub life: f32,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            color: Vec4::ONE,
            life: 0.0,
        }
    }
}

/// Fixed-capacity particle pool with round-robin "first expired" allocation.
///
/// Emission scans forward from the slot used last, wraps to the front, and
/// overwrites slot 0 when every particle is still alive, so a saturated pool
/// recycles its oldest region instead of growing.
#[derive(Debug, Clone)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    last_used: usize,
}

impl ParticlePool {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            particles: vec![Particle::default(); capacity],
            last_used: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn alive_count(&self) -> usize {
        self.particles.iter().filter(|p| p.life > 0.0).count()
    }

    /// Live particles in slot order.
    pub fn alive(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.life > 0.0)
    }

    fn first_expired(&mut self) -> usize {
        for index in self.last_used..self.particles.len() {
            if self.particles[index].life <= 0.0 {
                self.last_used = index;
                return index;
            }
        }
        for index in 0..self.last_used {
            if self.particles[index].life <= 0.0 {
                self.last_used = index;
                return index;
            }
        }
        self.last_used = 0;
        0
    }

    /// Respawns the first expired slot near `origin` with jittered velocity.
    /// Returns the slot index, or `None` when the pool has zero capacity.
    pub fn emit(&mut self, origin: Vec3, rng: &mut impl Rng) -> Option<usize> {
        if self.particles.is_empty() {
            return None;
        }
        let index = self.first_expired();
        let jitter = Vec3::new(
            rng.random_range(-0.25..0.25),
            0.0,
            rng.random_range(-0.25..0.25),
        );
        let velocity = Vec3::new(
            rng.random_range(-0.5..0.5),
            rng.random_range(0.5..1.5),
            rng.random_range(-0.5..0.5),
        );
        let brightness = rng.random_range(0.5..1.0);
        self.particles[index] = Particle {
            position: origin + jitter,
            velocity,
            color: Vec4::new(brightness, brightness, brightness, 1.0),
            life: LIFETIME,
        };
        Some(index)
    }

    /// Ages every particle by `dt`: live ones integrate their velocity and
    /// fade out, expired ones stay inert until re-emitted.
    pub fn update(&mut self, dt: f32) {
        for particle in &mut self.particles {
            particle.life -= dt;
            if particle.life > 0.0 {
                particle.position += particle.velocity * dt;
                particle.color.w = (particle.color.w - dt * FADE_PER_SECOND).max(0.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    #[test]
    fn emits_into_consecutive_slots() {
        let mut pool = ParticlePool::with_capacity(3);
        let mut rng = rng();
        assert_eq!(pool.emit(Vec3::ZERO, &mut rng), Some(0));
        assert_eq!(pool.emit(Vec3::ZERO, &mut rng), Some(1));
        assert_eq!(pool.emit(Vec3::ZERO, &mut rng), Some(2));
        assert_eq!(pool.alive_count(), 3);
    }

    #[test]
    fn saturated_pool_falls_back_to_slot_zero() {
        let mut pool = ParticlePool::with_capacity(2);
        let mut rng = rng();
        pool.emit(Vec3::ZERO, &mut rng);
        pool.emit(Vec3::ZERO, &mut rng);
        // Nothing has expired, so the scan gives up and recycles slot 0.
        assert_eq!(pool.emit(Vec3::ZERO, &mut rng), Some(0));
        assert_eq!(pool.alive_count(), 2);
    }

    #[test]
    fn scan_wraps_to_the_front() {
        let mut pool = ParticlePool::with_capacity(4);
        let mut rng = rng();
        for _ in 0..4 {
            pool.emit(Vec3::ZERO, &mut rng);
        }
        pool.particles[1].life = 0.0;
        assert_eq!(pool.emit(Vec3::ZERO, &mut rng), Some(1));
        assert_eq!(pool.last_used, 1);
    }

    #[test]
    fn update_integrates_and_fades() {
        let mut pool = ParticlePool::with_capacity(1);
        let mut rng = rng();
        pool.emit(Vec3::new(0.0, 1.0, 0.0), &mut rng);
        let before = pool.particles[0];

        pool.update(0.2);
        let after = pool.particles[0];

        assert!((after.life - (before.life - 0.2)).abs() < 1e-6);
        let expected = before.position + before.velocity * 0.2;
        assert!((after.position - expected).length() < 1e-6);
        assert!((after.color.w - 0.5).abs() < 1e-5);
    }

    #[test]
    fn expired_particles_stop_moving() {
        let mut pool = ParticlePool::with_capacity(1);
        let mut rng = rng();
        pool.emit(Vec3::ZERO, &mut rng);
        pool.update(LIFETIME + 0.1);
        assert_eq!(pool.alive_count(), 0);

        let frozen = pool.particles[0].position;
        pool.update(1.0);
        assert_eq!(pool.particles[0].position, frozen);
    }

    #[test]
    fn zero_capacity_pool_refuses_emission() {
        let mut pool = ParticlePool::with_capacity(0);
        let mut rng = rng();
        assert_eq!(pool.emit(Vec3::ZERO, &mut rng), None);
    }
}

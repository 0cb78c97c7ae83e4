use crate::core::constants::{
    GUN_CORRECTION_SHIFT_RANGE, GUN_CORRECTION_WIDTH_RANGE, GUN_INTENSITY, MAX_PARTICLES,
    X0_MIN_FRACTION,
};
use crate::core::geometry::{Rect, linear_map};
use crate::core::models::atom::Atom;
use crate::core::models::particle::AlphaParticle;
use nalgebra::Point2;
use rand::Rng;
use std::f64::consts::FRAC_PI_2;

/// The alpha particle source at the bottom edge of the model.
///
/// The gun is either off or on; only an external toggle switches it. While on it fires one
/// particle straight up every `dt_per_fire` seconds, where the interval shrinks with energy so
/// that roughly [`MAX_PARTICLES`] particles are in flight at any energy.
#[derive(Debug, Clone, Default)]
pub struct Gun {
    on: bool,
    dt_since_gun_fired: f64,
}

impl Gun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn set_on(&mut self, on: bool) {
        self.on = on;
    }

    /// Turns the gun off. The firing accumulator is kept; nothing fires while off anyway.
    pub fn reset(&mut self) {
        self.on = false;
    }

    pub fn dt_since_gun_fired(&self) -> f64 {
        self.dt_since_gun_fired
    }

    /// Seconds between shots for a space of `space_width` at `energy`.
    pub fn dt_per_fire(space_width: f64, energy: f64) -> f64 {
        (space_width / energy) / MAX_PARTICLES
    }

    /// Advances the firing clock and returns the particle fired this step, if any.
    ///
    /// At most one particle is fired per call; surplus elapsed time carries over.
    pub fn step<'a, R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        bounds: &Rect,
        energy: f64,
        atoms: impl IntoIterator<Item = &'a Atom>,
        rng: &mut R,
    ) -> Option<AlphaParticle> {
        self.dt_since_gun_fired += GUN_INTENSITY * dt;
        if !(energy > 0.0) {
            return None;
        }
        let dt_per_fire = Self::dt_per_fire(bounds.width(), energy);

        if self.on && self.dt_since_gun_fired >= dt_per_fire {
            self.dt_since_gun_fired %= dt_per_fire;
            let x = sample_x(bounds, atoms, rng);
            return Some(AlphaParticle::new(
                Point2::new(x, bounds.min.y),
                energy,
                FRAC_PI_2,
            ));
        }
        None
    }
}

/// Draws a horizontal firing position across the full width of `bounds`.
///
/// Positions within [`X0_MIN_FRACTION`] of the space width of an atom's center are pushed
/// further out, because the deflection algorithm is singular for a zero impact parameter.
fn sample_x<'a, R: Rng + ?Sized>(
    bounds: &Rect,
    atoms: impl IntoIterator<Item = &'a Atom>,
    rng: &mut R,
) -> f64 {
    let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    let x = bounds.center().x + sign * (bounds.width() / 2.0) * rng.r#gen::<f64>();

    // Only the nearest atom corrects; atoms sharing a column must not stack their nudges.
    let nearest = atoms
        .into_iter()
        .min_by(|a, b| (x - a.position().x).abs().total_cmp(&(x - b.position().x).abs()));
    let Some(atom) = nearest else {
        return x;
    };

    let atom_x = atom.position().x;
    let offset = x - atom_x;
    if offset.abs() >= X0_MIN_FRACTION * bounds.width() {
        return x;
    }
    let correction = linear_map(
        GUN_CORRECTION_WIDTH_RANGE,
        GUN_CORRECTION_SHIFT_RANGE,
        atom.bounding_rect().width(),
    );
    let direction = if offset == 0.0 { sign } else { offset.signum() };
    atom_x + direction * (offset.abs() + correction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::AtomKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const NO_ATOMS: &[Atom] = &[];

    fn bounds(width: f64) -> Rect {
        Rect::centered(Point2::origin(), width, width)
    }

    fn count_shots(gun: &mut Gun, energy: f64, frames: usize, dt: f64) -> usize {
        let mut rng = StdRng::seed_from_u64(7);
        let space = bounds(255.0);
        (0..frames)
            .filter(|_| gun.step(dt, &space, energy, NO_ATOMS, &mut rng).is_some())
            .count()
    }

    #[test]
    fn dt_per_fire_matches_default_settings() {
        let dt = Gun::dt_per_fire(255.0, 80.0);
        assert!((dt - 0.159375).abs() < 1e-12);
    }

    #[test]
    fn sixteen_hundredth_second_frames_fire_exactly_once_at_default_energy() {
        let mut gun = Gun::new();
        gun.set_on(true);
        assert_eq!(count_shots(&mut gun, 80.0, 15, 0.01), 0);
        assert_eq!(count_shots(&mut gun, 80.0, 1, 0.01), 1);
    }

    #[test]
    fn off_gun_never_fires_but_keeps_accumulating() {
        let mut gun = Gun::new();
        assert_eq!(count_shots(&mut gun, 80.0, 600, 1.0 / 60.0), 0);
        assert!(gun.dt_since_gun_fired() > 9.0);
    }

    #[test]
    fn at_most_one_particle_fires_per_step() {
        let mut gun = Gun::new();
        count_shots(&mut gun, 80.0, 600, 1.0 / 60.0);
        gun.set_on(true);

        assert_eq!(count_shots(&mut gun, 80.0, 1, 1.0 / 60.0), 1);
        assert!(gun.dt_since_gun_fired() < Gun::dt_per_fire(255.0, 80.0));
    }

    #[test]
    fn higher_energy_fires_at_least_as_often() {
        let mut fast = Gun::new();
        let mut slow = Gun::new();
        fast.set_on(true);
        slow.set_on(true);

        let fast_shots = count_shots(&mut fast, 120.0, 300, 1.0 / 60.0);
        let slow_shots = count_shots(&mut slow, 40.0, 300, 1.0 / 60.0);

        assert!(fast_shots >= slow_shots);
        assert!(fast_shots > 0);
    }

    #[test]
    fn fired_particles_start_at_the_bottom_edge_heading_up() {
        let mut gun = Gun::new();
        gun.set_on(true);
        let mut rng = StdRng::seed_from_u64(1);
        let space = bounds(255.0);

        let particle = gun.step(1.0, &space, 80.0, NO_ATOMS, &mut rng).unwrap();

        assert_eq!(particle.position().y, -127.5);
        assert!(particle.position().x.abs() <= 127.5);
        assert_eq!(particle.orientation(), FRAC_PI_2);
        assert_eq!(particle.speed(), 80.0);
        assert_eq!(particle.initial_speed(), 80.0);
    }

    #[test]
    fn reset_turns_the_gun_off_without_clearing_the_accumulator() {
        let mut gun = Gun::new();
        gun.set_on(true);
        count_shots(&mut gun, 80.0, 5, 0.01);
        let accumulated = gun.dt_since_gun_fired();

        gun.reset();

        assert!(!gun.is_on());
        assert_eq!(gun.dt_since_gun_fired(), accumulated);
    }

    #[test]
    fn firing_positions_avoid_the_nucleus_axis() {
        let space = bounds(255.0);
        let atoms = [Atom::new(AtomKind::Rutherford, Point2::origin(), 255.0)];
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..5_000 {
            let x = sample_x(&space, &atoms, &mut rng);
            assert!(x.abs() >= 5.0 - 1e-9, "x = {x} is too close to the nucleus");
            assert!(x.abs() <= 127.5 + 5.0);
        }
    }

    #[test]
    fn atoms_sharing_a_column_nudge_only_once() {
        let space = bounds(255.0);
        let column = [-85.0, 0.0, 85.0].map(|y| Atom::new(AtomKind::Rutherford, Point2::new(0.0, y), 85.0));
        let single = [Atom::new(AtomKind::Rutherford, Point2::origin(), 85.0)];
        let mut a = StdRng::seed_from_u64(11);
        let mut b = StdRng::seed_from_u64(11);

        for _ in 0..2_000 {
            let stacked = sample_x(&space, &column, &mut a);
            let alone = sample_x(&space, &single, &mut b);
            assert_eq!(stacked, alone);
        }
    }

    #[test]
    fn nearest_atom_decides_the_nudge() {
        let space = bounds(255.0);
        let row = [-64.0, 64.0].map(|x| Atom::new(AtomKind::Rutherford, Point2::new(x, 0.0), 127.5));
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..5_000 {
            let x = sample_x(&space, &row, &mut rng);
            let distance = row
                .iter()
                .map(|atom| (x - atom.position().x).abs())
                .fold(f64::INFINITY, f64::min);
            assert!(distance > 0.5, "x = {x} fires too close to a nucleus");
        }
    }

    #[test]
    fn same_seed_gives_same_firing_positions() {
        let space = bounds(255.0);
        let mut a = StdRng::seed_from_u64(3);
        let mut b = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            assert_eq!(sample_x(&space, NO_ATOMS, &mut a), sample_x(&space, NO_ATOMS, &mut b));
        }
    }
}

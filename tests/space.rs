use qlib::forces::{BarnesHut, BruteForce};
use qlib::shared::{ForceEvaluator, ParticleSnapshot};
use qlib::{
    BarnesHutSpace, BruteForceSpace, LeapFrogSpace, Simulation, SimulationError,
    SimulationSettings, Vect,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Space with `count` unit masses at seeded positions in [-0.5, 0.5)².
fn seeded_space<S: Simulation + Default>(count: usize, seed: u64) -> S {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut space = S::default();
    for _ in 0..count {
        let id = space.add_particle(1.0);
        let p = space.particle_mut(id).unwrap();
        p.position = Vect::new(rng.random_range(-0.5..0.5), rng.random_range(-0.5..0.5));
        p.velocity = Vect::new(rng.random_range(-0.5..0.5), rng.random_range(-0.5..0.5));
    }
    space
}

fn total_momentum(space: &impl Simulation) -> Vect {
    space
        .particles()
        .iter()
        .fold(Vect::zeros(), |acc, p| acc + p.momentum())
}

// ==================================================================================
// Contract
// ==================================================================================

#[test]
fn empty_space_only_advances_time() {
    let mut space = BarnesHutSpace::default();
    assert_eq!(space.particle_count(), 0);
    space.step(0.25).unwrap();
    space.step(0.25).unwrap();
    assert_eq!(space.time(), 0.5);
}

#[test]
fn ids_are_insertion_order() {
    let mut space = BarnesHutSpace::default();
    let ids: Vec<_> = (0..5).map(|i| space.add_particle(i as f64 + 1.0)).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    assert_eq!(space.particle_count(), 5);
    for id in ids {
        let p = space.particle(id).unwrap();
        assert_eq!(p.id(), id);
        assert_eq!(p.mass(), id as f64 + 1.0);
        assert_eq!(p.inverse_mass(), 1.0 / (id as f64 + 1.0));
    }
}

#[test]
fn unknown_particle_is_reported() {
    let mut space = BarnesHutSpace::default();
    space.add_particle(1.0);

    assert_eq!(
        space.particle(1).unwrap_err(),
        SimulationError::ParticleNotFound { id: 1, count: 1 }
    );
    assert!(space.particle_mut(7).is_err());
    assert!(space.particle(0).is_ok());
    assert_eq!(
        space.particle(3).unwrap_err().to_string(),
        "particle #3 not found (1 particles)"
    );
}

#[test]
fn particle_fields_are_caller_mutable() {
    let mut space = BarnesHutSpace::default();
    let id = space.add_particle(2.0);
    let p = space.particle_mut(id).unwrap();
    p.position = Vect::new(1.0, 2.0);
    p.set_mass(4.0);
    p.apply_impulse(Vect::new(2.0, 0.0));

    let p = space.particle(id).unwrap();
    assert_eq!(p.position, Vect::new(1.0, 2.0));
    assert_eq!(p.inverse_mass(), 0.25);
    assert_eq!(p.velocity, Vect::new(0.5, 0.0));
    assert_eq!(p.momentum(), Vect::new(2.0, 0.0));

    let p = space.particle_mut(id).unwrap();
    p.set_mass(0.0);
    p.apply_impulse(Vect::new(9.0, 9.0));
    assert_eq!(p.inverse_mass(), 0.0);
    assert_eq!(p.velocity, Vect::new(0.5, 0.0));
}

#[test]
fn invalid_settings_reject_step() {
    let mut space: BarnesHutSpace = seeded_space(4, 11);
    let before = space.particles().to_vec();
    space.settings_mut().theta = -1.0;

    let err = space.step(0.1).unwrap_err();
    assert!(matches!(err, SimulationError::InvalidSetting { name: "theta", .. }));
    assert_eq!(space.particles(), before.as_slice());
    assert_eq!(space.time(), 0.0);

    space.settings_mut().theta = 0.5;
    assert!(space.step(f64::NAN).is_err());
    assert!(space.step(0.1).is_ok());
}

#[test]
fn non_finite_positions_reject_step() {
    let mut space = BarnesHutSpace::default();
    space.add_particle(1.0);
    let id = space.add_particle(1.0);
    space.particle_mut(id).unwrap().position = Vect::new(f64::INFINITY, 0.0);

    assert!(space.step(0.1).is_err());
    assert_eq!(space.time(), 0.0);
}

#[test]
fn far_apart_finite_positions_step() {
    let mut space = BarnesHutSpace::default();
    let a = space.add_particle(1.0);
    let b = space.add_particle(1.0);
    space.particle_mut(a).unwrap().position = Vect::new(1e308, 0.0);
    space.particle_mut(b).unwrap().position = Vect::new(1.5e308, 0.0);

    space.step(0.1).unwrap();
    assert!(space
        .particles()
        .iter()
        .all(|p| p.position.iter().all(|c| c.is_finite())));
    assert_eq!(space.time(), 0.1);
}

#[test]
fn strategies_share_one_interface() {
    let mut spaces: Vec<Box<dyn Simulation>> = vec![
        Box::new(seeded_space::<BarnesHutSpace>(16, 5)),
        Box::new(seeded_space::<BruteForceSpace>(16, 5)),
        Box::new(seeded_space::<LeapFrogSpace>(16, 5)),
    ];
    for space in spaces.iter_mut() {
        space.step(0.01).unwrap();
        assert_eq!(space.particle_count(), 16);
        assert_eq!(space.time(), 0.01);
    }
}

// ==================================================================================
// Properties
// ==================================================================================

#[test]
fn one_body_moves_ballistically() {
    let mut space = BarnesHutSpace::default();
    let id = space.add_particle(1.0);
    space.particle_mut(id).unwrap().velocity = Vect::new(1.0, 0.0);

    for _ in 0..10 {
        space.step(0.1).unwrap();
    }

    let p = space.particle(id).unwrap();
    assert!((p.position - Vect::new(1.0, 0.0)).norm() < 1e-12);
    assert_eq!(p.velocity, Vect::new(1.0, 0.0));
    assert!((space.time() - 1.0).abs() < 1e-12);
}

#[test]
fn two_bodies_move_symmetrically() {
    let mut space = BarnesHutSpace::default();
    let a = space.add_particle(1.0);
    let b = space.add_particle(1.0);
    space.particle_mut(b).unwrap().position = Vect::new(1.0, 0.0);

    space.step(0.1).unwrap();

    let da = space.particle(a).unwrap().position - Vect::new(0.0, 0.0);
    let db = space.particle(b).unwrap().position - Vect::new(1.0, 0.0);
    assert!(da.x > 0.0, "bodies attract each other");
    assert!((da + db).norm() < 1e-12);
    assert!((da.norm() - db.norm()).abs() < 1e-12);
    assert!(total_momentum(&space).norm() < 1e-12);
}

#[test]
fn zero_step_changes_nothing() {
    let mut space: BarnesHutSpace = seeded_space(32, 9);
    let before = space.particles().to_vec();

    space.step(0.0).unwrap();

    for (a, b) in before.iter().zip(space.particles()) {
        assert_eq!(a.position, b.position);
        assert_eq!(a.velocity, b.velocity);
    }
}

#[test]
fn steps_are_deterministic() {
    let mut first: BarnesHutSpace = seeded_space(64, 3);
    let mut second: BarnesHutSpace = seeded_space(64, 3);
    second.settings_mut().parallel = true;

    for _ in 0..5 {
        first.step(0.01).unwrap();
        second.step(0.01).unwrap();
    }
    assert_eq!(first.particles(), second.particles());
}

#[test]
fn momentum_is_conserved_by_direct_summation() {
    let mut space: BruteForceSpace = seeded_space(24, 21);
    let before = total_momentum(&space);
    for _ in 0..10 {
        space.step(0.001).unwrap();
    }
    assert!((total_momentum(&space) - before).norm() < 1e-9);
}

#[test]
fn tree_converges_to_brute_force_as_theta_shrinks() {
    let mut rng = StdRng::seed_from_u64(32);
    let bodies: Vec<ParticleSnapshot> = (0..32)
        .map(|_| {
            ParticleSnapshot::new(
                Vect::new(rng.random_range(-0.5..0.5), rng.random_range(-0.5..0.5)),
                Vect::zeros(),
                rng.random_range(0.5..1.5),
            )
        })
        .collect();

    let error_at = |theta: f64| {
        let settings = SimulationSettings {
            theta,
            ..Default::default()
        };
        let mut exact = vec![Vect::zeros(); bodies.len()];
        let mut approx = vec![Vect::zeros(); bodies.len()];
        BruteForce
            .accelerations(&bodies, &settings, &mut exact)
            .unwrap();
        BarnesHut
            .accelerations(&bodies, &settings, &mut approx)
            .unwrap();
        let scale: f64 = exact.iter().map(|a| a.norm()).sum();
        let error: f64 = exact
            .iter()
            .zip(approx.iter())
            .map(|(e, a)| (e - a).norm())
            .sum();
        error / scale
    };

    let bounds = [(0.5, 0.1), (0.25, 0.05), (0.0, 1e-10)];
    for (theta, bound) in bounds {
        let error = error_at(theta);
        assert!(error < bound, "theta {}: error {} >= {}", theta, error, bound);
    }
    assert!(error_at(0.0) <= error_at(0.5));
}

#[test]
fn rk4_space_matches_brute_force_space_at_theta_zero() {
    let mut tree: BarnesHutSpace = seeded_space(32, 17);
    let mut direct: BruteForceSpace = seeded_space(32, 17);
    tree.settings_mut().theta = 0.0;

    for _ in 0..3 {
        tree.step(0.01).unwrap();
        direct.step(0.01).unwrap();
    }
    for (a, b) in tree.particles().iter().zip(direct.particles()) {
        assert!((a.position - b.position).norm() < 1e-9);
        assert!((a.velocity - b.velocity).norm() < 1e-9);
    }
}

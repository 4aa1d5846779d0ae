use std::error::Error as StdError;

use approx::assert_relative_eq;
use integration_tests::{init_tracing, seconds, spacecraft, two_body};
use tether_core::{
    condition::{Criterion, RealCondition},
    dynamics::{STANDARD_GRAVITY, ThrustDirection, Thruster, ThrusterError},
};
use tether_mission::{Segment, SegmentKind, segment};
use tether_solvers::NumericalSolver;
use uom::si::{
    f64::{Force, Mass},
    force::newton,
    mass::kilogram,
    time::second,
    velocity::meter_per_second,
};

fn thruster(dry_mass: f64) -> Thruster {
    Thruster::new(
        Force::new::<newton>(50.0),
        seconds(300.0),
        Mass::new::<kilogram>(dry_mass),
        ThrustDirection::AlongVelocity,
    )
    .expect("valid thruster")
}

fn burn(duration: f64, dry_mass: f64) -> Segment {
    Segment::maneuver(
        "prograde burn",
        RealCondition::duration(Criterion::AnyCrossing, seconds(duration)),
        thruster(dry_mass),
        two_body(),
        NumericalSolver::default(),
    )
    .expect("valid segment")
}

#[test]
fn prograde_burn_consumes_propellant_and_raises_energy() {
    init_tracing();
    let initial = spacecraft(1000.0);
    let flow = thruster(500.0).mass_flow_rate();

    let solution = burn(120.0, 500.0)
        .solve(&initial, seconds(600.0))
        .expect("burn completes");

    assert_eq!(solution.kind(), SegmentKind::Maneuver);
    assert_relative_eq!(solution.propagation_duration().get::<second>(), 120.0, epsilon = 1e-8);

    let delta_mass = solution.compute_delta_mass().expect("state carries mass");
    assert_relative_eq!(delta_mass.get::<kilogram>(), flow * 120.0, max_relative = 1e-9);

    let final_mass = 1000.0 - flow * 120.0;
    let delta_v = solution.compute_delta_v(seconds(300.0)).expect("state carries mass");
    assert_relative_eq!(
        delta_v.get::<meter_per_second>(),
        300.0 * STANDARD_GRAVITY * (1000.0 / final_mass).ln(),
        max_relative = 1e-9
    );

    let speed = |state: &tether_core::State| {
        let c = state.coordinates();
        (c[3] * c[3] + c[4] * c[4] + c[5] * c[5]).sqrt()
    };
    assert!(speed(solution.final_state()) > speed(&initial));
}

#[test]
fn running_dry_aborts_the_segment() {
    init_tracing();
    let initial = spacecraft(1000.0);
    // Roughly 0.017 kg/s leaves about 30 s of propellant.
    let dry_mass = 1000.0 - 0.5;

    let error = burn(120.0, dry_mass)
        .solve(&initial, seconds(600.0))
        .expect_err("propellant runs out mid-burn");

    assert!(matches!(error, segment::Error::Propagation(_)));

    let mut source: Option<&(dyn StdError + 'static)> = Some(&error);
    let mut exhausted = false;
    while let Some(current) = source {
        if let Some(ThrusterError::PropellantExhausted { dry_mass: dry, .. }) =
            current.downcast_ref::<ThrusterError>()
        {
            assert_relative_eq!(*dry, dry_mass);
            exhausted = true;
        }
        source = current.source();
    }
    assert!(exhausted, "the thruster error is in the source chain");
}

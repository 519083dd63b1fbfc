use signal_sim::{
    Action, Axis, Comparison, ControlMode, LightConfig, Observation, Platoon, SimRng,
    SimulationConfig,
};

const SEED: u64 = 42;

fn main() -> signal_sim::Result<()> {
    env_logger::init();

    let vehicles = Platoon::default().generate(&mut SimRng::new(SEED));
    let comparison = Comparison::new(
        vehicles,
        SimulationConfig {
            dt: 0.5,
            lanes: 2,
            lane_changes: true,
            ..Default::default()
        },
        LightConfig {
            position: 100.0,
            yellow_duration: 3.0,
            initial: Axis::X,
            control: ControlMode::Fixed { cycle_time: 15.0 },
        },
        SEED,
        50.0,
    )?
    .with_action_interval(4)?;

    // Give the road back once the cross street has had its turn
    let mut policy = |obs: &Observation| {
        if obs.phase == 1 && obs.queue_x >= 2 {
            Action::Switch
        } else {
            Action::Hold
        }
    };

    let arms = [
        ("fixed", comparison.run(ControlMode::Fixed { cycle_time: 15.0 }, None)?),
        (
            "adaptive",
            comparison.run(
                ControlMode::Adaptive {
                    min_green: 5.0,
                    queue_margin: 2,
                },
                None,
            )?,
        ),
        (
            "external",
            comparison.run(
                ControlMode::External {
                    min_green: 5.0,
                    max_red: 20.0,
                },
                Some(&mut policy),
            )?,
        ),
    ];

    for (name, report) in &arms {
        println!(
            "{:>8}: mean queue {:5.2} | passed {:2} | collisions {}",
            name,
            report.mean_queue(),
            report.passed,
            report.collisions
        );
    }
    Ok(())
}

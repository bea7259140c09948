//! Example: Recording a descent trajectory
//!
//! Runs the Wolfe line search on the Booth function, records every iterate
//! and writes them to `gradient_log.csv`, one point per line with a comma
//! as decimal separator, ready for plotting.

use descentopt::core::{test_functions::Booth, trajectory::DEFAULT_LOG_FILE};
use descentopt::prelude::*;
use std::error::Error;

fn main() -> std::result::Result<(), Box<dyn Error>> {
    println!("=== Booth Trajectory (Wolfe) ===\n");

    let cost_fn = CountingCostFunction::new(Booth);
    let mut optimizer = GradientDescent::with_method(LineSearchMethod::Wolfe);
    let mut recorder = TrajectoryRecorder::new();

    let result = optimizer.optimize_with_callback(
        &cost_fn,
        &Booth::starting_point::<f64>(),
        &StoppingCriterion::new(),
        &mut recorder,
    )?;

    println!("{}", RunSummary::from_result("Wolfe", &result));
    println!("Termination: {}", result.termination_reason);

    let log = recorder.into_log();
    log.save(DEFAULT_LOG_FILE, &TrajectoryFormat::comma())?;
    println!("\nWrote {} points to {DEFAULT_LOG_FILE}", log.len());

    Ok(())
}

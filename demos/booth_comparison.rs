//! Example: Armijo versus Wolfe line search on the Booth function
//!
//! Minimizes f(x, y) = (x + 2y - 7)² + (2x + y - 5)² from (-4, -10) with
//! both line searches and prints the final point, the iteration count and
//! the number of objective and gradient evaluations of each run.

use descentopt::core::test_functions::Booth;
use descentopt::prelude::*;

fn main() -> OptimizerResult<()> {
    let x0 = Booth::starting_point::<f64>();

    for (index, (label, method)) in [("Armijo", "armijo"), ("Wolfe", "wolfe")].into_iter().enumerate() {
        if index > 0 {
            println!();
        }

        // Fresh counters for every run
        let cost_fn = CountingCostFunction::new(Booth);
        let (point, iterations) = gradient_descent(
            &x0,
            &cost_fn,
            method,
            constants::gradient_tolerance::<f64>(),
            constants::DEFAULT_MAX_ITERATIONS,
            constants::DEFAULT_C1,
            constants::DEFAULT_C2,
        )?;

        println!("{}", RunSummary::new(label, &point, iterations, cost_fn.counts()));
    }

    Ok(())
}

//! Sanity check of the Keyfitz entropy calculation on synthetic schedules
//!
//! Prints H_N for constant, increasing, and two-phase mortality over ages
//! 0-110 so the values can be eyeballed against their expected ranges.

use life_table_system::keyfitz_entropy;

const AGES: usize = 111;

fn report(label: &str, expected: &str, lx: &[f64]) {
    match keyfitz_entropy(lx) {
        Ok(h) => println!("{:<40} H_N = {:.4}   (expected {})", label, h, expected),
        Err(reason) => println!("{:<40} undefined: {}", label, reason),
    }
}

fn main() {
    env_logger::init();

    println!("Keyfitz H_N check");
    println!("{}", "=".repeat(72));

    // Steep enough that nobody survives to the end of the range
    let constant: Vec<f64> = (0..AGES).map(|a| (-0.5 * a as f64).exp()).collect();
    report("Constant mortality (mu = 0.5)", "= 1.0", &constant);

    // At mu = 0.01 a third of the cohort reaches age 110 and dies there
    let truncated: Vec<f64> = (0..AGES).map(|a| (-0.01 * a as f64).exp()).collect();
    report("Constant mortality (mu = 0.01)", "< 1.0, truncated", &truncated);

    let senescence: Vec<f64> = (0..AGES)
        .map(|a| (-0.0001 * (a * a) as f64).exp())
        .collect();
    report("Increasing mortality (senescence)", "< 1.0", &senescence);

    let mut two_phase = vec![1.0; AGES];
    for a in 1..AGES {
        let survival = if a < 30 { 0.999 } else { 0.99 };
        two_phase[a] = two_phase[a - 1] * survival;
    }
    report("Low then higher mortality", "> or < 1.0", &two_phase);

    report("Single age after age 0", "undefined", &[1.0, 0.5]);
}

//! Instrument a small nested-loop workload and log its report.
//!
//! Demonstrates: calibrate → start → beat/skip → nested loops with
//! recaps → finish, with the report written through `log` under the
//! session's output tag. Run with `RUST_LOG=meter=debug` to see every row.

use std::hint::black_box;

use beatmeter_engine::{Session, SessionConfig};
use env_logger::{Builder, Env};

fn busy(work: u64) -> u64 {
    (0..work).fold(0u64, |acc, x| acc.wrapping_mul(31).wrapping_add(black_box(x)))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("beatmeter_engine", log::LevelFilter::Debug)
        .init();

    let mut session = Session::new(SessionConfig::default())?;

    let calibration = session.calibrate()?;
    log::info!("{calibration}");

    session.start();
    session.log("nested loops demo")?;

    busy(10_000);
    session.beat()?;
    session.log("warmup")?;

    // Setup noise that should not count towards the total.
    busy(50_000);
    session.skip()?;
    session.log("setup (skipped)")?;

    session.enter_loop(10)?;
    session.log("rows")?;
    for row in 0..10u64 {
        session.enter_loop(100)?;
        for col in 0..100u64 {
            busy(100 + row * col);
            session.recap()?;
        }
        session.unloop()?;
        session.log(format!("row {row}"))?;
        session.recap()?;
    }
    session.unloop()?;
    session.log("grid")?;

    session.enter_endless_loop()?;
    let mut polls = 0;
    while busy(polls * 10) % 7 != 3 && polls < 5_000 {
        polls += 1;
        session.recap()?;
    }
    session.unloop()?;
    session.log(format!("polling ({polls} polls)"))?;

    let report = session.finish()?;
    log::info!(
        "run {} finished: {} steps, {} ranked",
        report.run_id,
        report.steps.len(),
        report.ranking.len()
    );
    Ok(())
}

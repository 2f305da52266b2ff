//! loadwait — block until the system load average settles.
//!
//! Meant as a gate in front of heavy parallel work: run
//! `loadwait && make -j$(nproc)` and the build starts only once the
//! machine has calmed down. The acceptable load is derived from the
//! number of processors this process can actually use, so a wider
//! machine tolerates a proportionally higher load average before the
//! gate opens.
//!
//! No flags, no configuration, no state. Exit status is always 0.

mod system;
mod ui;

use std::thread;
use std::time::Duration;

use anyhow::Result;

use system::cpu::CpuCensus;
use system::load::{self, LoadSample};

/// Delay between load samples.
const POLL_INTERVAL: Duration = Duration::from_secs(5);

fn main() {
    // The whole point of this tool is the zero exit status that lets the
    // next command run. Anything that goes wrong here is a diagnostics
    // problem, not a reason to block the caller.
    if let Err(err) = run() {
        eprintln!("loadwait: {err:#}");
    }
}

fn run() -> Result<()> {
    let census = CpuCensus::take();
    ui::report_census(&census)?;

    let waited_secs = poll_until_target(
        census.usable,
        load::target_factor(census.usable),
        LoadSample::take,
        thread::sleep,
    )?;
    ui::report_finished(waited_secs)?;

    Ok(())
}

/// The poll loop: sample, report, and sleep [`POLL_INTERVAL`] for as long
/// as the load factor exceeds the target. Returns total seconds slept.
///
/// Sampling and sleeping are injected so the loop can be exercised
/// without a live kernel.
fn poll_until_target(
    usable: usize,
    target: f64,
    mut sample: impl FnMut() -> Option<LoadSample>,
    mut sleep: impl FnMut(Duration),
) -> Result<u64> {
    let mut waited_secs = 0u64;

    loop {
        // A machine that cannot report load has nothing to wait out.
        let Some(reading) = sample() else {
            break;
        };

        let factor = load::load_factor(&reading, usable);
        ui::report_progress(factor, target, &reading)?;

        if target < factor {
            sleep(POLL_INTERVAL);
            waited_secs += POLL_INTERVAL.as_secs();
        } else {
            break;
        }
    }

    Ok(waited_secs)
}

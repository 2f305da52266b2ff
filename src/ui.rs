//! Diagnostic output on stderr.
//!
//! While polling, the progress line is redrawn in place so a long wait
//! occupies a single terminal row. When stderr is not a terminal (piped
//! into a build log, say) each sample gets its own plain line instead.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::cursor::MoveToColumn;
use crossterm::execute;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use crossterm::tty::IsTty;

use crate::system::cpu::CpuCensus;
use crate::system::load::LoadSample;

/// One-time startup summary of the processor census.
pub fn report_census(census: &CpuCensus) -> Result<()> {
    let mut err = io::stderr();
    writeln!(
        err,
        "* CPU configuration:  {} configured,  {} operational,  {} serviceable",
        census.configured, census.available, census.usable
    )?;
    Ok(())
}

/// Per-sample progress line, redrawn in place on a tty.
pub fn report_progress(factor: f64, target: f64, sample: &LoadSample) -> Result<()> {
    let line = format!(
        "* Load factor:  {factor:.1}  (target {target:.1}),  load average: {:.2}, {:.2}, {:.2}",
        sample.one, sample.five, sample.fifteen
    );
    let mut err = io::stderr();
    if err.is_tty() {
        execute!(err, MoveToColumn(0), Clear(ClearType::CurrentLine), Print(line))?;
    } else {
        writeln!(err, "{line}")?;
    }
    Ok(())
}

/// Final line once the target is reached (or load became unreadable).
pub fn report_finished(waited_secs: u64) -> Result<()> {
    let mut err = io::stderr();
    if err.is_tty() {
        // Step off the redrawn progress line before the final report.
        execute!(err, Print("\r\n"))?;
    }
    writeln!(
        err,
        "* Finished!  Reached target load factor after waiting {waited_secs} seconds"
    )?;
    Ok(())
}

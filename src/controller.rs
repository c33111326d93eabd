//! Bed heating decision pipeline
//!
//! One pass runs these steps in order, stopping at the first failure:
//!
//! 1. resolve the printer configuration
//! 2. check the API version
//! 3. check that no job is running
//! 4. read the bed state
//! 5. decide from work hours and the bed's current target, then command
//!
//! A heat command is never sent while a job is active or to an unrecognized
//! API. The bed's current target gates re-heating so an already heating bed is
//! left alone.

use crate::config::PrinterSettings;
use crate::error::{OctoheatError, Result};
use crate::logging::{StructuredLogger, get_logger};
use crate::octoprint::{BedState, OctoPrintClient, Transport};
use crate::schedule::Clock;
use std::io::Write;
use std::sync::Arc;

/// What step 5 wants done
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// Set the bed target to this temperature
    Heat(f64),
    /// Set the bed target to 0
    Cool,
    /// Leave the printer alone
    Idle,
}

/// Heating policy.
///
/// During work hours an unheated bed (target 0) is heated to `target`; outside
/// work hours the bed is always switched off, whatever its current target.
pub fn decide(work_hours: bool, bed: &BedState, target: f64) -> Decision {
    if work_hours && bed.is_off() {
        Decision::Heat(target)
    } else if !work_hours {
        Decision::Cool
    } else {
        Decision::Idle
    }
}

/// Result of a completed pass
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Heat command sent; `accepted` is false when the printer did not answer 204
    Heated { target: f64, accepted: bool },
    /// Cool command sent
    Cooled { accepted: bool },
    /// Bed already heating during work hours
    NothingToDo { actual: f64, target: f64 },
    /// Dry run: the decision that would have been carried out
    DryRun { decision: Decision },
}

/// Runs one decision pass against a printer
pub struct BedController {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    dry_run: bool,
    logger: StructuredLogger,
}

impl BedController {
    pub fn new(transport: Arc<dyn Transport>, clock: Arc<dyn Clock>) -> Self {
        Self {
            transport,
            clock,
            dry_run: false,
            logger: get_logger("controller"),
        }
    }

    /// Evaluate everything but skip the final command
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run one pass.
    ///
    /// Configuration is resolved before anything touches the transport, so a
    /// missing value never causes a request.
    pub async fn run(&self, settings: &PrinterSettings) -> Result<Outcome> {
        let config = settings.resolve()?;
        let client = OctoPrintClient::new(&config, Arc::clone(&self.transport));

        if !client.check_version().await? {
            return Err(OctoheatError::BadApiVersion);
        }

        let job = client.get_job_info().await?;
        if !job.is_operational() {
            return Err(OctoheatError::job_in_progress(job.state));
        }

        let bed = client.get_bed_state().await?;
        self.logger
            .info(&format!("Current bed temp: {}", bed.actual));

        let work_hours = config.work_hours.is_work_hours(self.clock.as_ref());
        let decision = decide(work_hours, &bed, config.target_temperature);

        if self.dry_run {
            self.logger
                .info(&format!("Dry run, not sending command: {:?}", decision));
            return Ok(Outcome::DryRun { decision });
        }

        match decision {
            Decision::Heat(target) => {
                self.logger.info("Heating bed up");
                let accepted = client.heat_bed(target).await?;
                self.check_accepted(accepted);
                Ok(Outcome::Heated { target, accepted })
            }
            Decision::Cool => {
                self.logger.info("Cooling bed off");
                let accepted = client.heat_bed(0.0).await?;
                self.check_accepted(accepted);
                Ok(Outcome::Cooled { accepted })
            }
            Decision::Idle => {
                self.logger.info("Nothing to do");
                Ok(Outcome::NothingToDo {
                    actual: bed.actual,
                    target: bed.target,
                })
            }
        }
    }

    fn check_accepted(&self, accepted: bool) {
        if !accepted {
            self.logger
                .warn("Printer did not acknowledge the bed command with 204 No Content");
        }
    }
}

/// Report the end of a pass and map it to a process exit status.
///
/// A running job is an expected stop and exits 0; any other error exits 1 and
/// is written to stderr.
pub fn finish(result: &Result<Outcome>) -> u8 {
    finish_to(result, &mut std::io::stderr())
}

/// [`finish`] with the error stream supplied by the caller
pub fn finish_to<W: Write>(result: &Result<Outcome>, stderr: &mut W) -> u8 {
    let logger = get_logger("controller");
    match result {
        Ok(outcome) => {
            logger.debug(&format!("Pass complete: {:?}", outcome));
            0
        }
        Err(e) if e.is_expected() => {
            logger.info(&e.to_string());
            0
        }
        Err(e) => {
            logger.error(&e.to_string());
            let _ = writeln!(stderr, "Error: {}", e);
            1
        }
    }
}

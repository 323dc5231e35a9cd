use anyhow::Result;
use chrono::Utc;
use log::info;
use crate::initialization::init;
use crate::scheduling::{CronTimer, SystemClock, Timer};
use crate::worker::run;

mod config;
mod initialization;
mod logging;
mod manager_forecast;
mod manager_webhook;
mod models;
mod scheduling;
mod worker;

fn main() -> Result<()> {
    // If initialization fails we can't even be sure there is a logger, so the error goes to stderr
    let (args, config, mgr) = init()?;
    info!("Forecast location: {}, {}", config.geo_ref.lat, config.geo_ref.long);

    if args.run_once {
        run(&mgr);
        return Ok(());
    }

    let trigger = &mgr.trigger;
    info!("Daily forecast job scheduled at '{}' {}.", trigger.expression(), trigger.timezone());
    if let Some(next) = trigger.next_after(Utc::now()) {
        info!("First run at {}", next.to_rfc3339());
    }

    // Runs until the process is terminated
    CronTimer::new(SystemClock).register(trigger, &mut || run(&mgr))?;

    Ok(())
}

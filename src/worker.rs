use log::info;
use crate::initialization::Mgr;

/// Runs the daily forecast job: fetches the forecast and passes whatever came out of it
/// on to the webhook. Failures on either side are logged and never escape.
///
/// # Arguments
///
/// * 'mgr' - struct with configured managers
pub fn run(mgr: &Mgr) {
    info!("Running daily forecast job...");

    let record = mgr.forecast.fetch_forecast();
    mgr.webhook.send_to_webhook(record.as_ref());

    info!("Daily forecast job finished.");
}

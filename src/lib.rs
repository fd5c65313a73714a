pub mod bot;
pub mod config;
mod error;
mod logging;
pub mod models;
pub mod pipeline;
mod timezone;
mod utils;
pub mod vk;

use anyhow::Context;

use bot::{telegram::TelegramBot, Dispatcher, Schedule};
use config::AppConfig;
use pipeline::{week, PipelineOptions, SocialNetwork};
use vk::VkClient;

pub use error::PipelineError;
pub use timezone::EventTimezone;

/// Runs one fetch cycle and serves the result over Telegram until polling fails.
pub fn run() -> anyhow::Result<()> {
    logging::init();

    let config = AppConfig::load().context("failed to load credentials")?;
    let options = PipelineOptions::from_config(&config);
    tracing::info!(
        community_id = options.community_id,
        post_count = options.post_count,
        timezone = %options.timezone,
        "starting week-events"
    );

    let mut telegram = TelegramBot::new(
        &config.telegram.token,
        config.http_timeout(),
        config.poll_timeout(),
    )
    .context("failed to build telegram client")?;

    let vk = VkClient::authorize(
        &config.vk,
        &config.settings.api_version,
        config.http_timeout(),
    )
    .map_err(|err| PipelineError::AuthenticationFailed(err.to_string()))
    .context("vk authorization failed")?;

    let rebuild = || load_schedule(&vk, &options);
    let mut dispatcher = Dispatcher::new(rebuild());
    if let Some(interval) = config.refresh_interval() {
        tracing::info!(minutes = interval.as_secs() / 60, "periodic refresh enabled");
    }

    bot::serve(
        &mut telegram,
        &mut dispatcher,
        config.refresh_interval(),
        rebuild,
    )
    .context("telegram polling failed")
}

/// Builds the snapshot for the current week. Failures are reported to the
/// operator log only; the bot then answers `/events` as unavailable.
fn load_schedule<N>(network: &N, options: &PipelineOptions) -> Schedule
where
    N: SocialNetwork + ?Sized,
{
    let range = week::current_week(options.timezone);
    match pipeline::build_week_schedule(network, options, range) {
        Ok(schedule) => Schedule::Ready(schedule),
        Err(err) => {
            tracing::error!(error = %err, "fetch cycle failed");
            Schedule::Unavailable
        }
    }
}

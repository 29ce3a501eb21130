//! Application entry point for ward-bot.
//!
//! Initializes all components and starts the Discord bot.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use dotenv::dotenv;
use log::debug;
use log::info;

use ward_bot::bot::Bot;
use ward_bot::config::Config;
use ward_bot::event::LockdownLiftedEvent;
use ward_bot::event::RaidDetectedEvent;
use ward_bot::event::event_bus::EventBus;
use ward_bot::logging::setup_logging;
use ward_bot::service::Services;
use ward_bot::subscriber::raid_alert_subscriber::RaidAlertSubscriber;
use ward_bot::task::window_sweeper::WindowSweeper;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let init_start = Instant::now();
    let config = load_config()?;
    let event_bus = Arc::new(EventBus::new());
    let services = Arc::new(Services::new(&config, event_bus.clone()));

    let bot = setup_bot(&config, services.clone(), init_start).await?;
    setup_subscribers(&config, event_bus, bot)?;
    setup_tasks(&config, &services, init_start)?;

    run(init_start).await
}

fn load_config() -> Result<Arc<Config>> {
    let config = Arc::new(Config::load()?);
    setup_logging(&config)?;
    info!("Starting ward-bot...");
    Ok(config)
}

async fn setup_bot(
    config: &Arc<Config>,
    services: Arc<Services>,
    init_start: Instant,
) -> Result<Arc<Bot>> {
    info!("Starting bot...");
    let mut bot = Bot::new(config.clone(), services).await?;

    bot.start();
    let bot = Arc::new(bot);
    info!(
        "Bot setup complete ({:.2}s).",
        init_start.elapsed().as_secs_f64()
    );

    Ok(bot)
}

fn setup_subscribers(config: &Arc<Config>, event_bus: Arc<EventBus>, bot: Arc<Bot>) -> Result<()> {
    if !config.features.raid_protection {
        return Ok(());
    }
    debug!("Setting up Subscribers...");

    let alert_subscriber = Arc::new(RaidAlertSubscriber::new(bot, config.clone()));

    event_bus
        .register_subscriber::<RaidDetectedEvent, _>(alert_subscriber.clone())
        .register_subscriber::<LockdownLiftedEvent, _>(alert_subscriber);

    Ok(())
}

fn setup_tasks(config: &Config, services: &Services, init_start: Instant) -> Result<()> {
    if !config.features.raid_protection {
        return Ok(());
    }
    debug!("Setting up Tasks...");

    WindowSweeper::new(services.raid_protection.clone()).start()?;

    info!(
        "Tasks setup complete ({:.2}s).",
        init_start.elapsed().as_secs_f64()
    );
    Ok(())
}

async fn run(init_start: Instant) -> Result<()> {
    info!(
        "ward-bot is up in {:.2}s. Press Ctrl+C to stop.",
        init_start.elapsed().as_secs_f64()
    );

    tokio::signal::ctrl_c().await?;
    info!("Ctrl+C received, shutting down.");

    Ok(())
}

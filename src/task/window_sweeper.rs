//! Background task that evicts stale join-window entries.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use chrono::Utc;
use log::debug;
use log::info;

use crate::service::raid_protection_service::RaidProtectionService;

/// Task that periodically sweeps expired entries out of all join windows.
///
/// The sweep is pure housekeeping: the raid check itself filters by
/// timestamp, so detection stays correct even between sweeps. This only
/// bounds memory for guilds that saw joins and then went quiet.
pub struct WindowSweeper {
    service: Arc<RaidProtectionService>,
    sweep_interval: Duration,
    running: AtomicBool,
}

impl WindowSweeper {
    /// Creates a new sweeper using the service's configured interval.
    pub fn new(service: Arc<RaidProtectionService>) -> Arc<Self> {
        let sweep_interval = service.config().sweep_interval;
        info!("Initializing WindowSweeper with interval {sweep_interval:?}");
        Arc::new(Self {
            service,
            sweep_interval,
            running: AtomicBool::new(false),
        })
    }

    /// Starts the sweep loop.
    pub fn start(self: Arc<Self>) -> anyhow::Result<()> {
        if !self.running.load(Ordering::SeqCst) {
            self.running.store(true, Ordering::SeqCst);
            info!("Starting WindowSweeper loop.");
            self.spawn_sweep_loop();
        }
        Ok(())
    }

    /// Stops the sweep loop.
    pub fn stop(self: Arc<Self>) -> anyhow::Result<()> {
        info!("Stopping WindowSweeper loop.");
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn spawn_sweep_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.sweep_interval);
        tokio::spawn(async move {
            loop {
                interval.tick().await;
                if !self.running.load(Ordering::SeqCst) {
                    info!("Stopping sweep loop.");
                    break;
                }

                let outcome = self.service.sweep(Utc::now());
                if outcome.evicted_entries > 0 || outcome.dropped_guilds > 0 {
                    debug!(
                        "Sweep evicted {} stale joins, dropped {} idle guilds",
                        outcome.evicted_entries, outcome.dropped_guilds
                    );
                }
            }
        });
    }
}

use std::sync::Arc;

use crate::config::Config;
use crate::event::event_bus::EventBus;
use crate::service::raid_protection_service::RaidProtectionService;

pub mod raid_protection_service;

pub struct Services {
    pub raid_protection: Arc<RaidProtectionService>,
}

impl Services {
    pub fn new(config: &Config, event_bus: Arc<EventBus>) -> Self {
        Self {
            raid_protection: Arc::new(RaidProtectionService::new(
                config.raid.clone(),
                event_bus,
            )),
        }
    }
}

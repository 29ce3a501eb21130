//! Common test utilities and mock subscribers.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use chrono::DateTime;
use chrono::TimeDelta;
use chrono::Utc;
use ward_bot::event::event_bus::EventBus;
use ward_bot::service::raid_protection_service::RaidConfig;
use ward_bot::service::raid_protection_service::RaidProtectionService;
use ward_bot::subscriber::Subscriber;

/// Builds a raid protection service with its own event bus.
#[allow(dead_code)]
pub fn setup_service(
    join_count_threshold: usize,
    timeframe_secs: u64,
) -> (Arc<RaidProtectionService>, Arc<EventBus>) {
    let event_bus = Arc::new(EventBus::new());
    let config = RaidConfig {
        join_count_threshold,
        timeframe: Duration::from_secs(timeframe_secs),
        ..Default::default()
    };
    let service = Arc::new(RaidProtectionService::new(config, event_bus.clone()));
    (service, event_bus)
}

/// Timestamp `ms` milliseconds after the epoch, matching how the tests
/// describe scenarios ("the 10th join at t=10s").
#[allow(dead_code)]
pub fn t(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::milliseconds(ms)
}

/// Polls `pred` until it holds or a short deadline passes.
///
/// Event dispatch happens on the bus's own runtime, so assertions about
/// delivered events have to wait for it.
#[allow(dead_code)]
pub fn wait_for(pred: impl Fn() -> bool) -> bool {
    for _ in 0..100 {
        if pred() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    pred()
}

/// Subscriber that records every event it receives.
pub struct RecordingSubscriber<E> {
    events: Mutex<Vec<E>>,
}

#[allow(dead_code)]
impl<E: Clone> RecordingSubscriber<E> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn events(&self) -> Vec<E> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl<E: Send + Sync + Clone + 'static> Subscriber<E> for RecordingSubscriber<E> {
    async fn callback(&self, event: E) -> Result<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// Subscriber that always fails, for error isolation tests.
#[allow(dead_code)]
pub struct FailingSubscriber;

#[async_trait::async_trait]
impl<E: Send + Sync + 'static> Subscriber<E> for FailingSubscriber {
    async fn callback(&self, _event: E) -> Result<()> {
        anyhow::bail!("simulated alert delivery failure")
    }
}

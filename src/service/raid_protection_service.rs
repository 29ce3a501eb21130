//! Join-rate raid detection with per-guild lockdown state.
//!
//! Keeps a sliding window of recent member joins per guild. When the number
//! of joins inside the trailing timeframe reaches the configured threshold,
//! the guild is put into lockdown and a [`RaidDetectedEvent`] is published.
//! Lockdown is lifted only by an explicit [`disable_lockdown`] call; there is
//! no automatic cooldown.
//!
//! All state is process memory. This is a soft defense heuristic, not a
//! durability-critical ledger, so losing it on restart is acceptable.
//!
//! [`disable_lockdown`]: RaidProtectionService::disable_lockdown

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use chrono::DateTime;
use chrono::TimeDelta;
use chrono::Utc;
use log::debug;
use log::info;

use crate::event::LockdownLiftedEvent;
use crate::event::RaidDetectedEvent;
use crate::event::event_bus::EventBus;

/// Deployment-level raid detection settings.
#[derive(Clone, Debug)]
pub struct RaidConfig {
    /// Joins within `timeframe` that trip the heuristic. Comparison is `>=`.
    pub join_count_threshold: usize,
    /// Length of the sliding window.
    pub timeframe: Duration,
    /// How often the background sweep evicts stale window entries.
    pub sweep_interval: Duration,
}

impl Default for RaidConfig {
    fn default() -> Self {
        Self {
            join_count_threshold: 10,
            timeframe: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

#[derive(Clone, Debug)]
struct JoinEntry {
    member_id: String,
    joined_at: DateTime<Utc>,
}

#[derive(Default)]
struct Lockdown {
    active: bool,
    activated_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct TrackerState {
    windows: HashMap<String, VecDeque<JoinEntry>>,
    lockdowns: HashMap<String, Lockdown>,
}

/// Counts reported by [`RaidProtectionService::sweep`] for logging.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    pub evicted_entries: usize,
    pub dropped_guilds: usize,
}

/// Tracks per-guild join rates and manages the lockdown flag.
///
/// The service has no I/O of its own and none of its operations can fail.
/// Side effects (alerts, permission changes) belong to subscribers of the
/// events it publishes.
pub struct RaidProtectionService {
    config: RaidConfig,
    event_bus: Arc<EventBus>,
    state: Mutex<TrackerState>,
}

impl RaidProtectionService {
    pub fn new(config: RaidConfig, event_bus: Arc<EventBus>) -> Self {
        info!(
            "Initializing raid protection: threshold {} joins / {:?}",
            config.join_count_threshold, config.timeframe
        );
        Self {
            config,
            event_bus,
            state: Mutex::new(TrackerState::default()),
        }
    }

    pub fn config(&self) -> &RaidConfig {
        &self.config
    }

    /// Records a member join in the guild's window.
    ///
    /// Creates the window lazily for unknown guilds. Entries that have
    /// already fallen out of the timeframe are purged from the front while
    /// we are here.
    pub fn record_join(&self, guild_id: &str, member_id: &str, now: DateTime<Utc>) {
        let cutoff = self.cutoff(now);
        let mut state = self.state.lock().unwrap();

        let window = state.windows.entry(guild_id.to_string()).or_default();
        while let Some(front) = window.front() {
            if front.joined_at > cutoff {
                break;
            }
            window.pop_front();
        }
        window.push_back(JoinEntry {
            member_id: member_id.to_string(),
            joined_at: now,
        });

        debug!(
            "Join recorded for guild {guild_id}: member {member_id} ({} in window)",
            window.len()
        );
    }

    /// Whether the guild's join count inside the active window has reached
    /// the threshold.
    ///
    /// Counts by timestamp rather than window length, so the answer decays
    /// as time passes even if nothing purges the window.
    pub fn is_raid_in_progress(&self, guild_id: &str, now: DateTime<Utc>) -> bool {
        self.window_len(guild_id, now) >= self.config.join_count_threshold
    }

    /// Number of joins for the guild inside the active window.
    pub fn window_len(&self, guild_id: &str, now: DateTime<Utc>) -> usize {
        let cutoff = self.cutoff(now);
        let state = self.state.lock().unwrap();

        state.windows.get(guild_id).map_or(0, |window| {
            window.iter().filter(|e| e.joined_at > cutoff).count()
        })
    }

    /// Member IDs of the joins inside the active window, oldest first.
    pub fn recent_joiners(&self, guild_id: &str, now: DateTime<Utc>) -> Vec<String> {
        let cutoff = self.cutoff(now);
        let state = self.state.lock().unwrap();

        state.windows.get(guild_id).map_or_else(Vec::new, |window| {
            window
                .iter()
                .filter(|e| e.joined_at > cutoff)
                .map(|e| e.member_id.clone())
                .collect()
        })
    }

    /// Checks the guild's join rate and activates lockdown if it indicates a
    /// raid.
    ///
    /// Idempotent while lockdown is active: a flood of joins during an
    /// active lockdown never publishes a second [`RaidDetectedEvent`].
    pub fn evaluate_and_handle(&self, guild_id: &str, now: DateTime<Utc>) {
        if !self.is_raid_in_progress(guild_id, now) {
            return;
        }

        let activated = {
            let mut state = self.state.lock().unwrap();
            let lockdown = state.lockdowns.entry(guild_id.to_string()).or_default();
            if lockdown.active {
                false
            } else {
                lockdown.active = true;
                lockdown.activated_at = Some(now);
                true
            }
        };

        if activated {
            info!("Raid detected in guild {guild_id}, lockdown activated");
            self.event_bus.publish(RaidDetectedEvent {
                guild_id: guild_id.to_string(),
                activated_at: now,
            });
        }
    }

    /// Records a join and immediately re-evaluates the guild.
    ///
    /// This is the entry point the gateway event handler calls for every
    /// `GuildMemberAddition`.
    pub fn handle_join(&self, guild_id: &str, member_id: &str, now: DateTime<Utc>) {
        self.record_join(guild_id, member_id, now);
        self.evaluate_and_handle(guild_id, now);
    }

    /// Lifts an active lockdown. Returns false if none was active.
    ///
    /// The join window is deliberately left untouched: if the raid is still
    /// ongoing, the very next join re-triggers lockdown.
    pub fn disable_lockdown(&self, guild_id: &str) -> bool {
        let lifted = {
            let mut state = self.state.lock().unwrap();
            match state.lockdowns.get_mut(guild_id) {
                Some(lockdown) if lockdown.active => {
                    lockdown.active = false;
                    lockdown.activated_at = None;
                    true
                }
                _ => false,
            }
        };

        if lifted {
            info!("Lockdown lifted for guild {guild_id}");
            self.event_bus.publish(LockdownLiftedEvent {
                guild_id: guild_id.to_string(),
            });
        }
        lifted
    }

    pub fn is_lockdown_active(&self, guild_id: &str) -> bool {
        let state = self.state.lock().unwrap();
        state.lockdowns.get(guild_id).is_some_and(|l| l.active)
    }

    pub fn lockdown_activated_at(&self, guild_id: &str) -> Option<DateTime<Utc>> {
        let state = self.state.lock().unwrap();
        state.lockdowns.get(guild_id).and_then(|l| l.activated_at)
    }

    /// Evicts expired window entries for every tracked guild and drops
    /// guilds whose window became empty. Lockdown state is never touched.
    pub fn sweep(&self, now: DateTime<Utc>) -> SweepOutcome {
        let cutoff = self.cutoff(now);
        let mut outcome = SweepOutcome::default();
        let mut state = self.state.lock().unwrap();

        state.windows.retain(|_, window| {
            let before = window.len();
            window.retain(|e| e.joined_at > cutoff);
            outcome.evicted_entries += before - window.len();

            if window.is_empty() {
                outcome.dropped_guilds += 1;
                false
            } else {
                true
            }
        });

        outcome
    }

    /// Oldest timestamp still considered inside the window at `now`.
    /// Entries at or before the cutoff are expired.
    fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - TimeDelta::milliseconds(self.config.timeframe.as_millis() as i64)
    }
}

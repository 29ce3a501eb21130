use chrono::DateTime;
use chrono::Utc;

pub mod event_bus;

/// Marker trait for events that can be dispatched through the event bus.
pub trait Event: std::any::Any + Send + Sync + 'static {
    /// Downcast this event to a concrete type.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Get the name of the event type.
    fn event_name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

/// Event fired when the join-rate heuristic trips and a guild enters lockdown.
///
/// Fired at most once per lockdown activation. Subscribers are expected to
/// post alerts and mirror the lockdown flag; the tracker itself performs no
/// messaging or permission changes.
#[derive(Clone, Debug)]
pub struct RaidDetectedEvent {
    pub guild_id: String,
    pub activated_at: DateTime<Utc>,
}

impl Event for RaidDetectedEvent {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Event fired when a lockdown is lifted by an explicit disable request.
#[derive(Clone, Debug)]
pub struct LockdownLiftedEvent {
    pub guild_id: String,
}

impl Event for LockdownLiftedEvent {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

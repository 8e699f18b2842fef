use crate::config::EventsConfig;
use crate::state_machine::{ChangeCause, StatusChange, StatusTarget, TransitionReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// A committed status change, as fanned out to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeNotification {
    pub mission_run_id: String,
    pub external_mission_id: String,
    pub target: StatusTarget,
    pub from: String,
    pub to: String,
    pub cause: ChangeCause,
    pub published_at: DateTime<Utc>,
}

impl StatusChangeNotification {
    fn new(mission_run_id: &str, external_mission_id: &str, change: &StatusChange) -> Self {
        Self {
            mission_run_id: mission_run_id.to_string(),
            external_mission_id: external_mission_id.to_string(),
            target: change.target.clone(),
            from: change.from.clone(),
            to: change.to.clone(),
            cause: change.cause,
            published_at: Utc::now(),
        }
    }
}

/// Broadcasts committed status changes to the real-time push channel
#[derive(Debug, Clone)]
pub struct StatusChangePublisher {
    sender: broadcast::Sender<StatusChangeNotification>,
}

impl StatusChangePublisher {
    /// Create a publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish every change in a committed transition. Returns how many
    /// notifications were sent.
    pub fn publish_report(&self, external_mission_id: &str, report: &TransitionReport) -> usize {
        for change in &report.changes {
            let notification =
                StatusChangeNotification::new(&report.mission_run_id, external_mission_id, change);
            // Sending only fails when nobody is subscribed, which is fine
            let _ = self.sender.send(notification);
        }
        report.changes.len()
    }

    /// Create a publisher sized from the `[events]` configuration section
    pub fn from_config(config: &EventsConfig) -> Self {
        Self::new(config.channel_capacity)
    }

    /// Subscribe to status changes
    pub fn subscribe(&self) -> broadcast::Receiver<StatusChangeNotification> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for StatusChangePublisher {
    fn default() -> Self {
        Self::new(1000)
    }
}

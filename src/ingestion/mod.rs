//! Inbound status reports from the robot controller.

pub mod sequencer;
pub mod status_event_ingestor;

pub use sequencer::StatusEventDispatcher;
pub use status_event_ingestor::{IngestOutcome, StatusEventIngestor, UnresolvedReference};

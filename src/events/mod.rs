pub mod publisher;

pub use publisher::{StatusChangeNotification, StatusChangePublisher};

pub mod mission_run_service;

pub use mission_run_service::MissionRunService;

use crate::models::RobotType;
use crate::state_machine::states::MissionStatus;
use serde::{Deserialize, Serialize};

/// Surface parameters for listing mission runs, as received from the HTTP layer.
///
/// Every filter is optional. Time bounds are epoch seconds and inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MissionRunQueryParameters {
    pub status: Option<MissionStatus>,
    pub robot_id: Option<String>,
    pub name_search: Option<String>,
    pub robot_name_search: Option<String>,
    pub tag_search: Option<String>,
    pub area: Option<String>,
    pub asset_code: Option<String>,
    pub robot_model_type: Option<RobotType>,
    pub min_start_time: Option<i64>,
    pub max_start_time: Option<i64>,
    pub min_end_time: Option<i64>,
    pub max_end_time: Option<i64>,
    pub min_desired_start_time: Option<i64>,
    pub max_desired_start_time: Option<i64>,
    /// 1-based, defaults to 1
    pub page_number: Option<u32>,
    /// Defaults to the configured page size, clamped to the configured maximum
    pub page_size: Option<u32>,
    /// Comma separated `<field>[ desc]` tokens
    pub order_by: Option<String>,
}

impl MissionRunQueryParameters {
    pub fn page(mut self, page_number: u32, page_size: u32) -> Self {
        self.page_number = Some(page_number);
        self.page_size = Some(page_size);
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = "2026-01-10", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2026-01-12", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    #[schema(example = "sick")]
    pub leave_type: String,

    #[schema(example = "pending")]
    pub status: String,

    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString, Serialize, Deserialize, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Annual,
    Sick,
    Unpaid,
}

impl LeaveType {
    /// Whether days covered by this leave kind still count as payable.
    pub fn is_paid(self) -> bool {
        !matches!(self, LeaveType::Unpaid)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString, Serialize, Deserialize, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

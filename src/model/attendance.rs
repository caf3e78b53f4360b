use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// One row per (employee, calendar day). Created on check-in, closed on
/// check-out or by the reconciliation job.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "09:00:00", value_type = String, nullable = true)]
    pub check_in: Option<NaiveTime>,

    #[schema(example = "18:00:00", value_type = String, nullable = true)]
    pub check_out: Option<NaiveTime>,

    #[schema(example = 9.0, nullable = true)]
    pub hours_worked: Option<f64>,

    #[schema(example = "present")]
    pub status: String,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString, Serialize, Deserialize, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    HalfDay,
}

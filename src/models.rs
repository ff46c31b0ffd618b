// viz-service/src/models.rs
use crate::schema::users;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Date, Int4, Nullable, Text};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// --- User Model ---
#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub email: Option<String>,
}

// --- Raw Report Rows ---
// Rows produced by the raw CTE queries in reports.rs. Every column is declared
// Nullable so that loading a result set never fails wholesale; required fields
// are enforced per row by the TryFrom conversions below, and rows that fail
// conversion are dropped individually (see reports::collect_decoded).

#[derive(QueryableByName, Debug)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectReportRow {
    #[diesel(sql_type = Nullable<Int4>)]
    pub id: Option<i32>,
    #[diesel(sql_type = Nullable<Text>)]
    pub name: Option<String>,
    #[diesel(sql_type = Nullable<Int4>)]
    pub estimated_hours: Option<i32>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub completed_records: Option<i64>,
}

#[derive(QueryableByName, Debug)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RecentTimesheetRow {
    #[diesel(sql_type = Nullable<diesel::sql_types::Uuid>)]
    pub id: Option<Uuid>,
    #[diesel(sql_type = Nullable<Date>)]
    pub start_date_of_the_week: Option<NaiveDate>,
    #[diesel(sql_type = Nullable<Bool>)]
    pub approved: Option<bool>,
    #[diesel(sql_type = Nullable<Text>)]
    pub project_name: Option<String>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub completed_count: Option<i64>,
}

#[derive(QueryableByName, Debug)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AllocationRow {
    #[diesel(sql_type = Nullable<Int4>)]
    pub project_id: Option<i32>,
    #[diesel(sql_type = Nullable<Text>)]
    pub project_name: Option<String>,
    #[diesel(sql_type = Nullable<Int4>)]
    pub estimated_hours: Option<i32>,
    #[diesel(sql_type = Nullable<diesel::sql_types::Uuid>)]
    pub employee_id: Option<Uuid>,
    #[diesel(sql_type = Nullable<Text>)]
    pub first_name: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub last_name: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub role: Option<String>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub completed_records: Option<i64>,
}

// --- Row Decode Errors ---

/// A result row was missing a column the response contract requires.
/// The offending row is skipped; sibling rows are unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDecodeError {
    pub column: &'static str,
}

impl RowDecodeError {
    fn missing(column: &'static str) -> Self {
        RowDecodeError { column }
    }
}

impl fmt::Display for RowDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "row is missing required column '{}'", self.column)
    }
}

// --- Response DTOs ---
// Shapes consumed by the dashboard front end, hence the camelCase keys.

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReportResponse {
    pub project_name: String,
    pub estimated_hours: i32,
    pub actual_hours: f64,
    pub remaining_hours: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RecentTimesheetResponse {
    pub id: Uuid,
    pub date: NaiveDate,
    pub status: String,
    pub hours: f64,
    // Single-element today (one timesheet belongs to one project); kept as a
    // list because the dashboard renders it as one.
    pub projects: Vec<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberResponse {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub avatar: String,
    pub estimated_hours: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAllocationResponse {
    pub project_id: i32,
    pub project_name: String,
    pub estimated_hours: f64,
    pub team: Vec<TeamMemberResponse>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationUserResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub role: String,
}

// Every completed time record counts for a fixed 8 hours; hours are never
// read from a duration column.
pub const HOURS_PER_COMPLETED_RECORD: f64 = 8.0;

fn approval_status(approved: Option<bool>) -> &'static str {
    if approved == Some(true) {
        "Approved"
    } else {
        "Pending"
    }
}

impl TryFrom<ProjectReportRow> for ProjectReportResponse {
    type Error = RowDecodeError;

    fn try_from(row: ProjectReportRow) -> Result<Self, Self::Error> {
        row.id.ok_or_else(|| RowDecodeError::missing("id"))?;
        let project_name = row.name.ok_or_else(|| RowDecodeError::missing("name"))?;

        let estimated_hours = row.estimated_hours.unwrap_or(0);
        let actual_hours = row.completed_records.unwrap_or(0) as f64 * HOURS_PER_COMPLETED_RECORD;

        Ok(ProjectReportResponse {
            project_name,
            estimated_hours,
            actual_hours,
            // Intentionally unclamped: over-spent projects report negative hours.
            remaining_hours: f64::from(estimated_hours) - actual_hours,
        })
    }
}

impl TryFrom<RecentTimesheetRow> for RecentTimesheetResponse {
    type Error = RowDecodeError;

    fn try_from(row: RecentTimesheetRow) -> Result<Self, Self::Error> {
        let id = row.id.ok_or_else(|| RowDecodeError::missing("id"))?;
        let date = row
            .start_date_of_the_week
            .ok_or_else(|| RowDecodeError::missing("start_date_of_the_week"))?;
        let project_name = row
            .project_name
            .ok_or_else(|| RowDecodeError::missing("project_name"))?;

        Ok(RecentTimesheetResponse {
            id,
            date,
            status: approval_status(row.approved).to_string(),
            hours: row.completed_count.unwrap_or(0) as f64 * HOURS_PER_COMPLETED_RECORD,
            projects: vec![project_name],
        })
    }
}

impl From<(User, String)> for OrganizationUserResponse {
    fn from((user, membership_role): (User, String)) -> Self {
        OrganizationUserResponse {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            // The organization-level role, not the user's base role.
            role: membership_role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report_row(estimated: Option<i32>, completed: i64) -> ProjectReportRow {
        ProjectReportRow {
            id: Some(7),
            name: Some("Internal Web App".to_string()),
            estimated_hours: estimated,
            completed_records: Some(completed),
        }
    }

    fn timesheet_row(approved: Option<bool>) -> RecentTimesheetRow {
        RecentTimesheetRow {
            id: Some(Uuid::new_v4()),
            start_date_of_the_week: NaiveDate::from_ymd_opt(2024, 1, 22),
            approved,
            project_name: Some("Mobile Integration".to_string()),
            completed_count: Some(3),
        }
    }

    #[test]
    fn report_counts_eight_hours_per_completed_record() {
        let report = ProjectReportResponse::try_from(report_row(Some(100), 5)).unwrap();
        assert_eq!(report.estimated_hours, 100);
        assert_eq!(report.actual_hours, 40.0);
        assert_eq!(report.remaining_hours, 60.0);
    }

    #[test]
    fn report_remaining_hours_go_negative_when_over_budget() {
        let report = ProjectReportResponse::try_from(report_row(Some(8), 3)).unwrap();
        assert_eq!(report.actual_hours, 24.0);
        assert_eq!(report.remaining_hours, -16.0);
    }

    #[test]
    fn report_defaults_missing_estimate_to_zero() {
        let report = ProjectReportResponse::try_from(report_row(None, 2)).unwrap();
        assert_eq!(report.estimated_hours, 0);
        assert_eq!(report.remaining_hours, -16.0);
    }

    #[test]
    fn report_row_without_name_is_rejected() {
        let mut row = report_row(Some(10), 1);
        row.name = None;
        let err = ProjectReportResponse::try_from(row).unwrap_err();
        assert_eq!(err.column, "name");
    }

    #[test]
    fn timesheet_status_is_approved_only_for_true_flag() {
        let approved = RecentTimesheetResponse::try_from(timesheet_row(Some(true))).unwrap();
        assert_eq!(approved.status, "Approved");

        let rejected = RecentTimesheetResponse::try_from(timesheet_row(Some(false))).unwrap();
        assert_eq!(rejected.status, "Pending");

        let unreviewed = RecentTimesheetResponse::try_from(timesheet_row(None)).unwrap();
        assert_eq!(unreviewed.status, "Pending");
    }

    #[test]
    fn timesheet_carries_its_project_as_single_element_list() {
        let sheet = RecentTimesheetResponse::try_from(timesheet_row(Some(true))).unwrap();
        assert_eq!(sheet.projects, vec!["Mobile Integration".to_string()]);
        assert_eq!(sheet.hours, 24.0);
    }

    #[test]
    fn timesheet_row_without_week_start_is_rejected() {
        let mut row = timesheet_row(None);
        row.start_date_of_the_week = None;
        let err = RecentTimesheetResponse::try_from(row).unwrap_err();
        assert_eq!(err.column, "start_date_of_the_week");
    }

    #[test]
    fn responses_serialize_with_camel_case_keys() {
        let report = ProjectReportResponse {
            project_name: "Internal Web App".to_string(),
            estimated_hours: 100,
            actual_hours: 40.0,
            remaining_hours: 60.0,
        };
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "projectName": "Internal Web App",
                "estimatedHours": 100,
                "actualHours": 40.0,
                "remainingHours": 60.0,
            })
        );

        let member_id = Uuid::new_v4();
        let allocation = ProjectAllocationResponse {
            project_id: 7,
            project_name: "Internal Web App".to_string(),
            estimated_hours: 100.0,
            team: vec![TeamMemberResponse {
                id: member_id,
                name: "Ada Lovelace".to_string(),
                role: "worker".to_string(),
                avatar: "AL".to_string(),
                estimated_hours: 16.0,
            }],
        };
        assert_eq!(
            serde_json::to_value(&allocation).unwrap(),
            json!({
                "projectId": 7,
                "projectName": "Internal Web App",
                "estimatedHours": 100.0,
                "team": [{
                    "id": member_id,
                    "name": "Ada Lovelace",
                    "role": "worker",
                    "avatar": "AL",
                    "estimatedHours": 16.0,
                }],
            })
        );
    }

    #[test]
    fn timesheet_date_serializes_as_plain_iso_date() {
        let sheet = RecentTimesheetResponse::try_from(timesheet_row(Some(true))).unwrap();
        let value = serde_json::to_value(&sheet).unwrap();
        assert_eq!(value["date"], json!("2024-01-22"));
    }
}

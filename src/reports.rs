// viz-service/src/reports.rs
//
// The aggregation core behind the dashboard endpoints. Each operation issues
// one CTE-staged SQL statement, decodes the rows leniently (bad rows are
// dropped, not fatal), and shapes the result for the front end.

use crate::error_handler::ServiceError;
use crate::models::{
    AllocationRow, ProjectAllocationResponse, ProjectReportResponse, ProjectReportRow,
    RecentTimesheetResponse, RecentTimesheetRow, RowDecodeError, TeamMemberResponse,
    HOURS_PER_COMPLETED_RECORD,
};
use diesel::sql_query;
use diesel::sql_types::Uuid as DieselUuid;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use std::collections::HashMap;
use uuid::Uuid;

/// Per-project progress: estimated hours against hours derived from completed
/// time records. Projects without timesheets appear with zero counts.
/// Result order is whatever the store returns.
pub async fn project_reports(
    conn: &mut AsyncPgConnection,
    organization_id: Uuid,
) -> Result<Vec<ProjectReportResponse>, ServiceError> {
    let query_str = r#"
        WITH project_hours AS (
            SELECT
                p.id,
                p.name,
                p.estimated_hours,
                COUNT(DISTINCT tr.id) AS total_records,
                COUNT(DISTINCT tr.id) FILTER (WHERE tr.end_time IS NOT NULL) AS completed_records
            FROM project p
            JOIN organization_user ou ON ou.user_id = p.project_manager_id AND ou.organization_id = $1
            LEFT JOIN timesheet t ON p.id = t.project_id
            LEFT JOIN time_record tr ON t.id = tr.timesheet_id
            GROUP BY p.id, p.name, p.estimated_hours
        )
        SELECT
            id,
            name,
            COALESCE(estimated_hours, 0) AS estimated_hours,
            total_records,
            completed_records
        FROM project_hours"#;

    let rows = sql_query(query_str)
        .bind::<DieselUuid, _>(organization_id)
        .load::<ProjectReportRow>(conn)
        .await
        .map_err(|e| {
            log::error!("Database error in project_reports: {:?}", e);
            ServiceError::from(e)
        })?;

    Ok(collect_decoded("project report", rows))
}

/// The three timesheets with the most recent week-start dates, newest first,
/// each carrying the name of its project.
pub async fn recent_timesheets(
    conn: &mut AsyncPgConnection,
    organization_id: Uuid,
) -> Result<Vec<RecentTimesheetResponse>, ServiceError> {
    let query_str = r#"
        WITH recent_timesheets AS (
            SELECT
                t.id,
                t.start_date_of_the_week,
                t.approved,
                p.name AS project_name,
                COUNT(tr.id) AS record_count,
                COUNT(tr.end_time) AS completed_count
            FROM timesheet t
            JOIN project p ON t.project_id = p.id
            JOIN organization_user ou ON p.project_manager_id = ou.user_id AND ou.organization_id = $1
            LEFT JOIN time_record tr ON t.id = tr.timesheet_id
            GROUP BY t.id, t.start_date_of_the_week, t.approved, p.name
            ORDER BY t.start_date_of_the_week DESC
            LIMIT 3
        )
        SELECT * FROM recent_timesheets"#;

    let rows = sql_query(query_str)
        .bind::<DieselUuid, _>(organization_id)
        .load::<RecentTimesheetRow>(conn)
        .await
        .map_err(|e| {
            log::error!("Database error in recent_timesheets: {:?}", e);
            ServiceError::from(e)
        })?;

    Ok(collect_decoded("recent timesheet", rows))
}

/// Who is booked on which project in the latest reporting week.
///
/// The latest week is the maximum week-start date among the organization's
/// timesheets. Every managed project appears; a project with no timesheet
/// that week yields one row with null employee columns and folds to an empty
/// team. An organization with no qualifying projects gets an empty list, not
/// an error.
pub async fn project_allocations(
    conn: &mut AsyncPgConnection,
    organization_id: Uuid,
) -> Result<Vec<ProjectAllocationResponse>, ServiceError> {
    let query_str = r#"
        WITH latest_week AS (
            SELECT t.start_date_of_the_week
            FROM timesheet t
            JOIN project p ON t.project_id = p.id
            JOIN organization_user ou ON p.project_manager_id = ou.user_id
            WHERE ou.organization_id = $1
            ORDER BY t.start_date_of_the_week DESC
            LIMIT 1
        ),
        current_allocations AS (
            SELECT
                p.id AS project_id,
                p.name AS project_name,
                p.estimated_hours,
                t.employee_id,
                u.first_name,
                u.last_name,
                emp_ou.role,
                COUNT(DISTINCT tr.id) AS total_records,
                COUNT(DISTINCT tr.id) FILTER (WHERE tr.end_time IS NOT NULL) AS completed_records
            FROM project p
            JOIN organization_user pm_ou ON pm_ou.user_id = p.project_manager_id
                AND pm_ou.organization_id = $1
            LEFT JOIN timesheet t ON p.id = t.project_id
                AND t.start_date_of_the_week = (SELECT start_date_of_the_week FROM latest_week)
            LEFT JOIN "user" u ON t.employee_id = u.id
            LEFT JOIN organization_user emp_ou ON t.employee_id = emp_ou.user_id
                AND emp_ou.organization_id = $1
            LEFT JOIN time_record tr ON t.id = tr.timesheet_id
            GROUP BY
                p.id, p.name, p.estimated_hours,
                t.employee_id, u.first_name, u.last_name, emp_ou.role
        )
        SELECT * FROM current_allocations"#;

    let rows = sql_query(query_str)
        .bind::<DieselUuid, _>(organization_id)
        .load::<AllocationRow>(conn)
        .await
        .map_err(|e| {
            log::error!("Database error in project_allocations: {:?}", e);
            ServiceError::from(e)
        })?;

    Ok(fold_allocations(rows))
}

// Applies the skip-on-decode-error policy: a row that cannot be converted is
// dropped and logged, the rest of the result set goes through.
fn collect_decoded<R, T>(context: &str, rows: Vec<R>) -> Vec<T>
where
    T: TryFrom<R, Error = RowDecodeError>,
{
    let mut decoded = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;

    for row in rows {
        match T::try_from(row) {
            Ok(value) => decoded.push(value),
            Err(e) => {
                skipped += 1;
                log::warn!("Skipping {} row: {}", context, e);
            }
        }
    }

    if skipped > 0 {
        log::warn!(
            "Dropped {} undecodable {} row(s), kept {}",
            skipped,
            context,
            decoded.len()
        );
    }

    decoded
}

// Folds the flat per-(project, employee) rows into one allocation per
// project. First-seen row order decides project order; a plain map would
// lose it when flattened, hence the Vec plus index side map.
fn fold_allocations(rows: Vec<AllocationRow>) -> Vec<ProjectAllocationResponse> {
    let mut allocations: Vec<ProjectAllocationResponse> = Vec::new();
    let mut slot_by_project: HashMap<i32, usize> = HashMap::new();
    let mut skipped = 0usize;

    for row in rows {
        let (project_id, project_name) = match (row.project_id, row.project_name.clone()) {
            (Some(id), Some(name)) => (id, name),
            _ => {
                skipped += 1;
                continue;
            }
        };

        let slot = match slot_by_project.get(&project_id) {
            Some(&slot) => slot,
            None => {
                allocations.push(ProjectAllocationResponse {
                    project_id,
                    project_name,
                    estimated_hours: f64::from(row.estimated_hours.unwrap_or(0)),
                    team: Vec::new(),
                });
                let slot = allocations.len() - 1;
                slot_by_project.insert(project_id, slot);
                slot
            }
        };

        // A project with no timesheet in the latest week arrives as a single
        // row with null employee columns: it contributes the project entry
        // only, leaving the team empty.
        if let Some(employee_id) = row.employee_id {
            let completed = row.completed_records.unwrap_or(0);
            allocations[slot].team.push(TeamMemberResponse {
                id: employee_id,
                name: full_name(row.first_name.as_deref(), row.last_name.as_deref()),
                avatar: initials(row.first_name.as_deref(), row.last_name.as_deref()),
                role: row.role.unwrap_or_else(|| "No Role".to_string()),
                estimated_hours: completed as f64 * HOURS_PER_COMPLETED_RECORD,
            });
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {} allocation row(s) without a project", skipped);
    }

    allocations
}

fn full_name(first: Option<&str>, last: Option<&str>) -> String {
    format!("{} {}", first.unwrap_or("Not Assigned"), last.unwrap_or(""))
        .trim_end()
        .to_string()
}

fn initials(first: Option<&str>, last: Option<&str>) -> String {
    let letters: String = first
        .and_then(|s| s.chars().next())
        .into_iter()
        .chain(last.and_then(|s| s.chars().next()))
        .flat_map(|c| c.to_uppercase())
        .collect();

    if letters.is_empty() {
        "N/A".to_string()
    } else {
        letters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_row(project_id: i32, name: &str, estimated: Option<i32>) -> AllocationRow {
        AllocationRow {
            project_id: Some(project_id),
            project_name: Some(name.to_string()),
            estimated_hours: estimated,
            employee_id: None,
            first_name: None,
            last_name: None,
            role: None,
            completed_records: Some(0),
        }
    }

    fn member_row(
        project_id: i32,
        name: &str,
        first: &str,
        last: &str,
        completed: i64,
    ) -> AllocationRow {
        AllocationRow {
            employee_id: Some(Uuid::new_v4()),
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            role: Some("worker".to_string()),
            completed_records: Some(completed),
            ..project_row(project_id, name, Some(100))
        }
    }

    #[test]
    fn fold_groups_members_under_their_project() {
        let rows = vec![
            member_row(1, "Internal Web App", "Alice", "Anderson", 2),
            member_row(1, "Internal Web App", "Bob", "Brown", 1),
            project_row(2, "Mobile Integration", Some(200)),
        ];

        let allocations = fold_allocations(rows);

        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].project_id, 1);
        let team: Vec<&str> = allocations[0].team.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(team, vec!["Alice Anderson", "Bob Brown"]);
        assert_eq!(allocations[1].project_id, 2);
        assert!(allocations[1].team.is_empty());
    }

    #[test]
    fn fold_keeps_first_seen_project_order_across_interleaved_rows() {
        let rows = vec![
            member_row(3, "Gamma", "Cara", "Clark", 1),
            member_row(1, "Alpha", "Dan", "Diaz", 1),
            member_row(3, "Gamma", "Eve", "Evans", 1),
        ];

        let allocations = fold_allocations(rows);

        let order: Vec<i32> = allocations.iter().map(|a| a.project_id).collect();
        assert_eq!(order, vec![3, 1]);
        assert_eq!(allocations[0].team.len(), 2);
    }

    #[test]
    fn fold_member_hours_are_eight_per_completed_record() {
        let allocations = fold_allocations(vec![member_row(1, "Alpha", "Fay", "Field", 4)]);
        assert_eq!(allocations[0].team[0].estimated_hours, 32.0);
    }

    #[test]
    fn fold_defaults_estimated_hours_to_zero() {
        let allocations = fold_allocations(vec![project_row(1, "Alpha", None)]);
        assert_eq!(allocations[0].estimated_hours, 0.0);
    }

    #[test]
    fn fold_fills_placeholders_when_user_join_found_nothing() {
        let row = AllocationRow {
            first_name: None,
            last_name: None,
            role: None,
            ..member_row(1, "Alpha", "", "", 0)
        };

        let allocations = fold_allocations(vec![row]);

        let member = &allocations[0].team[0];
        assert_eq!(member.name, "Not Assigned");
        assert_eq!(member.avatar, "N/A");
        assert_eq!(member.role, "No Role");
        assert_eq!(member.estimated_hours, 0.0);
    }

    #[test]
    fn fold_skips_rows_without_a_project() {
        let orphan = AllocationRow {
            project_id: None,
            ..member_row(1, "Alpha", "Gus", "Grant", 1)
        };
        let rows = vec![member_row(1, "Alpha", "Hana", "Hill", 1), orphan];

        let allocations = fold_allocations(rows);

        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].team.len(), 1);
    }

    #[test]
    fn fold_of_no_rows_is_an_empty_list() {
        assert!(fold_allocations(Vec::new()).is_empty());
    }

    #[test]
    fn decode_pass_drops_only_the_malformed_row() {
        let good = |name: &str| crate::models::ProjectReportRow {
            id: Some(1),
            name: Some(name.to_string()),
            estimated_hours: Some(10),
            completed_records: Some(1),
        };
        let bad = crate::models::ProjectReportRow {
            id: Some(2),
            name: None,
            estimated_hours: Some(10),
            completed_records: Some(1),
        };

        let rows = vec![good("a"), good("b"), bad, good("c")];
        let decoded: Vec<ProjectReportResponse> = collect_decoded("project report", rows);

        let names: Vec<&str> = decoded.iter().map(|r| r.project_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn initials_take_the_first_letter_of_each_name() {
        assert_eq!(initials(Some("ada"), Some("lovelace")), "AL");
        assert_eq!(initials(Some("Grace"), None), "G");
        assert_eq!(initials(Some(""), Some("")), "N/A");
        assert_eq!(initials(None, None), "N/A");
    }

    #[test]
    fn full_name_trims_when_last_name_is_absent() {
        assert_eq!(full_name(Some("Ada"), Some("Lovelace")), "Ada Lovelace");
        assert_eq!(full_name(None, None), "Not Assigned");
    }
}

// viz-service/src/handlers/dashboard_handlers.rs

use crate::db::DbPool;
use crate::error_handler::ServiceError;
use crate::org_scope::OrganizationScope;
use crate::reports;
use actix_web::{get, web, HttpResponse, Result as ActixResult};

// === GET /api/dashboard/projects/reports ===
#[get("/projects/reports")]
pub async fn get_project_reports_handler(
    pool: web::Data<DbPool>,
    org: OrganizationScope,
) -> ActixResult<HttpResponse, ServiceError> {
    log::info!("Fetching project reports for organization {}", org.id);

    let mut conn = pool.get().await.map_err(ServiceError::from)?;
    let report_list = reports::project_reports(&mut conn, org.id).await?;

    Ok(HttpResponse::Ok().json(report_list))
}

// === GET /api/dashboard/timesheets/recent ===
#[get("/timesheets/recent")]
pub async fn get_recent_timesheets_handler(
    pool: web::Data<DbPool>,
    org: OrganizationScope,
) -> ActixResult<HttpResponse, ServiceError> {
    log::info!("Fetching recent timesheets for organization {}", org.id);

    let mut conn = pool.get().await.map_err(ServiceError::from)?;
    let timesheet_list = reports::recent_timesheets(&mut conn, org.id).await?;

    Ok(HttpResponse::Ok().json(timesheet_list))
}

// === GET /api/dashboard/allocations ===
#[get("/allocations")]
pub async fn get_project_allocations_handler(
    pool: web::Data<DbPool>,
    org: OrganizationScope,
) -> ActixResult<HttpResponse, ServiceError> {
    log::info!("Fetching project allocations for organization {}", org.id);

    let mut conn = pool.get().await.map_err(ServiceError::from)?;
    let allocation_list = reports::project_allocations(&mut conn, org.id).await?;

    Ok(HttpResponse::Ok().json(allocation_list))
}

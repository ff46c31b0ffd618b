// viz-service/src/handlers/organization_handlers.rs

use crate::db::DbPool;
use crate::error_handler::ServiceError;
use crate::models::{OrganizationUserResponse, User};
use crate::schema::{organization_user, users};
use actix_web::{get, web, HttpResponse, Result as ActixResult};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

// === GET /api/organizations/{organization_id}/users ===
#[get("/{organization_id}/users")]
pub async fn list_organization_users_handler(
    pool: web::Data<DbPool>,
    organization_id_path: web::Path<Uuid>,
) -> ActixResult<HttpResponse, ServiceError> {
    let org_id = organization_id_path.into_inner();
    log::info!("Listing users of organization {}", org_id);

    let mut conn = pool.get().await.map_err(ServiceError::from)?;

    // An unknown organization simply has no members: empty list, not a 404.
    let members = users::table
        .inner_join(organization_user::table)
        .filter(organization_user::organization_id.eq(org_id))
        .select((User::as_select(), organization_user::role))
        .load::<(User, String)>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    let member_list: Vec<OrganizationUserResponse> = members
        .into_iter()
        .map(OrganizationUserResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(member_list))
}

pub mod dashboard_handlers;
pub mod organization_handlers;

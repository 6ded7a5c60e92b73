//! JSON REST handlers for the services of a robot.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use freight_terminal_domain::id::{CompanyId, RobotId, ServiceId};
use freight_terminal_domain::service::{Service, ServiceStatus, ServiceType};
use freight_terminal_domain::time::{self, Timestamp};

use super::{CreateResponse, GetResponse, ListResponse, NoContentResponse, parse_id};
use crate::error::ApiError;
use crate::state::{Adapters, AppState};

/// Request body for creating a service.
#[derive(Deserialize)]
pub struct CreateServiceRequest {
    #[serde(rename = "type")]
    pub kind: ServiceType,
    pub arrival_datetime: Option<Timestamp>,
    #[serde(default)]
    pub delay_time: u32,
    #[serde(default)]
    pub status: ServiceStatus,
}

/// Request body for rescheduling a service.
#[derive(Deserialize)]
pub struct UpdateServiceRequest {
    pub arrival_datetime: Timestamp,
    pub delay_time: u32,
}

/// Request body for `PUT .../status`.
#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: ServiceStatus,
}

fn robot_scope(company_id: &str, robot_id: &str) -> Result<(CompanyId, RobotId), ApiError> {
    Ok((
        parse_id("company_id", company_id)?,
        parse_id("robot_id", robot_id)?,
    ))
}

/// `GET /api/companies/{company_id}/robots/{robot_id}/services`
pub async fn list<A: Adapters>(
    State(state): State<AppState<A>>,
    Path((company_id, robot_id)): Path<(String, String)>,
) -> Result<ListResponse<Service>, ApiError> {
    let (company_id, robot_id) = robot_scope(&company_id, &robot_id)?;
    let services = state
        .fleet_service
        .list_services(company_id, robot_id)
        .await?;
    Ok(ListResponse::Ok(Json(services)))
}

/// `GET /api/companies/{company_id}/robots/{robot_id}/services/{id}`
pub async fn get<A: Adapters>(
    State(state): State<AppState<A>>,
    Path((company_id, robot_id, id)): Path<(String, String, String)>,
) -> Result<GetResponse<Service>, ApiError> {
    let (company_id, robot_id) = robot_scope(&company_id, &robot_id)?;
    let id = parse_id("id", &id)?;
    let service = state
        .fleet_service
        .get_service(company_id, robot_id, id)
        .await?;
    Ok(GetResponse::Ok(Json(service)))
}

/// `POST /api/companies/{company_id}/robots/{robot_id}/services`
///
/// The robot becomes busy.
pub async fn create<A: Adapters>(
    State(state): State<AppState<A>>,
    Path((company_id, robot_id)): Path<(String, String)>,
    Json(req): Json<CreateServiceRequest>,
) -> Result<CreateResponse<Service>, ApiError> {
    let (company_id, robot_id) = robot_scope(&company_id, &robot_id)?;
    let service = Service::builder()
        .robot_id(robot_id)
        .kind(req.kind)
        .arrival_datetime(req.arrival_datetime.unwrap_or_else(time::now))
        .delay_time(req.delay_time)
        .status(req.status)
        .build();
    let created = state
        .fleet_service
        .create_service(company_id, robot_id, service)
        .await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/companies/{company_id}/robots/{robot_id}/services/{id}`
pub async fn update<A: Adapters>(
    State(state): State<AppState<A>>,
    Path((company_id, robot_id, id)): Path<(String, String, String)>,
    Json(req): Json<UpdateServiceRequest>,
) -> Result<GetResponse<Service>, ApiError> {
    let (company_id, robot_id) = robot_scope(&company_id, &robot_id)?;
    let id: ServiceId = parse_id("id", &id)?;
    let service = Service::builder()
        .id(id)
        .robot_id(robot_id)
        .arrival_datetime(req.arrival_datetime)
        .delay_time(req.delay_time)
        .build();
    let updated = state
        .fleet_service
        .update_service(company_id, robot_id, service)
        .await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `PUT /api/companies/{company_id}/robots/{robot_id}/services/{id}/status`
pub async fn change_status<A: Adapters>(
    State(state): State<AppState<A>>,
    Path((company_id, robot_id, id)): Path<(String, String, String)>,
    Json(req): Json<StatusRequest>,
) -> Result<GetResponse<Service>, ApiError> {
    let (company_id, robot_id) = robot_scope(&company_id, &robot_id)?;
    let id = parse_id("id", &id)?;
    let service = state
        .fleet_service
        .change_service_status(company_id, robot_id, id, req.status)
        .await?;
    Ok(GetResponse::Ok(Json(service)))
}

/// `DELETE /api/companies/{company_id}/robots/{robot_id}/services/{id}`
pub async fn delete<A: Adapters>(
    State(state): State<AppState<A>>,
    Path((company_id, robot_id, id)): Path<(String, String, String)>,
) -> Result<NoContentResponse, ApiError> {
    let (company_id, robot_id) = robot_scope(&company_id, &robot_id)?;
    let id = parse_id("id", &id)?;
    state
        .fleet_service
        .delete_service(company_id, robot_id, id)
        .await?;
    Ok(NoContentResponse::NoContent)
}

//! JSON REST handlers for the robots of a company.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use freight_terminal_domain::id::{CompanyId, RobotId};
use freight_terminal_domain::robot::{Robot, RobotStatus, RobotType};

use super::{CreateResponse, GetResponse, ListResponse, NoContentResponse, parse_id};
use crate::error::ApiError;
use crate::state::{Adapters, AppState};

/// Request body for creating or replacing a robot.
#[derive(Deserialize)]
pub struct RobotRequest {
    pub model: String,
    #[serde(rename = "type")]
    pub kind: RobotType,
    #[serde(default)]
    pub status: RobotStatus,
}

impl RobotRequest {
    fn into_robot(self, id: RobotId, company_id: CompanyId) -> Robot {
        Robot {
            id,
            company_id,
            model: self.model,
            kind: self.kind,
            status: self.status,
        }
    }
}

/// `GET /api/companies/{company_id}/robots`
pub async fn list<A: Adapters>(
    State(state): State<AppState<A>>,
    Path(company_id): Path<String>,
) -> Result<ListResponse<Robot>, ApiError> {
    let company_id = parse_id("company_id", &company_id)?;
    let robots = state.fleet_service.list_robots(company_id).await?;
    Ok(ListResponse::Ok(Json(robots)))
}

/// `GET /api/companies/{company_id}/robots/{id}`
pub async fn get<A: Adapters>(
    State(state): State<AppState<A>>,
    Path((company_id, id)): Path<(String, String)>,
) -> Result<GetResponse<Robot>, ApiError> {
    let company_id = parse_id("company_id", &company_id)?;
    let id = parse_id("id", &id)?;
    let robot = state.fleet_service.get_robot(company_id, id).await?;
    Ok(GetResponse::Ok(Json(robot)))
}

/// `POST /api/companies/{company_id}/robots`
pub async fn create<A: Adapters>(
    State(state): State<AppState<A>>,
    Path(company_id): Path<String>,
    Json(req): Json<RobotRequest>,
) -> Result<CreateResponse<Robot>, ApiError> {
    let company_id = parse_id("company_id", &company_id)?;
    let robot = req.into_robot(RobotId::new(), company_id);
    let created = state.fleet_service.create_robot(company_id, robot).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/companies/{company_id}/robots/{id}`
pub async fn update<A: Adapters>(
    State(state): State<AppState<A>>,
    Path((company_id, id)): Path<(String, String)>,
    Json(req): Json<RobotRequest>,
) -> Result<GetResponse<Robot>, ApiError> {
    let company_id = parse_id("company_id", &company_id)?;
    let id = parse_id("id", &id)?;
    let updated = state
        .fleet_service
        .update_robot(company_id, req.into_robot(id, company_id))
        .await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `DELETE /api/companies/{company_id}/robots/{id}`
pub async fn delete<A: Adapters>(
    State(state): State<AppState<A>>,
    Path((company_id, id)): Path<(String, String)>,
) -> Result<NoContentResponse, ApiError> {
    let company_id = parse_id("company_id", &company_id)?;
    let id = parse_id("id", &id)?;
    state.fleet_service.delete_robot(company_id, id).await?;
    Ok(NoContentResponse::NoContent)
}

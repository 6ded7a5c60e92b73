//! JSON REST handlers for freights and their return workflow.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use freight_terminal_app::services::freight_service::{FreightChanges, NewFreight, TransferDraft};
use freight_terminal_domain::damage::HealthReport;
use freight_terminal_domain::freight::{Freight, FreightStatus};
use freight_terminal_domain::id::ServiceId;

use super::{CreateResponse, GetResponse, ListResponse, NoContentResponse, parse_id};
use crate::error::ApiError;
use crate::state::{Adapters, AppState};

/// Inline transfer pairing two existing services.
#[derive(Deserialize)]
pub struct TransferRequest {
    pub delivery_service: ServiceId,
    pub reception_service: ServiceId,
}

impl From<TransferRequest> for TransferDraft {
    fn from(req: TransferRequest) -> Self {
        Self {
            delivery_service_id: req.delivery_service,
            reception_service_id: req.reception_service,
        }
    }
}

/// Request body for creating a freight.
#[derive(Deserialize)]
pub struct CreateFreightRequest {
    pub name: String,
    pub status: Option<FreightStatus>,
    pub transfer: Option<TransferRequest>,
}

/// Request body for updating a freight. Omitted fields are kept.
#[derive(Deserialize)]
pub struct UpdateFreightRequest {
    pub name: Option<String>,
    pub status: Option<FreightStatus>,
    pub transfer: Option<TransferRequest>,
}

/// `GET /api/freights`
pub async fn list<A: Adapters>(
    State(state): State<AppState<A>>,
) -> Result<ListResponse<Freight>, ApiError> {
    let freights = state.freight_service.list_freights().await?;
    Ok(ListResponse::Ok(Json(freights)))
}

/// `GET /api/freights/{id}`
pub async fn get<A: Adapters>(
    State(state): State<AppState<A>>,
    Path(id): Path<String>,
) -> Result<GetResponse<Freight>, ApiError> {
    let id = parse_id("id", &id)?;
    let freight = state.freight_service.get_freight(id).await?;
    Ok(GetResponse::Ok(Json(freight)))
}

/// `POST /api/freights`
pub async fn create<A: Adapters>(
    State(state): State<AppState<A>>,
    Json(req): Json<CreateFreightRequest>,
) -> Result<CreateResponse<Freight>, ApiError> {
    let created = state
        .freight_service
        .create_freight(NewFreight {
            name: req.name,
            status: req.status,
            transfer: req.transfer.map(TransferDraft::from),
        })
        .await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/freights/{id}`
pub async fn update<A: Adapters>(
    State(state): State<AppState<A>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateFreightRequest>,
) -> Result<GetResponse<Freight>, ApiError> {
    let id = parse_id("id", &id)?;
    let updated = state
        .freight_service
        .update_freight(
            id,
            FreightChanges {
                name: req.name,
                status: req.status,
                transfer: req.transfer.map(TransferDraft::from),
            },
        )
        .await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `DELETE /api/freights/{id}`
pub async fn delete<A: Adapters>(
    State(state): State<AppState<A>>,
    Path(id): Path<String>,
) -> Result<NoContentResponse, ApiError> {
    let id = parse_id("id", &id)?;
    state.freight_service.delete_freight(id).await?;
    Ok(NoContentResponse::NoContent)
}

/// `POST /api/freights/{id}/check-health`
pub async fn check_health<A: Adapters>(
    State(state): State<AppState<A>>,
    Path(id): Path<String>,
) -> Result<GetResponse<HealthReport>, ApiError> {
    let id = parse_id("id", &id)?;
    let report = state.monitoring_service.check_health(id).await?;
    Ok(GetResponse::Ok(Json(report)))
}

/// `POST /api/freights/{id}/return`
pub async fn start_return<A: Adapters>(
    State(state): State<AppState<A>>,
    Path(id): Path<String>,
) -> Result<NoContentResponse, ApiError> {
    let id = parse_id("id", &id)?;
    state.freight_service.start_return(id).await?;
    Ok(NoContentResponse::NoContent)
}

/// `POST /api/freights/{id}/return/finish`
pub async fn finish_return<A: Adapters>(
    State(state): State<AppState<A>>,
    Path(id): Path<String>,
) -> Result<NoContentResponse, ApiError> {
    let id = parse_id("id", &id)?;
    state.freight_service.finish_return(id).await?;
    Ok(NoContentResponse::NoContent)
}

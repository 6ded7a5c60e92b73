//! JSON REST handlers for devices.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use freight_terminal_domain::device::{Device, Prefix, Unit};
use freight_terminal_domain::id::DeviceId;

use super::{CreateResponse, GetResponse, ListResponse, NoContentResponse, parse_id};
use crate::error::ApiError;
use crate::state::{Adapters, AppState};

/// Request body for creating or replacing a device.
#[derive(Deserialize)]
pub struct DeviceRequest {
    pub name: String,
    pub unit: Unit,
    pub prefix: Option<Prefix>,
    pub min_value: f64,
    pub max_value: f64,
}

impl DeviceRequest {
    fn into_device(self, id: DeviceId) -> Device {
        Device {
            id,
            name: self.name,
            unit: self.unit,
            prefix: self.prefix,
            min_value: self.min_value,
            max_value: self.max_value,
        }
    }
}

/// `GET /api/devices`
pub async fn list<A: Adapters>(
    State(state): State<AppState<A>>,
) -> Result<ListResponse<Device>, ApiError> {
    let devices = state.device_service.list_devices().await?;
    Ok(ListResponse::Ok(Json(devices)))
}

/// `GET /api/devices/{id}`
pub async fn get<A: Adapters>(
    State(state): State<AppState<A>>,
    Path(id): Path<String>,
) -> Result<GetResponse<Device>, ApiError> {
    let id = parse_id("id", &id)?;
    let device = state.device_service.get_device(id).await?;
    Ok(GetResponse::Ok(Json(device)))
}

/// `POST /api/devices`
pub async fn create<A: Adapters>(
    State(state): State<AppState<A>>,
    Json(req): Json<DeviceRequest>,
) -> Result<CreateResponse<Device>, ApiError> {
    let device = req.into_device(DeviceId::new());
    let created = state.device_service.create_device(device).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/devices/{id}`
pub async fn update<A: Adapters>(
    State(state): State<AppState<A>>,
    Path(id): Path<String>,
    Json(req): Json<DeviceRequest>,
) -> Result<GetResponse<Device>, ApiError> {
    let id = parse_id("id", &id)?;
    let updated = state.device_service.update_device(req.into_device(id)).await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `DELETE /api/devices/{id}`
pub async fn delete<A: Adapters>(
    State(state): State<AppState<A>>,
    Path(id): Path<String>,
) -> Result<NoContentResponse, ApiError> {
    let id = parse_id("id", &id)?;
    state.device_service.delete_device(id).await?;
    Ok(NoContentResponse::NoContent)
}

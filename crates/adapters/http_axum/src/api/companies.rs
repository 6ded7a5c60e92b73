//! JSON REST handlers for companies.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use freight_terminal_domain::company::{Company, CompanyType};
use freight_terminal_domain::id::CompanyId;

use super::{CreateResponse, GetResponse, ListResponse, NoContentResponse, parse_id};
use crate::error::ApiError;
use crate::state::{Adapters, AppState};

/// Request body for creating or replacing a company.
#[derive(Deserialize)]
pub struct CompanyRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CompanyType,
}

impl CompanyRequest {
    fn into_company(self, id: CompanyId) -> Company {
        Company {
            id,
            name: self.name,
            kind: self.kind,
        }
    }
}

/// `GET /api/companies`
pub async fn list<A: Adapters>(
    State(state): State<AppState<A>>,
) -> Result<ListResponse<Company>, ApiError> {
    let companies = state.company_service.list_companies().await?;
    Ok(ListResponse::Ok(Json(companies)))
}

/// `GET /api/companies/types`
pub async fn types<A: Adapters>(State(state): State<AppState<A>>) -> ListResponse<CompanyType> {
    ListResponse::Ok(Json(state.company_service.company_types().to_vec()))
}

/// `GET /api/companies/{id}`
pub async fn get<A: Adapters>(
    State(state): State<AppState<A>>,
    Path(id): Path<String>,
) -> Result<GetResponse<Company>, ApiError> {
    let id = parse_id("id", &id)?;
    let company = state.company_service.get_company(id).await?;
    Ok(GetResponse::Ok(Json(company)))
}

/// `POST /api/companies`
pub async fn create<A: Adapters>(
    State(state): State<AppState<A>>,
    Json(req): Json<CompanyRequest>,
) -> Result<CreateResponse<Company>, ApiError> {
    let created = state
        .company_service
        .create_company(req.into_company(CompanyId::new()))
        .await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/companies/{id}`
pub async fn update<A: Adapters>(
    State(state): State<AppState<A>>,
    Path(id): Path<String>,
    Json(req): Json<CompanyRequest>,
) -> Result<GetResponse<Company>, ApiError> {
    let id = parse_id("id", &id)?;
    let updated = state
        .company_service
        .update_company(req.into_company(id))
        .await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `DELETE /api/companies/{id}`
pub async fn delete<A: Adapters>(
    State(state): State<AppState<A>>,
    Path(id): Path<String>,
) -> Result<NoContentResponse, ApiError> {
    let id = parse_id("id", &id)?;
    state.company_service.delete_company(id).await?;
    Ok(NoContentResponse::NoContent)
}

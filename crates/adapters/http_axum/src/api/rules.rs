//! JSON REST handlers for the rules of a freight.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use freight_terminal_domain::damage::RuleStats;
use freight_terminal_domain::id::{DeviceId, FreightId, RuleId};
use freight_terminal_domain::rule::{DEFAULT_TIME_INTERVAL, Rule};

use super::{CreateResponse, GetResponse, ListResponse, NoContentResponse, parse_id};
use crate::error::ApiError;
use crate::state::{Adapters, AppState};

fn default_time_interval() -> u32 {
    DEFAULT_TIME_INTERVAL
}

/// Request body for creating or replacing a rule.
#[derive(Deserialize)]
pub struct RuleRequest {
    pub device_id: DeviceId,
    pub coefficient: f64,
    pub min_value: f64,
    pub max_value: f64,
    #[serde(default)]
    pub possible_deviation: f64,
    /// Seconds.
    #[serde(default = "default_time_interval")]
    pub time_interval: u32,
}

impl RuleRequest {
    fn into_rule(self, id: RuleId, freight_id: FreightId) -> Rule {
        Rule {
            id,
            freight_id,
            device_id: self.device_id,
            coefficient: self.coefficient,
            min_value: self.min_value,
            max_value: self.max_value,
            possible_deviation: self.possible_deviation,
            time_interval: self.time_interval,
            stats: RuleStats::default(),
        }
    }
}

/// `GET /api/freights/{freight_id}/rules`
pub async fn list<A: Adapters>(
    State(state): State<AppState<A>>,
    Path(freight_id): Path<String>,
) -> Result<ListResponse<Rule>, ApiError> {
    let freight_id = parse_id("freight_id", &freight_id)?;
    let rules = state.rule_service.list_rules(freight_id).await?;
    Ok(ListResponse::Ok(Json(rules)))
}

/// `GET /api/freights/{freight_id}/rules/{id}`
pub async fn get<A: Adapters>(
    State(state): State<AppState<A>>,
    Path((freight_id, id)): Path<(String, String)>,
) -> Result<GetResponse<Rule>, ApiError> {
    let freight_id = parse_id("freight_id", &freight_id)?;
    let id = parse_id("id", &id)?;
    let rule = state.rule_service.get_rule(freight_id, id).await?;
    Ok(GetResponse::Ok(Json(rule)))
}

/// `POST /api/freights/{freight_id}/rules`
pub async fn create<A: Adapters>(
    State(state): State<AppState<A>>,
    Path(freight_id): Path<String>,
    Json(req): Json<RuleRequest>,
) -> Result<CreateResponse<Rule>, ApiError> {
    let freight_id = parse_id("freight_id", &freight_id)?;
    let rule = req.into_rule(RuleId::new(), freight_id);
    let created = state.rule_service.create_rule(freight_id, rule).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/freights/{freight_id}/rules/{id}`
pub async fn update<A: Adapters>(
    State(state): State<AppState<A>>,
    Path((freight_id, id)): Path<(String, String)>,
    Json(req): Json<RuleRequest>,
) -> Result<GetResponse<Rule>, ApiError> {
    let freight_id = parse_id("freight_id", &freight_id)?;
    let id = parse_id("id", &id)?;
    let updated = state
        .rule_service
        .update_rule(freight_id, req.into_rule(id, freight_id))
        .await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `DELETE /api/freights/{freight_id}/rules/{id}`
pub async fn delete<A: Adapters>(
    State(state): State<AppState<A>>,
    Path((freight_id, id)): Path<(String, String)>,
) -> Result<NoContentResponse, ApiError> {
    let freight_id = parse_id("freight_id", &freight_id)?;
    let id = parse_id("id", &id)?;
    state.rule_service.delete_rule(freight_id, id).await?;
    Ok(NoContentResponse::NoContent)
}

//! JSON REST handlers for the states of a rule.
//!
//! Recording a state runs the damage evaluation of its rule.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use freight_terminal_domain::damage::Verdict;
use freight_terminal_domain::id::{FreightId, RuleId};
use freight_terminal_domain::state::State as Reading;

use super::{CreateResponse, GetResponse, ListResponse, NoContentResponse, parse_id};
use crate::error::ApiError;
use crate::state::{Adapters, AppState};

/// Request body for recording a state.
#[derive(Deserialize)]
pub struct StateRequest {
    pub value: f64,
}

/// A recorded state with the verdict of its rule.
#[derive(Serialize)]
pub struct RecordedStateBody {
    #[serde(flatten)]
    pub state: Reading,
    pub verdict: Verdict,
}

fn rule_scope(freight_id: &str, rule_id: &str) -> Result<(FreightId, RuleId), ApiError> {
    Ok((
        parse_id("freight_id", freight_id)?,
        parse_id("rule_id", rule_id)?,
    ))
}

/// `GET /api/freights/{freight_id}/rules/{rule_id}/states`
pub async fn list<A: Adapters>(
    State(state): State<AppState<A>>,
    Path((freight_id, rule_id)): Path<(String, String)>,
) -> Result<ListResponse<Reading>, ApiError> {
    let (freight_id, rule_id) = rule_scope(&freight_id, &rule_id)?;
    let states = state
        .monitoring_service
        .list_states(freight_id, rule_id)
        .await?;
    Ok(ListResponse::Ok(Json(states)))
}

/// `GET /api/freights/{freight_id}/rules/{rule_id}/states/{id}`
pub async fn get<A: Adapters>(
    State(state): State<AppState<A>>,
    Path((freight_id, rule_id, id)): Path<(String, String, String)>,
) -> Result<GetResponse<Reading>, ApiError> {
    let (freight_id, rule_id) = rule_scope(&freight_id, &rule_id)?;
    let id = parse_id("id", &id)?;
    let reading = state
        .monitoring_service
        .get_state(freight_id, rule_id, id)
        .await?;
    Ok(GetResponse::Ok(Json(reading)))
}

/// `POST /api/freights/{freight_id}/rules/{rule_id}/states`
pub async fn create<A: Adapters>(
    State(state): State<AppState<A>>,
    Path((freight_id, rule_id)): Path<(String, String)>,
    Json(req): Json<StateRequest>,
) -> Result<CreateResponse<RecordedStateBody>, ApiError> {
    let (freight_id, rule_id) = rule_scope(&freight_id, &rule_id)?;
    let recorded = state
        .monitoring_service
        .record_state(freight_id, rule_id, req.value)
        .await?;
    Ok(CreateResponse::Created(Json(RecordedStateBody {
        state: recorded.state,
        verdict: recorded.verdict,
    })))
}

/// `DELETE /api/freights/{freight_id}/rules/{rule_id}/states/{id}`
pub async fn delete<A: Adapters>(
    State(state): State<AppState<A>>,
    Path((freight_id, rule_id, id)): Path<(String, String, String)>,
) -> Result<NoContentResponse, ApiError> {
    let (freight_id, rule_id) = rule_scope(&freight_id, &rule_id)?;
    let id = parse_id("id", &id)?;
    state
        .monitoring_service
        .delete_state(freight_id, rule_id, id)
        .await?;
    Ok(NoContentResponse::NoContent)
}

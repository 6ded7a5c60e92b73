//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod companies;
#[allow(clippy::missing_errors_doc)]
pub mod devices;
#[allow(clippy::missing_errors_doc)]
pub mod freights;
#[allow(clippy::missing_errors_doc)]
pub mod robots;
#[allow(clippy::missing_errors_doc)]
pub mod rules;
#[allow(clippy::missing_errors_doc)]
pub mod services;
#[allow(clippy::missing_errors_doc)]
pub mod states;

use std::str::FromStr;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};

use crate::error::ApiError;
use crate::state::{Adapters, AppState};

/// Possible responses from a list endpoint.
pub enum ListResponse<T> {
    Ok(Json<Vec<T>>),
}

impl<T: serde::Serialize> IntoResponse for ListResponse<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from a get or update endpoint.
pub enum GetResponse<T> {
    Ok(Json<T>),
}

impl<T: serde::Serialize> IntoResponse for GetResponse<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from a create endpoint.
pub enum CreateResponse<T> {
    Created(Json<T>),
}

impl<T: serde::Serialize> IntoResponse for CreateResponse<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from delete and void endpoints.
pub enum NoContentResponse {
    NoContent,
}

impl IntoResponse for NoContentResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// Parse an identifier taken from the path.
pub(crate) fn parse_id<T: FromStr>(field: &'static str, raw: &str) -> Result<T, ApiError> {
    T::from_str(raw).map_err(|_| ApiError::invalid_id(field))
}

/// Build the `/api` sub-router.
pub fn routes<A: Adapters>() -> Router<AppState<A>> {
    Router::new()
        // Devices
        .route(
            "/devices",
            get(devices::list::<A>).post(devices::create::<A>),
        )
        .route(
            "/devices/{id}",
            get(devices::get::<A>)
                .put(devices::update::<A>)
                .delete(devices::delete::<A>),
        )
        // Companies
        .route(
            "/companies",
            get(companies::list::<A>).post(companies::create::<A>),
        )
        .route("/companies/types", get(companies::types::<A>))
        .route(
            "/companies/{id}",
            get(companies::get::<A>)
                .put(companies::update::<A>)
                .delete(companies::delete::<A>),
        )
        // Robots
        .route(
            "/companies/{company_id}/robots",
            get(robots::list::<A>).post(robots::create::<A>),
        )
        .route(
            "/companies/{company_id}/robots/{id}",
            get(robots::get::<A>)
                .put(robots::update::<A>)
                .delete(robots::delete::<A>),
        )
        // Services
        .route(
            "/companies/{company_id}/robots/{robot_id}/services",
            get(services::list::<A>).post(services::create::<A>),
        )
        .route(
            "/companies/{company_id}/robots/{robot_id}/services/{id}",
            get(services::get::<A>)
                .put(services::update::<A>)
                .delete(services::delete::<A>),
        )
        .route(
            "/companies/{company_id}/robots/{robot_id}/services/{id}/status",
            put(services::change_status::<A>),
        )
        // Freights
        .route(
            "/freights",
            get(freights::list::<A>).post(freights::create::<A>),
        )
        .route(
            "/freights/{id}",
            get(freights::get::<A>)
                .put(freights::update::<A>)
                .delete(freights::delete::<A>),
        )
        .route(
            "/freights/{id}/check-health",
            post(freights::check_health::<A>),
        )
        .route("/freights/{id}/return", post(freights::start_return::<A>))
        .route(
            "/freights/{id}/return/finish",
            post(freights::finish_return::<A>),
        )
        // Rules
        .route(
            "/freights/{freight_id}/rules",
            get(rules::list::<A>).post(rules::create::<A>),
        )
        .route(
            "/freights/{freight_id}/rules/{id}",
            get(rules::get::<A>)
                .put(rules::update::<A>)
                .delete(rules::delete::<A>),
        )
        // States
        .route(
            "/freights/{freight_id}/rules/{rule_id}/states",
            get(states::list::<A>).post(states::create::<A>),
        )
        .route(
            "/freights/{freight_id}/rules/{rule_id}/states/{id}",
            get(states::get::<A>).delete(states::delete::<A>),
        )
}

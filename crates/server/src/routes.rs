//! The public API surface: product summarization and outlet lookup.
//!
//! Missing `query` parameters come back as 422. Product collaborator
//! failures are 500 with a user-safe detail; outlet store failures are
//! reported inside the 200 envelope as `success: false`, which is the
//! contract chat clients consume.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use kopi_agent::tools::{OutletTool, ProductTool};
use kopi_core::domain::outlet::OutletSummary;
use kopi_core::{ApplicationError, InterfaceError};

#[derive(Clone)]
pub struct ApiState {
    pub products: Arc<ProductTool>,
    pub outlets: Arc<OutletTool>,
}

#[derive(Debug, Deserialize)]
pub struct QueryParams {
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct OutletResponse {
    pub result: OutletResult,
}

#[derive(Debug, Serialize)]
pub struct OutletResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<OutletSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/products", get(get_products))
        .route("/api/outlets", get(get_outlets))
        .with_state(state)
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn missing_query() -> ApiError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorBody { detail: "query parameter is required".to_string() }),
    )
}

pub async fn get_products(
    State(state): State<ApiState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<ProductResponse>, ApiError> {
    let Some(query) = params.query.filter(|query| !query.trim().is_empty()) else {
        return Err(missing_query());
    };

    match state.products.answer(&query).await {
        Ok(summary) => Ok(Json(ProductResponse { summary })),
        Err(failure) => {
            let correlation_id = Uuid::new_v4().to_string();
            error!(
                event_name = "api.products.failed",
                correlation_id = %correlation_id,
                error = %failure,
                "product summarization failed"
            );
            let interface: InterfaceError =
                ApplicationError::Integration(failure.to_string()).into_interface(correlation_id);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody { detail: interface.user_message().to_string() }),
            ))
        }
    }
}

pub async fn get_outlets(
    State(state): State<ApiState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<OutletResponse>, ApiError> {
    let Some(query) = params.query.filter(|query| !query.trim().is_empty()) else {
        return Err(missing_query());
    };

    match state.outlets.lookup(&query).await {
        Ok(outcome) => Ok(Json(OutletResponse {
            result: OutletResult {
                success: true,
                sql_query: Some(outcome.sql_query),
                results: Some(outcome.results),
                error: None,
            },
        })),
        Err(failure) => {
            let correlation_id = Uuid::new_v4().to_string();
            error!(
                event_name = "api.outlets.failed",
                correlation_id = %correlation_id,
                error = %failure,
                "outlet lookup failed"
            );
            Ok(Json(OutletResponse {
                result: OutletResult {
                    success: false,
                    sql_query: None,
                    results: None,
                    error: Some("outlet lookup failed".to_string()),
                },
            }))
        }
    }
}

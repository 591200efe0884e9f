use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use bubblehouse_catalog::CatalogSource;
use bubblehouse_sync::EmbedTarget;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct EmbedQuery {
    pub customer_id: Option<String>,
}

/// Settings are read per request; incomplete settings yield the placeholder.
pub(super) async fn embed_target<S: CatalogSource + 'static>(
    State(state): State<AppState<S>>,
    Extension(req_id): Extension<RequestId>,
    Path(page): Path<String>,
    Query(query): Query<EmbedQuery>,
) -> Json<ApiResponse<EmbedTarget>> {
    let settings = match state.scheduler.runner().settings_source().load() {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!(error = %e, "embed: settings unavailable");
            None
        }
    };

    let target = bubblehouse_sync::embed_target(
        settings.as_ref(),
        &state.block_version,
        &page,
        query.customer_id.as_deref(),
    );

    Json(ApiResponse {
        data: target,
        meta: ResponseMeta::new(req_id.0),
    })
}

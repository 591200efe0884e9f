use axum::{extract::State, http::StatusCode, Extension, Json};
use bubblehouse_catalog::CatalogSource;
use bubblehouse_sync::CycleReport;
use serde::Serialize;

use crate::middleware::RequestId;
use crate::scheduler::{SchedulerSnapshot, TriggerResult};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct SyncStatusData {
    #[serde(flatten)]
    scheduler: SchedulerSnapshot,
    last_cycle: Option<CycleReport>,
}

#[derive(Debug, Serialize)]
pub(super) struct TriggerData {
    status: &'static str,
}

pub(super) async fn sync_status<S: CatalogSource + 'static>(
    State(state): State<AppState<S>>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<SyncStatusData>> {
    let scheduler = state.scheduler.snapshot().await;
    let last_cycle = state.scheduler.runner().last_report().await;

    Json(ApiResponse {
        data: SyncStatusData {
            scheduler,
            last_cycle,
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn trigger_sync<S: CatalogSource + 'static>(
    State(state): State<AppState<S>>,
    Extension(req_id): Extension<RequestId>,
) -> Result<(StatusCode, Json<ApiResponse<TriggerData>>), ApiError> {
    let result = state.scheduler.trigger().await.map_err(|e| {
        tracing::error!(error = %e, "scheduler: failed to enqueue manual sync");
        ApiError::new(req_id.0.clone(), "internal_error", "failed to enqueue sync")
    })?;

    let (status, label) = match result {
        TriggerResult::Enqueued => (StatusCode::ACCEPTED, "enqueued"),
        TriggerResult::AlreadyPending => (StatusCode::OK, "already_pending"),
    };

    Ok((
        status,
        Json(ApiResponse {
            data: TriggerData { status: label },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

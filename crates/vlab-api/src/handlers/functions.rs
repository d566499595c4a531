//! Function trigger handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;

use crate::error::ApiResult;
use crate::event::decode_event;
use crate::functions::{self, FunctionOutcome};
use crate::state::AppState;

/// `POST /functions/localize-objects`
pub async fn localize_objects(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<FunctionOutcome>> {
    let event = decode_event(&body)?;
    let outcome =
        functions::localize_objects(&state.vision, state.storage.as_ref(), state.result_bucket(), &event).await?;
    Ok(Json(outcome))
}

/// `POST /functions/detect-faces`
pub async fn detect_faces(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<FunctionOutcome>> {
    let event = decode_event(&body)?;
    let outcome =
        functions::detect_faces(&state.vision, state.storage.as_ref(), state.result_bucket(), &event).await?;
    Ok(Json(outcome))
}

use crate::services::render::{render_proximity_result, render_zip_result};
use crate::services::{record_lookup, zip_filter, ProximityQuery};
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    response::Response,
};
use service_core::error::AppError;

/// `GET /near/zip/:zip` - redirect to the coordinates of the first matching
/// record, or home when there is none.
///
/// A store failure here is fatal: the shutdown token is cancelled so the
/// process stops serving once in-flight requests drain.
#[tracing::instrument(skip(state))]
pub async fn near_zip(
    State(state): State<AppState>,
    Path(zip): Path<String>,
) -> Result<Response, AppError> {
    match state.store.find(zip_filter(&zip), None).await {
        Ok(records) => {
            record_lookup("zip", if records.is_empty() { "empty" } else { "found" });
            Ok(render_zip_result(&records))
        }
        Err(e) => {
            record_lookup("zip", "error");
            tracing::error!(error = %e, "Zip lookup failed, shutting down");
            state.fatal.cancel();
            Err(e)
        }
    }
}

/// `GET /near/lat/:lat/lon/:lon` - the nearest records, up to the proximity
/// limit. A failed query renders as `Nothing found`.
#[tracing::instrument(skip(state))]
pub async fn near_lat_lon(
    State(state): State<AppState>,
    Path((lat, lon)): Path<(String, String)>,
) -> Response {
    let query = ProximityQuery::from_path(&lat, &lon);

    let records = match state.store.find(query.filter(), Some(query.limit)).await {
        Ok(records) => {
            record_lookup(
                "proximity",
                if records.is_empty() { "empty" } else { "found" },
            );
            Some(records)
        }
        Err(e) => {
            record_lookup("proximity", "error");
            tracing::warn!(error = %e, "Proximity lookup failed");
            None
        }
    };

    render_proximity_result(&query, records.as_deref())
}

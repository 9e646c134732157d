//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Use [`DataResponse`]
//! instead of ad-hoc `serde_json::json!({ "data": ... })`.

use serde::Serialize;
use stylemark_core::ChangeEvent;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Payload of a mutating call: the result plus the change it caused.
#[derive(Debug, Serialize)]
pub struct Mutation<T: Serialize> {
    #[serde(flatten)]
    pub result: T,
    pub change: ChangeEvent,
}

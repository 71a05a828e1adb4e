// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Rsvp related API structs and Endpoints
//!
//! The defined structs are exposed to the REST API and will be serialized/deserialized. Similar
//! structs are defined in the Database crate [`db_storage`] for database operations.

use super::response::ApiError;
use crate::services::{RsvpCounts, RsvpEntry, RsvpService};
use actix_web::web::{self, Data, Json, Path};
use actix_web::{delete, get, post, Scope};
use db_storage::rsvps::{Rsvp, RsvpStatus};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Scope containing all rsvp endpoints
pub fn services() -> Scope {
    // the static routes must be registered before `/{id}`
    web::scope("/rsvp")
        .service(post)
        .service(post_bulk)
        .service(get_all)
        .service(get_confirmed)
        .service(get_counts)
        .service(get)
        .service(delete)
}

/// A single rsvp as returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct RsvpResource {
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: RsvpStatus,
}

impl From<Rsvp> for RsvpResource {
    fn from(rsvp: Rsvp) -> Self {
        Self {
            id: rsvp.id,
            name: rsvp.name,
            email: rsvp.email,
            status: rsvp.status,
        }
    }
}

/// Body of a successful write
#[derive(Debug, Serialize)]
pub struct SavedResponse<T> {
    pub message: String,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// API request parameters to create or replace a rsvp
///
/// Missing values are reported by the service, so every field is optional here.
#[derive(Debug, Clone, Validate, Deserialize)]
pub struct PostRsvpBody {
    #[validate(length(max = 255))]
    pub id: Option<String>,
    #[validate(length(max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub email: Option<String>,
    pub status: Option<String>,
}

impl From<PostRsvpBody> for RsvpEntry {
    fn from(body: PostRsvpBody) -> Self {
        Self {
            id: body.id,
            name: body.name,
            email: body.email,
            status: body.status,
        }
    }
}

/// API request parameters to create or replace multiple rsvps at once
#[derive(Debug, Validate, Deserialize)]
pub struct PostRsvpBulkBody {
    #[validate]
    pub entries: Vec<PostRsvpBody>,
}

/// API Endpoint *POST /rsvp*
///
/// Creates the rsvp or replaces the rsvp with the same id.
/// Returns the saved [`RsvpResource`].
#[post("")]
pub async fn post(
    rsvps: Data<RsvpService>,
    body: Json<PostRsvpBody>,
) -> Result<Json<SavedResponse<RsvpResource>>, ApiError> {
    let body = body.into_inner();

    body.validate()?;

    let rsvp = rsvps.upsert_one(body.into()).await?;

    Ok(Json(SavedResponse {
        message: "RSVP saved.".into(),
        data: rsvp.into(),
    }))
}

/// API Endpoint *POST /rsvp/bulk*
///
/// Saves all entries of the [`PostRsvpBulkBody`] or none if any entry is invalid.
#[post("/bulk")]
pub async fn post_bulk(
    rsvps: Data<RsvpService>,
    body: Json<PostRsvpBulkBody>,
) -> Result<Json<SavedResponse<Vec<RsvpResource>>>, ApiError> {
    let body = body.into_inner();

    body.validate()?;

    let entries = body.entries.into_iter().map(Into::into).collect();
    let saved = rsvps.upsert_bulk(entries).await?;

    Ok(Json(SavedResponse {
        message: format!("{} RSVPs saved.", saved.len()),
        data: saved.into_iter().map(Into::into).collect(),
    }))
}

/// API Endpoint *GET /rsvp*
///
/// Returns a JSON array of all rsvps as [`RsvpResource`]
#[get("")]
pub async fn get_all(rsvps: Data<RsvpService>) -> Result<Json<Vec<RsvpResource>>, ApiError> {
    let all = rsvps.list_all().await?;

    Ok(Json(all.into_iter().map(Into::into).collect()))
}

/// API Endpoint *GET /rsvp/confirmed*
///
/// Returns all rsvps with the status `Yes`
#[get("/confirmed")]
pub async fn get_confirmed(
    rsvps: Data<RsvpService>,
) -> Result<Json<Vec<RsvpResource>>, ApiError> {
    let confirmed = rsvps.get_confirmed().await?;

    Ok(Json(confirmed.into_iter().map(Into::into).collect()))
}

/// API Endpoint *GET /rsvp/counts*
#[get("/counts")]
pub async fn get_counts(rsvps: Data<RsvpService>) -> Result<Json<RsvpCounts>, ApiError> {
    let counts = rsvps.get_counts().await?;

    Ok(Json(counts))
}

/// API Endpoint *GET /rsvp/{id}*
#[get("/{id}")]
pub async fn get(
    rsvps: Data<RsvpService>,
    id: Path<String>,
) -> Result<Json<RsvpResource>, ApiError> {
    let rsvp = rsvps.get_one(id.into_inner()).await?;

    Ok(Json(rsvp.into()))
}

/// API Endpoint *DELETE /rsvp/{id}*
#[delete("/{id}")]
pub async fn delete(
    rsvps: Data<RsvpService>,
    id: Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    rsvps.delete_one(id.into_inner()).await?;

    Ok(Json(MessageResponse {
        message: "RSVP deleted.",
    }))
}

#[cfg(test)]
mod test {
    use crate::services::{NotificationSink, RsvpService};
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use db_storage::rsvps::{NewRsvp, Rsvp, RsvpStatus, RsvpStore};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use test_util::{assert_eq_json, MemoryRsvpStore};

    struct NoopSink;

    #[async_trait]
    impl NotificationSink for NoopSink {
        async fn notify(&self, _rsvp: &Rsvp) -> Result<()> {
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl NotificationSink for FailingSink {
        async fn notify(&self, _rsvp: &Rsvp) -> Result<()> {
            bail!("mail worker queue is gone")
        }
    }

    fn new_rsvp(id: &str, status: RsvpStatus) -> NewRsvp {
        NewRsvp {
            id: id.into(),
            name: format!("Player {id}"),
            email: format!("{id}@example.org"),
            status,
        }
    }

    fn rsvp_service(store: Arc<MemoryRsvpStore>, sink: Arc<dyn NotificationSink>) -> RsvpService {
        RsvpService::new(store, sink, Duration::from_millis(100))
    }

    /// Sends the request to an app serving the rsvp api and returns status and JSON body
    async fn call(service: RsvpService, req: test::TestRequest) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(crate::json_config())
                .app_data(web::Data::new(service))
                .service(crate::api_scope()),
        )
        .await;

        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status();
        let body = test::read_body(resp).await;

        let body = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).expect("response body must be JSON")
        };

        (status, body)
    }

    #[actix_rt::test]
    async fn post_saves_rsvp() {
        let store = Arc::new(MemoryRsvpStore::new());

        let (status, body) = call(
            rsvp_service(store.clone(), Arc::new(NoopSink)),
            test::TestRequest::post().uri("/api/rsvp").set_json(json!({
                "id": "p1",
                "name": "Alice",
                "email": "alice@example.org",
                "status": "Yes"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq_json!(
            body,
            {
                "message": "RSVP saved.",
                "data": {
                    "id": "p1",
                    "name": "Alice",
                    "email": "alice@example.org",
                    "status": "Yes"
                }
            }
        );
        assert_eq!(store.len(), 1);
    }

    #[actix_rt::test]
    async fn post_rejects_invalid_status() {
        let store = Arc::new(MemoryRsvpStore::new());

        let (status, body) = call(
            rsvp_service(store.clone(), Arc::new(NoopSink)),
            test::TestRequest::post().uri("/api/rsvp").set_json(json!({
                "id": "p1",
                "name": "Alice",
                "email": "alice@example.org",
                "status": "Attending"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq_json!(
            body,
            {
                "error": "Invalid RSVP status.",
                "code": "invalid_status"
            }
        );
        assert!(store.is_empty());
    }

    #[actix_rt::test]
    async fn post_rejects_invalid_email() {
        let (status, body) = call(
            rsvp_service(Arc::new(MemoryRsvpStore::new()), Arc::new(NoopSink)),
            test::TestRequest::post().uri("/api/rsvp").set_json(json!({
                "id": "p1",
                "name": "Alice",
                "email": "alice.example.org",
                "status": "No"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_email");
    }

    #[actix_rt::test]
    async fn post_rejects_malformed_json() {
        let (status, body) = call(
            rsvp_service(Arc::new(MemoryRsvpStore::new()), Arc::new(NoopSink)),
            test::TestRequest::post()
                .uri("/api/rsvp")
                .insert_header(("content-type", "application/json"))
                .set_payload("{\"id\": \"p1\", "),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_json");
    }

    #[actix_rt::test]
    async fn post_rejects_overlong_fields() {
        let (status, body) = call(
            rsvp_service(Arc::new(MemoryRsvpStore::new()), Arc::new(NoopSink)),
            test::TestRequest::post().uri("/api/rsvp").set_json(json!({
                "id": "p1",
                "name": "a".repeat(256),
                "email": "alice@example.org",
                "status": "Yes"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq_json!(
            body,
            {
                "error": "Some provided values are invalid",
                "code": "validation_failed",
                "errors": [
                    {
                        "field": "name",
                        "code": "invalid_length"
                    }
                ]
            }
        );
    }

    #[actix_rt::test]
    async fn bulk_rejects_overlong_fields() {
        let store = Arc::new(MemoryRsvpStore::new());

        let (status, body) = call(
            rsvp_service(store.clone(), Arc::new(NoopSink)),
            test::TestRequest::post()
                .uri("/api/rsvp/bulk")
                .set_json(json!({
                    "entries": [
                        {"id": "p1", "name": "Alice", "email": "alice@example.org", "status": "Yes"},
                        {"id": "p2", "name": "b".repeat(256), "email": "bob@example.org", "status": "No"}
                    ]
                })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq_json!(
            body,
            {
                "error": "Some provided values are invalid",
                "code": "validation_failed",
                "errors": [
                    {
                        "field": "entries",
                        "code": "invalid_values",
                        "message": "Invalid values at index 1"
                    }
                ]
            }
        );
        assert!(store.is_empty());
    }

    #[actix_rt::test]
    async fn failing_notification_keeps_success_response() {
        let (status, body) = call(
            rsvp_service(Arc::new(MemoryRsvpStore::new()), Arc::new(FailingSink)),
            test::TestRequest::post().uri("/api/rsvp").set_json(json!({
                "id": "p1",
                "name": "Alice",
                "email": "alice@example.org",
                "status": "Maybe"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "RSVP saved.");
        assert_eq!(body["data"]["status"], "Maybe");
    }

    #[actix_rt::test]
    async fn bulk_saves_all_entries() {
        let store = Arc::new(MemoryRsvpStore::new());

        let (status, body) = call(
            rsvp_service(store.clone(), Arc::new(NoopSink)),
            test::TestRequest::post()
                .uri("/api/rsvp/bulk")
                .set_json(json!({
                    "entries": [
                        {"id": "p1", "name": "Alice", "email": "alice@example.org", "status": "Yes"},
                        {"id": "p2", "name": "Bob", "email": "bob@example.org", "status": "No"}
                    ]
                })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "2 RSVPs saved.");
        assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
        assert_eq!(store.len(), 2);
    }

    #[actix_rt::test]
    async fn bulk_with_missing_name_saves_nothing() {
        let store = Arc::new(MemoryRsvpStore::new());

        let (status, body) = call(
            rsvp_service(store.clone(), Arc::new(NoopSink)),
            test::TestRequest::post()
                .uri("/api/rsvp/bulk")
                .set_json(json!({
                    "entries": [
                        {"id": "p1", "name": "Alice", "email": "alice@example.org", "status": "Yes"},
                        {"id": "p2", "email": "bob@example.org", "status": "No"},
                        {"id": "p3", "name": "Carol", "email": "carol@example.org", "status": "Maybe"}
                    ]
                })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq_json!(
            body,
            {
                "error": "Missing required field `name` in entry 1.",
                "code": "missing_field"
            }
        );
        assert!(store.is_empty());
    }

    #[actix_rt::test]
    async fn counts_and_confirmed() {
        let store = Arc::new(MemoryRsvpStore::with_rsvps([
            new_rsvp("a", RsvpStatus::Yes),
            new_rsvp("b", RsvpStatus::Yes),
            new_rsvp("c", RsvpStatus::No),
            new_rsvp("d", RsvpStatus::Maybe),
        ]));

        let (status, body) = call(
            rsvp_service(store.clone(), Arc::new(NoopSink)),
            test::TestRequest::get().uri("/api/rsvp/counts"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq_json!(body, {"total": 4, "confirmed": 2, "declined": 1});

        let (status, body) = call(
            rsvp_service(store.clone(), Arc::new(NoopSink)),
            test::TestRequest::get().uri("/api/rsvp/confirmed"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq_json!(
            body,
            [
                {"id": "a", "name": "Player a", "email": "a@example.org", "status": "Yes"},
                {"id": "b", "name": "Player b", "email": "b@example.org", "status": "Yes"}
            ]
        );

        let (status, body) = call(
            rsvp_service(store, Arc::new(NoopSink)),
            test::TestRequest::get().uri("/api/rsvp"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(4));
    }

    #[actix_rt::test]
    async fn get_single_rsvp() {
        let store = Arc::new(MemoryRsvpStore::with_rsvps([new_rsvp(
            "p1",
            RsvpStatus::Maybe,
        )]));

        let (status, body) = call(
            rsvp_service(store.clone(), Arc::new(NoopSink)),
            test::TestRequest::get().uri("/api/rsvp/p1"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Maybe");

        let (status, body) = call(
            rsvp_service(store, Arc::new(NoopSink)),
            test::TestRequest::get().uri("/api/rsvp/p2"),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Player not found.");
    }

    #[actix_rt::test]
    async fn delete_rsvp() {
        let store = Arc::new(MemoryRsvpStore::with_rsvps([new_rsvp("p1", RsvpStatus::No)]));

        let (status, body) = call(
            rsvp_service(store.clone(), Arc::new(NoopSink)),
            test::TestRequest::delete().uri("/api/rsvp/p1"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq_json!(body, {"message": "RSVP deleted."});
        assert_eq!(store.get("p1").unwrap(), None);

        let (status, body) = call(
            rsvp_service(store, Arc::new(NoopSink)),
            test::TestRequest::delete().uri("/api/rsvp/p1"),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq_json!(
            body,
            {
                "error": "Player not found.",
                "code": "not_found"
            }
        );
    }

    #[actix_rt::test]
    async fn store_failures_do_not_leak_details() {
        let store = Arc::new(MemoryRsvpStore::new());
        store.set_unavailable(true);

        let (status, body) = call(
            rsvp_service(store, Arc::new(NoopSink)),
            test::TestRequest::get().uri("/api/rsvp"),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq_json!(
            body,
            {
                "error": "An internal server error occurred",
                "code": "internal_server_error"
            }
        );
    }
}

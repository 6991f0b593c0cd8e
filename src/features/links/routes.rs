use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::features::links::handlers;
use crate::features::links::services::LinkService;

/// Create routes for the links feature
pub fn routes(service: Arc<LinkService>) -> Router {
    Router::new()
        .route("/generate-signed-url", post(handlers::generate_signed_url))
        .route("/active-links", get(handlers::list_active_links))
        .route("/active-links/purge", post(handlers::purge_links))
        .route("/active-links/{id}", delete(handlers::revoke_link))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::{DateTime, Duration, Utc};
    use serde_json::{json, Value};

    use crate::features::links::dtos::{ActiveLinkDto, GeneratedLinkDto};
    use crate::features::links::services::{LinkRegistry, SignedUrlIssuer, UrlDigester};
    use crate::features::links::stores::MemoryGrantStore;
    use crate::shared::test_helpers::{t0, FakeStorage, ManualClock};

    struct TestApp {
        server: TestServer,
        storage: Arc<FakeStorage>,
        clock: Arc<ManualClock>,
    }

    fn app() -> TestApp {
        let storage = Arc::new(FakeStorage::with_objects(&["report.pdf", "notes.txt"]));
        let clock = Arc::new(ManualClock::new(t0()));
        let issuer = SignedUrlIssuer::new(
            storage.clone(),
            clock.clone(),
            Duration::days(7),
            Duration::zero(),
        );
        let registry = Arc::new(LinkRegistry::new(
            Arc::new(MemoryGrantStore::new(1_000)),
            UrlDigester::from_key(None).unwrap(),
            clock.clone(),
        ));
        let service = Arc::new(LinkService::new(issuer, registry, 15));

        TestApp {
            server: TestServer::new(routes(service)).unwrap(),
            storage,
            clock,
        }
    }

    #[tokio::test]
    async fn test_generate_then_list_then_expire() {
        let app = app();

        let response = app
            .server
            .post("/generate-signed-url")
            .json(&json!({ "fileName": "report.pdf", "expiration": 15 }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let generated: GeneratedLinkDto = response.json();
        assert!(generated.signed_url.contains("report.pdf"));
        assert_eq!(generated.expires_at, t0() + Duration::minutes(15));

        app.clock.advance(Duration::minutes(1));
        let response = app.server.get("/active-links").await;
        response.assert_status_ok();
        let links: Vec<ActiveLinkDto> = response.json();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].id, generated.id);
        assert_eq!(links[0].file_name, "report.pdf");
        assert_eq!(links[0].signed_url_hash.len(), 64);

        app.clock.advance(Duration::minutes(15));
        let links: Vec<ActiveLinkDto> = app.server.get("/active-links").await.json();
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn test_listing_never_exposes_signed_url() {
        let app = app();

        let generated: GeneratedLinkDto = app
            .server
            .post("/generate-signed-url")
            .json(&json!({ "fileName": "notes.txt" }))
            .await
            .json();

        let body = app.server.get("/active-links").await.text();
        assert!(!body.contains(&generated.signed_url));
        assert!(!body.contains("signed_url\""));
        assert!(!body.contains("X-Amz-Signature"));
    }

    #[tokio::test]
    async fn test_default_expiration_is_fifteen_minutes() {
        let app = app();

        let body: Value = app
            .server
            .post("/generate-signed-url")
            .json(&json!({ "fileName": "report.pdf" }))
            .await
            .json();

        let expires_at: DateTime<Utc> =
            serde_json::from_value(body["expires_at"].clone()).unwrap();
        assert_eq!(expires_at, t0() + Duration::minutes(15));
    }

    #[tokio::test]
    async fn test_bad_expiration_is_rejected() {
        let app = app();

        for expiration in [json!(0), json!(-3), json!(20_000)] {
            let response = app
                .server
                .post("/generate-signed-url")
                .json(&json!({ "fileName": "report.pdf", "expiration": expiration }))
                .await;

            response.assert_status(StatusCode::BAD_REQUEST);
            let body: Value = response.json();
            assert_eq!(body["code"], "invalid_duration");
        }

        // Non-integer expiration fails at deserialization
        let response = app
            .server
            .post("/generate-signed-url")
            .json(&json!({ "fileName": "report.pdf", "expiration": "soon" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "validation_error");

        assert_eq!(app.storage.presign_calls(), 0);
    }

    #[tokio::test]
    async fn test_bad_file_name_is_rejected() {
        let app = app();

        for body in [
            json!({ "fileName": "" }),
            json!({ "fileName": "a\u{0007}b" }),
            json!({ "expiration": 15 }),
        ] {
            let response = app.server.post("/generate-signed-url").json(&body).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            let body: Value = response.json();
            assert_eq!(body["code"], "validation_error");
        }

        // Unparseable JSON is still a plain bad request
        let response = app
            .server
            .post("/generate-signed-url")
            .content_type("application/json")
            .text("{\"fileName\":")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "bad_request");
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let app = app();

        let response = app
            .server
            .post("/generate-signed-url")
            .json(&json!({ "fileName": "missing.pdf", "expiration": 15 }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["code"], "object_not_found");
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_backend_outage_is_service_unavailable() {
        let app = app();
        app.storage.set_unavailable(true);

        let response = app
            .server
            .post("/generate-signed-url")
            .json(&json!({ "fileName": "report.pdf", "expiration": 15 }))
            .await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let links: Vec<ActiveLinkDto> = app.server.get("/active-links").await.json();
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn test_revoke_and_purge() {
        let app = app();
        let generated: GeneratedLinkDto = app
            .server
            .post("/generate-signed-url")
            .json(&json!({ "fileName": "report.pdf", "expiration": 30 }))
            .await
            .json();

        let response = app
            .server
            .delete(&format!("/active-links/{}", generated.id))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["revoked"], true);

        app.server
            .delete(&format!("/active-links/{}", generated.id))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let links: Vec<ActiveLinkDto> = app.server.get("/active-links").await.json();
        assert!(links.is_empty());

        let body: Value = app.server.post("/active-links/purge").await.json();
        assert_eq!(body["removed"], 1);
    }

    #[tokio::test]
    async fn test_revoke_with_malformed_id_is_bad_request() {
        let app = app();

        app.server
            .delete("/active-links/not-a-uuid")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}

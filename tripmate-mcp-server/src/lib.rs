//! Tool server for the TripMate booking mock.
//!
//! Exposes the pricing, payment, and booking operations as named tools the
//! external agent runtime invokes over HTTP:
//! - `GET  /tools`: list tool definitions with input schemas
//! - `POST /tools/{name}`: invoke one tool with plain key/value arguments

pub mod tools;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use tools::ToolState;

pub fn router(state: Arc<ToolState>) -> Router {
    Router::new()
        .route("/tools", get(tools::list_tools))
        .route("/tools/:name", post(tools::invoke_tool))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_router() -> (Router, TempDir) {
        let dir = TempDir::new().unwrap();
        let state = Arc::new(ToolState::new(dir.path()));
        (router(state), dir)
    }

    async fn call_tool(app: Router, name: &str, args: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(format!("/tools/{name}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(args.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn lists_every_registered_tool() {
        let (app, _dir) = test_router();
        let request = Request::builder()
            .uri("/tools")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        let names: Vec<&str> = body["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "apply_coupon",
                "apply_payment_offer",
                "collect_payment",
                "confirm_pin",
                "book_flight",
                "book_train",
                "book_bus",
                "book_hotel",
                "generate_booking_confirmation",
                "save_itinerary",
            ]
        );
    }

    #[tokio::test]
    async fn apply_coupon_round_trips_through_the_adapter() {
        let (app, _dir) = test_router();
        let (status, body) = call_tool(
            app,
            "apply_coupon",
            json!({"cart": {"subtotal": 4000.0, "coupon_code": "EMTNEW200"}}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["discount"], 200.0);
        assert_eq!(body["data"]["payable"], 3800.0);
    }

    #[tokio::test]
    async fn unknown_tool_is_a_404_envelope() {
        let (app, _dir) = test_router();
        let (status, body) = call_tool(app, "book_rocket", json!({})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("book_rocket"));
    }

    #[tokio::test]
    async fn bad_arguments_are_a_400_envelope() {
        let (app, _dir) = test_router();
        let (status, body) = call_tool(app, "apply_coupon", json!({"cart": []})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn offer_before_totals_is_a_400() {
        let (app, _dir) = test_router();
        let (status, body) = call_tool(
            app,
            "apply_payment_offer",
            json!({"cart": {"subtotal": 5000.0, "payment_method": "credit"}}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("payable"));
    }

    #[tokio::test]
    async fn confirm_pin_transitions_an_intent_exactly_once() {
        let (app, _dir) = test_router();

        let (status, body) = call_tool(
            app.clone(),
            "collect_payment",
            json!({
                "cart": {"subtotal": 3800.0, "payable": 3800.0},
                "method_payload": {"method": "upi", "upi_id": "faiz@upi"}
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["mask"], "f***@upi");
        let intent_id = body["data"]["payment_intent_id"].as_str().unwrap().to_string();

        let (status, body) = call_tool(
            app.clone(),
            "confirm_pin",
            json!({"payment_intent_id": intent_id, "pin": "1234"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "SUCCEEDED");

        // replaying the confirmation must not flip a terminal status
        let (status, body) = call_tool(
            app,
            "confirm_pin",
            json!({"payment_intent_id": body["data"]["payment_intent_id"], "pin": "1234"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("finalized"));
    }

    #[tokio::test]
    async fn confirm_pin_for_an_unknown_intent_is_a_404() {
        let (app, _dir) = test_router();
        let (status, _) = call_tool(
            app,
            "confirm_pin",
            json!({"payment_intent_id": "PAYNOPE42", "pin": "1234"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn book_flight_returns_the_item_with_a_pnr() {
        let (app, _dir) = test_router();
        let (status, body) = call_tool(
            app,
            "book_flight",
            json!({"item": {"from": "DEL", "to": "BOM"}}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["from"], "DEL");
        assert!(body["data"]["pnr"].as_str().unwrap().starts_with("EMTFL"));
    }

    #[tokio::test]
    async fn save_itinerary_appends_to_the_log() {
        let (app, dir) = test_router();
        let (status, body) = call_tool(
            app,
            "save_itinerary",
            json!({"user_id": "user_0001", "itinerary": {"destination": "Goa"}}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["iten_id"], "itin_0001");
        assert_eq!(body["data"]["records"], 1);
        assert!(dir.path().join("itinerary/user_0001.json").exists());
    }

    #[tokio::test]
    async fn save_itinerary_without_a_user_is_a_400() {
        let (app, _dir) = test_router();
        let (status, _) = call_tool(
            app,
            "save_itinerary",
            json!({"user_id": "", "itinerary": {}}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

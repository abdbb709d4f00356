//! The tool registry: every operation the agent runtime may call, mapped
//! from its wire name to a typed request shape and dispatched into the
//! core. The core crates know nothing about this layer.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::RwLock;

use tripmate_core::{
    apply_coupon, apply_payment_offer, book_bus, book_flight, book_hotel, book_train,
    generate_booking_confirmation, Cart, CoreError, Item, PaymentIntent, PaymentPayload,
    PaymentSummary,
};
use tripmate_store::{ItineraryLog, StoreError};

/// Shared state behind the tool endpoints: the pending payment intents and
/// the itinerary log the runtime saves into.
pub struct ToolState {
    pub intents: RwLock<HashMap<String, PaymentIntent>>,
    pub itineraries: ItineraryLog,
}

impl ToolState {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            intents: RwLock::new(HashMap::new()),
            itineraries: ItineraryLog::new(data_dir),
        }
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("unknown payment intent '{0}'")]
    UnknownIntent(String),

    #[error("invalid arguments: {0}")]
    BadArguments(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ToolError {
    pub fn status(&self) -> StatusCode {
        match self {
            ToolError::UnknownTool(_) | ToolError::UnknownIntent(_) => StatusCode::NOT_FOUND,
            ToolError::BadArguments(_) | ToolError::Core(_) => StatusCode::BAD_REQUEST,
            ToolError::Store(StoreError::MissingUserId) => StatusCode::BAD_REQUEST,
            ToolError::Store(_) | ToolError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard tool response envelope.
#[derive(Debug, Serialize)]
pub struct ToolEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolEnvelope {
    fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Tool definition advertised to the runtime.
#[derive(Debug, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

#[derive(Debug, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolDefinition>,
}

#[derive(Debug, Deserialize)]
struct CartArgs {
    cart: Cart,
}

#[derive(Debug, Deserialize)]
struct CollectPaymentArgs {
    cart: Cart,
    method_payload: PaymentPayload,
}

#[derive(Debug, Deserialize)]
struct ConfirmPinArgs {
    payment_intent_id: String,
    pin: String,
}

#[derive(Debug, Deserialize)]
struct BookItemArgs {
    item: Item,
}

#[derive(Debug, Deserialize)]
struct ConfirmationArgs {
    cart: Cart,
    payment: PaymentSummary,
    items: Value,
}

#[derive(Debug, Deserialize)]
struct SaveItineraryArgs {
    user_id: String,
    itinerary: Value,
    #[serde(default)]
    trip_plan: Value,
}

fn parse<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::BadArguments(e.to_string()))
}

/// Route one named tool call into the core.
pub async fn dispatch(state: &ToolState, name: &str, args: Value) -> Result<Value, ToolError> {
    match name {
        "apply_coupon" => {
            let CartArgs { cart } = parse(args)?;
            Ok(serde_json::to_value(apply_coupon(cart))?)
        }
        "apply_payment_offer" => {
            let CartArgs { cart } = parse(args)?;
            Ok(serde_json::to_value(apply_payment_offer(cart)?)?)
        }
        "collect_payment" => {
            let CollectPaymentArgs {
                mut cart,
                method_payload,
            } = parse(args)?;
            let intent = tripmate_core::collect_payment(&mut cart, &method_payload)?;
            state
                .intents
                .write()
                .await
                .insert(intent.payment_intent_id.clone(), intent.clone());
            Ok(serde_json::to_value(intent)?)
        }
        "confirm_pin" => {
            let ConfirmPinArgs {
                payment_intent_id,
                pin,
            } = parse(args)?;
            let mut intents = state.intents.write().await;
            let intent = intents
                .get_mut(&payment_intent_id)
                .ok_or_else(|| ToolError::UnknownIntent(payment_intent_id.clone()))?;
            let confirmation = intent.finalize(&pin)?;
            Ok(serde_json::to_value(confirmation)?)
        }
        "book_flight" => {
            let BookItemArgs { item } = parse(args)?;
            Ok(Value::Object(book_flight(item)))
        }
        "book_train" => {
            let BookItemArgs { item } = parse(args)?;
            Ok(Value::Object(book_train(item)))
        }
        "book_bus" => {
            let BookItemArgs { item } = parse(args)?;
            Ok(Value::Object(book_bus(item)))
        }
        "book_hotel" => {
            let BookItemArgs { item } = parse(args)?;
            Ok(Value::Object(book_hotel(item)))
        }
        "generate_booking_confirmation" => {
            let ConfirmationArgs {
                cart,
                payment,
                items,
            } = parse(args)?;
            let confirmation = generate_booking_confirmation(&cart, &payment, &items)?;
            Ok(serde_json::to_value(confirmation)?)
        }
        "save_itinerary" => {
            let SaveItineraryArgs {
                user_id,
                itinerary,
                trip_plan,
            } = parse(args)?;
            let (record, count) = state
                .itineraries
                .append(&user_id, itinerary, trip_plan)
                .await?;
            Ok(json!({
                "status": "ok",
                "iten_id": record.iten_id,
                "records": count,
            }))
        }
        other => Err(ToolError::UnknownTool(other.to_string())),
    }
}

/// List all available tools.
pub async fn list_tools() -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: definitions(),
    })
}

/// Invoke one tool by name.
pub async fn invoke_tool(
    State(state): State<Arc<ToolState>>,
    UrlPath(name): UrlPath<String>,
    Json(args): Json<Value>,
) -> Response {
    tracing::info!(tool = %name, "→ invoking tool");
    match dispatch(&state, &name, args).await {
        Ok(data) => (StatusCode::OK, Json(ToolEnvelope::ok(data))).into_response(),
        Err(e) => {
            tracing::warn!(tool = %name, error = %e, "tool call failed");
            (e.status(), Json(ToolEnvelope::err(e.to_string()))).into_response()
        }
    }
}

fn cart_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "subtotal": {"type": "number", "description": "Sum of item prices before fees"},
            "fees_taxes": {"type": "number", "description": "Fees and taxes (default 0)"},
            "discount": {"type": "number", "description": "Accumulated discount (default 0)"},
            "payable": {"type": "number", "description": "Derived amount due"},
            "coupon_code": {"type": "string", "description": "Coupon code entered by the user"},
            "payment_method": {"type": "string", "enum": ["upi", "debit", "credit", "netbanking"]},
            "currency": {"type": "string", "description": "Currency code (default INR)"}
        },
        "required": ["subtotal"]
    })
}

fn item_schema(kind: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "item": {
                "type": "object",
                "description": format!("The {kind} selection to book; passed through with a reference code added")
            }
        },
        "required": ["item"]
    })
}

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "apply_coupon",
            description: "Apply the cart's coupon code and recompute the payable amount",
            input_schema: json!({
                "type": "object",
                "properties": {"cart": cart_schema()},
                "required": ["cart"]
            }),
        },
        ToolDefinition {
            name: "apply_payment_offer",
            description: "Apply the best payment-method offer to a totalled cart",
            input_schema: json!({
                "type": "object",
                "properties": {"cart": cart_schema()},
                "required": ["cart"]
            }),
        },
        ToolDefinition {
            name: "collect_payment",
            description: "Create a payment intent for the cart's payable amount",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "cart": cart_schema(),
                    "method_payload": {
                        "type": "object",
                        "properties": {
                            "method": {"type": "string", "enum": ["upi", "debit", "credit", "netbanking"]},
                            "upi_id": {"type": "string", "description": "UPI id, required for method=upi"},
                            "card_last4": {"type": "string", "description": "Last 4 card digits"}
                        },
                        "required": ["method"]
                    }
                },
                "required": ["cart", "method_payload"]
            }),
        },
        ToolDefinition {
            name: "confirm_pin",
            description: "Authorize a pending payment intent with a 4-6 digit PIN/OTP",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "payment_intent_id": {"type": "string"},
                    "pin": {"type": "string"}
                },
                "required": ["payment_intent_id", "pin"]
            }),
        },
        ToolDefinition {
            name: "book_flight",
            description: "Book a flight and return it with a generated PNR",
            input_schema: item_schema("flight"),
        },
        ToolDefinition {
            name: "book_train",
            description: "Book a train leg and return it with a generated PNR",
            input_schema: item_schema("train"),
        },
        ToolDefinition {
            name: "book_bus",
            description: "Book a bus leg and return it with a generated PNR",
            input_schema: item_schema("bus"),
        },
        ToolDefinition {
            name: "book_hotel",
            description: "Book a hotel stay and return it with a generated booking id",
            input_schema: item_schema("hotel"),
        },
        ToolDefinition {
            name: "generate_booking_confirmation",
            description: "Assemble the final voucher from the cart, payment, and booked items",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "cart": cart_schema(),
                    "payment": {
                        "type": "object",
                        "properties": {
                            "method": {"type": "string"},
                            "amount": {"type": "number"},
                            "currency": {"type": "string"},
                            "mask": {"type": "string"}
                        },
                        "required": ["method", "amount"]
                    },
                    "items": {"description": "Booked items, passed through verbatim"}
                },
                "required": ["cart", "payment", "items"]
            }),
        },
        ToolDefinition {
            name: "save_itinerary",
            description: "Append the current itinerary/trip-plan snapshot to the user's history",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "user_id": {"type": "string"},
                    "itinerary": {"description": "Itinerary payload, object or JSON-encoded string"},
                    "trip_plan": {"description": "Trip-plan payload, object or JSON-encoded string"}
                },
                "required": ["user_id", "itinerary"]
            }),
        },
    ]
}

//! API wire types
//!
//! Field names follow the backend's JSON exactly, hence the camelCase
//! renames throughout.

use printhub_core::pricing::FulfillmentMode;
use serde::{Deserialize, Serialize};

/// Every endpoint wraps its payload in `{ "data": ... }`.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: T,
}

/// Error body shape shared by the backend's failure responses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stationary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub is_active: bool,
    pub can_deliver: bool,
    pub address: String,
    pub college_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub file_url: String,
    pub file_id: String,
    pub coloured: bool,
    pub duplex: bool,
    pub spiral: bool,
    pub hardbind: bool,
    pub quantity: u32,
    pub price: u64,
    pub file_type: String,
    pub cart_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub name: String,
    pub file_url: String,
    pub coloured: bool,
    pub duplex: bool,
    pub spiral: bool,
    pub hardbind: bool,
    pub quantity: u32,
    pub price: u64,
    pub file_type: String,
    pub order_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub stationary_id: String,
    pub status: String,
    pub total_price: u64,
    pub otp: String,
    pub order_type: FulfillmentMode,
    pub delivery_address: Option<String>,
    pub delivery_fee: u64,
    pub platform_fee: u64,
    #[serde(rename = "OrderItem", default)]
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub stationary_id: String,
    pub order_type: FulfillmentMode,
    pub delivery_address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub new_payment: NewPayment,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub amount_in_paise: u64,
    pub order: PaymentOrder,
}

#[derive(Debug, Deserialize)]
pub struct PaymentOrder {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
}

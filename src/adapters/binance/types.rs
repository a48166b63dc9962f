//! Crypto-pay wire types.
//!
//! Request structs serialize in declaration order; the serialized bytes are
//! exactly what gets signed and sent.

use serde::{Deserialize, Serialize};

/// `POST /binancepay/openapi/v2/order` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderBody {
    pub merchant_trade_no: String,
    /// Decimal text, never a float.
    pub order_amount: String,
    pub currency: String,
    pub goods: Goods,
    pub merchant: Merchant,
    pub env: Env,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_url: Option<String>,
    pub return_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Goods {
    pub goods_type: &'static str,
    pub goods_name: String,
}

/// Serializes as `{}` when no merchant id is configured.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Merchant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Env {
    pub terminal_type: &'static str,
}

/// Common response envelope. `status` is `SUCCESS` or `FAIL`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(default)]
    pub code: String,
    pub data: Option<T>,
    pub error_message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        self.status == "SUCCESS"
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderData {
    pub prepay_id: String,
    pub checkout_url: Option<String>,
}

/// One entry of `POST /binancepay/openapi/certificates`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub cert_serial: String,
    pub cert_public: String,
}

/// Notification envelope. `data` is itself a JSON document encoded as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookNotification {
    pub biz_type: Option<String>,
    pub biz_status: Option<String>,
    pub data: String,
}

/// Fields read from the decoded `data` string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookOrderData {
    pub merchant_trade_no: String,
}

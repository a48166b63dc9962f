//! Wallet processor wire types.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// `POST /v1/oauth2/token` response.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    /// Seconds until the token expires.
    pub expires_in: u64,
}

/// `POST /v2/checkout/orders` body.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderBody {
    pub intent: &'static str,
    pub purchase_units: Vec<PurchaseUnit>,
    pub application_context: ApplicationContext,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseUnit {
    pub amount: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Amount {
    pub currency_code: String,
    /// Decimal text with exactly the currency's number of decimals.
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationContext {
    pub return_url: String,
    pub cancel_url: String,
}

/// Order as returned on creation.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Order {
    /// Where the payer approves the order.
    pub fn approve_url(&self) -> Option<String> {
        self.links
            .iter()
            .find(|link| link.rel == "approve" || link.rel == "payer-action")
            .map(|link| link.href.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
}

/// `POST /v1/notifications/verify-webhook-signature` body.
///
/// `webhook_event` is forwarded byte-for-byte as delivered.
#[derive(Debug, Serialize)]
pub struct VerifySignatureRequest<'a> {
    pub auth_algo: &'a str,
    pub cert_url: &'a str,
    pub transmission_id: &'a str,
    pub transmission_sig: &'a str,
    pub transmission_time: &'a str,
    pub webhook_id: &'a str,
    pub webhook_event: &'a RawValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifySignatureResponse {
    pub verification_status: String,
}

/// Webhook event fields the gateway reads.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    pub event_type: String,
    pub resource: Option<WebhookResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookResource {
    pub id: Option<String>,
    pub supplementary_data: Option<SupplementaryData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupplementaryData {
    pub related_ids: Option<RelatedIds>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelatedIds {
    pub order_id: Option<String>,
}

impl WebhookEvent {
    /// Order the event concerns. Capture events carry the order id in
    /// `supplementary_data`; order events are the order itself.
    pub fn order_id(&self) -> Option<String> {
        let resource = self.resource.as_ref()?;
        resource
            .supplementary_data
            .as_ref()
            .and_then(|s| s.related_ids.as_ref())
            .and_then(|r| r.order_id.clone())
            .or_else(|| resource.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_approve_link() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "id": "5O190127TN364715T",
            "status": "CREATED",
            "links": [
                {"href": "https://api.sandbox.paypal.com/v2/checkout/orders/5O190127TN364715T", "rel": "self", "method": "GET"},
                {"href": "https://www.sandbox.paypal.com/checkoutnow?token=5O190127TN364715T", "rel": "approve", "method": "GET"}
            ]
        }))
        .unwrap();
        assert_eq!(
            order.approve_url().as_deref(),
            Some("https://www.sandbox.paypal.com/checkoutnow?token=5O190127TN364715T")
        );
    }

    #[test]
    fn capture_event_resolves_related_order() {
        let event: WebhookEvent = serde_json::from_value(serde_json::json!({
            "id": "WH-1",
            "event_type": "PAYMENT.CAPTURE.COMPLETED",
            "resource": {
                "id": "CAPTURE-1",
                "supplementary_data": {"related_ids": {"order_id": "ORDER-1"}}
            }
        }))
        .unwrap();
        assert_eq!(event.order_id().as_deref(), Some("ORDER-1"));
    }

    #[test]
    fn order_event_uses_resource_id() {
        let event: WebhookEvent = serde_json::from_value(serde_json::json!({
            "id": "WH-2",
            "event_type": "CHECKOUT.ORDER.APPROVED",
            "resource": {"id": "ORDER-2"}
        }))
        .unwrap();
        assert_eq!(event.order_id().as_deref(), Some("ORDER-2"));
    }

    #[test]
    fn verify_request_embeds_event_verbatim() {
        let raw: &RawValue = serde_json::from_str(r#"{"b":1, "a":2}"#).unwrap();
        let request = VerifySignatureRequest {
            auth_algo: "SHA256withRSA",
            cert_url: "https://api.paypal.com/cert",
            transmission_id: "t-1",
            transmission_sig: "sig",
            transmission_time: "2024-01-01T00:00:00Z",
            webhook_id: "WH-ID",
            webhook_event: raw,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.ends_with(r#""webhook_event":{"b":1, "a":2}}"#));
    }
}

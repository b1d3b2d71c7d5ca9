//! DTDC shipping client.
//!
//! Two separate DTDC surfaces: the softdata consignment booking API
//! (authenticated with an `api-key` header) and the tracking service
//! (authenticated with `x-access-token`).

use reqwest::header::CONTENT_TYPE;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::DtdcConfig;
use crate::models::Order;

const SOFTDATA_URL: &str =
    "https://dtdcapi.shipsy.io/api/customer/integration/consignment/softdata";
const TRACKING_URL: &str =
    "https://blktracksvc.dtdc.com/dtdc-api/rest/JSONCnTrk/getTrackDetails";

/// Errors from the shipping provider.
#[derive(Debug, Error)]
pub enum DtdcError {
    /// HTTP transport error.
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered but without a usable consignment.
    #[error("consignment booking failed: {0}")]
    Booking(String),
}

#[derive(Debug, Serialize)]
struct PartyDetails<'a> {
    name: &'a str,
    phone: &'a str,
    address_line_1: &'a str,
    pincode: &'a str,
    city: &'a str,
    state: &'a str,
}

#[derive(Debug, Deserialize)]
struct SoftdataEnvelope {
    #[serde(default)]
    data: Vec<SoftdataResult>,
}

#[derive(Debug, Deserialize)]
struct SoftdataResult {
    #[serde(default)]
    success: bool,
    reference_number: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Client for consignment booking and shipment tracking.
#[derive(Clone)]
pub struct DtdcClient {
    http: reqwest::Client,
    config: DtdcConfig,
}

impl DtdcClient {
    #[must_use]
    pub fn new(http: reqwest::Client, config: DtdcConfig) -> Self {
        Self { http, config }
    }

    /// Book a consignment for an order; returns the DTDC reference number.
    ///
    /// # Errors
    ///
    /// Returns `DtdcError::Booking` when the provider declines the softdata
    /// payload, `DtdcError::Http` on transport failure.
    pub async fn create_consignment(&self, order: &Order) -> Result<String, DtdcError> {
        let ship_to = &order.shipping_address;
        let destination = PartyDetails {
            name: ship_to.name.as_deref().unwrap_or("Customer"),
            phone: &ship_to.phone,
            address_line_1: &ship_to.street,
            pincode: &ship_to.pincode,
            city: &ship_to.city,
            state: &ship_to.state,
        };

        let payload = serde_json::json!({
            "consignments": [{
                "customer_code": self.config.customer_code,
                "service_type_id": "B2C PRIORITY",
                "load_type": "NON-DOCUMENT",
                "description": "Order items",
                "dimension_unit": "cm",
                "length": "30", "width": "30", "height": "30",
                "weight_unit": "kg",
                "weight": "1.0",
                "declared_value": order.final_amount,
                "num_pieces": "1",
                "origin_details": self.config.origin,
                "destination_details": destination,
                "return_details": self.config.return_address,
                "customer_reference_number": order.id,
                "cod_collection_mode": "",
                "cod_amount": "",
                "commodity_id": "99",
                "is_risk_surcharge_applicable": "false",
                "invoice_number": order.order_number,
                "invoice_date": order.created_at.format("%Y-%m-%d").to_string(),
            }]
        });

        let envelope: SoftdataEnvelope = self
            .http
            .post(SOFTDATA_URL)
            .header(CONTENT_TYPE, "application/json")
            .header("api-key", self.config.api_key.expose_secret())
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;

        let result = envelope
            .data
            .into_iter()
            .next()
            .ok_or_else(|| DtdcError::Booking("empty response".to_owned()))?;

        if !result.success {
            return Err(DtdcError::Booking(
                result.message.unwrap_or_else(|| "unknown error".to_owned()),
            ));
        }
        result
            .reference_number
            .ok_or_else(|| DtdcError::Booking("no reference number returned".to_owned()))
    }

    /// Fetch raw tracking details for a consignment number.
    ///
    /// # Errors
    ///
    /// Returns `DtdcError::Http` on transport failure.
    pub async fn track(&self, consignment_number: &str) -> Result<Value, DtdcError> {
        let body = self
            .http
            .post(TRACKING_URL)
            .header(CONTENT_TYPE, "application/json")
            .header("x-access-token", self.config.tracking_token.expose_secret())
            .json(&serde_json::json!({
                "trkType": "cnno",
                "strcnno": consignment_number,
                "addtnlDtl": "Y",
            }))
            .send()
            .await?
            .json()
            .await?;
        Ok(body)
    }
}

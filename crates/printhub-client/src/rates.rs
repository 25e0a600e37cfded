//! Printing-rates lookup
//!
//! Backends disagree on how this endpoint is exposed: some accept the
//! stationary id as a query parameter, older ones only as a POST body.
//! The lookup tries GET first, falls back to POST on 404/405, and when
//! every attempt fails returns the built-in default rates so pricing
//! keeps working offline.

use crate::types::ApiEnvelope;
use crate::{ApiClient, ClientError};
use printhub_core::pricing::PrintingRates;

/// Rates plus where they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RatesLookup {
    pub rates: PrintingRates,
    pub from_fallback: bool,
}

impl ApiClient {
    /// Fetch printing rates for a stationary. Never fails: any error in
    /// the lookup chain degrades to the fallback rates.
    pub async fn printing_rates(&self, stationary_id: &str) -> RatesLookup {
        match self.try_printing_rates(stationary_id).await {
            Ok(rates) => RatesLookup {
                rates,
                from_fallback: false,
            },
            Err(error) => {
                tracing::warn!(%stationary_id, %error, "rates lookup failed, using fallback rates");
                RatesLookup {
                    rates: PrintingRates::fallback(),
                    from_fallback: true,
                }
            }
        }
    }

    async fn try_printing_rates(
        &self,
        stationary_id: &str,
    ) -> Result<PrintingRates, ClientError> {
        let response = self
            .http
            .get(self.url("/student/printing-rates"))
            .query(&[("stationaryId", stationary_id)])
            .send()
            .await?;

        let status = response.status().as_u16();
        if matches!(status, 404 | 405) {
            // Older deployments only accept the id in a POST body
            let response = self
                .http
                .post(self.url("/student/printing-rates"))
                .json(&serde_json::json!({ "stationaryId": stationary_id }))
                .send()
                .await?;
            let envelope: ApiEnvelope<PrintingRates> =
                Self::check(response).await?.json().await?;
            return Ok(envelope.data);
        }

        let envelope: ApiEnvelope<PrintingRates> = Self::check(response).await?.json().await?;
        Ok(envelope.data)
    }
}

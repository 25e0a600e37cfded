//! Order and payment endpoints

use crate::types::{
    ApiEnvelope, CreateOrderRequest, CreateOrderResponse, Order, Stationary,
    VerifyPaymentRequest, VerifyPaymentResponse,
};
use crate::{ApiClient, ClientError};
use printhub_core::pricing::FulfillmentMode;

impl ApiClient {
    pub async fn fetch_stationaries(&self) -> Result<Vec<Stationary>, ClientError> {
        let response = self
            .http
            .get(self.url("/student/get-stationaries"))
            .send()
            .await?;
        let envelope: ApiEnvelope<Vec<Stationary>> =
            Self::check(response).await?.json().await?;
        Ok(envelope.data)
    }

    /// Create an order from the current cart. Delivery orders require a
    /// non-blank address; this is checked before anything goes out.
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ClientError> {
        if request.order_type == FulfillmentMode::Delivery
            && request.delivery_address.trim().is_empty()
        {
            return Err(ClientError::Validation(
                "Delivery orders require a delivery address".into(),
            ));
        }

        let response = self
            .http
            .post(self.url("/student/create-order"))
            .json(request)
            .send()
            .await?;
        let envelope: ApiEnvelope<CreateOrderResponse> =
            Self::check(response).await?.json().await?;
        tracing::info!(
            order_id = %envelope.data.new_payment.order.id,
            amount_in_paise = envelope.data.new_payment.amount_in_paise,
            "order created"
        );
        Ok(envelope.data)
    }

    /// Confirm a completed payment with the backend.
    pub async fn verify_payment(
        &self,
        request: &VerifyPaymentRequest,
    ) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.url("/verify-payment"))
            .json(request)
            .send()
            .await?;
        let body: VerifyPaymentResponse = Self::check(response).await?.json().await?;
        if !body.success {
            return Err(ClientError::Api {
                status: 200,
                message: "Payment verification failed".into(),
            });
        }
        Ok(())
    }

    pub async fn fetch_orders(&self) -> Result<Vec<Order>, ClientError> {
        let response = self.http.get(self.url("/student/orders")).send().await?;
        let envelope: ApiEnvelope<Vec<Order>> = Self::check(response).await?.json().await?;
        Ok(envelope.data)
    }
}

//! Payments

use presswork::signature::{SignatureError, verify_payment_signature};
use serde::{Deserialize, Serialize};

use crate::config::Secret;

pub mod errors;
pub mod service;

pub use errors::PaymentsServiceError;
pub use service::*;

/// Payment references returned by the provider after the customer pays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderPayment {
    pub provider_order_id: String,
    pub provider_payment_id: String,
    pub signature: String,
}

/// Verifies provider payment signatures with the shared secret.
#[derive(Debug, Clone)]
pub struct PaymentVerifier {
    secret: Secret,
}

impl PaymentVerifier {
    #[must_use]
    pub fn new(secret: Secret) -> Self {
        Self { secret }
    }

    /// Check that `payment` was signed by the provider.
    ///
    /// # Errors
    ///
    /// Returns a [`SignatureError`] when the signature is malformed or does not match.
    pub fn verify(&self, payment: &ProviderPayment) -> Result<(), SignatureError> {
        verify_payment_signature(
            self.secret.expose().as_bytes(),
            &payment.provider_order_id,
            &payment.provider_payment_id,
            &payment.signature,
        )
    }
}

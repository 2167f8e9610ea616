//! External providers: payments, shipping and mail.

pub mod carrier;
pub mod mailer;
pub mod payments;
pub mod token_cache;

pub use carrier::{Carrier, CarrierError, CarrierShipment, HttpCarrier, PaymentMode, ShipmentItem, ShipmentRequest};
pub use mailer::{HttpMailer, Mailer, MailerError};
pub use payments::{HttpPaymentGateway, PaymentGateway, PaymentGatewayError, PaymentIntent};
pub use token_cache::TokenCache;

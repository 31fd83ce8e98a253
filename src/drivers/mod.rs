//! Mexican driver onboarding checks: RFC format and required documents.

pub mod documents;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod rfc;
pub mod routes;
pub mod services;

pub use rfc::validate_rfc;
pub use routes::router;
pub use services::validate_driver;

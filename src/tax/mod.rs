//! ISR/IVA retention on driver payouts

pub mod calculators;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

pub use calculators::{calculate_retention, Retention, RetentionRates};
pub use routes::router;
pub use services::calculate_tax_retention;

//! CFDI 4.0 electronic invoices for rides and deliveries.

pub mod builder;
pub mod models;
pub mod pac;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

pub use pac::{FacturamaClient, PacClient, PacError, PacRegistry, SandboxPac};
pub use routes::router;
pub use services::generate_cfdi;

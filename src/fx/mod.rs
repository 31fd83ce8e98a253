//! Exchange rates: provider client, storage, refresh job.

pub mod client;
pub mod responses;
pub mod routes;
pub mod services;
pub mod store;

pub use client::{FxApiClient, RateSource};
pub use routes::router;
pub use services::{refresh_rates, start_fx_refresher};
pub use store::{PgRateStore, RateStore};

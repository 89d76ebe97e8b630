pub mod app_config;
pub mod duffel;
pub mod stripe;

pub use duffel::DuffelClient;
pub use stripe::StripeGateway;

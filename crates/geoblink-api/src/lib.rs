// geoblink-api: Async Rust client for the GeoBlink tracker platform API.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::TrackerClient;
pub use error::Error;
pub use models::{AuthGrant, NotificationDto, PaymentOrder, SubscriptionDto, TrackerDto};
pub use transport::{TlsMode, TransportConfig};

pub mod checkout;
pub mod clock;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod insight;
pub mod models;
pub mod stats;
pub mod store;
pub mod tracing_setup;

pub use checkout::{BrowserNavigator, CheckoutClient, CheckoutError, CheckoutState, Navigator};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{CoreConfig, DashboardConfig};
pub use dashboard::{Dashboard, DashboardError};

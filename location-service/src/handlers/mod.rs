pub mod health;
pub mod metrics;
pub mod near;

pub use health::health_check;
pub use self::metrics::metrics_endpoint;
pub use near::{near_lat_lon, near_zip};

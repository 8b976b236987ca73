pub mod metrics;
pub mod query;
pub mod render;
pub mod store;

pub use self::metrics::{get_metrics, init_metrics, record_lookup};
pub use query::{zip_filter, ProximityQuery, PROXIMITY_LIMIT};
pub use store::{InMemoryLocationStore, LocationStore, MongoLocationStore};

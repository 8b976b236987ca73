pub mod location;

pub use location::{LocationRecord, Point};

//! Geographic inference: station gazetteer and prefecture resolution.

pub mod gazetteer;
pub mod prefectures;
pub mod resolver;

pub use gazetteer::{Gazetteer, GazetteerEntry};
pub use resolver::{prefixed_location, RegionResolver};

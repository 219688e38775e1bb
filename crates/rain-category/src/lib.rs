//! Rainfall Categories
//!
//! Maps a daily rainfall amount onto the six BMKG intensity buckets used for display.

mod category;

pub use category::{categorize, CategoryInfo, RainCategory};

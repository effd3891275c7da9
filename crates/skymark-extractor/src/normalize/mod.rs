//! Text normalization for extracted watermark fields
//!
//! Both normalizers are total: they never fail, and input they cannot
//! classify comes back cleaned but otherwise unchanged.

mod location;
mod time;

pub use location::clean_location_text;
pub use time::{normalize_time, TimeShape};

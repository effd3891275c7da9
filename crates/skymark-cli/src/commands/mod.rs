//! Command implementations.

pub mod extract;
pub mod normalize;
pub mod status;

pub use self::extract::{execute_extract, run_extract};
pub use self::normalize::{execute_normalize, normalize_text};
pub use self::status::execute_status;

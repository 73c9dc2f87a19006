pub mod error;
pub mod gpx;
pub mod legs;
pub mod pipeline;
pub mod projection;
pub mod reattach;
pub mod report;
pub mod simplify;

pub use error::{Error, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

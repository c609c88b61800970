pub mod enums;
pub mod error;
pub mod structs;
pub mod time;

// Re-export the core types to provide a clean public API.
pub use enums::{Period, PlatformFormat, TradeSide, ViewMode};
pub use error::CoreError;
pub use structs::{Leg, Trade};

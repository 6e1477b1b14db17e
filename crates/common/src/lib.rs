//! Theory test booking suite - common library
//!
//! Session-data fixtures, lookup tables and configuration shared by the CRM
//! seeding helper and the browser suite.

pub mod config;
pub mod error;
pub mod fixture;
pub mod generate;
pub mod types;

// Re-export commonly used types
pub use config::{CrmConfig, SessionStoreConfig, SuiteConfig};
pub use error::{Error, Result};
pub use fixture::{Booking, BookingChange, Candidate, Journey, SessionData, SessionDataBuilder};
pub use generate::is_booking_reference;
pub use types::*;

/// Suite version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

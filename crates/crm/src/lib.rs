//! CRM test-data helper
//!
//! Talks to the booking system's CRM Web API to create the records a UI
//! scenario needs before it starts, and to cancel them afterwards.

pub mod client;
pub mod error;
pub mod memory;
pub mod query;
pub mod seed;

pub use client::{CrmApi, DynamicsClient};
pub use error::{CrmError, CrmResult};
pub use memory::{CrmRequest, InMemoryCrm};
pub use query::{bind, ODataQuery};
pub use seed::{SeededBooking, TestDataSeeder};

//! Theory test booking E2E suite
//!
//! Drives the booking app in a real browser through page objects and
//! navigation helpers, with fixtures from `ftts-common` and CRM seeding from
//! `ftts-crm`:
//! - A persistent Playwright process executes [`Action`]s sent as JSON lines
//! - [`Ui`] wraps the driver in timed interaction and assertion primitives
//! - Page objects model each screen; the navigation graph records which
//!   action leads where
//! - Helpers compose pages into whole journeys and scenarios compose helpers
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  E2E Suite Runner (Rust)                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SuiteRunner                                                │
//! │    ├── fixture() -> SessionData                             │
//! │    ├── TestDataSeeder::seed_booking() -> SeededBooking      │
//! │    ├── DriverFactory::launch() -> Box<dyn Driver>           │
//! │    ├── SessionSeeder::seed() (optional cookie)              │
//! │    ├── scenario.run(ctx) -> E2eResult<()>                   │
//! │    └── cancel_booking_product() / write_results()           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario                                                   │
//! │    └── helpers::*  (create_new_booking, change_language..)  │
//! │          └── pages::*  (StartPage, BookingDetailsPage..)    │
//! │                └── Ui  (click, type_text, verify_text..)    │
//! │                      └── Driver  (Playwright | Scripted)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod action;
pub mod driver;
pub mod error;
pub mod graph;
pub mod helpers;
pub mod pages;
pub mod playwright;
pub mod probe;
pub mod runner;
pub mod scenario;
pub mod scripted;
pub mod session;
pub mod ui;

pub use action::{Action, Condition};
pub use driver::{Driver, DriverFactory};
pub use error::{E2eError, E2eResult};
pub use graph::{Page, PageId};
pub use playwright::{PlaywrightDriver, PlaywrightFactory};
pub use runner::{ScenarioResult, SuiteResult, SuiteRunner};
pub use scenario::{Scenario, ScenarioContext, SuiteType};
pub use scripted::{ScriptedDriver, ScriptedFactory};
pub use session::SessionSeeder;
pub use ui::Ui;

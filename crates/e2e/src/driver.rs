//! Browser driver seam

use async_trait::async_trait;
use serde_json::Value;

use crate::action::Action;
use crate::error::E2eResult;

/// Executes [`Action`]s against one browser session.
///
/// `perform` returns the action's value (text, count, URL) or `Null`.
/// Failures are reported as [`crate::E2eError::Driver`].
#[async_trait]
pub trait Driver: Send {
    async fn perform(&mut self, action: &Action) -> E2eResult<Value>;

    async fn close(&mut self) -> E2eResult<()> {
        self.perform(&Action::Close).await.map(|_| ())
    }
}

/// Opens a fresh browser session per scenario
#[async_trait]
pub trait DriverFactory: Send + Sync {
    async fn launch(&self) -> E2eResult<Box<dyn Driver>>;
}

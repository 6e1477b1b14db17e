//! Suite runner: fixtures, CRM seeding, one browser per scenario, results

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use ftts_common::{BookingStatus, Origin, SessionData, SuiteConfig};
use ftts_crm::{CrmApi, SeededBooking, TestDataSeeder};

use crate::driver::DriverFactory;
use crate::error::{E2eError, E2eResult};
use crate::scenario::{self, CrmState, Scenario, ScenarioContext, SuiteType};
use crate::session::SessionSeeder;
use crate::ui::Ui;

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub types: Vec<SuiteType>,
    pub success: bool,
    pub skipped: bool,
    pub duration_ms: u64,
    pub booking_reference: Option<String>,
    pub session_seeded: bool,
    pub screenshot: Option<String>,
    pub error: Option<String>,
}

impl ScenarioResult {
    fn new(scenario: &Scenario) -> Self {
        Self {
            name: scenario.name.to_string(),
            types: scenario.types.to_vec(),
            success: false,
            skipped: false,
            duration_ms: 0,
            booking_reference: None,
            session_seeded: false,
            screenshot: None,
            error: None,
        }
    }

    fn failed(mut self, error: &E2eError) -> Self {
        self.success = false;
        self.error = Some(error.to_string());
        self
    }

    fn skipped(mut self, reason: &str) -> Self {
        self.skipped = true;
        self.error = Some(reason.to_string());
        self
    }
}

/// Result of running a selection of scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

impl SuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

pub struct SuiteRunner {
    factory: Arc<dyn DriverFactory>,
    seeder: Option<TestDataSeeder<Arc<dyn CrmApi>>>,
    sessions: Option<SessionSeeder>,
    config: SuiteConfig,
    workers: usize,
    output_dir: PathBuf,
}

impl SuiteRunner {
    pub fn new(factory: Arc<dyn DriverFactory>, config: SuiteConfig) -> Self {
        Self {
            factory,
            seeder: None,
            sessions: None,
            config,
            workers: 1,
            output_dir: PathBuf::from("test-results"),
        }
    }

    /// Seed and clean up scenario data through `crm`
    pub fn with_crm(mut self, crm: Arc<dyn CrmApi>) -> Self {
        self.seeder = Some(TestDataSeeder::new(crm));
        self
    }

    pub fn with_sessions(mut self, sessions: SessionSeeder) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// Scenarios run in parallel up to `workers`; each is sequential inside
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Pick scenarios by name, or by suite type, or all of them
    pub fn select(suite: Option<SuiteType>, name: Option<&str>) -> E2eResult<Vec<&'static Scenario>> {
        if let Some(name) = name {
            return Ok(vec![scenario::find(name)?]);
        }
        Ok(scenario::catalogue()
            .iter()
            .filter(|s| suite.map_or(true, |suite| s.is_type(suite)))
            .collect())
    }

    pub async fn run(&self, scenarios: &[&'static Scenario]) -> SuiteResult {
        let start = Instant::now();
        info!("Running {} scenario(s) on {} worker(s)...", scenarios.len(), self.workers);

        let mut indexed: Vec<(usize, ScenarioResult)> = stream::iter(scenarios.iter().enumerate())
            .map(|(index, scenario)| async move { (index, self.run_scenario(scenario).await) })
            .buffer_unordered(self.workers)
            .collect()
            .await;
        indexed.sort_by_key(|(index, _)| *index);
        let results: Vec<ScenarioResult> = indexed.into_iter().map(|(_, result)| result).collect();

        let passed = results.iter().filter(|r| r.success).count();
        let skipped = results.iter().filter(|r| r.skipped).count();
        let failed = results.len() - passed - skipped;
        let duration_ms = start.elapsed().as_millis() as u64;

        info!("");
        info!(
            "Scenario results: {} passed, {} failed, {} skipped ({} ms)",
            passed, failed, skipped, duration_ms
        );

        SuiteResult {
            total: results.len(),
            passed,
            failed,
            skipped,
            duration_ms,
            results,
        }
    }

    /// Run one scenario in its own browser session. Never returns an error;
    /// failures are recorded in the result.
    pub async fn run_scenario(&self, scenario: &Scenario) -> ScenarioResult {
        let start = Instant::now();
        let mut result = ScenarioResult::new(scenario);
        debug!(scenario = scenario.name, "Starting scenario");

        let mut data = match (scenario.fixture)() {
            Ok(data) => data,
            Err(e) => return self.finish(result.failed(&e.into()), start),
        };

        let seeded = match self.prepare_crm(scenario, &mut data).await {
            Ok(seeded) => seeded,
            Err(e) if matches!(e, E2eError::Journey(_)) => {
                warn!(scenario = scenario.name, "Skipped: {}", e);
                return self.finish(result.skipped(&e.to_string()), start);
            }
            Err(e) => return self.finish(result.failed(&e), start),
        };

        let driver = match self.factory.launch().await {
            Ok(driver) => driver,
            Err(e) => {
                self.teardown(seeded.as_ref()).await;
                return self.finish(result.failed(&e), start);
            }
        };

        let mut ctx = ScenarioContext::new(Ui::new(driver, &self.config), data);
        ctx.seeded = seeded;
        if let Some(sessions) = &self.sessions {
            ctx.session_seeded = sessions.seed(&mut ctx.ui, &ctx.data).await;
        }

        let outcome = (scenario.run)(&mut ctx).await;
        if let Err(e) = &outcome {
            ctx.ui.capture_failure(scenario.name).await;
            result.screenshot = Some(
                PathBuf::from(&self.config.browser.screenshot_dir)
                    .join(format!("{}.png", scenario.name))
                    .to_string_lossy()
                    .to_string(),
            );
            result.error = Some(e.to_string());
        }

        self.teardown(ctx.seeded.as_ref()).await;
        if let Err(e) = ctx.ui.close().await {
            warn!(scenario = scenario.name, "Browser did not close cleanly: {}", e);
        }

        result.success = outcome.is_ok();
        result.session_seeded = ctx.session_seeded;
        result.booking_reference = ctx.data.current_booking.reference.clone();
        self.finish(result, start)
    }

    async fn prepare_crm(&self, scenario: &Scenario, data: &mut SessionData) -> E2eResult<Option<SeededBooking>> {
        let Some(seeder) = &self.seeder else {
            return match scenario.crm {
                CrmState::Compensation => Err(E2eError::Journey(
                    "compensation scenarios need a configured CRM".to_string(),
                )),
                CrmState::Booking if data.current_booking.origin != Origin::CitizenPortal => {
                    Err(E2eError::Journey(format!(
                        "{:?} bookings need a configured CRM",
                        data.current_booking.origin
                    )))
                }
                _ => Ok(None),
            };
        };

        match scenario.crm {
            CrmState::None => Ok(None),
            CrmState::Booking => {
                let seeded = seeder.seed_booking(data).await?;
                seeded.apply_to(data);
                Ok(Some(seeded))
            }
            CrmState::Compensation => {
                let seeded = seeder.seed_booking(data).await?;
                seeded.apply_to(data);
                if let Err(e) = seeder.mark_compensation(&seeded).await {
                    seeder.cancel_booking_product(&seeded).await;
                    return Err(e.into());
                }
                data.current_booking.status = BookingStatus::Cancelled;
                data.current_booking.product_status = BookingStatus::Cancelled;
                data.current_booking.owed_compensation = true;
                Ok(Some(seeded))
            }
        }
    }

    async fn teardown(&self, seeded: Option<&SeededBooking>) {
        if let (Some(seeder), Some(seeded)) = (&self.seeder, seeded) {
            seeder.cancel_booking_product(seeded).await;
        }
    }

    fn finish(&self, mut result: ScenarioResult, start: Instant) -> ScenarioResult {
        result.duration_ms = start.elapsed().as_millis() as u64;
        if result.success {
            info!("✓ {} ({} ms)", result.name, result.duration_ms);
        } else if result.skipped {
            info!("- {} skipped: {}", result.name, result.error.as_deref().unwrap_or_default());
        } else {
            error!("✗ {} - {}", result.name, result.error.as_deref().unwrap_or("unknown error"));
        }
        result
    }

    /// Write results to `test-results.json` in the output directory
    pub fn write_results(&self, results: &SuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

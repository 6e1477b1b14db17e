//! Scenario catalogue
//!
//! A scenario is one independent browser journey: a fixture recipe, the CRM
//! state it needs and the steps it drives. Scenarios are grouped by
//! [`SuiteType`] so a run can pick a subset from the command line.

use std::fmt;

use chrono::Duration;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::info;

use ftts_common::{BookingChange, Language, Locale, Origin, SessionData, Target, Voiceover};
use ftts_crm::SeededBooking;

use crate::error::{E2eError, E2eResult};
use crate::helpers;
use crate::pages::*;
use crate::ui::Ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SuiteType {
    E2e,
    Regression,
    ManageBooking,
    Instructor,
    BulkCompensation,
}

impl fmt::Display for SuiteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SuiteType::E2e => "e2e",
            SuiteType::Regression => "regression",
            SuiteType::ManageBooking => "manage-booking",
            SuiteType::Instructor => "instructor",
            SuiteType::BulkCompensation => "bulk-compensation",
        };
        f.write_str(name)
    }
}

/// What a scenario needs in the CRM before it starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrmState {
    /// Nothing; the scenario creates its own data through the app
    None,
    /// A confirmed booking. Created through the app when no CRM is configured.
    Booking,
    /// A booking cancelled by the authority and owed compensation
    Compensation,
}

/// Everything a running scenario owns
pub struct ScenarioContext {
    pub ui: Ui,
    pub data: SessionData,
    pub seeded: Option<SeededBooking>,
    pub session_seeded: bool,
}

impl ScenarioContext {
    pub fn new(ui: Ui, data: SessionData) -> Self {
        Self {
            ui,
            data,
            seeded: None,
            session_seeded: false,
        }
    }

    /// Make sure the fixture refers to a confirmed booking, booking one
    /// through the app if nothing was seeded
    pub async fn ensure_booking(&mut self) -> E2eResult<()> {
        if self.data.current_booking.reference.is_some() {
            return Ok(());
        }
        if self.data.current_booking.owed_compensation {
            return Err(E2eError::Journey(
                "compensation bookings can only be seeded through the CRM".to_string(),
            ));
        }
        if self.data.current_booking.origin != Origin::CitizenPortal {
            return Err(E2eError::Journey(format!(
                "{:?} bookings can only be seeded through the CRM",
                self.data.current_booking.origin
            )));
        }
        helpers::create_new_booking(&mut self.ui, &mut self.data).await?;
        Ok(())
    }
}

pub type ScenarioFn = for<'a> fn(&'a mut ScenarioContext) -> BoxFuture<'a, E2eResult<()>>;

#[derive(Clone, Copy)]
pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    pub types: &'static [SuiteType],
    pub crm: CrmState,
    pub fixture: fn() -> ftts_common::Result<SessionData>,
    pub run: ScenarioFn,
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("types", &self.types)
            .field("crm", &self.crm)
            .finish()
    }
}

impl Scenario {
    pub fn is_type(&self, suite: SuiteType) -> bool {
        self.types.contains(&suite)
    }
}

pub fn catalogue() -> &'static [Scenario] {
    CATALOGUE
}

pub fn find(name: &str) -> E2eResult<&'static Scenario> {
    CATALOGUE
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| E2eError::ScenarioNotFound(name.to_string()))
}

use SuiteType::*;

static CATALOGUE: &[Scenario] = &[
    Scenario {
        name: "book-standard-test-gb",
        description: "Book and pay for a car theory test in GB",
        types: &[E2e, Regression],
        crm: CrmState::None,
        fixture: gb_fixture,
        run: book_standard_test,
    },
    Scenario {
        name: "book-standard-test-ni",
        description: "Book and pay for a car theory test in Northern Ireland",
        types: &[E2e, Regression],
        crm: CrmState::None,
        fixture: ni_fixture,
        run: book_standard_test,
    },
    Scenario {
        name: "book-standard-test-welsh-site",
        description: "Book through the Welsh-language site",
        types: &[Regression],
        crm: CrmState::None,
        fixture: welsh_site_fixture,
        run: book_standard_test,
    },
    Scenario {
        name: "book-instructor-test",
        description: "Book an approved driving instructor theory test",
        types: &[Instructor, Regression],
        crm: CrmState::None,
        fixture: instructor_fixture,
        run: book_standard_test,
    },
    Scenario {
        name: "send-support-request",
        description: "Ask for non-standard support instead of booking",
        types: &[E2e, Regression],
        crm: CrmState::None,
        fixture: support_fixture,
        run: send_support_request,
    },
    Scenario {
        name: "validation-errors",
        description: "Forms reject missing and mismatched answers",
        types: &[Regression],
        crm: CrmState::None,
        fixture: gb_fixture,
        run: validation_errors,
    },
    Scenario {
        name: "cancel-booking",
        description: "Cancel a booking from manage booking",
        types: &[ManageBooking, Regression],
        crm: CrmState::Booking,
        fixture: gb_fixture,
        run: cancel_booking,
    },
    Scenario {
        name: "keep-booking",
        description: "Open the cancellation page and keep the booking after all",
        types: &[ManageBooking, Regression],
        crm: CrmState::Booking,
        fixture: gb_fixture,
        run: keep_booking,
    },
    Scenario {
        name: "customer-service-booking-locked",
        description: "A booking made by the customer service centre cannot be changed online",
        types: &[ManageBooking, Regression],
        crm: CrmState::Booking,
        fixture: customer_service_fixture,
        run: customer_service_booking_locked,
    },
    Scenario {
        name: "reschedule-then-cancel-change",
        description: "Start moving a test, back out, and see the booking unchanged",
        types: &[ManageBooking, Regression],
        crm: CrmState::Booking,
        fixture: gb_fixture,
        run: reschedule_then_cancel_change,
    },
    Scenario {
        name: "change-language-to-welsh",
        description: "Switch the test language of a GB booking to Welsh",
        types: &[ManageBooking, E2e],
        crm: CrmState::Booking,
        fixture: gb_fixture,
        run: change_language_to_welsh,
    },
    Scenario {
        name: "change-voiceover-and-bsl",
        description: "Add a voiceover and British Sign Language to a booking",
        types: &[ManageBooking],
        crm: CrmState::Booking,
        fixture: ni_fixture,
        run: change_voiceover_and_bsl,
    },
    Scenario {
        name: "request-refund",
        description: "Ask for a refund on a test cancelled by the authority",
        types: &[BulkCompensation],
        crm: CrmState::Compensation,
        fixture: compensation_fixture,
        run: request_refund,
    },
    Scenario {
        name: "rebook-compensation-test",
        description: "Re-book a test cancelled by the authority free of charge",
        types: &[BulkCompensation],
        crm: CrmState::Compensation,
        fixture: compensation_fixture,
        run: rebook_compensation_test,
    },
];

// Fixtures

fn gb_fixture() -> ftts_common::Result<SessionData> {
    SessionData::builder().target(Target::Gb).build()
}

fn ni_fixture() -> ftts_common::Result<SessionData> {
    SessionData::builder().target(Target::Ni).build()
}

fn welsh_site_fixture() -> ftts_common::Result<SessionData> {
    SessionData::builder()
        .target(Target::Gb)
        .locale(Locale::Cy)
        .language(Language::Welsh)
        .build()
}

fn instructor_fixture() -> ftts_common::Result<SessionData> {
    SessionData::builder().instructor(true).build()
}

fn support_fixture() -> ftts_common::Result<SessionData> {
    SessionData::builder().non_standard(true).build()
}

fn customer_service_fixture() -> ftts_common::Result<SessionData> {
    SessionData::builder()
        .target(Target::Gb)
        .origin(Origin::CustomerServiceCentre)
        .eligibility_bypass(true)
        .build()
}

fn compensation_fixture() -> ftts_common::Result<SessionData> {
    SessionData::builder().compensation(true).build()
}

// Journeys

fn book_standard_test(ctx: &mut ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        let confirmation = helpers::create_new_booking(&mut ctx.ui, &mut ctx.data).await?;
        // Confirmation links through to manage booking with the new reference
        confirmation.manage_booking(&mut ctx.ui).await?;
        helpers::login_to_manage_booking(&mut ctx.ui, &ctx.data).await?;
        Ok(())
    }
    .boxed()
}

fn send_support_request(ctx: &mut ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        helpers::send_nsa_support_request(&mut ctx.ui, &mut ctx.data).await?;
        Ok(())
    }
    .boxed()
}

fn validation_errors(ctx: &mut ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        let ui = &mut ctx.ui;
        let data = &ctx.data;

        let start: StartPage = ui.open(data).await?;
        let support = start.start_now(ui).await?.submit_without_answer(ui).await?;
        let details = support.choose_no_support(ui).await?.submit_empty(ui).await?;
        let test_type = details.enter_details(ui, &data.candidate).await?;
        let search = test_type
            .choose(ui, data.current_booking.test_type)
            .await?
            .choose(ui, data.current_booking.language)
            .await?
            .search_blank(ui)
            .await?;
        let contact = search
            .search(ui, &data.test_centre_search)
            .await?
            .choose(ui, &data.current_booking.centre)
            .await?
            .choose(ui, data.current_booking.date_time.date())
            .await?
            .choose(ui, data.current_booking.date_time)
            .await?;
        contact
            .enter_mismatched_email(ui, &data.candidate.email)
            .await?;

        let login: ManageBookingLoginPage = ui.open(data).await?;
        login
            .login_with_invalid(ui, &data.candidate.licence_number, "B-000-000-000")
            .await?;
        info!("Validation messages shown for every rejected form");
        Ok(())
    }
    .boxed()
}

fn cancel_booking(ctx: &mut ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        ctx.ensure_booking().await?;
        helpers::cancel_booking(&mut ctx.ui, &mut ctx.data).await?;
        Ok(())
    }
    .boxed()
}

fn keep_booking(ctx: &mut ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        ctx.ensure_booking().await?;
        helpers::keep_booking(&mut ctx.ui, &ctx.data).await?;
        Ok(())
    }
    .boxed()
}

fn customer_service_booking_locked(ctx: &mut ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        ctx.ensure_booking().await?;
        helpers::verify_changes_locked(&mut ctx.ui, &ctx.data).await?;
        Ok(())
    }
    .boxed()
}

fn reschedule_then_cancel_change(ctx: &mut ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        ctx.ensure_booking().await?;
        let later = ctx.data.current_booking.date_time + Duration::days(7);
        let unchanged =
            helpers::change_then_cancel(&mut ctx.ui, &ctx.data, BookingChange::DateTime(later)).await?;
        if unchanged != ctx.data {
            return Err(E2eError::Content(
                "abandoning a change altered the fixture".to_string(),
            ));
        }
        Ok(())
    }
    .boxed()
}

fn change_language_to_welsh(ctx: &mut ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        ctx.ensure_booking().await?;
        ctx.data = helpers::change_language(&mut ctx.ui, &ctx.data, Language::Welsh).await?;
        Ok(())
    }
    .boxed()
}

fn change_voiceover_and_bsl(ctx: &mut ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        ctx.ensure_booking().await?;
        ctx.data = helpers::change_voiceover(&mut ctx.ui, &ctx.data, Voiceover::Polish).await?;
        ctx.data = helpers::change_bsl(&mut ctx.ui, &ctx.data, true).await?;
        Ok(())
    }
    .boxed()
}

fn request_refund(ctx: &mut ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        ctx.ensure_booking().await?;
        helpers::request_refund(&mut ctx.ui, &mut ctx.data).await?;
        Ok(())
    }
    .boxed()
}

fn rebook_compensation_test(ctx: &mut ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        ctx.ensure_booking().await?;
        let slot = ctx.data.current_booking.date_time + Duration::days(7);
        ctx.data = helpers::rebook_compensation_test(&mut ctx.ui, &ctx.data, slot).await?;
        Ok(())
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use test_case::test_case;

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = catalogue().iter().map(|s| s.name).collect();
        assert_eq!(names.len(), catalogue().len());
    }

    #[test]
    fn test_every_fixture_builds() {
        for scenario in catalogue() {
            let data = (scenario.fixture)().unwrap();
            assert_eq!(
                data.current_booking.owed_compensation,
                scenario.crm == CrmState::Compensation,
                "{}",
                scenario.name
            );
        }
    }

    #[test]
    fn test_customer_service_scenarios_need_seeded_bookings() {
        let scenario = find("customer-service-booking-locked").unwrap();
        let data = (scenario.fixture)().unwrap();
        assert_eq!(data.current_booking.origin, Origin::CustomerServiceCentre);
        assert!(data.current_booking.eligibility_bypass);
        for scenario in catalogue() {
            let data = (scenario.fixture)().unwrap();
            if data.current_booking.origin != Origin::CitizenPortal {
                assert_ne!(scenario.crm, CrmState::None, "{}", scenario.name);
            }
        }
    }

    #[test_case(E2e)]
    #[test_case(Regression)]
    #[test_case(ManageBooking)]
    #[test_case(Instructor)]
    #[test_case(BulkCompensation)]
    fn test_every_type_has_scenarios(suite: SuiteType) {
        assert!(catalogue().iter().any(|s| s.is_type(suite)), "{}", suite);
    }

    #[test]
    fn test_find() {
        assert_eq!(find("cancel-booking").unwrap().crm, CrmState::Booking);
        assert!(matches!(find("nope"), Err(E2eError::ScenarioNotFound(_))));
    }

    #[test]
    fn test_suite_type_names_match_cli() {
        use clap::ValueEnum;
        for suite in SuiteType::value_variants() {
            let value = suite.to_possible_value().unwrap();
            assert_eq!(value.get_name(), suite.to_string());
        }
    }
}

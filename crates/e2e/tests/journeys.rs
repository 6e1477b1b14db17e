//! Navigation helpers driven against a scripted app

use chrono::{Duration, NaiveDate};

use ftts_common::{
    format_pence, BookingChange, BookingStatus, Language, Origin, PaymentStatus, SessionData,
    SuiteConfig, Target, Voiceover,
};
use ftts_e2e::graph::Page;
use ftts_e2e::pages::*;
use ftts_e2e::{helpers, E2eError, ScriptedDriver, Ui};

const REFERENCE: &str = "B-123-456-789";

fn ui(driver: &ScriptedDriver) -> Ui {
    let config = SuiteConfig {
        booking_app_url: "https://booking.test".to_string(),
        ..Default::default()
    };
    Ui::new(Box::new(driver.clone()), &config)
}

fn fixture(target: Target) -> SessionData {
    SessionData::builder()
        .target(target)
        .today(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
        .seed(7)
        .build()
        .unwrap()
}

fn booked(target: Target) -> SessionData {
    let mut data = fixture(target);
    data.assign_reference(REFERENCE);
    data
}

/// App that lists the fixture's centre and issues [`REFERENCE`]
fn booking_app(data: &SessionData) -> ScriptedDriver {
    ScriptedDriver::new()
        .with_text(ChooseTestCentrePage::RESULT_NAME, &data.current_booking.centre.name)
        .with_text(BookingConfirmationPage::REFERENCE, REFERENCE)
}

#[tokio::test]
async fn test_create_booking_records_reference() {
    let mut data = fixture(Target::Gb);
    let driver = booking_app(&data);
    let mut ui = ui(&driver);

    helpers::create_new_booking(&mut ui, &mut data).await.unwrap();

    let booking = &data.current_booking;
    assert_eq!(booking.reference.as_deref(), Some(REFERENCE));
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.payment_status, PaymentStatus::Success);
    assert_eq!(driver.filled(FindTestCentrePage::SEARCH), Some(data.test_centre_search.clone()));
    assert_eq!(driver.filled(PaymentPage::CARD_NUMBER).as_deref(), Some(PaymentPage::TEST_CARD));
    assert!(driver.visible_checks().contains(&TestLanguagePage::HEADING.to_string()));
}

#[tokio::test]
async fn test_ni_booking_skips_language_choice() {
    let mut data = fixture(Target::Ni);
    let driver = booking_app(&data);
    let mut ui = ui(&driver);

    helpers::create_new_booking(&mut ui, &mut data).await.unwrap();

    assert!(!driver.visible_checks().contains(&TestLanguagePage::HEADING.to_string()));
    assert!(driver
        .performed()
        .iter()
        .any(|action| matches!(action, ftts_e2e::Action::Navigate { url } if url.ends_with("?target=ni&lang=en"))));
}

#[tokio::test]
async fn test_ni_pages_show_no_language_row() {
    let mut data = fixture(Target::Ni);
    let driver = booking_app(&data)
        .missing(CheckYourAnswersPage::TEST_LANGUAGE)
        .missing(BookingConfirmationPage::TEST_LANGUAGE)
        .missing(BookingDetailsPage::TEST_LANGUAGE);
    let mut ui = ui(&driver);

    helpers::create_new_booking(&mut ui, &mut data).await.unwrap();
    helpers::login_to_manage_booking(&mut ui, &data).await.unwrap();
}

#[tokio::test]
async fn test_gb_pages_require_language_row() {
    let mut data = fixture(Target::Gb);
    let driver = booking_app(&data).missing(CheckYourAnswersPage::TEST_LANGUAGE);
    let mut ui = ui(&driver);

    let err = helpers::create_new_booking(&mut ui, &mut data).await.unwrap_err();
    match err {
        E2eError::Assertion { selector, .. } => assert_eq!(selector, CheckYourAnswersPage::TEST_LANGUAGE),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_instructor_booking_uses_instructor_pages() {
    let mut data = SessionData::builder().instructor(true).seed(3).build().unwrap();
    let driver = booking_app(&data);
    let mut ui = ui(&driver);

    helpers::create_new_booking(&mut ui, &mut data).await.unwrap();

    let visited = driver.visible_checks();
    assert!(visited.contains(&InstructorStartPage::HEADING.to_string()));
    assert!(visited.contains(&InstructorDetailsPage::HEADING.to_string()));
    assert_eq!(
        driver.filled(InstructorDetailsPage::PERSONAL_REFERENCE),
        data.candidate.personal_reference_number.clone()
    );
}

#[tokio::test]
async fn test_malformed_reference_is_rejected() {
    let mut data = fixture(Target::Gb);
    let driver = booking_app(&data).with_text(BookingConfirmationPage::REFERENCE, "pending");
    let mut ui = ui(&driver);

    let err = helpers::create_new_booking(&mut ui, &mut data).await.unwrap_err();

    assert!(matches!(err, E2eError::Content(_)), "{}", err);
    assert!(data.current_booking.reference.is_none());
}

#[tokio::test]
async fn test_unlisted_centre_fails() {
    let mut data = fixture(Target::Gb);
    let driver = booking_app(&data).with_text(ChooseTestCentrePage::RESULT_NAME, "Somewhere Else");
    let mut ui = ui(&driver);

    let err = helpers::create_new_booking(&mut ui, &mut data).await.unwrap_err();
    assert!(err.to_string().contains(&data.current_booking.centre.name));
}

#[tokio::test]
async fn test_support_request_is_not_a_booking() {
    let mut data = SessionData::builder().non_standard(true).seed(5).build().unwrap();
    let driver = ScriptedDriver::new();
    let mut ui = ui(&driver);

    let err = helpers::create_new_booking(&mut ui, &mut data).await.unwrap_err();
    assert!(matches!(err, E2eError::Journey(_)));
    assert!(driver.performed().is_empty());

    helpers::send_nsa_support_request(&mut ui, &mut data).await.unwrap();
    assert!(data.current_booking.reference.is_none());
    assert_eq!(
        driver.filled(PreferredDayPage::DETAILS).as_deref(),
        Some("Weekday mornings, not Fridays")
    );
    assert_eq!(driver.filled(TelephoneContactPage::NUMBER), Some(data.candidate.telephone.clone()));
    assert!(!driver.visible_checks().contains(&VoiceoverPage::HEADING.to_string()));
}

#[tokio::test]
async fn test_support_request_with_voiceover_asks_for_language() {
    let mut data = SessionData::builder().non_standard(true).seed(5).build().unwrap();
    data.current_booking
        .select_support_type
        .push(ftts_common::SupportType::Voiceover);
    data.current_booking.voiceover = Some(Voiceover::Welsh);
    let driver = ScriptedDriver::new();
    let mut ui = ui(&driver);

    helpers::send_nsa_support_request(&mut ui, &mut data).await.unwrap();

    assert!(driver.visible_checks().contains(&VoiceoverPage::HEADING.to_string()));
    assert!(driver.clicked("input[name='voiceover'][value='welsh']"));
}

#[tokio::test]
async fn test_welsh_change_shown_on_confirmation() {
    let data = booked(Target::Gb);
    let driver = ScriptedDriver::new().with_text(ChangeConfirmedPage::TEST_LANGUAGE, "Welsh");
    let mut ui = ui(&driver);

    let updated = helpers::change_language(&mut ui, &data, Language::Welsh).await.unwrap();

    assert_eq!(updated.current_booking.language, Language::Welsh);
    assert_eq!(data.current_booking.language, Language::English);
}

#[tokio::test]
async fn test_unapplied_language_change_fails() {
    let data = booked(Target::Gb);
    let driver = ScriptedDriver::new().with_text(ChangeConfirmedPage::TEST_LANGUAGE, "English");
    let mut ui = ui(&driver);

    let err = helpers::change_language(&mut ui, &data, Language::Welsh).await.unwrap_err();

    match err {
        E2eError::Assertion { selector, .. } => assert_eq!(selector, ChangeConfirmedPage::TEST_LANGUAGE),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_language_change_not_offered_in_ni() {
    let data = booked(Target::Ni);
    let driver = ScriptedDriver::new();
    let mut ui = ui(&driver);

    let err = helpers::change_language(&mut ui, &data, Language::Welsh).await.unwrap_err();
    assert!(matches!(err, E2eError::Journey(_)));
}

#[tokio::test]
async fn test_voiceover_and_bsl_changes_chain() {
    let data = booked(Target::Ni);
    let driver = ScriptedDriver::new()
        .with_text(ChangeConfirmedPage::VOICEOVER, "Polish")
        .with_text(ChangeConfirmedPage::BSL, "Yes");
    let mut ui = ui(&driver);

    let with_voiceover = helpers::change_voiceover(&mut ui, &data, Voiceover::Polish).await.unwrap();
    let with_bsl = helpers::change_bsl(&mut ui, &with_voiceover, true).await.unwrap();

    assert_eq!(with_bsl.current_booking.voiceover, Some(Voiceover::Polish));
    assert!(with_bsl.current_booking.bsl);
    assert!(!data.current_booking.bsl);
}

#[tokio::test]
async fn test_welsh_voiceover_not_offered_in_ni() {
    let data = booked(Target::Ni);
    let mut ui = ui(&ScriptedDriver::new());

    let err = helpers::change_voiceover(&mut ui, &data, Voiceover::Welsh).await.unwrap_err();
    assert!(matches!(err, E2eError::Journey(_)));
}

#[tokio::test]
async fn test_abandoned_change_leaves_booking_unchanged() {
    let data = booked(Target::Gb);
    let driver = ScriptedDriver::new();
    let mut ui = ui(&driver);
    let later = data.current_booking.date_time + Duration::days(7);

    let unchanged = helpers::change_then_cancel(&mut ui, &data, BookingChange::DateTime(later))
        .await
        .unwrap();

    assert_eq!(unchanged, data);
    assert!(driver.clicked(CheckChangePage::CANCEL_CHANGE));
    assert!(!driver.clicked(CheckChangePage::CONFIRM));
}

#[tokio::test]
async fn test_abandoned_change_still_displayed_fails() {
    let data = booked(Target::Gb);
    // Details page keeps showing the language the candidate backed out of
    let driver = ScriptedDriver::new().with_text(BookingDetailsPage::TEST_LANGUAGE, "Welsh");
    let mut ui = ui(&driver);

    let result =
        helpers::change_then_cancel(&mut ui, &data, BookingChange::Language(Language::Welsh)).await;
    assert!(matches!(result, Err(E2eError::Assertion { .. })));
}

#[tokio::test]
async fn test_cancel_marks_fixture_cancelled() {
    let mut data = booked(Target::Gb);
    let refund = format!("You will get {} back", format_pence(data.current_booking.price_pence));
    let driver = ScriptedDriver::new().with_text(CancelBookingPage::REFUND_AMOUNT, &refund);
    let mut ui = ui(&driver);

    helpers::cancel_booking(&mut ui, &mut data).await.unwrap();

    assert_eq!(data.current_booking.status, BookingStatus::Cancelled);
    assert!(driver.clicked(CancelBookingPage::CONFIRM));
    assert!(driver.clicked(BookingCancelledPage::BACK_TO_HOME));
}

#[tokio::test]
async fn test_keep_booking_returns_to_bookings_list() {
    let data = booked(Target::Gb);
    let driver = ScriptedDriver::new();
    let mut ui = ui(&driver);

    helpers::keep_booking(&mut ui, &data).await.unwrap();

    assert!(driver.clicked(CancelBookingPage::KEEP));
    assert!(!driver.clicked(CancelBookingPage::CONFIRM));
    assert!(driver.clicked(BookingDetailsPage::BACK_TO_HOME));
    let checks = driver.visible_checks();
    let last = |heading: &str| checks.iter().rposition(|s| s == heading).unwrap();
    assert!(last(CancelBookingPage::HEADING) < last(BookingDetailsPage::HEADING));
    assert!(last(BookingDetailsPage::HEADING) < last(ManageBookingHomePage::HEADING));
}

fn customer_service_booking() -> SessionData {
    let mut data = SessionData::builder()
        .origin(Origin::CustomerServiceCentre)
        .eligibility_bypass(true)
        .seed(4)
        .build()
        .unwrap();
    data.assign_reference(REFERENCE);
    data
}

#[tokio::test]
async fn test_customer_service_booking_has_no_change_links() {
    let data = customer_service_booking();
    let driver = ScriptedDriver::new()
        .hidden(BookingDetailsPage::CHANGE_LANGUAGE)
        .hidden(BookingDetailsPage::CHANGE_VOICEOVER)
        .hidden(BookingDetailsPage::CHANGE_BSL)
        .hidden(BookingDetailsPage::CHANGE_TIME);
    let mut ui = ui(&driver);

    helpers::verify_changes_locked(&mut ui, &data).await.unwrap();

    let err = helpers::change_bsl(&mut ui, &data, true).await.unwrap_err();
    assert!(matches!(err, E2eError::Journey(_)));
    let err = helpers::verify_changes_locked(&mut ui, &booked(Target::Gb)).await.unwrap_err();
    assert!(matches!(err, E2eError::Journey(_)));
}

#[tokio::test]
async fn test_customer_service_booking_offering_changes_fails() {
    let data = customer_service_booking();
    let driver = ScriptedDriver::new().hidden(BookingDetailsPage::CHANGE_TIME);
    let mut ui = ui(&driver);

    let err = helpers::verify_changes_locked(&mut ui, &data).await.unwrap_err();
    match err {
        E2eError::Assertion { selector, .. } => assert_eq!(selector, BookingDetailsPage::CHANGE_LANGUAGE),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_refund_requires_compensation() {
    let mut data = booked(Target::Gb);
    let mut ui = ui(&ScriptedDriver::new());

    let err = helpers::request_refund(&mut ui, &mut data).await.unwrap_err();
    assert!(matches!(err, E2eError::Journey(_)));
}

#[tokio::test]
async fn test_refund_and_rebook_for_compensation_booking() {
    let mut data = SessionData::builder().compensation(true).seed(9).build().unwrap();
    data.assign_reference(REFERENCE);
    let driver = ScriptedDriver::new()
        .with_text(ChooseTestCentrePage::RESULT_NAME, &data.current_booking.centre.name)
        .hidden(BookingDetailsPage::CHANGE_TIME);
    let mut ui = ui(&driver);

    let slot = data.current_booking.date_time + Duration::days(7);
    let rebooked = helpers::rebook_compensation_test(&mut ui, &data, slot).await.unwrap();
    assert_eq!(rebooked.current_booking.date_time, slot);
    assert!(rebooked.current_booking.compensation_booking);
    assert!(!rebooked.current_booking.owed_compensation);

    helpers::request_refund(&mut ui, &mut data).await.unwrap();
    assert_eq!(data.current_booking.payment_status, PaymentStatus::RefundInProgress);
    assert!(driver.clicked(RefundRequestedPage::BACK_TO_HOME));
}

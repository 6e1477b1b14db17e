//! Navigation helpers
//!
//! Whole journeys composed from page objects. Each helper reads the fixture
//! to choose options, asserts what the app shows against it, and either
//! records what the app issued back into the fixture or returns the fixture
//! the booking now matches.

use chrono::NaiveDateTime;
use tracing::info;

use ftts_common::{
    is_booking_reference, BookingChange, BookingStatus, Language, Origin, PaymentStatus,
    SessionData, SupportType, Target, Voiceover,
};

use crate::error::{E2eError, E2eResult};
use crate::pages::*;
use crate::ui::Ui;

/// Customer-service bookings are changed by phone, never online
fn require_online_changes(data: &SessionData) -> E2eResult<()> {
    if data.current_booking.origin == Origin::CustomerServiceCentre {
        return Err(E2eError::Journey(
            "customer-service bookings cannot be changed online".to_string(),
        ));
    }
    Ok(())
}

fn require_reference(data: &SessionData) -> E2eResult<&str> {
    data.current_booking
        .reference
        .as_deref()
        .ok_or_else(|| E2eError::Journey("fixture has no booking reference".to_string()))
}

/// Book and pay for a standard test, writing the issued reference into `data`
pub async fn create_new_booking(ui: &mut Ui, data: &mut SessionData) -> E2eResult<BookingConfirmationPage> {
    data.validate()?;
    if data.is_non_standard() {
        return Err(E2eError::Journey(
            "support requests are sent with send_nsa_support_request".to_string(),
        ));
    }
    if data.journey.instructor {
        return create_new_instructor_booking(ui, data).await;
    }

    info!(target = %data.target, test_type = %data.current_booking.test_type, "Creating booking");
    let start: StartPage = ui.open(data).await?;
    let details = start.start_now(ui).await?.choose_no_support(ui).await?;
    let test_type = details.enter_details(ui, &data.candidate).await?;
    let search = choose_test_type(ui, test_type, data).await?;
    complete_booking(ui, search, data).await
}

/// Instructor variant of [`create_new_booking`]
pub async fn create_new_instructor_booking(
    ui: &mut Ui,
    data: &mut SessionData,
) -> E2eResult<BookingConfirmationPage> {
    data.validate()?;
    if !data.journey.instructor {
        return Err(E2eError::Journey("fixture is not an instructor".to_string()));
    }

    info!(target = %data.target, test_type = %data.current_booking.test_type, "Creating instructor booking");
    let start: InstructorStartPage = ui.open(data).await?;
    let details = start
        .start_now(ui)
        .await?
        .choose_no_support_as_instructor(ui)
        .await?;
    let test_type = details.enter_details(ui, &data.candidate).await?;
    let search = choose_test_type(ui, test_type, data).await?;
    complete_booking(ui, search, data).await
}

async fn choose_test_type(ui: &mut Ui, page: TestTypePage, data: &SessionData) -> E2eResult<FindTestCentrePage> {
    let booking = &data.current_booking;
    match data.target {
        Target::Gb => {
            page.choose(ui, booking.test_type)
                .await?
                .choose(ui, booking.language)
                .await
        }
        Target::Ni => page.choose_skipping_language(ui, booking.test_type).await,
    }
}

async fn complete_booking(
    ui: &mut Ui,
    search: FindTestCentrePage,
    data: &mut SessionData,
) -> E2eResult<BookingConfirmationPage> {
    let date_time = data.current_booking.date_time;
    let centres = search.search(ui, &data.test_centre_search).await?;
    let dates = centres.choose(ui, &data.current_booking.centre).await?;
    let times = dates.choose(ui, date_time.date()).await?;
    let contact = times.choose(ui, date_time).await?;
    let answers = contact.enter_email(ui, &data.candidate.email).await?;
    answers.verify_booking(ui, data).await?;

    let payment = answers.continue_to_payment(ui).await?;
    let confirmation = payment.pay_with_test_card(ui, data).await?;

    let reference = confirmation.booking_reference(ui).await?;
    if !is_booking_reference(&reference) {
        return Err(E2eError::Content(format!(
            "booking reference '{}' is not in X-000-000-000 form",
            reference
        )));
    }
    data.assign_reference(reference.as_str());
    data.current_booking.status = BookingStatus::Confirmed;
    data.current_booking.product_status = BookingStatus::Confirmed;
    data.current_booking.payment_status = PaymentStatus::Success;

    confirmation.verify_details(ui, data).await?;
    info!(reference = %reference, "Booking confirmed");
    Ok(confirmation)
}

/// Send a non-standard accommodation support request
pub async fn send_nsa_support_request(ui: &mut Ui, data: &mut SessionData) -> E2eResult<SupportRequestSentPage> {
    data.validate()?;
    if !data.is_non_standard() {
        return Err(E2eError::Journey(
            "standard bookings are made with create_new_booking".to_string(),
        ));
    }

    let booking = data.current_booking.clone();
    let preferred_day = booking
        .preferred_day
        .as_ref()
        .ok_or_else(|| E2eError::Journey("no preferred day".to_string()))?;
    let preferred_location = booking
        .preferred_location
        .as_ref()
        .ok_or_else(|| E2eError::Journey("no preferred location".to_string()))?;

    info!(support = ?booking.select_support_type, "Sending support request");
    let start: StartPage = ui.open(data).await?;
    let details = start.start_now(ui).await?.choose_support(ui).await?;
    let test_type = details.enter_details(ui, &data.candidate).await?;
    let support = test_type.choose_for_support(ui, booking.test_type).await?;

    let days = if booking.select_support_type.contains(&SupportType::Voiceover) {
        let voiceover = booking.voiceover.unwrap_or(Voiceover::NotRequired);
        support
            .choose_with_voiceover(ui, &booking)
            .await?
            .choose(ui, voiceover)
            .await?
    } else {
        support.choose(ui, &booking).await?
    };

    let contact = days
        .choose(ui, preferred_day)
        .await?
        .choose(ui, preferred_location)
        .await?
        .choose(ui, Some(data.candidate.telephone.as_str()))
        .await?;
    let answers = contact.enter_email(ui, &data.candidate.email).await?;
    answers.verify_support_request(ui, data).await?;

    let sent = answers.send_support_request(ui).await?;
    sent.verify_sent_to(ui, &data.candidate.email).await?;
    info!("Support request sent");
    Ok(sent)
}

/// Sign in to manage booking and open the fixture's booking
pub async fn login_to_manage_booking(ui: &mut Ui, data: &SessionData) -> E2eResult<BookingDetailsPage> {
    let reference = require_reference(data)?;

    let login: ManageBookingLoginPage = ui.open(data).await?;
    let home = login
        .login(ui, &data.candidate.licence_number, reference)
        .await?;
    home.verify_booking_listed(ui, reference).await?;
    if data.current_booking.owed_compensation {
        home.verify_compensation_notice(ui).await?;
    }

    let details = home.open_booking(ui, reference).await?;
    details.verify_details(ui, data).await?;
    Ok(details)
}

/// Change the test language; returns the fixture the booking now matches
pub async fn change_language(ui: &mut Ui, data: &SessionData, language: Language) -> E2eResult<SessionData> {
    if data.target == Target::Ni {
        return Err(E2eError::Journey("test language is only offered in GB".to_string()));
    }
    require_online_changes(data)?;
    let locale = data.locale;
    let current = data.current_booking.language;

    let details = login_to_manage_booking(ui, data).await?;
    let check = details.change_language(ui).await?.choose(ui, language).await?;
    check
        .verify_change(ui, current.label(locale), language.label(locale))
        .await?;
    let confirmed = check.confirm(ui).await?;
    confirmed.verify_language(ui, language).await?;

    let updated = data.apply(BookingChange::Language(language));
    confirmed.view_booking(ui).await?.verify_details(ui, &updated).await?;
    info!(from = ?current, to = ?language, "Test language changed");
    Ok(updated)
}

pub async fn change_voiceover(ui: &mut Ui, data: &SessionData, voiceover: Voiceover) -> E2eResult<SessionData> {
    if !Voiceover::offered_in(data.target).contains(&voiceover) && voiceover != Voiceover::NotRequired {
        return Err(E2eError::Journey(format!(
            "{:?} voiceover is not offered in {}",
            voiceover, data.target
        )));
    }
    require_online_changes(data)?;
    let locale = data.locale;
    let current = data.current_booking.voiceover.unwrap_or(Voiceover::NotRequired);

    let details = login_to_manage_booking(ui, data).await?;
    let check = details.change_voiceover(ui).await?.choose(ui, voiceover).await?;
    check
        .verify_change(ui, current.label(locale), voiceover.label(locale))
        .await?;
    let confirmed = check.confirm(ui).await?;
    confirmed.verify_voiceover(ui, voiceover).await?;

    let updated = data.apply(BookingChange::Voiceover(voiceover));
    confirmed.view_booking(ui).await?.verify_details(ui, &updated).await?;
    Ok(updated)
}

pub async fn change_bsl(ui: &mut Ui, data: &SessionData, bsl: bool) -> E2eResult<SessionData> {
    require_online_changes(data)?;
    let locale = data.locale;
    let current = data.current_booking.bsl;

    let details = login_to_manage_booking(ui, data).await?;
    let check = details.change_bsl(ui).await?.choose(ui, bsl).await?;
    check
        .verify_change(ui, yes_no(current, locale), yes_no(bsl, locale))
        .await?;
    let confirmed = check.confirm(ui).await?;
    confirmed.verify_bsl(ui, bsl).await?;

    let updated = data.apply(BookingChange::Bsl(bsl));
    confirmed.view_booking(ui).await?.verify_details(ui, &updated).await?;
    Ok(updated)
}

/// Move the test to another slot at the same centre
pub async fn reschedule(ui: &mut Ui, data: &SessionData, date_time: NaiveDateTime) -> E2eResult<SessionData> {
    require_online_changes(data)?;
    let locale = data.locale;
    let current = data.current_booking.date_time;

    let details = login_to_manage_booking(ui, data).await?;
    let check = details
        .change_time(ui)
        .await?
        .choose(ui, date_time.date())
        .await?
        .choose_for_change(ui, date_time)
        .await?;
    check
        .verify_change(
            ui,
            &format_date(current.date(), locale),
            &format_date(date_time.date(), locale),
        )
        .await?;
    let confirmed = check.confirm(ui).await?;
    confirmed.verify_date_time(ui, date_time).await?;

    let updated = data.apply(BookingChange::DateTime(date_time));
    confirmed.view_booking(ui).await?.verify_details(ui, &updated).await?;
    Ok(updated)
}

/// Start a change, abandon it at the check page and confirm the booking is
/// shown unchanged. Returns the untouched snapshot.
pub async fn change_then_cancel(ui: &mut Ui, data: &SessionData, change: BookingChange) -> E2eResult<SessionData> {
    require_online_changes(data)?;
    let snapshot = data.snapshot();
    let details = login_to_manage_booking(ui, &snapshot).await?;

    let check = match &change {
        BookingChange::Language(language) => details.change_language(ui).await?.choose(ui, *language).await?,
        BookingChange::Voiceover(voiceover) => details.change_voiceover(ui).await?.choose(ui, *voiceover).await?,
        BookingChange::Bsl(bsl) => details.change_bsl(ui).await?.choose(ui, *bsl).await?,
        BookingChange::DateTime(date_time) => {
            details
                .change_time(ui)
                .await?
                .choose(ui, date_time.date())
                .await?
                .choose_for_change(ui, *date_time)
                .await?
        }
        other => {
            return Err(E2eError::Journey(format!(
                "{:?} has no change check to abandon",
                other
            )))
        }
    };

    let details = check.cancel_change(ui).await?;
    details.verify_details(ui, &snapshot).await?;
    info!(change = ?change, "Change abandoned, booking unchanged");
    Ok(snapshot)
}

/// Cancel the booking, marking the fixture cancelled, and return to the
/// bookings list
pub async fn cancel_booking(ui: &mut Ui, data: &mut SessionData) -> E2eResult<ManageBookingHomePage> {
    let reference = require_reference(data)?.to_string();

    let details = login_to_manage_booking(ui, data).await?;
    let cancel = details.cancel_booking(ui).await?;
    cancel.verify_refund(ui, data.current_booking.price_pence).await?;
    let cancelled = cancel.confirm(ui).await?;
    cancelled.verify_reference(ui, &reference).await?;

    data.apply_in_place(BookingChange::Cancelled);
    info!(reference = %reference, "Booking cancelled");
    cancelled.back_to_home(ui).await
}

/// Open the cancellation page, then keep the booking after all
pub async fn keep_booking(ui: &mut Ui, data: &SessionData) -> E2eResult<ManageBookingHomePage> {
    let reference = require_reference(data)?;

    let details = login_to_manage_booking(ui, data).await?;
    let cancel = details.cancel_booking(ui).await?;
    cancel.verify_refund(ui, data.current_booking.price_pence).await?;
    let details = cancel.keep_booking(ui).await?;
    details.verify_details(ui, data).await?;

    let home = details.back_to_home(ui).await?;
    home.verify_booking_listed(ui, reference).await?;
    info!(reference = %reference, "Cancellation abandoned, booking kept");
    Ok(home)
}

/// A customer-service booking is shown without any online change links
pub async fn verify_changes_locked(ui: &mut Ui, data: &SessionData) -> E2eResult<BookingDetailsPage> {
    if data.current_booking.origin != Origin::CustomerServiceCentre {
        return Err(E2eError::Journey(
            "only customer-service bookings are locked to online changes".to_string(),
        ));
    }
    let details = login_to_manage_booking(ui, data).await?;
    details.verify_change_links_hidden(ui).await?;
    Ok(details)
}

/// Request a refund for a booking owed compensation
pub async fn request_refund(ui: &mut Ui, data: &mut SessionData) -> E2eResult<ManageBookingHomePage> {
    if !data.current_booking.owed_compensation {
        return Err(E2eError::Journey("booking is not owed compensation".to_string()));
    }
    let reference = require_reference(data)?.to_string();

    let details = login_to_manage_booking(ui, data).await?;
    details.verify_compensation_options(ui).await?;
    let refund = details.request_refund(ui).await?;
    refund.verify_refund(ui, data.current_booking.price_pence).await?;
    let requested = refund.confirm(ui).await?;
    requested.verify_reference(ui, &reference).await?;

    data.apply_in_place(BookingChange::RefundRequested);
    info!(reference = %reference, "Refund requested");
    requested.back_to_home(ui).await
}

/// Re-book a cancelled test free of charge at a new slot
pub async fn rebook_compensation_test(
    ui: &mut Ui,
    data: &SessionData,
    date_time: NaiveDateTime,
) -> E2eResult<SessionData> {
    if !data.current_booking.owed_compensation {
        return Err(E2eError::Journey("booking is not owed compensation".to_string()));
    }

    let details = login_to_manage_booking(ui, data).await?;
    details.verify_compensation_options(ui).await?;
    let check = details
        .rebook(ui)
        .await?
        .search(ui, &data.test_centre_search)
        .await?
        .choose(ui, &data.current_booking.centre)
        .await?
        .choose(ui, date_time.date())
        .await?
        .choose_for_change(ui, date_time)
        .await?;
    let confirmed = check.confirm(ui).await?;
    confirmed.verify_date_time(ui, date_time).await?;

    let mut updated = data.apply(BookingChange::DateTime(date_time));
    updated.current_booking.owed_compensation = false;
    updated.current_booking.compensation_booking = true;
    updated.current_booking.status = BookingStatus::Confirmed;
    info!(date_time = %date_time, "Compensation test re-booked");
    Ok(updated)
}

//! Screens of the manage-booking journey

use ftts_common::{format_pence, Language, SessionData, Target, Voiceover};

use super::{error_summary_title, format_date, format_time, option, yes_no, CONTINUE, ERROR_SUMMARY_TITLE};
use crate::error::E2eResult;
use crate::pages::booking::{ChooseDatePage, FindTestCentrePage};
use crate::ui::Ui;

page!(
    ManageBookingLoginPage, ManageBookingLogin, "manage-booking/login", "h1#manage-login-heading",
    "Manage your theory test booking", "Rheoli eich archeb prawf theori"
);

impl ManageBookingLoginPage {
    pub const LICENCE_NUMBER: &'static str = "#licenceNumber";
    pub const BOOKING_REFERENCE: &'static str = "#bookingReference";

    async fn submit(&self, ui: &mut Ui, licence_number: &str, reference: &str) -> E2eResult<()> {
        ui.type_text(Self::LICENCE_NUMBER, licence_number).await?;
        ui.type_text(Self::BOOKING_REFERENCE, reference).await?;
        ui.click(CONTINUE).await
    }

    pub async fn login(&self, ui: &mut Ui, licence_number: &str, reference: &str) -> E2eResult<ManageBookingHomePage> {
        self.submit(ui, licence_number, reference).await?;
        ui.arrive(self.locale).await
    }

    /// Credentials the app rejects; the page is shown again with an error
    pub async fn login_with_invalid(
        &self,
        ui: &mut Ui,
        licence_number: &str,
        reference: &str,
    ) -> E2eResult<ManageBookingLoginPage> {
        self.submit(ui, licence_number, reference).await?;
        ui.verify_text(ERROR_SUMMARY_TITLE, error_summary_title(self.locale)).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    ManageBookingHomePage, ManageBookingHome, "manage-booking/home", "h1#manage-home-heading",
    "Your bookings", "Eich archebion"
);

impl ManageBookingHomePage {
    pub const COMPENSATION_NOTICE: &'static str = "#compensation-notice";

    pub fn booking_link(reference: &str) -> String {
        format!("a.booking-link[data-reference='{}']", reference)
    }

    pub async fn verify_booking_listed(&self, ui: &mut Ui, reference: &str) -> E2eResult<()> {
        ui.verify_visible(&Self::booking_link(reference)).await
    }

    pub async fn verify_compensation_notice(&self, ui: &mut Ui) -> E2eResult<()> {
        ui.verify_contains(
            Self::COMPENSATION_NOTICE,
            self.locale.pick("Your test was cancelled", "Cafodd eich prawf ei ganslo"),
        )
        .await
    }

    pub async fn open_booking(&self, ui: &mut Ui, reference: &str) -> E2eResult<BookingDetailsPage> {
        ui.click(&Self::booking_link(reference)).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    BookingDetailsPage, BookingDetails, "manage-booking/booking", "h1#booking-details-heading",
    "Your booking", "Eich archeb"
);

impl BookingDetailsPage {
    pub const REFERENCE: &'static str = "#booking-reference-value";
    pub const TEST_TYPE: &'static str = "#test-type-value";
    pub const TEST_LANGUAGE: &'static str = "#test-language-value";
    pub const TEST_CENTRE: &'static str = "#test-centre-value";
    pub const TEST_DATE: &'static str = "#test-date-value";
    pub const TEST_TIME: &'static str = "#test-time-value";
    pub const VOICEOVER: &'static str = "#voiceover-value";
    pub const BSL: &'static str = "#bsl-value";
    pub const CHANGE_LANGUAGE: &'static str = "a#change-test-language";
    pub const CHANGE_VOICEOVER: &'static str = "a#change-voiceover";
    pub const CHANGE_BSL: &'static str = "a#change-bsl";
    pub const CHANGE_TIME: &'static str = "a#change-test-time";
    pub const CANCEL: &'static str = "a#cancel-booking";
    pub const REBOOK: &'static str = "a#rebook-test";
    pub const REQUEST_REFUND: &'static str = "a#request-refund";
    pub const BACK_TO_HOME: &'static str = "a#back-to-bookings";

    /// Every displayed field matches the fixture
    pub async fn verify_details(&self, ui: &mut Ui, data: &SessionData) -> E2eResult<()> {
        let booking = &data.current_booking;
        if let Some(reference) = &booking.reference {
            ui.verify_text(Self::REFERENCE, reference).await?;
        }
        ui.verify_text(Self::TEST_TYPE, booking.test_type.label()).await?;
        ui.verify_contains(Self::TEST_CENTRE, &booking.centre.name).await?;
        ui.verify_text(Self::TEST_DATE, &format_date(booking.date_time.date(), self.locale))
            .await?;
        ui.verify_text(Self::TEST_TIME, &format_time(booking.date_time.time())).await?;
        // Test language is only offered in GB
        if data.target == Target::Gb {
            ui.verify_text(Self::TEST_LANGUAGE, booking.language.label(self.locale)).await?;
        }
        ui.verify_text(
            Self::VOICEOVER,
            booking.voiceover.unwrap_or(Voiceover::NotRequired).label(self.locale),
        )
        .await?;
        ui.verify_text(Self::BSL, yes_no(booking.bsl, self.locale)).await?;
        Ok(())
    }

    /// Customer-service bookings are changed by phone, not online
    pub async fn verify_change_links_hidden(&self, ui: &mut Ui) -> E2eResult<()> {
        for link in [Self::CHANGE_LANGUAGE, Self::CHANGE_VOICEOVER, Self::CHANGE_BSL, Self::CHANGE_TIME] {
            ui.verify_hidden(link).await?;
        }
        Ok(())
    }

    /// Re-book and refund are offered and ordinary change links are not
    pub async fn verify_compensation_options(&self, ui: &mut Ui) -> E2eResult<()> {
        ui.verify_visible(Self::REBOOK).await?;
        ui.verify_visible(Self::REQUEST_REFUND).await?;
        ui.verify_hidden(Self::CHANGE_TIME).await
    }

    pub async fn change_language(&self, ui: &mut Ui) -> E2eResult<ChangeLanguagePage> {
        ui.click(Self::CHANGE_LANGUAGE).await?;
        ui.arrive(self.locale).await
    }

    pub async fn change_voiceover(&self, ui: &mut Ui) -> E2eResult<ChangeVoiceoverPage> {
        ui.click(Self::CHANGE_VOICEOVER).await?;
        ui.arrive(self.locale).await
    }

    pub async fn change_bsl(&self, ui: &mut Ui) -> E2eResult<ChangeBslPage> {
        ui.click(Self::CHANGE_BSL).await?;
        ui.arrive(self.locale).await
    }

    pub async fn change_time(&self, ui: &mut Ui) -> E2eResult<ChooseDatePage> {
        ui.click(Self::CHANGE_TIME).await?;
        ui.arrive(self.locale).await
    }

    pub async fn cancel_booking(&self, ui: &mut Ui) -> E2eResult<CancelBookingPage> {
        ui.click(Self::CANCEL).await?;
        ui.arrive(self.locale).await
    }

    /// Free re-booking of a test the authority cancelled
    pub async fn rebook(&self, ui: &mut Ui) -> E2eResult<FindTestCentrePage> {
        ui.click(Self::REBOOK).await?;
        ui.arrive(self.locale).await
    }

    pub async fn request_refund(&self, ui: &mut Ui) -> E2eResult<RequestRefundPage> {
        ui.click(Self::REQUEST_REFUND).await?;
        ui.arrive(self.locale).await
    }

    pub async fn back_to_home(&self, ui: &mut Ui) -> E2eResult<ManageBookingHomePage> {
        ui.click(Self::BACK_TO_HOME).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    ChangeLanguagePage, ChangeLanguage, "manage-booking/select-language", "h1#change-language-heading",
    "Change your test language", "Newid iaith eich prawf"
);

impl ChangeLanguagePage {
    pub async fn choose(&self, ui: &mut Ui, language: Language) -> E2eResult<CheckChangePage> {
        ui.check(&option("testLanguage", language.form_value())).await?;
        ui.click(CONTINUE).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    ChangeVoiceoverPage, ChangeVoiceover, "manage-booking/select-voiceover", "h1#change-voiceover-heading",
    "Change your voiceover language", "Newid iaith eich trosleisio"
);

impl ChangeVoiceoverPage {
    pub async fn choose(&self, ui: &mut Ui, voiceover: Voiceover) -> E2eResult<CheckChangePage> {
        ui.check(&option("voiceover", voiceover.form_value())).await?;
        ui.click(CONTINUE).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    ChangeBslPage, ChangeBsl, "manage-booking/select-bsl", "h1#change-bsl-heading",
    "Do you want British Sign Language (BSL) on screen?",
    "Ydych chi eisiau Iaith Arwyddion Prydain (BSL) ar y sgrin?"
);

impl ChangeBslPage {
    pub async fn choose(&self, ui: &mut Ui, bsl: bool) -> E2eResult<CheckChangePage> {
        ui.check(&option("bsl", if bsl { "yes" } else { "no" })).await?;
        ui.click(CONTINUE).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    CheckChangePage, CheckChange, "manage-booking/check-change", "h1#check-change-heading",
    "Check your change", "Gwiriwch eich newid"
);

impl CheckChangePage {
    pub const OLD_VALUE: &'static str = "#old-value";
    pub const NEW_VALUE: &'static str = "#new-value";
    pub const CONFIRM: &'static str = "#confirm-change";
    pub const CANCEL_CHANGE: &'static str = "a#cancel-change";

    pub async fn verify_change(&self, ui: &mut Ui, old: &str, new: &str) -> E2eResult<()> {
        ui.verify_contains(Self::OLD_VALUE, old).await?;
        ui.verify_contains(Self::NEW_VALUE, new).await
    }

    pub async fn confirm(&self, ui: &mut Ui) -> E2eResult<ChangeConfirmedPage> {
        ui.click(Self::CONFIRM).await?;
        ui.arrive_slow(self.locale).await
    }

    /// Abandon the change; the booking is left as it was
    pub async fn cancel_change(&self, ui: &mut Ui) -> E2eResult<BookingDetailsPage> {
        ui.click(Self::CANCEL_CHANGE).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    ChangeConfirmedPage, ChangeConfirmed, "manage-booking/change-confirmed", "h1#change-confirmed-heading",
    "Your booking has been changed", "Mae eich archeb wedi'i newid"
);

impl ChangeConfirmedPage {
    pub const TEST_LANGUAGE: &'static str = "#confirmed-test-language";
    pub const VOICEOVER: &'static str = "#confirmed-voiceover";
    pub const BSL: &'static str = "#confirmed-bsl";
    pub const TEST_DATE_TIME: &'static str = "#confirmed-test-date-time";
    pub const VIEW_BOOKING: &'static str = "a#view-booking";

    pub async fn verify_language(&self, ui: &mut Ui, language: Language) -> E2eResult<()> {
        ui.verify_text(Self::TEST_LANGUAGE, language.label(self.locale)).await
    }

    pub async fn verify_voiceover(&self, ui: &mut Ui, voiceover: Voiceover) -> E2eResult<()> {
        ui.verify_text(Self::VOICEOVER, voiceover.label(self.locale)).await
    }

    pub async fn verify_bsl(&self, ui: &mut Ui, bsl: bool) -> E2eResult<()> {
        ui.verify_text(Self::BSL, yes_no(bsl, self.locale)).await
    }

    pub async fn verify_date_time(&self, ui: &mut Ui, date_time: chrono::NaiveDateTime) -> E2eResult<()> {
        ui.verify_contains(Self::TEST_DATE_TIME, &format_date(date_time.date(), self.locale))
            .await?;
        ui.verify_contains(Self::TEST_DATE_TIME, &format_time(date_time.time())).await
    }

    pub async fn view_booking(&self, ui: &mut Ui) -> E2eResult<BookingDetailsPage> {
        ui.click(Self::VIEW_BOOKING).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    CancelBookingPage, CancelBooking, "manage-booking/cancel", "h1#cancel-booking-heading",
    "Cancel your booking", "Canslo eich archeb"
);

impl CancelBookingPage {
    pub const REFUND_AMOUNT: &'static str = "#refund-amount";
    pub const CONFIRM: &'static str = "#confirm-cancellation";
    pub const KEEP: &'static str = "a#keep-booking";

    pub async fn verify_refund(&self, ui: &mut Ui, price_pence: u32) -> E2eResult<()> {
        ui.verify_contains(Self::REFUND_AMOUNT, &format_pence(price_pence)).await
    }

    pub async fn confirm(&self, ui: &mut Ui) -> E2eResult<BookingCancelledPage> {
        ui.click(Self::CONFIRM).await?;
        ui.arrive_slow(self.locale).await
    }

    pub async fn keep_booking(&self, ui: &mut Ui) -> E2eResult<BookingDetailsPage> {
        ui.click(Self::KEEP).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    BookingCancelledPage, BookingCancelled, "manage-booking/booking-cancelled",
    "h1#booking-cancelled-heading",
    "Your booking has been cancelled", "Mae eich archeb wedi'i chanslo"
);

impl BookingCancelledPage {
    pub const REFERENCE: &'static str = "#cancelled-reference";
    pub const BACK_TO_HOME: &'static str = "a#back-to-bookings";

    pub async fn verify_reference(&self, ui: &mut Ui, reference: &str) -> E2eResult<()> {
        ui.verify_contains(Self::REFERENCE, reference).await
    }

    pub async fn back_to_home(&self, ui: &mut Ui) -> E2eResult<ManageBookingHomePage> {
        ui.click(Self::BACK_TO_HOME).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    RequestRefundPage, RequestRefund, "manage-booking/request-refund", "h1#request-refund-heading",
    "Request a refund", "Gofyn am ad-daliad"
);

impl RequestRefundPage {
    pub const REFUND_AMOUNT: &'static str = "#refund-amount";
    pub const CONFIRM: &'static str = "#confirm-refund";

    pub async fn verify_refund(&self, ui: &mut Ui, price_pence: u32) -> E2eResult<()> {
        ui.verify_contains(Self::REFUND_AMOUNT, &format_pence(price_pence)).await
    }

    pub async fn confirm(&self, ui: &mut Ui) -> E2eResult<RefundRequestedPage> {
        ui.click(Self::CONFIRM).await?;
        ui.arrive_slow(self.locale).await
    }
}

page!(
    RefundRequestedPage, RefundRequested, "manage-booking/refund-requested", "h1#refund-requested-heading",
    "Refund requested", "Cais am ad-daliad wedi'i wneud"
);

impl RefundRequestedPage {
    pub const REFERENCE: &'static str = "#refund-reference";
    pub const BACK_TO_HOME: &'static str = "a#back-to-bookings";

    pub async fn verify_reference(&self, ui: &mut Ui, reference: &str) -> E2eResult<()> {
        ui.verify_contains(Self::REFERENCE, reference).await
    }

    pub async fn back_to_home(&self, ui: &mut Ui) -> E2eResult<ManageBookingHomePage> {
        ui.click(Self::BACK_TO_HOME).await?;
        ui.arrive(self.locale).await
    }
}

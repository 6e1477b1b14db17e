//! Screens of the new-booking journey

use ftts_common::{Candidate, Language, SessionData, Target, TestCentre, TestType};

use super::{calendar_date, error_summary_title, format_date, format_time, option, slot_time};
use super::{CONTINUE, ERROR_SUMMARY, ERROR_SUMMARY_TITLE};
use crate::error::{E2eError, E2eResult};
use crate::pages::manage::{CheckChangePage, ManageBookingLoginPage};
use crate::pages::support::{SupportRequestSentPage, SupportTypePage};
use crate::ui::Ui;

page!(
    /// Service start page for candidates
    StartPage, Start, "", "h1#start-heading",
    "Book your theory test", "Archebwch eich prawf theori"
);

impl StartPage {
    pub const START_NOW: &'static str = "a#start-now";

    pub async fn start_now(&self, ui: &mut Ui) -> E2eResult<ChooseSupportPage> {
        ui.click(Self::START_NOW).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    /// Start page for driving and riding instructors
    InstructorStartPage, InstructorStart, "instructor", "h1#instructor-start-heading",
    "Book your instructor theory test", "Archebwch eich prawf theori hyfforddwr"
);

impl InstructorStartPage {
    pub async fn start_now(&self, ui: &mut Ui) -> E2eResult<ChooseSupportPage> {
        ui.click(StartPage::START_NOW).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    ChooseSupportPage, ChooseSupport, "choose-support", "h1#choose-support-heading",
    "Do you need any support to take your test?",
    "A oes angen unrhyw gymorth arnoch i sefyll eich prawf?"
);

impl ChooseSupportPage {
    pub const FIELD: &'static str = "support";
    pub const ERROR: &'static str = "#support-error";

    pub async fn choose_no_support(&self, ui: &mut Ui) -> E2eResult<CandidateDetailsPage> {
        ui.check(&option(Self::FIELD, "no")).await?;
        ui.click(CONTINUE).await?;
        ui.arrive(self.locale).await
    }

    pub async fn choose_support(&self, ui: &mut Ui) -> E2eResult<CandidateDetailsPage> {
        ui.check(&option(Self::FIELD, "yes")).await?;
        ui.click(CONTINUE).await?;
        ui.arrive(self.locale).await
    }

    pub async fn choose_no_support_as_instructor(&self, ui: &mut Ui) -> E2eResult<InstructorDetailsPage> {
        ui.check(&option(Self::FIELD, "no")).await?;
        ui.click(CONTINUE).await?;
        ui.arrive(self.locale).await
    }

    /// Continue without answering; the page is shown again with an error
    pub async fn submit_without_answer(&self, ui: &mut Ui) -> E2eResult<ChooseSupportPage> {
        ui.click(CONTINUE).await?;
        ui.verify_visible(ERROR_SUMMARY).await?;
        ui.verify_text(ERROR_SUMMARY_TITLE, error_summary_title(self.locale)).await?;
        ui.verify_text(
            Self::ERROR,
            self.locale.pick(
                "Error: Select whether you need support",
                "Gwall: Dewiswch a oes angen cymorth arnoch",
            ),
        )
        .await?;
        ui.arrive(self.locale).await
    }
}

/// Field locators shared by the two details forms
pub struct DetailsFields;

impl DetailsFields {
    pub const FIRST_NAMES: &'static str = "#firstnames";
    pub const SURNAME: &'static str = "#surname";
    pub const DOB_DAY: &'static str = "#dobDay";
    pub const DOB_MONTH: &'static str = "#dobMonth";
    pub const DOB_YEAR: &'static str = "#dobYear";
    pub const LICENCE_NUMBER: &'static str = "#licenceNumber";

    async fn fill(ui: &mut Ui, candidate: &Candidate) -> E2eResult<()> {
        use chrono::Datelike;

        ui.type_text(Self::FIRST_NAMES, &candidate.first_names).await?;
        ui.type_text(Self::SURNAME, &candidate.surname).await?;
        ui.type_text(Self::DOB_DAY, &candidate.date_of_birth.day().to_string()).await?;
        ui.type_text(Self::DOB_MONTH, &candidate.date_of_birth.month().to_string()).await?;
        ui.type_text(Self::DOB_YEAR, &candidate.date_of_birth.year().to_string()).await?;
        ui.type_text(Self::LICENCE_NUMBER, &candidate.licence_number).await?;
        Ok(())
    }
}

page!(
    CandidateDetailsPage, CandidateDetails, "candidate-details", "h1#candidate-details-heading",
    "Enter your details", "Rhowch eich manylion"
);

impl CandidateDetailsPage {
    pub async fn enter_details(&self, ui: &mut Ui, candidate: &Candidate) -> E2eResult<TestTypePage> {
        DetailsFields::fill(ui, candidate).await?;
        ui.click(CONTINUE).await?;
        ui.arrive(self.locale).await
    }

    /// Continue with every field empty; the page is shown again with errors
    pub async fn submit_empty(&self, ui: &mut Ui) -> E2eResult<CandidateDetailsPage> {
        ui.click(CONTINUE).await?;
        ui.verify_text(ERROR_SUMMARY_TITLE, error_summary_title(self.locale)).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    InstructorDetailsPage, InstructorDetails, "instructor/candidate-details",
    "h1#instructor-details-heading",
    "Enter your details", "Rhowch eich manylion"
);

impl InstructorDetailsPage {
    pub const PERSONAL_REFERENCE: &'static str = "#personalReferenceNumber";

    pub async fn enter_details(&self, ui: &mut Ui, candidate: &Candidate) -> E2eResult<TestTypePage> {
        let reference = candidate.personal_reference_number.as_deref().ok_or_else(|| {
            E2eError::Journey("instructor candidate has no personal reference number".to_string())
        })?;
        DetailsFields::fill(ui, candidate).await?;
        ui.type_text(Self::PERSONAL_REFERENCE, reference).await?;
        ui.click(CONTINUE).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    TestTypePage, TestType, "select-test-type", "h1#test-type-heading",
    "Which theory test do you want to book?",
    "Pa brawf theori ydych chi am ei archebu?"
);

impl TestTypePage {
    pub const FIELD: &'static str = "testType";

    async fn pick(&self, ui: &mut Ui, test_type: TestType) -> E2eResult<()> {
        ui.check(&option(Self::FIELD, test_type.form_value())).await?;
        ui.click(CONTINUE).await
    }

    /// GB candidates choose the test language next
    pub async fn choose(&self, ui: &mut Ui, test_type: TestType) -> E2eResult<TestLanguagePage> {
        self.pick(ui, test_type).await?;
        ui.arrive(self.locale).await
    }

    /// NI has no language choice and goes straight to the centre search
    pub async fn choose_skipping_language(&self, ui: &mut Ui, test_type: TestType) -> E2eResult<FindTestCentrePage> {
        self.pick(ui, test_type).await?;
        ui.arrive(self.locale).await
    }

    /// Candidates who asked for support choose their support next
    pub async fn choose_for_support(&self, ui: &mut Ui, test_type: TestType) -> E2eResult<SupportTypePage> {
        self.pick(ui, test_type).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    TestLanguagePage, TestLanguage, "select-language", "h1#test-language-heading",
    "Which language do you want to take your test in?",
    "Ym mha iaith ydych chi am sefyll eich prawf?"
);

impl TestLanguagePage {
    pub const FIELD: &'static str = "testLanguage";

    pub async fn choose(&self, ui: &mut Ui, language: Language) -> E2eResult<FindTestCentrePage> {
        ui.check(&option(Self::FIELD, language.form_value())).await?;
        ui.click(CONTINUE).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    FindTestCentrePage, FindTestCentre, "find-test-centre", "h1#find-test-centre-heading",
    "Find a test centre", "Dod o hyd i ganolfan brawf"
);

impl FindTestCentrePage {
    pub const SEARCH: &'static str = "#searchQuery";
    pub const ERROR: &'static str = "#searchQuery-error";

    pub async fn search(&self, ui: &mut Ui, term: &str) -> E2eResult<ChooseTestCentrePage> {
        ui.type_text(Self::SEARCH, term).await?;
        ui.click(CONTINUE).await?;
        ui.arrive(self.locale).await
    }

    /// Search with an empty term; the page is shown again with an error
    pub async fn search_blank(&self, ui: &mut Ui) -> E2eResult<FindTestCentrePage> {
        ui.type_text(Self::SEARCH, "").await?;
        ui.click(CONTINUE).await?;
        ui.verify_visible(Self::ERROR).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    ChooseTestCentrePage, ChooseTestCentre, "select-test-centre", "h1#choose-test-centre-heading",
    "Choose a test centre", "Dewiswch ganolfan brawf"
);

impl ChooseTestCentrePage {
    pub const RESULT_NAME: &'static str = ".centre-result .centre-name";
    pub const RESULT_ADDRESS: &'static str = ".centre-result .centre-address";
    pub const SELECT: &'static str = ".centre-result a.select-centre";

    /// Index of `centre` in the result list
    pub async fn position_of(&self, ui: &mut Ui, centre: &TestCentre) -> E2eResult<usize> {
        let results = ui.count(Self::RESULT_NAME).await?;
        for index in 0..results {
            if ui.get_text(Self::RESULT_NAME, index).await? == centre.name {
                return Ok(index);
            }
        }
        Err(E2eError::Content(format!(
            "test centre '{}' not among {} results",
            centre.name, results
        )))
    }

    pub async fn choose(&self, ui: &mut Ui, centre: &TestCentre) -> E2eResult<ChooseDatePage> {
        let index = self.position_of(ui, centre).await?;
        ui.verify_contains_with_timeout(Self::RESULT_ADDRESS, index, &centre.postcode, ui.default_timeout_ms())
            .await?;
        ui.click_nth(Self::SELECT, index).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    ChooseDatePage, ChooseDate, "select-date", "h1#choose-date-heading",
    "Choose a date", "Dewiswch ddyddiad"
);

impl ChooseDatePage {
    pub const NEXT_MONTH: &'static str = "#next-month";

    pub fn day(date: chrono::NaiveDate) -> String {
        format!("a.date-link[data-date='{}']", calendar_date(date))
    }

    /// Pick a day, paging forward through at most two months to find it
    pub async fn choose(&self, ui: &mut Ui, date: chrono::NaiveDate) -> E2eResult<ChooseTimePage> {
        let day = Self::day(date);
        for _ in 0..2 {
            if ui.count(&day).await? > 0 {
                break;
            }
            ui.click(Self::NEXT_MONTH).await?;
        }
        ui.click(&day).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    ChooseTimePage, ChooseTime, "select-time", "h1#choose-time-heading",
    "Choose a time", "Dewiswch amser"
);

impl ChooseTimePage {
    pub const SELECTED_DATE: &'static str = "#selected-date";

    pub fn slot(time: chrono::NaiveTime) -> String {
        format!("input[name='slotId'][data-time='{}']", slot_time(time))
    }

    async fn pick(&self, ui: &mut Ui, date_time: chrono::NaiveDateTime) -> E2eResult<()> {
        ui.verify_text(Self::SELECTED_DATE, &format_date(date_time.date(), self.locale))
            .await?;
        ui.check(&Self::slot(date_time.time())).await?;
        ui.click(CONTINUE).await
    }

    /// New bookings continue to contact details
    pub async fn choose(&self, ui: &mut Ui, date_time: chrono::NaiveDateTime) -> E2eResult<ContactDetailsPage> {
        self.pick(ui, date_time).await?;
        ui.arrive(self.locale).await
    }

    /// Rescheduling and compensation re-booking continue to the change check
    pub async fn choose_for_change(&self, ui: &mut Ui, date_time: chrono::NaiveDateTime) -> E2eResult<CheckChangePage> {
        self.pick(ui, date_time).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    ContactDetailsPage, ContactDetails, "email-contact", "h1#contact-details-heading",
    "Your contact details", "Eich manylion cyswllt"
);

impl ContactDetailsPage {
    pub const EMAIL: &'static str = "#email";
    pub const CONFIRM_EMAIL: &'static str = "#confirmEmail";
    pub const ERROR: &'static str = "#confirmEmail-error";

    pub async fn enter_email(&self, ui: &mut Ui, email: &str) -> E2eResult<CheckYourAnswersPage> {
        ui.type_text(Self::EMAIL, email).await?;
        ui.type_text(Self::CONFIRM_EMAIL, email).await?;
        ui.click(CONTINUE).await?;
        ui.arrive(self.locale).await
    }

    /// Confirmation does not match; the page is shown again with an error
    pub async fn enter_mismatched_email(&self, ui: &mut Ui, email: &str) -> E2eResult<ContactDetailsPage> {
        ui.type_text(Self::EMAIL, email).await?;
        ui.type_text(Self::CONFIRM_EMAIL, &format!("x{}", email)).await?;
        ui.click(CONTINUE).await?;
        ui.verify_text(
            Self::ERROR,
            self.locale.pick(
                "Error: The email addresses do not match",
                "Gwall: Nid yw'r cyfeiriadau e-bost yn cyfateb",
            ),
        )
        .await?;
        ui.arrive(self.locale).await
    }
}

page!(
    CheckYourAnswersPage, CheckYourAnswers, "check-your-answers", "h1#check-your-answers-heading",
    "Check your answers", "Gwiriwch eich atebion"
);

impl CheckYourAnswersPage {
    pub const CANDIDATE_NAME: &'static str = "#candidate-name-value";
    pub const LICENCE_NUMBER: &'static str = "#licence-number-value";
    pub const TEST_TYPE: &'static str = "#test-type-value";
    pub const TEST_LANGUAGE: &'static str = "#test-language-value";
    pub const TEST_CENTRE: &'static str = "#test-centre-value";
    pub const TEST_DATE: &'static str = "#test-date-value";
    pub const TEST_TIME: &'static str = "#test-time-value";
    pub const EMAIL: &'static str = "#email-value";
    pub const PRICE: &'static str = "#price-value";
    pub const SUPPORT_TYPES: &'static str = "#support-types-value";
    pub const CONTINUE_TO_PAYMENT: &'static str = "#continue-to-payment";
    pub const SEND_REQUEST: &'static str = "#send-support-request";

    /// Summary rows of a standard booking match the fixture
    pub async fn verify_booking(&self, ui: &mut Ui, data: &SessionData) -> E2eResult<()> {
        let booking = &data.current_booking;
        ui.verify_text(Self::CANDIDATE_NAME, &data.candidate.full_name()).await?;
        ui.verify_text(Self::LICENCE_NUMBER, &data.candidate.licence_number).await?;
        ui.verify_text(Self::TEST_TYPE, booking.test_type.label()).await?;
        if data.target == Target::Gb {
            ui.verify_text(Self::TEST_LANGUAGE, booking.language.label(self.locale)).await?;
        }
        ui.verify_contains(Self::TEST_CENTRE, &booking.centre.name).await?;
        ui.verify_text(Self::TEST_DATE, &format_date(booking.date_time.date(), self.locale))
            .await?;
        ui.verify_text(Self::TEST_TIME, &format_time(booking.date_time.time())).await?;
        ui.verify_text(Self::EMAIL, &data.candidate.email).await?;
        ui.verify_text(Self::PRICE, &booking.test_type.price_label()).await?;
        Ok(())
    }

    /// Summary rows of a support request match the fixture
    pub async fn verify_support_request(&self, ui: &mut Ui, data: &SessionData) -> E2eResult<()> {
        ui.verify_text(Self::CANDIDATE_NAME, &data.candidate.full_name()).await?;
        ui.verify_text(Self::TEST_TYPE, data.current_booking.test_type.label()).await?;
        for support in &data.current_booking.select_support_type {
            ui.verify_contains(Self::SUPPORT_TYPES, support.label(self.locale)).await?;
        }
        ui.verify_text(Self::EMAIL, &data.candidate.email).await?;
        Ok(())
    }

    pub async fn continue_to_payment(&self, ui: &mut Ui) -> E2eResult<PaymentPage> {
        ui.click(Self::CONTINUE_TO_PAYMENT).await?;
        ui.arrive_slow(self.locale).await
    }

    pub async fn send_support_request(&self, ui: &mut Ui) -> E2eResult<SupportRequestSentPage> {
        ui.click(Self::SEND_REQUEST).await?;
        ui.arrive_slow(self.locale).await
    }
}

page!(
    /// Card payment screen of the payment provider
    PaymentPage, Payment, "payment", "h1#payment-heading",
    "Enter card details", "Rhowch fanylion y cerdyn"
);

impl PaymentPage {
    pub const CARD_NUMBER: &'static str = "#card-no";
    pub const EXPIRY_MONTH: &'static str = "#expiry-month";
    pub const EXPIRY_YEAR: &'static str = "#expiry-year";
    pub const CARDHOLDER_NAME: &'static str = "#cardholder-name";
    pub const CVC: &'static str = "#cvc";
    pub const ADDRESS_LINE_1: &'static str = "#address-line-1";
    pub const ADDRESS_CITY: &'static str = "#address-city";
    pub const ADDRESS_POSTCODE: &'static str = "#address-postcode";
    pub const EMAIL: &'static str = "#email";
    pub const SUBMIT: &'static str = "#submit-card-details";
    pub const CONFIRM: &'static str = "#confirm";
    pub const AMOUNT: &'static str = "#amount";

    /// Sandbox Visa card accepted by the test gateway
    pub const TEST_CARD: &'static str = "4444333322221111";

    pub async fn pay_with_test_card(&self, ui: &mut Ui, data: &SessionData) -> E2eResult<BookingConfirmationPage> {
        let centre = &data.current_booking.centre;
        ui.verify_contains(Self::AMOUNT, &data.current_booking.test_type.price_label())
            .await?;
        ui.type_text(Self::CARD_NUMBER, Self::TEST_CARD).await?;
        ui.type_text(Self::EXPIRY_MONTH, "12").await?;
        ui.type_text(Self::EXPIRY_YEAR, "30").await?;
        ui.type_text(Self::CARDHOLDER_NAME, &data.candidate.full_name()).await?;
        ui.type_text(Self::CVC, "123").await?;
        ui.type_text(
            Self::ADDRESS_LINE_1,
            centre.address_lines.first().map(String::as_str).unwrap_or_default(),
        )
        .await?;
        ui.type_text(
            Self::ADDRESS_CITY,
            centre.address_lines.last().map(String::as_str).unwrap_or_default(),
        )
        .await?;
        ui.type_text(Self::ADDRESS_POSTCODE, &centre.postcode).await?;
        ui.type_text(Self::EMAIL, &data.candidate.email).await?;
        ui.click(Self::SUBMIT).await?;
        let long = ui.long_timeout_ms();
        ui.click_with_timeout(Self::CONFIRM, 0, long).await?;
        ui.arrive_slow(self.locale).await
    }
}

page!(
    BookingConfirmationPage, BookingConfirmation, "booking-confirmation",
    "h1#booking-confirmation-heading",
    "Booking confirmed", "Archeb wedi'i chadarnhau"
);

impl BookingConfirmationPage {
    pub const REFERENCE: &'static str = "#booking-reference";
    pub const TEST_TYPE: &'static str = "#confirmation-test-type";
    pub const TEST_LANGUAGE: &'static str = "#confirmation-test-language";
    pub const TEST_CENTRE: &'static str = "#confirmation-test-centre";
    pub const TEST_DATE_TIME: &'static str = "#confirmation-test-date-time";
    pub const MANAGE_BOOKING: &'static str = "a#manage-booking-link";

    pub async fn booking_reference(&self, ui: &mut Ui) -> E2eResult<String> {
        ui.get_text(Self::REFERENCE, 0).await
    }

    pub async fn verify_details(&self, ui: &mut Ui, data: &SessionData) -> E2eResult<()> {
        let booking = &data.current_booking;
        ui.verify_text(Self::TEST_TYPE, booking.test_type.label()).await?;
        ui.verify_contains(Self::TEST_CENTRE, &booking.centre.name).await?;
        ui.verify_contains(Self::TEST_DATE_TIME, &format_date(booking.date_time.date(), self.locale))
            .await?;
        ui.verify_contains(Self::TEST_DATE_TIME, &format_time(booking.date_time.time()))
            .await?;
        if data.target == Target::Gb {
            ui.verify_text(Self::TEST_LANGUAGE, booking.language.label(self.locale)).await?;
        }
        Ok(())
    }

    pub async fn manage_booking(&self, ui: &mut Ui) -> E2eResult<ManageBookingLoginPage> {
        ui.click(Self::MANAGE_BOOKING).await?;
        ui.arrive(self.locale).await
    }
}

//! Navigation graph
//!
//! Every page object action that moves the browser is an edge from the page
//! it is called on to the page it returns. Redisplaying a form after a
//! validation error is the only kind of edge that starts and ends on the
//! same page.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};

use ftts_common::Locale;

use crate::error::E2eResult;
use crate::pages::*;
use crate::ui::Ui;

/// Identity of one screen of the app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PageId {
    Start,
    InstructorStart,
    ChooseSupport,
    CandidateDetails,
    InstructorDetails,
    TestType,
    TestLanguage,
    FindTestCentre,
    ChooseTestCentre,
    ChooseDate,
    ChooseTime,
    ContactDetails,
    CheckYourAnswers,
    Payment,
    BookingConfirmation,
    SupportType,
    Voiceover,
    PreferredDay,
    PreferredLocation,
    TelephoneContact,
    SupportRequestSent,
    ManageBookingLogin,
    ManageBookingHome,
    BookingDetails,
    ChangeLanguage,
    ChangeVoiceover,
    ChangeBsl,
    CheckChange,
    ChangeConfirmed,
    CancelBooking,
    BookingCancelled,
    RequestRefund,
    RefundRequested,
}

impl PageId {
    pub const ALL: [PageId; 33] = [
        PageId::Start,
        PageId::InstructorStart,
        PageId::ChooseSupport,
        PageId::CandidateDetails,
        PageId::InstructorDetails,
        PageId::TestType,
        PageId::TestLanguage,
        PageId::FindTestCentre,
        PageId::ChooseTestCentre,
        PageId::ChooseDate,
        PageId::ChooseTime,
        PageId::ContactDetails,
        PageId::CheckYourAnswers,
        PageId::Payment,
        PageId::BookingConfirmation,
        PageId::SupportType,
        PageId::Voiceover,
        PageId::PreferredDay,
        PageId::PreferredLocation,
        PageId::TelephoneContact,
        PageId::SupportRequestSent,
        PageId::ManageBookingLogin,
        PageId::ManageBookingHome,
        PageId::BookingDetails,
        PageId::ChangeLanguage,
        PageId::ChangeVoiceover,
        PageId::ChangeBsl,
        PageId::CheckChange,
        PageId::ChangeConfirmed,
        PageId::CancelBooking,
        PageId::BookingCancelled,
        PageId::RequestRefund,
        PageId::RefundRequested,
    ];

    /// Pages a scenario can open directly by URL
    pub const ENTRY_POINTS: [PageId; 3] = [
        PageId::Start,
        PageId::InstructorStart,
        PageId::ManageBookingLogin,
    ];

    /// Locator identifying the screen
    pub fn heading_selector(&self) -> &'static str {
        match self {
            PageId::Start => StartPage::HEADING,
            PageId::InstructorStart => InstructorStartPage::HEADING,
            PageId::ChooseSupport => ChooseSupportPage::HEADING,
            PageId::CandidateDetails => CandidateDetailsPage::HEADING,
            PageId::InstructorDetails => InstructorDetailsPage::HEADING,
            PageId::TestType => TestTypePage::HEADING,
            PageId::TestLanguage => TestLanguagePage::HEADING,
            PageId::FindTestCentre => FindTestCentrePage::HEADING,
            PageId::ChooseTestCentre => ChooseTestCentrePage::HEADING,
            PageId::ChooseDate => ChooseDatePage::HEADING,
            PageId::ChooseTime => ChooseTimePage::HEADING,
            PageId::ContactDetails => ContactDetailsPage::HEADING,
            PageId::CheckYourAnswers => CheckYourAnswersPage::HEADING,
            PageId::Payment => PaymentPage::HEADING,
            PageId::BookingConfirmation => BookingConfirmationPage::HEADING,
            PageId::SupportType => SupportTypePage::HEADING,
            PageId::Voiceover => VoiceoverPage::HEADING,
            PageId::PreferredDay => PreferredDayPage::HEADING,
            PageId::PreferredLocation => PreferredLocationPage::HEADING,
            PageId::TelephoneContact => TelephoneContactPage::HEADING,
            PageId::SupportRequestSent => SupportRequestSentPage::HEADING,
            PageId::ManageBookingLogin => ManageBookingLoginPage::HEADING,
            PageId::ManageBookingHome => ManageBookingHomePage::HEADING,
            PageId::BookingDetails => BookingDetailsPage::HEADING,
            PageId::ChangeLanguage => ChangeLanguagePage::HEADING,
            PageId::ChangeVoiceover => ChangeVoiceoverPage::HEADING,
            PageId::ChangeBsl => ChangeBslPage::HEADING,
            PageId::CheckChange => CheckChangePage::HEADING,
            PageId::ChangeConfirmed => ChangeConfirmedPage::HEADING,
            PageId::CancelBooking => CancelBookingPage::HEADING,
            PageId::BookingCancelled => BookingCancelledPage::HEADING,
            PageId::RequestRefund => RequestRefundPage::HEADING,
            PageId::RefundRequested => RefundRequestedPage::HEADING,
        }
    }

    pub fn from_heading_selector(selector: &str) -> Option<PageId> {
        PageId::ALL
            .iter()
            .copied()
            .find(|page| page.heading_selector() == selector)
    }
}

/// A screen of the app with a known identity and heading
#[async_trait]
pub trait Page: Sized + Send + Sync {
    const ID: PageId;
    /// Path below the app root
    const PATH: &'static str;
    /// Locator of the heading that identifies the screen
    const HEADING: &'static str;

    fn at(locale: Locale) -> Self;

    fn locale(&self) -> Locale;

    fn heading(locale: Locale) -> &'static str;

    /// Heading shows the copy for the page's locale
    async fn verify_loaded(&self, ui: &mut Ui) -> E2eResult<()> {
        ui.verify_text(Self::HEADING, Self::heading(self.locale())).await
    }
}

/// One page object action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: PageId,
    pub action: &'static str,
    pub to: PageId,
    /// Same form shown again after a validation error
    pub redisplay: bool,
}

const fn edge(from: PageId, action: &'static str, to: PageId) -> Transition {
    Transition {
        from,
        action,
        to,
        redisplay: false,
    }
}

const fn redisplay(page: PageId, action: &'static str) -> Transition {
    Transition {
        from: page,
        action,
        to: page,
        redisplay: true,
    }
}

use PageId as P;

const TRANSITIONS: &[Transition] = &[
    edge(P::Start, "start_now", P::ChooseSupport),
    edge(P::InstructorStart, "start_now", P::ChooseSupport),
    edge(P::ChooseSupport, "choose_no_support", P::CandidateDetails),
    edge(P::ChooseSupport, "choose_support", P::CandidateDetails),
    edge(P::ChooseSupport, "choose_no_support_as_instructor", P::InstructorDetails),
    redisplay(P::ChooseSupport, "submit_without_answer"),
    edge(P::CandidateDetails, "enter_details", P::TestType),
    redisplay(P::CandidateDetails, "submit_empty"),
    edge(P::InstructorDetails, "enter_details", P::TestType),
    edge(P::TestType, "choose", P::TestLanguage),
    edge(P::TestType, "choose_skipping_language", P::FindTestCentre),
    edge(P::TestType, "choose_for_support", P::SupportType),
    edge(P::TestLanguage, "choose", P::FindTestCentre),
    edge(P::FindTestCentre, "search", P::ChooseTestCentre),
    redisplay(P::FindTestCentre, "search_blank"),
    edge(P::ChooseTestCentre, "choose", P::ChooseDate),
    edge(P::ChooseDate, "choose", P::ChooseTime),
    edge(P::ChooseTime, "choose", P::ContactDetails),
    edge(P::ChooseTime, "choose_for_change", P::CheckChange),
    edge(P::ContactDetails, "enter_email", P::CheckYourAnswers),
    redisplay(P::ContactDetails, "enter_mismatched_email"),
    edge(P::CheckYourAnswers, "continue_to_payment", P::Payment),
    edge(P::CheckYourAnswers, "send_support_request", P::SupportRequestSent),
    edge(P::Payment, "pay_with_test_card", P::BookingConfirmation),
    edge(P::BookingConfirmation, "manage_booking", P::ManageBookingLogin),
    edge(P::SupportType, "choose", P::PreferredDay),
    edge(P::SupportType, "choose_with_voiceover", P::Voiceover),
    edge(P::Voiceover, "choose", P::PreferredDay),
    edge(P::PreferredDay, "choose", P::PreferredLocation),
    edge(P::PreferredLocation, "choose", P::TelephoneContact),
    edge(P::TelephoneContact, "choose", P::ContactDetails),
    edge(P::ManageBookingLogin, "login", P::ManageBookingHome),
    redisplay(P::ManageBookingLogin, "login_with_invalid"),
    edge(P::ManageBookingHome, "open_booking", P::BookingDetails),
    edge(P::BookingDetails, "change_language", P::ChangeLanguage),
    edge(P::BookingDetails, "change_voiceover", P::ChangeVoiceover),
    edge(P::BookingDetails, "change_bsl", P::ChangeBsl),
    edge(P::BookingDetails, "change_time", P::ChooseDate),
    edge(P::BookingDetails, "cancel_booking", P::CancelBooking),
    edge(P::BookingDetails, "rebook", P::FindTestCentre),
    edge(P::BookingDetails, "request_refund", P::RequestRefund),
    edge(P::BookingDetails, "back_to_home", P::ManageBookingHome),
    edge(P::ChangeLanguage, "choose", P::CheckChange),
    edge(P::ChangeVoiceover, "choose", P::CheckChange),
    edge(P::ChangeBsl, "choose", P::CheckChange),
    edge(P::CheckChange, "confirm", P::ChangeConfirmed),
    edge(P::CheckChange, "cancel_change", P::BookingDetails),
    edge(P::ChangeConfirmed, "view_booking", P::BookingDetails),
    edge(P::CancelBooking, "confirm", P::BookingCancelled),
    edge(P::CancelBooking, "keep_booking", P::BookingDetails),
    edge(P::BookingCancelled, "back_to_home", P::ManageBookingHome),
    edge(P::RequestRefund, "confirm", P::RefundRequested),
    edge(P::RefundRequested, "back_to_home", P::ManageBookingHome),
];

pub fn transitions() -> &'static [Transition] {
    TRANSITIONS
}

/// Pages reachable in one action from `page`
pub fn successors(page: PageId) -> Vec<PageId> {
    let mut next: Vec<PageId> = Vec::new();
    for transition in TRANSITIONS.iter().filter(|t| t.from == page) {
        if !next.contains(&transition.to) {
            next.push(transition.to);
        }
    }
    next
}

pub fn is_edge(from: PageId, to: PageId) -> bool {
    TRANSITIONS.iter().any(|t| t.from == from && t.to == to)
}

pub fn is_reachable(from: PageId, to: PageId) -> bool {
    let mut seen = HashSet::from([from]);
    let mut queue = VecDeque::from([from]);
    while let Some(page) = queue.pop_front() {
        if page == to {
            return true;
        }
        for next in successors(page) {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}

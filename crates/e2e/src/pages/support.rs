//! Screens of the non-standard accommodation (support request) journey

use ftts_common::{Booking, PreferredDay, PreferredLocation, SupportType, Voiceover};

use super::{option, CONTINUE};
use crate::error::{E2eError, E2eResult};
use crate::pages::booking::ContactDetailsPage;
use crate::ui::Ui;

page!(
    SupportTypePage, SupportType, "select-support-type", "h1#support-type-heading",
    "What support do you need?", "Pa gymorth sydd ei angen arnoch?"
);

impl SupportTypePage {
    pub const FIELD: &'static str = "selectSupportType";
    pub const OTHER_DETAILS: &'static str = "#other-support-details";

    async fn pick(&self, ui: &mut Ui, booking: &Booking) -> E2eResult<()> {
        if booking.select_support_type.is_empty() {
            return Err(E2eError::Journey("no support types selected".to_string()));
        }
        for support in &booking.select_support_type {
            ui.check(&option(Self::FIELD, support.form_value())).await?;
        }
        if booking.select_support_type.contains(&SupportType::Other) {
            let details = booking.other_support.as_deref().unwrap_or_default();
            ui.type_text(Self::OTHER_DETAILS, details).await?;
        }
        ui.click(CONTINUE).await
    }

    /// Support without a voiceover goes straight to the preferred day
    pub async fn choose(&self, ui: &mut Ui, booking: &Booking) -> E2eResult<PreferredDayPage> {
        self.pick(ui, booking).await?;
        ui.arrive(self.locale).await
    }

    pub async fn choose_with_voiceover(&self, ui: &mut Ui, booking: &Booking) -> E2eResult<VoiceoverPage> {
        self.pick(ui, booking).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    VoiceoverPage, Voiceover, "select-voiceover", "h1#voiceover-heading",
    "Which voiceover language do you need?", "Pa iaith trosleisio sydd ei hangen arnoch?"
);

impl VoiceoverPage {
    pub const FIELD: &'static str = "voiceover";

    pub async fn choose(&self, ui: &mut Ui, voiceover: Voiceover) -> E2eResult<PreferredDayPage> {
        ui.check(&option(Self::FIELD, voiceover.form_value())).await?;
        ui.click(CONTINUE).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    PreferredDayPage, PreferredDay, "preferred-day", "h1#preferred-day-heading",
    "Which days are you available?", "Pa ddiwrnodau ydych chi ar gael?"
);

impl PreferredDayPage {
    pub const FIELD: &'static str = "preferredDayOption";
    pub const DETAILS: &'static str = "#preferredDay";

    pub async fn choose(&self, ui: &mut Ui, day: &PreferredDay) -> E2eResult<PreferredLocationPage> {
        ui.check(&option(Self::FIELD, day.form_value())).await?;
        if let PreferredDay::ParticularDays(days) = day {
            ui.type_text(Self::DETAILS, days).await?;
        }
        ui.click(CONTINUE).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    PreferredLocationPage, PreferredLocation, "preferred-location", "h1#preferred-location-heading",
    "Where would you like to take your test?", "Ble hoffech chi sefyll eich prawf?"
);

impl PreferredLocationPage {
    pub const FIELD: &'static str = "preferredLocationOption";
    pub const DETAILS: &'static str = "#preferredLocation";

    pub async fn choose(&self, ui: &mut Ui, location: &PreferredLocation) -> E2eResult<TelephoneContactPage> {
        ui.check(&option(Self::FIELD, location.form_value())).await?;
        if let PreferredLocation::ParticularLocation(place) = location {
            ui.type_text(Self::DETAILS, place).await?;
        }
        ui.click(CONTINUE).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    TelephoneContactPage, TelephoneContact, "telephone-contact", "h1#telephone-contact-heading",
    "Can we call you about your support?", "A allwn ni eich ffonio am eich cymorth?"
);

impl TelephoneContactPage {
    pub const FIELD: &'static str = "canContactByPhone";
    pub const NUMBER: &'static str = "#telephoneNumber";

    /// `None` declines phone contact
    pub async fn choose(&self, ui: &mut Ui, telephone: Option<&str>) -> E2eResult<ContactDetailsPage> {
        match telephone {
            Some(number) => {
                ui.check(&option(Self::FIELD, "yes")).await?;
                ui.type_text(Self::NUMBER, number).await?;
            }
            None => ui.check(&option(Self::FIELD, "no")).await?,
        }
        ui.click(CONTINUE).await?;
        ui.arrive(self.locale).await
    }
}

page!(
    SupportRequestSentPage, SupportRequestSent, "request-submitted", "h1#request-submitted-heading",
    "Your support request has been sent", "Mae eich cais am gymorth wedi'i anfon"
);

impl SupportRequestSentPage {
    pub const CONFIRMATION_EMAIL: &'static str = "#confirmation-email";
    pub const NEXT_STEPS: &'static str = "#next-steps";

    pub async fn verify_sent_to(&self, ui: &mut Ui, email: &str) -> E2eResult<()> {
        ui.verify_contains(Self::CONFIRMATION_EMAIL, email).await?;
        ui.verify_contains(
            Self::NEXT_STEPS,
            self.locale.pick(
                "We will contact you within 5 working days",
                "Byddwn yn cysylltu â chi o fewn 5 diwrnod gwaith",
            ),
        )
        .await
    }
}

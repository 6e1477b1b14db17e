//! Session-data fixtures
//!
//! A [`SessionData`] parameterises one scenario: who the candidate is, what
//! they are booking and which journey they take through the app. Fixtures are
//! built fresh per scenario by [`SessionDataBuilder`], then either updated in
//! place as the scenario progresses or transformed into new values with
//! [`SessionData::apply`].

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::generate;
use crate::types::*;

/// Days between "today" and the default test date
pub const DEFAULT_DATE_OFFSET_DAYS: i64 = 14;

/// Hour of the default test slot
pub const DEFAULT_SLOT_HOUR: u32 = 9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub first_names: String,
    pub surname: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub licence_number: String,
    pub email: String,
    pub telephone: String,
    /// Only set for instructor candidates
    pub personal_reference_number: Option<String>,
}

impl Candidate {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_names, self.surname)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub reference: Option<String>,
    pub product_reference: Option<String>,
    pub date_time: NaiveDateTime,
    pub centre: TestCentre,
    pub test_type: TestType,
    pub language: Language,
    pub voiceover: Option<Voiceover>,
    pub bsl: bool,
    pub origin: Origin,
    pub eligibility_bypass: bool,
    /// This booking is a free re-booking owed after a cancelled test
    pub compensation_booking: bool,
    /// The previous booking was cancelled by the authority and is owed a re-book or refund
    pub owed_compensation: bool,
    pub price_pence: u32,
    pub status: BookingStatus,
    pub product_status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub select_support_type: Vec<SupportType>,
    pub preferred_day: Option<PreferredDay>,
    pub preferred_location: Option<PreferredLocation>,
    pub other_support: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Journey {
    pub support: bool,
    pub standard_accommodation: bool,
    pub instructor: bool,
    pub compensation: bool,
}

/// Root fixture for one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub candidate: Candidate,
    pub current_booking: Booking,
    pub journey: Journey,
    pub test_centre_search: String,
    pub target: Target,
    pub locale: Locale,
}

/// An edit a candidate makes to an existing booking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingChange {
    Language(Language),
    Voiceover(Voiceover),
    Bsl(bool),
    DateTime(NaiveDateTime),
    Centre(TestCentre),
    Cancelled,
    RefundRequested,
}

impl SessionData {
    pub fn builder() -> SessionDataBuilder {
        SessionDataBuilder::default()
    }

    /// Default standard-accommodation fixture for a jurisdiction
    pub fn new(target: Target) -> Self {
        Self::builder().target(target).assemble()
    }

    /// Deep, independent copy of the fixture
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// New fixture with `change` applied; `self` is left untouched
    pub fn apply(&self, change: BookingChange) -> Self {
        let mut next = self.snapshot();
        next.apply_in_place(change);
        next
    }

    pub fn apply_in_place(&mut self, change: BookingChange) {
        let booking = &mut self.current_booking;
        match change {
            BookingChange::Language(language) => booking.language = language,
            BookingChange::Voiceover(voiceover) => booking.voiceover = Some(voiceover),
            BookingChange::Bsl(bsl) => booking.bsl = bsl,
            BookingChange::DateTime(date_time) => booking.date_time = date_time,
            BookingChange::Centre(centre) => {
                self.test_centre_search = centre.name.clone();
                booking.centre = centre;
            }
            BookingChange::Cancelled => {
                booking.status = BookingStatus::Cancelled;
                booking.product_status = BookingStatus::Cancelled;
            }
            BookingChange::RefundRequested => {
                booking.payment_status = PaymentStatus::RefundInProgress;
                booking.owed_compensation = false;
            }
        }
    }

    /// Record the reference the app issued for the current booking
    pub fn assign_reference(&mut self, reference: impl Into<String>) {
        self.current_booking.reference = Some(reference.into());
    }

    pub fn is_non_standard(&self) -> bool {
        !self.journey.standard_accommodation
    }

    /// `?target=..&lang=..` suffix for app URLs
    pub fn query_string(&self) -> String {
        format!("?target={}&lang={}", self.target.query_value(), self.locale.lang())
    }

    /// Check the fixture is internally consistent
    pub fn validate(&self) -> Result<()> {
        let booking = &self.current_booking;

        if !self.journey.standard_accommodation {
            if booking.select_support_type.is_empty() {
                return Err(Error::InvalidFixture(
                    "non-standard accommodation needs at least one support type".to_string(),
                ));
            }
            if booking.voiceover.is_none() {
                return Err(Error::InvalidFixture(
                    "non-standard accommodation needs a voiceover choice".to_string(),
                ));
            }
            if booking.preferred_day.is_none() || booking.preferred_location.is_none() {
                return Err(Error::InvalidFixture(
                    "non-standard accommodation needs preferred day and location".to_string(),
                ));
            }
            if !self.journey.support {
                return Err(Error::InvalidFixture(
                    "non-standard accommodation implies the support journey".to_string(),
                ));
            }
        }

        if !booking.test_type.is_bookable_in(self.target) {
            return Err(Error::InvalidFixture(format!(
                "{} cannot be booked in {}",
                booking.test_type, self.target
            )));
        }

        if booking.test_type.is_instructor() != self.journey.instructor {
            return Err(Error::InvalidFixture(format!(
                "{} does not match the {} journey",
                booking.test_type,
                if self.journey.instructor { "instructor" } else { "candidate" }
            )));
        }

        if self.target == Target::Ni
            && (self.locale == Locale::Cy || booking.language == Language::Welsh)
        {
            return Err(Error::InvalidFixture(
                "Welsh is only offered in GB".to_string(),
            ));
        }

        if self.journey.instructor && self.candidate.personal_reference_number.is_none() {
            return Err(Error::InvalidFixture(
                "instructor candidates need a personal reference number".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder producing internally consistent fixtures with deterministic defaults
#[derive(Debug, Clone)]
pub struct SessionDataBuilder {
    target: Target,
    locale: Option<Locale>,
    instructor: bool,
    compensation: bool,
    non_standard: bool,
    today: Option<NaiveDate>,
    date_offset_days: i64,
    test_type: Option<TestType>,
    centre: Option<TestCentre>,
    language: Option<Language>,
    origin: Origin,
    eligibility_bypass: bool,
    seed: Option<u64>,
}

impl Default for SessionDataBuilder {
    fn default() -> Self {
        Self {
            target: Target::Gb,
            locale: None,
            instructor: false,
            compensation: false,
            non_standard: false,
            today: None,
            date_offset_days: DEFAULT_DATE_OFFSET_DAYS,
            test_type: None,
            centre: None,
            language: None,
            origin: Origin::CitizenPortal,
            eligibility_bypass: false,
            seed: None,
        }
    }
}

impl SessionDataBuilder {
    pub fn target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    pub fn instructor(mut self, instructor: bool) -> Self {
        self.instructor = instructor;
        self
    }

    pub fn compensation(mut self, compensation: bool) -> Self {
        self.compensation = compensation;
        self
    }

    /// Take the non-standard accommodation (support request) journey
    pub fn non_standard(mut self, non_standard: bool) -> Self {
        self.non_standard = non_standard;
        self
    }

    /// Pin "today" so test dates are reproducible
    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn date_offset_days(mut self, days: i64) -> Self {
        self.date_offset_days = days;
        self
    }

    pub fn test_type(mut self, test_type: TestType) -> Self {
        self.test_type = Some(test_type);
        self
    }

    pub fn centre(mut self, centre: TestCentre) -> Self {
        self.centre = Some(centre);
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Booking skips the candidate eligibility checks, as CSC agents may
    pub fn eligibility_bypass(mut self, bypass: bool) -> Self {
        self.eligibility_bypass = bypass;
        self
    }

    /// Seed the candidate generator
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build and validate the fixture
    pub fn build(self) -> Result<SessionData> {
        let data = self.assemble();
        data.validate()?;
        Ok(data)
    }

    fn default_test_type(&self) -> TestType {
        match (self.instructor, self.target) {
            (true, Target::Gb) => TestType::AdiPart1,
            (true, Target::Ni) => TestType::AdiPart1Dva,
            (false, _) => TestType::Car,
        }
    }

    fn test_date(&self) -> NaiveDateTime {
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let mut date = today + Duration::days(self.date_offset_days);
        if date.weekday() == Weekday::Sun {
            date += Duration::days(1);
        }
        let slot = NaiveTime::from_hms_opt(DEFAULT_SLOT_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
        date.and_time(slot)
    }

    pub(crate) fn assemble(self) -> SessionData {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let locale = self.locale.unwrap_or_else(|| Locale::default_for(self.target));
        let test_type = self.test_type.unwrap_or_else(|| self.default_test_type());
        let centre = self
            .centre
            .clone()
            .unwrap_or_else(|| TestCentre::default_for(self.target, locale));
        let language = self.language.unwrap_or_default();

        let identity = generate::random_identity(&mut rng);
        let licence_number = match self.target {
            Target::Gb => generate::gb_licence_number(&mut rng, &identity),
            Target::Ni => generate::ni_licence_number(&mut rng),
        };
        let candidate = Candidate {
            title: match identity.gender {
                Gender::Female => "Ms".to_string(),
                Gender::Male => "Mr".to_string(),
            },
            email: generate::email_for(&mut rng, &identity),
            telephone: generate::telephone(&mut rng),
            personal_reference_number: self
                .instructor
                .then(|| generate::personal_reference_number(&mut rng)),
            licence_number,
            first_names: identity.first_names,
            surname: identity.surname,
            gender: identity.gender,
            date_of_birth: identity.date_of_birth,
        };

        let (select_support_type, voiceover, preferred_day, preferred_location, other_support) =
            if self.non_standard {
                (
                    vec![SupportType::ExtraTime, SupportType::ReadingSupport],
                    Some(Voiceover::NotRequired),
                    Some(PreferredDay::ParticularDays(
                        "Weekday mornings, not Fridays".to_string(),
                    )),
                    Some(PreferredLocation::ParticularLocation(centre.name.clone())),
                    Some("I need a quiet room".to_string()),
                )
            } else {
                (Vec::new(), None, None, None, None)
            };

        let current_booking = Booking {
            reference: None,
            product_reference: None,
            date_time: self.test_date(),
            test_type,
            language,
            voiceover,
            bsl: false,
            origin: self.origin,
            eligibility_bypass: self.eligibility_bypass,
            compensation_booking: false,
            owed_compensation: self.compensation,
            price_pence: test_type.price_pence(),
            status: BookingStatus::Reserved,
            product_status: BookingStatus::Reserved,
            payment_status: PaymentStatus::Draft,
            select_support_type,
            preferred_day,
            preferred_location,
            other_support,
            centre: centre.clone(),
        };

        SessionData {
            candidate,
            current_booking,
            journey: Journey {
                support: self.non_standard,
                standard_accommodation: !self.non_standard,
                instructor: self.instructor,
                compensation: self.compensation,
            },
            test_centre_search: centre.name,
            target: self.target,
            locale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test_case(Target::Gb, false, false ; "gb candidate")]
    #[test_case(Target::Ni, false, false ; "ni candidate")]
    #[test_case(Target::Gb, true, false ; "gb instructor")]
    #[test_case(Target::Ni, true, false ; "ni instructor")]
    #[test_case(Target::Gb, false, true ; "gb non standard")]
    #[test_case(Target::Ni, true, true ; "ni instructor non standard")]
    fn test_builder_produces_valid_fixtures(target: Target, instructor: bool, nsa: bool) {
        let data = SessionData::builder()
            .target(target)
            .instructor(instructor)
            .non_standard(nsa)
            .build()
            .unwrap();
        assert_eq!(data.target, target);
        assert_eq!(data.journey.standard_accommodation, !nsa);
    }

    #[test]
    fn test_non_standard_fixtures_populate_support_fields() {
        for target in [Target::Gb, Target::Ni] {
            let data = SessionData::builder()
                .target(target)
                .non_standard(true)
                .build()
                .unwrap();
            let booking = &data.current_booking;
            assert!(!booking.select_support_type.is_empty());
            assert!(booking.voiceover.is_some());
            assert!(booking.preferred_day.is_some());
            assert!(booking.preferred_location.is_some());
        }
    }

    #[test]
    fn test_validate_rejects_nsa_without_support_types() {
        let mut data = SessionData::builder().non_standard(true).build().unwrap();
        data.current_booking.select_support_type.clear();
        assert!(matches!(data.validate(), Err(Error::InvalidFixture(_))));
    }

    #[test]
    fn test_validate_rejects_welsh_in_ni() {
        let result = SessionData::builder()
            .target(Target::Ni)
            .language(Language::Welsh)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_mismatched_instructor_test() {
        let result = SessionData::builder().test_type(TestType::AdiPart1).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_default_test_types() {
        assert_eq!(SessionData::new(Target::Gb).current_booking.test_type, TestType::Car);
        let ni_adi = SessionData::builder()
            .target(Target::Ni)
            .instructor(true)
            .build()
            .unwrap();
        assert_eq!(ni_adi.current_booking.test_type, TestType::AdiPart1Dva);
        assert!(ni_adi.candidate.personal_reference_number.is_some());
    }

    #[test]
    fn test_default_date_is_offset_and_skips_sunday() {
        let data = SessionData::builder().today(monday()).build().unwrap();
        assert_eq!(
            data.current_booking.date_time,
            NaiveDate::from_ymd_opt(2026, 11, 2).unwrap().and_hms_opt(9, 0, 0).unwrap()
        );

        // Monday + 6 lands on a Sunday
        let data = SessionData::builder()
            .today(monday())
            .date_offset_days(6)
            .build()
            .unwrap();
        assert_eq!(data.current_booking.date_time.date().weekday(), Weekday::Mon);
    }

    #[test]
    fn test_seeded_builders_are_reproducible() {
        let a = SessionData::builder().seed(42).today(monday()).build().unwrap();
        let b = SessionData::builder().seed(42).today(monday()).build().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_snapshot_is_independent_of_later_mutation() {
        let mut data = SessionData::builder().non_standard(true).build().unwrap();
        let snapshot = data.snapshot();

        data.apply_in_place(BookingChange::Language(Language::Welsh));
        data.apply_in_place(BookingChange::Voiceover(Voiceover::Arabic));
        data.current_booking.centre.address_lines.push("Annex".to_string());
        data.current_booking.select_support_type.push(SupportType::Other);
        data.candidate.surname.push_str("-Smythe");
        data.assign_reference("B-000-000-001");

        assert_eq!(snapshot.current_booking.language, Language::English);
        assert_eq!(snapshot.current_booking.voiceover, Some(Voiceover::NotRequired));
        assert_eq!(snapshot.current_booking.centre.address_lines.len(), 3);
        assert_eq!(snapshot.current_booking.select_support_type.len(), 2);
        assert!(!snapshot.candidate.surname.ends_with("-Smythe"));
        assert!(snapshot.current_booking.reference.is_none());
    }

    #[test]
    fn test_apply_leaves_original_untouched() {
        let data = SessionData::new(Target::Gb);
        let changed = data.apply(BookingChange::Bsl(true));
        assert!(!data.current_booking.bsl);
        assert!(changed.current_booking.bsl);
    }

    #[test]
    fn test_centre_change_updates_search_term() {
        let data = SessionData::new(Target::Gb);
        let cardiff = TestCentre::default_for(Target::Gb, Locale::Cy);
        let changed = data.apply(BookingChange::Centre(cardiff));
        assert_eq!(changed.test_centre_search, "Cardiff");
        assert_eq!(changed.current_booking.centre.postcode, "CF24 0EB");
    }

    #[test]
    fn test_query_string() {
        let data = SessionData::builder().locale(Locale::Cy).build().unwrap();
        assert_eq!(data.query_string(), "?target=gb&lang=cy");
        assert_eq!(SessionData::new(Target::Ni).query_string(), "?target=ni&lang=en");
    }

    #[test]
    fn test_customer_service_booking() {
        let data = SessionData::builder()
            .origin(Origin::CustomerServiceCentre)
            .eligibility_bypass(true)
            .build()
            .unwrap();
        assert_eq!(data.current_booking.origin, Origin::CustomerServiceCentre);
        assert!(data.current_booking.eligibility_bypass);
        assert!(!SessionData::new(Target::Gb).current_booking.eligibility_bypass);
    }

    #[test]
    fn test_compensation_flag_marks_booking_owed() {
        let data = SessionData::builder().compensation(true).build().unwrap();
        assert!(data.journey.compensation);
        assert!(data.current_booking.owed_compensation);
    }
}

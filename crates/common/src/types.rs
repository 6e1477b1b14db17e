//! Lookup types shared by fixtures, page objects and CRM seeding
//!
//! Every enum here carries three faces: the value the booking app's forms
//! submit, the label a candidate sees on screen, and the option-set code the
//! CRM stores.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Jurisdiction a booking is made in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    Gb,
    Ni,
}

impl Target {
    /// Value of the `target` query parameter
    pub fn query_value(&self) -> &'static str {
        match self {
            Target::Gb => "gb",
            Target::Ni => "ni",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Gb => write!(f, "GB"),
            Target::Ni => write!(f, "NI"),
        }
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gb" => Ok(Target::Gb),
            "ni" => Ok(Target::Ni),
            other => Err(Error::UnknownValue {
                kind: "target",
                value: other.to_string(),
            }),
        }
    }
}

/// Locale the app renders in. `Cy` is the Welsh-language GB site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Gb,
    Cy,
    Ni,
}

impl Locale {
    /// Value of the `lang` query parameter
    pub fn lang(&self) -> &'static str {
        match self {
            Locale::Cy => "cy",
            Locale::Gb | Locale::Ni => "en",
        }
    }

    pub fn is_welsh(&self) -> bool {
        matches!(self, Locale::Cy)
    }

    /// Pick the copy matching this locale
    pub fn pick<'a>(&self, english: &'a str, welsh: &'a str) -> &'a str {
        if self.is_welsh() {
            welsh
        } else {
            english
        }
    }

    pub fn default_for(target: Target) -> Self {
        match target {
            Target::Gb => Locale::Gb,
            Target::Ni => Locale::Ni,
        }
    }
}

/// Theory test types across both jurisdictions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestType {
    Car,
    Motorcycle,
    LgvMultipleChoice,
    LgvHazardPerception,
    LgvCpc,
    LgvCpcConversion,
    PcvMultipleChoice,
    PcvHazardPerception,
    PcvCpc,
    PcvCpcConversion,
    AdiPart1,
    AdiHpt,
    Ers,
    AmiPart1,
    AdiPart1Dva,
}

impl TestType {
    pub const ALL: [TestType; 15] = [
        TestType::Car,
        TestType::Motorcycle,
        TestType::LgvMultipleChoice,
        TestType::LgvHazardPerception,
        TestType::LgvCpc,
        TestType::LgvCpcConversion,
        TestType::PcvMultipleChoice,
        TestType::PcvHazardPerception,
        TestType::PcvCpc,
        TestType::PcvCpcConversion,
        TestType::AdiPart1,
        TestType::AdiHpt,
        TestType::Ers,
        TestType::AmiPart1,
        TestType::AdiPart1Dva,
    ];

    /// Radio value on the test type page
    pub fn form_value(&self) -> &'static str {
        match self {
            TestType::Car => "car",
            TestType::Motorcycle => "motorcycle",
            TestType::LgvMultipleChoice => "lgvmc",
            TestType::LgvHazardPerception => "lgvhpt",
            TestType::LgvCpc => "lgvcpc",
            TestType::LgvCpcConversion => "lgvcpcc",
            TestType::PcvMultipleChoice => "pcvmc",
            TestType::PcvHazardPerception => "pcvhpt",
            TestType::PcvCpc => "pcvcpc",
            TestType::PcvCpcConversion => "pcvcpcc",
            TestType::AdiPart1 => "adip1",
            TestType::AdiHpt => "adihpt",
            TestType::Ers => "ers",
            TestType::AmiPart1 => "amip1",
            TestType::AdiPart1Dva => "adip1dva",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TestType::Car => "Car",
            TestType::Motorcycle => "Motorcycle",
            TestType::LgvMultipleChoice => "Lorry (LGV) multiple choice",
            TestType::LgvHazardPerception => "Lorry (LGV) hazard perception",
            TestType::LgvCpc => "Lorry (LGV) Driver CPC",
            TestType::LgvCpcConversion => "Lorry (LGV) Driver CPC conversion",
            TestType::PcvMultipleChoice => "Bus or coach (PCV) multiple choice",
            TestType::PcvHazardPerception => "Bus or coach (PCV) hazard perception",
            TestType::PcvCpc => "Bus or coach (PCV) Driver CPC",
            TestType::PcvCpcConversion => "Bus or coach (PCV) Driver CPC conversion",
            TestType::AdiPart1 => "Approved driving instructor (ADI) part 1",
            TestType::AdiHpt => "ADI hazard perception",
            TestType::Ers => "Enhanced rider scheme trainer",
            TestType::AmiPart1 => "Approved motorcycle instructor (AMI) part 1",
            TestType::AdiPart1Dva => "Approved driving instructor (ADI) part 1",
        }
    }

    /// Test fee in pence
    pub fn price_pence(&self) -> u32 {
        match self {
            TestType::Car | TestType::Motorcycle => 2300,
            TestType::LgvMultipleChoice | TestType::PcvMultipleChoice => 2600,
            TestType::LgvHazardPerception | TestType::PcvHazardPerception => 1100,
            TestType::LgvCpc
            | TestType::PcvCpc
            | TestType::LgvCpcConversion
            | TestType::PcvCpcConversion => 2300,
            TestType::AdiPart1 | TestType::AmiPart1 | TestType::AdiPart1Dva => 8100,
            TestType::AdiHpt => 1100,
            TestType::Ers => 6600,
        }
    }

    /// Price as rendered by the app, e.g. `£23.00`
    pub fn price_label(&self) -> String {
        format_pence(self.price_pence())
    }

    /// Whether the test is booked through the instructor journey
    pub fn is_instructor(&self) -> bool {
        matches!(
            self,
            TestType::AdiPart1
                | TestType::AdiHpt
                | TestType::Ers
                | TestType::AmiPart1
                | TestType::AdiPart1Dva
        )
    }

    pub fn is_bookable_in(&self, target: Target) -> bool {
        match self {
            TestType::AmiPart1 | TestType::AdiPart1Dva => target == Target::Ni,
            TestType::AdiPart1 | TestType::AdiHpt | TestType::Ers => target == Target::Gb,
            _ => true,
        }
    }

    /// Product number used to look the product up in the CRM
    pub fn product_number(&self) -> &'static str {
        match self {
            TestType::Car => "1001",
            TestType::Motorcycle => "2001",
            TestType::LgvMultipleChoice => "3001",
            TestType::LgvHazardPerception => "3002",
            TestType::LgvCpc => "3003",
            TestType::LgvCpcConversion => "3004",
            TestType::PcvMultipleChoice => "4001",
            TestType::PcvHazardPerception => "4002",
            TestType::PcvCpc => "4003",
            TestType::PcvCpcConversion => "4004",
            TestType::AdiPart1 => "5001",
            TestType::AdiHpt => "5002",
            TestType::Ers => "5003",
            TestType::AmiPart1 => "6001",
            TestType::AdiPart1Dva => "6002",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TestType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase().replace(['_', '-'], "");
        TestType::ALL
            .iter()
            .copied()
            .find(|t| t.form_value() == wanted || format!("{:?}", t).to_ascii_lowercase() == wanted)
            .ok_or_else(|| Error::UnknownValue {
                kind: "test type",
                value: s.to_string(),
            })
    }
}

/// Render pence as a pound amount
pub fn format_pence(pence: u32) -> String {
    format!("£{}.{:02}", pence / 100, pence % 100)
}

/// Language the test is sat in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Language {
    #[default]
    English,
    Welsh,
}

impl Language {
    pub fn form_value(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Welsh => "welsh",
        }
    }

    /// Display label in the language lookup table
    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale.is_welsh()) {
            (Language::English, false) => "English",
            (Language::Welsh, false) => "Welsh",
            (Language::English, true) => "Saesneg",
            (Language::Welsh, true) => "Cymraeg",
        }
    }

    pub fn crm_code(&self) -> u32 {
        match self {
            Language::English => 1,
            Language::Welsh => 2,
        }
    }
}

/// Voiceover language for the test. `NotRequired` is an explicit choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Voiceover {
    NotRequired,
    English,
    Welsh,
    Arabic,
    Farsi,
    Cantonese,
    Turkish,
    Polish,
    Portuguese,
}

impl Voiceover {
    pub fn form_value(&self) -> &'static str {
        match self {
            Voiceover::NotRequired => "none",
            Voiceover::English => "english",
            Voiceover::Welsh => "welsh",
            Voiceover::Arabic => "arabic",
            Voiceover::Farsi => "farsi",
            Voiceover::Cantonese => "cantonese",
            Voiceover::Turkish => "turkish",
            Voiceover::Polish => "polish",
            Voiceover::Portuguese => "portuguese",
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match self {
            Voiceover::NotRequired => locale.pick("No voiceover", "Dim trosleisio"),
            Voiceover::English => locale.pick("English", "Saesneg"),
            Voiceover::Welsh => locale.pick("Welsh", "Cymraeg"),
            Voiceover::Arabic => locale.pick("Arabic", "Arabeg"),
            Voiceover::Farsi => "Farsi",
            Voiceover::Cantonese => "Cantonese",
            Voiceover::Turkish => locale.pick("Turkish", "Tyrceg"),
            Voiceover::Polish => locale.pick("Polish", "Pwyleg"),
            Voiceover::Portuguese => locale.pick("Portuguese", "Portiwgaleg"),
        }
    }

    /// Voiceover languages offered for a jurisdiction
    pub fn offered_in(target: Target) -> Vec<Voiceover> {
        let mut offered = vec![Voiceover::English];
        if target == Target::Gb {
            offered.push(Voiceover::Welsh);
        }
        offered.extend([
            Voiceover::Arabic,
            Voiceover::Farsi,
            Voiceover::Cantonese,
            Voiceover::Turkish,
            Voiceover::Polish,
            Voiceover::Portuguese,
        ]);
        offered
    }

    pub fn crm_code(&self) -> u32 {
        match self {
            Voiceover::NotRequired => 675030000,
            Voiceover::English => 675030001,
            Voiceover::Welsh => 675030002,
            Voiceover::Arabic => 675030003,
            Voiceover::Farsi => 675030004,
            Voiceover::Cantonese => 675030005,
            Voiceover::Turkish => 675030006,
            Voiceover::Polish => 675030007,
            Voiceover::Portuguese => 675030008,
        }
    }
}

/// Support options on the non-standard accommodation support page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupportType {
    OnScreenBsl,
    Voiceover,
    Translator,
    ExtraTime,
    ReadingSupport,
    Other,
}

impl SupportType {
    pub fn form_value(&self) -> &'static str {
        match self {
            SupportType::OnScreenBsl => "onScreenBsl",
            SupportType::Voiceover => "voiceover",
            SupportType::Translator => "translator",
            SupportType::ExtraTime => "extraTime",
            SupportType::ReadingSupport => "readingSupport",
            SupportType::Other => "other",
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match self {
            SupportType::OnScreenBsl => locale.pick(
                "On-screen British Sign Language (BSL)",
                "Iaith Arwyddion Prydain (BSL) ar y sgrin",
            ),
            SupportType::Voiceover => locale.pick("Voiceover in a different language", "Trosleisio mewn iaith wahanol"),
            SupportType::Translator => locale.pick("A translator", "Cyfieithydd"),
            SupportType::ExtraTime => locale.pick("Extra time", "Amser ychwanegol"),
            SupportType::ReadingSupport => locale.pick("Reading support", "Cymorth darllen"),
            SupportType::Other => locale.pick("Other support", "Cymorth arall"),
        }
    }
}

/// Candidate's preferred days for a non-standard accommodation test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "option", content = "text", rename_all = "camelCase")]
pub enum PreferredDay {
    ParticularDays(String),
    AnyDay,
}

impl PreferredDay {
    pub fn form_value(&self) -> &'static str {
        match self {
            PreferredDay::ParticularDays(_) => "particularDay",
            PreferredDay::AnyDay => "anyDay",
        }
    }
}

/// Candidate's preferred location for a non-standard accommodation test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "option", content = "text", rename_all = "camelCase")]
pub enum PreferredLocation {
    ParticularLocation(String),
    Decide,
}

impl PreferredLocation {
    pub fn form_value(&self) -> &'static str {
        match self {
            PreferredLocation::ParticularLocation(_) => "particularLocation",
            PreferredLocation::Decide => "decide",
        }
    }
}

/// Channel a booking was made through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Origin {
    #[default]
    CitizenPortal,
    CustomerServiceCentre,
    IhttcPortal,
}

impl Origin {
    pub fn crm_code(&self) -> u32 {
        match self {
            Origin::CitizenPortal => 1,
            Origin::CustomerServiceCentre => 2,
            Origin::IhttcPortal => 3,
        }
    }
}

/// Status of a booking or booking product in the CRM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[default]
    Reserved,
    ConfirmationInProgress,
    Confirmed,
    CancellationInProgress,
    Cancelled,
    ChangeInProgress,
    CompletedPassed,
    CompletedFailed,
}

impl BookingStatus {
    pub fn crm_code(&self) -> u32 {
        match self {
            BookingStatus::Reserved => 675030000,
            BookingStatus::ConfirmationInProgress => 675030001,
            BookingStatus::Confirmed => 675030002,
            BookingStatus::CancellationInProgress => 675030003,
            BookingStatus::Cancelled => 675030004,
            BookingStatus::ChangeInProgress => 675030005,
            BookingStatus::CompletedPassed => 675030006,
            BookingStatus::CompletedFailed => 675030007,
        }
    }
}

/// Status of a payment record in the CRM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Draft,
    Success,
    Failed,
    RefundInProgress,
    Refunded,
}

impl PaymentStatus {
    pub fn crm_code(&self) -> u32 {
        match self {
            PaymentStatus::Draft => 675030000,
            PaymentStatus::Success => 675030001,
            PaymentStatus::Failed => 675030002,
            PaymentStatus::RefundInProgress => 675030003,
            PaymentStatus::Refunded => 675030004,
        }
    }
}

/// Kind of finance transaction recorded against a booking product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinanceTransactionType {
    Booking,
    Refund,
    Compensation,
}

impl FinanceTransactionType {
    pub fn crm_code(&self) -> u32 {
        match self {
            FinanceTransactionType::Booking => 675030000,
            FinanceTransactionType::Refund => 675030001,
            FinanceTransactionType::Compensation => 675030002,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

/// A test centre as shown on the centre results and booking pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCentre {
    pub name: String,
    pub address_lines: Vec<String>,
    pub postcode: String,
    pub site_id: String,
}

impl TestCentre {
    /// Default centre used by fixtures for a jurisdiction and locale
    pub fn default_for(target: Target, locale: Locale) -> Self {
        match (target, locale) {
            (Target::Ni, _) => Self {
                name: "Belfast".to_string(),
                address_lines: vec![
                    "Ormeau Business Park".to_string(),
                    "8 Cromac Avenue".to_string(),
                    "Belfast".to_string(),
                ],
                postcode: "BT7 2JA".to_string(),
                site_id: "SITE-0101".to_string(),
            },
            (Target::Gb, Locale::Cy) => Self {
                name: "Cardiff".to_string(),
                address_lines: vec![
                    "Ground Floor, Brunel House".to_string(),
                    "2 Fitzalan Road".to_string(),
                    "Cardiff".to_string(),
                ],
                postcode: "CF24 0EB".to_string(),
                site_id: "SITE-0205".to_string(),
            },
            (Target::Gb, _) => Self {
                name: "Birmingham".to_string(),
                address_lines: vec![
                    "Centre City Tower".to_string(),
                    "5-7 Hill Street".to_string(),
                    "Birmingham".to_string(),
                ],
                postcode: "B5 4UA".to_string(),
                site_id: "SITE-0042".to_string(),
            },
        }
    }

    /// Single-line address as the check-answers page renders it
    pub fn address(&self) -> String {
        let mut parts = self.address_lines.clone();
        parts.push(self.postcode.clone());
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_labels_per_locale() {
        assert_eq!(Language::Welsh.label(Locale::Gb), "Welsh");
        assert_eq!(Language::Welsh.label(Locale::Cy), "Cymraeg");
        assert_eq!(Language::English.label(Locale::Cy), "Saesneg");
        assert_eq!(Language::English.label(Locale::Ni), "English");
    }

    #[test]
    fn test_test_type_round_trips_through_names() {
        assert_eq!("car".parse::<TestType>().unwrap(), TestType::Car);
        assert_eq!("LGV_CPC".parse::<TestType>().unwrap(), TestType::LgvCpc);
        assert_eq!("adip1dva".parse::<TestType>().unwrap(), TestType::AdiPart1Dva);
        assert!("tractor".parse::<TestType>().is_err());
    }

    #[test]
    fn test_instructor_tests_are_jurisdiction_specific() {
        assert!(TestType::AdiPart1.is_bookable_in(Target::Gb));
        assert!(!TestType::AdiPart1.is_bookable_in(Target::Ni));
        assert!(TestType::AmiPart1.is_bookable_in(Target::Ni));
        assert!(TestType::Car.is_bookable_in(Target::Ni));
    }

    #[test]
    fn test_price_labels() {
        assert_eq!(TestType::Car.price_label(), "£23.00");
        assert_eq!(TestType::AdiHpt.price_label(), "£11.00");
        assert_eq!(format_pence(8105), "£81.05");
    }

    #[test]
    fn test_welsh_voiceover_only_offered_in_gb() {
        assert!(Voiceover::offered_in(Target::Gb).contains(&Voiceover::Welsh));
        assert!(!Voiceover::offered_in(Target::Ni).contains(&Voiceover::Welsh));
    }

    #[test]
    fn test_target_parsing() {
        assert_eq!("NI".parse::<Target>().unwrap(), Target::Ni);
        assert_eq!(Target::Gb.query_value(), "gb");
        assert!("fr".parse::<Target>().is_err());
    }
}

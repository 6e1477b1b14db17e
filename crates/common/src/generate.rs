//! Candidate test-data generation

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

use crate::types::Gender;

static BOOKING_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]-\d{3}-\d{3}-\d{3}$").expect("valid booking reference regex"));

static GB_LICENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z9]{5}\d{6}[A-Z9]{2}\d[A-Z]{2}$").expect("valid licence regex"));

const FIRST_NAMES: &[&str] = &[
    "Oliver", "Amelia", "Harry", "Isla", "George", "Ava", "Noah", "Mia", "Jack", "Ivy",
    "Rhys", "Seren", "Ciaran", "Aoife",
];

const SURNAMES: &[&str] = &[
    "Smith", "Jones", "Taylor", "Brown", "Williams", "Wilson", "Evans", "Thomas", "Roberts",
    "Davies", "Murphy", "Kelly", "O'Neill", "Wu",
];

/// Whether `reference` has the shape of an app-issued booking reference
pub fn is_booking_reference(reference: &str) -> bool {
    BOOKING_REFERENCE.is_match(reference)
}

pub fn is_gb_licence_number(licence: &str) -> bool {
    GB_LICENCE.is_match(licence)
}

pub fn is_ni_licence_number(licence: &str) -> bool {
    licence.len() == 8 && licence.chars().all(|c| c.is_ascii_digit())
}

/// Random identity used to populate a candidate
#[derive(Debug, Clone)]
pub struct Identity {
    pub first_names: String,
    pub surname: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
}

pub fn random_identity<R: Rng>(rng: &mut R) -> Identity {
    let first_names = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())].to_string();
    let surname = SURNAMES[rng.gen_range(0..SURNAMES.len())].to_string();
    let gender = if rng.gen_bool(0.5) { Gender::Female } else { Gender::Male };
    let year = rng.gen_range(1970..=2003);
    let month = rng.gen_range(1..=12);
    let day = rng.gen_range(1..=28);
    let date_of_birth = NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or(NaiveDate::MIN);

    Identity {
        first_names,
        surname,
        gender,
        date_of_birth,
    }
}

/// GB driving licence number in the DVLA 16-character layout.
///
/// Surname block (padded with 9), decade digit, month (+50 for female),
/// day, year digit, initials (padded with 9), the digit 9 and two check
/// letters.
pub fn gb_licence_number<R: Rng>(rng: &mut R, identity: &Identity) -> String {
    let mut surname: String = identity
        .surname
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .take(5)
        .collect();
    while surname.len() < 5 {
        surname.push('9');
    }

    let dob = identity.date_of_birth;
    let year = dob.year();
    let month = match identity.gender {
        Gender::Female => dob.month() + 50,
        Gender::Male => dob.month(),
    };

    let mut initials: String = identity
        .first_names
        .split_whitespace()
        .filter_map(|name| name.chars().next())
        .map(|c| c.to_ascii_uppercase())
        .take(2)
        .collect();
    while initials.len() < 2 {
        initials.push('9');
    }

    let check: String = (0..2).map(|_| rng.gen_range(b'A'..=b'Z') as char).collect();

    format!(
        "{}{}{:02}{:02}{}{}9{}",
        surname,
        (year / 10) % 10,
        month,
        dob.day(),
        year % 10,
        initials,
        check
    )
}

pub fn ni_licence_number<R: Rng>(rng: &mut R) -> String {
    (0..8).map(|_| char::from(b'0' + rng.gen_range(0..10u8))).collect()
}

/// Unique mailbox on the reserved example domain
pub fn email_for<R: Rng>(rng: &mut R, identity: &Identity) -> String {
    let local: String = format!("{}.{}", identity.first_names, identity.surname)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
        .collect::<String>()
        .to_ascii_lowercase();
    format!("{}.{:06}@example.com", local, rng.gen_range(0..1_000_000))
}

/// Number in the Ofcom drama range
pub fn telephone<R: Rng>(rng: &mut R) -> String {
    format!("07700 900{:03}", rng.gen_range(0..1000))
}

/// Booking reference in the app's `X-000-000-000` layout
pub fn booking_reference<R: Rng>(rng: &mut R) -> String {
    let letter = rng.gen_range(b'A'..=b'Z') as char;
    let digits: Vec<String> = (0..3).map(|_| format!("{:03}", rng.gen_range(0..1000))).collect();
    format!("{}-{}", letter, digits.join("-"))
}

/// Instructor personal reference number
pub fn personal_reference_number<R: Rng>(rng: &mut R) -> String {
    format!("{:06}", rng.gen_range(100_000..1_000_000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn identity(surname: &str, first: &str, gender: Gender, dob: (i32, u32, u32)) -> Identity {
        Identity {
            first_names: first.to_string(),
            surname: surname.to_string(),
            gender,
            date_of_birth: NaiveDate::from_ymd_opt(dob.0, dob.1, dob.2).unwrap(),
        }
    }

    #[test]
    fn test_gb_licence_layout() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = identity("Wu", "Mia Rose", Gender::Female, (1985, 7, 4));
        let licence = gb_licence_number(&mut rng, &id);

        assert_eq!(licence.len(), 16);
        assert!(licence.starts_with("WU999857045MR9"), "got {licence}");
        assert!(is_gb_licence_number(&licence));
    }

    #[test]
    fn test_gb_licence_strips_punctuation() {
        let mut rng = StdRng::seed_from_u64(1);
        let id = identity("O'Neill", "Ciaran", Gender::Male, (1990, 11, 23));
        let licence = gb_licence_number(&mut rng, &id);
        assert!(licence.starts_with("ONEIL911230C99"), "got {licence}");
    }

    #[test]
    fn test_ni_licence_is_eight_digits() {
        let mut rng = StdRng::seed_from_u64(3);
        let licence = ni_licence_number(&mut rng);
        assert!(is_ni_licence_number(&licence));
    }

    #[test]
    fn test_booking_reference_shape() {
        assert!(is_booking_reference("B-000-123-456"));
        assert!(!is_booking_reference("b-000-123-456"));
        assert!(!is_booking_reference("B-000-123-4567"));
        assert!(!is_booking_reference("B000123456"));
    }

    #[test]
    fn test_generated_booking_references_match_app_layout() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            assert!(is_booking_reference(&booking_reference(&mut rng)));
        }
    }

    #[test]
    fn test_email_is_lowercase_and_unique_per_draw() {
        let mut rng = StdRng::seed_from_u64(11);
        let id = identity("O'Neill", "Aoife", Gender::Female, (1999, 1, 1));
        let first = email_for(&mut rng, &id);
        let second = email_for(&mut rng, &id);
        assert!(first.starts_with("aoife.oneill."));
        assert!(first.ends_with("@example.com"));
        assert_ne!(first, second);
    }
}

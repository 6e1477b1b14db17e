//! Test-data seeding
//!
//! Creates the minimal record graph that makes a booking exist before a UI
//! scenario starts, and cancels it again afterwards. Setup calls abort the
//! scenario on failure; teardown and status calls only log.

use chrono::{NaiveDateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Europe::London;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use ftts_common::generate;
use ftts_common::{
    BookingStatus, FinanceTransactionType, Gender, PaymentStatus, SessionData, Target,
};

use crate::client::CrmApi;
use crate::error::{CrmError, CrmResult};
use crate::query::{bind, ODataQuery};

pub const CONTACTS: &str = "contacts";
pub const LICENCES: &str = "ftts_licences";
pub const BOOKINGS: &str = "ftts_bookings";
pub const BOOKING_PRODUCTS: &str = "ftts_bookingproducts";
pub const PAYMENTS: &str = "ftts_payments";
pub const FINANCE_TRANSACTIONS: &str = "ftts_financetransactions";
pub const PRODUCTS: &str = "products";

/// Ids of every record created for one seeded booking
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededBooking {
    pub candidate_id: String,
    pub licence_id: String,
    pub booking_id: String,
    pub booking_product_id: String,
    pub payment_id: String,
    pub finance_transaction_id: String,
    pub booking_reference: String,
    pub product_reference: String,
}

impl SeededBooking {
    /// Copy server-side identifiers and statuses into the fixture
    pub fn apply_to(&self, data: &mut SessionData) {
        data.assign_reference(self.booking_reference.clone());
        let booking = &mut data.current_booking;
        booking.product_reference = Some(self.product_reference.clone());
        booking.status = BookingStatus::Confirmed;
        booking.product_status = BookingStatus::Confirmed;
        booking.payment_status = PaymentStatus::Success;
    }
}

/// Ids collected so far, used in failure messages
#[derive(Debug, Default)]
struct Progress {
    ids: Vec<(&'static str, String)>,
}

impl Progress {
    fn record(&mut self, name: &'static str, id: &str) {
        self.ids.push((name, id.to_string()));
    }

    fn summary(&self) -> String {
        if self.ids.is_empty() {
            return "no records created".to_string();
        }
        self.ids
            .iter()
            .map(|(name, id)| format!("{}={}", name, id))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn fail(&self, step: &'static str, source: CrmError) -> CrmError {
        error!(step, ids = %self.summary(), "CRM seeding failed: {}", source);
        CrmError::Seed {
            step,
            ids: self.summary(),
            source: Box::new(source),
        }
    }
}

/// Seeds and cleans up CRM records around a scenario
pub struct TestDataSeeder<C: CrmApi> {
    crm: C,
}

impl<C: CrmApi> TestDataSeeder<C> {
    pub fn new(crm: C) -> Self {
        Self { crm }
    }

    pub fn crm(&self) -> &C {
        &self.crm
    }

    /// Create candidate, licence, booking, booking product, payment and finance
    /// transaction records for the fixture's current booking, then mark the
    /// booking confirmed. Bookings are created without the eligibility bypass;
    /// fixtures that carry one have it switched on afterwards.
    pub async fn seed_booking(&self, data: &SessionData) -> CrmResult<SeededBooking> {
        let mut progress = Progress::default();
        let mut rng = StdRng::from_entropy();
        let booking_reference = data
            .current_booking
            .reference
            .clone()
            .unwrap_or_else(|| generate::booking_reference(&mut rng));
        let product_reference = format!("{}-01", booking_reference);

        let candidate_id = self
            .crm
            .create(CONTACTS, candidate_body(data))
            .await
            .map_err(|e| progress.fail("candidate", e))?;
        progress.record("candidate", &candidate_id);

        let licence_id = self
            .crm
            .create(LICENCES, licence_body(data, &candidate_id))
            .await
            .map_err(|e| progress.fail("licence", e))?;
        progress.record("licence", &licence_id);

        let booking_id = self
            .crm
            .create(
                BOOKINGS,
                booking_body(data, &booking_reference, &candidate_id, &licence_id),
            )
            .await
            .map_err(|e| progress.fail("booking", e))?;
        progress.record("booking", &booking_id);

        let product_id = self
            .product_id(data)
            .await
            .map_err(|e| progress.fail("product lookup", e))?;

        let booking_product_id = self
            .crm
            .create(
                BOOKING_PRODUCTS,
                booking_product_body(data, &product_reference, &booking_id, &candidate_id, &product_id),
            )
            .await
            .map_err(|e| progress.fail("booking product", e))?;
        progress.record("booking product", &booking_product_id);

        let payment_id = self
            .crm
            .create(PAYMENTS, payment_body(data, &candidate_id))
            .await
            .map_err(|e| progress.fail("payment", e))?;
        progress.record("payment", &payment_id);

        let finance_transaction_id = self
            .crm
            .create(
                FINANCE_TRANSACTIONS,
                finance_transaction_body(data, &booking_product_id, &payment_id),
            )
            .await
            .map_err(|e| progress.fail("finance transaction", e))?;
        progress.record("finance transaction", &finance_transaction_id);

        let seeded = SeededBooking {
            candidate_id,
            licence_id,
            booking_id,
            booking_product_id,
            payment_id,
            finance_transaction_id,
            booking_reference,
            product_reference,
        };

        self.confirm(&seeded).await;
        if data.current_booking.eligibility_bypass {
            self.set_eligibility_bypass(&seeded, true).await;
        }

        info!(
            reference = %seeded.booking_reference,
            ids = %progress.summary(),
            "Seeded booking"
        );
        Ok(seeded)
    }

    async fn product_id(&self, data: &SessionData) -> CrmResult<String> {
        let number = data.current_booking.test_type.product_number();
        let query = ODataQuery::new()
            .filter_eq("productnumber", number)
            .select(&["productid"])
            .top(1);
        let products = self.crm.retrieve_multiple(PRODUCTS, &query).await?;
        products
            .first()
            .and_then(|p| p.get("productid"))
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| CrmError::NotFound {
                entity_set: PRODUCTS.to_string(),
                filter: format!("productnumber eq '{}'", number),
            })
    }

    /// Best-effort status update to confirmed
    async fn confirm(&self, seeded: &SeededBooking) {
        let status = json!({ "ftts_bookingstatus": BookingStatus::Confirmed.crm_code() });
        if let Err(e) = self.crm.update(BOOKINGS, &seeded.booking_id, status.clone()).await {
            error!(booking_id = %seeded.booking_id, "Failed to confirm seeded booking: {}", e);
        }
        if let Err(e) = self
            .crm
            .update(BOOKING_PRODUCTS, &seeded.booking_product_id, status)
            .await
        {
            error!(
                booking_product_id = %seeded.booking_product_id,
                "Failed to confirm seeded booking product: {}", e
            );
        }
    }

    /// Teardown: mark the booking product cancelled. Never fails the scenario.
    pub async fn cancel_booking_product(&self, seeded: &SeededBooking) {
        let body = json!({
            "ftts_bookingstatus": BookingStatus::Cancelled.crm_code(),
            "ftts_canceldate": now(),
        });
        match self.crm.update(BOOKING_PRODUCTS, &seeded.booking_product_id, body).await {
            Ok(()) => info!(reference = %seeded.booking_reference, "Cancelled seeded booking product"),
            Err(e) => error!(
                booking_product_id = %seeded.booking_product_id,
                reference = %seeded.booking_reference,
                "Failed to cancel booking product during cleanup: {}", e
            ),
        }
    }

    /// Mark a seeded booking as cancelled by the authority and owed a free re-book.
    /// Scenarios depend on this state so failures are returned.
    pub async fn mark_compensation(&self, seeded: &SeededBooking) -> CrmResult<()> {
        let cancelled = BookingStatus::Cancelled.crm_code();
        self.crm
            .update(
                BOOKINGS,
                &seeded.booking_id,
                json!({
                    "ftts_bookingstatus": cancelled,
                    "ftts_owedcompensationbookingdatetime": now(),
                }),
            )
            .await
            .map_err(|e| {
                error!(booking_id = %seeded.booking_id, "Failed to mark booking owed compensation: {}", e);
                e
            })?;
        self.crm
            .update(
                BOOKING_PRODUCTS,
                &seeded.booking_product_id,
                json!({ "ftts_bookingstatus": cancelled }),
            )
            .await
            .map_err(|e| {
                error!(
                    booking_product_id = %seeded.booking_product_id,
                    "Failed to cancel compensation booking product: {}", e
                );
                e
            })?;
        Ok(())
    }

    /// Best-effort toggle of the eligibility bypass flag on a booking
    pub async fn set_eligibility_bypass(&self, seeded: &SeededBooking, bypass: bool) {
        let body = json!({ "ftts_eligibilitybypass": bypass });
        if let Err(e) = self.crm.update(BOOKINGS, &seeded.booking_id, body).await {
            warn!(booking_id = %seeded.booking_id, "Failed to set eligibility bypass: {}", e);
        }
    }

    /// Look a booking up by the reference shown to candidates
    pub async fn find_booking_by_reference(&self, reference: &str) -> CrmResult<Value> {
        let query = ODataQuery::new()
            .filter_eq("ftts_reference", reference)
            .select(&["ftts_bookingid", "ftts_reference", "ftts_bookingstatus"])
            .top(1);
        let mut found = self.crm.retrieve_multiple(BOOKINGS, &query).await?;
        if found.is_empty() {
            return Err(CrmError::NotFound {
                entity_set: BOOKINGS.to_string(),
                filter: query.filter_expression().unwrap_or_default().to_string(),
            });
        }
        Ok(found.swap_remove(0))
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Fixture slots are UK wall-clock times; the CRM stores UTC
fn crm_test_date(local: NaiveDateTime) -> String {
    let utc = London
        .from_local_datetime(&local)
        .earliest()
        .map(|slot| slot.naive_utc())
        .unwrap_or(local);
    Utc.from_utc_datetime(&utc).to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn candidate_body(data: &SessionData) -> Value {
    let candidate = &data.candidate;
    let gender_code = match candidate.gender {
        Gender::Male => 1,
        Gender::Female => 2,
    };
    let mut body = json!({
        "firstname": candidate.first_names,
        "lastname": candidate.surname,
        "birthdate": candidate.date_of_birth.format("%Y-%m-%d").to_string(),
        "emailaddress1": candidate.email,
        "telephone2": candidate.telephone,
        "gendercode": gender_code,
    });
    if let Some(prn) = &candidate.personal_reference_number {
        body["ftts_personalreferencenumber"] = json!(prn);
    }
    body
}

fn licence_body(data: &SessionData, candidate_id: &str) -> Value {
    json!({
        "ftts_licence": data.candidate.licence_number,
        "ftts_Person@odata.bind": bind(CONTACTS, candidate_id),
    })
}

fn booking_body(data: &SessionData, reference: &str, candidate_id: &str, licence_id: &str) -> Value {
    let booking = &data.current_booking;
    let agency = match data.target {
        Target::Gb => 0,
        Target::Ni => 1,
    };
    json!({
        "ftts_reference": reference,
        "ftts_bookingstatus": BookingStatus::Reserved.crm_code(),
        "ftts_origin": booking.origin.crm_code(),
        "ftts_nonstandardaccommodation": data.is_non_standard(),
        "ftts_eligibilitybypass": false,
        "ftts_owedcompensationbookingdatetime": Value::Null,
        "ftts_governmentagency": agency,
        "ftts_candidateid@odata.bind": bind(CONTACTS, candidate_id),
        "ftts_LicenceId@odata.bind": bind(LICENCES, licence_id),
    })
}

fn booking_product_body(
    data: &SessionData,
    reference: &str,
    booking_id: &str,
    candidate_id: &str,
    product_id: &str,
) -> Value {
    let booking = &data.current_booking;
    json!({
        "ftts_reference": reference,
        "ftts_bookingstatus": BookingStatus::Reserved.crm_code(),
        "ftts_price": f64::from(booking.price_pence) / 100.0,
        "ftts_testdate": crm_test_date(booking.date_time),
        "ftts_testlanguage": booking.language.crm_code(),
        "ftts_voiceoverlanguage": booking.voiceover.map(|v| v.crm_code()),
        "ftts_bsl": booking.bsl,
        "ftts_bookingid@odata.bind": bind(BOOKINGS, booking_id),
        "ftts_CandidateId@odata.bind": bind(CONTACTS, candidate_id),
        "ftts_productid@odata.bind": bind(PRODUCTS, product_id),
    })
}

fn payment_body(data: &SessionData, candidate_id: &str) -> Value {
    json!({
        "ftts_status": PaymentStatus::Success.crm_code(),
        "ftts_amount": f64::from(data.current_booking.price_pence) / 100.0,
        "ftts_origin": data.current_booking.origin.crm_code(),
        "ftts_personId@odata.bind": bind(CONTACTS, candidate_id),
    })
}

fn finance_transaction_body(data: &SessionData, booking_product_id: &str, payment_id: &str) -> Value {
    json!({
        "ftts_type": FinanceTransactionType::Booking.crm_code(),
        "ftts_amount": f64::from(data.current_booking.price_pence) / 100.0,
        "ftts_bookingproductinvoiceid@odata.bind": bind(BOOKING_PRODUCTS, booking_product_id),
        "ftts_payment@odata.bind": bind(PAYMENTS, payment_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_body_links_candidate_and_licence() {
        let data = SessionData::new(Target::Ni);
        let body = booking_body(&data, "B-000-000-001", "c1", "l1");
        assert_eq!(body["ftts_candidateid@odata.bind"], "/contacts(c1)");
        assert_eq!(body["ftts_LicenceId@odata.bind"], "/ftts_licences(l1)");
        assert_eq!(body["ftts_governmentagency"], 1);
    }

    #[test]
    fn test_candidate_body_includes_prn_for_instructors() {
        let data = SessionData::builder().instructor(true).build().unwrap();
        let body = candidate_body(&data);
        assert!(body.get("ftts_personalreferencenumber").is_some());
        let body = candidate_body(&SessionData::new(Target::Gb));
        assert!(body.get("ftts_personalreferencenumber").is_none());
    }

    #[test]
    fn test_test_date_converted_from_uk_local_time() {
        let slot = |y, m, d| chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(9, 0, 0).unwrap();
        assert_eq!(crm_test_date(slot(2026, 7, 6)), "2026-07-06T08:00:00Z");
        assert_eq!(crm_test_date(slot(2026, 12, 7)), "2026-12-07T09:00:00Z");
    }

    #[test]
    fn test_progress_summary() {
        let mut progress = Progress::default();
        assert_eq!(progress.summary(), "no records created");
        progress.record("candidate", "c1");
        progress.record("licence", "l1");
        assert_eq!(progress.summary(), "candidate=c1, licence=l1");
    }
}

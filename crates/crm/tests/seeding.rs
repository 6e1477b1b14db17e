//! Seeding sequence tests against the in-memory CRM

use chrono::NaiveDate;
use serde_json::json;

use ftts_common::{is_booking_reference, BookingStatus, Origin, SessionData, Target, TestType};
use ftts_crm::seed::{
    BOOKINGS, BOOKING_PRODUCTS, CONTACTS, FINANCE_TRANSACTIONS, LICENCES, PAYMENTS, PRODUCTS,
};
use ftts_crm::{CrmError, CrmRequest, InMemoryCrm, TestDataSeeder};

fn crm_with_products() -> InMemoryCrm {
    let crm = InMemoryCrm::new();
    for test_type in TestType::ALL {
        crm.insert(PRODUCTS, json!({ "productnumber": test_type.product_number() }));
    }
    crm
}

fn created_sets(requests: &[CrmRequest]) -> Vec<String> {
    requests
        .iter()
        .filter_map(|r| match r {
            CrmRequest::Create { entity_set, .. } => Some(entity_set.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn seed_creates_records_in_dependency_order() {
    let seeder = TestDataSeeder::new(crm_with_products());
    let mut data = SessionData::new(Target::Gb);

    let seeded = seeder.seed_booking(&data).await.unwrap();

    assert_eq!(
        created_sets(&seeder.crm().requests()),
        vec![CONTACTS, LICENCES, BOOKINGS, BOOKING_PRODUCTS, PAYMENTS, FINANCE_TRANSACTIONS]
    );
    assert!(is_booking_reference(&seeded.booking_reference));
    assert_eq!(seeded.product_reference, format!("{}-01", seeded.booking_reference));

    let booking = seeder.crm().record(BOOKINGS, &seeded.booking_id).unwrap();
    assert_eq!(booking["ftts_bookingstatus"], BookingStatus::Confirmed.crm_code());
    assert_eq!(
        booking["ftts_candidateid@odata.bind"],
        format!("/contacts({})", seeded.candidate_id)
    );

    seeded.apply_to(&mut data);
    assert_eq!(data.current_booking.reference.as_deref(), Some(seeded.booking_reference.as_str()));
    assert_eq!(data.current_booking.status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn summer_slot_is_stored_in_utc() {
    let seeder = TestDataSeeder::new(crm_with_products());
    let data = SessionData::builder()
        .target(Target::Gb)
        .today(NaiveDate::from_ymd_opt(2026, 6, 22).unwrap())
        .build()
        .unwrap();
    assert_eq!(data.current_booking.date_time.to_string(), "2026-07-06 09:00:00");

    let seeded = seeder.seed_booking(&data).await.unwrap();

    let product = seeder.crm().record(BOOKING_PRODUCTS, &seeded.booking_product_id).unwrap();
    assert_eq!(product["ftts_testdate"], "2026-07-06T08:00:00Z");
}

#[tokio::test]
async fn seed_reuses_fixture_reference() {
    let seeder = TestDataSeeder::new(crm_with_products());
    let mut data = SessionData::new(Target::Ni);
    data.assign_reference("C-111-222-333");

    let seeded = seeder.seed_booking(&data).await.unwrap();
    assert_eq!(seeded.booking_reference, "C-111-222-333");

    let found = seeder.find_booking_by_reference("C-111-222-333").await.unwrap();
    assert_eq!(found["ftts_bookingid"], json!(seeded.booking_id));
}

#[tokio::test]
async fn setup_failure_aborts_with_step_and_ids() {
    let crm = crm_with_products();
    crm.fail_on("create", BOOKING_PRODUCTS);
    let seeder = TestDataSeeder::new(crm);

    let err = seeder
        .seed_booking(&SessionData::new(Target::Gb))
        .await
        .unwrap_err();

    match err {
        CrmError::Seed { step, ids, .. } => {
            assert_eq!(step, "booking product");
            assert!(ids.contains("candidate="));
            assert!(ids.contains("booking="));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(seeder.crm().count(PAYMENTS), 0);
}

#[tokio::test]
async fn missing_product_aborts_seeding() {
    let seeder = TestDataSeeder::new(InMemoryCrm::new());
    let err = seeder
        .seed_booking(&SessionData::new(Target::Gb))
        .await
        .unwrap_err();
    assert!(matches!(err, CrmError::Seed { step: "product lookup", .. }));
}

#[tokio::test]
async fn status_update_failure_is_swallowed() {
    let crm = crm_with_products();
    crm.fail_on("update", BOOKINGS);
    let seeder = TestDataSeeder::new(crm);

    let seeded = seeder.seed_booking(&SessionData::new(Target::Gb)).await;
    assert!(seeded.is_ok());
}

#[tokio::test]
async fn customer_service_booking_gets_eligibility_bypass() {
    let seeder = TestDataSeeder::new(crm_with_products());
    let data = SessionData::builder()
        .origin(Origin::CustomerServiceCentre)
        .eligibility_bypass(true)
        .build()
        .unwrap();

    let seeded = seeder.seed_booking(&data).await.unwrap();

    let booking = seeder.crm().record(BOOKINGS, &seeded.booking_id).unwrap();
    assert_eq!(booking["ftts_origin"], Origin::CustomerServiceCentre.crm_code());
    assert_eq!(booking["ftts_eligibilitybypass"], true);

    seeder.set_eligibility_bypass(&seeded, false).await;
    let booking = seeder.crm().record(BOOKINGS, &seeded.booking_id).unwrap();
    assert_eq!(booking["ftts_eligibilitybypass"], false);
}

#[tokio::test]
async fn eligibility_bypass_failure_is_swallowed() {
    let crm = crm_with_products();
    crm.fail_on("update", BOOKINGS);
    let seeder = TestDataSeeder::new(crm);
    let data = SessionData::builder().eligibility_bypass(true).build().unwrap();

    let seeded = seeder.seed_booking(&data).await.unwrap();

    let booking = seeder.crm().record(BOOKINGS, &seeded.booking_id).unwrap();
    assert_eq!(booking["ftts_eligibilitybypass"], false);
}

#[tokio::test]
async fn citizen_booking_has_no_bypass_update() {
    let seeder = TestDataSeeder::new(crm_with_products());
    let seeded = seeder.seed_booking(&SessionData::new(Target::Gb)).await.unwrap();

    let bypass_updates = seeder
        .crm()
        .requests()
        .iter()
        .filter(|r| matches!(r, CrmRequest::Update { body, .. } if body.get("ftts_eligibilitybypass").is_some()))
        .count();
    assert_eq!(bypass_updates, 0);
    let booking = seeder.crm().record(BOOKINGS, &seeded.booking_id).unwrap();
    assert_eq!(booking["ftts_eligibilitybypass"], false);
}

#[tokio::test]
async fn teardown_marks_product_cancelled_and_never_fails() {
    let seeder = TestDataSeeder::new(crm_with_products());
    let seeded = seeder.seed_booking(&SessionData::new(Target::Gb)).await.unwrap();

    seeder.cancel_booking_product(&seeded).await;
    let product = seeder
        .crm()
        .record(BOOKING_PRODUCTS, &seeded.booking_product_id)
        .unwrap();
    assert_eq!(product["ftts_bookingstatus"], BookingStatus::Cancelled.crm_code());

    seeder.crm().fail_on("update", BOOKING_PRODUCTS);
    seeder.cancel_booking_product(&seeded).await;
}

#[tokio::test]
async fn compensation_marks_booking_and_product_cancelled() {
    let seeder = TestDataSeeder::new(crm_with_products());
    let data = SessionData::builder().compensation(true).build().unwrap();
    let seeded = seeder.seed_booking(&data).await.unwrap();

    seeder.mark_compensation(&seeded).await.unwrap();

    let booking = seeder.crm().record(BOOKINGS, &seeded.booking_id).unwrap();
    assert_eq!(booking["ftts_bookingstatus"], BookingStatus::Cancelled.crm_code());
    assert!(booking["ftts_owedcompensationbookingdatetime"].is_string());
}

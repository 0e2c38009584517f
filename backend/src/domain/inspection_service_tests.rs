//! Tests for the inspection service.

use std::sync::Arc;

use bytes::Bytes;
use rstest::rstest;

use super::*;
use crate::domain::ports::{MockAgreementRepository, MockInspectionRepository, MockMediaStore};
use crate::domain::{
    Agreement, Condition, ErrorCode, InspectionType, PropertyId, Role, StoredObject, UploadFile,
    UserId,
};
use crate::test_support::{FixtureClock, agreement_draft, caller};

type Service = InspectionService<MockInspectionRepository, MockAgreementRepository>;

fn make_service(
    inspections: MockInspectionRepository,
    agreements: MockAgreementRepository,
    media: MockMediaStore,
) -> Service {
    InspectionService::new(
        Arc::new(inspections),
        Arc::new(agreements),
        Arc::new(media),
        FixtureClock::shared(),
    )
}

fn agreement_between(landlord: UserId, tenant: UserId) -> Agreement {
    agreement_draft(PropertyId::random(), Some(tenant))
        .into_agreement(landlord, FixtureClock::shared().utc())
}

fn move_in(agreement: &Agreement) -> InspectionDraft {
    InspectionDraft {
        agreement: agreement.id,
        kind: InspectionType::MoveIn,
        inspection_date: agreement.start_date,
        overall_condition: Condition::Good,
        issues: Vec::new(),
    }
}

fn photo(room: Option<&str>) -> PhotoUpload {
    PhotoUpload {
        file: UploadFile {
            file_name: "kitchen.jpg".to_owned(),
            mime_type: "image/jpeg".to_owned(),
            bytes: Bytes::from_static(b"jpeg"),
        },
        room: room.map(str::to_owned),
        description: None,
    }
}

#[tokio::test]
async fn create_copies_parties_from_agreement() {
    let tenant = caller(&[Role::Tenant]);
    let landlord = UserId::random();
    let agreement = agreement_between(landlord, tenant.user_id);
    let property = agreement.property;
    let draft = move_in(&agreement);
    let mut agreements = MockAgreementRepository::new();
    agreements
        .expect_find_for_participant()
        .times(1)
        .return_once(move |_, _| Ok(Some(agreement)));
    let mut inspections = MockInspectionRepository::new();
    inspections.expect_insert().times(1).return_once(|_| Ok(()));

    let inspection = make_service(inspections, agreements, MockMediaStore::new())
        .create(&tenant, draft)
        .await
        .expect("recorded");

    assert_eq!(inspection.landlord, landlord);
    assert_eq!(inspection.tenant, Some(tenant.user_id));
    assert_eq!(inspection.property, property);
    assert_eq!(inspection.conducted_by, tenant.user_id);
}

#[tokio::test]
async fn create_against_invisible_agreement_is_not_found() {
    let agreement = agreement_between(UserId::random(), UserId::random());
    let draft = move_in(&agreement);
    let mut agreements = MockAgreementRepository::new();
    agreements
        .expect_find_for_participant()
        .times(1)
        .return_once(|_, _| Ok(None));
    let mut inspections = MockInspectionRepository::new();
    inspections.expect_insert().times(0);

    let error = make_service(inspections, agreements, MockMediaStore::new())
        .create(&caller(&[Role::Tenant]), draft)
        .await
        .expect_err("stranger");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "Agreement not found");
}

#[rstest]
#[case(None, "general")]
#[case(Some("   "), "general")]
#[case(Some("kitchen"), "kitchen")]
#[tokio::test]
async fn add_photo_defaults_room(#[case] room: Option<&str>, #[case] expected: &str) {
    let tenant = caller(&[Role::Tenant]);
    let agreement = agreement_between(UserId::random(), tenant.user_id);
    let inspection = move_in(&agreement).into_inspection(
        tenant.user_id,
        &agreement,
        FixtureClock::shared().utc(),
    );
    let id = inspection.id;
    let appended = inspection.clone();
    let mut inspections = MockInspectionRepository::new();
    inspections
        .expect_find_for_participant()
        .times(1)
        .return_once(move |_, _| Ok(Some(inspection)));
    let wanted = expected.to_owned();
    inspections
        .expect_append_photo()
        .withf(move |_, _, photo| photo.room == wanted)
        .times(1)
        .return_once(move |_, _, _| Ok(Some(appended)));
    let mut media = MockMediaStore::new();
    let folder = MediaFolder::for_inspection(&id);
    media
        .expect_upload()
        .withf(move |_, target| *target == folder)
        .times(1)
        .return_once(|_, _| {
            Ok(StoredObject {
                url: "https://cdn.example/kitchen.jpg".to_owned(),
                public_id: "rentfit/inspections/kitchen".to_owned(),
            })
        });

    let added = make_service(inspections, MockAgreementRepository::new(), media)
        .add_photo(&tenant, id, photo(room))
        .await
        .expect("appended");

    assert_eq!(added.room, expected);
    assert_eq!(added.url, "https://cdn.example/kitchen.jpg");
}

#[tokio::test]
async fn add_photo_rejects_disallowed_type_before_lookup() {
    let mut upload = photo(None);
    upload.file.mime_type = "application/zip".to_owned();
    let mut inspections = MockInspectionRepository::new();
    inspections.expect_find_for_participant().times(0);

    let error = make_service(inspections, MockAgreementRepository::new(), MockMediaStore::new())
        .add_photo(&caller(&[Role::Tenant]), InspectionId::random(), upload)
        .await
        .expect_err("zip");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

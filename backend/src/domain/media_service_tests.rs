//! Tests for the media gateway service.

use std::sync::Arc;

use bytes::Bytes;
use mockall::Sequence;

use super::*;
use crate::domain::ports::{
    DocumentPersistenceError, MediaStoreError, MockDocumentRepository, MockMediaStore,
};
use crate::domain::{DocumentType, ErrorCode, RelatedModel, Role};
use crate::test_support::{FixtureClock, caller};

fn make_service(
    documents: MockDocumentRepository,
    store: MockMediaStore,
) -> MediaService<MockDocumentRepository> {
    MediaService::new(Arc::new(documents), Arc::new(store), FixtureClock::shared())
}

fn pdf(name: &str) -> UploadFile {
    UploadFile {
        file_name: name.to_owned(),
        mime_type: "application/pdf".to_owned(),
        bytes: Bytes::from_static(b"%PDF-1.7"),
    }
}

fn stored(public_id: &str) -> StoredObject {
    StoredObject {
        url: format!("https://cdn.example/{public_id}"),
        public_id: public_id.to_owned(),
    }
}

fn saved_document(owner: UserId, public_id: &str) -> Document {
    let now = FixtureClock::shared().utc();
    Document {
        id: DocumentId::random(),
        uploaded_by: owner,
        name: "pan.pdf".to_owned(),
        kind: DocumentType::Kyc,
        category: None,
        url: format!("https://cdn.example/{public_id}"),
        public_id: public_id.to_owned(),
        file_size: Some(8),
        mime_type: Some("application/pdf".to_owned()),
        related_model: None,
        related_id: None,
        is_public: false,
        status: DocumentStatus::Pending,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn upload_without_type_lands_in_caller_folder() {
    let user = caller(&[Role::Tenant]);
    let expected = format!("rentfit/users/{}", user.user_id);
    let mut store = MockMediaStore::new();
    store
        .expect_upload()
        .withf(move |_, folder| folder.as_str() == expected)
        .times(1)
        .return_once(|_, _| Ok(stored("rentfit/users/x/pan")));
    let mut documents = MockDocumentRepository::new();
    documents.expect_insert().times(0);

    let uploaded = make_service(documents, store)
        .upload(&user, vec![pdf("pan.pdf")], UploadOptions::default())
        .await
        .expect("uploaded");

    assert_eq!(uploaded.len(), 1);
    assert_eq!(uploaded[0].file_name, "pan.pdf");
    assert_eq!(uploaded[0].file_size, 8);
    assert!(uploaded[0].document.is_none());
}

#[tokio::test]
async fn upload_can_record_pending_private_documents() {
    let user = caller(&[Role::Tenant]);
    let owner = user.user_id;
    let related = uuid::Uuid::new_v4();
    let mut store = MockMediaStore::new();
    store
        .expect_upload()
        .withf(|_, folder| folder.as_str() == "rentfit/kyc/pan")
        .times(2)
        .returning(|file, _| Ok(stored(&file.file_name)));
    let mut documents = MockDocumentRepository::new();
    documents
        .expect_insert()
        .withf(move |document| {
            document.uploaded_by == owner
                && document.kind == DocumentType::Kyc
                && document.category.as_deref() == Some("pan")
                && document.related_model == Some(RelatedModel::User)
                && document.related_id == Some(related)
                && !document.is_public
                && document.status == DocumentStatus::Pending
        })
        .times(2)
        .returning(|_| Ok(()));

    let options = UploadOptions {
        kind: Some(DocumentType::Kyc),
        category: Some("pan".to_owned()),
        related_model: Some(RelatedModel::User),
        related_id: Some(related),
        save_to_documents: true,
    };
    let uploaded = make_service(documents, store)
        .upload(&user, vec![pdf("front.pdf"), pdf("back.pdf")], options)
        .await
        .expect("uploaded");

    assert_eq!(uploaded.len(), 2);
    assert!(uploaded.iter().all(|file| file.document.is_some()));
}

#[tokio::test]
async fn upload_rejects_path_like_category() {
    let mut store = MockMediaStore::new();
    store.expect_upload().times(0);

    let options = UploadOptions {
        kind: Some(DocumentType::Receipt),
        category: Some("../../other".to_owned()),
        ..UploadOptions::default()
    };
    let error = make_service(MockDocumentRepository::new(), store)
        .upload(&caller(&[Role::Tenant]), vec![pdf("a.pdf")], options)
        .await
        .expect_err("bad category");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn delete_without_documents_only_touches_store() {
    let mut store = MockMediaStore::new();
    store
        .expect_destroy()
        .withf(|public_id| public_id == "rentfit/kyc/pan")
        .times(1)
        .return_once(|_| Ok(()));
    let mut documents = MockDocumentRepository::new();
    documents.expect_find_by_public_id().times(0);
    documents.expect_delete().times(0);

    let deletion = make_service(documents, store)
        .delete(&caller(&[Role::Tenant]), "rentfit/kyc/pan", false)
        .await
        .expect("deleted");

    assert_eq!(deletion.document_id, None);
}

#[tokio::test]
async fn delete_with_documents_requires_ownership() {
    let mut store = MockMediaStore::new();
    store.expect_destroy().times(0);
    let mut documents = MockDocumentRepository::new();
    documents
        .expect_find_by_public_id()
        .times(1)
        .return_once(|_, _| Ok(None));

    let error = make_service(documents, store)
        .delete(&caller(&[Role::Tenant]), "rentfit/kyc/pan", true)
        .await
        .expect_err("not mine");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn delete_with_documents_removes_object_before_metadata() {
    let user = caller(&[Role::Tenant]);
    let document = saved_document(user.user_id, "rentfit/kyc/pan");
    let document_id = document.id;
    let mut sequence = Sequence::new();
    let mut documents = MockDocumentRepository::new();
    let mut store = MockMediaStore::new();
    documents
        .expect_find_by_public_id()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(move |_, _| Ok(Some(document)));
    store
        .expect_destroy()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_| Ok(()));
    documents
        .expect_delete()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_, _| Ok(true));

    let deletion = make_service(documents, store)
        .delete(&user, "rentfit/kyc/pan", true)
        .await
        .expect("deleted");

    assert_eq!(deletion.document_id, Some(document_id));
}

#[tokio::test]
async fn delete_surfaces_metadata_failure_after_object_removal() {
    let user = caller(&[Role::Tenant]);
    let document = saved_document(user.user_id, "rentfit/kyc/pan");
    let mut documents = MockDocumentRepository::new();
    documents
        .expect_find_by_public_id()
        .times(1)
        .return_once(move |_, _| Ok(Some(document)));
    documents
        .expect_delete()
        .times(1)
        .return_once(|_, _| Err(DocumentPersistenceError::connection("reset")));
    let mut store = MockMediaStore::new();
    store.expect_destroy().times(1).return_once(|_| Ok(()));

    let error = make_service(documents, store)
        .delete(&user, "rentfit/kyc/pan", true)
        .await
        .expect_err("metadata failure");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn delete_keeps_metadata_when_store_fails() {
    let user = caller(&[Role::Tenant]);
    let document = saved_document(user.user_id, "rentfit/kyc/pan");
    let mut documents = MockDocumentRepository::new();
    documents
        .expect_find_by_public_id()
        .times(1)
        .return_once(move |_, _| Ok(Some(document)));
    documents.expect_delete().times(0);
    let mut store = MockMediaStore::new();
    store
        .expect_destroy()
        .times(1)
        .return_once(|_| Err(MediaStoreError::unconfigured()));

    let error = make_service(documents, store)
        .delete(&user, "rentfit/kyc/pan", true)
        .await
        .expect_err("store down");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

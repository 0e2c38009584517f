//! Media uploads through the HTTP surface with a recording media store.

mod support;

use actix_web::http::header;
use actix_web::test::TestRequest;
use serde_json::json;

use support::{Harness, bearer, call, property_body, register};

const BOUNDARY: &str = "media-flow-boundary";

enum Field<'a> {
    File {
        name: &'a str,
        file_name: &'a str,
        mime: &'a str,
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

fn multipart(uri: &str, fields: &[Field<'_>]) -> TestRequest {
    let mut body = String::new();
    for field in fields {
        body.push_str(&format!("--{BOUNDARY}\r\n"));
        match field {
            Field::File {
                name,
                file_name,
                mime,
            } => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n"
                ));
                body.push_str(&format!("Content-Type: {mime}\r\n\r\n"));
                body.push_str("file-bytes\r\n");
            }
            Field::Text { name, value } => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                ));
            }
        }
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    TestRequest::post()
        .uri(uri)
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}

#[actix_web::test]
async fn saved_upload_can_be_deleted_with_its_document() {
    let harness = Harness::new();
    let app = harness.app().await;
    let tenant = register(&app, "Kavya", "tenant").await;

    let (status, body) = call(
        &app,
        bearer(
            multipart(
                "/api/v1/media/upload",
                &[
                    Field::File {
                        name: "file",
                        file_name: "lease.pdf",
                        mime: "application/pdf",
                    },
                    Field::Text {
                        name: "type",
                        value: "agreement",
                    },
                    Field::Text {
                        name: "save_to_documents",
                        value: "true",
                    },
                ],
            ),
            &tenant.token,
        ),
    )
    .await;
    assert_eq!(status, 200, "{body}");
    let public_id = body["data"]["public_id"]
        .as_str()
        .expect("public id")
        .to_owned();
    assert_eq!(public_id, "rentfit/agreement/lease.pdf");
    assert_eq!(body["data"]["document"]["type"], json!("agreement"));

    let (status, body) = call(
        &app,
        bearer(
            TestRequest::delete().uri(&format!(
                "/api/v1/media/{public_id}?delete_from_documents=true"
            )),
            &tenant.token,
        ),
    )
    .await;
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["message"], json!("File and document deleted successfully"));
    assert_eq!(harness.media.destroyed(), vec![public_id]);
}

#[actix_web::test]
async fn upload_multiple_reports_the_count() {
    let harness = Harness::new();
    let app = harness.app().await;
    let tenant = register(&app, "Lata", "tenant").await;

    let (status, body) = call(
        &app,
        bearer(
            multipart(
                "/api/v1/media/upload-multiple",
                &[
                    Field::File {
                        name: "files",
                        file_name: "front.png",
                        mime: "image/png",
                    },
                    Field::File {
                        name: "files",
                        file_name: "back.png",
                        mime: "image/png",
                    },
                ],
            ),
            &tenant.token,
        ),
    )
    .await;

    assert_eq!(status, 200, "{body}");
    assert_eq!(body["data"]["count"], json!(2));
}

#[actix_web::test]
async fn disallowed_file_types_are_rejected() {
    let harness = Harness::new();
    let app = harness.app().await;
    let tenant = register(&app, "Meera", "tenant").await;

    let (status, body) = call(
        &app,
        bearer(
            multipart(
                "/api/v1/media/upload",
                &[Field::File {
                    name: "file",
                    file_name: "run.sh",
                    mime: "application/x-sh",
                }],
            ),
            &tenant.token,
        ),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(
        body["error"]["message"],
        json!("Invalid file type. Only images, videos, and PDFs are allowed.")
    );
    assert!(harness.media.destroyed().is_empty());
}

#[actix_web::test]
async fn landlord_attaches_photos_to_a_listing() {
    let harness = Harness::new();
    let app = harness.app().await;
    let landlord = register(&app, "Nikhil", "landlord").await;
    let (_, body) = call(
        &app,
        bearer(TestRequest::post().uri("/api/v1/properties"), &landlord.token)
            .set_json(property_body()),
    )
    .await;
    let property = body["data"]["property"]["id"]
        .as_str()
        .expect("property id")
        .to_owned();

    let (status, body) = call(
        &app,
        bearer(
            multipart(
                &format!("/api/v1/properties/{property}/media"),
                &[
                    Field::File {
                        name: "file",
                        file_name: "hall.jpg",
                        mime: "image/jpeg",
                    },
                    Field::Text {
                        name: "caption",
                        value: "Hall",
                    },
                ],
            ),
            &landlord.token,
        ),
    )
    .await;

    assert_eq!(status, 200, "{body}");
    assert_eq!(body["data"]["media"][0]["caption"], json!("Hall"));
    assert_eq!(
        body["data"]["media"][0]["url"],
        json!(format!(
            "https://media.example.test/rentfit/properties/{property}/hall.jpg"
        ))
    );
}

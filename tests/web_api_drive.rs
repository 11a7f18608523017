//! Web API Drive Tests
//!
//! Integration tests for file, folder, and activity endpoints, including
//! quota enforcement.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::{json, Value};

use common::{bearer, create_test_server, register_and_login, TEST_STORAGE_LIMIT};

/// Build a multipart form carrying one file of `size` zero bytes.
fn upload_form(name: &str, size: usize) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(vec![0u8; size])
            .file_name(name.to_string())
            .mime_type("application/octet-stream"),
    )
}

async fn upload(server: &TestServer, token: &str, name: &str, size: usize) -> Value {
    let response = server
        .post("/api/files")
        .add_header(AUTHORIZATION, bearer(token))
        .multipart(upload_form(name, size))
        .await;

    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

async fn profile(server: &TestServer, token: &str) -> Value {
    server
        .get("/api/user/profile")
        .add_header(AUTHORIZATION, bearer(token))
        .await
        .json::<Value>()
}

async fn create_folder(server: &TestServer, token: &str, name: &str, parent: Option<i64>) -> i64 {
    let response = server
        .post("/api/folders")
        .add_header(AUTHORIZATION, bearer(token))
        .json(&json!({ "name": name, "parent": parent }))
        .await;

    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_upload_single_file() {
    let (server, _db, store) = create_test_server().await;
    let token = register_and_login(&server, "Ada", "ada@example.com").await;

    let body = upload(&server, &token, "report.pdf", 500).await;

    let files = body["data"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], "report.pdf");
    assert_eq!(files[0]["size"], 500);
    // Storage internals stay hidden
    assert!(files[0].get("storageKey").is_none());
    assert!(files[0].get("storage_key").is_none());

    assert_eq!(store.len(), 1);
    assert_eq!(profile(&server, &token).await["data"]["storageUsed"], 500);
}

#[tokio::test]
async fn test_upload_over_quota_rejected_with_no_side_effects() {
    let (server, _db, store) = create_test_server().await;
    let token = register_and_login(&server, "Ada", "ada@example.com").await;

    let response = server
        .post("/api/files")
        .add_header(AUTHORIZATION, bearer(&token))
        .multipart(upload_form("huge.bin", TEST_STORAGE_LIMIT as usize + 1))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "QUOTA_EXCEEDED");

    // Nothing was stored, charged, or listed
    assert!(store.is_empty());
    let prof = profile(&server, &token).await;
    assert_eq!(prof["data"]["storageUsed"], 0);
    assert_eq!(prof["data"]["totalFiles"], 0);
}

#[tokio::test]
async fn test_upload_batch_is_all_or_nothing() {
    let (server, _db, store) = create_test_server().await;
    let token = register_and_login(&server, "Ada", "ada@example.com").await;

    // Each file fits alone; together they exceed the quota.
    let half = (TEST_STORAGE_LIMIT / 2) as usize;
    let form = MultipartForm::new()
        .add_part(
            "file",
            Part::bytes(vec![0u8; half + 1])
                .file_name("a.bin")
                .mime_type("application/octet-stream"),
        )
        .add_part(
            "file",
            Part::bytes(vec![0u8; half + 1])
                .file_name("b.bin")
                .mime_type("application/octet-stream"),
        );

    let response = server
        .post("/api/files")
        .add_header(AUTHORIZATION, bearer(&token))
        .multipart(form)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(store.is_empty());
    assert_eq!(profile(&server, &token).await["data"]["storageUsed"], 0);
}

#[tokio::test]
async fn test_upload_failure_mid_batch_rolls_back() {
    let (server, _db, store) = create_test_server().await;
    let token = register_and_login(&server, "Ada", "ada@example.com").await;

    store.fail_puts_after(1);

    let form = MultipartForm::new()
        .add_part(
            "file",
            Part::bytes(vec![0u8; 100])
                .file_name("ok.bin")
                .mime_type("application/octet-stream"),
        )
        .add_part(
            "file",
            Part::bytes(vec![0u8; 100])
                .file_name("fails.bin")
                .mime_type("application/octet-stream"),
        );

    let response = server
        .post("/api/files")
        .add_header(AUTHORIZATION, bearer(&token))
        .multipart(form)
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    // The first blob was rolled back and the reservation released
    assert!(store.is_empty());
    let prof = profile(&server, &token).await;
    assert_eq!(prof["data"]["storageUsed"], 0);
    assert_eq!(prof["data"]["totalFiles"], 0);
}

#[tokio::test]
async fn test_empty_upload_rejected() {
    let (server, _db, _store) = create_test_server().await;
    let token = register_and_login(&server, "Ada", "ada@example.com").await;

    // A form without any file parts is an empty batch
    let response = server
        .post("/api/files")
        .add_header(AUTHORIZATION, bearer(&token))
        .multipart(MultipartForm::new().add_text("folder", ""))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // A body with no fields at all never parses as a batch
    let response = server
        .post("/api/files")
        .add_header(AUTHORIZATION, bearer(&token))
        .multipart(MultipartForm::new())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_file_reclaims_quota() {
    let (server, _db, store) = create_test_server().await;
    let token = register_and_login(&server, "Ada", "ada@example.com").await;

    let body = upload(&server, &token, "temp.bin", 400).await;
    let file_id = body["data"][0]["id"].as_i64().unwrap();

    let response = server
        .delete(&format!("/api/files/{file_id}"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();

    assert!(store.is_empty());
    assert_eq!(profile(&server, &token).await["data"]["storageUsed"], 0);

    // Deleting again is a 404
    let response = server
        .delete(&format!("/api/files/{file_id}"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_returns_presigned_url() {
    let (server, _db, _store) = create_test_server().await;
    let token = register_and_login(&server, "Ada", "ada@example.com").await;

    let body = upload(&server, &token, "notes.txt", 50).await;
    let file_id = body["data"][0]["id"].as_i64().unwrap();

    let response = server
        .get(&format!("/api/files/{file_id}/download"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert!(body["data"]["downloadUrl"]
        .as_str()
        .unwrap()
        .starts_with("memory://"));
    assert_eq!(body["data"]["filename"], "notes.txt");
}

#[tokio::test]
async fn test_rename_file_round_trip() {
    let (server, _db, _store) = create_test_server().await;
    let token = register_and_login(&server, "Ada", "ada@example.com").await;

    let body = upload(&server, &token, "draft.txt", 10).await;
    let file_id = body["data"][0]["id"].as_i64().unwrap();

    let response = server
        .patch(&format!("/api/files/{file_id}/rename"))
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "name": "final.txt" }))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["data"]["name"], "final.txt");
    assert_eq!(body["data"]["originalName"], "draft.txt");
}

#[tokio::test]
async fn test_star_file_toggles() {
    let (server, _db, _store) = create_test_server().await;
    let token = register_and_login(&server, "Ada", "ada@example.com").await;

    let body = upload(&server, &token, "fav.txt", 10).await;
    let file_id = body["data"][0]["id"].as_i64().unwrap();

    let url = format!("/api/files/{file_id}/star");

    let first = server
        .patch(&url)
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json::<Value>();
    assert_eq!(first["data"]["isStarred"], true);

    let second = server
        .patch(&url)
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json::<Value>();
    assert_eq!(second["data"]["isStarred"], false);
}

#[tokio::test]
async fn test_files_are_owner_scoped() {
    let (server, _db, _store) = create_test_server().await;
    let ada = register_and_login(&server, "Ada", "ada@example.com").await;
    let eve = register_and_login(&server, "Eve", "eve@example.com").await;

    let body = upload(&server, &ada, "secret.txt", 10).await;
    let file_id = body["data"][0]["id"].as_i64().unwrap();

    for url in [
        format!("/api/files/{file_id}"),
        format!("/api/files/{file_id}/download"),
    ] {
        let response = server
            .get(&url)
            .add_header(AUTHORIZATION, bearer(&eve))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    let response = server
        .delete(&format!("/api/files/{file_id}"))
        .add_header(AUTHORIZATION, bearer(&eve))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    // Still there for the owner
    let response = server
        .get(&format!("/api/files/{file_id}"))
        .add_header(AUTHORIZATION, bearer(&ada))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_folder_item_count() {
    let (server, _db, _store) = create_test_server().await;
    let token = register_and_login(&server, "Ada", "ada@example.com").await;

    let parent = create_folder(&server, &token, "Parent", None).await;
    create_folder(&server, &token, "Child", Some(parent)).await;

    // One file inside the parent
    let form = MultipartForm::new()
        .add_text("folder", parent.to_string())
        .add_part(
            "file",
            Part::bytes(vec![0u8; 10])
                .file_name("inside.txt")
                .mime_type("text/plain"),
        );
    server
        .post("/api/files")
        .add_header(AUTHORIZATION, bearer(&token))
        .multipart(form)
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .get("/api/folders")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    let folders = body["data"].as_array().unwrap();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0]["name"], "Parent");
    assert_eq!(folders[0]["itemCount"], 2);
}

#[tokio::test]
async fn test_folder_detail_lists_contents() {
    let (server, _db, _store) = create_test_server().await;
    let token = register_and_login(&server, "Ada", "ada@example.com").await;

    let parent = create_folder(&server, &token, "Docs", None).await;
    create_folder(&server, &token, "Sub", Some(parent)).await;

    let response = server
        .get(&format!("/api/folders/{parent}"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["data"]["folder"]["name"], "Docs");
    assert_eq!(body["data"]["folders"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["files"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_trash_folder_cascades_and_hides() {
    let (server, _db, _store) = create_test_server().await;
    let token = register_and_login(&server, "Ada", "ada@example.com").await;

    let root = create_folder(&server, &token, "Root", None).await;
    let child = create_folder(&server, &token, "Child", Some(root)).await;

    let response = server
        .delete(&format!("/api/folders/{root}"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();

    // Both levels vanish from listings
    let body = server
        .get("/api/folders")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json::<Value>();
    assert!(body["data"].as_array().unwrap().is_empty());

    let body = server
        .get(&format!("/api/folders?parent={root}"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json::<Value>();
    assert!(body["data"].as_array().unwrap().is_empty());

    // Uploading into a trashed folder is rejected
    let form = MultipartForm::new()
        .add_text("folder", child.to_string())
        .add_part(
            "file",
            Part::bytes(vec![0u8; 10])
                .file_name("late.txt")
                .mime_type("text/plain"),
        );
    let response = server
        .post("/api/files")
        .add_header(AUTHORIZATION, bearer(&token))
        .multipart(form)
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_move_folder_rejects_cycle() {
    let (server, _db, _store) = create_test_server().await;
    let token = register_and_login(&server, "Ada", "ada@example.com").await;

    let a = create_folder(&server, &token, "A", None).await;
    let b = create_folder(&server, &token, "B", Some(a)).await;

    let response = server
        .patch(&format!("/api/folders/{a}"))
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "parent": b }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_move_folder_to_root_with_null_parent() {
    let (server, _db, _store) = create_test_server().await;
    let token = register_and_login(&server, "Ada", "ada@example.com").await;

    let a = create_folder(&server, &token, "A", None).await;
    let b = create_folder(&server, &token, "B", Some(a)).await;

    let response = server
        .patch(&format!("/api/folders/{b}"))
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "parent": null }))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert!(body["data"]["parentId"].is_null());

    // Name-only update leaves the parent alone
    let response = server
        .patch(&format!("/api/folders/{b}"))
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "name": "B2" }))
        .await;
    let body = response.json::<Value>();
    assert_eq!(body["data"]["name"], "B2");
    assert!(body["data"]["parentId"].is_null());
}

#[tokio::test]
async fn test_activity_trail() {
    let (server, _db, _store) = create_test_server().await;
    let token = register_and_login(&server, "Ada", "ada@example.com").await;

    let body = upload(&server, &token, "tracked.txt", 10).await;
    let file_id = body["data"][0]["id"].as_i64().unwrap();

    server
        .patch(&format!("/api/files/{file_id}/star"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();

    let response = server
        .get("/api/recent-activity")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    // Newest first
    assert_eq!(entries[0]["action"], "starred");
    assert_eq!(entries[1]["action"], "uploaded");
    assert_eq!(entries[0]["itemName"], "tracked.txt");
}

#[tokio::test]
async fn test_activity_survives_item_deletion() {
    let (server, _db, _store) = create_test_server().await;
    let token = register_and_login(&server, "Ada", "ada@example.com").await;

    let body = upload(&server, &token, "fleeting.txt", 10).await;
    let file_id = body["data"][0]["id"].as_i64().unwrap();

    server
        .delete(&format!("/api/files/{file_id}"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();

    let body = server
        .get("/api/recent-activity")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json::<Value>();

    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries[0]["action"], "deleted");
    // The item is gone, so its name can no longer be resolved
    assert!(entries[0]["itemName"].is_null());
}

#[tokio::test]
async fn test_clear_activity() {
    let (server, _db, _store) = create_test_server().await;
    let token = register_and_login(&server, "Ada", "ada@example.com").await;

    upload(&server, &token, "noise.txt", 10).await;

    server
        .delete("/api/recent-activity")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();

    let body = server
        .get("/api/recent-activity")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json::<Value>();
    assert!(body["data"].as_array().unwrap().is_empty());

    // Clearing an empty trail is fine
    server
        .delete("/api/recent-activity")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_activity_is_owner_scoped() {
    let (server, _db, _store) = create_test_server().await;
    let ada = register_and_login(&server, "Ada", "ada@example.com").await;
    let eve = register_and_login(&server, "Eve", "eve@example.com").await;

    upload(&server, &ada, "mine.txt", 10).await;

    let body = server
        .get("/api/recent-activity")
        .add_header(AUTHORIZATION, bearer(&eve))
        .await
        .json::<Value>();

    assert!(body["data"].as_array().unwrap().is_empty());
}

use anyhow::Result;
use mockito::{Matcher, Server, ServerGuard};

use submissions_admin_bot::db::{SubmissionRepository, SupabaseClient};

const PATH: &str = "/rest/v1/submissions";
const KEY: &str = "anon-key";

fn rows_json() -> &'static str {
    r#"[
        {
            "id": 12,
            "winner_id": "W42",
            "full_name": "Ana Diaz",
            "email": "ana@example.com",
            "phone": "+34 600 000 000",
            "address": "Calle Mayor 1",
            "payment_preference": "bank transfer",
            "delivery_company": "DHL",
            "heard_from": "instagram",
            "submitted_at": "2024-05-01T10:00:00+00:00",
            "created_at": "2024-05-01T10:00:01.5+00:00",
            "driver_license_front": "https://cdn.example.com/front.jpg",
            "driver_license_back": null
        },
        {
            "id": 9,
            "winner_id": "W42",
            "full_name": "Ana Diaz",
            "created_at": "2024-04-01T08:00:00+00:00"
        }
    ]"#
}

fn client(server: &ServerGuard) -> Result<SupabaseClient> {
    // Trailing slash must not produce a double slash in the endpoint
    SupabaseClient::new(&format!("{}/", server.url()), KEY)
}

#[tokio::test]
async fn test_list_recent_orders_and_caps() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("select".into(), "*".into()),
            Matcher::UrlEncoded("order".into(), "created_at.desc".into()),
            Matcher::UrlEncoded("limit".into(), "999".into()),
        ]))
        .match_header("apikey", KEY)
        .match_header("authorization", "Bearer anon-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(rows_json())
        .create_async()
        .await;

    let rows = client(&server)?.list_recent(999).await?;

    mock.assert_async().await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, 12);
    assert_eq!(rows[0].heard_from.as_deref(), Some("instagram"));
    assert_eq!(rows[1].email, None);
    Ok(())
}

#[tokio::test]
async fn test_find_by_winner_id_filters_with_equality() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("winner_id".into(), "eq.W 42&x".into()),
            Matcher::UrlEncoded("order".into(), "created_at.desc".into()),
        ]))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let rows = client(&server)?.find_by_winner_id("W 42&x").await?;

    mock.assert_async().await;
    assert!(rows.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_find_by_id_returns_single_row() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("id".into(), "eq.12".into()),
            Matcher::UrlEncoded("limit".into(), "1".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"[{"id": 12, "winner_id": "W42", "driver_license_front": "https://cdn.example.com/front.jpg"}]"#,
        )
        .create_async()
        .await;

    let row = client(&server)?.find_by_id(12).await?;

    mock.assert_async().await;
    let row = row.expect("submission 12");
    assert_eq!(row.winner_id, "W42");
    assert_eq!(
        row.driver_license_front.as_deref(),
        Some("https://cdn.example.com/front.jpg")
    );
    Ok(())
}

#[tokio::test]
async fn test_find_by_id_absent() -> Result<()> {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", PATH)
        .match_query(Matcher::UrlEncoded("id".into(), "eq.404".into()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    assert_eq!(client(&server)?.find_by_id(404).await?, None);
    Ok(())
}

#[tokio::test]
async fn test_error_status_is_reported() -> Result<()> {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", PATH)
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"message":"Invalid API key"}"#)
        .create_async()
        .await;

    let err = client(&server)?.list_recent(999).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("401"), "unexpected error: {message}");
    assert!(message.contains("Invalid API key"), "unexpected error: {message}");
    Ok(())
}

#[tokio::test]
async fn test_malformed_body_is_an_error() -> Result<()> {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"not": "an array"}"#)
        .create_async()
        .await;

    assert!(client(&server)?.find_by_winner_id("W42").await.is_err());
    Ok(())
}

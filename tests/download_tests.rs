use anyhow::Result;
use mockito::Server;

use submissions_admin_bot::download::{ensure_work_dir, FileFetcher, HttpFetcher};

#[tokio::test]
async fn test_fetch_streams_body_to_disk() -> Result<()> {
    let mut server = Server::new_async().await;
    let body = vec![7u8; 64 * 1024];
    let mock = server
        .mock("GET", "/storage/front.jpg")
        .with_status(200)
        .with_header("content-type", "image/jpeg")
        .with_body(body.clone())
        .create_async()
        .await;

    let dir = tempfile::tempdir()?;
    let destination = dir.path().join("W42_front_1.jpg");
    let written = HttpFetcher::default()
        .fetch(&format!("{}/storage/front.jpg", server.url()), &destination)
        .await?;

    mock.assert_async().await;
    assert_eq!(written, body.len() as u64);
    assert_eq!(std::fs::read(&destination)?, body);
    Ok(())
}

#[tokio::test]
async fn test_http_error_leaves_no_file() -> Result<()> {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/storage/missing.jpg")
        .with_status(404)
        .with_body("not found")
        .create_async()
        .await;

    let dir = tempfile::tempdir()?;
    let destination = dir.path().join("W42_back_1.jpg");
    let result = HttpFetcher::default()
        .fetch(&format!("{}/storage/missing.jpg", server.url()), &destination)
        .await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("404"), "unexpected error: {err}");
    assert!(!destination.exists());
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_host_leaves_no_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let destination = dir.path().join("W1_front_1.png");
    // Port 9 (discard) is closed on test machines
    let result = HttpFetcher::default()
        .fetch("http://127.0.0.1:9/front.png", &destination)
        .await;

    assert!(result.is_err());
    assert!(!destination.exists());
    Ok(())
}

#[tokio::test]
async fn test_existing_destination_is_never_overwritten() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/storage/front.jpg")
        .with_body("new")
        .expect(0)
        .create_async()
        .await;

    let dir = tempfile::tempdir()?;
    let destination = dir.path().join("W42_front_1.jpg");
    std::fs::write(&destination, "original")?;

    let result = HttpFetcher::default()
        .fetch(&format!("{}/storage/front.jpg", server.url()), &destination)
        .await;

    assert!(result.is_err());
    assert_eq!(std::fs::read_to_string(&destination)?, "original");
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_work_dir_is_created_once() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let work_dir = dir.path().join("nested").join("temp");

    ensure_work_dir(&work_dir).await?;
    assert!(work_dir.is_dir());

    // Second call on an existing directory succeeds
    ensure_work_dir(&work_dir).await?;
    Ok(())
}

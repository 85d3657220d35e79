use crate::helpers::spawn_app;

#[tokio::test]
async fn health_check() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/health_check", app.addr))
        .send()
        .await
        .expect("execute request");
    assert!(resp.status().is_success());
    assert_eq!(resp.content_length(), Some(0)); // empty body
}

/// Health checks must not reach out to any collaborator
#[tokio::test]
async fn health_check_is_local() {
    let app = spawn_app().await;
    app.mock_collaborators(0).await;

    let resp = reqwest::get(format!("http://127.0.0.1:{}/health_check", app.port))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

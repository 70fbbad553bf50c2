use capcut_cookie_sync::api::AccountClient;
use capcut_cookie_sync::cookies::{normalize, RawCookie};
use capcut_cookie_sync::error::SyncError;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn captured_cookie() -> RawCookie {
    RawCookie {
        name: "sid_guard".to_string(),
        value: "token".to_string(),
        domain: ".capcut.com".to_string(),
        path: Some("/".to_string()),
        expires: Some(1_900_000_000.0),
        http_only: Some(true),
        secure: Some(true),
        same_site: Some("None".to_string()),
    }
}

#[tokio::test]
async fn fetch_decodes_account_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/capcut-accounts/without-cookie"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"[{"id":1,"email":"a@x.com","password":"p"},{"id":2,"email":"b@x.com","password":"q"}]"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let client = AccountClient::new(server.uri()).unwrap();
    let accounts = client.fetch_accounts_needing_cookies().await.unwrap();

    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0].id, 1);
    assert_eq!(accounts[0].email, "a@x.com");
    assert_eq!(accounts[1].password, "q");
}

#[tokio::test]
async fn fetch_may_return_empty_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/capcut-accounts/without-cookie"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
        .mount(&server)
        .await;

    let client = AccountClient::new(server.uri()).unwrap();
    let accounts = client.fetch_accounts_needing_cookies().await.unwrap();

    assert!(accounts.is_empty());
}

#[tokio::test]
async fn fetch_error_carries_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/capcut-accounts/without-cookie"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = AccountClient::new(server.uri()).unwrap();
    let err = client.fetch_accounts_needing_cookies().await.unwrap_err();

    assert!(matches!(err, SyncError::Fetch { status } if status.as_u16() == 500));
}

#[tokio::test]
async fn upload_puts_json_payload() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/capcut-accounts/7/cookie"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "url": "https://www.capcut.com",
            "cookies": [{
                "name": "sid_guard",
                "hostOnly": false,
                "session": false,
                "sameSite": "no_restriction",
                "storeId": "0",
                "expirationDate": 1_900_000_000.0
            }]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"ok":true}"#, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let payload = normalize(&[captured_cookie()]).unwrap();
    let client = AccountClient::new(server.uri()).unwrap();
    let ack = client.upload_cookies(7, &payload).await.unwrap();

    assert_eq!(ack["ok"], true);
}

#[tokio::test]
async fn upload_error_carries_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/capcut-accounts/7/cookie"))
        .respond_with(ResponseTemplate::new(422).set_body_string("cookie set rejected"))
        .mount(&server)
        .await;

    let payload = normalize(&[captured_cookie()]).unwrap();
    let client = AccountClient::new(server.uri()).unwrap();
    let err = client.upload_cookies(7, &payload).await.unwrap_err();

    match err {
        SyncError::Upload { status, body } => {
            assert_eq!(status.as_u16(), 422);
            assert_eq!(body, "cookie set rejected");
        }
        other => panic!("expected Upload error, got {other:?}"),
    }
}

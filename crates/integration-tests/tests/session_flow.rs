//! Sign-in, bearer injection and the 401 policy.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use petalbox_client::{ApiError, FileSessionStore, SessionContext, SessionEvent};
use petalbox_core::{Email, Role};
use petalbox_integration_tests::{StubBackend, customer_user, sign_in, staff_user};
use serde_json::{Value, json};

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Token expired"})),
    )
}

#[tokio::test]
async fn test_login_stores_session_and_sends_bearer() {
    let backend = StubBackend::spawn(
        Router::new()
            .route(
                "/auth/login",
                post(|| async { Json(json!({"token": "tok-staff", "user": staff_user()})) }),
            )
            .route(
                "/staff/deliveries",
                get(|| async { Json(json!({"deliveries": []})) }),
            ),
    )
    .await;
    let client = backend.client();

    let email = Email::parse("lan@petalbox.shop").unwrap();
    let identity = client.login(&email, "correct horse").await.unwrap();
    assert_eq!(identity.highest_role(), Some(Role::Staff));
    assert!(client.session().has_token());

    client.staff_deliveries().await.unwrap();

    let login = backend.last_request("POST", "/auth/login").unwrap();
    assert_eq!(login.authorization, None);
    let board = backend.last_request("GET", "/staff/deliveries").unwrap();
    assert_eq!(board.authorization.as_deref(), Some("Bearer tok-staff"));
}

#[tokio::test]
async fn test_rejected_login_keeps_anonymous_session() {
    let backend = StubBackend::spawn(
        Router::new().route("/auth/login", post(|| async { unauthorized() })),
    )
    .await;
    let client = backend.client();

    let email = Email::parse("lan@petalbox.shop").unwrap();
    let err = client.login(&email, "wrong").await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Unauthorized {
            session_cleared: false
        }
    ));
    assert!(!client.session().has_token());
}

#[tokio::test]
async fn test_401_signs_out_and_notifies() {
    let backend = StubBackend::spawn(
        Router::new().route("/staff/orders", get(|| async { unauthorized() })),
    )
    .await;
    let client = backend.client();
    sign_in(&client, "tok-old", staff_user());
    let mut events = client.session().subscribe();

    let err = client.staff_orders().await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Unauthorized {
            session_cleared: true
        }
    ));
    assert_eq!(
        err.user_message(),
        "Your session has expired. Please sign in again."
    );
    assert!(!client.session().has_token());
    assert!(client.session().identity().is_none());
    assert!(matches!(events.recv().await.unwrap(), SessionEvent::SignedOut));
}

#[tokio::test]
async fn test_google_session_survives_401() {
    let backend = StubBackend::spawn(
        Router::new()
            .route(
                "/auth/google",
                post(|| async { Json(json!({"accessToken": "tok-google", "user": customer_user()})) }),
            )
            .route("/subscriptions", get(|| async { unauthorized() })),
    )
    .await;
    let client = backend.client();

    let identity = client.google_login("google-id-token").await.unwrap();
    assert!(identity.is_third_party());

    let err = client.list_subscriptions().await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Unauthorized {
            session_cleared: false
        }
    ));
    assert!(client.session().has_token());
}

#[tokio::test]
async fn test_public_catalog_never_sends_token() {
    let backend = StubBackend::spawn(
        Router::new()
            .route(
                "/packages",
                get(|| async {
                    Json(json!({"data": {"packages": [
                        {"id": "weekly", "name": "Weekly Bloom", "price": 350000},
                        {"_id": "rose", "title": "Rose Box", "price": "499000.00"}
                    ]}}))
                }),
            )
            .route("/packages/{id}", get(|| async { unauthorized() })),
    )
    .await;
    let client = backend.client();
    sign_in(&client, "tok-customer", customer_user());

    let packages = client.list_packages().await.unwrap();
    assert_eq!(packages.len(), 2);
    assert_eq!(packages.get(1).unwrap().name, "Rose Box");

    // A 401 on a public call does not touch the session.
    let err = client.get_package("weekly").await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Unauthorized {
            session_cleared: false
        }
    ));
    assert!(client.session().has_token());

    assert!(
        backend
            .requests()
            .iter()
            .all(|r| r.authorization.is_none())
    );
}

#[tokio::test]
async fn test_file_session_shared_between_clients() {
    let backend = StubBackend::spawn(Router::new().route(
        "/auth/login",
        post(|| async { Json(json!({"data": {"token": "tok-file", "user": customer_user()}})) }),
    ))
    .await;
    let path = std::env::temp_dir()
        .join(format!("petalbox-it-{}", uuid::Uuid::new_v4()))
        .join("session.json");

    let first = backend.client_with(SessionContext::new(FileSessionStore::new(&path)));
    let email = Email::parse("mai@example.com").unwrap();
    first.login(&email, "secret-pass").await.unwrap();

    let second = backend.client_with(SessionContext::new(FileSessionStore::new(&path)));
    assert!(second.session().has_token());
    assert_eq!(
        second.session().identity().unwrap().name().as_deref(),
        Some("Mai Pham")
    );

    second.logout().unwrap();
    assert!(matches!(
        first.session().reload().unwrap(),
        Some(SessionEvent::SignedOut)
    ));
    assert!(!first.session().has_token());

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

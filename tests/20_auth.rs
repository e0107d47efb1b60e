mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn protected_routes_require_a_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for path in ["/log-out", "/add-note", "/update-note", "/delete-note"] {
        let res = client.post(server.url(path)).json(&json!({})).send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{} without token", path);
    }

    let res = client.get(server.url("/get-all-notes")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Incorrect header input");
    Ok(())
}

#[tokio::test]
async fn wrong_method_on_protected_route_is_405_without_a_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for path in ["/log-out", "/add-note", "/update-note", "/delete-note"] {
        let res = client.get(server.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED, "GET {}", path);
    }

    let res = client.post(server.url("/get-all-notes")).send().await?;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}

#[tokio::test]
async fn unknown_token_is_not_authorized() -> Result<()> {
    let server = common::ensure_server().await?;
    if !server.database_ready().await {
        return Ok(());
    }
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/get-all-notes"))
        .header("access_token", "never.issued.token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "The user is not authorized!");
    Ok(())
}

#[tokio::test]
async fn sign_up_sign_in_log_out() -> Result<()> {
    let server = common::ensure_server().await?;
    if !server.database_ready().await {
        return Ok(());
    }
    let client = reqwest::Client::new();
    let username = common::unique_username("flow");

    let tokens = common::sign_up_and_in(&client, &server, &username).await?;

    let res = client
        .post(server.url("/log-out"))
        .header("access_token", &tokens.access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Same token again: no longer on record
    let res = client
        .post(server.url("/log-out"))
        .header("access_token", &tokens.access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn duplicate_username_conflicts() -> Result<()> {
    let server = common::ensure_server().await?;
    if !server.database_ready().await {
        return Ok(());
    }
    let client = reqwest::Client::new();
    let creds = json!({ "username": common::unique_username("dup"), "password": "secret12" });

    let first = client.post(server.url("/sign-up")).json(&creds).send().await?;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = client.post(server.url("/sign-up")).json(&creds).send().await?;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn wrong_password_and_unknown_user_look_the_same() -> Result<()> {
    let server = common::ensure_server().await?;
    if !server.database_ready().await {
        return Ok(());
    }
    let client = reqwest::Client::new();
    let username = common::unique_username("pw");
    common::sign_up_and_in(&client, &server, &username).await?;

    let wrong = client
        .post(server.url("/sign-in"))
        .json(&json!({ "username": username, "password": "not the password" }))
        .send()
        .await?;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let wrong_body = wrong.json::<Value>().await?;

    let unknown = client
        .post(server.url("/sign-in"))
        .json(&json!({ "username": common::unique_username("ghost"), "password": "whatever1" }))
        .send()
        .await?;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown_body = unknown.json::<Value>().await?;

    assert_eq!(wrong_body["error"], unknown_body["error"]);
    Ok(())
}

#[tokio::test]
async fn update_token_rotates_the_pair() -> Result<()> {
    let server = common::ensure_server().await?;
    if !server.database_ready().await {
        return Ok(());
    }
    let client = reqwest::Client::new();
    let tokens = common::sign_up_and_in(&client, &server, &common::unique_username("rot")).await?;

    let res = client
        .post(server.url("/update-token"))
        .json(&json!({ "access_token": tokens.access, "refresh_token": tokens.refresh }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    let new_access = body["data"]["access_token"].as_str().unwrap().to_string();
    assert_ne!(new_access, tokens.access);

    // The old access token is gone, the new one works
    let old = client
        .get(server.url("/get-all-notes"))
        .header("access_token", &tokens.access)
        .send()
        .await?;
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);

    let new = client
        .get(server.url("/get-all-notes"))
        .header("access_token", &new_access)
        .send()
        .await?;
    assert_eq!(new.status(), StatusCode::OK);

    // Replaying the old pair fails
    let replay = client
        .post(server.url("/update-token"))
        .json(&json!({ "access_token": tokens.access, "refresh_token": tokens.refresh }))
        .send()
        .await?;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

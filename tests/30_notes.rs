mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn note_crud_flow() -> Result<()> {
    let server = common::ensure_server().await?;
    if !server.database_ready().await {
        return Ok(());
    }
    let client = reqwest::Client::new();
    let tokens = common::sign_up_and_in(&client, &server, &common::unique_username("crud")).await?;

    let list = client
        .get(server.url("/get-all-notes"))
        .header("access_token", &tokens.access)
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(list["data"]["notes"].as_array().map(Vec::len), Some(0));

    let res = client
        .post(server.url("/add-note"))
        .header("access_token", &tokens.access)
        .json(&json!({ "note": "buy milk" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let note_id = res.json::<Value>().await?["data"]["note_id"].as_i64().unwrap();

    // Bearer form is accepted too
    let res = client
        .post(server.url("/update-note"))
        .bearer_auth(&tokens.access)
        .json(&json!({ "note_id": note_id, "new_note": "buy oat milk" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let list = client
        .get(server.url("/get-all-notes"))
        .header("access_token", &tokens.access)
        .send()
        .await?
        .json::<Value>()
        .await?;
    let notes = list["data"]["notes"].as_array().cloned().unwrap_or_default();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["note_id"], note_id);
    assert_eq!(notes[0]["note"], "buy oat milk");

    let res = client
        .post(server.url("/delete-note"))
        .header("access_token", &tokens.access)
        .json(&json!({ "note_id": note_id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(server.url("/delete-note"))
        .header("access_token", &tokens.access)
        .json(&json!({ "note_id": note_id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], "there is no such note");

    let res = client
        .post(server.url("/update-note"))
        .header("access_token", &tokens.access)
        .json(&json!({ "note_id": note_id, "new_note": "too late" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], "there is no such note");
    Ok(())
}

#[tokio::test]
async fn notes_are_private_to_their_owner() -> Result<()> {
    let server = common::ensure_server().await?;
    if !server.database_ready().await {
        return Ok(());
    }
    let client = reqwest::Client::new();
    let alice = common::sign_up_and_in(&client, &server, &common::unique_username("alice")).await?;
    let bob = common::sign_up_and_in(&client, &server, &common::unique_username("bob")).await?;

    let note_id = client
        .post(server.url("/add-note"))
        .header("access_token", &alice.access)
        .json(&json!({ "note": "alice's secret" }))
        .send()
        .await?
        .json::<Value>()
        .await?["data"]["note_id"]
        .as_i64()
        .unwrap();

    let res = client
        .post(server.url("/update-note"))
        .header("access_token", &bob.access)
        .json(&json!({ "note_id": note_id, "new_note": "bob was here" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], "the user id does not match");

    let res = client
        .post(server.url("/delete-note"))
        .header("access_token", &bob.access)
        .json(&json!({ "note_id": note_id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let bobs = client
        .get(server.url("/get-all-notes"))
        .header("access_token", &bob.access)
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(bobs["data"]["notes"].as_array().map(Vec::len), Some(0));
    Ok(())
}

#[tokio::test]
async fn empty_note_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    if !server.database_ready().await {
        return Ok(());
    }
    let client = reqwest::Client::new();
    let tokens = common::sign_up_and_in(&client, &server, &common::unique_username("empty")).await?;

    let res = client
        .post(server.url("/add-note"))
        .header("access_token", &tokens.access)
        .json(&json!({ "note": "" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], "Incorrect data input");
    Ok(())
}

mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn login_required_for_ingredients() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/recipe/ingredients", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn retrieve_ingredients_ordered_by_name_desc() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_ready(server).await {
        eprintln!("skipping: database unavailable");
        return Ok(());
    }

    let (_email, token) = common::register_and_login(server, "ingr-list").await?;

    for name in ["Makkara", "Sinappi"] {
        let res = common::authed_post(
            server,
            &token,
            "/recipe/ingredients",
            &json!({ "name": name }),
        )
        .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = common::authed_get(server, &token, "/recipe/ingredients").await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();

    assert_eq!(names, vec!["Sinappi", "Makkara"]);

    Ok(())
}

#[tokio::test]
async fn ingredients_limited_to_user() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_ready(server).await {
        eprintln!("skipping: database unavailable");
        return Ok(());
    }

    let (_e1, token) = common::register_and_login(server, "ingr-own").await?;
    let (_e2, other_token) = common::register_and_login(server, "ingr-other").await?;

    common::authed_post(
        server,
        &other_token,
        "/recipe/ingredients",
        &json!({ "name": "Makkara" }),
    )
    .await?;
    common::authed_post(server, &token, "/recipe/ingredients", &json!({ "name": "Sinappi" }))
        .await?;

    let res = common::authed_get(server, &token, "/recipe/ingredients").await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["name"], "Sinappi");

    Ok(())
}

#[tokio::test]
async fn create_ingredient_successful() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_ready(server).await {
        eprintln!("skipping: database unavailable");
        return Ok(());
    }

    let (_email, token) = common::register_and_login(server, "ingr-create").await?;

    let res = common::authed_post(
        server,
        &token,
        "/recipe/ingredients",
        &json!({ "name": "Kurkuma" }),
    )
    .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = common::authed_get(server, &token, "/recipe/ingredients").await?;
    let body = res.json::<Value>().await?;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Kurkuma"));

    Ok(())
}

#[tokio::test]
async fn create_ingredient_invalid_name() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_ready(server).await {
        eprintln!("skipping: database unavailable");
        return Ok(());
    }

    let (_email, token) = common::register_and_login(server, "ingr-invalid").await?;

    let res =
        common::authed_post(server, &token, "/recipe/ingredients", &json!({ "name": "" })).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn retrieve_ingredients_assigned_and_unique() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_ready(server).await {
        eprintln!("skipping: database unavailable");
        return Ok(());
    }

    let (_email, token) = common::register_and_login(server, "ingr-assigned").await?;

    let res = common::authed_post(
        server,
        &token,
        "/recipe/ingredients",
        &json!({ "name": "Kananmuna" }),
    )
    .await?;
    let assigned = res.json::<Value>().await?["data"]["id"].as_str().unwrap().to_string();

    common::authed_post(server, &token, "/recipe/ingredients", &json!({ "name": "Jauho" }))
        .await?;

    // Two recipes referencing the same ingredient; it must come back once
    for title in ["Munakas", "Pannukakku"] {
        let res = common::authed_post(
            server,
            &token,
            "/recipe/recipes",
            &json!({
                "title": title,
                "time_minutes": 15,
                "price": 4.5,
                "ingredients": [assigned]
            }),
        )
        .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = common::authed_get(server, &token, "/recipe/ingredients?assigned_only=1").await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["name"], "Kananmuna");

    Ok(())
}

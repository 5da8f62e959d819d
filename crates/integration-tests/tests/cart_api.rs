//! Integration tests for the cart API endpoints.
//!
//! These tests require a running API server (`cargo run -p shopping-cart-api`).
//!
//! Run with: cargo test -p shopping-cart-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use shopping_cart_integration_tests::{TestContext, unique_username};

// ============================================================================
// Health & Root
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_health_and_readiness() {
    let ctx = TestContext::new();

    let resp = ctx.get("/health").await.expect("Failed to reach server");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("Failed to read body"), "ok");

    let resp = ctx.get("/health/ready").await.expect("Failed to reach server");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_api_root_lists_collections() {
    let ctx = TestContext::new();
    let resp = ctx.get("/").await.expect("Failed to reach server");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse JSON");
    for key in ["admin/items", "carts", "cartitems", "users"] {
        let url = body[key].as_str().expect("collection URL missing");
        assert!(url.ends_with(&format!("/{key}/")), "unexpected URL {url}");
    }
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_user_password_never_returned() {
    let ctx = TestContext::new();
    let username = unique_username("pw");

    let resp = ctx
        .post("/users/", &json!({ "username": username, "password": "secret" }))
        .await
        .expect("Failed to create user");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.expect("Failed to parse JSON");
    assert!(created.get("password").is_none());
    let id = created["id"].as_i64().expect("id missing");

    let resp = ctx.get(&format!("/users/{id}/")).await.expect("Failed to get user");
    let fetched: Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(fetched, json!({ "id": id, "username": username }));

    ctx.delete(&format!("/users/{id}/")).await.expect("Failed to clean up");
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_duplicate_username_rejected() {
    let ctx = TestContext::new();
    let username = unique_username("dup");
    let body = json!({ "username": username, "password": "secret" });

    let first = ctx.post("/users/", &body).await.expect("Failed to create user");
    assert_eq!(first.status(), StatusCode::CREATED);
    let id = first.json::<Value>().await.expect("Failed to parse JSON")["id"].clone();

    let second = ctx.post("/users/", &body).await.expect("Failed to post user");
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let errors: Value = second.json().await.expect("Failed to parse JSON");
    assert_eq!(
        errors,
        json!({ "username": ["A user with that username already exists."] })
    );

    ctx.delete(&format!("/users/{id}/")).await.expect("Failed to clean up");
}

// ============================================================================
// Carts
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_total_cost_sums_lines() {
    let ctx = TestContext::new();
    let (user, cart) = ctx.create_user_with_cart().await.expect("Failed to set up cart");
    let item1 = ctx.create_item("it-item1", "10.00").await.expect("Failed to create item");
    let item2 = ctx.create_item("it-item2", "20.00").await.expect("Failed to create item");
    ctx.create_cart_item(cart, item1, 1).await.expect("Failed to add line");
    ctx.create_cart_item(cart, item2, 2).await.expect("Failed to add line");

    let resp = ctx
        .get(&format!("/carts/{cart}/total_cost/"))
        .await
        .expect("Failed to get total cost");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body, json!({ "total_cost": 50.0 }));

    let resp = ctx.get(&format!("/carts/{cart}/")).await.expect("Failed to get cart");
    let body: Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["total_cost"], json!("50.00"));
    assert_eq!(body["items"].as_array().map(Vec::len), Some(2));

    for path in [
        format!("/users/{user}/"),
        format!("/admin/items/{item1}/"),
        format!("/admin/items/{item2}/"),
    ] {
        ctx.delete(&path).await.expect("Failed to clean up");
    }
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_cart_id_lookup() {
    let ctx = TestContext::new();
    let (user, cart) = ctx.create_user_with_cart().await.expect("Failed to set up cart");

    let resp = ctx
        .get(&format!("/carts/cart_id/?user={user}"))
        .await
        .expect("Failed to look up cart");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.json::<Value>().await.expect("Failed to parse JSON"),
        json!({ "cart": cart })
    );

    let resp = ctx.get("/carts/cart_id/").await.expect("Failed to reach server");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    ctx.delete(&format!("/users/{user}/")).await.expect("Failed to clean up");

    let resp = ctx
        .get(&format!("/carts/cart_id/?user={user}"))
        .await
        .expect("Failed to look up cart");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Cart items
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_cart_item_created_for_user() {
    let ctx = TestContext::new();
    let (user, cart) = ctx.create_user_with_cart().await.expect("Failed to set up cart");
    let item = ctx.create_item("it-by-user", "3.50").await.expect("Failed to create item");

    let resp = ctx
        .post("/cartitems/", &json!({ "user": user, "item": item }))
        .await
        .expect("Failed to create cart item");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["cart"], json!(cart));
    assert_eq!(body["quantity"], json!(1));

    let resp = ctx
        .post("/cartitems/", &json!({ "user": user, "item": item }))
        .await
        .expect("Failed to post cart item");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = ctx
        .get(&format!("/cartitems/?user={user}&cart={cart}"))
        .await
        .expect("Failed to list cart items");
    let lines: Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(lines.as_array().map(Vec::len), Some(1));

    ctx.delete(&format!("/users/{user}/")).await.expect("Failed to clean up");
    ctx.delete(&format!("/admin/items/{item}/")).await.expect("Failed to clean up");
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_cart_item_for_user_without_cart() {
    let ctx = TestContext::new();
    let user = ctx.create_user().await.expect("Failed to create user");

    let resp = ctx
        .post("/cartitems/", &json!({ "user": user, "item": 1 }))
        .await
        .expect("Failed to post cart item");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(
        body,
        json!({ "error": [format!(
            "Invalid user '{user}' - user does not exist or user does not have an associated cart"
        )] })
    );

    ctx.delete(&format!("/users/{user}/")).await.expect("Failed to clean up");
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_delete_user_cascades() {
    let ctx = TestContext::new();
    let (user, cart) = ctx.create_user_with_cart().await.expect("Failed to set up cart");
    let item = ctx.create_item("it-cascade", "1.00").await.expect("Failed to create item");
    let line = ctx.create_cart_item(cart, item, 2).await.expect("Failed to add line");

    let resp = ctx.delete(&format!("/users/{user}/")).await.expect("Failed to delete user");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    for path in [format!("/carts/{cart}/"), format!("/cartitems/{line}/")] {
        let resp = ctx.get(&path).await.expect("Failed to reach server");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path} survived");
    }
    let resp = ctx.get(&format!("/admin/items/{item}/")).await.expect("Failed to get item");
    assert_eq!(resp.status(), StatusCode::OK);

    ctx.delete(&format!("/admin/items/{item}/")).await.expect("Failed to clean up");
}

// ============================================================================
// Constraints
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_duplicate_cart_item_rejected() {
    let ctx = TestContext::new();
    let (user, cart) = ctx.create_user_with_cart().await.expect("Failed to set up cart");
    let item = ctx.create_item("it-dup-line", "2.00").await.expect("Failed to create item");
    ctx.create_cart_item(cart, item, 1).await.expect("Failed to add line");

    let resp = ctx
        .post("/cartitems/", &json!({ "cart": cart, "item": item, "quantity": 3 }))
        .await
        .expect("Failed to post cart item");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.json::<Value>().await.expect("Failed to parse JSON"),
        json!({ "non_field_errors": ["The fields cart, item must make a unique set."] })
    );

    ctx.delete(&format!("/users/{user}/")).await.expect("Failed to clean up");
    ctx.delete(&format!("/admin/items/{item}/")).await.expect("Failed to clean up");
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_cart_item_with_missing_item_rejected() {
    let ctx = TestContext::new();
    let (user, cart) = ctx.create_user_with_cart().await.expect("Failed to set up cart");
    let item = ctx.create_item("it-gone", "1.00").await.expect("Failed to create item");
    ctx.delete(&format!("/admin/items/{item}/")).await.expect("Failed to delete item");

    let resp = ctx
        .post("/cartitems/", &json!({ "cart": cart, "item": item }))
        .await
        .expect("Failed to post cart item");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.json::<Value>().await.expect("Failed to parse JSON"),
        json!({ "item": [format!("Invalid pk \"{item}\" - object does not exist.")] })
    );

    ctx.delete(&format!("/users/{user}/")).await.expect("Failed to clean up");
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_second_cart_for_user_rejected() {
    let ctx = TestContext::new();
    let (user, _) = ctx.create_user_with_cart().await.expect("Failed to set up cart");

    let resp = ctx
        .post("/carts/", &json!({ "user": user }))
        .await
        .expect("Failed to post cart");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.json::<Value>().await.expect("Failed to parse JSON"),
        json!({ "user": ["cart with this user already exists."] })
    );

    ctx.delete(&format!("/users/{user}/")).await.expect("Failed to clean up");
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_patch_cart_onto_user_with_cart_rejected() {
    let ctx = TestContext::new();
    let (first_user, first_cart) =
        ctx.create_user_with_cart().await.expect("Failed to set up cart");
    let (second_user, _) = ctx.create_user_with_cart().await.expect("Failed to set up cart");

    let resp = ctx
        .patch(&format!("/carts/{first_cart}/"), &json!({ "user": second_user }))
        .await
        .expect("Failed to patch cart");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.json::<Value>().await.expect("Failed to parse JSON"),
        json!({ "user": ["cart with this user already exists."] })
    );

    let resp = ctx.get(&format!("/carts/{first_cart}/")).await.expect("Failed to get cart");
    let body: Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["user"], json!(first_user));

    for user in [first_user, second_user] {
        ctx.delete(&format!("/users/{user}/")).await.expect("Failed to clean up");
    }
}

// ============================================================================
// Filters
// ============================================================================

async fn listed_ids(ctx: &TestContext, path: &str) -> Vec<i64> {
    let resp = ctx.get(path).await.expect("Failed to list");
    assert_eq!(resp.status(), StatusCode::OK, "{path}");
    let body: Value = resp.json().await.expect("Failed to parse JSON");
    body.as_array()
        .expect("expected a list")
        .iter()
        .filter_map(|entry| entry["id"].as_i64())
        .collect()
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_list_filters_by_user_and_cart() {
    let ctx = TestContext::new();
    let (first_user, first_cart) =
        ctx.create_user_with_cart().await.expect("Failed to set up cart");
    let (second_user, second_cart) =
        ctx.create_user_with_cart().await.expect("Failed to set up cart");
    let item = ctx.create_item("it-filter", "4.00").await.expect("Failed to create item");
    let first_line = ctx
        .create_cart_item(first_cart, item, 1)
        .await
        .expect("Failed to add line");
    let second_line = ctx
        .create_cart_item(second_cart, item, 3)
        .await
        .expect("Failed to add line");

    assert_eq!(
        listed_ids(&ctx, &format!("/carts/?user={first_user}")).await,
        vec![first_cart]
    );
    assert_eq!(
        listed_ids(&ctx, &format!("/cartitems/?user={second_user}")).await,
        vec![second_line]
    );
    assert_eq!(
        listed_ids(&ctx, &format!("/cartitems/?cart={first_cart}")).await,
        vec![first_line]
    );
    assert!(
        listed_ids(&ctx, &format!("/cartitems/?user={first_user}&cart={second_cart}"))
            .await
            .is_empty()
    );

    for user in [first_user, second_user] {
        ctx.delete(&format!("/users/{user}/")).await.expect("Failed to clean up");
    }
    ctx.delete(&format!("/admin/items/{item}/")).await.expect("Failed to clean up");
}

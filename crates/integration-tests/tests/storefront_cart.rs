//! Cart API against a live storefront and catalog stub.

use mercato_integration_tests::TestContext;
use serde_json::json;

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = TestContext::new().await;

    let resp = ctx.client.get(ctx.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(resp.text().await.unwrap(), "ok");

    // The session database is unreachable in tests
    let resp = ctx.client.get(ctx.url("/health/ready")).send().await.unwrap();
    assert_eq!(resp.status(), 503);
}

#[tokio::test]
async fn test_signed_out_cart_is_empty_and_read_only() {
    let ctx = TestContext::new().await;

    let (status, cart) = ctx.get("/api/cart").await;
    assert_eq!(status, 200);
    assert_eq!(cart["isAuthenticated"], false);
    assert_eq!(cart["itemCount"], 0);
    assert_eq!(cart["lines"], json!([]));

    let (status, body) = ctx.add("sku-1", 1).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Sign in required");
    assert_eq!(ctx.catalog.hits(), 0);

    let (status, _) = ctx.patch("/api/cart/lines/sku-1-x", json!({"quantity": 2})).await;
    assert_eq!(status, 401);
    let (status, _) = ctx.delete("/api/cart/lines/sku-1-x").await;
    assert_eq!(status, 401);

    // Clearing an empty signed-out cart is allowed
    let (status, cart) = ctx.delete("/api/cart").await;
    assert_eq!(status, 200);
    assert_eq!(cart["itemCount"], 0);
}

#[tokio::test]
async fn test_add_merges_and_totals_exactly() {
    let ctx = TestContext::new().await;
    ctx.sign_in(1).await;

    let (status, cart) = ctx.add("sku-1", 2).await;
    assert_eq!(status, 200);
    assert_eq!(cart["isAuthenticated"], true);
    assert_eq!(cart["lines"][0]["name"], "Widget");
    assert_eq!(cart["lines"][0]["imageRef"], "/img/widget.png");
    assert_eq!(cart["itemCount"], 2);

    let (_, cart) = ctx.add("sku-2", 3).await;
    assert_eq!(cart["subtotal"], "35.00");
    assert_eq!(cart["subtotalDisplay"], "$35.00");
    assert_eq!(cart["itemCount"], 5);

    // Same product and attributes merge into the existing line
    let (_, cart) = ctx.add("sku-1", 1).await;
    assert_eq!(cart["lines"].as_array().unwrap().len(), 2);
    assert_eq!(cart["lines"][0]["quantity"], 3);
    assert_eq!(cart["subtotal"], "45.00");

    // The repeated sku-1 lookup was served from cache
    assert_eq!(ctx.catalog.hits(), 2);

    // The cart survives across requests
    let (_, cart) = ctx.get("/api/cart").await;
    assert_eq!(cart["itemCount"], 6);
}

#[tokio::test]
async fn test_attributes_split_lines() {
    let ctx = TestContext::new().await;
    ctx.sign_in(1).await;

    ctx.post(
        "/api/cart/lines",
        json!({"productId": "sku-1", "attributes": {"color": "red"}}),
    )
    .await;
    let (_, cart) = ctx
        .post(
            "/api/cart/lines",
            json!({"productId": "sku-1", "attributes": {"color": "blue"}}),
        )
        .await;

    let lines = cart["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert_ne!(lines[0]["id"], lines[1]["id"]);
    assert_eq!(cart["itemCount"], 2);
}

#[tokio::test]
async fn test_add_rejects_bad_input() {
    let ctx = TestContext::new().await;
    ctx.sign_in(1).await;

    let (status, _) = ctx.add("sku-1", 0).await;
    assert_eq!(status, 400);

    let (status, body) = ctx.add("no-such-product", 1).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Product not found: no-such-product");

    let (status, body) = ctx.add("broken", 1).await;
    assert_eq!(status, 502);
    assert_eq!(body["error"], "Product catalog unavailable");

    let (_, cart) = ctx.get("/api/cart").await;
    assert_eq!(cart["itemCount"], 0);
}

#[tokio::test]
async fn test_set_quantity_and_remove() {
    let ctx = TestContext::new().await;
    ctx.sign_in(1).await;

    let (_, cart) = ctx.add("sku-1", 1).await;
    let line_id = cart["lines"][0]["id"].as_str().unwrap().to_owned();
    let path = format!("/api/cart/lines/{line_id}");

    let (status, cart) = ctx.patch(&path, json!({"quantity": 4})).await;
    assert_eq!(status, 200);
    assert_eq!(cart["lines"][0]["quantity"], 4);
    assert_eq!(cart["subtotal"], "40.00");

    // Zero and negative quantities clamp to one
    let (_, cart) = ctx.patch(&path, json!({"quantity": -3})).await;
    assert_eq!(cart["lines"][0]["quantity"], 1);

    // Unknown lines are ignored
    let (status, cart) = ctx
        .patch("/api/cart/lines/missing", json!({"quantity": 9}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(cart["itemCount"], 1);

    let (status, cart) = ctx.delete(&path).await;
    assert_eq!(status, 200);
    assert_eq!(cart["itemCount"], 0);

    let (status, _) = ctx.delete(&path).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_clear_empties_cart() {
    let ctx = TestContext::new().await;
    ctx.sign_in(1).await;
    ctx.add("sku-1", 2).await;

    let (status, cart) = ctx.delete("/api/cart").await;
    assert_eq!(status, 200);
    assert_eq!(cart["itemCount"], 0);

    let (_, cart) = ctx.get("/api/cart").await;
    assert_eq!(cart["lines"], json!([]));
}

#[tokio::test]
async fn test_carts_are_per_user() {
    let ctx = TestContext::new().await;
    ctx.sign_in(1).await;
    ctx.add("sku-1", 2).await;

    // Switching accounts shows the other user's (empty) cart
    ctx.sign_in(2).await;
    let (_, cart) = ctx.get("/api/cart").await;
    assert_eq!(cart["itemCount"], 0);
    ctx.add("sku-2", 1).await;

    // Switching back restores the first user's lines
    ctx.sign_in(1).await;
    let (_, cart) = ctx.get("/api/cart").await;
    assert_eq!(cart["itemCount"], 2);
    assert_eq!(cart["lines"][0]["productId"], "sku-1");
}

#[tokio::test]
async fn test_logout_discards_cart() {
    let ctx = TestContext::new().await;
    ctx.sign_in(1).await;
    ctx.add("sku-1", 2).await;

    let (status, _) = ctx.post("/auth/logout", json!({})).await;
    assert_eq!(status, 204);

    let (_, me) = ctx.get("/auth/me").await;
    assert_eq!(me["isAuthenticated"], false);
    let (_, cart) = ctx.get("/api/cart").await;
    assert_eq!(cart["itemCount"], 0);

    // Signing back in does not bring the old lines back
    ctx.sign_in(1).await;
    let (_, cart) = ctx.get("/api/cart").await;
    assert_eq!(cart["itemCount"], 0);
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let ctx = TestContext::new().await;
    ctx.sign_in(1).await;
    ctx.add("sku-1", 1).await;

    let other = reqwest::Client::new();
    let resp = other.get(ctx.url("/api/cart")).send().await.unwrap();
    let cart: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(cart["isAuthenticated"], false);
    assert_eq!(cart["itemCount"], 0);
}

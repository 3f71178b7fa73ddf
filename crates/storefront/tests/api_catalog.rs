//! Router tests for the catalog listing, admin catalog management and
//! settings.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

mod common;

use axum::http::StatusCode;
use common::{TestApp, seed_product};
use kirana_core::{
    Applied, Cursor, Page, Product, ProductFeed, ProductFilters, ProductQuery, SortBy,
};
use serde_json::{Value, json};

/// Seven products with tied prices and timestamps across two categories.
async fn seeded() -> TestApp {
    let app = TestApp::new();
    for (id, category, price, popularity, created_at) in [
        ("p1", "tea", "120.00", 40, "2026-03-01T10:00:00Z"),
        ("p2", "tea", "80.00", 90, "2026-03-02T10:00:00Z"),
        ("p3", "coffee", "120.00", 10, "2026-03-02T10:00:00Z"),
        ("p4", "coffee", "300.00", 90, "2026-03-03T10:00:00Z"),
        ("p5", "tea", "45.50", 5, "2026-03-04T10:00:00Z"),
        ("p6", "snacks", "120.00", 60, "2026-03-04T10:00:00Z"),
        ("p7", "tea", "999.00", 0, "2026-03-05T10:00:00Z"),
    ] {
        seed_product(&app, id, category, price, popularity, created_at).await;
    }
    app
}

fn sort_param(sort_by: SortBy) -> String {
    serde_json::to_value(sort_by)
        .unwrap()
        .as_str()
        .unwrap()
        .to_string()
}

/// Listing URL for a page request.
fn url_for(query: &ProductQuery) -> String {
    let filters = &query.filters;
    let mut url = format!(
        "/api/products?sortBy={}&limit={}",
        sort_param(filters.sort_by),
        query.page_limit
    );
    if let Some(category) = &filters.category {
        url.push_str(&format!("&category={category}"));
    }
    if let Some(search) = &filters.search_query {
        url.push_str(&format!("&search={search}"));
    }
    if let Some(min) = filters.min_price {
        url.push_str(&format!("&minPrice={min}"));
    }
    if let Some(max) = filters.max_price {
        url.push_str(&format!("&maxPrice={max}"));
    }
    if let Some(cursor) = &query.cursor {
        url.push_str(&format!("&cursor={}", cursor.encode()));
    }
    url
}

fn ids(body: &Value) -> Vec<String> {
    body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect()
}

fn parse_page(body: Value) -> Page {
    Page {
        products: serde_json::from_value::<Vec<Product>>(body["products"].clone()).unwrap(),
        next_cursor: body["nextCursor"]
            .as_str()
            .map(|token| Cursor::decode(token).unwrap()),
        has_more: body["hasMore"].as_bool().unwrap(),
    }
}

#[tokio::test]
async fn test_default_listing_is_newest_first() {
    let app = seeded().await;
    let (status, body) = app.get("/api/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), ["p7", "p6", "p5", "p4", "p3", "p2", "p1"]);
    assert_eq!(body["hasMore"], false);
    assert_eq!(body["products"][0]["price"], "999.00");
}

#[tokio::test]
async fn test_pages_partition_the_full_listing_for_every_order() {
    let app = seeded().await;

    for sort_by in [
        SortBy::Newest,
        SortBy::PriceLowToHigh,
        SortBy::PriceHighToLow,
        SortBy::Popular,
    ] {
        let filters = ProductFilters {
            sort_by,
            ..ProductFilters::default()
        };
        let (_, full) = app
            .get(&url_for(&ProductQuery::first_page(filters.clone(), 100)))
            .await;
        let expected = ids(&full);
        assert_eq!(expected.len(), 7);

        let mut collected = Vec::new();
        let mut query = ProductQuery::first_page(filters, 3);
        let mut pages = 0;
        loop {
            let (status, body) = app.get(&url_for(&query)).await;
            assert_eq!(status, StatusCode::OK);
            pages += 1;
            let page = parse_page(body.clone());
            collected.extend(ids(&body));
            if !page.has_more {
                break;
            }
            query.cursor = page.next_cursor;
        }

        assert_eq!(pages, 3, "{sort_by:?}");
        assert_eq!(collected, expected, "{sort_by:?}");
    }
}

#[tokio::test]
async fn test_price_order_breaks_ties_by_id() {
    let app = seeded().await;
    let (_, body) = app.get("/api/products?sortBy=priceLowToHigh").await;
    assert_eq!(ids(&body), ["p5", "p2", "p1", "p3", "p6", "p4", "p7"]);

    let (_, body) = app.get("/api/products?sortBy=priceHighToLow").await;
    assert_eq!(ids(&body), ["p7", "p4", "p6", "p3", "p1", "p2", "p5"]);
}

#[tokio::test]
async fn test_exact_multiple_ends_with_empty_page() {
    let app = seeded().await;
    let tea = ProductFilters {
        category: Some("tea".to_string()),
        ..ProductFilters::default()
    };

    let mut query = ProductQuery::first_page(tea, 2);
    let (_, first) = app.get(&url_for(&query)).await;
    assert_eq!(ids(&first), ["p7", "p5"]);
    assert_eq!(first["hasMore"], true);

    query.cursor = parse_page(first).next_cursor;
    let (_, second) = app.get(&url_for(&query)).await;
    assert_eq!(ids(&second), ["p2", "p1"]);
    assert_eq!(second["hasMore"], true);

    query.cursor = parse_page(second).next_cursor;
    let (status, third) = app.get(&url_for(&query)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(third, json!({"products": [], "nextCursor": null, "hasMore": false}));
}

#[tokio::test]
async fn test_filters() {
    let app = seeded().await;

    let (_, body) = app.get("/api/products?category=coffee").await;
    assert_eq!(ids(&body), ["p4", "p3"]);

    let (_, body) = app.get("/api/products?category=all").await;
    assert_eq!(ids(&body).len(), 7);

    let (_, body) = app.get("/api/products?search=TEA&sortBy=priceLowToHigh").await;
    assert_eq!(ids(&body), ["p5", "p2", "p1", "p7"]);

    let (_, body) = app
        .get("/api/products?minPrice=80&maxPrice=120&sortBy=priceLowToHigh")
        .await;
    assert_eq!(ids(&body), ["p2", "p1", "p3", "p6"]);

    let (_, body) = app.get("/api/products?category=spices").await;
    assert_eq!(body, json!({"products": [], "nextCursor": null, "hasMore": false}));
}

#[tokio::test]
async fn test_listing_rejects_bad_parameters() {
    let app = seeded().await;
    for uri in [
        "/api/products?cursor=not*base64",
        "/api/products?limit=0",
        "/api/products?limit=101",
        "/api/products?sortBy=cheapest",
    ] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn test_product_detail() {
    let app = seeded().await;
    let (status, body) = app.get("/api/products/p4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "coffee");
    assert_eq!(body["createdAt"], "2026-03-03T10:00:00Z");

    let (status, body) = app.get("/api/products/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");
}

#[tokio::test]
async fn test_feed_follows_listing_and_drops_superseded_pages() {
    let app = seeded().await;
    let mut feed = ProductFeed::new(2);

    let tea = ProductFilters {
        category: Some("tea".to_string()),
        ..ProductFilters::default()
    };
    let stale = feed.reset(tea.clone());
    let coffee = ProductFilters {
        category: Some("coffee".to_string()),
        ..ProductFilters::default()
    };
    let current = feed.reset(coffee);

    let (_, coffee_page) = app.get(&url_for(current.query())).await;
    let (_, tea_page) = app.get(&url_for(stale.query())).await;

    assert!(matches!(
        feed.apply(&current, parse_page(coffee_page)),
        Applied::Accepted { added: 2, has_more: true }
    ));
    assert_eq!(feed.apply(&stale, parse_page(tea_page)), Applied::Stale);

    let next = feed.load_more().unwrap();
    let (_, body) = app.get(&url_for(next.query())).await;
    assert_eq!(feed.apply(&next, parse_page(body)), Applied::Exhausted);
    assert!(!feed.has_more());
    assert!(feed.load_more().is_none());

    let listed: Vec<&str> = feed.products().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(listed, ["p4", "p3"]);

    let ticket = feed.reset(tea);
    let (_, body) = app.get(&url_for(ticket.query())).await;
    feed.apply(&ticket, parse_page(body));
    while let Some(ticket) = feed.load_more() {
        let (_, body) = app.get(&url_for(ticket.query())).await;
        feed.apply(&ticket, parse_page(body));
    }
    let listed: Vec<&str> = feed.products().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(listed, ["p7", "p5", "p2", "p1"]);
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let app = seeded().await;
    let (status, body) = app
        .post(
            "/api/admin/products",
            &json!({"name": "Jaggery", "price": "60", "category": "sweeteners"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing bearer token");
    assert_eq!(app.store.len("products").await, 7);
}

#[tokio::test]
async fn test_admin_product_lifecycle() {
    let app = seeded().await;

    let (status, created) = app
        .admin(
            "POST",
            "/api/admin/products",
            Some(&json!({
                "name": "  Jaggery  ",
                "price": "60.00",
                "category": "sweeteners",
                "images": ["https://cdn.kirana.shop/jaggery.jpg", " "]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Jaggery");
    assert_eq!(created["images"].as_array().unwrap().len(), 1);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = app
        .admin(
            "PUT",
            &format!("/api/admin/products/{id}"),
            Some(&json!({"name": "Jaggery", "price": "65.00", "category": "sweeteners"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], "65.00");
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let (_, body) = app.get("/api/products?category=sweeteners").await;
    assert_eq!(ids(&body), [id.clone()]);

    let uri = format!("/api/admin/products/{id}");
    let (status, _) = app.admin("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.admin("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get(&format!("/api/products/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_rejects_invalid_products() {
    let app = seeded().await;
    let (status, body) = app
        .admin(
            "POST",
            "/api/admin/products",
            Some(&json!({"name": " ", "price": "10", "category": "tea"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name is required");

    let (status, _) = app
        .admin(
            "PUT",
            "/api/admin/products/missing",
            Some(&json!({"name": "Ghost", "price": "10", "category": "tea"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_settings_defaults_then_partial_update() {
    let app = TestApp::new();

    let (status, defaults) = app.get("/api/settings").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(defaults["storeName"], "Kirana");
    assert_eq!(defaults["currency"], "INR");
    assert!(defaults.get("updatedAt").is_none());

    let (status, updated) = app
        .admin(
            "PATCH",
            "/api/admin/settings",
            Some(&json!({"currency": "USD", "currencySymbol": "$"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["currency"], "USD");
    assert_eq!(updated["currencySymbol"], "$");
    assert_eq!(updated["storeName"], "Kirana");
    assert!(updated["updatedAt"].is_string());

    let (_, reread) = app.get("/api/settings").await;
    assert_eq!(reread, updated);
}

#[tokio::test]
async fn test_settings_update_needs_fields() {
    let app = TestApp::new();
    for body in [json!({}), json!({"updatedAt": "2020-01-01T00:00:00Z"})] {
        let (status, response) = app
            .admin("PATCH", "/api/admin/settings", Some(&body))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "No settings fields supplied");
    }
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();
    let (status, _) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/health/ready").await;
    assert_eq!(status, StatusCode::OK);
}

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use wardrobe_api::api::{create_router, AppState};
use wardrobe_api::models::Weather;

fn create_test_server() -> TestServer {
    create_test_server_with_weather(Weather::new(24.0, "Clouds"))
}

fn create_test_server_with_weather(weather: Weather) -> TestServer {
    let state = AppState::in_memory(weather);
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

async fn add_item(server: &TestServer, body: Value) -> i64 {
    let response = server.post("/api/clothes").json(&body).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_i64().unwrap()
}

/// Red top, blue bottom and shoes, all casual and never worn
async fn seed_basic_wardrobe(server: &TestServer) -> (i64, i64, i64) {
    let top = add_item(
        server,
        json!({
            "image_path": "uploads/red_tee.jpg",
            "category": "top",
            "color_primary": "#FF0000",
            "season_weight": "light"
        }),
    )
    .await;
    let bottom = add_item(
        server,
        json!({
            "image_path": "uploads/blue_shorts.jpg",
            "category": "bottom",
            "color_primary": "#0000ff",
            "season_weight": "light"
        }),
    )
    .await;
    let shoes = add_item(
        server,
        json!({
            "image_path": "uploads/sneakers.jpg",
            "category": "shoes",
            "color_primary": "#ffffff"
        }),
    )
    .await;
    (top, bottom, shoes)
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_create_and_list_clothes() {
    let server = create_test_server();
    let (top, _, _) = seed_basic_wardrobe(&server).await;

    let response = server.get(&format!("/api/clothes/{}", top)).await;
    response.assert_status_ok();
    let item: Value = response.json();
    assert_eq!(item["color_primary"], "#ff0000");
    assert_eq!(item["pattern"], "solid");
    assert_eq!(item["formality"], "casual");
    assert_eq!(item["times_worn"], 0);

    let response = server.get("/api/clothes?category=shoes").await;
    response.assert_status_ok();
    let shoes: Vec<Value> = response.json();
    assert_eq!(shoes.len(), 1);
    assert_eq!(shoes[0]["image_path"], "uploads/sneakers.jpg");
}

#[tokio::test]
async fn test_create_rejects_invalid_color() {
    let server = create_test_server();
    let response = server
        .post("/api/clothes")
        .json(&json!({
            "image_path": "uploads/mystery.jpg",
            "category": "top",
            "color_primary": "reddish"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("reddish"));
}

#[tokio::test]
async fn test_update_and_delete_clothing() {
    let server = create_test_server();
    let (top, _, _) = seed_basic_wardrobe(&server).await;

    let response = server
        .put(&format!("/api/clothes/{}", top))
        .json(&json!({ "formality": "business-casual", "pattern": "striped" }))
        .await;
    response.assert_status_ok();
    let item: Value = response.json();
    assert_eq!(item["formality"], "business-casual");
    assert_eq!(item["pattern"], "striped");

    let response = server
        .put(&format!("/api/clothes/{}", top))
        .json(&json!({}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    server
        .delete(&format!("/api/clothes/{}", top))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/api/clothes/{}", top))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete(&format!("/api/clothes/{}", top))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_toggles_and_wardrobe_stats() {
    let server = create_test_server();
    let (top, _, shoes) = seed_basic_wardrobe(&server).await;

    let response = server.post(&format!("/api/clothes/{}/laundry", top)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["in_laundry"], true);

    let response = server.post(&format!("/api/clothes/{}/favorite", shoes)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["favorite"], true);

    server
        .post("/api/clothes/9999/laundry")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let stats: Value = server.get("/api/stats").await.json();
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["in_laundry"], 1);
    assert_eq!(stats["favorites"], 1);
    assert_eq!(stats["never_worn"], 3);
    assert_eq!(stats["by_category"]["top"], 1);
    assert_eq!(stats["total_outfits"], 0);
}

#[tokio::test]
async fn test_suggest_hot_day_scenario() {
    let server = create_test_server();
    let (top, bottom, shoes) = seed_basic_wardrobe(&server).await;

    let response = server
        .get("/api/outfits/suggest?occasion=casual&temp=35&condition=Clear&num=4&seed=0")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["occasion"], "casual");
    assert_eq!(body["weather"]["temp"], 35.0);

    let suggestions = body["suggestions"].as_array().unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0]["type"], "regular");
    assert_eq!(suggestions[0]["items"]["top"]["id"], top);
    assert_eq!(suggestions[0]["items"]["bottom"]["id"], bottom);
    assert_eq!(suggestions[0]["items"]["shoes"]["id"], shoes);
    // Raw score is above 100 and is clipped for display
    assert_eq!(suggestions[0]["score"], 100);
}

#[tokio::test]
async fn test_suggest_with_laundry_leaves_nothing() {
    let server = create_test_server();
    let (top, _, _) = seed_basic_wardrobe(&server).await;
    server.post(&format!("/api/clothes/{}/laundry", top)).await;

    let body: Value = server
        .get("/api/outfits/suggest?occasion=casual&temp=22")
        .await
        .json();
    assert!(body["suggestions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_suggest_empty_wardrobe_is_not_an_error() {
    let server = create_test_server();
    let response = server.get("/api/outfits/suggest").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["occasion"], "casual");
    assert!(body["suggestions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_suggest_rejects_out_of_range_count() {
    let server = create_test_server();
    server
        .get("/api/outfits/suggest?num=0")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .get("/api/outfits/suggest?num=7")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_suggest_uses_provider_weather_without_temp() {
    let server = create_test_server_with_weather(Weather::new(9.0, "Rain"));
    seed_basic_wardrobe(&server).await;

    let body: Value = server
        .get("/api/outfits/suggest?occasion=casual")
        .await
        .json();

    assert_eq!(body["weather"]["temp"], 9.0);
    assert_eq!(body["weather"]["condition"], "Rain");
    // Both garments are light, so nothing survives the cold filter
    assert!(body["suggestions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_rain_keeps_sandals_home() {
    let server = create_test_server();
    seed_basic_wardrobe(&server).await;
    let sandals = add_item(
        &server,
        json!({
            "image_path": "uploads/beach_sandals.jpg",
            "category": "shoes",
            "color_primary": "#a0522d"
        }),
    )
    .await;

    let body: Value = server
        .get("/api/outfits/suggest?temp=25&condition=Rain&num=6")
        .await
        .json();

    let suggestions = body["suggestions"].as_array().unwrap();
    assert!(!suggestions.is_empty());
    assert!(suggestions
        .iter()
        .all(|s| s["items"]["shoes"]["id"] != json!(sandals)));
}

#[tokio::test]
async fn test_log_outfit_updates_wear_count_and_history() {
    let server = create_test_server();
    let (top, bottom, shoes) = seed_basic_wardrobe(&server).await;

    let response = server
        .post("/api/outfits/log")
        .json(&json!({
            "top_id": top,
            "bottom_id": bottom,
            "shoes_id": shoes,
            "occasion": "casual",
            "weather_temp": 30.5,
            "weather_condition": "Clear"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let outfit_id = response.json::<Value>()["id"].as_i64().unwrap();

    let item: Value = server.get(&format!("/api/clothes/{}", top)).await.json();
    assert_eq!(item["times_worn"], 1);
    assert!(!item["last_worn"].is_null());

    server.delete(&format!("/api/clothes/{}", shoes)).await;

    let history: Vec<Value> = server.get("/api/outfits/history").await.json();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["id"], outfit_id);
    assert_eq!(history[0]["weather_temp"], 30.5);
    assert_eq!(history[0]["top"]["status"], "known");
    assert_eq!(history[0]["shoes"]["status"], "unknown");
    assert_eq!(history[0]["shoes"]["label"], "unknown item");
    assert!(history[0]["dress"].is_null());
}

#[tokio::test]
async fn test_forgotten_clothes_skip_worn_and_laundry() {
    let server = create_test_server();
    let (top, bottom, shoes) = seed_basic_wardrobe(&server).await;

    server
        .post("/api/outfits/log")
        .json(&json!({ "top_id": top, "occasion": "casual" }))
        .await
        .assert_status(StatusCode::CREATED);
    server.post(&format!("/api/clothes/{}/laundry", shoes)).await;

    let response = server.get("/api/clothes/forgotten").await;
    response.assert_status_ok();
    let forgotten: Vec<Value> = response.json();
    assert_eq!(forgotten.len(), 1);
    assert_eq!(forgotten[0]["id"], bottom);
}

#[tokio::test]
async fn test_clear_all() {
    let server = create_test_server();
    let (top, bottom, shoes) = seed_basic_wardrobe(&server).await;
    server
        .post("/api/outfits/log")
        .json(&json!({
            "top_id": top,
            "bottom_id": bottom,
            "shoes_id": shoes,
            "occasion": "casual"
        }))
        .await
        .assert_status(StatusCode::CREATED);

    server
        .delete("/api/clear-all")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let stats: Value = server.get("/api/stats").await.json();
    assert_eq!(stats["total"], 0);
    assert_eq!(stats["total_outfits"], 0);
    let history: Vec<Value> = server.get("/api/outfits/history").await.json();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_log_outfit_requires_items() {
    let server = create_test_server();
    server
        .post("/api/outfits/log")
        .json(&json!({ "occasion": "work" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rating_flow_and_profile() {
    let server = create_test_server();
    let (top, bottom, _) = seed_basic_wardrobe(&server).await;

    let outfit_id = server
        .post("/api/outfits/log")
        .json(&json!({ "top_id": top, "bottom_id": bottom, "occasion": "date" }))
        .await
        .json::<Value>()["id"]
        .as_i64()
        .unwrap();

    let response = server
        .post(&format!("/api/outfits/{}/rating", outfit_id))
        .json(&json!({ "rating": 5, "feedback": "Got compliments!" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["ok"], true);

    let profile: Value = server.get("/api/profile").await.json();
    assert_eq!(profile["colors"]["#ff0000"], 2.0);
    assert_eq!(profile["formality"]["casual"], 3.0);
    assert_eq!(profile["patterns"]["solid"], 3.0);
    let date = profile["occasions"]["date"].as_f64().unwrap();
    assert!((date - 1.6).abs() < 1e-9);

    let colors: Vec<Value> = server
        .get("/api/profile/favorite-colors?limit=1")
        .await
        .json();
    assert_eq!(colors.len(), 1);

    let distribution: Value = server.get("/api/profile/formality").await.json();
    assert_eq!(distribution["casual"], 100.0);

    let stats: Value = server.get("/api/profile/stats").await.json();
    assert_eq!(stats["total_ratings"], 1);
    assert_eq!(stats["average_rating"], 5.0);
}

#[tokio::test]
async fn test_rating_validation_and_missing_outfit() {
    let server = create_test_server();

    server
        .post("/api/outfits/42/rating")
        .json(&json!({ "rating": 7 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post("/api/outfits/42/rating")
        .json(&json!({ "rating": 4 }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // The rating for the missing outfit is still on record
    let stats: Value = server.get("/api/profile/stats").await.json();
    assert_eq!(stats["total_ratings"], 1);
    let profile: Value = server.get("/api/profile").await.json();
    assert!(profile["colors"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_reset_profile() {
    let server = create_test_server();
    let (top, bottom, _) = seed_basic_wardrobe(&server).await;

    let outfit_id = server
        .post("/api/outfits/log")
        .json(&json!({ "top_id": top, "bottom_id": bottom, "occasion": "casual" }))
        .await
        .json::<Value>()["id"]
        .as_i64()
        .unwrap();
    server
        .post(&format!("/api/outfits/{}/rating", outfit_id))
        .json(&json!({ "rating": 2 }))
        .await
        .assert_status_ok();

    server
        .delete("/api/profile")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let profile: Value = server.get("/api/profile").await.json();
    for group in ["colors", "formality", "patterns", "occasions"] {
        assert!(profile[group].as_object().unwrap().is_empty());
    }

    let distribution: Value = server.get("/api/profile/formality").await.json();
    assert_eq!(distribution["formal"], 34.0);
}

#[tokio::test]
async fn test_feedback_tags() {
    let server = create_test_server();
    let tags: Vec<String> = server.get("/api/profile/feedback-tags").await.json();
    assert_eq!(tags.len(), 10);
    assert!(tags.contains(&"Too formal 👔".to_string()));
}

#[tokio::test]
async fn test_weather_endpoint() {
    let server = create_test_server_with_weather(Weather::new(14.0, "Drizzle"));

    let body: Value = server.get("/api/weather?city=Coimbatore").await.json();
    assert_eq!(body["city"], "Coimbatore");
    assert_eq!(body["temp"], 14.0);
    assert_eq!(body["condition"], "Drizzle");
    assert_eq!(body["emoji"], "🌦️");

    let body: Value = server.get("/api/weather").await.json();
    assert_eq!(body["city"], "Tiruppur");
}

use mockito::Matcher;
use pantry_chef::config::{AppConfig, GoogleConfig};
use pantry_chef::gate::CredentialStatus;
use pantry_chef::orchestrator::{ImageStatus, Phase, VariationStatus};
use pantry_chef::{orchestrator_from_config, GenerationRequest, SubmitOutcome};
use serde_json::json;

const TEXT_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";
const IMAGE_PATH: &str = "/v1beta/models/imagen-4.0-generate-001:predict";

fn config(base_url: &str, api_key: Option<&str>) -> AppConfig {
    AppConfig {
        google: GoogleConfig {
            api_key: api_key.map(str::to_string),
            base_url: base_url.to_string(),
            ..GoogleConfig::default()
        },
        progress_delay_ms: 0,
        timeout: 5,
        ..AppConfig::default()
    }
}

fn gemini_body(text: &str) -> String {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

fn request() -> GenerationRequest {
    GenerationRequest {
        ingredients: vec!["عدس".to_string(), "بصل".to_string()],
        dietary_restrictions: vec!["نباتي".to_string()],
        recipe_count: 1,
    }
}

#[tokio::test]
async fn test_recipes_images_and_variations_over_http() {
    let mut server = mockito::Server::new_async().await;

    let recipes = json!([{
        "title": "شوربة عدس",
        "description": "شوربة دافئة",
        "ingredients": ["عدس", "بصل"],
        "instructions": ["اسلق العدس", "أضف البصل"],
        "servings": "4",
        "prepTime": "40 دقيقة",
        "calories": "320",
        "protein": "18g"
    }])
    .to_string();

    let text_mock = server
        .mock("POST", TEXT_PATH)
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::PartialJson(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(gemini_body(&recipes))
        .create_async()
        .await;

    let image_mock = server
        .mock("POST", IMAGE_PATH)
        .match_header("x-goog-api-key", "test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "predictions": [{ "bytesBase64Encoded": "aGVsbG8=", "mimeType": "image/png" }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let mut orchestrator = orchestrator_from_config(&config(&server.url(), Some("test-key"))).unwrap();
    assert_eq!(orchestrator.gate().status(), CredentialStatus::Available);

    let outcome = orchestrator.submit(request()).await;
    assert_eq!(outcome, SubmitOutcome::Shown(1));
    orchestrator.settle().await;

    text_mock.assert_async().await;
    image_mock.assert_async().await;

    let state = orchestrator.state();
    let recipe = state.recipe("شوربة عدس").unwrap();
    assert_eq!(recipe.protein.as_deref(), Some("18g"));
    assert_eq!(
        state.image_status("شوربة عدس"),
        ImageStatus::Ready("data:image/png;base64,aGVsbG8=")
    );

    let _variations_mock = server
        .mock("POST", TEXT_PATH)
        .match_header("x-goog-api-key", "test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(gemini_body("شوربة عدس بالليمون\nشوربة عدس بالكمون"))
        .create_async()
        .await;

    assert!(orchestrator.request_variations("شوربة عدس"));
    orchestrator.settle().await;
    assert_eq!(
        orchestrator.state().variation_status("شوربة عدس"),
        VariationStatus::Ready("شوربة عدس بالليمون\nشوربة عدس بالكمون")
    );
}

#[tokio::test]
async fn test_rejected_key_closes_the_gate() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("POST", TEXT_PATH)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT"
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let mut orchestrator = orchestrator_from_config(&config(&server.url(), Some("bad-key"))).unwrap();
    let outcome = orchestrator.submit(request()).await;

    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert_eq!(orchestrator.gate().status(), CredentialStatus::Rejected);
    assert_eq!(orchestrator.phase(), Phase::CredentialRequired);
}

#[tokio::test]
async fn test_image_failure_keeps_recipes() {
    let mut server = mockito::Server::new_async().await;

    let recipes = json!([{
        "title": "فلافل",
        "description": "",
        "ingredients": ["حمص"],
        "instructions": ["اقلِ"],
        "servings": 3,
        "prepTime": 25
    }])
    .to_string();

    let _text = server
        .mock("POST", TEXT_PATH)
        .with_status(200)
        .with_body(gemini_body(&recipes))
        .create_async()
        .await;
    let _image = server
        .mock("POST", IMAGE_PATH)
        .with_status(200)
        .with_body(json!({ "predictions": [{ "raiFilteredReason": "filtered" }] }).to_string())
        .create_async()
        .await;

    let mut orchestrator = orchestrator_from_config(&config(&server.url(), Some("test-key"))).unwrap();
    orchestrator.submit(request()).await;
    orchestrator.settle().await;

    let state = orchestrator.state();
    let recipe = state.recipe("فلافل").unwrap();
    assert_eq!(recipe.servings, "3");
    assert_eq!(recipe.prep_time, "25");
    assert_eq!(state.image_status("فلافل"), ImageStatus::Failed);
    assert!(state.error().is_none());
    assert_eq!(orchestrator.phase(), Phase::RecipesShown);
}

#[tokio::test]
#[ignore = "requires GEMINI_API_KEY and network access"]
async fn test_live_generation() {
    let recipes = pantry_chef::generate_recipes(&["أرز".to_string(), "دجاج".to_string()], &[], 1)
        .await
        .unwrap();
    assert!(!recipes.is_empty());
}

// ABOUTME: Generation service adapter for the slideforge application
// ABOUTME: Validates create requests, calls a slide generator and maps its output into a Presentation

use crate::catalog;
use crate::errors::{ForgeError, Result};
use crate::model::{Presentation, Slide};
use crate::utils::char_len;
use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use url::Url;

pub const MIN_TITLE_CHARS: usize = 5;
pub const MAX_TITLE_CHARS: usize = 100;
pub const MIN_TOPIC_CHARS: usize = 10;
pub const MAX_TOPIC_CHARS: usize = 500;
pub const MIN_SLIDES: usize = 5;
pub const MAX_SLIDES: usize = 10;
pub const MIN_BULLETS: usize = 1;
pub const MAX_BULLETS: usize = 5;

/// What the create form submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub title: String,
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    pub design_template: String,
    pub theme_variant: String,
}

impl GenerationRequest {
    pub fn new(title: &str, topic: &str, design_template: &str, theme_variant: &str) -> Self {
        Self {
            title: title.to_string(),
            topic: topic.to_string(),
            raw_text: None,
            design_template: design_template.to_string(),
            theme_variant: theme_variant.to_string(),
        }
    }

    pub fn with_raw_text(mut self, raw_text: &str) -> Self {
        let trimmed = raw_text.trim();
        self.raw_text = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    /// Check the form rules. Nothing should be sent to a generator unless
    /// this passes.
    pub fn validate(&self) -> Result<()> {
        let title_len = char_len(self.title.trim());
        if !(MIN_TITLE_CHARS..=MAX_TITLE_CHARS).contains(&title_len) {
            return Err(ForgeError::ValidationError(format!(
                "Title must be between {} and {} characters",
                MIN_TITLE_CHARS, MAX_TITLE_CHARS
            )));
        }
        let topic_len = char_len(self.topic.trim());
        if !(MIN_TOPIC_CHARS..=MAX_TOPIC_CHARS).contains(&topic_len) {
            return Err(ForgeError::ValidationError(format!(
                "Topic must be between {} and {} characters",
                MIN_TOPIC_CHARS, MAX_TOPIC_CHARS
            )));
        }
        catalog::validate_template(&self.design_template)?;
        catalog::validate_theme(&self.theme_variant)?;
        Ok(())
    }
}

/// Anything that can turn a request into slide JSON.
pub trait SlideGenerator {
    /// Returns `{"slides": [{"title": ..., "bulletPoints": [...]}]}`.
    fn generate_presentation(&self, request: &GenerationRequest) -> Result<Value>;

    /// Returns `{"bulletPoints": [...]}` for a single slide title.
    fn generate_bullet_points(&self, title: &str) -> Result<Value>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedSlide {
    title: String,
    bullet_points: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GeneratedDeck {
    slides: Vec<GeneratedSlide>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedBullets {
    bullet_points: Vec<String>,
}

fn clean_bullets(bullets: Vec<String>, context: &str) -> std::result::Result<Vec<String>, String> {
    let bullets: Vec<String> = bullets
        .into_iter()
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .collect();
    if !(MIN_BULLETS..=MAX_BULLETS).contains(&bullets.len()) {
        return Err(format!(
            "{} has {} bullet points, expected {} to {}",
            context,
            bullets.len(),
            MIN_BULLETS,
            MAX_BULLETS
        ));
    }
    Ok(bullets)
}

fn parse_deck(value: Value) -> std::result::Result<Vec<Slide>, String> {
    let deck: GeneratedDeck =
        serde_json::from_value(value).map_err(|e| format!("unexpected response shape: {}", e))?;

    if !(MIN_SLIDES..=MAX_SLIDES).contains(&deck.slides.len()) {
        return Err(format!(
            "received {} slides, expected {} to {}",
            deck.slides.len(),
            MIN_SLIDES,
            MAX_SLIDES
        ));
    }

    deck.slides
        .into_iter()
        .enumerate()
        .map(|(i, generated)| {
            let title = generated.title.trim().to_string();
            if title.is_empty() {
                return Err(format!("slide {} has an empty title", i + 1));
            }
            let bullets = clean_bullets(generated.bullet_points, &format!("slide {}", i + 1))?;
            Ok(Slide::new(title, bullets))
        })
        .collect()
}

/// Validate `request`, run the generator once and build a fresh Presentation.
///
/// Any generator or schema problem surfaces as `GenerationFailed`.
pub fn create_presentation(
    generator: &dyn SlideGenerator,
    request: &GenerationRequest,
) -> Result<Presentation> {
    request.validate()?;

    info!(
        "Generating presentation {:?} with {} / {}",
        request.title, request.design_template, request.theme_variant
    );
    let response = generator.generate_presentation(request).map_err(|e| {
        warn!("Generator call failed: {}", e);
        ForgeError::GenerationFailed(e.to_string())
    })?;

    let slides = parse_deck(response).map_err(ForgeError::GenerationFailed)?;
    debug!("Generator returned {} slides", slides.len());

    Ok(Presentation::new(
        request.title.trim(),
        &request.design_template,
        &request.theme_variant,
        slides,
    ))
}

/// Ask the generator for bullet points for one slide title.
pub fn suggest_bullets(generator: &dyn SlideGenerator, title: &str) -> Result<Vec<String>> {
    if title.trim().is_empty() {
        return Err(ForgeError::ValidationError(
            "Slide title is required to suggest bullet points".to_string(),
        ));
    }

    let response = generator
        .generate_bullet_points(title.trim())
        .map_err(|e| ForgeError::GenerationFailed(e.to_string()))?;
    let parsed: GeneratedBullets = serde_json::from_value(response)
        .map_err(|e| ForgeError::GenerationFailed(format!("unexpected response shape: {}", e)))?;
    clean_bullets(parsed.bullet_points, "suggestion").map_err(ForgeError::GenerationFailed)
}

/// Build the instruction text sent along with a presentation request.
pub fn presentation_prompt(request: &GenerationRequest) -> String {
    let mut prompt = String::from(
        "Write a presentation the way a person would present it to a class or a team. \
Use plain, natural language and avoid marketing phrases.\n\n",
    );
    prompt.push_str(&format!("Presentation title: {}\n", request.title));
    prompt.push_str(&format!("Topic: {}\n", request.topic));
    if let Some(raw_text) = &request.raw_text {
        prompt.push_str(&format!("Source text (primary material): {}\n", raw_text));
    }
    prompt.push_str(&format!("Design template: {}\n", request.design_template));
    prompt.push_str(&format!("Theme: {}\n\n", request.theme_variant));
    prompt.push_str(&format!(
        "Produce {} to {} slides. Open with a short title slide and close with a brief wrap-up. \
Give every slide a clear heading and 3 to {} short bullet points that are easy to say aloud. \
No paragraphs. Respond with JSON of the form \
{{\"slides\": [{{\"title\": string, \"bulletPoints\": [string]}}]}}.",
        MIN_SLIDES, MAX_SLIDES, MAX_BULLETS
    ));
    prompt
}

/// Build the instruction text for a single slide's bullet points.
pub fn bullet_prompt(title: &str) -> String {
    format!(
        "Suggest 3 to {} short, informative bullet points for a slide titled {:?}. \
Respond with JSON of the form {{\"bulletPoints\": [string]}}.",
        MAX_BULLETS, title
    )
}

/// Replays a saved generator response, for importing a deck offline.
pub struct StaticGenerator {
    response: Value,
}

impl StaticGenerator {
    pub fn new(response: Value) -> Self {
        Self { response }
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        crate::utils::validate_file_exists(path)?;
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::new(serde_json::from_str(&raw)?))
    }
}

impl SlideGenerator for StaticGenerator {
    fn generate_presentation(&self, _request: &GenerationRequest) -> Result<Value> {
        Ok(self.response.clone())
    }

    fn generate_bullet_points(&self, _title: &str) -> Result<Value> {
        match self.response.get("bulletPoints") {
            Some(_) => Ok(self.response.clone()),
            None => Err(ForgeError::GenerationFailed(
                "saved response has no bulletPoints".to_string(),
            )),
        }
    }
}

/// Posts requests to a JSON generation endpoint.
pub struct HttpGenerator {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl HttpGenerator {
    pub fn new(endpoint: Url, api_key: Option<String>, timeout_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn post(&self, body: &Value) -> Result<Value> {
        info!("Calling generation endpoint {}", self.endpoint);
        let mut request = self.client.post(self.endpoint.clone()).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send()?.error_for_status()?;
        Ok(response.json::<Value>()?)
    }
}

impl SlideGenerator for HttpGenerator {
    fn generate_presentation(&self, request: &GenerationRequest) -> Result<Value> {
        self.post(&json!({
            "kind": "presentation",
            "prompt": presentation_prompt(request),
            "input": request,
        }))
    }

    fn generate_bullet_points(&self, title: &str) -> Result<Value> {
        self.post(&json!({
            "kind": "bulletPoints",
            "prompt": bullet_prompt(title),
            "input": { "title": title },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, SessionStore};
    use std::cell::Cell;
    use std::collections::HashSet;

    /// Returns canned JSON and counts calls.
    struct Canned {
        deck: Value,
        bullets: Value,
        calls: Cell<usize>,
    }

    impl Canned {
        fn new(deck: Value) -> Self {
            Self {
                deck,
                bullets: json!({"bulletPoints": ["a", "b", "c"]}),
                calls: Cell::new(0),
            }
        }
    }

    impl SlideGenerator for Canned {
        fn generate_presentation(&self, _request: &GenerationRequest) -> Result<Value> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.deck.clone())
        }

        fn generate_bullet_points(&self, _title: &str) -> Result<Value> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.bullets.clone())
        }
    }

    struct Failing;

    impl SlideGenerator for Failing {
        fn generate_presentation(&self, _request: &GenerationRequest) -> Result<Value> {
            Err(ForgeError::UnknownError("quota exceeded".to_string()))
        }

        fn generate_bullet_points(&self, _title: &str) -> Result<Value> {
            Err(ForgeError::UnknownError("quota exceeded".to_string()))
        }
    }

    fn slides(count: usize, bullets: usize) -> Value {
        let slides: Vec<Value> = (0..count)
            .map(|i| {
                let points: Vec<String> = (0..bullets).map(|b| format!("point {}", b)).collect();
                json!({
                    "title": format!("Part {}", i + 1),
                    "bulletPoints": points,
                })
            })
            .collect();
        json!({ "slides": slides })
    }

    fn space_request() -> GenerationRequest {
        GenerationRequest::new("Space", "exploring the cosmos", "astral-core", "dark")
    }

    #[test]
    fn space_scenario_round_trips_through_storage() {
        let generator = Canned::new(slides(6, 3));
        let presentation = create_presentation(&generator, &space_request()).unwrap();

        assert_eq!(presentation.title, "Space");
        assert_eq!(presentation.template, "astral-core");
        assert_eq!(presentation.theme, "dark");
        assert_eq!(presentation.transition.as_deref(), Some("none"));
        assert_eq!(presentation.len(), 6);
        for slide in &presentation.slides {
            assert!(!slide.id.is_empty());
            assert_eq!(slide.image_url, "");
            assert_eq!(slide.transition, "none");
            assert_eq!(slide.bullet_points.len(), 3);
        }
        let ids: HashSet<&str> = presentation.slide_ids().into_iter().collect();
        assert_eq!(ids.len(), 6);

        let store = SessionStore::new(MemoryStorage::new());
        store.save_presentation(&presentation).unwrap();
        assert_eq!(store.load_presentation().unwrap(), Some(presentation));
    }

    #[test]
    fn invalid_request_never_reaches_generator() {
        let generator = Canned::new(slides(5, 3));
        let mut request = space_request();
        request.title = "Sp".to_string();
        assert!(matches!(
            create_presentation(&generator, &request),
            Err(ForgeError::ValidationError(_))
        ));

        let mut request = space_request();
        request.topic = "short".to_string();
        assert!(create_presentation(&generator, &request).is_err());

        let mut request = space_request();
        request.design_template = "neon-dream".to_string();
        assert!(create_presentation(&generator, &request).is_err());

        assert_eq!(generator.calls.get(), 0);
    }

    #[test]
    fn slide_count_outside_bounds_fails() {
        for count in [4, 11] {
            let generator = Canned::new(slides(count, 3));
            assert!(matches!(
                create_presentation(&generator, &space_request()),
                Err(ForgeError::GenerationFailed(_))
            ));
        }
        let generator = Canned::new(slides(10, 5));
        assert!(create_presentation(&generator, &space_request()).is_ok());
    }

    #[test]
    fn bullet_count_and_title_are_enforced() {
        let generator = Canned::new(slides(5, 6));
        assert!(create_presentation(&generator, &space_request()).is_err());

        let generator = Canned::new(slides(5, 0));
        assert!(create_presentation(&generator, &space_request()).is_err());

        let mut deck = slides(5, 2);
        deck["slides"][2]["title"] = json!("   ");
        let generator = Canned::new(deck);
        assert!(create_presentation(&generator, &space_request()).is_err());
    }

    #[test]
    fn malformed_response_is_generation_failure() {
        let generator = Canned::new(json!({"pages": []}));
        let err = create_presentation(&generator, &space_request()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to create presentation"));
    }

    #[test]
    fn generator_error_is_wrapped_once() {
        let err = create_presentation(&Failing, &space_request()).unwrap_err();
        match err {
            ForgeError::GenerationFailed(message) => assert!(message.contains("quota exceeded")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn suggestions_are_validated() {
        let generator = Canned::new(slides(5, 3));
        assert_eq!(
            suggest_bullets(&generator, "Orbits").unwrap(),
            vec!["a", "b", "c"]
        );
        assert!(suggest_bullets(&generator, "  ").is_err());

        let mut generator = Canned::new(slides(5, 3));
        generator.bullets = json!({"bulletPoints": []});
        assert!(suggest_bullets(&generator, "Orbits").is_err());
    }

    #[test]
    fn request_uses_camel_case_and_prompt_mentions_inputs() {
        let request = space_request().with_raw_text("Notes on Mars");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["designTemplate"], "astral-core");
        assert_eq!(value["themeVariant"], "dark");
        assert_eq!(value["rawText"], "Notes on Mars");

        let prompt = presentation_prompt(&request);
        assert!(prompt.contains("exploring the cosmos"));
        assert!(prompt.contains("Notes on Mars"));
        assert!(prompt.contains("bulletPoints"));
    }
}

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::api_connection::endpoints::{GenerateContentRequest, GenerationConfig, Provider};
use crate::catalog::Recipe;

/// At most this many recipes are shown to the model per request; the full
/// catalog is never transmitted.
pub const CANDIDATE_SAMPLE_SIZE: usize = 40;

// Per-recipe detail caps inside the prompt.
const PROMPT_INGREDIENT_CAP: usize = 6;
const PROMPT_TAG_CAP: usize = 6;

const SELECTION_MODEL: &str = "gemini-2.5-flash";
const SELECTION_TEMPERATURE: f32 = 0.45;

/// Parsed model output. `meals` must be present and a JSON list for the
/// response to count as an answer at all; per-field leniency lives on
/// `GeminiMeal`.
#[derive(Debug, Deserialize, Clone)]
pub struct GeminiPlan {
    #[serde(default, deserialize_with = "lenient_text")]
    pub goal_expanded: Option<String>,
    pub meals: Vec<GeminiMeal>,
}

/// One candidate from the model. Numeric fields accept numbers or numeric
/// strings and coerce anything else (negatives included) to 0; text fields
/// accept non-string scalars. `meal_number` is parsed but never trusted:
/// final numbering is reassigned during reconciliation.
#[derive(Debug, Deserialize, Clone)]
pub struct GeminiMeal {
    #[serde(default, deserialize_with = "lenient_id")]
    pub recipe_id: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub meal_number: u32,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub reason: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub instructions: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub calories_kcal: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub protein_g: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub carbs_g: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub fats_g: u32,
}

// Catalog ids are positive, so 0 is a safe "never matches" placeholder for
// unusable id values.
fn lenient_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.map_or(0, |f| if f.is_finite() && f > 0.0 { f as u32 } else { 0 }))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Uniform sample, without replacement, of the catalog entries offered to
/// the model. The injectable rng keeps selection reproducible in tests.
pub fn sample_candidates<'a, R>(catalog: &'a [Recipe], rng: &mut R) -> Vec<&'a Recipe>
where
    R: Rng + ?Sized,
{
    catalog
        .choose_multiple(rng, CANDIDATE_SAMPLE_SIZE.min(catalog.len()))
        .collect()
}

pub(crate) fn build_selection_prompt(goal: &str, num_meals: usize, candidates: &[&Recipe]) -> String {
    let mut catalog_lines = Vec::with_capacity(candidates.len());
    for recipe in candidates {
        let tags = if recipe.tags.is_empty() {
            "N/A".to_string()
        } else {
            recipe
                .tags
                .iter()
                .take(PROMPT_TAG_CAP)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        };
        let ingredients = if recipe.ingredients.is_empty() {
            "N/A".to_string()
        } else {
            recipe
                .ingredients
                .iter()
                .take(PROMPT_INGREDIENT_CAP)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        };
        catalog_lines.push(format!(
            "- id:{} | name:{} | tags:{} | ingredients:{}",
            recipe.id, recipe.name, tags, ingredients
        ));
    }
    let catalog_text = catalog_lines.join("\n");

    format!(
        "You are a registered dietitian. Choose exactly {num_meals} meals from the catalog below that best align with the user's goal.
Goal: \"{goal}\"

Catalog (only choose from these):
{catalog_text}

Return ONLY a valid JSON object of this shape:
{{
  \"goal_expanded\": \"one or two sentences on how to eat for this goal\",
  \"meals\": [
    {{
      \"meal_number\": 1,
      \"recipe_id\": 123,
      \"name\": \"the recipe's name\",
      \"summary\": \"why this recipe fits the goal\",
      \"reason\": \"clear, user-friendly rationale\",
      \"instructions\": \"one or two short preparation sentences\"
    }}
  ]
}}
Rules: every recipe_id must come from the catalog above, no markdown formatting, and include exactly {num_meals} meals."
    )
}

/// Parse the model's raw text into a `GeminiPlan`. Markdown code fences are
/// stripped first; any remaining parse failure yields `None`.
pub(crate) fn parse_gemini_plan(raw: &str) -> Option<GeminiPlan> {
    let mut content_str = raw.trim().to_string();

    if content_str.starts_with("```json") && content_str.ends_with("```") {
        content_str = content_str
            .trim_start_matches("```json")
            .trim_end_matches("```")
            .trim()
            .to_string();
    } else if content_str.starts_with("```") && content_str.ends_with("```") {
        content_str = content_str
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
            .to_string();
    }

    if content_str.is_empty() {
        return None;
    }

    serde_json::from_str(&content_str).ok()
}

/// Ask Gemini to pick `num_meals` recipes for the goal.
///
/// `None` covers every unavailability flavor the caller handles the same
/// way: no API key configured, transport failure, empty response, or a
/// response that is not the expected JSON shape.
pub async fn request_gemini_plan<R>(
    goal: &str,
    num_meals: usize,
    catalog: &[Recipe],
    rng: &mut R,
) -> Option<GeminiPlan>
where
    R: Rng + ?Sized,
{
    let provider = Provider::gemini();
    if provider.resolve_api_key().is_err() {
        // Running without a key is a supported offline mode, not an error.
        return None;
    }

    let candidates = sample_candidates(catalog, rng);
    if candidates.is_empty() {
        return None;
    }

    let prompt = build_selection_prompt(goal, num_meals, &candidates);
    let request = GenerateContentRequest::from_prompt(
        prompt,
        Some(GenerationConfig {
            temperature: Some(SELECTION_TEMPERATURE),
            response_mime_type: Some("application/json".to_string()),
            max_output_tokens: None,
        }),
    );

    match provider.call_generate_content(SELECTION_MODEL, request).await {
        Ok(response) => response.primary_text().and_then(parse_gemini_plan),
        Err(e) => {
            eprintln!("Gemini meal selection call failed: {}", e);
            None
        }
    }
}

use std::path::Path;

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::debug;

use caltrack_core::analysis::{ANALYSIS_PROMPT, ImageAnalysisProvider, parse_detected_foods};
use caltrack_core::models::Food;

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Image {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.as_ref()?.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

/// Image MIME type from a file extension.
pub fn mime_type_for(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "webp" => Ok("image/webp"),
        "heic" => Ok("image/heic"),
        "heif" => Ok("image/heif"),
        _ => bail!(
            "Unsupported image type '{}'. Use a .jpg, .png, .webp or .heic file",
            path.display()
        ),
    }
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    rt: tokio::runtime::Handle,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("caltrack-cli/{}", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(60))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_key,
            model,
            base_url: API_BASE_URL.to_string(),
            rt: tokio::runtime::Handle::current(),
        })
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// The key travels in a header so it never shows up in request errors.
    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    pub async fn analyze_async(&self, image: &[u8], mime_type: &str) -> Result<Vec<Food>> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Image {
                        inline_data: InlineData {
                            mime_type,
                            data: STANDARD.encode(image),
                        },
                    },
                    Part::Text {
                        text: ANALYSIS_PROMPT,
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        debug!(model = %self.model, bytes = image.len(), "sending image to Gemini");
        let resp = self
            .client
            .post(self.url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to reach the Gemini API")?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to read the Gemini response")?;

        let parsed: Option<GenerateResponse> = serde_json::from_str(&body).ok();
        if !status.is_success() {
            let message = parsed
                .and_then(|r| r.error)
                .map_or(body, |e| e.message);
            bail!("Gemini API error ({}): {message}", status.as_u16());
        }

        let parsed = parsed.context("Failed to parse the Gemini response")?;
        if let Some(err) = parsed.error {
            bail!("Gemini API error: {}", err.message);
        }
        let text = parsed.text().unwrap_or_default();
        parse_detected_foods(&text)
    }
}

impl ImageAnalysisProvider for GeminiClient {
    fn analyze(&self, image: &[u8], mime_type: &str) -> Result<Vec<Food>> {
        // Callers on a runtime thread must wrap this in `block_in_place`.
        self.rt.block_on(self.analyze_async(image, mime_type))
    }
}

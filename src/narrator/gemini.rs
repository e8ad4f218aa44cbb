//! Gemini `generateContent` client
//!
//! Browser builds post through `fetch` on a `spawn_local` task and settle the
//! reply when the response lands. Native builds post with a blocking client
//! on a worker thread and send the answer back through the inbox channel.

use serde::{Deserialize, Serialize};

use super::{LoreError, LoreReply, LoreRequest, Narrator};
use crate::settings::NarratorConfig;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Pull the generated text out of a response body
pub fn extract_text(body: &str) -> Result<String, LoreError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| LoreError::BadResponse(e.to_string()))?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        return Err(LoreError::EmptyResponse);
    }
    Ok(text.to_string())
}

/// Narrator backed by the Gemini API
#[derive(Debug, Clone)]
pub struct GeminiNarrator {
    config: NarratorConfig,
}

impl GeminiNarrator {
    pub fn new(config: NarratorConfig) -> Self {
        Self { config }
    }

    /// Endpoint for a given key
    pub fn endpoint(&self, key: &str) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            API_BASE, self.config.model, key
        )
    }

    pub fn request_body(&self, request: &LoreRequest) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(request.prompt()),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_output_tokens,
                temperature: self.config.temperature,
            },
        }
    }
}

impl Narrator for GeminiNarrator {
    fn describe(&self, request: LoreRequest, reply: LoreReply) {
        let Some(key) = self.config.credentials() else {
            reply.settle(Err(LoreError::MissingCredentials));
            return;
        };
        let url = self.endpoint(key);
        let body = self.request_body(&request);
        log::debug!(
            "Requesting narration for {} (ticket {})",
            request.species_name,
            request.ticket
        );

        #[cfg(target_arch = "wasm32")]
        {
            let body = match serde_json::to_string(&body) {
                Ok(body) => body,
                Err(e) => {
                    reply.settle(Err(LoreError::BadResponse(e.to_string())));
                    return;
                }
            };
            wasm_bindgen_futures::spawn_local(async move {
                let result = web::post(&url, &body).await;
                reply.settle(result);
            });
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let reply = reply.into_remote();
            let spawned = std::thread::Builder::new()
                .name("narrator".into())
                .spawn(move || reply.settle(native::post(&url, &body)));
            // The closure, and with it the reply, is dropped on failure
            if let Err(e) = spawned {
                log::warn!("Could not start narration thread: {}", e);
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    use super::{LoreError, extract_text};

    fn js_err(e: JsValue) -> LoreError {
        LoreError::Transport(format!("{:?}", e))
    }

    pub async fn post(url: &str, body: &str) -> Result<String, LoreError> {
        let window = web_sys::window().ok_or_else(|| LoreError::Transport("no window".into()))?;

        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::Cors);
        opts.set_body(&JsValue::from_str(body));

        let request = Request::new_with_str_and_init(url, &opts).map_err(js_err)?;
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(js_err)?;

        let value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_err)?;
        let response: Response = value.dyn_into().map_err(js_err)?;
        if !response.ok() {
            return Err(LoreError::Transport(format!("HTTP {}", response.status())));
        }

        let text = JsFuture::from(response.text().map_err(js_err)?)
            .await
            .map_err(js_err)?;
        let text = text
            .as_string()
            .ok_or_else(|| LoreError::BadResponse("body is not text".into()))?;
        extract_text(&text)
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::Duration;

    use super::{GenerateRequest, LoreError, extract_text};

    const TIMEOUT: Duration = Duration::from_secs(15);

    pub fn post(url: &str, body: &GenerateRequest) -> Result<String, LoreError> {
        let transport = |e: reqwest::Error| LoreError::Transport(e.without_url().to_string());

        let client = reqwest::blocking::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(transport)?;
        let response = client.post(url).json(body).send().map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoreError::Transport(format!("HTTP {}", status)));
        }
        let text = response.text().map_err(transport)?;
        extract_text(&text)
    }
}

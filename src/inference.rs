use std::fmt;

use reqwest::{Client, RequestBuilder, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::configuration::BackendSettings;
use crate::error::QuizError;
use crate::quiz::{build_prompt, extract_quiz, Quiz, QuizRequest, QUESTION_COUNT};
use crate::telemetry::BACKEND_DURATION;

/// Decoding profile for a generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProfile {
    /// Small context and output budget on a lighter model.
    Fast,
    Full,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelOptions {
    pub temperature: f64,
    pub num_predict: u32,
    pub num_ctx: u32,
    pub stop: Vec<String>,
    pub repeat_penalty: f64,
}

impl ModelProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelProfile::Fast => "fast",
            ModelProfile::Full => "full",
        }
    }

    pub fn options(&self) -> ModelOptions {
        let (temperature, num_predict, num_ctx) = match self {
            ModelProfile::Fast => (0.2, 250, 512),
            ModelProfile::Full => (0.3, 500, 2048),
        };
        ModelOptions {
            temperature,
            num_predict,
            num_ctx,
            stop: vec!["</s>".to_owned()],
            repeat_penalty: 1.1,
        }
    }

    /// Full runs wrap the instruction in the model's system prompt tags.
    pub fn wrap_prompt(&self, prompt: &str) -> String {
        match self {
            ModelProfile::Fast => prompt.to_owned(),
            ModelProfile::Full => format!("<s>[INST] <<SYS>>\n{prompt}\n<</SYS>>[/INST]"),
        }
    }
}

impl fmt::Display for ModelProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: ModelOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// HTTP client for an Ollama-compatible runner or a worker proxy in front of one.
pub struct BackendClient {
    http: Client,
    base_url: Option<String>,
    full_model: String,
    fast_model: String,
    api_key: Option<SecretString>,
}

impl BackendClient {
    pub fn new(settings: &BackendSettings) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(settings.timeout()).build()?;
        Ok(Self {
            http,
            base_url: settings
                .url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(|url| url.trim_end_matches('/').to_owned()),
            full_model: settings.full_model.clone(),
            fast_model: settings.fast_model.clone(),
            api_key: settings.api_key.clone().map(SecretString::from),
        })
    }

    pub fn model(&self, profile: ModelProfile) -> &str {
        match profile {
            ModelProfile::Fast => &self.fast_model,
            ModelProfile::Full => &self.full_model,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, QuizError> {
        let base = self
            .base_url
            .as_deref()
            .ok_or_else(|| QuizError::Configuration("backend URL is not set".to_owned()))?;
        let url = Url::parse(&format!("{base}/{path}"))
            .map_err(|e| QuizError::Configuration(format!("invalid backend URL {base}: {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(QuizError::Configuration(format!(
                "invalid backend URL {base}: expected an http or https URL"
            ))),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        }
    }

    /// Runs one completion and returns the model's raw text, trimmed.
    pub async fn generate(&self, prompt: &str, profile: ModelProfile) -> Result<String, QuizError> {
        let url = self.endpoint("api/generate")?;
        let prompt = profile.wrap_prompt(prompt);
        let body = GenerateRequest {
            model: self.model(profile),
            prompt: &prompt,
            stream: false,
            options: profile.options(),
        };

        tracing::debug!("Sending {profile} generation request to {url}");
        let timer = BACKEND_DURATION
            .with_label_values(&[profile.as_str()])
            .start_timer();
        let response = self
            .authorized(self.http.post(url))
            .json(&body)
            .send()
            .await
            .map_err(QuizError::BackendUnavailable)?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(QuizError::BackendUnavailable)?;
        timer.observe_duration();

        if !status.is_success() {
            return Err(QuizError::Backend {
                status: status.as_u16(),
                body: text,
            });
        }
        let data: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| QuizError::Backend {
                status: status.as_u16(),
                body: format!("unexpected response body: {e}"),
            })?;
        Ok(data.response.trim().to_owned())
    }

    /// Builds the prompt, asks the backend and pulls the quiz out of its answer.
    pub async fn generate_quiz(
        &self,
        request: &QuizRequest,
        profile: ModelProfile,
    ) -> Result<Quiz, QuizError> {
        tracing::info!(
            "Generating {} quiz on {:?} ({profile})",
            request.difficulty(),
            request.topic()
        );
        let prompt = build_prompt(request.topic(), QUESTION_COUNT, request.difficulty());
        let raw = self.generate(&prompt, profile).await?;
        extract_quiz(&raw).map_err(|e| {
            tracing::warn!("Could not extract quiz from model output: {e}");
            tracing::debug!("Raw model output: {raw}");
            QuizError::from(e)
        })
    }

    /// Lists the models the backend serves; doubles as a connectivity check.
    pub async fn list_models(&self) -> Result<serde_json::Value, QuizError> {
        let url = self.endpoint("api/tags")?;
        let response = self
            .authorized(self.http.get(url))
            .send()
            .await
            .map_err(QuizError::BackendUnavailable)?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(QuizError::BackendUnavailable)?;
            return Err(QuizError::Backend {
                status: status.as_u16(),
                body,
            });
        }
        response.json().await.map_err(|e| QuizError::Backend {
            status: status.as_u16(),
            body: format!("unexpected response body: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(url: Option<&str>) -> BackendSettings {
        BackendSettings {
            url: url.map(str::to_owned),
            full_model: "full-model".to_owned(),
            fast_model: "fast-model".to_owned(),
            timeout_secs: 1,
            api_key: None,
        }
    }

    #[test]
    fn profiles_carry_decoding_options() {
        let fast = ModelProfile::Fast.options();
        assert_eq!((fast.num_predict, fast.num_ctx), (250, 512));
        assert_eq!(fast.temperature, 0.2);
        let full = ModelProfile::Full.options();
        assert_eq!((full.num_predict, full.num_ctx), (500, 2048));
        assert_eq!(full.stop, vec!["</s>".to_owned()]);
        assert_eq!(full.repeat_penalty, 1.1);
    }

    #[test]
    fn only_full_profile_wraps_prompt() {
        assert_eq!(ModelProfile::Fast.wrap_prompt("hi"), "hi");
        let wrapped = ModelProfile::Full.wrap_prompt("hi");
        assert!(wrapped.starts_with("<s>[INST] <<SYS>>"));
        assert!(wrapped.ends_with("<</SYS>>[/INST]"));
    }

    #[test]
    fn endpoint_joins_base_url() {
        let client = BackendClient::new(&settings(Some("http://localhost:11436/"))).unwrap();
        assert_eq!(
            client.endpoint("api/generate").unwrap().as_str(),
            "http://localhost:11436/api/generate"
        );
        assert_eq!(client.model(ModelProfile::Fast), "fast-model");
    }

    #[tokio::test]
    async fn unconfigured_url_fails_before_network() {
        let client = BackendClient::new(&settings(Some("  "))).unwrap();
        let err = client.generate("prompt", ModelProfile::Full).await.unwrap_err();
        assert!(matches!(err, QuizError::Configuration(_)));
        let err = client.list_models().await.unwrap_err();
        assert!(matches!(err, QuizError::Configuration(_)));
    }

    #[test]
    fn invalid_url_is_a_configuration_error() {
        for url in ["not a url", "localhost:11436", "ftp://models.local"] {
            let client = BackendClient::new(&settings(Some(url))).unwrap();
            assert!(
                matches!(client.endpoint("api/tags"), Err(QuizError::Configuration(_))),
                "{url}"
            );
        }
    }

    #[tokio::test]
    async fn url_without_scheme_is_reported_as_unconfigured() {
        let client = BackendClient::new(&settings(Some("localhost:11436"))).unwrap();
        let err = client.generate("prompt", ModelProfile::Fast).await.unwrap_err();
        assert_eq!(err.kind(), "unconfigured");
    }
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use log::{debug, trace, error};

use crate::config::PrimaryConfig;

// ===== Wire Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part
{   pub text: String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content
{   #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>
  , #[serde(default)]
    pub parts: Vec<Part>
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig
{   pub temperature: f32
  , pub top_p: f32
  , pub top_k: u32
  , pub max_output_tokens: u32
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest
{   pub system_instruction: Content
  , pub contents: Vec<Content>
  , pub generation_config: GenerationConfig
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse
{   #[serde(default)]
    pub candidates: Vec<Candidate>
  , #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate
{   #[serde(default)]
    pub content: Option<Content>
  , #[serde(default)]
    pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback
{   #[serde(default)]
    pub block_reason: Option<String>
}

impl GenerateContentResponse
{   /// Concatenated text of the first candidate
    pub fn into_text(self) -> crate::Result<String>
    {   if let Some(reason) = self.prompt_feedback
          .as_ref()
          .and_then(|f| f.block_reason.clone())
        {   return Err(crate::Error::EmptyResponse(
              format!("prompt blocked: {}", reason)
            ));
        }

        let candidate = self.candidates
          .into_iter()
          .next()
          .ok_or_else(|| {
            crate::Error::EmptyResponse(
              "no candidates in response".to_string()
            )
          })?;

        let text: String = candidate.content
          .map(|c| c.parts
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("")
          )
          .unwrap_or_default();

        if text.trim().is_empty()
        {   return Err(crate::Error::EmptyResponse(
              format!(
                "candidate had no text (finish reason: {})",
                candidate.finish_reason
                  .as_deref()
                  .unwrap_or("unknown")
              )
            ));
        }
        Ok(text)
    }
}

// ===== Gemini Client =====

/// Primary backend: one generateContent call per request
pub struct GeminiClient
{   api_key: Option<String>
  , config: PrimaryConfig
  , http_client: reqwest::Client
}

impl std::fmt::Debug for GeminiClient
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) 
      -> std::fmt::Result
    {   f.debug_struct("GeminiClient")
          .field("api_base", &self.config.api_base)
          .field("model", &self.config.model)
          .field("api_key", 
            &self.api_key.as_ref().map(|_| "[REDACTED]")
          )
          .finish()
    }
}

impl GeminiClient
{   pub fn new(
      api_key: Option<String>
    , config: PrimaryConfig
    , timeout: std::time::Duration
    ) -> crate::Result<Self>
    {   debug!("Creating GeminiClient for {}", config.api_base);
        let http_client = reqwest::Client::builder()
          .timeout(timeout)
          .build()
          .map_err(|e| {
            crate::Error::InvalidConfiguration(
              format!("Failed to create HTTP client: {}", e)
            )
          })?;
        Ok(GeminiClient
        {   api_key
          , config
          , http_client
        })
    }

    fn get_api_key(&self) -> crate::Result<&str>
    {   self.api_key
          .as_deref()
          .ok_or_else(|| {
            error!("No API key for primary backend");
            crate::Error::MissingApiKey(
              self.config.api_key_env.clone()
            )
          })
    }

    fn build_request(
      &self
    , prompt: &crate::ComposedPrompt
    , request: &crate::GenerationRequest
    ) -> GenerateContentRequest
    {   GenerateContentRequest
        {   system_instruction: Content
            {   role: None
              , parts: vec![
                  Part { text: prompt.system_instruction.clone() }
                ]
            }
          , contents: vec![
              Content
              {   role: Some("user".to_string())
                , parts: vec![
                    Part { text: prompt.user_instruction.clone() }
                  ]
              }
            ]
          , generation_config: GenerationConfig
            {   temperature: request.temperature
              , top_p: self.config.top_p
              , top_k: self.config.top_k
              , max_output_tokens: request.max_output_tokens
            }
        }
    }
}

#[async_trait]
impl super::GenerationBackend for GeminiClient
{   fn kind(&self) -> crate::Backend
    {   crate::Backend::Primary
    }

    async fn generate(
      &self
    , prompt: &crate::ComposedPrompt
    , request: &crate::GenerationRequest
    ) -> crate::Result<String>
    {   let api_key = self.get_api_key()?;
        let model = self.config.model_for(request.model.as_deref());
        debug!("Gemini generateContent with model: {}", model);

        let body = self.build_request(prompt, request);
        trace!("Gemini request: {:?}", body);

        let response = self.http_client
          .post(format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            model
          ))
          .header("x-goog-api-key", api_key)
          .header("Content-Type", "application/json")
          .json(&body)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            crate::Error::from(e)
          })?;

        let status = response.status();
        trace!("Gemini response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_| 
                "Unknown error".to_string()
              );
            error!("Gemini API error: {}", error_text);
            return Err(super::error_for_status(status, error_text));
        }

        let reply: GenerateContentResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            crate::Error::ParseError(e.to_string())
          })?;

        reply.into_text()
    }
}

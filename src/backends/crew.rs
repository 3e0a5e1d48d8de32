//! Secondary backend: a small crew of agents running tasks
//! in sequence against an OpenAI-compatible chat endpoint.
//!
//! Each task sees the output of the task before it; the last
//! task's output is the crew's final artifact.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use log::{debug, trace, error, info};

use std::sync::Arc;

use crate::capability::CapabilityProbe;
use crate::config::SecondaryConfig;

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse
{   #[serde(default)]
    pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ResponseMessage
  , pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage
{   #[serde(default)]
    pub content: Option<String>
}

// ===== Crew Model =====

/// A crew member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrewAgent
{   pub role: String
  , pub goal: String
  , pub backstory: String
}

impl CrewAgent
{   fn system_message(&self) -> String
    {   format!(
          "You are {}. {}\nYour personal goal is: {}",
          self.role, self.backstory, self.goal
        )
    }
}

/// One unit of work assigned to an agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrewTask
{   pub description: String
  , pub expected_output: String
  , /// Index into `Crew::agents`
    pub agent: usize
}

impl CrewTask
{   fn user_message(&self, context: Option<&str>) -> String
    {   let mut message = format!(
          "Current Task: {}\n\n\
           This is the expected criteria for your final \
           answer: {}",
          self.description,
          self.expected_output
        );
        if let Some(context) = context
        {   message.push_str(
              "\n\nThis is the context you're working with:\n"
            );
            message.push_str(context);
        }
        message
    }
}

/// Agents plus the ordered tasks they execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crew
{   pub agents: Vec<CrewAgent>
  , pub tasks: Vec<CrewTask>
}

impl Crew
{   /// The single-agent study crew used for every request
    pub fn study_crew(
      config: &SecondaryConfig
    , prompt: &crate::ComposedPrompt
    ) -> Self
    {   let agent = CrewAgent
        {   role: config.agent_role.clone()
          , goal: config.agent_goal.clone()
          , backstory: config.agent_backstory.clone()
        };
        let task = CrewTask
        {   description: format!(
              "Read the study context and the student's request, \
               then give a clear, structured response with \
               examples.\n\n{}",
              prompt.task_description()
            )
          , expected_output: 
              "A concise but clear answer with explanations \
               and, when helpful, step-by-step reasoning and \
               examples. Follow every formatting instruction in \
               the study context."
              .to_string()
          , agent: 0
        };
        Crew
        {   agents: vec![agent]
          , tasks: vec![task]
        }
    }

    fn validate(&self) -> crate::Result<()>
    {   if self.tasks.is_empty()
        {   return Err(crate::Error::InvalidConfiguration(
              "crew has no tasks".to_string()
            ));
        }
        if let Some(task) = self.tasks
          .iter()
          .find(|t| t.agent >= self.agents.len())
        {   return Err(crate::Error::InvalidConfiguration(
              format!("task assigned to missing agent {}", task.agent)
            ));
        }
        Ok(())
    }
}

// ===== Crew Client =====

/// Runs crews on an OpenAI-compatible endpoint
///
/// The key is read from the capability probe on every call,
/// never stored here.
pub struct CrewClient
{   credentials: Arc<CapabilityProbe>
  , config: SecondaryConfig
  , http_client: reqwest::Client
}

impl std::fmt::Debug for CrewClient
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) 
      -> std::fmt::Result
    {   f.debug_struct("CrewClient")
          .field("api_base", &self.config.api_base)
          .field("model", &self.config.model)
          .field("credential_env", 
            &self.credentials.credential_env()
          )
          .finish()
    }
}

impl CrewClient
{   pub fn new(
      credentials: Arc<CapabilityProbe>
    , config: SecondaryConfig
    , timeout: std::time::Duration
    ) -> crate::Result<Self>
    {   debug!("Creating CrewClient for {}", config.api_base);
        let http_client = reqwest::Client::builder()
          .timeout(timeout)
          .build()
          .map_err(|e| {
            crate::Error::InvalidConfiguration(
              format!("Failed to create HTTP client: {}", e)
            )
          })?;
        Ok(CrewClient
        {   credentials
          , config
          , http_client
        })
    }

    fn get_api_key(&self) -> crate::Result<String>
    {   self.credentials
          .credential()
          .ok_or_else(|| {
            error!("No API key for secondary backend");
            crate::Error::MissingApiKey(
              self.credentials.credential_env().to_string()
            )
          })
    }

    /// Execute every task in order; returns the last output
    pub async fn kickoff(
      &self
    , crew: &Crew
    , request: &crate::GenerationRequest
    ) -> crate::Result<String>
    {   crew.validate()?;
        info!(
          "Crew kickoff: {} agent(s), {} task(s)",
          crew.agents.len(),
          crew.tasks.len()
        );

        let mut context: Option<String> = None;
        for (step, task) in crew.tasks.iter().enumerate()
        {   debug!("Crew step {}/{}", step + 1, crew.tasks.len());
            let agent = &crew.agents[task.agent];
            let output = self.run_step(
                agent
              , task
              , context.as_deref()
              , request
              )
              .await?;
            context = Some(output);
        }

        context.ok_or_else(|| {
          crate::Error::EmptyResponse(
            "crew produced no output".to_string()
          )
        })
    }

    async fn run_step(
      &self
    , agent: &CrewAgent
    , task: &CrewTask
    , context: Option<&str>
    , request: &crate::GenerationRequest
    ) -> crate::Result<String>
    {   let api_key = self.get_api_key()?;

        let chat = ChatRequest
        {   model: self.config.model.clone()
          , messages: vec![
              ChatMessage
              {   role: "system".to_string()
                , content: agent.system_message()
              }
            , ChatMessage
              {   role: "user".to_string()
                , content: task.user_message(context)
              }
            ]
          , max_tokens: Some(request.max_output_tokens)
          , temperature: Some(request.temperature)
          , stream: Some(false)
        };

        trace!("Crew request: {:?}", chat);

        let response = self.http_client
          .post(format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
          ))
          .header("Authorization", format!("Bearer {}", api_key))
          .header("Content-Type", "application/json")
          .json(&chat)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            crate::Error::from(e)
          })?;

        let status = response.status();
        trace!("Crew response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_| 
                "Unknown error".to_string()
              );
            error!("Crew API error: {}", error_text);
            return Err(super::error_for_status(status, error_text));
        }

        let chat_response: ChatResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            crate::Error::ParseError(e.to_string())
          })?;

        chat_response.choices
          .into_iter()
          .next()
          .and_then(|c| c.message.content)
          .filter(|text| !text.trim().is_empty())
          .ok_or_else(|| {
            error!("No choices in response");
            crate::Error::EmptyResponse(
              "no choices in response".to_string()
            )
          })
    }
}

#[async_trait]
impl super::GenerationBackend for CrewClient
{   fn kind(&self) -> crate::Backend
    {   crate::Backend::Secondary
    }

    async fn generate(
      &self
    , prompt: &crate::ComposedPrompt
    , request: &crate::GenerationRequest
    ) -> crate::Result<String>
    {   let crew = Crew::study_crew(&self.config, prompt);
        self.kickoff(&crew, request).await
    }
}

//! The language-model collaborator. Article text is requested from the OpenAI
//! chat completions API with a single blocking request: no timeout, no retry.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// The environment variable holding the API credential.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// A text-completion service: given a system and a user instruction,
/// returns free-form text.
pub trait CompletionService {
    fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Builds the fixed system instruction. It pins the output to a metadata
/// header, a `---` separator, and an HTML body, which is the shape
/// [`crate::completion::parse_completion`] expects.
pub fn system_prompt(site_name: &str) -> String {
    format!(
        "You are an expert cybersecurity content writer for {site}, an \
enterprise cybersecurity and IT consulting firm. Write in a professional, \
authoritative tone. Output exactly in this format — do not add extra text \
before or after:

SEO_TITLE: [One line, max 60 characters, no quotes]
META_DESCRIPTION: [One line, max 160 characters, no quotes]
KEYWORDS: [Exactly 5 comma-separated keywords, no quotes]
---
[Article body as clean HTML only: use <h1> for the main title, <h2> for \
major sections, <h3> for subsections, <p> for paragraphs, <ul>/<li> or \
<ol>/<li> where appropriate. No <html>, <head>, or <body>. Approximately \
1000 words. Do NOT include a CTA or \"contact us\" block — that is added \
by the template.]",
        site = site_name
    )
}

/// Builds the user instruction for `topic`.
pub fn user_prompt(topic: &str) -> String {
    format!(
        "Write a comprehensive, SEO-optimized cybersecurity blog post on \
         this topic: {}",
        topic
    )
}

/// A [`CompletionService`] backed by the OpenAI chat completions API.
pub struct OpenAi {
    api_key: String,
    model: String,
    temperature: f32,
    client: Client,
}

impl OpenAi {
    pub fn new(
        api_key: String,
        model: String,
        temperature: f32,
    ) -> Result<OpenAi> {
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(Error::Http)?;
        Ok(OpenAi {
            api_key,
            model,
            temperature,
            client,
        })
    }

    /// Constructs a client with the credential from [`API_KEY_VAR`]. A
    /// missing or empty credential is an error.
    pub fn from_env(model: String, temperature: f32) -> Result<OpenAi> {
        match std::env::var(API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => {
                OpenAi::new(key, model, temperature)
            }
            _ => Err(Error::MissingApiKey),
        }
    }
}

impl CompletionService for OpenAi {
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", self.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).map_err(|_| Error::InvalidApiKey)?,
        );
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        info!(model = %self.model, "requesting completion");
        let resp = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .headers(headers)
            .json(&body)
            .send()
            .map_err(Error::Http)?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(Error::Status { status, body });
        }

        let parsed: ChatResponse = resp.json().map_err(Error::Http)?;
        let text = parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .unwrap_or_default();
        debug!(chars = text.len(), "received completion");
        Ok(text)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

/// The result of a completion request.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure talking to the completion service.
#[derive(Debug)]
pub enum Error {
    /// Returned when [`API_KEY_VAR`] is unset or empty.
    MissingApiKey,

    /// Returned when the credential can't be sent as an HTTP header.
    InvalidApiKey,

    /// Returned for transport and decoding errors.
    Http(reqwest::Error),

    /// Returned when the API answers with a non-success status.
    Status { status: u16, body: String },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingApiKey => {
                write!(f, "{} environment variable is not set.", API_KEY_VAR)
            }
            Error::InvalidApiKey => {
                write!(f, "{} is not a valid header value.", API_KEY_VAR)
            }
            Error::Http(err) => write!(f, "OpenAI API error: {}", err),
            Error::Status { status, body } => {
                write!(f, "OpenAI API error: status {}: {}", status, body)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(err) => Some(err),
            _ => None,
        }
    }
}

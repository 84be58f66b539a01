//! services/api/src/adapters/coach.rs
//!
//! This module contains the adapter for the AI learning coach.
//! It implements the `CoachService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::Value;

use skill_tracker_core::{
    domain::{PlatformKind, Quiz},
    ports::{CoachService, PortError, PortResult},
};

const QUIZ_SYSTEM_PROMPT: &str = "You are a teacher creating a quick assessment.";

const QUIZ_PROMPT_TEMPLATE: &str = r#"Generate a quiz with 5 multiple-choice questions based on the topic: "{topic}".

Return the response in this strictly valid JSON format:
{
  "questions": [
    {
      "id": 1,
      "question": "The question text here?",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "correctAnswer": "Option A"
    }
  ]
}
Ensure "correctAnswer" matches exactly one of the strings in "options"."#;

const GUIDE_SYSTEM_PROMPT: &str = "You are a helpful learning mentor for software engineers.";

/// Returns the mentor persona line used for a platform's study guide.
fn guide_persona(platform: PlatformKind) -> &'static str {
    match platform {
        PlatformKind::Leetcode | PlatformKind::Hackerrank => {
            "You are an expert coding mentor analyzing a learner's practice statistics."
        }
        PlatformKind::Youtube => {
            "You are a study coach analyzing a learner's video-course progress."
        }
        PlatformKind::Udemy | PlatformKind::Coursera => {
            "You are an expert learning consultant specializing in online courses and certifications."
        }
    }
}

/// An adapter that implements `CoachService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiCoachAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCoachAdapter {
    /// Creates a new `OpenAiCoachAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    async fn chat(
        &self,
        system: &str,
        user: String,
        json_output: bool,
    ) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages(messages).n(1);
        if json_output {
            builder.response_format(ResponseFormat::JsonObject);
        }
        let request = builder
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Coach LLM response contained no text content.".to_string())
            })
    }
}

#[async_trait]
impl CoachService for OpenAiCoachAdapter {
    async fn generate_quiz(&self, topic: &str) -> PortResult<Quiz> {
        let prompt = QUIZ_PROMPT_TEMPLATE.replace("{topic}", topic);
        let content = self.chat(QUIZ_SYSTEM_PROMPT, prompt, true).await?;

        serde_json::from_str(&content).map_err(|e| {
            PortError::Unexpected(format!("Coach LLM returned an unparseable quiz: {}", e))
        })
    }

    async fn study_guide(
        &self,
        platform: PlatformKind,
        display_name: &str,
        stats: &Value,
        question: &str,
    ) -> PortResult<String> {
        let prompt = format!(
            "{persona}\n\
             User: \"{display_name}\"\n\
             Platform: {platform}\n\
             Stats: {stats}\n\n\
             User Question: \"{question}\"\n\n\
             If the user asks for a study plan, provide:\n\
             1. Analysis of their current level.\n\
             2. Recommended topics or courses to tackle next.\n\
             3. A pro tip.\n\n\
             If the user asks a specific question, answer it using their stats as context.\n\
             Keep it encouraging and concise.",
            persona = guide_persona(platform),
        );

        self.chat(GUIDE_SYSTEM_PROMPT, prompt, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_payload_parses_into_the_domain_shape() {
        let content = r#"{
            "questions": [
                {
                    "id": 1,
                    "question": "What does ownership guarantee?",
                    "options": ["A", "B", "C", "D"],
                    "correctAnswer": "A"
                }
            ]
        }"#;
        let quiz: Quiz = serde_json::from_str(content).unwrap();
        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(quiz.questions[0].correct_answer, "A");
    }

    #[test]
    fn every_platform_has_a_persona() {
        for kind in [
            PlatformKind::Leetcode,
            PlatformKind::Hackerrank,
            PlatformKind::Youtube,
            PlatformKind::Udemy,
            PlatformKind::Coursera,
        ] {
            assert!(!guide_persona(kind).is_empty());
        }
    }
}

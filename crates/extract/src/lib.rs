pub mod cleanup;
pub mod llm;
pub mod prompt;
pub mod recovery;
pub mod schema;
pub mod validator;

pub use llm::{CompletionProvider, OllamaClient};
pub use recovery::{recover, recover_with_trace};
pub use schema::{ExtractionResult, Recovery, Strategy};
pub use validator::validate;

use anyhow::{Context, Result};

pub struct Extractor<P> {
    provider: P,
}

impl<P: CompletionProvider> Extractor<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Extract persons and organisations from a document.
    ///
    /// Only a failing provider surfaces as an error; a malformed reply
    /// degrades to empty lists.
    pub async fn extract_entities(&self, document: &str) -> Result<ExtractionResult> {
        Ok(self.extract_entities_traced(document).await?.result)
    }

    pub async fn extract_entities_traced(&self, document: &str) -> Result<Recovery> {
        let prompt = prompt::build_extraction_prompt(document);

        let reply = self.provider
            .complete(&prompt)
            .await
            .context("Completion provider failed")?;

        Ok(recover_with_trace(&reply))
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct MockLLM {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl MockLLM {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl CompletionProvider for MockLLM {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    struct FailingLLM;

    impl CompletionProvider for FailingLLM {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn test_extract_entities() {
        let mock = MockLLM::new(
            r#"{"persons": ["John Doe", "Alice", "Bob"], "organisations": ["Acme Corp", "Giga Tech"]}"#,
        );
        let extractor = Extractor::new(mock);

        let result = extractor.extract_entities("Test Document").await.unwrap();
        assert_eq!(result.persons, vec!["John Doe", "Alice", "Bob"]);
        assert_eq!(result.organisations, vec!["Acme Corp", "Giga Tech"]);

        let prompts = extractor.provider().prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Test Document"));
    }

    #[tokio::test]
    async fn test_garbage_reply_is_not_an_error() {
        let extractor = Extractor::new(MockLLM::new("I could not find any entities, sorry."));
        let recovery = extractor.extract_entities_traced("Test Document").await.unwrap();
        assert!(recovery.result.is_empty());
        assert_eq!(recovery.strategy, None);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let extractor = Extractor::new(FailingLLM);
        let err = extractor.extract_entities("Test Document").await.unwrap_err();
        assert!(format!("{err:#}").contains("connection refused"));
    }
}

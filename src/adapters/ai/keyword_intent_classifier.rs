//! Deterministic intent classifier that matches the catalogue's example
//! phrases. Used when no language model is configured.

use async_trait::async_trait;

use crate::domain::routing::GENERAL_QUERY;
use crate::ports::{ClassificationRequest, ClassifierError, IntentClassifier};

/// Matches example phrases against the message words.
///
/// Single-word examples must appear as a word; examples of two characters or
/// fewer ("no") only match the whole message. Multi-word examples match when
/// their words appear in order. The longest matching example wins, ties go to
/// the intent listed first.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordIntentClassifier;

impl KeywordIntentClassifier {
    pub fn new() -> Self {
        Self
    }

    fn words(text: &str) -> Vec<String> {
        text.to_lowercase()
            .replace('\u{2019}', "'")
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn matches(message: &[String], example: &[String]) -> bool {
        match example {
            [] => false,
            [word] if word.len() <= 2 => message.len() == 1 && &message[0] == word,
            [word] => message.contains(word),
            _ => {
                let mut remaining = message.iter();
                example.iter().all(|w| remaining.any(|m| m == w))
            }
        }
    }
}

#[async_trait]
impl IntentClassifier for KeywordIntentClassifier {
    async fn classify(&self, request: ClassificationRequest<'_>) -> Result<String, ClassifierError> {
        let message = Self::words(request.text);

        let mut best: Option<(&'static str, usize, usize)> = None;
        for intent in request.intents.intents() {
            for example in intent.examples() {
                let example_words = Self::words(example);
                if !Self::matches(&message, &example_words) {
                    continue;
                }
                let score = (example_words.len(), example.len());
                let better = match best {
                    Some((_, words, chars)) => score > (words, chars),
                    None => true,
                };
                if better {
                    best = Some((intent.name(), score.0, score.1));
                }
            }
        }

        Ok(best
            .map(|(name, _, _)| name.to_string())
            .unwrap_or_else(|| GENERAL_QUERY.to_string()))
    }
}

use std::collections::HashSet;

use crate::analysis::pipeline::PipelineFunction;
use crate::analysis::token::Token;

/// Drops tokens whose surface string is a stop word.
pub struct StopWordFilter {
    label: String,
    stop_words: HashSet<String>,
}

impl StopWordFilter {
    pub fn new(label: impl Into<String>, stop_words: Vec<&str>) -> Self {
        StopWordFilter {
            label: label.into(),
            stop_words: stop_words.into_iter().map(String::from).collect(),
        }
    }

    pub fn english() -> Self {
        StopWordFilter::new(
            "stopWordFilter",
            vec![
                "a", "able", "about", "across", "after", "all", "almost", "also", "am", "among",
                "an", "and", "any", "are", "as", "at", "be", "because", "been", "but", "by", "can",
                "cannot", "could", "dear", "did", "do", "does", "either", "else", "ever", "every",
                "for", "from", "get", "got", "had", "has", "have", "he", "her", "hers", "him",
                "his", "how", "however", "i", "if", "in", "into", "is", "it", "its", "just",
                "least", "let", "like", "likely", "may", "me", "might", "most", "must", "my",
                "neither", "no", "nor", "not", "of", "off", "often", "on", "only", "or", "other",
                "our", "own", "rather", "said", "say", "says", "she", "should", "since", "so",
                "some", "than", "that", "the", "their", "them", "then", "there", "these", "they",
                "this", "tis", "to", "too", "twas", "us", "wants", "was", "we", "were", "what",
                "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would",
                "yet", "you", "your",
            ],
        )
    }
}

impl PipelineFunction for StopWordFilter {
    fn apply(&self, token: &Token, _index: usize, _tokens: &[Token]) -> Vec<Token> {
        if self.stop_words.contains(&token.text) {
            Vec::new()
        } else {
            vec![token.clone()]
        }
    }

    fn label(&self) -> &str {
        &self.label
    }
}

use rust_stemmers::{Algorithm, Stemmer};

use crate::analysis::pipeline::PipelineFunction;
use crate::analysis::token::Token;

/// Reduces English tokens to their stem.
pub struct StemmerFilter {
    stemmer: Stemmer,
}

impl StemmerFilter {
    pub fn new(algorithm: Algorithm) -> Self {
        StemmerFilter {
            stemmer: Stemmer::create(algorithm),
        }
    }

    pub fn english() -> Self {
        StemmerFilter::new(Algorithm::English)
    }
}

impl PipelineFunction for StemmerFilter {
    fn apply(&self, token: &Token, _index: usize, _tokens: &[Token]) -> Vec<Token> {
        let mut out = token.clone();
        out.update(|s| self.stemmer.stem(s).into_owned());
        vec![out]
    }

    fn label(&self) -> &str {
        "stemmer"
    }
}

use std::sync::OnceLock;

use regex::Regex;

use crate::analysis::pipeline::PipelineFunction;
use crate::analysis::token::Token;

/// Strips leading and trailing non-word characters from each token,
/// leaving interior punctuation alone.
pub struct Trimmer;

fn leading() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\W+").unwrap())
}

fn trailing() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\W+$").unwrap())
}

impl PipelineFunction for Trimmer {
    fn apply(&self, token: &Token, _index: usize, _tokens: &[Token]) -> Vec<Token> {
        let mut out = token.clone();
        out.update(|s| {
            let s = leading().replace(s, "");
            trailing().replace(&s, "").into_owned()
        });
        vec![out]
    }

    fn label(&self) -> &str {
        "trimmer"
    }
}

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use log::warn;
use parking_lot::RwLock;

use crate::analysis::token::Token;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::Metadata;

/// One stage of a token pipeline.
///
/// A stage maps a token to zero, one or many replacement tokens; it is
/// given the token's position and the complete list from the previous
/// stage. Stages must not retain tokens they do not return.
pub trait PipelineFunction: Send + Sync {
    fn apply(&self, token: &Token, index: usize, tokens: &[Token]) -> Vec<Token>;

    /// Label this function is registered and serialized under.
    fn label(&self) -> &str;
}

fn registry() -> &'static RwLock<HashMap<String, Arc<dyn PipelineFunction>>> {
    static REGISTRY: OnceLock<RwLock<HashMap<String, Arc<dyn PipelineFunction>>>> =
        OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Register a pipeline function under its label so serialized pipelines
/// can be rehydrated. Overwriting an existing label is allowed but
/// warned about.
pub fn register_function(function: Arc<dyn PipelineFunction>) {
    let mut functions = registry().write();
    let label = function.label().to_string();

    if functions.contains_key(&label) {
        warn!("Overwriting existing registered function: {}", label);
    }

    functions.insert(label, function);
}

pub fn registered_function(label: &str) -> Option<Arc<dyn PipelineFunction>> {
    registry().read().get(label).cloned()
}

/// An ordered chain of pipeline functions.
///
/// Each stage consumes the complete token list emitted by the previous
/// stage before the next stage runs.
#[derive(Clone, Default)]
pub struct Pipeline {
    stack: Vec<Arc<dyn PipelineFunction>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline { stack: Vec::new() }
    }

    /// Rebuild a pipeline from serialized labels. Unknown labels are a
    /// hard error: the index cannot analyze queries without them.
    pub fn load(labels: &[String]) -> Result<Pipeline> {
        let mut pipeline = Pipeline::new();

        for label in labels {
            let function = registered_function(label).ok_or_else(|| {
                Error::new(
                    ErrorKind::UnregisteredPipelineFunction,
                    format!("Cannot load unregistered function: {}", label),
                )
            })?;
            pipeline.stack.push(function);
        }

        Ok(pipeline)
    }

    pub fn add(&mut self, function: Arc<dyn PipelineFunction>) {
        self.stack.push(function);
    }

    fn position_of(&self, label: &str) -> Result<usize> {
        self.stack
            .iter()
            .position(|f| f.label() == label)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::NotFound,
                    format!("Cannot find existing function: {}", label),
                )
            })
    }

    /// Insert `function` immediately before the stage labeled
    /// `existing`.
    pub fn before(&mut self, existing: &str, function: Arc<dyn PipelineFunction>) -> Result<()> {
        let pos = self.position_of(existing)?;
        self.stack.insert(pos, function);
        Ok(())
    }

    /// Insert `function` immediately after the stage labeled `existing`.
    pub fn after(&mut self, existing: &str, function: Arc<dyn PipelineFunction>) -> Result<()> {
        let pos = self.position_of(existing)?;
        self.stack.insert(pos + 1, function);
        Ok(())
    }

    /// Remove the stage labeled `label`; no-op when absent.
    pub fn remove(&mut self, label: &str) {
        if let Ok(pos) = self.position_of(label) {
            self.stack.remove(pos);
        }
    }

    pub fn reset(&mut self) {
        self.stack.clear();
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn run(&self, tokens: Vec<Token>) -> Vec<Token> {
        let mut current = tokens;

        for function in &self.stack {
            let mut next = Vec::with_capacity(current.len());
            for (index, token) in current.iter().enumerate() {
                next.extend(function.apply(token, index, &current));
            }
            current = next;
        }

        current
    }

    /// Convenience for query analysis: wrap a bare string as a single
    /// token, run it, and return the surviving surface strings.
    pub fn run_string(&self, text: &str, metadata: Metadata) -> Vec<String> {
        let token = Token::new(text, metadata);
        self.run(vec![token]).into_iter().map(|t| t.text).collect()
    }

    /// Serialized form: the list of stage labels. Stages that are not
    /// registered will fail to load again, so warn about them now.
    pub fn to_json(&self) -> Vec<String> {
        self.stack
            .iter()
            .map(|function| {
                let label = function.label();
                if registered_function(label).is_none() {
                    warn!(
                        "Function is not registered with pipeline. This may cause problems when serializing the index: {}",
                        label
                    );
                }
                label.to_string()
            })
            .collect()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_list()
            .entries(self.stack.iter().map(|s| s.label()))
            .finish()
    }
}

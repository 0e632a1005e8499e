//! jot-model: the model-assisted parsing strategy.
//!
//! Sends the raw input plus the current clock to a completion service and
//! reads back one JSON task object. Plugs into [`jot_core::TaskParser`] as
//! its primary [`jot_core::CandidateSource`].

pub mod client;
pub mod error;
pub mod prompt;
pub mod response;
pub mod strategy;

pub use client::{CompletionClient, HttpCompletionClient, ModelConfig, Provider};
pub use error::ModelError;
pub use prompt::build_system_prompt;
pub use response::extract_candidate;
pub use strategy::ModelStrategy;

use jot_core::{ParserOptions, TaskParser};
use tracing::{debug, warn};

/// Build the parser chain: model first when a credential is configured,
/// rules otherwise.
pub fn build_parser(options: ParserOptions, model: Option<ModelConfig>) -> TaskParser {
    let parser = TaskParser::rule_based(options);
    let Some(config) = model else {
        debug!("model parsing disabled");
        return parser;
    };
    if !config.has_credential() {
        debug!(provider = %config.provider, "no credential; model parsing skipped");
        return parser;
    }
    match HttpCompletionClient::new(config) {
        Ok(client) => parser.with_primary(Box::new(ModelStrategy::new(client))),
        Err(e) => {
            warn!(error = %e, "could not build model client; using rules only");
            parser
        }
    }
}

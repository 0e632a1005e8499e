//! Model-assisted candidate source.

use anyhow::Result;
use chrono::DateTime;
use chrono_tz::Tz;
use jot_core::{Candidate, CandidateSource};
use tracing::debug;

use crate::client::CompletionClient;
use crate::prompt::build_system_prompt;
use crate::response::extract_candidate;

/// Asks a completion service for the task object. Any failure is returned as
/// an error so the parser facade can fall back to the rules.
pub struct ModelStrategy<C> {
    client: C,
}

impl<C: CompletionClient> ModelStrategy<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

impl<C: CompletionClient> CandidateSource for ModelStrategy<C> {
    fn name(&self) -> &str {
        "model"
    }

    fn propose(&self, input: &str, now: DateTime<Tz>) -> Result<Candidate> {
        let system = build_system_prompt(now);
        let reply = self.client.complete(&system, input)?;
        debug!(chars = reply.len(), "model replied");
        Ok(extract_candidate(&reply)?)
    }
}

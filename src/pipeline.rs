//! Document pipeline: parallel grammar construction and story
//! aggregation.
//!
//! Sentences have no cross-sentence dependency during grammar
//! construction, so they fan out over the rayon pool; the story
//! aggregator is the barrier that waits for every grammar before
//! resolving coreference. Per-sentence failures become empty grammars
//! with recorded reasons and never abort the document.

use std::sync::mpsc;
use std::time::Duration;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::Config;
use crate::grammar::{Grammar, RuleTable};
use crate::nlp::{CorefCluster, Doc};
use crate::story::Story;

/// Document-processing pipeline bound to one configuration and rule
/// set. Rule tables are built once and shared read-only.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
    rules: RuleTable,
}

impl Pipeline {
    /// Pipeline with the English rule set.
    pub fn new(config: Config) -> Self {
        Self::with_rules(config, RuleTable::english())
    }

    /// Pipeline with a custom rule table.
    pub fn with_rules(config: Config, rules: RuleTable) -> Self {
        Self { config, rules }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Build the grammar of every sentence. Failed sentences yield
    /// empty grammars with recorded reasons.
    pub fn build_grammars(&self, doc: &Doc) -> Vec<Grammar> {
        let build = |sent: usize| -> Grammar {
            Grammar::build(doc, sent, &self.rules, self.config.grammar.conjunct_policy)
                .unwrap_or_else(|err| {
                    warn!(sent, error = %err, "sentence failed to build, recording empty grammar");
                    Grammar::failed(doc, sent, err.to_string())
                })
        };
        if self.config.pipeline.parallel {
            (0..doc.n_sentences()).into_par_iter().map(build).collect()
        } else {
            (0..doc.n_sentences()).map(build).collect()
        }
    }

    /// Process a whole document into a story.
    pub fn process(&self, doc: &Doc, clusters: &[CorefCluster]) -> Story {
        let grammars = self.build_grammars(doc);
        debug!(
            sentences = grammars.len(),
            failed = grammars.iter().filter(|g| g.failure().is_some()).count(),
            "aggregating story",
        );
        Story::build(doc, grammars, clusters)
    }

    /// Process a document, discarding all partial results on timeout.
    pub fn process_with_timeout(
        &self,
        doc: &Doc,
        clusters: &[CorefCluster],
        timeout: Duration,
    ) -> Option<Story> {
        let (tx, rx) = mpsc::channel();
        let pipeline = self.clone();
        let doc = doc.clone();
        let clusters = clusters.to_vec();
        std::thread::spawn(move || {
            let story = pipeline.process(&doc, &clusters);
            let _ = tx.send(story);
        });
        match rx.recv_timeout(timeout) {
            Ok(story) => Some(story),
            Err(_) => {
                warn!(?timeout, "document processing timed out, discarding partial results");
                None
            }
        }
    }
}

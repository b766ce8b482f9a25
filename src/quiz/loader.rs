use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LoadError;
use crate::fetch::{Fetcher, resolve_location};
use crate::quiz::model::{Question, QuestionSet, RawQuestion};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub id: String,
    pub path: String,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub sources: Vec<SourceDescriptor>,
}

impl Manifest {
    pub fn enabled_sources(&self) -> impl Iterator<Item = &SourceDescriptor> {
        self.sources.iter().filter(|s| s.enabled)
    }
}

pub struct QuestionLoader<F> {
    fetcher: F,
}

impl<F: Fetcher> QuestionLoader<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Fetch the manifest and every enabled source in manifest order, validate
    /// each source fail-fast, and merge keeping the first occurrence of each id.
    pub fn load(&self, manifest_location: &str) -> Result<QuestionSet, LoadError> {
        let manifest = self.load_manifest(manifest_location)?;

        let mut merged: Vec<Question> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut fetched_sources = 0usize;

        for source in manifest.enabled_sources() {
            let questions = self.load_source(manifest_location, source)?;
            fetched_sources += 1;
            for q in questions {
                if seen.insert(q.id.clone()) {
                    merged.push(q);
                } else {
                    tracing::debug!(id = %q.id, source = %source.id, "dropping duplicate question");
                }
            }
        }

        tracing::info!(
            sources = fetched_sources,
            questions = merged.len(),
            "question set loaded"
        );
        Ok(QuestionSet::new(merged))
    }

    fn load_manifest(&self, location: &str) -> Result<Manifest, LoadError> {
        let manifest_error = |reason: String| LoadError::Manifest {
            location: location.to_string(),
            reason,
        };
        let value = self
            .fetcher
            .fetch_json(location)
            .map_err(|e| manifest_error(e.to_string()))?;
        if !value.get("sources").is_some_and(Value::is_array) {
            return Err(manifest_error(
                "expected an object with a `sources` array".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| manifest_error(e.to_string()))
    }

    fn load_source(
        &self,
        manifest_location: &str,
        source: &SourceDescriptor,
    ) -> Result<Vec<Question>, LoadError> {
        let location = resolve_location(manifest_location, &source.path);
        let value = self
            .fetcher
            .fetch_json(&location)
            .map_err(|e| LoadError::SourceFetch {
                id: source.id.clone(),
                path: source.path.clone(),
                source: e,
            })?;

        let Value::Array(items) = value else {
            return Err(LoadError::validation(
                &source.id,
                None,
                "expected an array of questions",
            ));
        };

        let mut questions = Vec::with_capacity(items.len());
        for (idx, item) in items.into_iter().enumerate() {
            let position = Some(idx + 1);
            let raw: RawQuestion = serde_json::from_value(item)
                .map_err(|e| LoadError::validation(&source.id, position, e.to_string()))?;
            let q = raw
                .validate()
                .map_err(|reason| LoadError::validation(&source.id, position, reason))?;
            if q.option(&q.answer).is_none() {
                tracing::warn!(id = %q.id, answer = %q.answer, "answer matches no option key");
            }
            questions.push(q);
        }
        tracing::debug!(source = %source.id, count = questions.len(), "source validated");
        Ok(questions)
    }
}

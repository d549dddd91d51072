//! The diff entry point.
//!
//! [`JsonDiff`] runs the full pipeline for a document pair:
//! attribute guard, unchanged-subtree index, recursive generator, and patch
//! processor. Nothing is shared between invocations except the immutable
//! configuration.

use recdiff_guard::{DocumentGuard, GuardMap, GuardReport};
use recdiff_types::Patch;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::DiffConfig;
use crate::error::{DiffError, DiffResult, Side};
use crate::generator::Generator;
use crate::processor::{DiffEvent, FactoringProcessor, PatchProcessor, RecordingProcessor};
use crate::unchanged::UnchangedIndex;

/// A document pair as read from a request or batch file.
///
/// Either side may be absent on the wire; [`JsonDiff::diff_request`]
/// rejects such a request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffRequest {
    #[serde(default, alias = "first")]
    pub source: Option<Value>,
    #[serde(default, alias = "second")]
    pub target: Option<Value>,
}

impl DiffRequest {
    pub fn new(source: Value, target: Value) -> Self {
        Self {
            source: Some(source),
            target: Some(target),
        }
    }
}

/// A configured diff engine.
pub struct JsonDiff {
    config: DiffConfig,
    guard: DocumentGuard,
}

impl JsonDiff {
    /// Validate `config` and build its guard.
    pub fn new(config: DiffConfig) -> DiffResult<Self> {
        config.validate()?;
        let guard = DocumentGuard::from_map(&config.guards)?;
        Ok(Self { config, guard })
    }

    /// The active configuration.
    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Run only the guard against a source document.
    pub fn check(&self, source: &Value) -> DiffResult<GuardReport> {
        Ok(self.guard.evaluate(source)?)
    }

    /// Compute the patch that turns `source` into `target`.
    ///
    /// Fails with [`DiffError::GuardViolation`] if the source document does
    /// not pass the configured guard; no partial patch is returned.
    pub fn diff(&self, source: &Value, target: &Value) -> DiffResult<Patch> {
        self.ensure_guard_passes(source)?;

        let unchanged = self.unchanged(source, target)?;
        let unchanged_count = unchanged.len();
        let processor = Generator::new(FactoringProcessor::new(unchanged), &self.config)
            .run(source, target)?;
        let patch = processor.into_patch();

        debug!(
            operations = patch.len(),
            unchanged = unchanged_count,
            "diff computed"
        );
        Ok(patch)
    }

    /// [`diff`](Self::diff), serialized as a JSON array.
    pub fn diff_as_value(&self, source: &Value, target: &Value) -> DiffResult<Value> {
        self.diff(source, target)?
            .to_value()
            .map_err(|e| DiffError::Serialization(e.to_string()))
    }

    /// Diff a request whose sides may be missing.
    pub fn diff_request(&self, request: &DiffRequest) -> DiffResult<Patch> {
        let source = request
            .source
            .as_ref()
            .ok_or(DiffError::NullArgument(Side::Source))?;
        let target = request
            .target
            .as_ref()
            .ok_or(DiffError::NullArgument(Side::Target))?;
        self.diff(source, target)
    }

    /// The raw generator events for a pair, without move/copy factoring.
    pub fn events(&self, source: &Value, target: &Value) -> DiffResult<Vec<DiffEvent>> {
        self.ensure_guard_passes(source)?;
        let processor =
            Generator::new(RecordingProcessor::new(), &self.config).run(source, target)?;
        Ok(processor.into_events())
    }

    /// Run the generator into a caller-supplied processor.
    ///
    /// The guard still applies. The caller is responsible for building
    /// any unchanged index its processor needs.
    pub fn diff_with<P: PatchProcessor>(
        &self,
        processor: P,
        source: &Value,
        target: &Value,
    ) -> DiffResult<Patch> {
        self.ensure_guard_passes(source)?;
        let processor = Generator::new(processor, &self.config).run(source, target)?;
        Ok(processor.into_patch())
    }

    /// The unchanged-subtree index for a pair, under this engine's depth
    /// limit.
    pub fn unchanged<'a>(
        &self,
        source: &'a Value,
        target: &'a Value,
    ) -> DiffResult<UnchangedIndex<'a>> {
        UnchangedIndex::build(source, target, self.config.max_depth)
    }

    fn ensure_guard_passes(&self, source: &Value) -> DiffResult<()> {
        let report = self.guard.evaluate(source)?;
        match report.violation {
            Some(violation) => Err(DiffError::GuardViolation(violation)),
            None => Ok(()),
        }
    }
}

/// Diff with default limits and the given guard map.
pub fn diff(source: &Value, target: &Value, guards: &GuardMap) -> DiffResult<Patch> {
    JsonDiff::new(DiffConfig::default().with_guards(guards.clone()))?.diff(source, target)
}

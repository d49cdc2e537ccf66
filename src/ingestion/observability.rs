use std::fmt;
use std::sync::Arc;

use crate::error::ImportError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ImportSeverity {
    /// Informational event.
    Info,
    /// Caller mistake or unusable (but readable) document.
    Warning,
    /// Import failed on the document itself.
    Error,
    /// Infrastructure failure (network, persistence).
    Critical,
}

/// Where the bytes of an import came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSource {
    /// Direct upload with its declared content type.
    Upload { content_type: String },
    /// Remote import; `url` is the address as given by the caller (before any rewrite).
    Url { url: String },
}

impl fmt::Display for ImportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportSource::Upload { content_type } => write!(f, "upload({content_type})"),
            ImportSource::Url { url } => write!(f, "url({url})"),
        }
    }
}

/// Stages of one import request, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ImportStage {
    Fetching,
    Decoding,
    Validating,
    Persisting,
    Done,
}

/// Context about an import attempt.
///
/// On failure, `stage` is the stage that failed.
#[derive(Debug, Clone)]
pub struct ImportContext {
    pub source: ImportSource,
    pub stage: ImportStage,
}

/// Row counts reported on a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    /// Rows produced by the decoder.
    pub decoded_rows: usize,
    /// Rows that passed validation and were persisted.
    pub accepted_rows: usize,
    /// Rows silently dropped by validation.
    pub rejected_rows: usize,
}

/// Observer interface for import outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait ImportObserver: Send + Sync {
    /// Called when an import succeeds.
    fn on_success(&self, _ctx: &ImportContext, _stats: ImportStats) {}

    /// Called when an import fails.
    fn on_failure(&self, _ctx: &ImportContext, _severity: ImportSeverity, _error: &ImportError) {}

    /// Called when an import failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ImportObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn ImportObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ImportObserver for CompositeObserver {
    fn on_success(&self, ctx: &ImportContext, stats: ImportStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Emits import events as `tracing` events (target `roster_import::import`).
#[derive(Debug, Default)]
pub struct TracingObserver;

impl ImportObserver for TracingObserver {
    fn on_success(&self, ctx: &ImportContext, stats: ImportStats) {
        tracing::info!(
            target: "roster_import::import",
            source = %ctx.source,
            decoded = stats.decoded_rows,
            accepted = stats.accepted_rows,
            rejected = stats.rejected_rows,
            "import succeeded"
        );
    }

    fn on_failure(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        match severity {
            ImportSeverity::Info | ImportSeverity::Warning => tracing::warn!(
                target: "roster_import::import",
                source = %ctx.source,
                stage = ?ctx.stage,
                severity = ?severity,
                error = %error,
                "import failed"
            ),
            ImportSeverity::Error | ImportSeverity::Critical => tracing::error!(
                target: "roster_import::import",
                source = %ctx.source,
                stage = ?ctx.stage,
                severity = ?severity,
                error = %error,
                "import failed"
            ),
        }
    }

    fn on_alert(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        tracing::error!(
            target: "roster_import::import",
            alert = true,
            source = %ctx.source,
            stage = ?ctx.stage,
            severity = ?severity,
            error = %error,
            "import alert"
        );
    }
}

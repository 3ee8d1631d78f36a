//! Diagnostics side channel.
//!
//! Purpose
//! - Advisory conditions never change control flow, but the caller must be
//!   able to see them. Rather than relying on ambient logger state alone,
//!   diagnostics accumulate in an explicit sink that travels with the
//!   recursion and is returned as part of the result record. Every push is
//!   mirrored to `log` so ordinary logging setups still observe them.

/// Stable codes for advisory conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagCode {
    /// Boundary/support solve reported a solved-but-inaccurate status.
    InaccurateSolve,
    /// Dual-representation conversion requested above the practical
    /// dimension threshold; expect slow enumeration.
    HighDimensionConversion,
    /// Convex-hull merge of multiple disturbance realizations in state
    /// dimension above two; hull consistency is not established there.
    HullMergeDimension,
}

/// One advisory diagnostic with reproduction context.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub code: DiagCode,
    pub message: String,
    pub step: Option<usize>,
    pub dir: Option<usize>,
    pub realization: Option<usize>,
}

impl Diagnostic {
    pub fn new(code: DiagCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            step: None,
            dir: None,
            realization: None,
        }
    }

    pub fn at(mut self, step: usize) -> Self {
        self.step = Some(step);
        self
    }

    pub fn direction(mut self, dir: usize) -> Self {
        self.dir = Some(dir);
        self
    }

    pub fn realization(mut self, realization: usize) -> Self {
        self.realization = Some(realization);
        self
    }
}

/// Ordered accumulator for diagnostics. Single-threaded by design: parallel
/// sections return their advisories with their results and the sequential
/// driver pushes them in index order, so the final list is deterministic.
#[derive(Debug, Default)]
pub struct DiagSink {
    items: Vec<Diagnostic>,
}

impl DiagSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, d: Diagnostic) {
        log::warn!(
            "[{:?}] {} (step={:?} dir={:?} realization={:?})",
            d.code,
            d.message,
            d.step,
            d.dir,
            d.realization
        );
        self.items.push(d);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

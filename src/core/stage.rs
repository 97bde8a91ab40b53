use crate::utils::error::{ExportError, Result};
use std::fmt;

/// Lifecycle of one export.
///
/// ```text
/// Idle -> Rendering -> Materializing -> Archiving -> Streaming -> Done
///              \______________\_______________\___________\____-> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Idle,
    Rendering,
    Materializing,
    Archiving,
    Streaming,
    Done,
    Failed,
}

impl ExportStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, ExportStage::Done | ExportStage::Failed)
    }

    pub fn can_transition_to(self, next: ExportStage) -> bool {
        use ExportStage::{Archiving, Done, Failed, Idle, Materializing, Rendering, Streaming};

        match (self, next) {
            (Idle, Rendering)
            | (Rendering, Materializing)
            | (Materializing, Archiving)
            | (Archiving, Streaming)
            | (Streaming, Done) => true,
            (Idle, Failed) => false,
            (current, Failed) => !current.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExportStage::Idle => "idle",
            ExportStage::Rendering => "rendering",
            ExportStage::Materializing => "materializing",
            ExportStage::Archiving => "archiving",
            ExportStage::Streaming => "streaming",
            ExportStage::Done => "done",
            ExportStage::Failed => "failed",
        }
    }
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct StageTracker {
    export_id: u64,
    stage: ExportStage,
}

impl StageTracker {
    pub fn new(export_id: u64) -> Self {
        Self {
            export_id,
            stage: ExportStage::Idle,
        }
    }

    pub fn export_id(&self) -> u64 {
        self.export_id
    }

    pub fn stage(&self) -> ExportStage {
        self.stage
    }

    pub fn advance(&mut self, next: ExportStage) -> Result<()> {
        if !self.stage.can_transition_to(next) {
            return Err(ExportError::StageError {
                from: self.stage.to_string(),
                to: next.to_string(),
            });
        }

        tracing::debug!(export_id = self.export_id, "Export stage {} -> {}", self.stage, next);
        self.stage = next;
        Ok(())
    }

    /// Moves to `Failed` unless already terminal or never started.
    pub fn fail(&mut self) {
        if self.stage.can_transition_to(ExportStage::Failed) {
            tracing::debug!(export_id = self.export_id, "Export stage {} -> failed", self.stage);
            self.stage = ExportStage::Failed;
        }
    }
}

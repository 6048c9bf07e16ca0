use crate::catalog::Catalog;
use crate::error::FailureKind;
use crate::pipeline::{NarrationFailure, NarrationPipeline, NarrationResult, PipelineStage};
use crate::record::NarrationRequest;
use std::sync::Arc;
use tracing::error;

/// Async front for hosts running on tokio.
///
/// The backends block on network and subprocess I/O, so each narration runs on
/// the blocking pool. Cloning is cheap and every clone shares the same backends.
#[derive(Clone)]
pub struct NarrationService {
    pipeline: Arc<NarrationPipeline>,
}

impl NarrationService {
    pub fn new(pipeline: NarrationPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    pub async fn narrate(&self, request: NarrationRequest) -> NarrationResult {
        let pipeline = self.pipeline.clone();
        let result = tokio::task::spawn_blocking(move || pipeline.run(&request)).await;

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Error joining narration task: {}", e);
                Err(NarrationFailure {
                    stage: PipelineStage::Idle,
                    kind: FailureKind::Internal,
                    message: format!("narration task did not complete: {}", e),
                    narration_text: None,
                })
            }
        }
    }

    pub fn voices(&self) -> &Catalog {
        self.pipeline.speech().list_voices()
    }

    pub fn languages(&self) -> &Catalog {
        self.pipeline.speech().list_languages()
    }
}

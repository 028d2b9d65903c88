use futures::FutureExt;
use std::sync::Arc;

use crate::client::LazyClient;
use crate::config::Settings;
use crate::database::{self, QuestionStore};
use crate::embedding::{self, ImageEmbedder};
use crate::ids::QuestionIdGenerator;
use crate::storage::{self, Storage};
use crate::vector_store::{self, VectorIndex};
use crate::vision::{self, Rectifier, TextRecognizer};

/// Shared application state passed to all route handlers.
pub struct AppState {
    pub settings: Settings,
    pub questions: LazyClient<dyn QuestionStore>,
    pub vector_index: LazyClient<dyn VectorIndex>,
    pub embedder: Arc<dyn ImageEmbedder>,
    pub recognizer: Arc<dyn TextRecognizer>,
    pub rectifier: Arc<dyn Rectifier>,
    pub storage: Arc<dyn Storage>,
    pub ids: QuestionIdGenerator,
}

impl AppState {
    /// Build state from settings. No network I/O happens here: the question
    /// store and vector index connect on first use.
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let store_settings = settings.clone();
        let questions = LazyClient::new("question store", move || {
            let settings = store_settings.clone();
            async move { database::connect(&settings).await }.boxed()
        });

        let index_settings = settings.clone();
        let vector_index = LazyClient::new("vector index", move || {
            let settings = index_settings.clone();
            async move { vector_store::connect(&settings).await }.boxed()
        });

        Ok(Self {
            embedder: embedding::build(&settings)?,
            recognizer: vision::build_recognizer(&settings)?,
            rectifier: vision::build_rectifier(&settings)?,
            storage: storage::build(&settings)?,
            ids: QuestionIdGenerator::new(),
            questions,
            vector_index,
            settings,
        })
    }
}

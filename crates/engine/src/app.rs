use std::sync::Arc;

use pantry_core::{document::CategoryDocument, schema::Schema};
use tracing::info;

use crate::config::PantryConfig;
use crate::context::{StoreContext, StoreHandle};
use crate::editor::TableEditor;
use crate::error::EngineError;
use crate::resource::{Resource, load_or_seed};

/// Application wiring: one store, one categories document, one editor.
pub struct PantryApp {
    config: PantryConfig,
    context: StoreContext,
    store: StoreHandle,
    categories: Resource<CategoryDocument>,
}

impl PantryApp {
    /// Open the configured store and begin loading the categories document.
    /// Must be called from within a tokio runtime.
    pub fn start(config: PantryConfig) -> Result<Self, EngineError> {
        let mut context = StoreContext::new();
        let store = context.open(&config.store_name, &config.location)?;
        Self::with_context(config, context, store)
    }

    /// Start against a store already registered in `context`.
    pub fn with_context(
        config: PantryConfig,
        context: StoreContext,
        store: StoreHandle,
    ) -> Result<Self, EngineError> {
        info!(store = store.name(), doc_id = %config.document_id, "starting pantry");
        let categories = load_or_seed(&store, &config.document_id, CategoryDocument::seed()?);
        Ok(Self {
            config,
            context,
            store,
            categories,
        })
    }

    pub fn config(&self) -> &PantryConfig {
        &self.config
    }

    pub fn context(&self) -> &StoreContext {
        &self.context
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    pub fn categories(&self) -> &Resource<CategoryDocument> {
        &self.categories
    }

    /// Wait for the categories document and open an editor over it.
    pub async fn editor(&self) -> Result<TableEditor, Arc<EngineError>> {
        let state = self.categories.settled().await;
        let document = state.into_result().ok_or_else(|| {
            Arc::new(EngineError::TaskFailed("categories still pending".to_string()))
        })??;
        Ok(TableEditor::new(
            &self.config.document_id,
            Schema::pantry_categories(),
            document,
        ))
    }
}

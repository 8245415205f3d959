// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod document_store;
pub mod model_store;

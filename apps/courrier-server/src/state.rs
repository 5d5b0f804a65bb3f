//! Shared application state

use std::sync::Arc;

use intake_engine::{CombinedExtractor, RequestRouter, UserDataProvider};
use template_engine::TemplateStore;

use crate::sessions::SessionStore;

/// Read-only collaborators shared by every request; only the session store
/// holds mutable state.
#[derive(Clone)]
pub struct AppState {
    pub templates: Arc<dyn TemplateStore>,
    pub router: RequestRouter,
    pub extractor: CombinedExtractor,
    pub users: Arc<dyn UserDataProvider>,
    pub sessions: Arc<dyn SessionStore>,
}

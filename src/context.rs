use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{HostingService, LanguageModelService};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub hosting: Arc<dyn HostingService>,
    pub language_model: Arc<dyn LanguageModelService>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        hosting: Arc<dyn HostingService>,
        language_model: Arc<dyn LanguageModelService>,
    ) -> Self {
        Self {
            config,
            hosting,
            language_model,
        }
    }
}

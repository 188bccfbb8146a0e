use std::sync::Arc;

use shared::{domain::SessionId, protocol::SessionSnapshot};

use crate::{
    api::{HttpStudioApi, StudioApi},
    config::Settings,
    error::ApiError,
};

/// Everything the wizard and the inspection commands share, built once at
/// startup and handed to whoever needs it.
#[derive(Clone)]
pub struct AppContext {
    settings: Arc<Settings>,
    session: SessionId,
    api: Arc<dyn StudioApi>,
}

impl AppContext {
    pub fn new(settings: Settings, session: SessionId, api: Arc<dyn StudioApi>) -> Self {
        Self {
            settings: Arc::new(settings),
            session,
            api,
        }
    }

    /// Context backed by the HTTP client described by `settings`.
    pub fn connect(settings: Settings, session: SessionId) -> Result<Self, ApiError> {
        let api = HttpStudioApi::from_settings(&settings)?;
        Ok(Self::new(settings, session, Arc::new(api)))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn api(&self) -> Arc<dyn StudioApi> {
        Arc::clone(&self.api)
    }

    /// Raw backend view of the session, for debugging.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, ApiError> {
        self.api.session_snapshot(&self.session).await
    }
}

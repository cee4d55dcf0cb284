use std::sync::Arc;

use crate::auth::{Claims, Credential, Role, TokenVerifier};
use crate::backend::ServiceClients;
use crate::config::AppConfig;
use crate::gateway::error::GatewayError;
use crate::gateway::services::CompositeService;
use crate::notify::{HttpNotifier, NotificationDispatcher, Notifier};

/// Gateway application state (shared, read-only after startup)
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    tokens: Arc<TokenVerifier>,
    /// Pooled outbound client; cloned into each request scope
    http: reqwest::Client,
    notifier: NotificationDispatcher,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let http = reqwest::Client::new();
        let notifier = Arc::new(HttpNotifier::new(http.clone(), &config.notifications));
        Self {
            tokens: Arc::new(TokenVerifier::new(&config.auth.jwt_secret)),
            notifier: NotificationDispatcher::new(notifier),
            config: Arc::new(config),
            http,
        }
    }

    /// Replace the notification sink.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = NotificationDispatcher::new(notifier);
        self
    }

    pub fn authorize(
        &self,
        credential: &Credential,
        allowed: &[Role],
    ) -> Result<Claims, GatewayError> {
        Ok(self.tokens.authorize(credential, allowed)?)
    }

    /// Engine scoped to one request, forwarding `credential` to backends.
    pub fn composite(&self, credential: Option<Credential>) -> CompositeService {
        let clients = ServiceClients::new(&self.http, &self.config.backends, credential);
        CompositeService::new(clients, self.notifier.clone())
    }
}

//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::events::OrderEvents;
use crate::services::{AuthService, CcavenueClient, DtdcClient, EmailService};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the pool, config, service clients and
/// the order-notification channel.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    auth: AuthService,
    email: EmailService,
    ccavenue: Option<CcavenueClient>,
    dtdc: Option<DtdcClient>,
    events: OrderEvents,
}

impl AppState {
    /// Create the application state from loaded config and a live pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay cannot be configured.
    pub fn new(
        config: ApiConfig,
        pool: PgPool,
    ) -> Result<Self, lettre::transport::smtp::Error> {
        let auth = AuthService::new(&config.jwt);
        let email = EmailService::new(&config.email)?;
        let http = reqwest::Client::new();
        let ccavenue = config
            .ccavenue
            .clone()
            .map(|cfg| CcavenueClient::new(http.clone(), cfg));
        let dtdc = config.dtdc.clone().map(|cfg| DtdcClient::new(http, cfg));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                auth,
                email,
                ccavenue,
                dtdc,
                events: OrderEvents::new(),
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    #[must_use]
    pub fn email(&self) -> &EmailService {
        &self.inner.email
    }

    /// Payment gateway client; `None` when CCAvenue is not configured.
    #[must_use]
    pub fn ccavenue(&self) -> Option<&CcavenueClient> {
        self.inner.ccavenue.as_ref()
    }

    /// Shipping client; `None` when DTDC is not configured.
    #[must_use]
    pub fn dtdc(&self) -> Option<&DtdcClient> {
        self.inner.dtdc.as_ref()
    }

    #[must_use]
    pub fn events(&self) -> &OrderEvents {
        &self.inner.events
    }
}

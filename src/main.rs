use std::net::AddrParseError;
use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::info;

use maturity_assessment::adapters::ai::{OpenAIConfig, OpenAIRecommender};
use maturity_assessment::adapters::audit::TracingAuditLog;
use maturity_assessment::adapters::auth::{AdminAccount, InMemorySessionStore};
use maturity_assessment::adapters::http::{build_router, AppState, HttpSettings};
use maturity_assessment::adapters::notify::{
    EmailNotifier, LogTransport, QueuedNotifier, SmtpSettings, SmtpTransport,
};
use maturity_assessment::adapters::{InMemoryStore, PostgresAuditLog, PostgresStore};
use maturity_assessment::config::{AppConfig, AuthConfig, ConfigError, ValidationError};
use maturity_assessment::domain::foundation::DomainError;
use maturity_assessment::ports::{
    AuditLog, EmailTransport, NotificationError, Notifier, RecommendationGenerator,
};
use maturity_assessment::telemetry::{self, TelemetryError};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error("invalid listen address: {0}")]
    Address(#[from] AddrParseError),

    #[error("storage unavailable: {0}")]
    Storage(#[from] DomainError),

    #[error("email transport: {0}")]
    Email(#[from] NotificationError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn admin_account(auth: &AuthConfig) -> Option<AdminAccount> {
    let login = auth.admin_email.as_ref()?.trim().to_string();
    let digest = auth.admin_secret_sha256.as_ref()?;
    if login.is_empty() {
        return None;
    }
    Some(AdminAccount {
        login,
        display_name: auth.admin_display_name.clone(),
        secret_digest: digest.clone(),
    })
}

fn notifier(config: &AppConfig) -> Result<Arc<dyn Notifier>, StartupError> {
    let transport: Arc<dyn EmailTransport> = if config.email.enabled {
        Arc::new(SmtpTransport::new(SmtpSettings::from_config(&config.email)?))
    } else {
        info!("Email disabled; alerts are logged only");
        Arc::new(LogTransport::new())
    };
    let email: Arc<dyn Notifier> = Arc::new(EmailNotifier::new(transport));
    // The worker stops once the last sender clone is dropped at shutdown.
    let (queued, _worker) = QueuedNotifier::spawn(email, config.email.queue_capacity);
    Ok(Arc::new(queued))
}

fn recommender(config: &AppConfig) -> Option<Arc<dyn RecommendationGenerator>> {
    let key = config.ai.openai_api_key.as_ref()?;
    let openai = OpenAIConfig::new(key.expose_secret().clone())
        .with_model(config.ai.model.clone())
        .with_base_url(config.ai.base_url.clone())
        .with_timeout(config.ai.timeout())
        .with_max_tokens(config.ai.max_tokens);
    info!(model = %config.ai.model, "OpenAI recommendations enabled");
    Some(Arc::new(OpenAIRecommender::new(openai)))
}

async fn run() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.server.log_level, config.is_production())?;
    config.validate()?;

    let sessions = InMemorySessionStore::new(config.auth.session_ttl_secs);
    let notifier = notifier(&config)?;
    let admin = admin_account(&config.auth);
    if admin.is_none() {
        tracing::warn!("No administrator configured; only respondents can log in");
    }

    let state = match config.database.url() {
        Some(url) => {
            let store = PostgresStore::connect(url, &config.database).await?;
            if config.database.run_migrations {
                store.migrate().await?;
                info!("Database migrations applied");
            }
            let audit: Arc<dyn AuditLog> = Arc::new(PostgresAuditLog::new(store.pool().clone()));
            AppState::new(store, sessions.clone(), notifier, audit, admin)
        }
        None => {
            tracing::warn!("No database configured; using the in-memory store");
            let audit: Arc<dyn AuditLog> = Arc::new(TracingAuditLog::new());
            AppState::new(InMemoryStore::new(), sessions.clone(), notifier, audit, admin)
        }
    }
    .with_recommender(recommender(&config))
    .with_public_base_url(config.server.public_base_url());

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            let purged = sessions.purge_expired().await;
            if purged > 0 {
                tracing::debug!(purged, "Expired sessions purged");
            }
        }
    });

    let settings = HttpSettings {
        request_timeout: config.server.request_timeout(),
        cors_origins: config.server.cors_origins_list(),
    };
    let app = build_router(state, &settings);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(environment = ?config.server.environment, %addr, "Maturity assessment service ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;
    Ok(())
}

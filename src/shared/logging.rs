use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber. Safe to call once per process;
/// embedding applications that bring their own subscriber skip this.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crewdesk_sync=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

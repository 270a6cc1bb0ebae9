use tracing_subscriber::{EnvFilter, FmtSubscriber};

static SUBSCRIBER_INIT: std::sync::Once = std::sync::Once::new();

/// Installs the global subscriber once. Output goes to stderr so stdout stays
/// free for frames and result lines.
pub fn setup_logging(json: bool) {
    SUBSCRIBER_INIT.call_once(|| {
        // RUST_LOG wins; otherwise info for this crate and warn for everything else
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("warn,{name}=info", name = env!("CARGO_CRATE_NAME"))));

        let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if json {
            Box::new(
                FmtSubscriber::builder()
                    .with_target(true)
                    .json()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .finish(),
            )
        } else {
            Box::new(
                FmtSubscriber::builder()
                    .with_target(true)
                    .compact()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .finish(),
            )
        };

        if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("failed to install tracing subscriber: {error}");
        }
    });
}

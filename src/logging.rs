use env_logger::Env;

pub const TRACING_ENV: &str = "NAME_RECONCILE_TRACING";

fn truthy(v: &str) -> bool {
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Install the process logger. `env_logger` by default; a `tracing` fmt
/// subscriber when `NAME_RECONCILE_TRACING` is set, with `log` records bridged
/// into it. Both honour `RUST_LOG` and default to `info`.
pub fn init_logging() {
    let use_tracing = std::env::var(TRACING_ENV)
        .map(|v| truthy(&v))
        .unwrap_or(false);
    if use_tracing {
        init_tracing_from_env();
    } else {
        let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info")).try_init();
    }
}

pub fn init_tracing_from_env() {
    // Bridge log:: macros into tracing so library code keeps using the log facade
    let _ = tracing_log::LogTracer::init();
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

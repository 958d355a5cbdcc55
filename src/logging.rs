use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global subscriber. Colored text by default, JSON lines when
/// `LOG_FORMAT=json`. `RUST_LOG` overrides the default `eye_detector=info`.
pub fn init_tracing() -> anyhow::Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("eye_detector=info,z_eyes=info"))?;

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .try_init()?;
    }
    Ok(())
}

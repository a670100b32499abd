use tracing::Level;

/// Tolka loggnivå från inställningar ("info", "debug" ...), default INFO
pub fn parse_level(level: &str) -> Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Initiera logging. Anrop efter den första ignoreras.
pub fn init_logging(level: &str) {
    let result = tracing_subscriber::fmt()
        .with_max_level(parse_level(level))
        .with_target(false)
        .try_init();

    if result.is_ok() {
        tracing::info!("Startar LoveDiary v{}", env!("CARGO_PKG_VERSION"));
    }
}

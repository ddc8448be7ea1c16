use std::path::PathBuf;
use std::sync::Once;
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// Global initialization guard
static INIT: Once = Once::new();

/// Application component identifier
pub enum Component {
    Bridge,
}

impl Component {
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Bridge => "post2mpv-bridge",
        }
    }

    /// Tracing targets owned by this component.
    fn targets(&self) -> &'static [&'static str] {
        match self {
            Component::Bridge => &["post2mpv_bridge", "bridge_engine"],
        }
    }
}

/// Configuration for logging initialization
pub struct LogConfig {
    /// Component name for log identification
    pub component: Component,
    /// Directory where log files will be stored
    pub log_dir: PathBuf,
    /// Maximum log level
    pub max_level: Level,
    /// Whether to also log to stderr. Stdout is never used, it carries the
    /// native messaging frames.
    pub log_to_console: bool,
    /// Optional custom env filter string
    pub env_filter: Option<String>,
    /// List of dependency crates to silence
    pub silent_deps: Vec<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            component: Component::Bridge,
            log_dir: default_log_dir(),
            max_level: Level::INFO,
            log_to_console: true,
            env_filter: None,
            silent_deps: Vec::new(),
        }
    }
}

/// Browsers start native hosts from an arbitrary working directory, so logs
/// go under the temp dir rather than a relative path.
pub fn default_log_dir() -> PathBuf {
    std::env::temp_dir().join("post2mpv-bridge").join("logs")
}

/// Initialize logging for the application
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut result = Ok(());

    INIT.call_once(|| {
        result = initialize_logging_internal(config);
    });

    result
}

fn initialize_logging_internal(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Create log directory if it doesn't exist
    std::fs::create_dir_all(&config.log_dir)?;

    let file_appender = RollingFileAppender::new(
        Rotation::DAILY,
        &config.log_dir,
        format!("{}.log", config.component.as_str()),
    );

    let mut layers = Vec::new();
    let file_layer = fmt::Layer::new()
        .with_ansi(false)
        .with_writer(file_appender)
        .with_target(true);

    if config.log_to_console {
        let stderr_layer = fmt::Layer::new()
            .with_ansi(false)
            .with_writer(std::io::stderr)
            .with_target(true)
            .compact();

        layers.push(stderr_layer.with_filter(build_filter(&config)?).boxed());
    }

    layers.push(file_layer.with_filter(build_filter(&config)?).boxed());

    tracing_subscriber::registry().with(layers).try_init()?;

    Ok(())
}

fn build_filter(config: &LogConfig) -> Result<EnvFilter, Box<dyn std::error::Error>> {
    let mut filter = if let Some(filter_str) = &config.env_filter {
        EnvFilter::try_new(filter_str)?
    } else {
        let mut filter = EnvFilter::try_new(format!("{}", config.max_level))?;
        for target in config.component.targets() {
            filter = filter.add_directive(format!("{}={}", target, config.max_level).parse()?);
        }
        filter
    };

    // Apply silencing for noisy dependencies
    for dep in &config.silent_deps {
        filter = filter.add_directive(format!("{}=error", dep).parse()?);
    }

    Ok(filter)
}

pub fn get_bridge_config(log_dir: Option<PathBuf>, env_filter: Option<String>) -> LogConfig {
    LogConfig {
        component: Component::Bridge,
        log_dir: log_dir.unwrap_or_else(default_log_dir),
        env_filter,
        silent_deps: vec![
            "hyper_util".to_string(),
            "hyper".to_string(),
            "reqwest".to_string(),
            "mio".to_string(),
        ],
        ..Default::default()
    }
}

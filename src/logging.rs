//! Structured logging and tracing for Octoheat
//!
//! Console output goes to stdout, with warnings split off to stderr. Errors
//! are left to the terminal handler in [`crate::controller::finish`], which
//! writes them to stderr whatever the filter says. An optional daily-rolling
//! file log can be enabled from the config file and records errors too.
//! `RUST_LOG` replaces the configured level filter in both directions.

use crate::config::LoggingConfig;
use crate::error::{OctoheatError, Result};
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Once;
use tracing::{Level, Subscriber, debug, error, info, trace, warn};
use tracing_appender::rolling;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT_ONCE: Once = Once::new();
static INIT_ERROR: OnceCell<String> = OnceCell::new();

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Initialize logging system based on configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    INIT_ONCE.call_once(|| {
        let init_result = (|| -> Result<()> {
            let level = parse_log_level(&config.level)?;
            let filter = build_env_filter(level);

            let file_output = match config.file.as_deref() {
                Some(path) if !should_use_console_only() => {
                    Some(file_layer(path, config.backup_count, config.json_format)?)
                }
                _ => None,
            };
            let console = (config.console_output || file_output.is_none())
                .then(|| console_layer(config.json_format));

            tracing_subscriber::registry()
                .with(filter)
                .with(file_output)
                .with(console)
                .try_init()
                .map_err(|e| OctoheatError::config(format!("Failed to install subscriber: {}", e)))?;

            debug!(
                "Logging initialized - level: {:?}, file: {}",
                level,
                config.file.as_deref().unwrap_or("none")
            );
            Ok(())
        })();

        if let Err(e) = init_result {
            let _ = INIT_ERROR.set(e.to_string());
        }
    });

    if let Some(err) = INIT_ERROR.get() {
        return Err(OctoheatError::config(err.clone()));
    }
    Ok(())
}

fn build_env_filter(level: Level) -> EnvFilter {
    filter_from(level, std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref())
}

// The only level gate: no layer carries its own cap
fn filter_from(level: Level, directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(format!("octoheat={},reqwest=warn", level)))
}

fn should_use_console_only() -> bool {
    cfg!(test) || std::env::var_os("OCTOHEAT_DISABLE_FILE_LOG").is_some()
}

fn console_layer<S>(json_format: bool) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);
    // ERROR events reach stderr through the terminal handler
    let not_error = filter_fn(|meta| *meta.level() != Level::ERROR);
    let base = fmt::layer()
        .with_writer(writer)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);
    if json_format {
        base.json().with_filter(not_error).boxed()
    } else {
        base.with_filter(not_error).boxed()
    }
}

fn file_layer<S>(file: &str, backup_count: u32, json_format: bool) -> Result<BoxedLayer<S>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    // A path with an extension names the file; anything else is a directory
    let p = Path::new(file);
    let dir = if p.extension().is_some() {
        p.parent().unwrap_or(p)
    } else {
        p
    };

    let file_appender = rolling::Builder::new()
        .rotation(rolling::Rotation::DAILY)
        .filename_prefix("octoheat")
        .filename_suffix("log")
        .max_log_files(backup_count.max(1) as usize)
        .build(dir)
        .map_err(|e| OctoheatError::io(format!("Failed to create log file appender: {}", e)))?;

    // Written synchronously: a pass exits right after its last line
    let base = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);
    Ok(if json_format {
        base.json().boxed()
    } else {
        base.boxed()
    })
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.to_uppercase().as_str() {
        "TRACE" => Ok(Level::TRACE),
        "DEBUG" => Ok(Level::DEBUG),
        "INFO" => Ok(Level::INFO),
        "WARN" | "WARNING" => Ok(Level::WARN),
        "ERROR" => Ok(Level::ERROR),
        _ => Err(OctoheatError::config(format!(
            "Invalid log level: {}",
            level_str
        ))),
    }
}

/// Context information for log messages
#[derive(Debug, Clone)]
pub struct LogContext {
    /// Component name (e.g., "controller", "octoprint")
    pub component: String,

    /// Additional context fields
    pub extra_fields: BTreeMap<String, String>,
}

impl LogContext {
    /// Create a new log context
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            extra_fields: BTreeMap::new(),
        }
    }

    /// Add extra field
    pub fn with_field(mut self, key: &str, value: String) -> Self {
        self.extra_fields.insert(key.to_string(), value);
        self
    }
}

/// Structured logger with context
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    context: LogContext,
}

impl StructuredLogger {
    /// Create a new structured logger with context
    pub fn new(context: LogContext) -> Self {
        Self { context }
    }

    /// Log an info message with context
    pub fn info(&self, message: &str) {
        let fields = self.format_fields();
        info!(%fields, "{}", message);
    }

    /// Log a warning message with context
    pub fn warn(&self, message: &str) {
        let fields = self.format_fields();
        warn!(%fields, "{}", message);
    }

    /// Log an error message with context
    pub fn error(&self, message: &str) {
        let fields = self.format_fields();
        error!(%fields, "{}", message);
    }

    /// Log a debug message with context
    pub fn debug(&self, message: &str) {
        let fields = self.format_fields();
        debug!(%fields, "{}", message);
    }

    /// Log a trace message with context
    pub fn trace(&self, message: &str) {
        let fields = self.format_fields();
        trace!(%fields, "{}", message);
    }

    fn format_fields(&self) -> String {
        let mut fields = vec![format!("component={}", self.context.component)];
        for (key, value) in &self.context.extra_fields {
            fields.push(format!("{}={}", key, value));
        }
        fields.join(",")
    }
}

/// Create a logger for a specific component
pub fn get_logger(component: &str) -> StructuredLogger {
    StructuredLogger::new(LogContext::new(component))
}

/// Create a logger with full context
pub fn get_logger_with_context(context: LogContext) -> StructuredLogger {
    StructuredLogger::new(context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("info").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("warning").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("ERROR").unwrap(), Level::ERROR);
        assert!(parse_log_level("invalid").is_err());
    }

    #[test]
    fn test_rust_log_can_raise_and_lower_level() {
        use tracing_subscriber::filter::LevelFilter;

        let configured = filter_from(Level::INFO, None);
        assert_eq!(configured.max_level_hint(), Some(LevelFilter::INFO));

        let raised = filter_from(Level::INFO, Some("octoheat=debug"));
        assert_eq!(raised.max_level_hint(), Some(LevelFilter::DEBUG));

        let lowered = filter_from(Level::DEBUG, Some("octoheat=warn"));
        assert_eq!(lowered.max_level_hint(), Some(LevelFilter::WARN));

        let blank = filter_from(Level::WARN, Some("  "));
        assert_eq!(blank.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_log_context() {
        let context = LogContext::new("test").with_field("endpoint", "http://x".to_string());
        assert_eq!(context.component, "test");
        assert_eq!(
            context.extra_fields.get("endpoint"),
            Some(&"http://x".to_string())
        );
    }

    #[test]
    fn test_format_fields_is_stable() {
        let logger = get_logger_with_context(
            LogContext::new("octoprint")
                .with_field("path", "/job".to_string())
                .with_field("method", "GET".to_string()),
        );
        assert_eq!(
            logger.format_fields(),
            "component=octoprint,method=GET,path=/job"
        );
    }

    #[test]
    fn test_structured_logger() {
        init_logging(&LoggingConfig::default()).ok();

        let logger = get_logger("test_component");
        // These should not panic
        logger.info("Test info message");
        logger.debug("Test debug message");
        logger.warn("Test warning message");
        logger.error("Test error message");
    }
}

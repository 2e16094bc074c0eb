use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, Metadata, Record};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

static CONSOLE_LOGGER: Lazy<ConsoleLogger> = Lazy::new(ConsoleLogger::new);

pub fn init() -> Result<(), String> {
    init_with_config(LoggerConfig::default())
}

pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    let level = config.min_level;
    CONSOLE_LOGGER.update_config(config);

    if let Err(e) = log::set_logger(&*CONSOLE_LOGGER) {
        return Err(format!("Failed to set logger: {:?}", e));
    }

    log::set_max_level(level.to_level_filter());
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn color(&self) -> Color {
        match self {
            LogLevel::Trace => Color::Cyan,
            LogLevel::Debug => Color::Blue,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            LogLevel::Trace => "🔍",
            LogLevel::Debug => "🐛",
            LogLevel::Info => "💡",
            LogLevel::Warn => "⚠️",
            LogLevel::Error => "❌",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn to_level(&self) -> Level {
        match self {
            LogLevel::Trace => Level::Trace,
            LogLevel::Debug => Level::Debug,
            LogLevel::Info => Level::Info,
            LogLevel::Warn => Level::Warn,
            LogLevel::Error => Level::Error,
        }
    }

    pub fn to_level_filter(&self) -> log::LevelFilter {
        self.to_level().to_level_filter()
    }

    pub fn from_level(level: Level) -> Self {
        match level {
            Level::Trace => LogLevel::Trace,
            Level::Debug => LogLevel::Debug,
            Level::Info => LogLevel::Info,
            Level::Warn => LogLevel::Warn,
            Level::Error => LogLevel::Error,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("Unknown log level: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub module: String,
    pub file: String,
    pub line: u32,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: String, module: String, file: String, line: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            level,
            message,
            module,
            file,
            line,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub show_colors: bool,
    pub show_emojis: bool,
    pub show_file_location: bool,
    pub show_module: bool,
    pub timestamp_format: String,
    pub output_json: bool,
    pub log_file_path: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: true,
            show_emojis: true,
            show_file_location: false,
            show_module: true,
            timestamp_format: "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            output_json: false,
            log_file_path: None,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// `ARTGEN_LOG` picks the level, `ARTGEN_LOG_JSON=true` switches to
    /// JSON lines, `ARTGEN_LOG_FILE` mirrors output to a file.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(level) = std::env::var("ARTGEN_LOG")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.min_level = level;
        }
        if std::env::var("ARTGEN_LOG_JSON").map_or(false, |v| v == "true") {
            config = config.with_json_output(true);
        }
        if let Ok(path) = std::env::var("ARTGEN_LOG_FILE") {
            config = config.with_file_output(&path);
        }
        config
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.show_colors = enabled;
        self
    }

    pub fn with_file_output(mut self, path: &str) -> Self {
        self.log_file_path = Some(path.to_string());
        self
    }

    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.output_json = enabled;
        if enabled {
            self.show_colors = false;
            self.show_emojis = false;
        }
        self
    }

    pub fn production() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: false,
            show_emojis: false,
            output_json: true,
            ..Default::default()
        }
    }

    pub fn development() -> Self {
        Self {
            min_level: LogLevel::Debug,
            show_file_location: true,
            ..Default::default()
        }
    }
}

pub struct ConsoleLogger {
    config: Mutex<LoggerConfig>,
    log_file: Mutex<Option<File>>,
}

impl ConsoleLogger {
    pub fn new() -> Self {
        Self {
            config: Mutex::new(LoggerConfig::default()),
            log_file: Mutex::new(None),
        }
    }

    pub fn update_config(&self, new_config: LoggerConfig) {
        let file = new_config.log_file_path.as_ref().and_then(|path| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });
        if let Ok(mut log_file) = self.log_file.lock() {
            *log_file = file;
        }
        if let Ok(mut config) = self.config.lock() {
            *config = new_config;
        }
    }

    fn format_line(&self, entry: &LogEntry, config: &LoggerConfig) -> String {
        if config.output_json {
            return serde_json::to_string(entry).unwrap_or_default();
        }

        let mut output = String::new();
        let timestamp = entry.timestamp.format(&config.timestamp_format).to_string();
        let level = if config.show_emojis {
            format!("{} {}", entry.level.emoji(), entry.level.as_str())
        } else {
            entry.level.as_str().to_string()
        };

        if config.show_colors {
            output.push_str(&format!("{} ", timestamp.bright_black()));
            output.push_str(&format!("[{}] ", level.color(entry.level.color()).bold()));
        } else {
            output.push_str(&format!("{} [{}] ", timestamp, level));
        }

        if config.show_module && !entry.module.is_empty() {
            if config.show_colors {
                output.push_str(&format!("{}: ", entry.module.bright_blue()));
            } else {
                output.push_str(&format!("{}: ", entry.module));
            }
        }

        output.push_str(&entry.message);

        if config.show_file_location {
            let location = format!(" ({}:{})", entry.file, entry.line);
            if config.show_colors {
                output.push_str(&location.bright_black().to_string());
            } else {
                output.push_str(&location);
            }
        }

        output
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        match self.config.lock() {
            Ok(config) => metadata.level() <= config.min_level.to_level(),
            Err(_) => true,
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let entry = LogEntry::new(
            LogLevel::from_level(record.level()),
            record.args().to_string(),
            record.module_path().unwrap_or("unknown").to_string(),
            record.file().unwrap_or("unknown").to_string(),
            record.line().unwrap_or(0),
        );

        let line = match self.config.lock() {
            Ok(config) => self.format_line(&entry, &config),
            Err(_) => return,
        };
        // Logs go to stderr so CLI output on stdout stays pipeable.
        eprintln!("{}", line);

        if let Ok(mut guard) = self.log_file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = writeln!(file, "{}", line);
            }
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
        if let Ok(mut guard) = self.log_file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

/// Logs how long an operation took when dropped.
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        log::debug!("⏱️  Starting: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::info!(
            "⏱️  {} completed in {}ms",
            self.name,
            self.elapsed().as_millis()
        );
    }
}

pub fn timer(name: &str) -> Timer {
    Timer::new(name)
}

pub fn log_startup_info(app_name: &str, version: &str, host: &str, port: u16) {
    log::info!("🚀 Starting {} v{}", app_name, version);
    log::info!("🌐 Server will run on http://{}:{}", host, port);
}

pub fn log_config_info(config: &crate::config::Config) {
    log::info!("⚙️  Configuration loaded:");
    log::info!("   Image API: {}", config.pollinations.image_base_url);
    log::info!("   Text API: {}", config.pollinations.text_base_url);
    log::info!(
        "   API token ({}): {}",
        config.pollinations.token_env,
        if config.pollinations.resolve_token().is_some() {
            "✅"
        } else {
            "❌"
        }
    );
}

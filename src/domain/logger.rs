use crate::nice_display::NiceDisplay;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "log.txt";

#[derive(Clone, Debug, PartialEq)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn parse(s: &str) -> Option<Level> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warning" | "warn" => Some(Level::Warning),
            "error" => Some(Level::Error),
            _ => None,
        }
    }

    pub fn to_filter(&self) -> String {
        match self {
            Level::Debug => "debug".to_string(),
            Level::Info => "info".to_string(),
            Level::Warning => "warn".to_string(),
            Level::Error => "error".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LogTo {
    File,
    Console,
}

impl LogTo {
    pub fn parse(s: &str) -> Option<LogTo> {
        match s.trim().to_lowercase().as_str() {
            "file" => Some(LogTo::File),
            "console" => Some(LogTo::Console),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Logger {
    level: Level,
    log_to: LogTo,
}

#[derive(Debug)]
pub enum Error {
    UnknownLevel(String),
    UnknownDestination(String),
    Filter(tracing_subscriber::filter::ParseError),
    Install(String),
}

impl NiceDisplay for Error {
    fn message(&self) -> String {
        match self {
            Error::UnknownLevel(level) => format!(
                "Unknown LOG_LEVEL '{}', expected one of debug, info, warning, error",
                level
            ),
            Error::UnknownDestination(dest) => format!(
                "Unknown LOG_TO '{}', expected console or file",
                dest
            ),
            Error::Filter(err) => format!("Error building log filter: {}", err),
            Error::Install(err) => format!("Error installing logger: {}", err),
        }
    }
}

impl Logger {
    pub fn init(level: Level) -> Self {
        Self {
            level,
            log_to: LogTo::Console,
        }
    }

    pub fn log_to_file(mut self) -> Self {
        self.log_to = LogTo::File;
        self
    }

    /// Reads `LOG_LEVEL` and `LOG_TO`, both optional.
    pub fn from_env() -> Result<Self, Error> {
        let level = match dotenv::var("LOG_LEVEL").ok() {
            None => Level::Info,
            Some(raw) => Level::parse(&raw).ok_or(Error::UnknownLevel(raw))?,
        };

        let log_to = match dotenv::var("LOG_TO").ok() {
            None => LogTo::Console,
            Some(raw) => LogTo::parse(&raw).ok_or(Error::UnknownDestination(raw))?,
        };

        let logger = Logger::init(level);

        Ok(match log_to {
            LogTo::Console => logger,
            LogTo::File => logger.log_to_file(),
        })
    }

    /// Installs the global subscriber. When logging to a file the returned
    /// guard must be held until shutdown or buffered lines are lost.
    pub fn install(self) -> Result<Option<WorkerGuard>, Error> {
        let filter = EnvFilter::try_new(self.level.to_filter()).map_err(Error::Filter)?;

        match self.log_to {
            LogTo::Console => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .try_init()
                    .map_err(|err| Error::Install(err.to_string()))?;

                Ok(None)
            }
            LogTo::File => {
                let appender = tracing_appender::rolling::daily(LOG_DIR, LOG_FILE);
                let (writer, guard) = tracing_appender::non_blocking(appender);

                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(writer)
                    .with_ansi(false)
                    .try_init()
                    .map_err(|err| Error::Install(err.to_string()))?;

                Ok(Some(guard))
            }
        }
    }
}

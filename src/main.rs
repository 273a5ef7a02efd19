mod capability;
mod db;
mod domain;
mod in_memory;
mod migrations;
mod nice_display;
mod server;
#[cfg(test)]
mod test_env;
mod worker;

use crate::domain::logger::{self, Logger};
use crate::in_memory::InMemoryWorker;
use crate::nice_display::NiceDisplay;
use crate::worker::Worker;
use clap::Parser;

#[derive(Debug, Parser, Clone)]
#[clap(version = "0.1", about = "Commands for the people service")]
enum Cmd {
    /// Serve /addPerson and /fetchAll
    Run {
        /// Keep people in process memory instead of Postgres
        #[clap(long)]
        in_memory: bool,
    },
    NewMigration {
        migration_name: String,
    },
    RunMigrations {
        /// Skip the confirmation prompt
        #[clap(long)]
        yes: bool,
    },
}

enum Error {
    EnvVars(dotenv::Error),
    Logger(logger::Error),
    ServerConfig(server::ConfigError),
    WorkerInit(worker::InitError),
    WebServer(server::Error),
    NewMigration(migrations::Error),
    RunMigrations(migrations::Error),
}

impl NiceDisplay for Error {
    fn message(&self) -> String {
        match self {
            Error::EnvVars(err) => {
                format!("Error loading environment variables: {}", err)
            }
            Error::Logger(err) => err.message(),
            Error::ServerConfig(err) => err.message(),
            Error::WorkerInit(err) => err.message(),
            Error::WebServer(err) => err.message(),
            Error::NewMigration(err) => err.message(),
            Error::RunMigrations(err) => err.message(),
        }
    }
}

#[actix_web::main]
async fn main() -> Result<(), String> {
    nice_main()
        .await
        .map_err(|err| err.to_nice_error().to_string())
}

async fn nice_main() -> Result<(), Error> {
    let cmd = Cmd::parse();

    match dotenv::dotenv() {
        Ok(_) => {}
        Err(err) if err.not_found() => {}
        Err(err) => return Err(Error::EnvVars(err)),
    }

    let _log_guard = Logger::from_env()
        .and_then(Logger::install)
        .map_err(Error::Logger)?;

    match cmd {
        Cmd::Run { in_memory } => run_server(in_memory).await,
        Cmd::NewMigration { migration_name } => migrations::new(migration_name)
            .await
            .map_err(Error::NewMigration),
        Cmd::RunMigrations { yes } => migrations::run(yes).await.map_err(Error::RunMigrations),
    }
}

async fn run_server(in_memory: bool) -> Result<(), Error> {
    let config = server::Config::load().map_err(Error::ServerConfig)?;

    if in_memory {
        tracing::warn!("Storing people in memory, nothing will survive a restart");
        server::run(config, InMemoryWorker::new())
            .await
            .map_err(Error::WebServer)
    } else {
        let worker = Worker::new().await.map_err(Error::WorkerInit)?;
        server::run(config, worker).await.map_err(Error::WebServer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cmd::command().debug_assert();
    }

    #[test]
    fn parses_run_and_migration_flags() {
        let run = Cmd::try_parse_from(["people", "run", "--in-memory"]).unwrap();
        assert!(matches!(run, Cmd::Run { in_memory: true }));

        let migrate = Cmd::try_parse_from(["people", "run-migrations", "--yes"]).unwrap();
        assert!(matches!(migrate, Cmd::RunMigrations { yes: true }));
    }
}

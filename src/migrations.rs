use crate::db;
use crate::nice_display::NiceDisplay;
use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::path::Path;
use std::{fs, io};
use tokio_postgres::NoTls;

const MIGRATIONS_DIR: &str = "./db/migrations";
const SEPARATOR: &str = "____";
const DATE_FORMAT: &str = "%Y-%m-%d-%H:%M:%S";

#[derive(Debug, PartialEq)]
struct Migration {
    file_name: String,
    timestamp: i64,
}

impl Migration {
    fn parse(file_name: String) -> Result<Migration, Error> {
        let (date, rest) = match file_name.split_once(SEPARATOR) {
            Some(parts) => parts,
            None => return Err(Error::SplittingFileName { file_name }),
        };

        if rest.trim_end_matches(".sql").is_empty() {
            return Err(Error::SplittingFileName { file_name });
        }

        let timestamp = NaiveDateTime::parse_from_str(date, DATE_FORMAT)
            .map_err(|err| Error::ParsingDateFromFileName {
                file_name: file_name.clone(),
                err,
            })?
            .and_utc()
            .timestamp();

        Ok(Migration {
            file_name,
            timestamp,
        })
    }

    fn human_name(&self) -> &str {
        self.file_name
            .split_once(SEPARATOR)
            .map(|(_, rest)| rest)
            .unwrap_or(self.file_name.as_str())
            .trim_end_matches(".sql")
    }
}

#[derive(Debug)]
pub enum Error {
    WritingFile(io::Error),
    GettingMigrations(io::Error),
    ParsingDateFromFileName {
        file_name: String,
        err: chrono::ParseError,
    },
    ConnectingToDb(tokio_postgres::Error),
    ReadingMigrationFile(io::Error),
    ReadingConfirmation(io::Error),
    DbConfig(db::ConfigError),
    PreparingBookkeeping(tokio_postgres::Error),
    ExecutingMigration {
        file_name: String,
        err: tokio_postgres::Error,
    },
    SplittingFileName {
        file_name: String,
    },
}

impl NiceDisplay for Error {
    fn message(&self) -> String {
        match self {
            Error::WritingFile(err) => format!("Error writing migration file: {}", err),
            Error::GettingMigrations(err) => format!("Error getting migrations: {}", err),
            Error::ParsingDateFromFileName { file_name, err } => {
                format!("Error parsing date from file name '{}': {}", file_name, err)
            }
            Error::ConnectingToDb(err) => format!("Error connecting to database: {}", err),
            Error::ReadingMigrationFile(err) => format!("Error reading migration file: {}", err),
            Error::ReadingConfirmation(err) => format!("Error reading confirmation: {}", err),
            Error::DbConfig(err) => format!("Database configuration error: {}", err.message()),
            Error::PreparingBookkeeping(err) => {
                format!("Error preparing the migration table: {}", err)
            }
            Error::ExecutingMigration { file_name, err } => {
                format!("Error executing migration '{}': {}", file_name, err)
            }
            Error::SplittingFileName { file_name } => {
                format!("Error splitting file name '{}'", file_name)
            }
        }
    }
}

pub async fn new(name: String) -> Result<(), Error> {
    let now = chrono::Utc::now().format(DATE_FORMAT).to_string();

    let new_migration_file_name = format!("{}{}{}.sql", now, SEPARATOR, name);

    fs::write(
        Path::new(MIGRATIONS_DIR).join(&new_migration_file_name),
        template(&name),
    )
    .map_err(Error::WritingFile)?;

    tracing::info!("Wrote {}", new_migration_file_name);

    Ok(())
}

/// Each file runs inside the transaction that records it, so a file must not
/// open or commit a transaction of its own.
fn template(name: &str) -> String {
    r#"-- ${name}

-- Write your migration here
"#
    .replace("${name}", name)
}

pub async fn run(skip_confirmation: bool) -> Result<(), Error> {
    let migrations: Vec<Migration> = get_migrations(Path::new(MIGRATIONS_DIR))?;

    let config = db::Config::load().await.map_err(Error::DbConfig)?;

    if !skip_confirmation && !confirm(&config)? {
        println!("Okay, I won't run the migrations");
        return Ok(());
    }

    let (mut client, connection) = tokio_postgres::connect(&config.to_connect_string(), NoTls)
        .await
        .map_err(Error::ConnectingToDb)?;

    tokio::spawn(async move {
        if let Err(err) = connection.await {
            tracing::error!("connection error: {}", err);
        }
    });

    client
        .batch_execute(
            r#"
                CREATE TABLE IF NOT EXISTS migration (
                    name TEXT PRIMARY KEY,
                    ran_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );
            "#,
        )
        .await
        .map_err(Error::PreparingBookkeeping)?;

    let already_ran: HashSet<String> = client
        .query("SELECT name FROM migration;", &[])
        .await
        .map_err(Error::PreparingBookkeeping)?
        .iter()
        .map(|row| row.get::<_, String>("name"))
        .collect();

    let pending: Vec<Migration> = migrations
        .into_iter()
        .filter(|migration| !already_ran.contains(&migration.file_name))
        .collect();
    let pending_len = pending.len();

    for (index, migration) in pending.iter().enumerate() {
        tracing::info!(
            "Running {}/{}, {}",
            index + 1,
            pending_len,
            migration.human_name()
        );

        let migration_file_content =
            fs::read_to_string(Path::new(MIGRATIONS_DIR).join(&migration.file_name))
                .map_err(Error::ReadingMigrationFile)?;

        let executing_error = |err| Error::ExecutingMigration {
            file_name: migration.file_name.clone(),
            err,
        };

        let transaction = client.transaction().await.map_err(executing_error)?;

        transaction
            .batch_execute(migration_file_content.as_str())
            .await
            .map_err(executing_error)?;

        transaction
            .execute(
                "INSERT INTO migration (name) VALUES ($1);",
                &[&migration.file_name],
            )
            .await
            .map_err(executing_error)?;

        transaction.commit().await.map_err(executing_error)?;
    }

    let finish_msg = if pending_len > 0 {
        "Done!"
    } else {
        "You are already up to date, no migrations run!"
    };

    tracing::info!("{}", finish_msg);

    Ok(())
}

fn confirm(config: &db::Config) -> Result<bool, Error> {
    println!(
        "Should I run migrations against database {} at host {}? (Y/n): ",
        config.name, config.host
    );

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .map_err(Error::ReadingConfirmation)?;

    Ok(input.trim().to_uppercase() == "Y")
}

fn get_migrations(dir: &Path) -> Result<Vec<Migration>, Error> {
    let mut migrations = Vec::new();

    for entry in fs::read_dir(dir).map_err(Error::GettingMigrations)? {
        let entry = entry.map_err(Error::GettingMigrations)?;
        let path = entry.path();

        let is_sql = path.extension().and_then(|ext| ext.to_str()) == Some("sql");
        if !is_sql || !entry.file_type().map_err(Error::GettingMigrations)?.is_file() {
            continue;
        }

        if let Some(file_name) = entry.file_name().to_str() {
            migrations.push(Migration::parse(file_name.to_string())?);
        }
    }

    migrations.sort_by(|m0, m1| m0.timestamp.cmp(&m1.timestamp));

    Ok(migrations)
}

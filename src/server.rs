use crate::capability::person::PersonCapability;
use crate::domain::person::Person;
use crate::nice_display::NiceDisplay;
use actix_web::middleware::Logger;
use actix_web::{error, web, App, HttpRequest, HttpResponse, HttpServer};
use std::num::ParseIntError;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 1754;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
}

#[derive(Debug)]
pub enum ConfigError {
    ParsingPort { raw: String, err: ParseIntError },
}

impl NiceDisplay for ConfigError {
    fn message(&self) -> String {
        match self {
            ConfigError::ParsingPort { raw, err } => {
                format!("Error parsing PORT '{}': {}", raw, err)
            }
        }
    }
}

impl Config {
    pub fn load() -> Result<Config, ConfigError> {
        let host = dotenv::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());

        let port = match dotenv::var("PORT").ok() {
            None => DEFAULT_PORT,
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|err| ConfigError::ParsingPort { raw, err })?,
        };

        Ok(Config { host, port })
    }
}

pub enum Error {
    Bind(std::io::Error),
    Run(std::io::Error),
}

impl NiceDisplay for Error {
    fn message(&self) -> String {
        match self {
            Error::Run(err) => format!("Error running server: {}", err),
            Error::Bind(err) => {
                format!("Error binding server: {}", err)
            }
        }
    }
}

pub async fn run<W>(config: Config, worker: W) -> Result<(), Error>
where
    W: PersonCapability + Send + Sync + 'static,
{
    tracing::info!("Running server on {}:{}", config.host, config.port);

    let worker = web::Data::new(worker);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Dms"))
            .app_data(worker.clone())
            .configure(routes::<W>)
    })
    .bind((config.host.as_str(), config.port))
    .map_err(Error::Bind)?
    .run()
    .await
    .map_err(Error::Run)
}

pub fn routes<W>(cfg: &mut web::ServiceConfig)
where
    W: PersonCapability + Send + Sync + 'static,
{
    cfg.app_data(web::JsonConfig::default().error_handler(reject_body))
        .route("/addPerson", web::post().to(add_person::<W>))
        .route("/fetchAll", web::get().to(fetch_all::<W>));
}

fn reject_body(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::warn!(path = %req.path(), "Rejected request body: {}", err);
    error::InternalError::from_response(err, HttpResponse::BadRequest().finish()).into()
}

async fn add_person<W: PersonCapability + 'static>(
    worker: web::Data<W>,
    body: web::Json<Person>,
) -> HttpResponse {
    match worker.save(body.into_inner()).await {
        Ok(person) => HttpResponse::Ok().json(person),
        Err(err) => {
            tracing::error!("Error saving person\n{}", err.to_nice_error());
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn fetch_all<W: PersonCapability + 'static>(worker: web::Data<W>) -> HttpResponse {
    match worker.find_all().await {
        Ok(people) => HttpResponse::Ok().json(people),
        Err(err) => {
            tracing::error!("Error fetching people\n{}", err.to_nice_error());
            HttpResponse::InternalServerError().finish()
        }
    }
}

// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Core library of the *RSVP Controller*
//!
//! # Example
//!
//! ```no_run
//! use rsvp_controller_core::Controller;
//! use anyhow::Result;
//!
//! #[actix_web::main]
//! async fn main()  {
//!     rsvp_controller_core::try_or_exit(run()).await;
//! }
//!
//! async fn run() -> Result<()> {
//!    if let Some(controller) = Controller::create("RSVP Controller").await? {
//!         controller.run().await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

use crate::api::v1::response::json_error_handler;
use crate::services::{MailService, RsvpService};
use crate::settings::{Settings, SharedSettings};
use crate::trace::ReducedSpanBuilder;
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::web::Data;
use actix_web::{web, App, HttpServer, Scope};
use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use database::Db;
use std::net::Ipv6Addr;
use std::sync::Arc;
use tokio::signal::ctrl_c;
use tokio::signal::unix::{signal, SignalKind};
use tokio_executor_trait::Tokio as TokioExecutor;
use tokio_reactor_trait::Tokio as TokioReactor;
use tracing_actix_web::TracingLogger;

#[cfg(not(doc))]
mod api;
#[cfg(doc)]
pub mod api;

mod cli;
mod trace;

pub mod services;
pub mod settings;

#[derive(Debug, thiserror::Error)]
#[error("Blocking thread has panicked")]
pub struct BlockingError;

/// Custom version of `actix_web::web::block` which retains the current tracing span
pub async fn block<F, R>(f: F) -> Result<R, BlockingError>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let span = tracing::Span::current();

    let fut = actix_rt::task::spawn_blocking(move || span.in_scope(f));

    fut.await.map_err(|_| BlockingError)
}

/// Wrapper of the main function. Correctly outputs the error to the logging utility or stderr.
pub async fn try_or_exit<T, F>(f: F) -> T
where
    F: std::future::Future<Output = Result<T>>,
{
    match f.await {
        Ok(ok) => ok,
        Err(err) => {
            if log::log_enabled!(log::Level::Error) {
                log::error!("Crashed with error: {:?}", err);
            } else {
                eprintln!("Crashed with error: {err:?}");
            }

            std::process::exit(-1);
        }
    }
}

/// Controller struct representation containing all fields required to drive the controller
pub struct Controller {
    /// Settings loaded on [Controller::create]
    pub startup_settings: Arc<Settings>,

    /// Cloneable shared settings, can be used to reload settings from, when receiving the `reload` signal.
    pub shared_settings: SharedSettings,

    /// CLI arguments
    args: cli::Args,

    db: Arc<Db>,

    /// RabbitMQ connection of the mail task channel, only set when `rabbit_mq` is configured
    rabbitmq_connection: Option<lapin::Connection>,

    /// Channel the mail tasks are published on
    rabbitmq_channel: Option<Arc<lapin::Channel>>,
}

impl Controller {
    /// Tries to create a controller from CLI arguments and then the settings.
    ///
    /// This can return Ok(None) which would indicate that the controller executed a CLI
    /// subprogram (e.g. `migrate-db`) and must now exit.
    ///
    /// Otherwise it will return itself which can be run using [`Controller::run`]
    pub async fn create(program_name: &str) -> Result<Option<Self>> {
        let args = cli::parse_args().await?;

        // Some args run commands by them self and thus should exit here
        if !args.controller_should_start() {
            return Ok(None);
        }

        let settings = settings::load_settings(&args)?;

        trace::init(&settings.logging)?;

        log::info!("Starting {} {}", program_name, env!("CARGO_PKG_VERSION"));

        let controller = Self::init(settings, args).await?;

        Ok(Some(controller))
    }

    #[tracing::instrument(err, skip(settings, args))]
    async fn init(settings: Settings, args: cli::Args) -> Result<Self> {
        let settings = Arc::new(settings);
        let shared_settings: SharedSettings = Arc::new(ArcSwap::from(settings.clone()));

        db_storage::migrations::migrate_from_url(&settings.database.url)
            .await
            .context("Failed to migrate database")?;

        // Connect to postgres
        let db = Arc::new(Db::connect(&settings.database).context("Failed to connect to database")?);

        let (rabbitmq_connection, rabbitmq_channel) = if let Some(rabbit_mq) = &settings.rabbit_mq
        {
            let connection = lapin::Connection::connect(
                &rabbit_mq.url,
                lapin::ConnectionProperties::default()
                    .with_executor(TokioExecutor::current())
                    .with_reactor(TokioReactor),
            )
            .await
            .context("Failed to connect to rabbitmq")?;

            let channel = connection
                .create_channel()
                .await
                .context("Could not create rabbitmq channel")?;

            (Some(connection), Some(Arc::new(channel)))
        } else {
            log::info!("No rabbit_mq configured, rsvp notifications are disabled");

            (None, None)
        };

        Ok(Self {
            startup_settings: settings,
            shared_settings,
            args,
            db,
            rabbitmq_connection,
            rabbitmq_channel,
        })
    }

    /// Runs the controller until a fatal error occurred or a shutdown is requested (e.g. SIGTERM).
    pub async fn run(self) -> Result<()> {
        // Start HTTP Server
        let http_server = {
            let cors = self.startup_settings.http.cors.clone();

            let notification_timeout = self
                .startup_settings
                .rabbit_mq
                .as_ref()
                .map(|rabbit_mq| rabbit_mq.notification_timeout)
                .unwrap_or_else(settings::default_notification_timeout);

            let mail_service = Arc::new(MailService::new(
                self.shared_settings.clone(),
                self.rabbitmq_channel.clone(),
            ));

            let rsvp_service = Data::new(RsvpService::new(
                self.db.clone(),
                mail_service,
                notification_timeout,
            ));

            HttpServer::new(move || {
                let cors = setup_cors(&cors);

                App::new()
                    .wrap(TracingLogger::<ReducedSpanBuilder>::new())
                    .wrap(cors)
                    .app_data(json_config())
                    .app_data(rsvp_service.clone())
                    .service(api_scope())
            })
        };

        let address = (Ipv6Addr::UNSPECIFIED, self.startup_settings.http.port);

        let http_server = http_server.bind(address).with_context(|| {
            format!("Failed to bind http server to {}:{}", address.0, address.1)
        })?;

        log::info!("Startup finished");

        let http_server = http_server.disable_signals().run();
        let http_server_handle = http_server.handle();

        let mut reload_signal =
            signal(SignalKind::hangup()).context("Failed to register SIGHUP signal handler")?;

        actix_rt::spawn(http_server);

        // Wait for either SIGTERM or SIGHUP and handle them accordingly
        loop {
            tokio::select! {
                _ = ctrl_c() => {
                    log::info!("Got termination signal, exiting");
                    break;
                }
                _ = reload_signal.recv() => {
                    log::info!("Got reload signal, reloading");

                    if let Err(e) = settings::reload_settings(self.shared_settings.clone(), &self.args.config) {
                        log::error!("Failed to reload settings, {}", e);
                    }
                }
            }
        }

        // ==== Begin shutdown sequence ====

        // Stop the HTTP server, in-flight requests are finished first
        http_server_handle.stop(true).await;

        if let Some(connection) = &self.rabbitmq_connection {
            if let Err(e) = connection.close(0, "shutting down").await {
                log::error!("Failed to close RabbitMQ connection, {}", e);
            }
        }

        log::info!("Shutdown finished, goodbye!");

        Ok(())
    }
}

/// The JSON extractor config, reports malformed bodies as [`ApiError`](api::v1::response::ApiError)
pub(crate) fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

pub(crate) fn api_scope() -> Scope {
    // the latest version contains the root services
    web::scope("/api").service(api::v1::rsvps::services())
}

fn setup_cors(settings: &settings::HttpCors) -> Cors {
    let mut cors = Cors::default();

    if settings.allowed_origin.is_empty() {
        cors = cors.allow_any_origin();
    }

    for origin in &settings.allowed_origin {
        cors = cors.allowed_origin(origin)
    }

    cors.allowed_header(header::CONTENT_TYPE)
        .allowed_methods(["GET", "POST", "DELETE"])
}

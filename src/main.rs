// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use kube::Client;
use spark_clusters::{
    cluster_config::{ConfigMapProfileStore, DirectoryProfileStore, ProfileStore},
    constants::{APP_NAME, DEFAULT_LISTEN_HOST, DEFAULT_LISTEN_PORT, SERVICE_ACCOUNT_NAMESPACE_PATH},
    context::Context,
    environment::{resolve_namespace, RuntimeEnvironment},
    platform::{kubernetes::KubePlatform, Platform},
    server,
    templates::RestCoordinates,
};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// REST service that provisions, inspects, scales and tears down Spark clusters
#[derive(Debug, Parser)]
#[command(name = "spark-clusters", version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "SPARK_CLUSTERS_HOST", default_value = DEFAULT_LISTEN_HOST)]
    host: String,

    /// Port to listen on
    #[arg(long, env = "SPARK_CLUSTERS_PORT", default_value_t = DEFAULT_LISTEN_PORT)]
    port: u16,

    /// Namespace for cluster resources
    #[arg(long, env = "SPARK_CLUSTERS_NAMESPACE")]
    namespace: Option<String>,

    /// Container image for masters and workers
    #[arg(long, env = "SPARK_IMAGE")]
    spark_image: Option<String>,

    /// Host of this service, handed to cluster pods
    #[arg(long, env = "SPARK_CLUSTERS_REST_SERVICE_HOST", default_value = "")]
    rest_service_host: String,

    /// Port of this service, handed to cluster pods
    #[arg(long, env = "SPARK_CLUSTERS_REST_SERVICE_PORT", default_value = "")]
    rest_service_port: String,

    /// Name reported as the web service in server info
    #[arg(long, env = "SPARK_CLUSTERS_WEB_SERVICE_NAME", default_value = APP_NAME)]
    web_service_name: String,

    /// Read named profiles from `<dir>/<profile>.<key>` instead of ConfigMaps
    #[arg(long, env = "SPARK_CLUSTERS_PROFILE_DIR")]
    profile_dir: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log output format
    #[arg(
        long,
        env = "RUST_LOG_FORMAT",
        value_enum,
        ignore_case = true,
        default_value_t = LogFormat::Text
    )]
    log_format: LogFormat,
}

impl Args {
    fn listen_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("invalid listen host '{}'", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    fn rest_coordinates(&self) -> RestCoordinates {
        RestCoordinates {
            host: self.rest_service_host.trim().to_string(),
            port: self.rest_service_port.trim().to_string(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("spark-clusters")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

fn log_writer(log_file: Option<&Path>) -> Result<BoxMakeWriter> {
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("unable to open log file {}", path.display()))?;
            Ok(BoxMakeWriter::new(std::sync::Mutex::new(file)))
        }
        None => Ok(BoxMakeWriter::new(std::io::stderr)),
    }
}

/// Initialize logging.
///
/// Format: timestamp file:line LEVEL message, or one JSON object per line.
/// Respects `RUST_LOG` if set, otherwise defaults to INFO.
fn init_tracing(format: LogFormat, log_file: Option<&Path>) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let writer = log_writer(log_file)?;
    let ansi = log_file.is_none();

    match format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(ansi)
                .compact()
                .init();
        }
    }
    Ok(())
}

async fn async_main(args: Args) -> Result<()> {
    init_tracing(args.log_format, args.log_file.as_deref())?;
    info!("Starting spark-clusters {}", env!("CARGO_PKG_VERSION"));

    let addr = args.listen_addr()?;

    debug!("Initializing Kubernetes client");
    let client = Client::try_default()
        .await
        .context("unable to create Kubernetes client")?;

    let namespace = resolve_namespace(
        args.namespace.clone(),
        Path::new(SERVICE_ACCOUNT_NAMESPACE_PATH),
        client.default_namespace(),
    )
    .await;
    match &namespace {
        Some(ns) => info!(namespace = %ns, "Managing clusters in namespace"),
        None => warn!("No namespace configured, cluster operations will fail"),
    }
    if args.spark_image.is_none() {
        warn!("No spark image configured, cluster creation will fail");
    }

    let platform: Arc<dyn Platform> = Arc::new(KubePlatform::new(client));
    let profiles: Arc<dyn ProfileStore> = match &args.profile_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "Reading cluster profiles from directory");
            Arc::new(DirectoryProfileStore::new(dir.clone()))
        }
        None => Arc::new(ConfigMapProfileStore::new(platform.clone())),
    };

    let environment = RuntimeEnvironment::new(
        namespace,
        args.spark_image.clone(),
        args.rest_coordinates(),
        args.web_service_name.clone(),
    );
    let ctx = Arc::new(Context::new(platform, profiles, environment));

    server::serve(addr, ctx, shutdown_signal())
        .await
        .with_context(|| format!("REST server on {addr} failed"))?;

    info!("Graceful shutdown completed successfully");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Unable to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Unable to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT (Ctrl+C), initiating graceful shutdown..."),
        () = terminate => info!("Received SIGTERM (pod termination), initiating graceful shutdown..."),
    }
}

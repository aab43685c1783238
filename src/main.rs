//! histoseg-viewer - overlay segmentations on histology tiles and volumes.
//!
//! This binary renders the viewer to a file, serves it over HTTP, or
//! inspects a single input.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use histoseg_viewer::{
    config::{Cli, Command, InputArgs, InspectConfig, RenderConfig, ServeConfig},
    format::resolve_extension,
    loader::{load_data, loader_for, RasterVolume},
    overlay::Visualization,
    server::{create_router, write_document, AppState, RouterConfig},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Render(config) => run_render(config),
        Command::Serve(config) => run_serve(config).await,
        Command::Inspect(config) => run_inspect(config),
    }
}

/// Load the class scheme, the base image and every segmentation.
fn open_visualization(input: &InputArgs) -> Option<Visualization> {
    let scheme = match input.load_scheme() {
        Ok(scheme) => scheme,
        Err(e) => {
            error!("Failed to load class scheme: {}", e);
            return None;
        }
    };

    match Visualization::open(&input.image, &input.segmentations, scheme) {
        Ok(vis) => Some(vis),
        Err(e) => {
            error!("Failed to build visualization: {}", e);
            None
        }
    }
}

// =============================================================================
// Render Command
// =============================================================================

fn run_render(config: RenderConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let Some(vis) = open_visualization(&config.input) else {
        return ExitCode::FAILURE;
    };

    if let Err(e) = write_document(&vis, &config.output) {
        error!("Failed to write {}: {}", config.output.display(), e);
        return ExitCode::FAILURE;
    }

    info!(
        "Wrote {} ({} panel(s))",
        config.output.display(),
        vis.overlays().len()
    );
    ExitCode::SUCCESS
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let Some(vis) = open_visualization(&config.input) else {
        return ExitCode::FAILURE;
    };

    info!("Configuration:");
    info!("  Image: {}", vis.image_name());
    for (index, overlay) in vis.overlays().iter().enumerate() {
        info!("  Segmentation {}: {}", index, overlay.name());
    }
    if config.no_tracing {
        warn!("  Request tracing: disabled");
    }

    let router_config = RouterConfig::new().with_tracing(!config.no_tracing);
    let router = create_router(AppState::new(vis), router_config);

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("");
    info!("  Viewer:   http://{}/", addr);
    info!("  Overlays: curl http://{}/api/overlays", addr);
    info!("");

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Inspect Command
// =============================================================================

fn run_inspect(config: InspectConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    let extension = match resolve_extension(&config.path) {
        Ok(extension) => extension,
        Err(e) => {
            println!("✗ {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("File:      {}", config.path.display());
    println!("Extension: {}", extension);
    println!("Loader:    {}", loader_for(extension).name());

    let volume = match load_data(&config.path, config.label) {
        Ok(volume) => volume,
        Err(e) => {
            println!("✗ {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Kind:      {}", volume.kind());
    println!("Shape:     {:?}", volume.shape());

    if let RasterVolume::Label(_) = volume {
        let ids: Vec<String> = volume.class_ids().iter().map(u32::to_string).collect();
        println!("Classes:   {}", ids.join(", "));
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "histoseg_viewer=debug,tower_http=debug"
    } else {
        "histoseg_viewer=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

use std::process::ExitCode;

use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn main() -> ExitCode {
    // .env first so RUST_LOG, DATABASE_URL and friends apply
    dotenv().ok();

    let (cfg, source) = match server::startup::load_config() {
        Ok(loaded) => loaded,
        Err(e) => {
            common::utils::logging::init_logging_default();
            error!(service = "server", event = "config_invalid", error = %e, "refusing to start");
            return ExitCode::FAILURE;
        }
    };
    common::utils::logging::init_logging(cfg.logging.json);
    info!(service = "server", event = "logger_init", json = cfg.logging.json, "tracing subscriber initialized");
    info!(service = "server", event = "config_loaded", %source, "configuration loaded");

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "server",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "server", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "server",
        event = "start",
        %service_id,
        pid,
        version,
        threads = cfg.server.worker_threads.unwrap_or_default(),
        "store products service starting"
    );

    // run() owns the Ctrl+C handling and drains in-flight requests
    rt.block_on(async move {
        match server::run(cfg).await {
            Ok(()) => {
                info!(service = "server", event = "stop", %service_id, pid, "server stopped normally");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(service = "server", event = "run_failed", error = %e, "server::run returned error");
                ExitCode::FAILURE
            }
        }
    })
}

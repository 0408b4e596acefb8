use clap::Parser;
use corrie::configuration::Config;
use corrie::interaction::LogRenderer;
use corrie::navigation::{Location, Router, CORRELATION_PATH};
use corrie::view::CorrelationView;
use corrie::web_interface::{ApiContext, WebServer};
use log::{error, info, warn};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Parser)]
#[command(name = "corrie")]
#[command(version = "0.0.2")]
#[command(about = "Flow correlation viewer for attack/defence network captures")]
struct Args {
    config_file: String,

    /// Mount one headless correlation view on this filter query and log what
    /// it draws, instead of serving the web interface
    #[arg(long, value_name = "QUERY")]
    watch: Option<String>,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .init();

    println!(
        "
 ██████╗ ██████╗ ██████╗ ██████╗ ██╗███████╗
██╔════╝██╔═══██╗██╔══██╗██╔══██╗██║██╔════╝
██║     ██║   ██║██████╔╝██████╔╝██║█████╗
██║     ██║   ██║██╔══██╗██╔══██╗██║██╔══╝
╚██████╗╚██████╔╝██║  ██║██║  ██║██║███████╗
 ╚═════╝ ╚═════╝ ╚═╝  ╚═╝╚═╝  ╚═╝╚═╝╚══════╝
============================================
       Flow correlation viewer v0.0.2
============================================
"
    );

    info!("Importing configuration");

    let args = Args::parse();

    if args.config_file.is_empty() {
        error!("No configuration file found");
        std::process::exit(1);
    }

    let config = match Config::from_file(Path::new(args.config_file.as_str())) {
        Ok(config) => config,
        Err(e) => {
            error!("Unable to import configuration from file: {}", e);
            std::process::exit(1);
        }
    };

    info!("Configuration imported successfully");

    let store = match config.open_store() {
        Ok(store) => store,
        Err(e) => {
            error!("Unable to open the flow store: {}, exiting...", e);
            std::process::exit(1);
        }
    };

    if let Some(query) = args.watch {
        let router = Arc::new(Router::new(Location::new(CORRELATION_PATH, query)));
        let mut view = CorrelationView::on_router(
            store,
            router,
            Arc::new(LogRenderer),
            config.view_settings(),
        )
        .with_services(config.services.clone());

        if let Some(period) = config.refresh_interval() {
            info!("Refreshing every {:?}", period);
            let (tx, rx) = watch::channel(0u64);
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(period);
                // The first tick completes immediately and the view queries on mount.
                ticker.tick().await;
                let mut count = 0u64;
                loop {
                    ticker.tick().await;
                    count += 1;
                    if tx.send(count).is_err() {
                        break;
                    }
                }
            });
            view = view.with_refresh(rx);
        }

        tokio::select! {
            result = view.run() => {
                if let Err(e) = result {
                    error!("Correlation view stopped: {}", e);
                    std::process::exit(1);
                }
            }
            _ = tokio::signal::ctrl_c() => info!("Interrupted, exiting"),
        }
        return;
    }

    if !config.web.enabled {
        warn!("Web interface disabled and no --watch query given, nothing to do");
        return;
    }

    let server = WebServer::new(ApiContext::new(
        store,
        config.services.clone(),
        config.view_settings(),
    ));

    tokio::select! {
        result = server.start(config.web.port) => {
            if let Err(e) = result {
                error!("Web interface stopped: {}", e);
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => info!("Interrupted, exiting"),
    }
}

mod cli;

use actix_web::{web, App, HttpServer};
use facematch::config::Config;
use facematch::extract::HttpExtractor;
use facematch::server::AppState;
use facematch::{FaceStore, SharedStore};
use std::sync::Arc;
use tracing::info;

#[actix_web::main]
async fn main() -> Result<(), std::io::Error> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() == 1 {
        let mut store = FaceStore::new();
        cli::run_repl(&mut store);
    } else {
        if args[1] == "serve" {
            tracing_subscriber::fmt::init();
            let config = Config::from_env();

            let store = match SharedStore::open(&config.snapshot_path) {
                Ok(store) => store,
                Err(error) => {
                    eprintln!("Cannot start: {}", error);
                    std::process::exit(1);
                }
            };
            info!(
                bind = %config.bind,
                snapshot = %config.snapshot_path,
                records = store.count(),
                "starting facematch server"
            );

            let state = web::Data::new(AppState {
                store,
                extractor: Arc::new(HttpExtractor::new(&config.extractor_url)),
            });

            HttpServer::new(move || {
                App::new()
                    .app_data(state.clone())
                    .configure(facematch::server::config)
            })
            .bind(&config.bind)?
            .run()
            .await?;
        } else {
            cli::run_single_command();
        }
    }

    Ok(())
}

use std::process::ExitCode;
use std::sync::Arc;

use sonoreport::api::start_api_server;
use sonoreport::config::{self, AppConfig};
use sonoreport::pipeline::extraction::ChatCompletionClient;
use sonoreport::pipeline::storage::SqliteDocumentStore;
use sonoreport::pipeline::{AnalysisPipeline, PipelineSettings};

fn main() -> ExitCode {
    sonoreport::init_tracing();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env();

    let store = match SqliteDocumentStore::open(&config.database_path) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(path = %config.database_path.display(), "Cannot open document store: {e}");
            return ExitCode::FAILURE;
        }
    };

    // The blocking HTTP client owns its own runtime; build it (and drop it)
    // outside the async runtime below.
    let client = match ChatCompletionClient::new(&config.inference) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Cannot build inference client: {e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        endpoint = client.endpoint(),
        model = %config.inference.model,
        "Inference client ready"
    );

    let pipeline = Arc::new(AnalysisPipeline::new(
        Arc::new(store),
        Arc::new(client),
        PipelineSettings::from_config(&config),
    ));

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Cannot start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(async {
        let server = start_api_server(config.bind_addr, pipeline.clone()).await?;
        tracing::info!(addr = %server.addr, "Listening");

        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Cannot listen for shutdown signal: {e}");
        }
        server.stop().await;
        Ok::<(), String>(())
    });
    drop(runtime);
    drop(pipeline);

    match result {
        Ok(()) => {
            tracing::info!("{} stopped", config::APP_NAME);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

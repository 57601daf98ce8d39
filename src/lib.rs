pub mod app;
pub mod args;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra {
    pub mod memory_adapter;
    pub mod s3_adapter;
    pub mod s3_client;
}
pub mod objects;
pub mod pipeline;
pub mod ports;
pub mod table;
pub mod utils {
    pub mod log_utils;
    pub mod path_utils;
}

use std::sync::Arc;

pub use args::Args;
pub use errors::ObjstoreCsvMgrError;

use app::AppCore;
use config::AppConfig;
use infra::s3_client::S3StorageClient;
use utils::log_utils::Logger;

/// Load configuration, build the storage client once, and run the parsed command.
///
/// # Errors
///
/// Configuration problems are returned before any request is made; otherwise the
/// command's own error is returned.
pub fn run_app(args: &Args) -> Result<(), ObjstoreCsvMgrError> {
    let logger = Logger::new(args.verbose);

    if let Ok(json) = serde_json::to_string(args) {
        logger.debug(&format!("Parsed arguments: {json}"));
    }

    let config = AppConfig::load(args.env_file.as_deref())?;
    logger.debug(&format!("Loaded configuration: {:?}", config.storage));

    let client = S3StorageClient::new(&config.storage, logger)?;
    let core = AppCore::new(Arc::new(client), config, logger);
    core.run(&args.command)
}

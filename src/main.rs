mod config;
mod error;
mod handler;
mod models;
mod payload;
mod sink;
mod timeline;
mod utils;

use log::{error, info};
use std::io::Read;
use std::{env, fs, io};

use config::AppConfig;
use handler::handle_json;
use sink::InfluxSink;

/// Read the event JSON from the file named by the first argument, or stdin
fn read_event() -> io::Result<String> {
    match env::args().nth(1) {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match AppConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let input = match read_event() {
        Ok(input) => input,
        Err(e) => {
            error!("Failed to read event: {}", e);
            return Err(e.into());
        }
    };

    // One sink connection per invocation
    let sink = InfluxSink::new(&config.sink)?;
    let response = handle_json(&input, config.layout, &sink, config.strict_sink).await;

    info!("Responding with status {}", response.status_code);
    println!("{}", serde_json::to_string(&response)?);

    Ok(())
}

use std::process::ExitCode;

use greet_rpc::{BoxError, ClientConfig, GreetClient};
use tracing::Level;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::default();
    let result = GreetClient::connect(config)
        .map_err(BoxError::from)
        .and_then(|mut client| greet_client::run(&mut client, &mut std::io::stdout().lock()));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "greeting failed");
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

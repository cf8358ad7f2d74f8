use std::time::Duration;

use ollama_api_client::{ClientConfig, OllamaClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let name = std::env::args().nth(1).unwrap_or_else(|| "llama3.2:3b".to_string());

    // pulls can take a while before the server answers
    let mut config = ClientConfig::from_env()?;
    config.timeout = Duration::from_secs(600);
    let client = OllamaClient::new(config)?;

    let response = client.pull_model(&name).await?;
    println!("{}: {}", name, response.status);

    Ok(())
}

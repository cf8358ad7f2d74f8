use ollama_api_client::OllamaClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = OllamaClient::from_env()?;

    let response = client.list_models().await?;
    for model in response.models {
        println!("{}", model.name);
    }

    Ok(())
}

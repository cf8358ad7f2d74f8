use ollama_api_client::{types::generate::GenerateRequest, OllamaClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt::init();

    let client = OllamaClient::builder().build()?;

    let request = GenerateRequest::new("llama3.2:3b", "Tell me a story about a Rust programmer.")
        .stream(false)
        .field("system", "Answer in three sentences.");

    let response = client.generate(request).await?;

    println!("Response: {}", response.response);
    if let Some(eval_count) = response.eval_count {
        println!("Tokens generated: {}", eval_count);
    }

    Ok(())
}

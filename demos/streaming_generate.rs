use std::io::Write;

use futures::StreamExt;
use ollama_api_client::{
    stream::stream_generation,
    types::generate::{GenerateRequest, GenerateStreamEvent},
    OllamaClient,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = OllamaClient::builder().build()?;

    let model = "llama3.2:3b";
    let prompt = "Tell me a story about a Rust programmer.";

    let mut stream = client
        .generate_stream(GenerateRequest::new(model, prompt))
        .await?;

    while let Some(event) = stream.next().await {
        match event {
            Ok(val) => match val {
                GenerateStreamEvent::MessageChunk(chunk) => print!("{}", chunk.response),
                GenerateStreamEvent::Error(error) => println!("\nError Chunk: {}", error),
                _ => continue,
            },
            Err(e) => eprintln!("Generate Error: {}", e),
        }
    }
    println!();

    // Same thing through the callback helper.
    stream_generation(&client, GenerateRequest::new(model, "Now in one line."), |chunk| async move {
        print!("{}", chunk.response);
        let _ = std::io::stdout().flush();
    })
    .await?;
    println!();

    Ok(())
}

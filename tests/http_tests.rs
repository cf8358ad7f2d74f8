//! Exercises the default `reqwest` transport against local HTTP servers.

use std::time::Duration;

use mockito::{Matcher, Server};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use ollama_api_client::types::generate::GenerateRequest;
use ollama_api_client::{ClientConfig, Error, OllamaClient, Result};

fn client_for(server: &Server) -> Result<OllamaClient> {
    OllamaClient::new(ClientConfig::new(
        format!("{}/api/", server.url()),
        Duration::from_secs(5),
    ))
}

#[tokio::test]
async fn test_generate_over_http() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/generate")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"model": "llama2", "prompt": "Hello"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"model":"llama2","created_at":"T","response":"Hi","done":true}"#)
        .create_async()
        .await;

    let client = client_for(&server)?;
    let response = client.generate(GenerateRequest::new("llama2", "Hello")).await?;

    assert_eq!(response.model, "llama2");
    assert_eq!(response.created_at, "T");
    assert_eq!(response.response, "Hi");
    assert!(response.done);
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_http_500_maps_to_api_error() -> Result<()> {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/generate")
        .with_status(500)
        .with_body("internal failure")
        .create_async()
        .await;

    let client = client_for(&server)?;
    let err = client
        .generate(GenerateRequest::new("llama2", "Hello"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Api { status: 500, .. }));
    Ok(())
}

/// Reads one request, headers plus a `content-length` body.
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut received = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        if let Some(end) = received.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&received[..end]).to_ascii_lowercase();
            let body_len = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|len| len.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if received.len() >= end + 4 + body_len {
                return;
            }
        }
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => received.extend_from_slice(&buf[..n]),
        }
    }
}

/// Serves one canned status line per connection and returns the base URL.
async fn serve_status_line(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            read_request(&mut socket).await;
            let reply = format!(
                "{}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                status_line
            );
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{}/api", addr)
}

#[tokio::test]
async fn test_server_reason_phrase_is_kept() -> Result<()> {
    let client = OllamaClient::builder()
        .base_url(serve_status_line("HTTP/1.1 500 Model Exploded").await)
        .build()?;

    let err = client
        .generate(GenerateRequest::new("llama2", "Hello"))
        .await
        .unwrap_err();

    match &err {
        Error::Api {
            status,
            status_text,
        } => {
            assert_eq!(*status, 500);
            assert_eq!(status_text, "Model Exploded");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
    assert_eq!(err.to_string(), "Ollama API error: 500 Model Exploded");
    Ok(())
}

#[tokio::test]
async fn test_reason_phrase_for_uncommon_status() -> Result<()> {
    let client = OllamaClient::builder()
        .base_url(serve_status_line("HTTP/1.1 599 Upstream Gone").await)
        .build()?;

    let err = client.list_models().await.unwrap_err();

    assert_eq!(err.to_string(), "Ollama API error: 599 Upstream Gone");
    Ok(())
}

#[tokio::test]
async fn test_canonical_reason_phrase_is_reported() -> Result<()> {
    let client = OllamaClient::builder()
        .base_url(serve_status_line("HTTP/1.1 404 Not Found").await)
        .build()?;

    let err = client.pull_model("missing").await.unwrap_err();

    assert!(matches!(
        err,
        Error::Api { status: 404, ref status_text } if status_text == "Not Found"
    ));
    Ok(())
}

#[tokio::test]
async fn test_list_and_pull_over_http() -> Result<()> {
    let mut server = Server::new_async().await;
    let tags = server
        .mock("GET", "/api/tags")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"models":[{"name":"llama2"},{"name":"phi"}]}"#)
        .expect(2)
        .create_async()
        .await;
    let pull = server
        .mock("POST", "/api/pull")
        .match_body(Matcher::JsonString(r#"{"name":"llama2"}"#.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"success"}"#)
        .create_async()
        .await;

    let client = client_for(&server)?;

    let first = client.list_models().await?;
    let second = client.list_models().await?;
    assert_eq!(first, second);
    assert_eq!(first.models[0].name, "llama2");
    assert_eq!(first.models[1].name, "phi");

    let pulled = client.pull_model("llama2").await?;
    assert_eq!(pulled.status, "success");

    tags.assert_async().await;
    pull.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_unresponsive_server_times_out() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let holder = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            // accept but never answer
            held.push(socket);
        }
    });

    let client = OllamaClient::builder()
        .base_url(format!("http://{}/api", addr))
        .timeout_ms(50)
        .build()?;

    let err = client.list_models().await.unwrap_err();
    assert!(matches!(err, Error::Timeout { timeout_ms: 50 }));

    holder.abort();
    Ok(())
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() -> Result<()> {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        listener.local_addr().expect("local addr")
    };

    let client = OllamaClient::builder()
        .base_url(format!("http://{}/api", addr))
        .build()?;

    let err = client.list_models().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    Ok(())
}

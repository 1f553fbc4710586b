//! Shared helpers for integration tests

#![allow(dead_code)]

use imgcrop_client::{ApiClient, ClientConfig, ImageApi};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

/// Image API pointed at `origin` with the default `/api` base path.
pub fn image_api(origin: &str) -> ImageApi {
    let config = ClientConfig::builder().origin(origin).build();
    ImageApi::new(ApiClient::new(config).expect("valid config"))
}

/// A listener that accepts connections and closes them without answering.
///
/// Returns the origin to point the client at and the number of accepted
/// connections.
pub async fn spawn_hangup_server() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            drop(socket);
        }
    });
    (format!("http://{addr}"), accepted)
}

/// Part names and file names of a `multipart/form-data` body, in order.
pub fn multipart_parts(body: &[u8]) -> Vec<(String, String)> {
    let text = String::from_utf8_lossy(body);
    text.lines()
        .filter(|line| line.to_ascii_lowercase().starts_with("content-disposition:"))
        .map(|line| (attribute(line, "name"), attribute(line, "filename")))
        .collect()
}

fn attribute(line: &str, key: &str) -> String {
    let needle = format!("; {key}=\"");
    line.find(&needle)
        .map(|start| {
            let rest = &line[start + needle.len()..];
            rest[..rest.find('"').unwrap_or(rest.len())].to_string()
        })
        .unwrap_or_default()
}

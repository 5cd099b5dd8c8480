//! Redirect requests from hosts outside the allowlist to `/custom-error`.

use std::collections::HashMap;
use std::net::SocketAddr;

use allowed_hosts::{AllowedHosts, DenialPolicy, HostSource};
use axum::{extract::Query, routing::get, Json, Router};
use serde_json::{json, Value};

async fn custom_error() -> &'static str {
    "Oops! looks like you are not allowed to access this page!"
}

async fn greet_endpoint(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let name = params.get("name").map(String::as_str).unwrap_or("Friend");
    Json(json!({ "data": format!("Hello There {name}!") }))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("allowed_hosts=debug")
        .init();

    // Match the client IP first so "93.184.215.14" means requests coming
    // from that address; the Host header is only used when the peer is unknown.
    let allowed_hosts = AllowedHosts::builder()
        .allowed_hosts(["93.184.215.14", "api.example.com"])
        .host_sources(vec![HostSource::PeerAddr, HostSource::HostHeader])
        .on_denied(DenialPolicy::redirect("/custom-error"))
        .build()?;

    let app = Router::new()
        .route("/custom-error", get(custom_error))
        .route("/api/greet", get(allowed_hosts.limit(greet_endpoint)));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
    println!("Listening on http://{}", listener.local_addr()?);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

//! Guard one route with a fixed allowlist.
//!
//! Try `curl -H 'Host: evil.com' http://127.0.0.1:5000/api` for the 403.

use std::collections::HashMap;
use std::net::SocketAddr;

use allowed_hosts::check_host;
use axum::{extract::Query, routing::get, Json, Router};
use serde_json::{json, Value};

async fn greet_endpoint(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let name = params.get("name").map(String::as_str).unwrap_or("Friend");
    Json(json!({ "greeting": format!("Hello There {name}!") }))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("allowed_hosts=debug")
        .init();

    let greet = check_host(["127.0.0.1:5000", "localhost:5000"], greet_endpoint)?;
    let app = Router::new().route("/api", get(greet));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
    println!("Listening on http://{}", listener.local_addr()?);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

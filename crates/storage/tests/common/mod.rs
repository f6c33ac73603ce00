//! Local HTTP stand-ins for the token endpoint and blob service.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use tokio::net::TcpListener;

/// Serve `app` on an ephemeral port and return its base URL with a
/// trailing `/`.
pub async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/", addr)
}

/// Query strings seen by a handler, in arrival order.
#[derive(Clone, Default)]
pub struct RequestLog(Arc<Mutex<Vec<String>>>);

impl RequestLog {
    pub fn record(&self, query: Option<String>) {
        self.0.lock().unwrap().push(query.unwrap_or_default());
    }

    pub fn queries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

//! In-process fake backend for request function tests.

use axum::Router;

use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::session::Session;

/// Serve `router` on an ephemeral local port and return its base URL.
pub(crate) async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub(crate) fn client_for(base_url: &str, session: Session) -> ApiClient {
    let config = ClientConfig {
        base_url: base_url.to_string(),
        ..ClientConfig::default()
    };
    ApiClient::new(&config, session).unwrap()
}

/// A session already holding a token.
pub(crate) fn signed_in() -> Session {
    let session = Session::in_memory();
    session.sign_in("test-token", "Тестов", None).unwrap();
    session
}

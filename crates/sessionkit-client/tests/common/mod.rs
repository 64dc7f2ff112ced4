//! Shared harness: a mock API server wired to real clients over an
//! in-memory session store.

#![allow(dead_code)]

use std::{net::TcpListener, sync::Arc, time::Duration};

use sessionkit_client::{ApiClient, ApiConfig, AuthClient, ProfileClient};
use sessionkit_core::{Session, UserProfile};
use sessionkit_store::{SessionStore, storage::MemoryStorage};
use wiremock::MockServer;

pub struct Harness {
    pub server: MockServer,
    pub store: Arc<SessionStore<MemoryStorage>>,
    pub auth: AuthClient<MemoryStorage>,
    pub profile: ProfileClient<MemoryStorage>,
}

impl Harness {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let config = ApiConfig::new(&server.uri())
            .expect("mock server uri")
            .with_timeout(Duration::from_secs(2));
        Self::with_config(server, config)
    }

    pub fn with_config(server: MockServer, config: ApiConfig) -> Self {
        let api = ApiClient::new(config).expect("http client");
        let store = Arc::new(SessionStore::new(MemoryStorage::new()));
        Self {
            auth: AuthClient::new(api.clone(), Arc::clone(&store)),
            profile: ProfileClient::new(api, Arc::clone(&store)),
            store,
            server,
        }
    }

    pub async fn sign_in_as_ann(&self) -> Session {
        let session = ann();
        self.store.set(session.clone()).await.expect("seed session");
        session
    }

    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map_or(0, |requests| requests.len())
    }
}

pub fn ann() -> Session {
    Session::new("t1", UserProfile::new("Ann", "a@x.com", true))
}

/// Some sandboxes forbid binding sockets; tests skip themselves there.
pub fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

/// URL of a local port with nothing listening on it.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

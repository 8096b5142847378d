//! HttpRegistryClient against a real registry API on a loopback socket

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use voicegw_registry_client::{
    ClientError, HttpRegistryClient, RegistryClientConfig, SessionRegistryClient,
    SessionRegistryClientExt,
};
use voicegw_registry_core::{SessionDetails, SessionRegistry, SessionState, SessionType, api};

struct TestRegistry {
    registry: Arc<SessionRegistry>,
    endpoint: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestRegistry {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let registry = Arc::new(SessionRegistry::new());
        let (tx, rx) = oneshot::channel::<()>();

        let served = registry.clone();
        tokio::spawn(async move {
            let _ = api::serve(listener, served, async {
                let _ = rx.await;
            })
            .await;
        });

        Self {
            registry,
            endpoint,
            shutdown: Some(tx),
        }
    }

    fn client(&self) -> HttpRegistryClient {
        HttpRegistryClient::new(&RegistryClientConfig {
            endpoint: self.endpoint.clone(),
            timeout_ms: 2_000,
        })
        .unwrap()
    }
}

impl Drop for TestRegistry {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

#[tokio::test]
async fn test_full_lifecycle() {
    let server = TestRegistry::start().await;
    let client = server.client();
    let call_id = "a84b4c76e66710@pc33.atlanta.com";

    let details: SessionDetails = [
        ("from".to_string(), "<sip:alice@atlanta.com>".to_string()),
        ("remote_address".to_string(), "192.0.2.4:5060".to_string()),
    ]
    .into_iter()
    .collect();

    client
        .register_session(call_id, SessionType::Sip, details.clone())
        .await
        .unwrap();
    let stored = server.registry.get(call_id).unwrap();
    assert_eq!(stored.state, SessionState::Pending);
    assert_eq!(stored.details, details);

    client
        .update_session_state(call_id, SessionState::Active)
        .await
        .unwrap();
    assert_eq!(server.registry.get(call_id).unwrap().state, SessionState::Active);

    client.deregister_session(call_id).await.unwrap();
    assert!(!server.registry.contains(call_id));
}

#[tokio::test]
async fn test_status_mapping() {
    let server = TestRegistry::start().await;
    let client = server.client();

    client
        .register_session("dup", SessionType::WebRtc, SessionDetails::new())
        .await
        .unwrap();
    assert_eq!(
        client
            .register_session("dup", SessionType::WebRtc, SessionDetails::new())
            .await
            .unwrap_err(),
        ClientError::DuplicateSession("dup".into())
    );

    assert_eq!(
        client
            .update_session_state("ghost", SessionState::Active)
            .await
            .unwrap_err(),
        ClientError::SessionNotFound("ghost".into())
    );
    assert!(client.deregister_session("ghost").await.unwrap_err().is_not_found());
    client.release_session("ghost").await.unwrap();
}

#[tokio::test]
async fn test_connection_refused_is_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpRegistryClient::new(&RegistryClientConfig {
        endpoint: format!("http://{}", addr),
        timeout_ms: 1_000,
    })
    .unwrap();

    let err = client
        .register_session("c1", SessionType::Sip, SessionDetails::new())
        .await
        .unwrap_err();
    assert!(err.is_transient(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_silent_registry_times_out() {
    // Accepts connections but never answers
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let client = HttpRegistryClient::new(&RegistryClientConfig {
        endpoint: format!("http://{}", addr),
        timeout_ms: 200,
    })
    .unwrap();

    let started = std::time::Instant::now();
    let err = client.deregister_session("c1").await.unwrap_err();
    assert!(matches!(err, ClientError::Unavailable(_)), "unexpected error: {err:?}");
    assert!(started.elapsed() < Duration::from_secs(2));
}

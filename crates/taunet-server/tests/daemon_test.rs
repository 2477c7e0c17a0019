//! End-to-end daemon tests over loopback sockets.
//!
//! A real server runs against `MemoryStorage`; a real client sends to it.
//! The directory used by the daemon maps the authorized sender to
//! `127.0.0.1`, which is also where the test connections come from, so the
//! anti-spoofing gate passes for authorized names and nothing else.

use std::time::Duration;

use taunet_client::{SenderConfig, probe, send_message};
use taunet_core::{ConversationStore, MemoryStorage, SystemEnv, User, UserTable};
use taunet_server::{Server, ServerConfig};

const KEY: &[u8] = b"test network key";

/// Bind a daemon for user "me" on an ephemeral loopback port and run it in
/// the background. Returns the recipient record a client should send to and
/// a handle on the daemon's storage.
async fn start_daemon() -> (User, MemoryStorage) {
    let storage = MemoryStorage::new();
    let directory = UserTable::from_users([User::new("alice", "127.0.0.1")]);

    let mut config = ServerConfig::new("me", KEY);
    config.bind_address = "127.0.0.1:0".to_string();

    let server = Server::bind(config, directory, storage.clone()).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());

    let mut recipient = User::new("me", "127.0.0.1");
    recipient.port = addr.port();
    (recipient, storage)
}

/// Poll the store until it holds `count` messages or two seconds pass.
async fn wait_for_messages(storage: &MemoryStorage, count: usize) -> bool {
    for _ in 0..100 {
        if storage.message_count() >= count {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn accepted_message_reaches_storage() {
    let (recipient, storage) = start_daemon().await;
    let config = SenderConfig::new("alice", KEY);

    send_message(&recipient, "hello over the wire", &config, &SystemEnv::new())
        .await
        .unwrap();

    assert!(wait_for_messages(&storage, 1).await, "message never reached storage");

    let stored = storage.messages("alice");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].sender(), "alice");
    assert_eq!(stored[0].recipient(), "me");
    assert_eq!(stored[0].body(), "hello over the wire");
}

#[tokio::test]
async fn consecutive_connections_are_handled_in_order() {
    let (recipient, storage) = start_daemon().await;
    let config = SenderConfig::new("alice", KEY);
    let env = SystemEnv::new();

    send_message(&recipient, "first", &config, &env).await.unwrap();
    send_message(&recipient, "second", &config, &env).await.unwrap();

    assert!(wait_for_messages(&storage, 2).await, "messages never reached storage");

    let stored = storage.messages("alice");
    assert_eq!(stored[0].body(), "first");
    assert_eq!(stored[1].body(), "second");
}

#[tokio::test]
async fn unknown_sender_is_dropped_before_storage() {
    let (recipient, storage) = start_daemon().await;
    let env = SystemEnv::new();

    // mallory is not in the daemon's directory.
    let intruder = SenderConfig::new("mallory", KEY);
    send_message(&recipient, "let me in", &intruder, &env).await.unwrap();

    // A subsequent authorized message proves the drop happened and the
    // daemon kept running, rather than racing an assertion on "nothing
    // stored yet".
    let authorized = SenderConfig::new("alice", KEY);
    send_message(&recipient, "legit", &authorized, &env).await.unwrap();

    assert!(wait_for_messages(&storage, 1).await);
    assert_eq!(storage.message_count(), 1);
    assert!(storage.messages("mallory").is_empty());
    assert_eq!(storage.messages("alice")[0].body(), "legit");
}

#[tokio::test]
async fn message_for_someone_else_is_dropped() {
    let (mut recipient, storage) = start_daemon().await;
    let env = SystemEnv::new();
    let config = SenderConfig::new("alice", KEY);

    // Address the message to a name that is not the daemon's identity.
    recipient.name = "somebody-else".to_string();
    send_message(&recipient, "misdelivered", &config, &env).await.unwrap();

    recipient.name = "me".to_string();
    send_message(&recipient, "delivered", &config, &env).await.unwrap();

    assert!(wait_for_messages(&storage, 1).await);
    assert_eq!(storage.message_count(), 1);
    assert_eq!(storage.messages("alice")[0].body(), "delivered");
}

#[tokio::test]
async fn wrong_key_is_dropped() {
    let (recipient, storage) = start_daemon().await;
    let env = SystemEnv::new();

    let wrong = SenderConfig::new("alice", b"some other key".as_slice());
    send_message(&recipient, "garbled", &wrong, &env).await.unwrap();

    let right = SenderConfig::new("alice", KEY);
    send_message(&recipient, "readable", &right, &env).await.unwrap();

    assert!(wait_for_messages(&storage, 1).await);
    assert_eq!(storage.message_count(), 1);
    assert_eq!(storage.messages("alice")[0].body(), "readable");
}

#[tokio::test]
async fn probe_is_not_persisted_but_reports_liveness() {
    let (recipient, storage) = start_daemon().await;
    let env = SystemEnv::new();
    let config = SenderConfig::new("alice", KEY);

    assert!(probe(&recipient, &config, &env).await, "daemon should be reachable");

    send_message(&recipient, "after the probe", &config, &env).await.unwrap();

    assert!(wait_for_messages(&storage, 1).await);
    assert_eq!(storage.message_count(), 1, "the probe must not be stored");
}

#[tokio::test]
async fn version_drift_does_not_prevent_acceptance() {
    let (recipient, storage) = start_daemon().await;
    let env = SystemEnv::new();

    let mut config = SenderConfig::new("alice", KEY);
    config.wire.version = "0.1".to_string();

    send_message(&recipient, "from the past", &config, &env).await.unwrap();

    assert!(wait_for_messages(&storage, 1).await, "drifted version must still be accepted");
    assert_eq!(storage.messages("alice")[0].version(), "0.1");
}

#[tokio::test]
async fn conversation_files_receive_accepted_messages() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConversationStore::open(dir.path()).unwrap();
    let directory = UserTable::from_users([User::new("alice", "127.0.0.1")]);

    let mut config = ServerConfig::new("me", KEY);
    config.bind_address = "127.0.0.1:0".to_string();
    let server = Server::bind(config, directory, store.clone()).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());

    let mut recipient = User::new("me", "127.0.0.1");
    recipient.port = addr.port();
    send_message(
        &recipient,
        "written to disk",
        &SenderConfig::new("alice", KEY),
        &SystemEnv::new(),
    )
    .await
    .unwrap();

    let path = store.conversation_path("alice");
    let mut content = String::new();
    for _ in 0..100 {
        if path.exists() {
            content = std::fs::read_to_string(&path).unwrap();
            if !content.is_empty() {
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert!(
        content.contains("alice: written to disk"),
        "conversation file should hold the accepted message, got: {content:?}"
    );
}

#[tokio::test]
async fn silent_connection_times_out_without_stalling_the_daemon() {
    let (recipient, storage) = start_daemon().await;

    // Connect and send nothing; use a short server-side wait by just
    // letting the connection sit until the daemon's read timeout fires.
    let silent = tokio::net::TcpStream::connect((recipient.host.as_str(), recipient.port))
        .await
        .unwrap();

    // The daemon is sequential, so the next message is only processed
    // after the silent connection is disposed of.
    let config = SenderConfig::new("alice", KEY);
    send_message(&recipient, "after the silence", &config, &SystemEnv::new())
        .await
        .unwrap();

    // Allow for the full 3-second receive timeout plus processing.
    let mut stored = false;
    for _ in 0..400 {
        if storage.message_count() >= 1 {
            stored = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    drop(silent);

    assert!(stored, "daemon stalled behind a silent connection");
    assert_eq!(storage.messages("alice")[0].body(), "after the silence");
}

//! Integration tests for gopherd
//!
//! Spin up a real server on an ephemeral port and exercise the full path:
//! TCP framing -> service dispatch -> counter -> store.

use std::collections::HashSet;
use std::net::TcpStream;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use gopherd::network::Server;
use gopherd::protocol::{read_response, write_command, Command, Response, Status};
use gopherd::store::MemoryStore;
use gopherd::{AtomicCounter, CancelToken, Config, GopherService};

// =============================================================================
// Helper Functions
// =============================================================================

struct TestServer {
    addr: String,
    shutdown: CancelToken,
    handle: JoinHandle<gopherd::Result<()>>,
}

impl TestServer {
    fn start() -> Self {
        let config = Config::builder()
            .listen_addr("127.0.0.1:0")
            .worker_threads(4)
            .retry_backoff(Duration::from_millis(1))
            .read_timeout_ms(1000)
            .build();

        let store = MemoryStore::new();
        let counter = Arc::new(AtomicCounter::create(&store, &config).unwrap());
        let service = GopherService::new(counter);

        let server = Server::bind(config, service).unwrap();
        let addr = server.local_addr().unwrap().to_string();
        let shutdown = server.shutdown_token();

        let handle = thread::spawn(move || server.run());

        Self {
            addr,
            shutdown,
            handle,
        }
    }

    fn connect(&self) -> TcpStream {
        TcpStream::connect(&self.addr).unwrap()
    }

    fn stop(self) {
        self.shutdown.cancel();
        self.handle.join().unwrap().unwrap();
    }
}

fn request(stream: &mut TcpStream, command: Command) -> Response {
    let mut writer = stream.try_clone().unwrap();
    write_command(&mut writer, &command).unwrap();
    read_response(stream).unwrap()
}

// =============================================================================
// End-to-End Tests
// =============================================================================

#[test]
fn test_ping_returns_pong() {
    let server = TestServer::start();
    let mut stream = server.connect();

    let response = request(&mut stream, Command::Ping);
    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.text(), "pong");

    drop(stream);
    server.stop();
}

#[test]
fn test_next_issues_zero_padded_labels() {
    let server = TestServer::start();
    let mut stream = server.connect();

    let first = request(&mut stream, Command::Next);
    assert_eq!(first.status, Status::Ok);
    assert_eq!(first.text(), "gopher-00");

    let second = request(&mut stream, Command::Next);
    assert_eq!(second.text(), "gopher-01");

    drop(stream);
    server.stop();
}

#[test]
fn test_current_does_not_advance() {
    let server = TestServer::start();
    let mut stream = server.connect();

    assert_eq!(request(&mut stream, Command::Next).text(), "gopher-00");

    for _ in 0..3 {
        assert_eq!(request(&mut stream, Command::Current).text(), "gopher-00");
    }

    assert_eq!(request(&mut stream, Command::Next).text(), "gopher-01");

    drop(stream);
    server.stop();
}

#[test]
fn test_concurrent_clients_get_unique_labels() {
    let server = TestServer::start();

    // Seed the counter so the benign init race is done with
    let mut seed = server.connect();
    assert_eq!(request(&mut seed, Command::Next).text(), "gopher-00");

    const CLIENTS: usize = 6;
    const REQUESTS: usize = 5;

    let mut handles = Vec::new();
    for _ in 0..CLIENTS {
        let addr = server.addr.clone();
        handles.push(thread::spawn(move || {
            let mut stream = TcpStream::connect(&addr).unwrap();
            (0..REQUESTS)
                .map(|_| {
                    let response = request(&mut stream, Command::Next);
                    assert_eq!(response.status, Status::Ok);
                    response.text()
                })
                .collect::<Vec<String>>()
        }));
    }

    let labels: Vec<String> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    let unique: HashSet<&String> = labels.iter().collect();
    assert_eq!(unique.len(), CLIENTS * REQUESTS);

    drop(seed);
    server.stop();
}

#[test]
fn test_exhausted_counter_maps_to_error_response() {
    let config = Config::builder()
        .listen_addr("127.0.0.1:0")
        .worker_threads(2)
        .max_value(1)
        .build();

    let store = MemoryStore::new();
    let counter = Arc::new(AtomicCounter::create(&store, &config).unwrap());
    let service = GopherService::new(counter);

    let server = Server::bind(config, service).unwrap();
    let addr = server.local_addr().unwrap().to_string();
    let shutdown = server.shutdown_token();
    let handle = thread::spawn(move || server.run());

    let mut stream = TcpStream::connect(&addr).unwrap();
    assert_eq!(request(&mut stream, Command::Next).text(), "gopher-00");
    assert_eq!(request(&mut stream, Command::Next).text(), "gopher-01");

    let exhausted = request(&mut stream, Command::Next);
    assert_eq!(exhausted.status, Status::Error);
    assert!(exhausted.text().contains("maximum value"));

    drop(stream);
    shutdown.cancel();
    handle.join().unwrap().unwrap();
}

#[test]
fn test_server_shutdown_stops_accepting() {
    let server = TestServer::start();
    let addr = server.addr.clone();

    server.stop();

    // After shutdown the listener is gone; connects are refused (give the
    // OS a moment to tear the socket down)
    thread::sleep(Duration::from_millis(100));
    assert!(TcpStream::connect(&addr).is_err());
}

//! Request-level tests against a local mock of the ingestion API.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use rstest::{fixture, rstest};

use crate::builder::ChannelClientBuilder;
use crate::feed::Feed;

use super::{ChannelClient, Encoding, PostError};

const STAMP: &str = "2024-01-01T00:00:00.000Z";

#[derive(Debug)]
struct CapturedRequest {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl CapturedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn status_text(code: u16) -> &'static str {
    match code {
        200 => "OK",
        202 => "Accepted",
        400 => "Bad Request",
        401 => "Unauthorized",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Reads headers up to the blank line and returns them with the content length.
fn read_headers(reader: &mut BufReader<TcpStream>) -> (Vec<(String, String)>, usize) {
    let mut headers = Vec::new();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).expect("read header");
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let (key, value) = (key.trim().to_lowercase(), value.trim().to_string());
        if key == "content-length" {
            content_length = value.parse().unwrap_or(0);
        }
        headers.push((key, value));
    }
    (headers, content_length)
}

fn read_http_request(stream: &mut TcpStream) -> CapturedRequest {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .expect("read request line");
    let mut parts = request_line.trim().split(' ');
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let (headers, content_length) = read_headers(&mut reader);
    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body).expect("read body");
    }

    CapturedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    }
}

/// Serve one request with `status` and hand the captured request back.
fn spawn_mock_server(
    listener: TcpListener,
    status: u16,
) -> (SocketAddr, mpsc::Receiver<CapturedRequest>) {
    let addr = listener.local_addr().expect("listener has address");
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let Ok((mut stream, _)) = listener.accept() else {
            return;
        };
        let captured = read_http_request(&mut stream);
        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            status,
            status_text(status)
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = tx.send(captured);
    });
    (addr, rx)
}

/// Accept one connection and hold it open without answering.
fn spawn_silent_server(listener: TcpListener) -> (SocketAddr, mpsc::Sender<()>) {
    let addr = listener.local_addr().expect("listener has address");
    let (done_tx, done_rx) = mpsc::channel::<()>();
    thread::spawn(move || {
        let Ok((_stream, _)) = listener.accept() else {
            return;
        };
        let _ = done_rx.recv_timeout(Duration::from_secs(5));
    });
    (addr, done_tx)
}

#[fixture]
fn tcp_listener() -> TcpListener {
    TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener")
}

fn build_client(addr: SocketAddr, encoding: Encoding) -> ChannelClient {
    ChannelClientBuilder::new()
        .with_channel_id("12345")
        .with_api_key("KEY")
        .with_base_url(format!("http://{addr}"))
        .with_encoding(encoding)
        .with_timeout_ms(2000)
        .build()
        .expect("build client")
}

fn sample_feed() -> Feed {
    Feed::new()
        .with_field(1, 10.5)
        .with_field(3, -2.0)
        .at(STAMP)
}

#[rstest]
fn posts_form_bulk_update(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_mock_server(tcp_listener, 200);
    let client = build_client(addr, Encoding::Form);

    assert_eq!(client.send_batch(&[sample_feed()]), Ok(()));

    let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.path, "/channels/12345/bulk_update");
    assert_eq!(
        captured.header("content-type"),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(
        captured.body,
        "write_api_key=KEY&time_format=absolute&updates=2024-01-01T00:00:00.000Z,10.5,,-2,,,,,,,,,|"
    );
}

#[rstest]
fn form_body_escapes_offset_timestamp(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_mock_server(tcp_listener, 200);
    let client = build_client(addr, Encoding::Form);
    let feed = Feed::new()
        .with_field(1, 1.0)
        .at("2024-01-01 00:00:00 +0100");

    assert!(client.post_batch(&[feed]));

    let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    let updates = captured
        .body
        .strip_prefix("write_api_key=KEY&time_format=absolute&updates=")
        .expect("form prefix");
    assert_eq!(updates, "2024-01-01%2000:00:00%20%2B0100,1,,,,,,,,,,,|");
    assert!(!captured.body.contains(' '));
}

#[rstest]
fn posts_json_bulk_update(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_mock_server(tcp_listener, 202);
    let client = build_client(addr, Encoding::Json);

    assert!(client.post_batch(&[sample_feed()]));

    let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.path, "/channels/12345/bulk_update.json");
    assert_eq!(captured.header("content-type"), Some("application/json"));
    let parsed: serde_json::Value = serde_json::from_str(&captured.body).expect("json body");
    assert_eq!(parsed["write_api_key"], "KEY");
    assert_eq!(
        parsed["updates"],
        serde_json::json!([{"created_at": STAMP, "field1": 10.5, "field3": -2}])
    );
}

#[rstest]
fn single_update_uses_get_query(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_mock_server(tcp_listener, 200);
    let client = build_client(addr, Encoding::Form);

    assert!(client.post_single(&sample_feed(), None));

    let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    assert_eq!(captured.method, "GET");
    assert_eq!(
        captured.path,
        "/update?api_key=KEY&created_at=2024-01-01T00%3A00%3A00.000Z&field1=10.5&field3=-2"
    );
    assert!(captured.body.is_empty());
}

#[rstest]
fn custom_headers_are_sent(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_mock_server(tcp_listener, 200);
    let client = ChannelClientBuilder::new()
        .with_channel_id("12345")
        .with_api_key("KEY")
        .with_base_url(format!("http://{addr}"))
        .with_header("X-Device", "pump-3")
        .build()
        .expect("build client");

    assert!(client.post_batch(&[]));

    let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    assert_eq!(captured.header("x-device"), Some("pump-3"));
    assert_eq!(
        captured.body,
        "write_api_key=KEY&time_format=absolute&updates="
    );
}

#[rstest]
#[case(400)]
#[case(401)]
#[case(500)]
fn non_2xx_status_is_reported(tcp_listener: TcpListener, #[case] status: u16) {
    let (addr, _rx) = spawn_mock_server(tcp_listener, status);
    let client = build_client(addr, Encoding::Form);

    let err = client.send_batch(&[sample_feed()]).expect_err("rejected");
    assert_eq!(err, PostError::HttpStatus(status));
    assert_eq!(err.status(), Some(status));
}

#[rstest]
fn rejected_single_update_projects_to_false(tcp_listener: TcpListener) {
    let (addr, _rx) = spawn_mock_server(tcp_listener, 400);
    let client = build_client(addr, Encoding::Json);

    assert!(!client.post_single(&sample_feed(), Some(Duration::from_millis(500))));
}

#[rstest]
fn unreachable_host_is_a_network_error(tcp_listener: TcpListener) {
    let addr = tcp_listener.local_addr().expect("listener has address");
    drop(tcp_listener);
    let client = build_client(addr, Encoding::Form);

    let err = client.send_batch(&[sample_feed()]).expect_err("unreachable");
    assert!(matches!(err, PostError::Network(_)), "unexpected error: {err}");
    assert!(!client.post_batch(&[sample_feed()]));
}

#[rstest]
fn silent_server_times_out(tcp_listener: TcpListener) {
    let (addr, done) = spawn_silent_server(tcp_listener);
    let client = build_client(addr, Encoding::Form);

    let err = client
        .send_single(&sample_feed(), Some(Duration::from_millis(200)))
        .expect_err("timeout");
    assert_eq!(err, PostError::Timeout);
    let _ = done.send(());
}

use math_canvas::error::EvaluationError;
use math_canvas::eval::{
    EvaluationRequest, EvaluationResult, EvaluationService, HttpEvaluationClient, VariableValue,
};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// One-shot HTTP server that answers the first request with `status` and
/// `body` and hands back the raw request line and body it received.
fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<(String, String)>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        let header_end = loop {
            let n = stream.read(&mut buf).unwrap();
            assert!(n > 0, "client closed before sending headers");
            raw.extend_from_slice(&buf[..n]);
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let head = String::from_utf8_lossy(&raw[..header_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        while raw.len() < header_end + content_length {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
        }
        let request_body = String::from_utf8_lossy(&raw[header_end..]).to_string();

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
        let request_line = head.lines().next().unwrap_or_default().to_string();
        (request_line, request_body)
    });
    (format!("http://{addr}"), handle)
}

fn request() -> EvaluationRequest {
    let mut vars = BTreeMap::new();
    vars.insert("x".to_string(), VariableValue::from("2"));
    EvaluationRequest {
        image: "data:image/png;base64,AAAA".into(),
        dict_of_vars: vars,
    }
}

#[test]
fn posts_snapshot_and_decodes_results_in_order() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"data":[{"expr":"y","result":3,"assign":true},{"expr":"x+3","result":"5","assign":false}]}"#,
    );
    let client = HttpEvaluationClient::new(&base, Duration::from_secs(5)).unwrap();
    let results = client.evaluate(&request()).unwrap();

    assert_eq!(
        results,
        vec![
            EvaluationResult::new("y", 3i64, true),
            EvaluationResult::new("x+3", "5", false),
        ]
    );

    let (request_line, body) = server.join().unwrap();
    assert!(request_line.starts_with("POST /calculate "), "{request_line}");
    let sent: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(sent["image"], "data:image/png;base64,AAAA");
    assert_eq!(sent["dict_of_vars"]["x"], "2");
}

#[test]
fn error_status_is_reported() {
    let (base, server) = serve_once("500 Internal Server Error", "{}");
    let client = HttpEvaluationClient::new(&base, Duration::from_secs(5)).unwrap();
    assert_eq!(client.evaluate(&request()), Err(EvaluationError::Status(500)));
    server.join().unwrap();
}

#[test]
fn malformed_body_is_a_decode_error() {
    let (base, server) = serve_once("200 OK", r#"{"results":[]}"#);
    let client = HttpEvaluationClient::new(&base, Duration::from_secs(5)).unwrap();
    assert!(matches!(
        client.evaluate(&request()),
        Err(EvaluationError::Decode(_))
    ));
    server.join().unwrap();
}

#[test]
fn unreachable_service_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client =
        HttpEvaluationClient::new(&format!("http://{addr}/"), Duration::from_secs(2)).unwrap();
    assert!(matches!(
        client.evaluate(&request()),
        Err(EvaluationError::Transport(_))
    ));
}

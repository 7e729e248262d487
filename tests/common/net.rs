use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

#[allow(dead_code)]
pub(crate) fn no_proxy_client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .no_proxy()
        .build()
        .expect("failed to build client")
}

#[allow(dead_code)]
pub(crate) struct TestResponse {
    pub status: &'static str,
    pub body: Vec<u8>,
}

/// Serves exactly `max_requests` HTTP requests on a loopback port.
/// The handler receives the start offset of a `Range: bytes=N-` header, if any.
/// Joining the handle returns the offsets seen, one per request.
#[allow(dead_code)]
pub(crate) fn serve<F>(max_requests: usize, handler: F) -> (String, JoinHandle<Vec<Option<u64>>>)
where
    F: Fn(Option<u64>) -> TestResponse + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
    let base_url = format!("http://{}", listener.local_addr().expect("no local addr"));

    let handle = thread::spawn(move || {
        let mut ranges = vec![];
        for _ in 0..max_requests {
            let (mut stream, _) = listener.accept().expect("failed to accept");
            let range = read_range_header(&stream);
            ranges.push(range);

            let response = handler(range);
            let head = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                response.status,
                response.body.len()
            );
            stream.write_all(head.as_bytes()).expect("failed to write head");
            stream.write_all(&response.body).expect("failed to write body");
            stream.flush().expect("failed to flush");
        }
        ranges
    });

    (base_url, handle)
}

fn read_range_header(stream: &TcpStream) -> Option<u64> {
    let mut reader = BufReader::new(stream);
    let mut range = None;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).expect("failed to read request") == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("range") {
                range = value
                    .trim()
                    .strip_prefix("bytes=")
                    .and_then(|v| v.trim_end_matches('-').parse().ok());
            }
        }
    }
    range
}

/// Builds a gzip-compressed tar archive in memory from (path, contents) pairs.
#[allow(dead_code)]
pub(crate) fn make_tar_gz(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (path, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, path, data.as_slice())
            .expect("failed to append entry");
    }
    builder
        .into_inner()
        .expect("failed to finish tar")
        .finish()
        .expect("failed to finish gzip")
}

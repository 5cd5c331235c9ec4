//! In-process Graph API stub for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;

/// Minimal HTTP/1.1 server answering canned bodies by request path
pub struct StubGraph {
    pub base_url: String,
    hits: Arc<Mutex<Vec<String>>>,
}

impl StubGraph {
    /// Serve `routes` (path → status, body). Unknown paths get a Graph-style 404.
    pub fn start(routes: HashMap<String, (u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");
        let hits = Arc::new(Mutex::new(Vec::new()));
        let log = hits.clone();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let Ok(read_half) = stream.try_clone() else {
                    continue;
                };
                let mut reader = BufReader::new(read_half);

                let mut request_line = String::new();
                if reader.read_line(&mut request_line).is_err() {
                    continue;
                }
                loop {
                    let mut line = String::new();
                    match reader.read_line(&mut line) {
                        Ok(0) | Err(_) => break,
                        Ok(_) if line == "\r\n" => break,
                        Ok(_) => {}
                    }
                }

                let target = request_line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("/")
                    .to_string();
                let path = target.split('?').next().unwrap_or("/").to_string();
                log.lock().unwrap().push(target);

                let (status, body) = routes.get(&path).cloned().unwrap_or_else(|| {
                    (
                        404,
                        r#"{"error":{"message":"Unsupported get request.","code":100}}"#
                            .to_string(),
                    )
                });
                let reason = if status < 400 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            hits,
        }
    }

    /// Request targets (path + query) received so far
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }
}

/// Route builder for profile + media endpoints
#[derive(Default)]
pub struct Routes(HashMap<String, (u16, String)>);

impl Routes {
    /// Account with `followers` and one post carrying `likes` + `comments`
    pub fn account(mut self, id: &str, followers: u64, likes: u64, comments: u64) -> Self {
        self.0.insert(
            format!("/{id}"),
            (
                200,
                format!(
                    r#"{{"id":"{id}","username":"user_{id}","followers_count":{followers},"media_count":7}}"#
                ),
            ),
        );
        self.0.insert(
            format!("/{id}/media"),
            (
                200,
                format!(
                    r#"{{"data":[{{"id":"m1","like_count":{likes},"comments_count":{comments}}}]}}"#
                ),
            ),
        );
        self
    }

    /// Override a single path
    pub fn raw(mut self, path: &str, status: u16, body: &str) -> Self {
        self.0.insert(path.to_string(), (status, body.to_string()));
        self
    }

    pub fn serve(self) -> StubGraph {
        StubGraph::start(self.0)
    }
}

/// Write a candidate list into `dir`
pub fn write_input(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

//! HTTP front-end for MiniDB
//!
//! A small demo web server that renders one table ("tasks") as an HTML
//! list and turns form submissions into INSERT/DELETE statements. The
//! executor is behind a mutex; the core assumes a single writer, so the
//! server serializes statement execution.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use tracing::{error, info, warn};

use crate::error::Result;
use crate::executor::Executor;
use crate::storage::Value;

/// Default server port
pub const DEFAULT_PORT: u16 = 8000;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Create a new server config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host address
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Get the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// MiniDB demo web server
pub struct Server {
    config: ServerConfig,
    executor: Arc<Mutex<Executor>>,
}

impl Server {
    /// Create a server around an executor
    pub fn new(config: ServerConfig, executor: Executor) -> Self {
        Self {
            config,
            executor: Arc::new(Mutex::new(executor)),
        }
    }

    /// Make sure the demo table exists, seeding one row on first run
    pub fn bootstrap(&self) {
        let mut exec = match self.executor.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !exec.database().has_table("tasks") {
            for stmt in [
                "CREATE TABLE tasks (id int PRIMARY KEY, content str)",
                "INSERT INTO tasks (id, content) VALUES (1, 'Welcome to MiniDB Web')",
            ] {
                let out = exec.execute_line(stmt);
                if out.starts_with("Error") || out.starts_with("Syntax Error") {
                    warn!(result = %out, "bootstrap statement failed");
                } else {
                    info!(result = %out, "bootstrap");
                }
            }
        }
    }

    /// Start the server and serve requests until the process exits
    pub fn start(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_address())?;
        info!(address = %self.config.bind_address(), "web server listening");

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let executor = self.executor.clone();
                    thread::spawn(move || {
                        if let Err(e) = handle_connection(stream, executor) {
                            warn!(error = %e, "connection error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                }
            }
        }

        Ok(())
    }
}

/// Handle one HTTP request on a fresh connection
fn handle_connection(mut stream: TcpStream, executor: Arc<Mutex<Executor>>) -> Result<()> {
    let request = read_request(&mut stream)?;

    let response = match (request.method.as_str(), request.path.as_str()) {
        ("GET", "/") => {
            let exec = match executor.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            html_response(&render_index(&exec))
        }
        ("POST", "/add") => {
            let params = parse_form(&request.body);
            if let (Some(id), Some(content)) = (params.get("id"), params.get("content")) {
                // Double quotes in the content; the statement text carries
                // the literal inline.
                let content = content.replace('\'', "''");
                let mut exec = match executor.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                let out = exec.execute_line(&format!(
                    "INSERT INTO tasks (id, content) VALUES ({}, '{}')",
                    id, content
                ));
                info!(result = %out, "add task");
            }
            redirect_response("/")
        }
        ("POST", "/delete") => {
            let params = parse_form(&request.body);
            if let Some(id) = params.get("id") {
                let mut exec = match executor.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                let out = exec.execute_line(&format!("DELETE FROM tasks WHERE id = {}", id));
                info!(result = %out, "delete task");
            }
            redirect_response("/")
        }
        _ => not_found_response(),
    };

    stream.write_all(response.as_bytes())?;
    stream.flush()?;
    Ok(())
}

/// A parsed HTTP request: method, path, and body
struct Request {
    method: String,
    path: String,
    body: String,
}

/// Read one request from the stream. Headers are only scanned for
/// Content-Length; everything else is ignored.
fn read_request(stream: &mut TcpStream) -> Result<Request> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];

    // Read until the end of the header block.
    let header_end = loop {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break buffer.len();
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_header_end(&buffer) {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or("");
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let path = parts.next().unwrap_or("/").to_string();

    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    // Body bytes already buffered, plus whatever is still on the wire.
    let body_start = (header_end + 4).min(buffer.len());
    let mut body = buffer[body_start..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    Ok(Request {
        method,
        path,
        body: String::from_utf8_lossy(&body).to_string(),
    })
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Parse an application/x-www-form-urlencoded body
fn parse_form(body: &str) -> HashMap<String, String> {
    body.split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (url_decode(k), url_decode(v)))
        .collect()
}

/// Decode percent-escapes and '+' in a form value
fn url_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).unwrap_or("");
                match u8::from_str_radix(hex, 16) {
                    Ok(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    Err(_) => {
                        out.push(bytes[i]);
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).to_string()
}

/// Escape text for embedding in HTML
fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render the index page: the tasks table plus add/delete forms
fn render_index(exec: &Executor) -> String {
    let mut rows_html = String::new();

    if let Ok(table) = exec.database().get_table("tasks") {
        for row in table.rows() {
            let id = row.get("id").cloned().unwrap_or(Value::Null);
            let content = row.get("content").cloned().unwrap_or(Value::Null);
            rows_html.push_str(&format!(
                "<tr><td>{id}</td><td>{content}</td><td>\
                 <form action='/delete' method='POST' class='inline'>\
                 <input type='hidden' name='id' value='{id}'>\
                 <button type='submit' class='delete-btn'>Delete</button>\
                 </form></td></tr>\n",
                id = html_escape(&id.to_string()),
                content = html_escape(&content.to_string()),
            ));
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>MiniDB Demo</title>
<style>
  body {{ font-family: sans-serif; max-width: 800px; margin: 2rem auto; }}
  h1 {{ text-align: center; }}
  table {{ width: 100%; border-collapse: collapse; margin-top: 20px; }}
  th, td {{ border: 1px solid #ddd; padding: 12px; text-align: left; }}
  th {{ background-color: #f2f2f2; }}
  form {{ margin-top: 30px; padding: 20px; background: #f9f9f9; border-radius: 8px; }}
  form.inline {{ display: inline; margin: 0; padding: 0; background: none; }}
  input {{ padding: 8px; margin-right: 10px; }}
  button {{ padding: 8px 16px; background-color: #007bff; color: white; border: none; border-radius: 4px; cursor: pointer; }}
  .delete-btn {{ background-color: #dc3545; }}
</style>
</head>
<body>
<h1>MiniDB To-Do List</h1>
<table>
<tr><th>ID</th><th>Task</th><th>Action</th></tr>
{rows}
</table>
<form action="/add" method="POST">
  <h3>Add New Task</h3>
  <input type="number" name="id" placeholder="ID" required>
  <input type="text" name="content" placeholder="Task Content" required>
  <button type="submit">Add Task</button>
</form>
</body>
</html>
"#,
        rows = rows_html
    )
}

fn html_response(body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )
}

fn redirect_response(location: &str) -> String {
    format!(
        "HTTP/1.1 303 See Other\r\nLocation: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        location
    )
}

fn not_found_response() -> String {
    let body = "404 Not Found";
    format!(
        "HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )
}

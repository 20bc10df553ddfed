//! Archy message server — the router behind a newline-delimited JSON
//! transport, for driving the background surface from another process.
//!
//! Protocol: one JSON object per line.
//! Request:  {"id":1, "type":"GET_ALL_TABS", "params":{...}}
//! Response: {"id":1, "result":{...}} or {"id":1, "success":false, "error":"..."}

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;

use archy::app::App;
use archy::browser::MemoryBrowser;
use archy::message_router::handle_message;
use archy::services::logger::{ArchyLogger, LogSink, RingBufferSink, RING_BUFFER_CAPACITY};

use serde_json::{json, Value};

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self {
            window_start: Instant::now(),
            request_count: 0,
            max_per_second,
        }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        let elapsed = self.window_start.elapsed();
        if elapsed.as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let ring = RingBufferSink::new(RING_BUFFER_CAPACITY);
    let sinks: Vec<Arc<dyn LogSink>> = vec![ring];
    if let Err(e) = ArchyLogger::new(sinks).install() {
        eprintln!("logger already installed: {}", e);
    }

    // Prefer ARCHY_DATA_DIR, fall back to the executable's directory.
    let db_path = if let Ok(dir) = std::env::var("ARCHY_DATA_DIR") {
        std::path::PathBuf::from(dir).join("archy.db")
    } else if let Ok(exe) = std::env::current_exe() {
        exe.parent()
            .unwrap_or(std::path::Path::new("."))
            .join("archy.db")
    } else {
        std::path::PathBuf::from("archy.db")
    };
    let mut app = App::new(db_path.to_str().unwrap_or("archy.db"))
        .expect("Failed to initialize Archy");
    app.startup();
    let app = Mutex::new(app);
    let browser = MemoryBrowser::new();

    // Signal ready
    let ready = json!({"event":"ready","version":env!("CARGO_PKG_VERSION")});
    println!("{}", ready);
    let _ = io::stdout().flush();

    // Rate limiting — cap requests per second to protect the event loop
    let mut rate_limiter = RateLimiter::new(200);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                println!("{}", json!({"id":null,"success":false,"error":format!("parse error: {}",e)}));
                let _ = io::stdout().flush();
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            println!("{}", json!({"id": id, "success": false, "error": "rate limit exceeded"}));
            let _ = io::stdout().flush();
            continue;
        }

        let msg_type = req.get("type").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let response = match handle_message(&app, &browser, msg_type, &params).await {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "success": false, "error": err}),
        };
        println!("{}", response);
        let _ = io::stdout().flush();
    }
}

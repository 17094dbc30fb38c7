//! Shared fixtures: a compiled app schema, its server, and a recording
//! loopback transport.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use jc_codec::{derivations, CallCodecs, CodecRegistry, Derivations};
use jc_compiler::{compile_source, Schema};
use jc_rpc::{SendError, Sender, Server};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

pub const APP: &str = "\
# Whole numbers.
derive int from number

type User = {
    id: int
    name: string
    nick: string | none
}

# Look up a user.
call getUser: int => User | null
call listUsers: none => [User]
call rename: { id: int, name: string } => User
call fail: none => none
";

/// Install a test subscriber once; `RUST_LOG=jc_rpc=debug` shows traces.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn schema() -> Schema {
    compile_source("app", APP).expect("app should compile")
}

pub fn registry() -> CodecRegistry {
    let derivations = Derivations::new().with("int", derivations::integer());
    CodecRegistry::from_schema(&schema(), &derivations).expect("registry should build")
}

pub fn call(registry: &CodecRegistry, name: &str) -> CallCodecs {
    registry.call(name).cloned().expect("call should exist")
}

pub fn ada() -> Value {
    json!({ "id": 1, "name": "ada" })
}

pub fn server(registry: &CodecRegistry) -> Server {
    let mut server = Server::new().with_schema(&schema());
    server
        .register(call(registry, "getUser"), |input: Option<Value>| async move {
            let user = match input {
                Some(id) if id == json!(1) => ada(),
                _ => Value::Null,
            };
            Ok::<_, String>(Some(user))
        })
        .register(call(registry, "listUsers"), |_| async {
            Ok::<_, String>(Some(json!([ada(), { "id": 2, "name": "bob", "nick": "b" }])))
        })
        .register(call(registry, "rename"), |input: Option<Value>| async move {
            Ok::<_, String>(input)
        })
        .register(call(registry, "fail"), |_| async {
            Err::<Option<Value>, String>("db offline".into())
        });
    server
}

/// Every request a loopback transport delivered.
#[derive(Clone, Default)]
pub struct Log {
    requests: Arc<Mutex<Vec<String>>>,
    sends: Arc<AtomicUsize>,
}

impl Log {
    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| serde_json::from_str(r).unwrap())
            .collect()
    }

    fn record(&self, request: &str) {
        self.sends.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.to_string());
    }
}

/// A transport that hands requests straight to `server`.
pub fn loopback(server: Server) -> (impl Sender + 'static, Log) {
    let server = Arc::new(server);
    let log = Log::default();
    let recorder = log.clone();
    let sender = move |request: String| {
        recorder.record(&request);
        let server = Arc::clone(&server);
        async move {
            server
                .handle(&request)
                .await
                .map_err(|err| SendError::new(err.to_string()))
        }
    };
    (sender, log)
}

/// A transport that always answers with `response`.
pub fn canned(response: &'static str) -> (impl Sender + 'static, Log) {
    let log = Log::default();
    let recorder = log.clone();
    let sender = move |request: String| {
        recorder.record(&request);
        async move { Ok::<_, SendError>(response.to_string()) }
    };
    (sender, log)
}

/// A transport that always fails.
pub fn offline() -> (impl Sender + 'static, Log) {
    let log = Log::default();
    let recorder = log.clone();
    let sender = move |request: String| {
        recorder.record(&request);
        async move { Err::<String, SendError>(SendError::new("offline")) }
    };
    (sender, log)
}

use async_trait::async_trait;
use common_rpc::{RpcError, SolanaClient};
use log::{Level, LevelFilter, Log, Metadata, Record};
use serde_json::{json, Value};
use solana_sdk::pubkey::Pubkey;
use std::sync::{Mutex, Once};

/// Client returning a canned `getAccountInfo` result
pub struct StubClient {
    response: Result<Value, String>,
    pub multiple_requests: Mutex<Vec<Vec<Pubkey>>>,
    /// Position in a batch request whose value comes back null
    null_index: Option<usize>,
}

impl StubClient {
    pub fn responding(response: Value) -> Self {
        Self { response: Ok(response), multiple_requests: Mutex::new(Vec::new()), null_index: None }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            multiple_requests: Mutex::new(Vec::new()),
            null_index: None,
        }
    }

    pub fn with_null_index(mut self, index: usize) -> Self {
        self.null_index = Some(index);
        self
    }

    fn result(&self) -> Result<Value, RpcError> {
        self.response.clone().map_err(RpcError::DeserializationError)
    }
}

#[async_trait]
impl SolanaClient for StubClient {
    async fn get_account_info(&self, _pubkey: &Pubkey) -> Result<Value, RpcError> {
        self.result()
    }

    /// One account per key with `lamports` set to its position in the request.
    /// The canned response is used as `context.slot`.
    async fn get_multiple_accounts(&self, pubkeys: &[Pubkey]) -> Result<Value, RpcError> {
        self.multiple_requests.lock().unwrap().push(pubkeys.to_vec());
        let slot = self.result()?;
        let values: Vec<Value> = (0..pubkeys.len())
            .map(|i| if self.null_index == Some(i) { Value::Null } else { json!({ "lamports": i }) })
            .collect();
        Ok(json!({ "context": { "slot": slot }, "value": values }))
    }
}

struct CaptureLogger;

static LINES: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());
static LOGGER: CaptureLogger = CaptureLogger;
static INIT: Once = Once::new();

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        LINES.lock().unwrap().push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Trace);
    });
}

/// Captured log lines mentioning `needle`; tests pass a unique account key
pub fn captured_logs(needle: &str) -> Vec<(Level, String)> {
    LINES.lock().unwrap().iter().filter(|(_, line)| line.contains(needle)).cloned().collect()
}

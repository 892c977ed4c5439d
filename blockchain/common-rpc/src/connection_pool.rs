use lazy_static::lazy_static;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// A thread-safe pool of RPC clients for reuse
///
/// This pool maintains a set of RPC clients for different endpoints,
/// allowing them to be reused instead of creating new connections for each request.
pub struct RpcConnectionPool {
    clients: Mutex<VecDeque<(String, Arc<RpcClient>)>>,
    max_clients_per_endpoint: usize,
    timeout: Duration,
    commitment: CommitmentConfig,
}

impl RpcConnectionPool {
    /// Create a new connection pool with the specified maximum clients per endpoint and timeout
    pub fn new(
        max_clients_per_endpoint: usize,
        timeout: Duration,
        commitment: CommitmentConfig,
    ) -> Self {
        Self { clients: Mutex::new(VecDeque::new()), max_clients_per_endpoint, timeout, commitment }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<(String, Arc<RpcClient>)>> {
        self.clients.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get a client for the specified endpoint
    ///
    /// If a client for this endpoint is idle in the pool, it is handed out.
    /// Otherwise, a new client is created.
    pub fn get_client(&self, endpoint: &str) -> Arc<RpcClient> {
        let mut clients = self.lock();

        if let Some(i) = clients.iter().position(|(url, _)| url == endpoint) {
            if let Some((_, client)) = clients.remove(i) {
                return client;
            }
        }

        Arc::new(RpcClient::new_with_timeout_and_commitment(
            endpoint.to_string(),
            self.timeout,
            self.commitment,
        ))
    }

    /// Return a client to the pool for future reuse
    ///
    /// The client is only kept if we're under the maximum limit for this endpoint.
    pub fn return_client(&self, endpoint: &str, client: Arc<RpcClient>) {
        let mut clients = self.lock();

        let count = clients.iter().filter(|(url, _)| url == endpoint).count();
        if count < self.max_clients_per_endpoint {
            clients.push_back((endpoint.to_string(), client));
        }
    }

    /// Number of idle clients held for `endpoint`
    pub fn idle_clients(&self, endpoint: &str) -> usize {
        self.lock().iter().filter(|(url, _)| url == endpoint).count()
    }
}

lazy_static! {
    pub static ref CONNECTION_POOL: RpcConnectionPool = RpcConnectionPool::new(
        5, // 5 clients per endpoint
        Duration::from_secs(30),
        CommitmentConfig::confirmed(),
    );
}

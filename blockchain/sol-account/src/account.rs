use crate::response::{parse_account_info, parse_account_value, AccountInfo};
use crate::AccountError;
use common::AccountSnapshot;
use common_rpc::SolanaClient;
use log::{debug, error, warn};
use serde_json::Value;
use solana_sdk::pubkey::Pubkey;
use std::fmt;
use std::sync::Arc;

/// Last known on-chain state of a single account.
///
/// `slot`, `lamports` and `data` are `None` until the first successful
/// update and are always replaced together. Updates take `&mut self`, so
/// concurrent refreshes of one account have to be serialized by the owner.
pub struct SolanaAccount {
    key: Pubkey,
    client: Arc<dyn SolanaClient>,
    slot: Option<u64>,
    lamports: Option<u64>,
    data: Option<Vec<u8>>,
}

impl SolanaAccount {
    pub fn new(key: Pubkey, client: Arc<dyn SolanaClient>) -> Self {
        Self { key, client, slot: None, lamports: None, data: None }
    }

    pub fn key(&self) -> &Pubkey {
        &self.key
    }

    pub fn slot(&self) -> Option<u64> {
        self.slot
    }

    pub fn lamports(&self) -> Option<u64> {
        self.lamports
    }

    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Fetch the account with `getAccountInfo` and apply the response.
    ///
    /// Failures are logged and leave the previous state in place.
    pub async fn update(&mut self) {
        if let Err(e) = self.try_update().await {
            log_update_error(&self.key, &e);
        }
    }

    /// Like [`SolanaAccount::update`], but hands the failure back instead of logging it
    pub async fn try_update(&mut self) -> Result<(), AccountError> {
        let response = self.client.get_account_info(&self.key).await?;
        let info = parse_account_info(&self.key, &response)?;
        self.apply(info);
        Ok(())
    }

    /// Apply an already fetched account `value`, e.g. from a subscription notification
    pub fn update_with_rpc_response(&mut self, slot: u64, value: &Value) {
        if let Err(e) = self.try_update_with_rpc_response(slot, value) {
            log_update_error(&self.key, &e);
        }
    }

    pub fn try_update_with_rpc_response(
        &mut self,
        slot: u64,
        value: &Value,
    ) -> Result<(), AccountError> {
        let info = parse_account_value(&self.key, slot, value)?;
        self.apply(info);
        Ok(())
    }

    /// Current state as a serializable snapshot, once the account has been loaded
    pub fn snapshot(&self) -> Option<AccountSnapshot> {
        match (self.slot, self.lamports) {
            (Some(slot), Some(lamports)) => Some(AccountSnapshot::new(
                self.key.to_string(),
                slot,
                lamports,
                self.data.as_ref().map_or(0, Vec::len),
            )),
            _ => None,
        }
    }

    fn apply(&mut self, info: AccountInfo) {
        debug!("account {} at slot {}: {} lamports", self.key, info.slot, info.lamports);
        self.slot = Some(info.slot);
        self.lamports = Some(info.lamports);
        self.data = info.data;
    }
}

impl fmt::Display for SolanaAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Account ({})", self.key)
    }
}

impl fmt::Debug for SolanaAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolanaAccount")
            .field("key", &self.key)
            .field("slot", &self.slot)
            .field("lamports", &self.lamports)
            .field("data_len", &self.data.as_ref().map(Vec::len))
            .finish()
    }
}

/// Non-existent accounts are a warning, everything else an error
pub(crate) fn log_update_error(key: &Pubkey, err: &AccountError) {
    if err.is_not_found() {
        warn!("{}", err);
    } else {
        error!("error while updating account {}: {}", key, err);
    }
}

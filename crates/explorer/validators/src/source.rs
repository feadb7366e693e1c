//! Where validator data comes from.

use crate::{ValidatorError, ValidatorResult};
use alloy_primitives::{Address, U256};
use alloy_provider::{Provider, RootProvider};
use async_trait::async_trait;
use chainscope_client::ChainClientError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{borrow::Cow, fmt::Debug, str::FromStr};
use tokio::sync::OnceCell;

/// Node calls backing the validator set.
#[async_trait]
pub trait ValidatorSource: Debug + Send + Sync {
    /// Returns the raw validator list entries.
    async fn list_validators(&self) -> ValidatorResult<Vec<Value>>;

    /// Returns the raw detail record of one validator.
    async fn validator_detail(&self, address: Address) -> ValidatorResult<Value>;

    /// Returns the minimum validator stake, if the node reports one.
    async fn validator_min_stake(&self) -> ValidatorResult<Option<U256>>;
}

/// JSON-RPC method names used by the [`RpcValidatorSource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ValidatorMethods {
    /// Candidate list methods, tried in order until one is served.
    pub list: Vec<String>,
    /// The per-validator detail method, called with the address as sole parameter.
    pub detail: String,
    /// The minimum stake method, if the node has one.
    pub min_stake: Option<String>,
}

impl Default for ValidatorMethods {
    fn default() -> Self {
        Self {
            list: vec![
                "gen_getValidators".to_string(),
                "gen_getActiveValidators".to_string(),
                "gen_getValidatorSet".to_string(),
            ],
            detail: "gen_getValidatorInfo".to_string(),
            min_stake: Some("gen_getValidatorMinStake".to_string()),
        }
    }
}

/// A [`ValidatorSource`] issuing raw JSON-RPC calls through an alloy provider.
#[derive(Debug)]
pub struct RpcValidatorSource {
    provider: RootProvider,
    methods: ValidatorMethods,
    list_method: OnceCell<String>,
}

impl RpcValidatorSource {
    /// Creates a new [`RpcValidatorSource`].
    pub fn new(provider: RootProvider, methods: ValidatorMethods) -> Self {
        Self { provider, methods, list_method: OnceCell::new() }
    }

    async fn call<P>(&self, method: &str, params: P) -> Result<Value, ChainClientError>
    where
        P: Serialize + Clone + Debug + Send + Sync + Unpin,
    {
        trace!(target: "validators", method, "Calling validator method");
        Ok(self.provider.raw_request::<P, Value>(Cow::Owned(method.to_string()), params).await?)
    }
}

#[async_trait]
impl ValidatorSource for RpcValidatorSource {
    async fn list_validators(&self) -> ValidatorResult<Vec<Value>> {
        let list = if let Some(method) = self.list_method.get() {
            self.call(method, ()).await?
        } else {
            let mut resolved = None;
            for method in &self.methods.list {
                match self.call(method, ()).await {
                    Ok(list) => {
                        debug!(target: "validators", method, "Resolved validator list method");
                        let _ = self.list_method.set(method.clone());
                        resolved = Some(list);
                        break;
                    }
                    Err(ChainClientError::MethodNotFound(_)) => {
                        debug!(target: "validators", method, "Validator list method not served");
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            resolved.ok_or_else(|| ValidatorError::NoListMethod(self.methods.list.join(", ")))?
        };

        Ok(match list {
            Value::Array(entries) => entries,
            Value::Object(mut map) => match map.remove("validators") {
                Some(Value::Array(entries)) => entries,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        })
    }

    async fn validator_detail(&self, address: Address) -> ValidatorResult<Value> {
        Ok(self.call(&self.methods.detail, [address]).await?)
    }

    async fn validator_min_stake(&self) -> ValidatorResult<Option<U256>> {
        let Some(method) = &self.methods.min_stake else {
            return Ok(None);
        };
        let value = self.call(method, ()).await?;
        Ok(match value {
            Value::String(s) => U256::from_str(s.trim()).ok(),
            Value::Number(n) => n.as_u64().map(U256::from),
            _ => None,
        })
    }
}

//! Token metadata lookups.

use crate::ApiResult;
use alloy_primitives::{Address, address};
use alloy_sol_types::{SolCall, sol};
use chainscope_client::ChainClient;
use chainscope_primitives::parse_address;
use serde::Serialize;

sol! {
    interface IERC20Metadata {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
    }
}

/// A token whose metadata is served without touching the chain.
#[derive(Debug, Clone, Copy)]
struct KnownToken {
    address: Address,
    name: &'static str,
    symbol: &'static str,
    decimals: u8,
}

/// Pseudo-tokens that do not implement the metadata views.
const KNOWN_TOKENS: &[KnownToken] = &[KnownToken {
    address: address!("0x000000000000000000000000000000000000800a"),
    name: "Ether",
    symbol: "ETH",
    decimals: 18,
}];

/// Where the metadata came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenSource {
    /// The built-in table of pseudo-tokens.
    Known,
    /// The ERC-20 metadata views of the contract.
    Erc20,
}

/// The metadata of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenMetadata {
    /// The token contract.
    pub address: Address,
    /// The token name.
    pub name: Option<String>,
    /// The token symbol.
    pub symbol: Option<String>,
    /// The number of decimals of the token.
    pub decimals: Option<u8>,
    /// Where the metadata came from.
    pub source: TokenSource,
}

impl From<&KnownToken> for TokenMetadata {
    fn from(token: &KnownToken) -> Self {
        Self {
            address: token.address,
            name: Some(token.name.to_string()),
            symbol: Some(token.symbol.to_string()),
            decimals: Some(token.decimals),
            source: TokenSource::Known,
        }
    }
}

/// Looks up the metadata of the token at `address`.
///
/// Each of the three views fails independently to `None`, so a contract that is not a token
/// still yields a response.
pub async fn token_metadata<C: ChainClient>(client: &C, address: &str) -> ApiResult<TokenMetadata> {
    let address = parse_address(address)?;
    if let Some(known) = KNOWN_TOKENS.iter().find(|t| t.address == address) {
        return Ok(known.into());
    }

    let (name, symbol, decimals) = futures::join!(
        call_view(client, address, IERC20Metadata::nameCall {}),
        call_view(client, address, IERC20Metadata::symbolCall {}),
        call_view(client, address, IERC20Metadata::decimalsCall {}),
    );
    Ok(TokenMetadata { address, name, symbol, decimals, source: TokenSource::Erc20 })
}

async fn call_view<C: ChainClient, T: SolCall>(
    client: &C,
    address: Address,
    call: T,
) -> Option<T::Return> {
    let output = match client.read_contract_view(address, call.abi_encode().into()).await {
        Ok(output) => output,
        Err(err) => {
            debug!(target: "api", %address, call = T::SIGNATURE, %err, "Token view failed");
            return None;
        }
    };
    T::abi_decode_returns(&output).ok()
}

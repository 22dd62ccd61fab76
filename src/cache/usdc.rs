// USDC on-chain receive-events cache, backed by public RPC endpoints.
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::cache::single_flight::Cached;
use crate::models::error::ApiError;
use crate::net::{FetchLimits, OutboundClient};

const SUCCESS_TTL: Duration = Duration::from_secs(20);
const FAILURE_TTL: Duration = Duration::from_secs(20);

const RPC_ENDPOINTS: &[&str] = &[
    "https://mainnet.base.org",
    "https://base.publicnode.com",
];

const ERC20_TRANSFER_TOPIC: &str =
    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdcTransfer {
    pub tx_hash: String,
    pub from: String,
    pub amount_usdc: f64,
    pub block_number: u64,
    pub timestamp: Option<i64>,
}

pub struct UsdcReceiveCache {
    cached: Cached<Vec<UsdcTransfer>>,
    usdc_contract: String,
    receiver_wallet: String,
}

impl UsdcReceiveCache {
    pub fn new(usdc_contract: String, receiver_wallet: String) -> Self {
        Self {
            cached: Cached::new(SUCCESS_TTL, FAILURE_TTL),
            usdc_contract,
            receiver_wallet,
        }
    }

    pub async fn get(&self, client: &OutboundClient, limit: usize) -> Result<Vec<UsdcTransfer>, ApiError> {
        let contract = self.usdc_contract.clone();
        let wallet = self.receiver_wallet.clone();
        let transfers = self
            .cached
            .get_or_fetch(|| fetch_transfers(client, contract, wallet))
            .await?;

        Ok(transfers.into_iter().take(limit).collect())
    }
}

async fn rpc_call(client: &OutboundClient, method: &str, params: serde_json::Value) -> Result<serde_json::Value, ApiError> {
    #[derive(Deserialize)]
    struct RpcResponse {
        result: Option<serde_json::Value>,
        error: Option<serde_json::Value>,
    }

    let body = json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params });

    let mut last_err = ApiError::UpstreamUnavailable("no rpc endpoint configured".into());
    for endpoint in RPC_ENDPOINTS {
        let result = client
            .fetch(
                reqwest::Method::POST,
                endpoint,
                vec![("content-type", "application/json".into())],
                Some(serde_json::to_vec(&body).unwrap_or_default()),
                FetchLimits::default(),
            )
            .await;

        match result {
            Ok(response) => match serde_json::from_slice::<RpcResponse>(&response.body) {
                Ok(parsed) if parsed.error.is_none() => {
                    return parsed.result.ok_or_else(|| {
                        ApiError::UpstreamUnavailable("rpc returned no result".into())
                    });
                }
                _ => {
                    last_err = ApiError::UpstreamUnavailable(format!("rpc call to {endpoint} failed"));
                }
            },
            Err(e) => last_err = e,
        }
    }
    Err(last_err)
}

async fn fetch_transfers(
    client: &OutboundClient,
    usdc_contract: String,
    receiver_wallet: String,
) -> Result<Vec<UsdcTransfer>, ApiError> {
    let latest_hex = rpc_call(client, "eth_blockNumber", json!([])).await?;
    let latest = latest_hex
        .as_str()
        .and_then(|s| u64::from_str_radix(s.trim_start_matches("0x"), 16).ok())
        .ok_or_else(|| ApiError::UpstreamUnavailable("malformed eth_blockNumber response".into()))?;

    let from_block = latest.saturating_sub(5_000);
    let recipient_topic = format!("0x{:0>64}", receiver_wallet.trim_start_matches("0x").to_lowercase());

    let logs = rpc_call(
        client,
        "eth_getLogs",
        json!([{
            "fromBlock": format!("0x{:x}", from_block),
            "toBlock": "latest",
            "address": usdc_contract,
            "topics": [ERC20_TRANSFER_TOPIC, serde_json::Value::Null, recipient_topic],
        }]),
    )
    .await?;

    let mut transfers = Vec::new();
    if let Some(entries) = logs.as_array() {
        for entry in entries {
            let Some(tx_hash) = entry.get("transactionHash").and_then(|v| v.as_str()) else { continue };
            let Some(data) = entry.get("data").and_then(|v| v.as_str()) else { continue };
            let Some(topics) = entry.get("topics").and_then(|v| v.as_array()) else { continue };
            let Some(from_topic) = topics.get(1).and_then(|v| v.as_str()) else { continue };
            let Some(block_hex) = entry.get("blockNumber").and_then(|v| v.as_str()) else { continue };

            let amount_raw = u128::from_str_radix(data.trim_start_matches("0x"), 16).unwrap_or(0);
            let amount_usdc = amount_raw as f64 / 1_000_000.0; // USDC has 6 decimals

            transfers.push(UsdcTransfer {
                tx_hash: tx_hash.to_string(),
                from: format!("0x{}", &from_topic[from_topic.len().saturating_sub(40)..]),
                amount_usdc,
                block_number: u64::from_str_radix(block_hex.trim_start_matches("0x"), 16).unwrap_or(0),
                timestamp: None,
            });
        }
    }

    transfers.sort_by(|a, b| b.block_number.cmp(&a.block_number));
    Ok(transfers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_amount_from_32_byte_hex_word() {
        let data = "0x00000000000000000000000000000000000000000000000000000005f5e100";
        let raw = u128::from_str_radix(data.trim_start_matches("0x"), 16).unwrap();
        assert_eq!(raw as f64 / 1_000_000.0, 100.0);
    }
}

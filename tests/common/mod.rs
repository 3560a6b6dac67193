//! Shared fixtures for integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy::primitives::{address, hex, keccak256, Address, B256, U256};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

use archetype_tooling::blockchain::{BlockchainError, BlockchainResult, Confirmation};
use archetype_tooling::probe::allowlist::{leaf, verify};
use archetype_tooling::probe::{AllowListAuth, MintTarget};

/// Well-known development key (first local node account).
#[allow(dead_code)]
pub const DEV_PRIVATE_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Environment map from literal pairs.
#[allow(dead_code)]
pub fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Mint terms for one allow-list key.
#[derive(Debug, Clone, Copy)]
pub struct Invite {
    pub price: U256,
    pub limit: u64,
}

#[derive(Default)]
struct MockState {
    balances: HashMap<Address, U256>,
    minted: HashMap<(B256, Address), u64>,
    block: u64,
}

/// In-memory stand-in for a deployed Archetype collection.
///
/// Every mint is sent by `minter`. Non-zero keys are Merkle roots and the
/// proof is checked against the minter's leaf.
pub struct MockArchetype {
    minter: Address,
    invites: HashMap<B256, Invite>,
    state: Mutex<MockState>,
}

#[allow(dead_code)]
impl MockArchetype {
    pub fn new(minter: Address) -> Self {
        Self {
            minter,
            invites: HashMap::new(),
            state: Mutex::new(MockState {
                block: 100,
                ..MockState::default()
            }),
        }
    }

    pub fn with_balance(self, owner: Address, amount: u64) -> Self {
        self.state
            .lock()
            .unwrap()
            .balances
            .insert(owner, U256::from(amount));
        self
    }

    pub fn with_invite(mut self, key: B256, invite: Invite) -> Self {
        self.invites.insert(key, invite);
        self
    }

    pub fn balance(&self, owner: Address) -> U256 {
        self.state
            .lock()
            .unwrap()
            .balances
            .get(&owner)
            .copied()
            .unwrap_or_default()
    }
}

fn revert(name: &str) -> BlockchainError {
    BlockchainError::ExternalContractCall(format!("reverted with {}", name))
}

#[async_trait]
impl MintTarget for MockArchetype {
    async fn mint(
        &self,
        auth: &AllowListAuth,
        quantity: U256,
        value: U256,
    ) -> BlockchainResult<Confirmation> {
        let invite = self
            .invites
            .get(&auth.key)
            .ok_or_else(|| revert("MintNotYetStarted"))?;

        if !auth.is_public() && !verify(&auth.proof, auth.key, leaf(self.minter)) {
            return Err(revert("WalletUnauthorizedToMint"));
        }

        let cost = invite.price * quantity;
        if value < cost {
            return Err(revert("InsufficientEthSent"));
        }
        if value > cost {
            return Err(revert("ExcessiveEthSent"));
        }

        let quantity: u64 = quantity.to();
        let mut state = self.state.lock().unwrap();
        let minted = state.minted.entry((auth.key, self.minter)).or_default();
        if *minted + quantity > invite.limit {
            return Err(revert("NumberOfMintsExceeded"));
        }
        *minted += quantity;

        *state.balances.entry(self.minter).or_default() += U256::from(quantity);
        state.block += 1;
        Ok(Confirmation {
            tx_hash: keccak256(state.block.to_be_bytes()),
            block_number: Some(state.block),
            gas_used: 120_000,
        })
    }

    async fn balance_of(&self, owner: Address) -> BlockchainResult<U256> {
        Ok(self.balance(owner))
    }
}

/// First unlocked account of a local development node.
#[allow(dead_code)]
pub const NODE_ACCOUNT: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// Hash the mock node assigns to every sent transaction.
#[allow(dead_code)]
pub const SENT_TX_HASH: &str =
    "0x2222222222222222222222222222222222222222222222222222222222222222";

/// Block the mock node mines every transaction into.
#[allow(dead_code)]
pub const MINED_BLOCK: u64 = 0x11;

/// JSON-RPC requests seen by a mock node, in arrival order.
pub type RpcLog = Arc<Mutex<Vec<Value>>>;

/// Start a programmable JSON-RPC node on a free local port.
///
/// `handler` maps a method and its params to a result, or to a JSON-RPC
/// error object.
#[allow(dead_code)]
pub async fn start_rpc_node<F>(handler: F) -> (Url, RpcLog)
where
    F: Fn(&str, &Value) -> Result<Value, Value> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
    let log: RpcLog = Arc::new(Mutex::new(Vec::new()));
    let handler = Arc::new(handler);

    let seen = log.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let handler = handler.clone();
                    let seen = seen.clone();
                    tokio::spawn(async move {
                        let Some(body) = read_request_body(&mut socket).await else {
                            return;
                        };
                        let reply = match body {
                            Value::Array(batch) => Value::Array(
                                batch
                                    .iter()
                                    .map(|request| answer(request, handler.as_ref(), &seen))
                                    .collect(),
                            ),
                            request => answer(&request, handler.as_ref(), &seen),
                        };
                        let reply = reply.to_string();
                        let response_str = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                             Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                            reply.len(),
                            reply
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (url, log)
}

async fn read_request_body(socket: &mut TcpStream) -> Option<Value> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
        let length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let body = end + 4;
        if buf.len() >= body + length {
            return serde_json::from_slice(&buf[body..body + length]).ok();
        }
    }
}

fn answer<F>(request: &Value, handler: &F, log: &RpcLog) -> Value
where
    F: Fn(&str, &Value) -> Result<Value, Value>,
{
    log.lock().unwrap().push(request.clone());
    let method = request["method"].as_str().unwrap_or_default();
    match handler(method, &request["params"]) {
        Ok(result) => json!({"jsonrpc": "2.0", "id": request["id"], "result": result}),
        Err(error) => json!({"jsonrpc": "2.0", "id": request["id"], "error": error}),
    }
}

/// Answers of a healthy development node on chain 31337 with 1 gwei gas.
#[allow(dead_code)]
pub fn dev_node_reply(method: &str) -> Result<Value, Value> {
    match method {
        "eth_chainId" => Ok(json!("0x7a69")),
        "eth_blockNumber" => Ok(json!(format!("{:#x}", MINED_BLOCK))),
        "eth_gasPrice" | "eth_maxPriorityFeePerGas" => Ok(json!("0x3b9aca00")),
        "eth_getTransactionCount" => Ok(json!("0x0")),
        "eth_estimateGas" => Ok(json!("0x1d4c0")),
        "eth_feeHistory" => Ok(json!({
            "oldestBlock": "0x10",
            "baseFeePerGas": ["0x3b9aca00", "0x3b9aca00"],
            "gasUsedRatio": [0.5],
            "reward": [["0x3b9aca00"]],
        })),
        "eth_sendTransaction" => Ok(json!(SENT_TX_HASH)),
        "eth_getTransactionReceipt" => Ok(mined_receipt(true)),
        "eth_newBlockFilter" => Ok(json!("0x1")),
        "eth_getFilterChanges" => Ok(json!([])),
        "eth_getBlockByNumber" => Ok(Value::Null),
        other => Err(json!({"code": -32601, "message": format!("method {} not found", other)})),
    }
}

/// Receipt of the sent transaction, mined in `MINED_BLOCK`.
#[allow(dead_code)]
pub fn mined_receipt(success: bool) -> Value {
    let status = if success { "0x1" } else { "0x0" };
    json!({
        "transactionHash": SENT_TX_HASH,
        "transactionIndex": "0x0",
        "blockHash": format!("0x{}", "33".repeat(32)),
        "blockNumber": format!("{:#x}", MINED_BLOCK),
        "from": NODE_ACCOUNT,
        "to": format!("0x{}", "44".repeat(20)),
        "cumulativeGasUsed": "0x1d4c0",
        "gasUsed": "0x1d4c0",
        "effectiveGasPrice": "0x77359400",
        "contractAddress": null,
        "logs": [],
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "status": status,
        "type": "0x0",
    })
}

/// JSON-RPC error of a call that reverted with `data`.
#[allow(dead_code)]
pub fn revert_error(data: &str) -> Value {
    json!({"code": 3, "message": "execution reverted", "data": data})
}

/// Hex selector of a function or error signature.
#[allow(dead_code)]
pub fn selector(signature: &str) -> String {
    format!("0x{}", hex::encode(&keccak256(signature)[..4]))
}

/// ABI word holding `value`.
#[allow(dead_code)]
pub fn uint_word(value: u64) -> String {
    format!("0x{:064x}", value)
}

/// Calldata of the transaction in `eth_call` or `eth_sendTransaction` params.
#[allow(dead_code)]
pub fn calldata(params: &Value) -> &str {
    let tx = &params[0];
    tx["input"]
        .as_str()
        .or_else(|| tx["data"].as_str())
        .unwrap_or_default()
}

/// Params of every logged call to `method`.
#[allow(dead_code)]
pub fn calls(log: &RpcLog, method: &str) -> Vec<Value> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|request| request["method"] == method)
        .map(|request| request["params"].clone())
        .collect()
}

#![allow(dead_code)]

use async_trait::async_trait;
use licita_core::gateway::{events, methods};
use licita_core::{
    Address, BlockRef, BlockTag, LedgerContext, LedgerError, LedgerGateway, LedgerResult,
    RawEvent, Receipt, SyncConfig,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

pub const ZERO: &str = "0x0000000000000000000000000000000000000000";
pub const OWNER: &str = "0x00000000000000000000000000000000000000aA";
pub const ALICE: &str = "0x1111111111111111111111111111111111111111";
pub const BOB: &str = "0x2222222222222222222222222222222222222222";
pub const CAROL: &str = "0x3333333333333333333333333333333333333333";

pub const GENESIS_TIMESTAMP: u64 = 1_700_000_000;
pub const BLOCK_SECONDS: u64 = 12;
pub const FAR_DEADLINE: u64 = 4_000_000_000;

pub fn addr(text: &str) -> Address {
    Address::parse(text).expect("test address should parse")
}

#[derive(Clone)]
struct StoredTender {
    creator: String,
    title: String,
    description: String,
    budget: u128,
    deadline: u64,
    active: bool,
    winner: String,
    status: u8,
}

impl StoredTender {
    fn deleted() -> Self {
        Self {
            creator: ZERO.to_string(),
            title: String::new(),
            description: String::new(),
            budget: 0,
            deadline: 0,
            active: false,
            winner: ZERO.to_string(),
            status: 0,
        }
    }

    fn to_value(&self, id: u64) -> Value {
        json!({
            "id": id,
            "creator": self.creator,
            "title": self.title,
            "description": self.description,
            "budget": self.budget.to_string(),
            "deadline": self.deadline,
            "active": self.active,
            "winner": self.winner,
            "status": self.status,
        })
    }
}

#[derive(Clone)]
struct StoredProposal {
    id: u64,
    tender_id: u64,
    proponent: String,
    description: String,
    amount: u128,
    selected: bool,
    status: u8,
}

impl StoredProposal {
    fn to_value(&self) -> Value {
        json!({
            "id": self.id,
            "tenderId": self.tender_id,
            "proponent": self.proponent,
            "description": self.description,
            "proposedAmount": self.amount.to_string(),
            "selected": self.selected,
            "status": self.status,
        })
    }
}

#[derive(Default)]
struct LedgerState {
    /// Slot `i` holds tender id `i + 1`.
    tenders: Vec<StoredTender>,
    proposals: HashMap<u64, Vec<StoredProposal>>,
    next_proposal_id: u64,
    /// Enumeration list; removal leaves stale entries behind.
    admin_list: Vec<String>,
    admin_flags: HashMap<String, bool>,
    events: Vec<(String, RawEvent)>,
    block: u64,
    block_timestamps: HashMap<u64, u64>,
    tx_blocks: HashMap<String, u64>,
    calls: HashMap<String, usize>,
    failing_calls: HashMap<String, LedgerError>,
    failing_streams: HashMap<String, LedgerError>,
    failing_timestamps: Option<LedgerError>,
    null_tender_slots: bool,
    revert_tender_slots: bool,
}

impl LedgerState {
    fn count(&mut self, key: impl Into<String>) {
        *self.calls.entry(key.into()).or_default() += 1;
    }

    fn is_admin(&self, address: &str) -> bool {
        self.admin_flags
            .get(&address.to_ascii_lowercase())
            .copied()
            .unwrap_or(false)
    }

    fn mine(&mut self) -> (String, u64) {
        self.block += 1;
        let block = self.block;
        let hash = format!("0x{block:064x}");
        self.block_timestamps
            .entry(block)
            .or_insert(GENESIS_TIMESTAMP + block * BLOCK_SECONDS);
        self.tx_blocks.insert(hash.clone(), block);
        (hash, block)
    }

    fn emit(&mut self, event: &str, return_values: Value) -> Receipt {
        let (transaction_hash, block_number) = self.mine();
        self.events.push((
            event.to_string(),
            RawEvent {
                return_values,
                transaction_hash: transaction_hash.clone(),
                block_number,
            },
        ));
        Receipt {
            transaction_hash,
            block_number,
        }
    }

    fn tender_mut(&mut self, id: u64) -> LedgerResult<&mut StoredTender> {
        let index = id
            .checked_sub(1)
            .ok_or_else(|| LedgerError::Rejected("tender id 0".into()))?;
        let tender = self
            .tenders
            .get_mut(index as usize)
            .ok_or_else(|| LedgerError::Rejected(format!("tender {id} does not exist")))?;
        if tender.creator == ZERO {
            return Err(LedgerError::Rejected(format!("tender {id} was deleted")));
        }
        Ok(tender)
    }
}

/// In-memory ledger that enforces the same rules as the procurement contract.
#[derive(Default)]
pub struct FakeLedger {
    state: Mutex<LedgerState>,
}

impl FakeLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Ledger whose deployer `OWNER` is the first admin.
    pub fn with_owner() -> Arc<Self> {
        let ledger = Self::new();
        ledger.seed_admin(OWNER);
        ledger
    }

    pub fn context(self: &Arc<Self>, config: SyncConfig) -> LedgerContext {
        let gateway: Arc<dyn LedgerGateway> = self.clone();
        LedgerContext::connected(gateway, config)
    }

    pub fn default_context(self: &Arc<Self>) -> LedgerContext {
        self.context(SyncConfig::default())
    }

    pub fn seed_admin(&self, address: &str) {
        let mut state = self.state.lock();
        state.admin_list.push(address.to_string());
        state.admin_flags.insert(address.to_ascii_lowercase(), true);
    }

    /// Adds an enumeration entry without granting the flag.
    pub fn seed_stale_admin_entry(&self, address: &str) {
        self.state.lock().admin_list.push(address.to_string());
    }

    /// Creates a tender as `creator` and emits its creation event.
    pub fn seed_tender(&self, creator: &str, title: &str, budget: u128, deadline: u64) -> u64 {
        let mut state = self.state.lock();
        state.tenders.push(StoredTender {
            creator: creator.to_string(),
            title: title.to_string(),
            description: format!("{title} description"),
            budget,
            deadline,
            active: true,
            winner: ZERO.to_string(),
            status: 1,
        });
        let id = state.tenders.len() as u64;
        state.emit(
            events::TENDER_CREATED,
            json!({ "id": id, "creator": creator, "title": title }),
        );
        id
    }

    pub fn seed_proposal(&self, tender_id: u64, proponent: &str, amount: u128) -> u64 {
        let mut state = self.state.lock();
        state.next_proposal_id += 1;
        let id = state.next_proposal_id;
        state
            .proposals
            .entry(tender_id)
            .or_default()
            .push(StoredProposal {
                id,
                tender_id,
                proponent: proponent.to_string(),
                description: format!("offer {id}"),
                amount,
                selected: false,
                status: 0,
            });
        state.emit(
            events::PROPOSAL_SUBMITTED,
            json!({ "tenderId": tender_id, "proposalId": id, "proponent": proponent }),
        );
        id
    }

    /// Appends a raw event in a fresh block and returns that block.
    pub fn emit(&self, event: &str, return_values: Value) -> u64 {
        self.state.lock().emit(event, return_values).block_number
    }

    pub fn set_block_timestamp(&self, block: u64, timestamp: u64) {
        self.state.lock().block_timestamps.insert(block, timestamp);
    }

    pub fn fail_call(&self, method: &str, error: LedgerError) {
        self.state
            .lock()
            .failing_calls
            .insert(method.to_string(), error);
    }

    pub fn fail_stream(&self, event: &str, error: LedgerError) {
        self.state
            .lock()
            .failing_streams
            .insert(event.to_string(), error);
    }

    pub fn fail_timestamps(&self, error: LedgerError) {
        self.state.lock().failing_timestamps = Some(error);
    }

    /// Makes out-of-range tender reads return `null` instead of an error.
    pub fn use_null_for_missing_tenders(&self) {
        self.state.lock().null_tender_slots = true;
    }

    /// Makes out-of-range tender reads revert instead of reporting range.
    pub fn revert_missing_tenders(&self) {
        self.state.lock().revert_tender_slots = true;
    }

    pub fn heal(&self) {
        let mut state = self.state.lock();
        state.failing_calls.clear();
        state.failing_streams.clear();
        state.failing_timestamps = None;
    }

    /// Number of gateway invocations recorded under `key`.
    ///
    /// Keys are method names, `event:<Name>` for streams and `timestamp`.
    pub fn calls(&self, key: &str) -> usize {
        self.state.lock().calls.get(key).copied().unwrap_or(0)
    }

    pub fn submissions(&self) -> usize {
        let state = self.state.lock();
        [
            methods::CREATE_TENDER,
            methods::DELETE_TENDER,
            methods::SUBMIT_PROPOSAL,
            methods::DELETE_PROPOSAL,
            methods::SELECT_WINNER,
            methods::ADD_ADMIN,
            methods::REMOVE_ADMIN,
        ]
        .iter()
        .map(|method| state.calls.get(*method).copied().unwrap_or(0))
        .sum()
    }

    pub fn reset_calls(&self) {
        self.state.lock().calls.clear();
    }

    fn apply_submit(
        state: &mut LedgerState,
        method: &str,
        args: &[Value],
        sender: &str,
    ) -> LedgerResult<Receipt> {
        match method {
            methods::CREATE_TENDER => {
                let title = arg_str(args, 0)?;
                let description = arg_str(args, 1)?;
                let budget = arg_u128(args, 2)?;
                let deadline = arg_u64(args, 3)?;
                state.tenders.push(StoredTender {
                    creator: sender.to_string(),
                    title: title.clone(),
                    description,
                    budget,
                    deadline,
                    active: true,
                    winner: ZERO.to_string(),
                    status: 1,
                });
                let id = state.tenders.len() as u64;
                Ok(state.emit(
                    events::TENDER_CREATED,
                    json!({ "id": id, "creator": sender, "title": title }),
                ))
            }
            methods::DELETE_TENDER => {
                let id = arg_u64(args, 0)?;
                let sender_is_admin = state.is_admin(sender);
                let tender = state.tender_mut(id)?;
                if !tender.creator.eq_ignore_ascii_case(sender) && !sender_is_admin {
                    return Err(LedgerError::Rejected("only creator or admin".into()));
                }
                *tender = StoredTender::deleted();
                state.proposals.remove(&id);
                Ok(state.emit(
                    events::TENDER_DELETED,
                    json!({ "id": id, "deletedBy": sender }),
                ))
            }
            methods::SUBMIT_PROPOSAL => {
                let tender_id = arg_u64(args, 0)?;
                let description = arg_str(args, 1)?;
                let amount = arg_u128(args, 2)?;
                let budget = state.tender_mut(tender_id)?.budget;
                if amount > budget {
                    return Err(LedgerError::Rejected("amount exceeds budget".into()));
                }
                state.next_proposal_id += 1;
                let id = state.next_proposal_id;
                state
                    .proposals
                    .entry(tender_id)
                    .or_default()
                    .push(StoredProposal {
                        id,
                        tender_id,
                        proponent: sender.to_string(),
                        description,
                        amount,
                        selected: false,
                        status: 0,
                    });
                Ok(state.emit(
                    events::PROPOSAL_SUBMITTED,
                    json!({ "tenderId": tender_id, "proposalId": id, "proponent": sender }),
                ))
            }
            methods::DELETE_PROPOSAL => {
                let tender_id = arg_u64(args, 0)?;
                let proposal_id = arg_u64(args, 1)?;
                let sender_is_admin = state.is_admin(sender);
                let list = state.proposals.entry(tender_id).or_default();
                let index = list
                    .iter()
                    .position(|proposal| proposal.id == proposal_id)
                    .ok_or_else(|| LedgerError::Rejected("no such proposal".into()))?;
                if !list[index].proponent.eq_ignore_ascii_case(sender) && !sender_is_admin {
                    return Err(LedgerError::Rejected("only proponent or admin".into()));
                }
                list.remove(index);
                let (transaction_hash, block_number) = state.mine();
                Ok(Receipt {
                    transaction_hash,
                    block_number,
                })
            }
            methods::SELECT_WINNER => {
                let tender_id = arg_u64(args, 0)?;
                let proposal_id = arg_u64(args, 1)?;
                if !state.is_admin(sender) {
                    return Err(LedgerError::Rejected("only admin".into()));
                }
                let proponent = {
                    let proposal = state
                        .proposals
                        .get_mut(&tender_id)
                        .and_then(|list| list.iter_mut().find(|p| p.id == proposal_id))
                        .ok_or_else(|| LedgerError::Rejected("no such proposal".into()))?;
                    proposal.selected = true;
                    proposal.status = 1;
                    proposal.proponent.clone()
                };
                let tender = state.tender_mut(tender_id)?;
                tender.winner = proponent.clone();
                tender.active = false;
                tender.status = 3;
                Ok(state.emit(
                    events::WINNER_SELECTED,
                    json!({ "tenderId": tender_id, "winner": proponent }),
                ))
            }
            methods::ADD_ADMIN => {
                let target = arg_str(args, 0)?;
                if !state.is_admin(sender) {
                    return Err(LedgerError::Rejected("only admin".into()));
                }
                if state.is_admin(&target) {
                    return Err(LedgerError::Rejected("already admin".into()));
                }
                state.admin_list.push(target.clone());
                state.admin_flags.insert(target.to_ascii_lowercase(), true);
                let (transaction_hash, block_number) = state.mine();
                Ok(Receipt {
                    transaction_hash,
                    block_number,
                })
            }
            methods::REMOVE_ADMIN => {
                let target = arg_str(args, 0)?;
                if !state.is_admin(sender) {
                    return Err(LedgerError::Rejected("only admin".into()));
                }
                state.admin_flags.insert(target.to_ascii_lowercase(), false);
                let (transaction_hash, block_number) = state.mine();
                Ok(Receipt {
                    transaction_hash,
                    block_number,
                })
            }
            other => Err(LedgerError::Rejected(format!("unknown method {other}"))),
        }
    }
}

#[async_trait]
impl LedgerGateway for FakeLedger {
    async fn call(&self, method: &str, args: &[Value]) -> LedgerResult<Value> {
        let mut state = self.state.lock();
        state.count(method);
        if let Some(error) = state.failing_calls.get(method) {
            return Err(error.clone());
        }

        match method {
            methods::TENDERS => {
                let id = arg_u64(args, 0)?;
                let slot = id
                    .checked_sub(1)
                    .and_then(|index| state.tenders.get(index as usize));
                match slot {
                    Some(tender) => Ok(tender.to_value(id)),
                    None if state.null_tender_slots => Ok(Value::Null),
                    None if state.revert_tender_slots => {
                        Err(LedgerError::Rejected("execution reverted".to_string()))
                    }
                    None => Err(LedgerError::OutOfRange(format!("invalid opcode at slot {id}"))),
                }
            }
            methods::PROPOSALS => {
                let tender_id = arg_u64(args, 0)?;
                let list = state
                    .proposals
                    .get(&tender_id)
                    .map(|list| list.iter().map(StoredProposal::to_value).collect())
                    .unwrap_or_default();
                Ok(Value::Array(list))
            }
            methods::ADMIN_FLAG => {
                let address = arg_str(args, 0)?;
                Ok(Value::Bool(state.is_admin(&address)))
            }
            methods::ADMIN_LIST => Ok(json!(state.admin_list)),
            other => Err(LedgerError::Rejected(format!("unknown view {other}"))),
        }
    }

    async fn submit(
        &self,
        method: &str,
        args: &[Value],
        sender: &Address,
    ) -> LedgerResult<Receipt> {
        let mut state = self.state.lock();
        state.count(method);
        if let Some(error) = state.failing_calls.get(method) {
            return Err(error.clone());
        }
        Self::apply_submit(&mut state, method, args, sender.as_str())
    }

    async fn subscribe_events(
        &self,
        event: &str,
        from: BlockTag,
        to: BlockTag,
    ) -> LedgerResult<Vec<RawEvent>> {
        let mut state = self.state.lock();
        state.count(format!("event:{event}"));
        if let Some(error) = state.failing_streams.get(event) {
            return Err(error.clone());
        }
        let from = from.number().unwrap_or(0);
        let to = to.number().unwrap_or(u64::MAX);
        Ok(state
            .events
            .iter()
            .filter(|(name, raw)| {
                name == event && raw.block_number >= from && raw.block_number <= to
            })
            .map(|(_, raw)| raw.clone())
            .collect())
    }

    async fn resolve_block_timestamp(&self, block: &BlockRef) -> LedgerResult<u64> {
        let mut state = self.state.lock();
        state.count("timestamp");
        if let Some(error) = &state.failing_timestamps {
            return Err(error.clone());
        }
        let number = match block {
            BlockRef::Number(number) => *number,
            BlockRef::Transaction(hash) => *state
                .tx_blocks
                .get(hash)
                .ok_or_else(|| LedgerError::Rejected(format!("unknown tx {hash}")))?,
        };
        state
            .block_timestamps
            .get(&number)
            .copied()
            .ok_or_else(|| LedgerError::Rejected(format!("unknown block {number}")))
    }
}

fn arg(args: &[Value], index: usize) -> LedgerResult<&Value> {
    args.get(index)
        .ok_or_else(|| LedgerError::Transport(format!("missing argument {index}")))
}

fn arg_str(args: &[Value], index: usize) -> LedgerResult<String> {
    arg(args, index)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| LedgerError::Transport(format!("argument {index} is not text")))
}

fn arg_u64(args: &[Value], index: usize) -> LedgerResult<u64> {
    let value = arg(args, index)?;
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|text| text.parse().ok()))
        .ok_or_else(|| LedgerError::Transport(format!("argument {index} is not a u64")))
}

fn arg_u128(args: &[Value], index: usize) -> LedgerResult<u128> {
    let value = arg(args, index)?;
    value
        .as_str()
        .and_then(|text| text.parse().ok())
        .or_else(|| value.as_u64().map(u128::from))
        .ok_or_else(|| LedgerError::Transport(format!("argument {index} is not an amount")))
}

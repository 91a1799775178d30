use std::path::Path;

use serde::{Deserialize, Serialize};
use sorcha_core::types::{RegisterId, TransactionPriority, TxId};
use sorcha_core::{Docket, PendingRegistration, Register, Result, SorchaError, Transaction};
use tracing::debug;

use crate::repository::RegisterRepository;

/// Persistent register store backed by sled.
///
/// Named trees:
///   registers   — registerId bytes       → bincode(Register)
///   transactions — txId bytes            → bincode(Transaction)
///   tx_index    — registerId ++ seq(be8) → txId bytes (recorded order)
///   dockets     — registerId ++ id(be8)  → bincode(Docket)
///   mempool     — registerId ++ admittedAt(be8) ++ txId → bincode(MempoolEntry)
///   pending     — registerId bytes       → bincode(PendingRegistration)
///   meta        — utf8 key bytes         → raw bytes (sequence counters)
pub struct SledRepository {
    _db: sled::Db,
    registers: sled::Tree,
    transactions: sled::Tree,
    tx_index: sled::Tree,
    dockets: sled::Tree,
    mempool: sled::Tree,
    pending: sled::Tree,
    meta: sled::Tree,
}

#[derive(Serialize, Deserialize)]
struct MempoolEntry {
    transaction: Transaction,
    priority: TransactionPriority,
    admitted_at: i64,
}

fn storage_err(e: impl std::fmt::Display) -> SorchaError {
    SorchaError::Storage(e.to_string())
}

fn ser_err(e: impl std::fmt::Display) -> SorchaError {
    SorchaError::Serialization(e.to_string())
}

impl SledRepository {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path).map_err(storage_err)?;
        let registers = db.open_tree("registers").map_err(storage_err)?;
        let transactions = db.open_tree("transactions").map_err(storage_err)?;
        let tx_index = db.open_tree("tx_index").map_err(storage_err)?;
        let dockets = db.open_tree("dockets").map_err(storage_err)?;
        let mempool = db.open_tree("mempool").map_err(storage_err)?;
        let pending = db.open_tree("pending").map_err(storage_err)?;
        let meta = db.open_tree("meta").map_err(storage_err)?;
        Ok(Self {
            _db: db,
            registers,
            transactions,
            tx_index,
            dockets,
            mempool,
            pending,
            meta,
        })
    }

    fn next_tx_seq(&self, register_id: &RegisterId) -> Result<u64> {
        let key = format!("txseq:{}", register_id.to_hex());
        let current = self
            .meta
            .get(key.as_bytes())
            .map_err(storage_err)?
            .map(|b| {
                let mut arr = [0u8; 8];
                arr.copy_from_slice(&b[..8]);
                u64::from_be_bytes(arr)
            })
            .unwrap_or(0);
        self.meta
            .insert(key.as_bytes(), &(current + 1).to_be_bytes())
            .map_err(storage_err)?;
        Ok(current)
    }
}

impl RegisterRepository for SledRepository {
    fn create_register(&self, register: &Register) -> Result<()> {
        self.update_register(register)
    }

    fn update_register(&self, register: &Register) -> Result<()> {
        let bytes = bincode::serialize(register).map_err(ser_err)?;
        self.registers
            .insert(register.id.as_bytes(), bytes)
            .map_err(storage_err)?;
        Ok(())
    }

    fn get_register(&self, id: &RegisterId) -> Result<Option<Register>> {
        match self.registers.get(id.as_bytes()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes).map_err(ser_err)?)),
            None => Ok(None),
        }
    }

    fn list_register_ids(&self) -> Result<Vec<RegisterId>> {
        self.registers
            .iter()
            .keys()
            .map(|key| {
                let key = key.map_err(storage_err)?;
                let bytes: [u8; 16] = key.as_ref().try_into().map_err(|_| {
                    SorchaError::Storage("corrupt register key length".into())
                })?;
                Ok(RegisterId::from_bytes(bytes))
            })
            .collect()
    }

    fn insert_docket(&self, docket: &Docket) -> Result<()> {
        let key = docket_key(&docket.register_id, docket.id);
        let bytes = bincode::serialize(docket).map_err(ser_err)?;
        self.dockets.insert(key, bytes).map_err(storage_err)?;
        Ok(())
    }

    fn get_dockets(&self, register_id: &RegisterId) -> Result<Vec<Docket>> {
        let mut out = Vec::new();
        for item in self.dockets.scan_prefix(register_id.as_bytes()) {
            let (_, bytes) = item.map_err(storage_err)?;
            out.push(bincode::deserialize::<Docket>(&bytes).map_err(ser_err)?);
        }
        out.sort_by_key(|d| d.id);
        Ok(out)
    }

    fn get_latest_docket(&self, register_id: &RegisterId) -> Result<Option<Docket>> {
        Ok(self.get_dockets(register_id)?.into_iter().last())
    }

    fn insert_transaction(&self, tx: &Transaction) -> Result<()> {
        let bytes = bincode::serialize(tx).map_err(ser_err)?;
        self.transactions
            .insert(tx.tx_id.as_bytes(), bytes)
            .map_err(storage_err)?;

        let seq = self.next_tx_seq(&tx.register_id)?;
        let index_key = tx_index_key(&tx.register_id, seq);
        self.tx_index
            .insert(index_key, tx.tx_id.as_bytes().as_slice())
            .map_err(storage_err)?;
        Ok(())
    }

    fn get_transaction(&self, tx_id: &TxId) -> Result<Option<Transaction>> {
        match self.transactions.get(tx_id.as_bytes()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes).map_err(ser_err)?)),
            None => Ok(None),
        }
    }

    fn get_transactions(&self, register_id: &RegisterId) -> Result<Vec<Transaction>> {
        let mut out = Vec::new();
        for item in self.tx_index.scan_prefix(register_id.as_bytes()) {
            let (_, tx_id_bytes) = item.map_err(storage_err)?;
            let arr: [u8; 32] = tx_id_bytes
                .as_ref()
                .try_into()
                .map_err(|_| SorchaError::Storage("corrupt tx_index entry".into()))?;
            let tx_id = TxId::from_bytes(arr);
            if let Some(tx) = self.get_transaction(&tx_id)? {
                out.push(tx);
            }
        }
        Ok(out)
    }

    fn get_transactions_in_docket(&self, docket: &Docket) -> Result<Vec<Transaction>> {
        docket
            .transaction_ids
            .iter()
            .map(|id| {
                self.get_transaction(id)?
                    .ok_or_else(|| SorchaError::TransactionNotFound(id.to_hex()))
            })
            .collect()
    }

    fn commit_sealed_docket(
        &self,
        docket: &Docket,
        transactions: &[Transaction],
        register: &Register,
    ) -> Result<()> {
        for tx in transactions {
            if self.transactions.get(tx.tx_id.as_bytes()).map_err(storage_err)?.is_none() {
                self.insert_transaction(tx)?;
            }
        }
        self.insert_docket(docket)?;
        self.update_register(register)?;
        debug!(register_id = %register.id, docket_id = docket.id, "docket committed");
        Ok(())
    }

    fn admit_to_mempool(
        &self,
        tx: &Transaction,
        priority: TransactionPriority,
        admitted_at: i64,
    ) -> Result<()> {
        let entry = MempoolEntry {
            transaction: tx.clone(),
            priority,
            admitted_at,
        };
        let key = mempool_key(&tx.register_id, admitted_at, &tx.tx_id);
        let bytes = bincode::serialize(&entry).map_err(ser_err)?;
        self.mempool.insert(key, bytes).map_err(storage_err)?;
        Ok(())
    }

    fn pop_mempool(
        &self,
        register_id: &RegisterId,
    ) -> Result<Vec<(Transaction, TransactionPriority, i64)>> {
        let mut out = Vec::new();
        let mut keys_to_remove = Vec::new();
        for item in self.mempool.scan_prefix(register_id.as_bytes()) {
            let (key, bytes) = item.map_err(storage_err)?;
            let entry: MempoolEntry = bincode::deserialize(&bytes).map_err(ser_err)?;
            out.push((entry.transaction, entry.priority, entry.admitted_at));
            keys_to_remove.push(key.to_vec());
        }
        for key in keys_to_remove {
            self.mempool.remove(key).map_err(storage_err)?;
        }
        Ok(out)
    }

    fn mempool_contains(&self, register_id: &RegisterId, tx_id: &TxId) -> Result<bool> {
        for item in self.mempool.scan_prefix(register_id.as_bytes()) {
            let (key, _) = item.map_err(storage_err)?;
            if key.ends_with(tx_id.as_bytes()) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn put_pending(&self, pending: &PendingRegistration) -> Result<()> {
        let bytes = bincode::serialize(pending).map_err(ser_err)?;
        self.pending
            .insert(pending.register_id.as_bytes(), bytes)
            .map_err(storage_err)?;
        Ok(())
    }

    fn take_pending(
        &self,
        register_id: &RegisterId,
        nonce: &str,
    ) -> Result<Option<PendingRegistration>> {
        let existing = self.pending.get(register_id.as_bytes()).map_err(storage_err)?;
        let Some(bytes) = existing else {
            return Ok(None);
        };
        let pending: PendingRegistration = bincode::deserialize(&bytes).map_err(ser_err)?;
        if pending.nonce != nonce {
            return Ok(None);
        }
        // Compare-and-remove: only remove if still present with this exact value.
        let removed = self
            .pending
            .compare_and_swap(register_id.as_bytes(), Some(bytes.as_ref()), None::<&[u8]>)
            .map_err(storage_err)?;
        match removed {
            Ok(()) => Ok(Some(pending)),
            Err(_) => Ok(None),
        }
    }

    fn sweep_expired_pending(&self, now: i64) -> Result<u64> {
        let mut removed = 0u64;
        let mut expired_keys = Vec::new();
        for item in self.pending.iter() {
            let (key, bytes) = item.map_err(storage_err)?;
            let pending: PendingRegistration = bincode::deserialize(&bytes).map_err(ser_err)?;
            if pending.is_expired(now) {
                expired_keys.push(key.to_vec());
            }
        }
        for key in expired_keys {
            self.pending.remove(key).map_err(storage_err)?;
            removed += 1;
        }
        Ok(removed)
    }
}

fn docket_key(register_id: &RegisterId, id: u64) -> Vec<u8> {
    let mut key = register_id.as_bytes().to_vec();
    key.extend_from_slice(&id.to_be_bytes());
    key
}

fn tx_index_key(register_id: &RegisterId, seq: u64) -> Vec<u8> {
    let mut key = register_id.as_bytes().to_vec();
    key.extend_from_slice(&seq.to_be_bytes());
    key
}

fn mempool_key(register_id: &RegisterId, admitted_at: i64, tx_id: &TxId) -> Vec<u8> {
    let mut key = register_id.as_bytes().to_vec();
    key.extend_from_slice(&admitted_at.to_be_bytes());
    key.extend_from_slice(tx_id.as_bytes());
    key
}

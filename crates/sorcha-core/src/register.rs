use serde::{Deserialize, Serialize};

use crate::types::RegisterId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegisterStatus {
    Initializing,
    Online,
    Quiesced,
    Deleted,
}

/// The control-plane entity tracking a register's lifecycle and height.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Register {
    pub id: RegisterId,
    pub name: String,
    pub tenant_id: String,
    pub height: u64,
    pub status: RegisterStatus,
    pub created_at: i64,
    pub advertise: bool,
}

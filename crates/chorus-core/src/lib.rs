//! Chorus Group Sessions
//!
//! Sender-key ratchet state machine: one forward-secure symmetric chain per
//! sender device, distributed once to every group member and then advanced
//! on every message.
//!
//! # Architecture
//!
//! ```text
//! GroupSessions ──► GroupSessionBuilder   create / rotate / process
//!       │      └──► GroupCipher           encrypt / decrypt
//!       │                  │
//!       ▼                  ▼
//! SenderKeyLocks    SenderKeyStore ──► SenderKeyRecord ──► SenderKeyState
//! (per-name shard)  (memory, redb)     (≤ max_states)      (one epoch)
//! ```
//!
//! Every builder and cipher operation holds the name's lock across one
//! load → mutate → store sequence. The mutation happens on a copy; the store
//! only sees the result of a fully successful operation.
//!
//! # Errors
//!
//! [`GroupError`] separates the benign case (a duplicate, to be dropped
//! silently) from messages that are unusable (invalid or legacy) and from
//! missing sessions and storage failures.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod builder;
pub mod cipher;
pub mod config;
pub mod env;
pub mod error;
pub mod locks;
pub mod name;
pub mod record;
pub mod sessions;
pub mod state;
pub mod storage;
pub mod system_env;

pub use builder::GroupSessionBuilder;
pub use cipher::GroupCipher;
pub use config::GroupConfig;
pub use env::Environment;
pub use error::GroupError;
pub use locks::SenderKeyLocks;
pub use name::{ProtocolAddress, SenderKeyName};
pub use record::SenderKeyRecord;
pub use sessions::GroupSessions;
pub use state::{EpochSigningKey, SenderKeyState};
pub use storage::{ChaoticStore, MemoryStore, RedbStore, SenderKeyStore, StorageError};
pub use system_env::SystemEnv;

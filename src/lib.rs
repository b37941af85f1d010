//! Valise Core Library
//!
//! End-to-end encrypted cross-device synchronization of small per-user
//! state: redeemable access tickets and UI preferences. The server stores
//! opaque blobs only; it never sees plaintext content, item identity, or
//! item type. All cryptographic operations use the audited `ring` crate.

pub mod api;
pub mod crypto;
pub mod mapper;
pub mod merge;
pub mod payload;
pub mod remote;
pub mod storage;

pub use api::{
    CallbackHandler, Credentials, EventDispatcher, EventHandler, InProcessLock, LockGuard,
    LockProvider, RefreshError, SyncConfig, SyncController, SyncOutcome, SyncReport,
    SyncScheduler, TokenRefresher, TriggerAction, ValiseError, ValiseEvent, ValiseResult,
};
pub use crypto::{
    decrypt_payload, derive_item_key, derive_opaque_id, encrypt_payload, EncryptedBlob,
    EncryptionError, MasterKey, SymmetricKey,
};
pub use mapper::{BlobMapper, SYNCED_PREFERENCE_KEYS, TICKETS_ACTIVE, TICKETS_ARCHIVE};
pub use merge::{merge_active, merge_archive, merge_preference, TicketState};
pub use payload::{Payload, Ticket};
pub use remote::{Blob, MockRemoteStore, PullResponse, PushResponse, RemoteError, RemoteStore};
pub use storage::{MemorySettings, SettingsError, SettingsStore, SqliteSettings};

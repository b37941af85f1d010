// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod derive;
pub mod encryption;
pub mod kdf;

pub use derive::{derive_item_key, derive_opaque_id, MasterKey};
pub use encryption::{
    decrypt_payload, encrypt_payload, EncryptedBlob, EncryptionError, SymmetricKey,
};
pub use kdf::HKDF;

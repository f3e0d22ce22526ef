//! Identifier type for documents in the document store.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serializer};

use crate::Error;

/// The store-assigned identifier of a transaction.
///
/// On the wire this is the 24 character hex string form of a 12 byte ObjectId.
pub type TransactionId = ObjectId;

/// Parse a transaction ID taken from a request path.
///
/// # Errors
/// Returns [Error::InvalidId] if `id` is not a 24 character hex string.
pub fn parse_transaction_id(id: &str) -> Result<TransactionId, Error> {
    ObjectId::parse_str(id).map_err(|_| Error::InvalidId)
}

/// Serde helpers that write an ObjectId as its plain hex string.
///
/// The default `Serialize` impl produces extended JSON (`{"$oid": ...}`),
/// which is not what API clients expect.
pub(crate) mod hex_string {
    use super::*;

    pub fn serialize<S: Serializer>(id: &ObjectId, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&id.to_hex())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ObjectId, D::Error> {
        let text = String::deserialize(deserializer)?;
        ObjectId::parse_str(&text).map_err(serde::de::Error::custom)
    }
}

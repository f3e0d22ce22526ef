//! The MongoDB backend of the document store.

use mongodb::{
    Client, Collection,
    bson::{DateTime, doc, oid::ObjectId},
    options::ClientOptions,
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, Time};

use crate::{
    Error,
    database_id::TransactionId,
    store::{CONNECT_TIMEOUT, StoreError, run_with_deadline},
    transaction::{Transaction, TransactionFields, TransactionType},
};

/// A connected MongoDB client and the database selected on it.
#[derive(Debug, Clone)]
pub struct MongoDatabase {
    client: Client,
    database: mongodb::Database,
}

impl MongoDatabase {
    pub(super) async fn connect(uri: &str, database_name: &str) -> Result<Self, Error> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|error| Error::Connection(format!("invalid MongoDB URI: {error}")))?;
        options.server_selection_timeout = Some(CONNECT_TIMEOUT);
        options.connect_timeout = Some(CONNECT_TIMEOUT);

        let client = Client::with_options(options)
            .map_err(|error| Error::Connection(format!("could not create client: {error}")))?;
        let database = client.database(database_name);

        run_with_deadline(CONNECT_TIMEOUT, async {
            database.run_command(doc! { "ping": 1 }).await?;
            Ok::<_, StoreError>(())
        })
        .await
        .map_err(|error| Error::Connection(format!("liveness check failed: {error}")))?;

        Ok(Self { client, database })
    }

    pub(super) fn collection(&self, name: &str) -> Collection<TransactionDocument> {
        self.database.collection(name)
    }

    pub(super) async fn close(self) {
        self.client.shutdown().await;
    }
}

/// A transaction as it is laid out in a MongoDB document.
///
/// Dates are held as BSON datetimes, the calendar date at midnight UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDocument {
    /// Left empty on insert so that the store assigns it.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// The amount of money spent or earned.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// A free-text category.
    pub category: String,
    /// Either "income" or "expense".
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Midnight UTC on the day the transaction happened.
    pub date: DateTime,
    /// When the document was inserted.
    pub created_at: DateTime,
    /// When the document was last modified.
    pub updated_at: DateTime,
}

impl TransactionDocument {
    fn new(fields: &TransactionFields, now: OffsetDateTime) -> Self {
        let now = to_bson_datetime(now);

        Self {
            id: None,
            amount: fields.amount,
            description: fields.description.clone(),
            category: fields.category.clone(),
            kind: fields.kind,
            date: date_to_bson(fields.date),
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<TransactionDocument> for Transaction {
    type Error = StoreError;

    fn try_from(document: TransactionDocument) -> Result<Self, Self::Error> {
        let id = document
            .id
            .ok_or_else(|| StoreError::Decode("document has no _id".to_owned()))?;

        Ok(Transaction {
            id,
            amount: document.amount,
            description: document.description,
            category: document.category,
            kind: document.kind,
            date: from_bson_datetime(document.date)?.date(),
            created_at: from_bson_datetime(document.created_at)?,
            updated_at: from_bson_datetime(document.updated_at)?,
        })
    }
}

fn to_bson_datetime(datetime: OffsetDateTime) -> DateTime {
    let millis = datetime.unix_timestamp_nanos() / 1_000_000;

    DateTime::from_millis(millis as i64)
}

fn date_to_bson(date: Date) -> DateTime {
    to_bson_datetime(date.with_time(Time::MIDNIGHT).assume_utc())
}

fn from_bson_datetime(datetime: DateTime) -> Result<OffsetDateTime, StoreError> {
    let nanos = i128::from(datetime.timestamp_millis()) * 1_000_000;

    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .map_err(|error| StoreError::Decode(format!("datetime out of range: {error}")))
}

pub(super) async fn find_all_by_date_desc(
    collection: &Collection<TransactionDocument>,
) -> Result<Vec<Transaction>, StoreError> {
    let mut cursor = collection.find(doc! {}).sort(doc! { "date": -1 }).await?;
    let mut transactions = Vec::new();

    while cursor.advance().await? {
        let document = cursor
            .deserialize_current()
            .map_err(|error| StoreError::Decode(error.to_string()))?;
        transactions.push(document.try_into()?);
    }

    Ok(transactions)
}

pub(super) async fn find_one(
    collection: &Collection<TransactionDocument>,
    id: TransactionId,
) -> Result<Option<Transaction>, StoreError> {
    collection
        .find_one(doc! { "_id": id })
        .await?
        .map(Transaction::try_from)
        .transpose()
}

pub(super) async fn insert_one(
    collection: &Collection<TransactionDocument>,
    fields: &TransactionFields,
    now: OffsetDateTime,
) -> Result<TransactionId, StoreError> {
    let result = collection
        .insert_one(TransactionDocument::new(fields, now))
        .await?;

    result
        .inserted_id
        .as_object_id()
        .ok_or_else(|| StoreError::Decode("the inserted ID is not an ObjectId".to_owned()))
}

pub(super) async fn update_one(
    collection: &Collection<TransactionDocument>,
    id: TransactionId,
    fields: &TransactionFields,
    now: OffsetDateTime,
) -> Result<bool, StoreError> {
    let update = doc! {
        "$set": {
            "amount": fields.amount,
            "description": fields.description.as_str(),
            "category": fields.category.as_str(),
            "type": fields.kind.as_str(),
            "date": date_to_bson(fields.date),
            "updatedAt": to_bson_datetime(now),
        }
    };

    let result = collection.update_one(doc! { "_id": id }, update).await?;

    Ok(result.matched_count > 0)
}

pub(super) async fn delete_one(
    collection: &Collection<TransactionDocument>,
    id: TransactionId,
) -> Result<bool, StoreError> {
    let result = collection.delete_one(doc! { "_id": id }).await?;

    Ok(result.deleted_count > 0)
}

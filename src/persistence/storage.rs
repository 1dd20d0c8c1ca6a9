//! RocksDB record store
//!
//! Each org collection lives in its own column family, keyed by principal
//! name; `user_ids` maps stable ids back to principal names. Values are
//! bincode-encoded records.

use super::seed::SeedData;
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, Options, WriteBatch, DB};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::org::{
    DirectReportLink, Employee, EmployeeId, ManagerLink, PhotoRecord, PrincipalName, RecordStore, StoreError,
    StoreResult,
};

const CF_USERS: &str = "users";
const CF_USER_IDS: &str = "user_ids";
const CF_MANAGERS: &str = "managers";
const CF_DIRECT_REPORTS: &str = "direct_reports";
const CF_PHOTOS: &str = "photos";

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// RocksDB error
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Column family error
    #[error("Column family error: {0}")]
    ColumnFamily(String),

    /// Path error
    #[error("Invalid storage path: {0}")]
    InvalidPath(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for StoreError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Serialization(inner) => StoreError::Corrupt {
                key: "<rocksdb value>".to_string(),
                reason: inner.to_string(),
            },
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// RocksDB-backed record store
pub struct PersistentRecordStore {
    db: Arc<DB>,
}

impl PersistentRecordStore {
    /// Open or create a record store at `path`
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path_str = path
            .as_ref()
            .to_str()
            .ok_or_else(|| StorageError::InvalidPath(path.as_ref().display().to_string()))?
            .to_string();

        info!("Opening record store at: {}", path_str);

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts.set_wal_recovery_mode(rocksdb::DBRecoveryMode::PointInTime);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new("default", Options::default()),
            ColumnFamilyDescriptor::new(CF_USERS, Self::cf_options()),
            ColumnFamilyDescriptor::new(CF_USER_IDS, Self::cf_options()),
            ColumnFamilyDescriptor::new(CF_MANAGERS, Self::cf_options()),
            ColumnFamilyDescriptor::new(CF_DIRECT_REPORTS, Self::cf_options()),
            // photos are already compressed image data
            ColumnFamilyDescriptor::new(CF_PHOTOS, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, &path_str, cf_descriptors)?;

        info!("Record store opened successfully");

        Ok(Self { db: Arc::new(db) })
    }

    fn cf_options() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf(&self, name: &str) -> StorageResult<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StorageError::ColumnFamily(name.to_string()))
    }

    fn get<T: DeserializeOwned>(&self, cf: &str, key: &str) -> StorageResult<Option<T>> {
        let handle = self.cf(cf)?;
        match self.db.get_cf(handle, key.as_bytes())? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    fn put_in<T: Serialize>(&self, batch: &mut WriteBatch, cf: &str, key: &str, value: &T) -> StorageResult<()> {
        let handle = self.cf(cf)?;
        batch.put_cf(handle, key.as_bytes(), bincode::serialize(value)?);
        Ok(())
    }

    /// Store a user record and its id index entry
    pub fn put_user(&self, employee: &Employee) -> StorageResult<()> {
        let mut batch = WriteBatch::default();
        self.stage_user(&mut batch, employee)?;
        self.db.write(batch)?;
        debug!("Stored user {}", employee.user_principal_name);
        Ok(())
    }

    pub fn put_manager_link(&self, link: &ManagerLink) -> StorageResult<()> {
        let mut batch = WriteBatch::default();
        self.put_in(&mut batch, CF_MANAGERS, link.user_principal_name.as_str(), link)?;
        self.db.write(batch)?;
        Ok(())
    }

    pub fn put_direct_report_link(&self, link: &DirectReportLink) -> StorageResult<()> {
        let mut batch = WriteBatch::default();
        self.put_in(&mut batch, CF_DIRECT_REPORTS, link.user_principal_name.as_str(), link)?;
        self.db.write(batch)?;
        Ok(())
    }

    pub fn put_photo(&self, record: &PhotoRecord) -> StorageResult<()> {
        let mut batch = WriteBatch::default();
        self.put_in(&mut batch, CF_PHOTOS, record.user_principal_name.as_str(), &record.photo)?;
        self.db.write(batch)?;
        Ok(())
    }

    fn stage_user(&self, batch: &mut WriteBatch, employee: &Employee) -> StorageResult<()> {
        let upn = employee.user_principal_name.as_str();
        self.put_in(batch, CF_USERS, upn, employee)?;
        self.put_in(batch, CF_USER_IDS, employee.id.as_str(), &employee.user_principal_name)?;
        Ok(())
    }

    /// Write a whole seed export in one atomic batch
    pub fn import(&self, seed: &SeedData) -> StorageResult<()> {
        let mut batch = WriteBatch::default();
        for user in &seed.users {
            self.stage_user(&mut batch, user)?;
        }
        for link in &seed.managers {
            self.put_in(&mut batch, CF_MANAGERS, link.user_principal_name.as_str(), link)?;
        }
        for link in &seed.direct_reports {
            self.put_in(&mut batch, CF_DIRECT_REPORTS, link.user_principal_name.as_str(), link)?;
        }
        for photo in &seed.photos {
            self.put_in(&mut batch, CF_PHOTOS, photo.user_principal_name.as_str(), &photo.photo)?;
        }
        self.db.write(batch)?;

        info!(
            "Imported {} users, {} manager links, {} report links, {} photos",
            seed.users.len(),
            seed.managers.len(),
            seed.direct_reports.len(),
            seed.photos.len()
        );
        Ok(())
    }

    /// Scan the users column family in key order
    pub fn scan_users(&self) -> StorageResult<Vec<Employee>> {
        let handle = self.cf(CF_USERS)?;
        let mut users = Vec::new();

        for item in self.db.iterator_cf(handle, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            users.push(bincode::deserialize(&value)?);
        }

        Ok(users)
    }

    /// Flush all data to disk
    pub fn flush(&self) -> StorageResult<()> {
        self.db.flush()?;
        debug!("Flushed record store to disk");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PersistentRecordStore {
    async fn user_by_principal(&self, upn: &PrincipalName) -> StoreResult<Option<Employee>> {
        Ok(self.get(CF_USERS, upn.as_str())?)
    }

    async fn user_by_id(&self, id: &EmployeeId) -> StoreResult<Option<Employee>> {
        let upn: Option<PrincipalName> = self.get(CF_USER_IDS, id.as_str())?;
        match upn {
            Some(upn) => Ok(self.get(CF_USERS, upn.as_str())?),
            None => Ok(None),
        }
    }

    async fn manager_link(&self, upn: &PrincipalName) -> StoreResult<Option<ManagerLink>> {
        Ok(self.get(CF_MANAGERS, upn.as_str())?)
    }

    async fn direct_report_link(&self, upn: &PrincipalName) -> StoreResult<Option<DirectReportLink>> {
        Ok(self.get(CF_DIRECT_REPORTS, upn.as_str())?)
    }

    async fn photo(&self, upn: &PrincipalName) -> StoreResult<Option<String>> {
        Ok(self.get(CF_PHOTOS, upn.as_str())?)
    }

    async fn all_users(&self) -> StoreResult<Vec<Employee>> {
        Ok(self.scan_users()?)
    }
}

//! Credential storage and management
//!
//! Username/password-hash records backed by a flat CSV file with the header
//! `username,password`. The file is rewritten in full on every registration:
//! records go to a sibling temp file which is then renamed over the original.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::hashing::CredentialHasher;
use crate::error::CredentialError;

/// A single stored user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub username: String,
    #[serde(rename = "password")]
    pub password_hash: String,
}

/// File-backed credential store.
///
/// The mutex covers the whole check/append/persist sequence of [`add`],
/// so concurrent registrations never overwrite each other's file writes.
///
/// [`add`]: CredentialStore::add
pub struct CredentialStore {
    path: PathBuf,
    hasher: CredentialHasher,
    records: Mutex<Vec<CredentialRecord>>,
}

impl CredentialStore {
    /// Open the store at `path`. A missing file yields an empty store; the
    /// file is created on the first successful [`add`](Self::add).
    pub fn open(path: impl Into<PathBuf>, hasher: CredentialHasher) -> Result<Self, CredentialError> {
        let path = path.into();
        let records = if path.exists() {
            load_records(&path)?
        } else {
            info!("Credential file {} not found, starting empty", path.display());
            Vec::new()
        };

        info!(
            "Loaded {} credential record(s) from {}",
            records.len(),
            path.display()
        );

        Ok(Self {
            path,
            hasher,
            records: Mutex::new(records),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CredentialRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True iff a record with that username is present.
    pub fn exists(&self, username: &str) -> bool {
        self.lock().iter().any(|r| r.username == username)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Registered usernames in insertion order.
    pub fn usernames(&self) -> Vec<String> {
        self.lock().iter().map(|r| r.username.clone()).collect()
    }

    /// Snapshot of every stored record.
    pub fn records(&self) -> Vec<CredentialRecord> {
        self.lock().clone()
    }

    /// Register a new user and persist the full record set before returning.
    ///
    /// On a write failure the in-memory table is left untouched.
    pub fn add(&self, username: &str, password: &str) -> Result<(), CredentialError> {
        if self.exists(username) {
            return Err(CredentialError::DuplicateUsername(username.to_string()));
        }

        // Hashing is slow; do it before taking the lock and re-check afterwards.
        let password_hash = self.hasher.hash(password)?;

        let mut records = self.lock();
        if records.iter().any(|r| r.username == username) {
            return Err(CredentialError::DuplicateUsername(username.to_string()));
        }

        let mut updated = records.clone();
        updated.push(CredentialRecord {
            username: username.to_string(),
            password_hash,
        });

        self.persist(&updated)
            .map_err(|source| CredentialError::PersistenceFailure {
                path: self.path.clone(),
                source,
            })?;

        *records = updated;
        info!("Registered user {} ({} total)", username, records.len());
        Ok(())
    }

    /// Check a password for an existing user.
    pub fn verify(&self, username: &str, password: &str) -> Result<bool, CredentialError> {
        let stored = self
            .lock()
            .iter()
            .find(|r| r.username == username)
            .map(|r| r.password_hash.clone())
            .ok_or_else(|| CredentialError::UsernameNotFound(username.to_string()))?;

        Ok(self.hasher.verify(password, &stored))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Rewrite the backing file. On failure the temp file is removed and the
    /// original is left as it was.
    fn persist(&self, records: &[CredentialRecord]) -> io::Result<()> {
        let temp = self.temp_path();
        let result = Self::write_temp(&temp, records).and_then(|()| fs::rename(&temp, &self.path));
        match result {
            Ok(()) => {
                debug!("Persisted {} record(s) to {}", records.len(), self.path.display());
                Ok(())
            }
            Err(e) => {
                if temp.exists() {
                    if let Err(cleanup) = fs::remove_file(&temp) {
                        warn!("Failed to remove {}: {}", temp.display(), cleanup);
                    }
                }
                Err(e)
            }
        }
    }

    fn write_temp(temp: &Path, records: &[CredentialRecord]) -> io::Result<()> {
        let file = File::create(temp)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(["username", "password"])?;
        for record in records {
            writer.serialize(record)?;
        }

        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()
    }
}

fn load_records(path: &Path) -> Result<Vec<CredentialRecord>, CredentialError> {
    let file = File::open(path).map_err(|source| CredentialError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let corrupt = |reason: String| CredentialError::Corrupt {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(file);

    let headers = reader.headers().map_err(|e| corrupt(e.to_string()))?;
    if !headers.iter().any(|h| h == "username") || !headers.iter().any(|h| h == "password") {
        return Err(corrupt(format!(
            "expected header username,password, found {:?}",
            headers.iter().collect::<Vec<_>>()
        )));
    }

    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for row in reader.deserialize::<CredentialRecord>() {
        let record = row.map_err(|e| corrupt(e.to_string()))?;
        if !seen.insert(record.username.clone()) {
            return Err(corrupt(format!("duplicate username {}", record.username)));
        }
        records.push(record);
    }

    Ok(records)
}

//! File-backed store: one file per (namespace, key) under a root directory.
//!
//! Namespace and key strings may be arbitrary (stack ids are ARNs with `/`
//! and `:`), so both are encoded URL-safe base64 to form filesystem-safe
//! path components.

use crate::error::{Error, Result};
use crate::store::SecretStore;
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// [`SecretStore`] persisting each value as a file
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        FileStore {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn namespace_dir(&self, namespace: &str) -> PathBuf {
        self.root.join(URL_SAFE_NO_PAD.encode(namespace))
    }

    fn entry_path(&self, namespace: &str, key: &str) -> PathBuf {
        self.namespace_dir(namespace).join(URL_SAFE_NO_PAD.encode(key))
    }
}

#[async_trait]
impl SecretStore for FileStore {
    async fn exists(&self, namespace: &str, key: &str) -> Result<bool, Error> {
        match fs::metadata(self.entry_path(namespace, key)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::Store(format!("stat failed: {}", e))),
        }
    }

    async fn read(&self, namespace: &str, key: &str) -> Result<Bytes, Error> {
        match fs::read(self.entry_path(namespace, key)).await {
            Ok(contents) => Ok(Bytes::from(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound(key.to_string())),
            Err(e) => Err(Error::Store(format!("read failed: {}", e))),
        }
    }

    async fn write(&self, namespace: &str, key: &str, value: &[u8]) -> Result<(), Error> {
        fs::create_dir_all(self.namespace_dir(namespace)).await?;
        let mut file = fs::File::create(self.entry_path(namespace, key)).await?;
        file.write_all(value).await?;
        // flush file and metadata to disk before returning
        file.sync_all().await?;
        Ok(())
    }

    async fn create(&self, namespace: &str, key: &str, value: &[u8]) -> Result<(), Error> {
        fs::create_dir_all(self.namespace_dir(namespace)).await?;
        // create_new makes check-and-create atomic at the filesystem level
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.entry_path(namespace, key))
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(Error::AlreadyExists(key.to_string()))
            }
            Err(e) => return Err(Error::Store(format!("create failed: {}", e))),
        };
        file.write_all(value).await?;
        file.sync_all().await?;
        Ok(())
    }
}

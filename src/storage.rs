use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub trait Storage<T> {
    /// Charge une valeur depuis un support.
    fn load(&self) -> anyhow::Result<T>;
    /// Sauvegarde de manière atomique.
    fn save(&self, value: &T) -> anyhow::Result<()>;
}

/// Fichier JSON unique (jeu de données, résultat de génération…).
pub struct JsonStorage<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonStorage<T> {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            _marker: PhantomData,
        })
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl<T: Serialize + DeserializeOwned> Storage<T> for JsonStorage<T> {
    fn load(&self) -> anyhow::Result<T> {
        let data = fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let value: T = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(value)
    }

    fn save(&self, value: &T) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(value)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}

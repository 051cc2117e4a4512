use crate::ast::{Content, Document};
use crate::config::Config;
use crate::error::{Result, VsyscError};
use crate::keywords::{KeywordEntry, KeywordHandler, KeywordRegistry};
use crate::parser;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableStore {
    vars: HashMap<String, String>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh import scope holding positional parameters `0001`, `0002`, ...
    pub fn with_parameters<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut store = Self::new();
        for (i, value) in params.into_iter().enumerate() {
            store.set(parameter_name(i + 1), value);
        }
        store
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

pub fn parameter_name(position: usize) -> String {
    format!("{:04}", position)
}

/// What `EX: default` leaves behind: the captured content and the source
/// it was built from, so an import can rebuild it with its own parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredExport {
    pub source: String,
    pub content: Content,
}

#[derive(Debug, Default)]
pub struct FileStore {
    files: HashMap<String, StoredExport>,
}

impl FileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write-once per name.
    pub fn insert(&mut self, name: &str, export: StoredExport) -> Result<()> {
        if self.files.contains_key(name) {
            return Err(VsyscError::DuplicateExport { name: name.to_string() });
        }
        self.files.insert(name.to_string(), export);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&StoredExport> {
        self.files.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Shared interpreter state: global variables, exports, custom keywords.
///
/// Clones share the same stores. None of the locks is held across an await.
#[derive(Clone, Default)]
pub struct Context {
    variables: Arc<RwLock<VariableStore>>,
    files: Arc<RwLock<FileStore>>,
    keywords: Arc<RwLock<KeywordRegistry>>,
    config: Config,
}

impl Context {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Builds a document against the global variable store, which stays
    /// write-locked for the whole build.
    pub fn build_document(&self, source: &str) -> Document {
        let keywords = read(&self.keywords);
        let mut variables = write(&self.variables);
        parser::build_document(source, &mut variables, &keywords)
    }

    /// Builds a document against an isolated scope (an import's parameters).
    pub fn build_document_with(&self, source: &str, scope: &mut VariableStore) -> Document {
        let keywords = read(&self.keywords);
        parser::build_document(source, scope, &keywords)
    }

    pub fn variable(&self, name: &str) -> Option<String> {
        read(&self.variables).get(name).map(str::to_string)
    }

    pub fn set_variable(&self, name: impl Into<String>, value: impl Into<String>) {
        write(&self.variables).set(name, value);
    }

    pub fn export(&self, name: &str) -> Option<StoredExport> {
        read(&self.files).get(name).cloned()
    }

    pub fn store_export(&self, name: &str, export: StoredExport) -> Result<()> {
        write(&self.files).insert(name, export)?;
        debug!(export = name, "stored export");
        Ok(())
    }

    pub fn export_names(&self) -> Vec<String> {
        read(&self.files).names()
    }

    pub fn register_keyword<H>(&self, name: &str, handler: H) -> Result<()>
    where
        H: KeywordHandler + 'static,
    {
        write(&self.keywords).register(name, handler)
    }

    pub fn register_keyword_with_timeout<H>(
        &self,
        name: &str,
        handler: H,
        timeout: std::time::Duration,
    ) -> Result<()>
    where
        H: KeywordHandler + 'static,
    {
        write(&self.keywords).register_with_timeout(name, handler, timeout)
    }

    pub fn register_keywords<I>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, Arc<dyn KeywordHandler>)>,
    {
        write(&self.keywords).register_batch(entries)
    }

    pub fn unregister_keyword(&self, name: &str) -> bool {
        write(&self.keywords).unregister(name)
    }

    pub fn keyword(&self, name: &str) -> Option<KeywordEntry> {
        read(&self.keywords).get(name).cloned()
    }

    pub fn keyword_names(&self) -> Vec<String> {
        read(&self.keywords).names()
    }
}

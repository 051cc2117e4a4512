use crate::ast::{Keyword, Value};
use crate::error::{Result, VsyscError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Host-side implementation of a custom keyword. The record's content is
/// passed in as `argument`; the returned value is appended to the results.
#[async_trait]
pub trait KeywordHandler: Send + Sync {
    async fn call(&self, argument: String) -> anyhow::Result<Value>;
}

#[async_trait]
impl<F, Fut> KeywordHandler for F
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    async fn call(&self, argument: String) -> anyhow::Result<Value> {
        (self)(argument).await
    }
}

#[derive(Clone)]
pub struct KeywordEntry {
    pub handler: Arc<dyn KeywordHandler>,
    /// Overrides the configured handler timeout for this keyword.
    pub timeout: Option<Duration>,
}

impl fmt::Debug for KeywordEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeywordEntry")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct KeywordRegistry {
    entries: HashMap<String, KeywordEntry>,
}

impl KeywordRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, name: &str, handler: H) -> Result<()>
    where
        H: KeywordHandler + 'static,
    {
        self.insert(name, Arc::new(handler), None)
    }

    pub fn register_with_timeout<H>(&mut self, name: &str, handler: H, timeout: Duration) -> Result<()>
    where
        H: KeywordHandler + 'static,
    {
        self.insert(name, Arc::new(handler), Some(timeout))
    }

    /// Registers entries in order. An invalid entry stops the batch; the
    /// entries before it stay registered.
    pub fn register_batch<I>(&mut self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, Arc<dyn KeywordHandler>)>,
    {
        for (name, handler) in entries {
            self.insert(&name, handler, None)?;
        }
        Ok(())
    }

    fn insert(&mut self, name: &str, handler: Arc<dyn KeywordHandler>, timeout: Option<Duration>) -> Result<()> {
        let name = validate_name(name)?;
        debug!(keyword = %name, "registered custom keyword");
        // last registration wins
        self.entries.insert(name, KeywordEntry { handler, timeout });
        Ok(())
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.entries.remove(&name.to_lowercase()).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_lowercase())
    }

    pub fn get(&self, name: &str) -> Option<&KeywordEntry> {
        self.entries.get(&name.to_lowercase())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate_name(name: &str) -> Result<String> {
    let lower = name.to_lowercase();
    if lower.is_empty() {
        return Err(VsyscError::InvalidArgument("keyword name must not be empty".to_string()));
    }
    if lower.chars().any(|c| c.is_whitespace() || c == ':') {
        return Err(VsyscError::InvalidArgument(format!(
            "keyword name '{}' must not contain whitespace or ':'",
            name
        )));
    }
    if Keyword::is_reserved(&lower) {
        return Err(VsyscError::InvalidArgument(format!(
            "'{}' is a reserved keyword",
            name
        )));
    }
    Ok(lower)
}

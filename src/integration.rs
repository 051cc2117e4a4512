use crate::ast::{Document, Value};
use crate::error::Result;
use crate::executor::Executor;
use crate::keywords::KeywordHandler;
use crate::storage::Context;
use lazy_static::lazy_static;
use std::fmt::Write;
use std::sync::Arc;

lazy_static! {
    // Process-wide default for hosts that don't manage their own context.
    static ref GLOBAL: Executor = Executor::default();
}

pub fn global_context() -> &'static Context {
    GLOBAL.context()
}

pub async fn execute(source: &str) -> Result<Vec<Value>> {
    GLOBAL.execute(source).await
}

pub fn register_keyword<H>(name: &str, handler: H) -> Result<()>
where
    H: KeywordHandler + 'static,
{
    global_context().register_keyword(name, handler)
}

pub fn register_keywords<I>(entries: I) -> Result<()>
where
    I: IntoIterator<Item = (String, Arc<dyn KeywordHandler>)>,
{
    global_context().register_keywords(entries)
}

/// Wraps plain text as a document: line 0 names it and every physical line
/// becomes a `WL` record keyed by its 1-based line number. Not executed.
pub fn text_to_document(context: &Context, text: &str, name: &str) -> Document {
    context.build_document(&text_source(text, name))
}

fn text_source(text: &str, name: &str) -> String {
    let mut source = format!("0: NM: {}\n", name);
    for (i, line) in text.split('\n').enumerate() {
        // writing into a String cannot fail
        let _ = write!(source, "\n{}: WL: {}", i + 1, line);
    }
    source
}

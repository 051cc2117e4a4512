use crate::ast::{Document, Keyword, Record, Value};
use crate::error::{Result, VsyscError};
use crate::storage::{Context, StoredExport, VariableStore};
use lazy_static::lazy_static;
use regex::Regex;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

lazy_static! {
    static ref IMPORT_ARGS: Regex = Regex::new(r",\s*").unwrap();
}

const EXPORT_DOCUMENT: &str = "default";

#[derive(Clone, Default)]
pub struct Executor {
    context: Context,
}

impl Executor {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Builds `source` against the global scope and runs it. Fails on the
    /// first error record or handler failure; no partial results.
    pub async fn execute(&self, source: &str) -> Result<Vec<Value>> {
        let document = self.context.build_document(source);
        self.run(document, source.to_string(), Vec::new()).await
    }

    /// `imports` holds the export names currently being imported, innermost last.
    fn run<'a>(
        &'a self,
        document: Document,
        source: String,
        imports: Vec<String>,
    ) -> BoxFuture<'a, Result<Vec<Value>>> {
        Box::pin(async move {
            debug!(name = %document.name, depth = imports.len(), "executing document");
            let mut results = Vec::new();

            for (identifier, record) in document.content.iter() {
                if let Record::Error { error, .. } = record {
                    debug!(identifier = %identifier, error = %error, "execution aborted");
                    return Err(error.clone());
                }

                match record.keyword() {
                    Keyword::Import => {
                        let imported = self.import(argument(record), &imports).await?;
                        results.extend(imported);
                    }
                    Keyword::Export => {
                        results = self.export(&document, &source, argument(record), &imports)?;
                        break;
                    }
                    Keyword::Custom(name) => {
                        results.push(self.invoke(name, argument(record)).await?);
                    }
                    _ => results.extend(record.value()),
                }
            }

            Ok(results)
        })
    }

    async fn import(&self, argument: &str, imports: &[String]) -> Result<Vec<Value>> {
        let mut parts = IMPORT_ARGS.split(argument);
        let name = parts.next().unwrap_or_default().trim().to_string();
        let params: Vec<String> = parts.map(|p| p.trim().to_string()).collect();

        if imports.contains(&name) {
            let mut chain = imports.to_vec();
            chain.push(name);
            return Err(VsyscError::ImportCycle { chain });
        }

        let max_depth = self.context.config().max_import_depth;
        if imports.len() >= max_depth {
            return Err(VsyscError::ImportDepthExceeded { depth: max_depth });
        }

        let export = self
            .context
            .export(&name)
            .ok_or_else(|| VsyscError::ImportNotFound { name: name.clone() })?;

        debug!(export = %name, params = params.len(), "importing");
        let mut scope = VariableStore::with_parameters(params);
        let document = self.context.build_document_with(&export.source, &mut scope);

        let mut nested = imports.to_vec();
        nested.push(name);
        self.run(document, export.source, nested).await
    }

    /// Export is terminal: the returned values replace everything produced so far.
    fn export(
        &self,
        document: &Document,
        source: &str,
        argument: &str,
        imports: &[String],
    ) -> Result<Vec<Value>> {
        // records after the export line are never walked, so check them here
        if let Some(error) = document.content.first_error() {
            return Err(error.clone());
        }

        if argument != EXPORT_DOCUMENT {
            return Ok(vec![Value::Text(argument.to_string())]);
        }

        // An imported document reaching its own export line is already stored.
        if imports.last() == Some(&document.name) {
            debug!(export = %document.name, "skipping re-export from import");
        } else {
            self.context.store_export(
                &document.name,
                StoredExport {
                    source: source.to_string(),
                    content: document.content.clone(),
                },
            )?;
        }

        Ok(document.content.values())
    }

    async fn invoke(&self, name: &str, argument: &str) -> Result<Value> {
        let entry = self
            .context
            .keyword(name)
            .ok_or_else(|| VsyscError::HandlerRejection {
                keyword: name.to_string(),
                message: "no handler registered".to_string(),
            })?;

        let call = entry.handler.call(argument.to_string());
        let outcome = match entry.timeout.or(self.context.config().handler_timeout) {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                warn!(keyword = name, millis = limit.as_millis() as u64, "handler timed out");
                VsyscError::HandlerTimeout {
                    keyword: name.to_string(),
                    millis: limit.as_millis(),
                }
            })?,
            None => call.await,
        };

        outcome.map_err(|err| VsyscError::HandlerRejection {
            keyword: name.to_string(),
            message: format!("{:#}", err),
        })
    }
}

fn argument(record: &Record) -> &str {
    match record {
        Record::String { value, .. } => value,
        _ => "",
    }
}

pub mod tokenizer;
pub mod substitution;
pub mod parser;
pub mod ast;
pub mod keywords;
pub mod executor;
pub mod storage;
pub mod config;
pub mod error;
pub mod integration;

pub use ast::*;
pub use config::Config;
pub use error::{Result, VsyscError};
pub use executor::Executor;
pub use integration::text_to_document;
pub use keywords::{KeywordEntry, KeywordHandler, KeywordRegistry};
pub use parser::{build_document, Parser};
pub use storage::*;
pub use tokenizer::{match_line, tokenize, Line};

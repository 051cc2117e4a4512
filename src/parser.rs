use crate::ast::{Category, Document, Keyword, Record};
use crate::error::VsyscError;
use crate::keywords::KeywordRegistry;
use crate::storage::VariableStore;
use crate::substitution::substitute;
use crate::tokenizer::{tokenize, Line};
use tracing::{debug, trace};

/// Classifies lines into records. `scope` receives `DC` declarations and
/// resolves `$name` references.
pub struct Parser<'a> {
    scope: &'a mut VariableStore,
    keywords: &'a KeywordRegistry,
    document: Document,
}

impl<'a> Parser<'a> {
    pub fn new(scope: &'a mut VariableStore, keywords: &'a KeywordRegistry) -> Self {
        Self {
            scope,
            keywords,
            document: Document::new(),
        }
    }

    pub fn parse(mut self, source: &str) -> Document {
        for line in tokenize(source) {
            match line {
                Ok(line) => self.classify(line),
                Err(err) => {
                    let number = err.line().unwrap_or_default();
                    trace!(line = number, "syntax error");
                    self.stage_error(number.to_string(), err, Keyword::Custom("none".to_string()));
                }
            }
        }

        debug!(
            name = %self.document.name,
            entries = self.document.content.len(),
            "built document"
        );
        self.document
    }

    fn classify(&mut self, line: Line) {
        let keyword = Keyword::parse(&line.keyword);
        let declares = matches!(keyword, Keyword::Name | Keyword::Declare);
        let existing = self.document.content.get(&line.identifier);

        if !declares && existing.map_or(false, Record::is_error) {
            trace!(line = line.number, identifier = %line.identifier, "identifier already failed");
            return;
        }

        let (content, missing) = substitute(&line.content, &*self.scope, line.number);

        if let Some(err) = missing {
            trace!(line = line.number, identifier = %line.identifier, "unresolved variable");
            self.stage_error(line.identifier, err, keyword);
            return;
        }

        let existing = self.document.content.get(&line.identifier);
        let occupied = existing.is_some();
        let holds_string = matches!(existing, Some(Record::String { .. }));
        let category = keyword.category();

        let redeclared = !declares
            && ((category == Some(Category::String) && occupied) || holds_string);

        trace!(
            line = line.number,
            identifier = %line.identifier,
            keyword = %keyword,
            redeclared,
            "classifying"
        );

        match category {
            Some(Category::String) if !redeclared && !declares => {
                self.write_string(line, keyword, content)
            }
            Some(Category::Array) if !redeclared => self.write_array(line, keyword, content),
            _ => self.special(line, keyword, content, occupied),
        }
    }

    /// Error records are never replaced; the first failure at an identifier stays.
    fn stage_error(&mut self, identifier: String, error: VsyscError, keyword: Keyword) {
        if self.document.content.get(&identifier).map_or(false, Record::is_error) {
            return;
        }
        self.document.content.insert(identifier, Record::error(error, keyword));
    }

    fn write_string(&mut self, line: Line, keyword: Keyword, content: String) {
        if is_number(&line.identifier) {
            self.document
                .content
                .insert(line.identifier, Record::string(content, keyword));
        } else {
            let err = VsyscError::NotANumber {
                identifier: line.identifier.clone(),
                line: line.number,
            };
            self.stage_error(line.identifier, err, keyword);
        }
    }

    fn write_array(&mut self, line: Line, keyword: Keyword, content: String) {
        match keyword {
            Keyword::CreateArray => {
                self.document.content.insert(
                    line.identifier,
                    Record::Array {
                        values: vec![content],
                        keyword,
                    },
                );
            }
            Keyword::AddToArray => match self.document.content.get_mut(&line.identifier) {
                Some(Record::Array { values, .. }) => values.push(content),
                _ => {
                    let err = VsyscError::ArrayNotFound {
                        identifier: line.identifier.clone(),
                        content,
                    };
                    self.stage_error(line.identifier, err, keyword);
                }
            },
            _ => {
                let err = VsyscError::NotImplemented {
                    keyword: keyword.to_string(),
                    line: line.number,
                };
                self.stage_error(line.identifier, err, keyword);
            }
        }
    }

    /// `DC`, `NM`, deferred commands, and everything unrecognised.
    fn special(&mut self, line: Line, keyword: Keyword, content: String, occupied: bool) {
        let deferred = match &keyword {
            Keyword::Import | Keyword::Export => true,
            Keyword::Custom(name) => self.keywords.contains(name),
            _ => false,
        };

        match keyword {
            Keyword::Declare => self.scope.set(line.identifier, content),
            Keyword::Name => self.document.name = content,
            _ if deferred => {
                // a deferred command never displaces an existing record
                if !occupied {
                    self.document
                        .content
                        .insert(line.identifier, Record::string(content, keyword));
                }
            }
            _ => {
                let err = VsyscError::UnknownKeyword {
                    keyword: keyword.to_string(),
                    line: line.number,
                };
                self.stage_error(line.identifier, err, keyword);
            }
        }
    }
}

fn is_number(identifier: &str) -> bool {
    identifier
        .trim()
        .parse::<f64>()
        .map_or(false, |n| n.is_finite())
}

pub fn build_document(source: &str, scope: &mut VariableStore, keywords: &KeywordRegistry) -> Document {
    Parser::new(scope, keywords).parse(source)
}

use crate::error::VsyscError;
use crate::storage::VariableStore;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref VARIABLE: Regex = Regex::new(r"\$([A-Za-z0-9_]+)").unwrap();
}

/// Replaces `$name` tokens with values from `scope`.
///
/// Unresolved tokens stay in the text verbatim; the first one is reported
/// alongside the substituted text.
pub fn substitute(
    content: &str,
    scope: &VariableStore,
    line: usize,
) -> (String, Option<VsyscError>) {
    if !content.contains('$') {
        return (content.to_string(), None);
    }

    let mut missing = None;
    let text = VARIABLE.replace_all(content, |caps: &Captures| match scope.get(&caps[1]) {
        Some(value) => value.to_string(),
        None => {
            missing.get_or_insert_with(|| VsyscError::UnknownVariable {
                name: caps[1].to_string(),
                line,
            });
            caps[0].to_string()
        }
    });

    (text.into_owned(), missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_known_variables() {
        let mut scope = VariableStore::new();
        scope.set("x", "42");
        scope.set("name_2", "ada");
        let (text, err) = substitute("$x and $name_2", &scope, 1);
        assert_eq!(text, "42 and ada");
        assert!(err.is_none());
    }

    #[test]
    fn leaves_unknown_variables_verbatim() {
        let scope = VariableStore::new();
        let (text, err) = substitute("hi $y", &scope, 4);
        assert_eq!(text, "hi $y");
        assert_eq!(
            err,
            Some(VsyscError::UnknownVariable { name: "y".to_string(), line: 4 })
        );
    }

    #[test]
    fn lone_dollar_is_not_a_token() {
        let scope = VariableStore::new();
        let (text, err) = substitute("costs $ 5", &scope, 1);
        assert_eq!(text, "costs $ 5");
        assert!(err.is_none());
    }
}

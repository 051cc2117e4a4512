#[cfg(test)]
mod tests {
    use vsysc::ast::{Document, Keyword, Record};
    use vsysc::error::VsyscError;
    use vsysc::keywords::KeywordRegistry;
    use vsysc::parser::build_document;
    use vsysc::storage::VariableStore;
    use vsysc::Value;

    fn parse(source: &str) -> (Document, VariableStore) {
        let mut scope = VariableStore::new();
        let document = build_document(source, &mut scope, &KeywordRegistry::new());
        (document, scope)
    }

    fn error_at(document: &Document, identifier: &str) -> VsyscError {
        match document.content.get(identifier) {
            Some(Record::Error { error, .. }) => error.clone(),
            other => panic!("expected error record at {identifier}, found {other:?}"),
        }
    }

    #[test]
    fn test_parse_demo_document() {
        let (document, _) = parse("0: NM: demo\n1: WL: hello\n2: AR: list\n2: AD: a\n2: AD: b");
        assert_eq!(document.name, "demo");
        assert_eq!(document.content.len(), 2);
        assert_eq!(
            document.content.get("1"),
            Some(&Record::String {
                value: "hello".to_string(),
                keyword: Keyword::WriteLine,
            })
        );
        assert_eq!(
            document.content.get("2"),
            Some(&Record::Array {
                values: vec!["list".to_string(), "a".to_string(), "b".to_string()],
                keyword: Keyword::CreateArray,
            })
        );
    }

    #[test]
    fn test_declare_and_name_add_no_entries() {
        let (document, scope) = parse("0: NM: first\nx: DC: 42\n0: NM: second\n1: WL: $x\n5: AR: a");
        assert_eq!(document.name, "second");
        assert_eq!(scope.get("x"), Some("42"));
        assert_eq!(document.content.len(), 2);
        assert_eq!(document.content.values(), vec![
            Value::Text("42".to_string()),
            Value::List(vec!["a".to_string()]),
        ]);
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let (document, _) = parse("1: wl: lower\n2: Wl: mixed");
        assert_eq!(document.content.len(), 2);
        assert!(document.content.first_error().is_none());
    }

    #[test]
    fn test_content_keeps_insertion_order() {
        let (document, _) = parse("10: WL: ten\n2: WL: two\n7: AR: seven\n2.5: WL: half");
        let keys: Vec<&String> = document.content.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["10", "2", "7", "2.5"]);
    }

    #[test]
    fn test_append_to_missing_array() {
        let (document, _) = parse("3: AD: orphan");
        assert_eq!(
            error_at(&document, "3"),
            VsyscError::ArrayNotFound {
                identifier: "3".to_string(),
                content: "orphan".to_string(),
            }
        );
        assert_eq!(
            error_at(&document, "3").to_string(),
            "Array '3' does not exist, failed to add 'orphan'"
        );
    }

    #[test]
    fn test_array_create_overwrites() {
        let (document, _) = parse("1: AR: a\n1: AD: b\n1: AR: fresh");
        assert_eq!(
            document.content.get("1").and_then(Record::value),
            Some(Value::List(vec!["fresh".to_string()]))
        );
    }

    #[test]
    fn test_write_line_requires_numeric_identifier() {
        let (document, _) = parse("abc: WL: hello\n0: WL: zero\n-1.5: WL: negative");
        assert_eq!(
            error_at(&document, "abc"),
            VsyscError::NotANumber { identifier: "abc".to_string(), line: 1 }
        );
        assert!(matches!(document.content.get("0"), Some(Record::String { .. })));
        assert!(matches!(document.content.get("-1.5"), Some(Record::String { .. })));
    }

    #[test]
    fn test_second_write_line_is_unknown_keyword() {
        let (document, _) = parse("1: WL: first\n1: WL: second");
        assert_eq!(
            error_at(&document, "1"),
            VsyscError::UnknownKeyword { keyword: "wl".to_string(), line: 2 }
        );
    }

    #[test]
    fn test_array_keyword_on_string_identifier_is_unknown_keyword() {
        let (document, _) = parse("1: WL: text\n1: AD: more");
        assert_eq!(
            error_at(&document, "1"),
            VsyscError::UnknownKeyword { keyword: "ad".to_string(), line: 2 }
        );
    }

    #[test]
    fn test_unknown_keyword() {
        let (document, _) = parse("1: ZZ: what");
        assert_eq!(error_at(&document, "1").to_string(), "Unknown keyword 'zz' (line:1)");
    }

    #[test]
    fn test_remove_is_not_implemented() {
        let (document, _) = parse("1: AR: a\n1: RM: a");
        assert_eq!(
            error_at(&document, "1"),
            VsyscError::NotImplemented { keyword: "rm".to_string(), line: 2 }
        );
    }

    #[test]
    fn test_syntax_error_is_keyed_by_line_number() {
        let (document, _) = parse("1: WL: ok\n\nnotatriple\n4: WL: still parsed");
        assert_eq!(error_at(&document, "3"), VsyscError::SyntaxError { line: 3 });
        assert!(matches!(document.content.get("4"), Some(Record::String { .. })));
    }

    #[test]
    fn test_syntax_error_survives_array_on_same_identifier() {
        let (document, _) = parse("1: WL: a\nnotatriple\n2: AR: x");
        assert_eq!(error_at(&document, "2"), VsyscError::SyntaxError { line: 2 });
    }

    #[test]
    fn test_syntax_error_survives_reused_line_number() {
        let (document, _) = parse("notatriple\n1: WL: a");
        assert_eq!(error_at(&document, "1"), VsyscError::SyntaxError { line: 1 });
        assert_eq!(document.content.len(), 1);
    }

    #[test]
    fn test_staged_errors_are_not_overwritten() {
        let (document, _) = parse("1: WL: $y\n1: AR: z\n2: AD: a\n2: AR: x\n3: ZZ: q\n3: EX: default");
        assert_eq!(
            error_at(&document, "1"),
            VsyscError::UnknownVariable { name: "y".to_string(), line: 1 }
        );
        assert_eq!(
            error_at(&document, "2"),
            VsyscError::ArrayNotFound {
                identifier: "2".to_string(),
                content: "a".to_string(),
            }
        );
        assert_eq!(
            error_at(&document, "3"),
            VsyscError::UnknownKeyword { keyword: "zz".to_string(), line: 5 }
        );
    }

    #[test]
    fn test_declare_with_unknown_variable_stages_error() {
        let (document, scope) = parse("x: DC: $missing\n1: WL: ok");
        assert!(document.content.contains("x"));
        assert_eq!(
            error_at(&document, "x"),
            VsyscError::UnknownVariable { name: "missing".to_string(), line: 1 }
        );
        assert_eq!(scope.get("x"), None);
    }

    #[test]
    fn test_unknown_variable_error_wins() {
        let (document, _) = parse("1: WL: hello $nobody");
        assert_eq!(
            error_at(&document, "1"),
            VsyscError::UnknownVariable { name: "nobody".to_string(), line: 1 }
        );
    }

    #[test]
    fn test_declarations_apply_in_line_order() {
        let (document, _) = parse("1: WL: $v\nv: DC: late");
        assert!(matches!(document.content.get("1"), Some(Record::Error { .. })));
    }

    #[test]
    fn test_import_and_export_are_deferred() {
        let (document, _) = parse("1: IM: greet, world\n2: EX: default\n2: EX: ignored");
        assert_eq!(
            document.content.get("1"),
            Some(&Record::String {
                value: "greet, world".to_string(),
                keyword: Keyword::Import,
            })
        );
        assert_eq!(
            document.content.get("2"),
            Some(&Record::String {
                value: "default".to_string(),
                keyword: Keyword::Export,
            })
        );
    }

    #[test]
    fn test_registered_custom_keyword_is_deferred() {
        let mut registry = KeywordRegistry::new();
        registry
            .register("echo", |arg: String| async move { Ok::<_, anyhow::Error>(Value::Text(arg)) })
            .unwrap();
        let mut scope = VariableStore::new();
        let document = build_document("1: ECHO: hi\n2: other: hi", &mut scope, &registry);

        assert_eq!(
            document.content.get("1"),
            Some(&Record::String {
                value: "hi".to_string(),
                keyword: Keyword::Custom("echo".to_string()),
            })
        );
        assert!(matches!(document.content.get("2"), Some(Record::Error { .. })));
    }
}

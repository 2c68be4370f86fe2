#[cfg(test)]
mod scanner_tests {
    use rox as lox;

    use lox::error::LoxError;
    use lox::scanner::*;
    use lox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source.as_bytes());
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len(), "tokens: {:?}", tokens);

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_two_character_operators() {
        assert_token_sequence(
            "! != = == < <= > >=",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_comments_produce_no_tokens() {
        assert_token_sequence(
            "a / b // the rest is ignored ( ) {\nc",
            &[
                (TokenType::IDENTIFIER, "a"),
                (TokenType::SLASH, "/"),
                (TokenType::IDENTIFIER, "b"),
                (TokenType::IDENTIFIER, "c"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_token_sequence(
            "class classy _under or9 while",
            &[
                (TokenType::CLASS, "class"),
                (TokenType::IDENTIFIER, "classy"),
                (TokenType::IDENTIFIER, "_under"),
                (TokenType::IDENTIFIER, "or9"),
                (TokenType::WHILE, "while"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_number_literals() {
        let (tokens, errors) = tokenize("12 3.25 7.");
        assert!(errors.is_empty());

        let numbers: Vec<f64> = tokens
            .iter()
            .filter_map(|t| match t.token_type {
                TokenType::NUMBER(n) => Some(n),
                _ => None,
            })
            .collect();
        assert_eq!(numbers, vec![12.0, 3.25, 7.0]);

        // the trailing '.' is its own token
        assert_eq!(tokens[3].token_type, TokenType::DOT);
        assert_eq!(tokens[2].lexeme, "7");
    }

    #[test]
    fn test_multiline_string_advances_line() {
        let (tokens, errors) = tokenize("\"one\ntwo\" x");
        assert!(errors.is_empty());

        match &tokens[0].token_type {
            TokenType::STRING(s) => assert_eq!(s, "one\ntwo"),
            other => panic!("expected string, got {:?}", other),
        }
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_unterminated_string_is_one_error() {
        let (tokens, errors) = tokenize("var a = 1;\nprint \"oops");

        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], LoxError::Lex { line: 2, .. }));
        assert!(errors[0].to_string().contains("Unterminated string."));

        let kinds: Vec<&str> = tokens.iter().map(|t| t.token_type.name()).collect();
        assert_eq!(
            kinds,
            vec!["VAR", "IDENTIFIER", "EQUAL", "NUMBER", "SEMICOLON", "PRINT", "EOF"]
        );
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#";
        let scanner = Scanner::new(source.as_bytes());

        let results: Vec<_> = scanner.collect();

        // COMMA, DOT, error '$', LEFT_PAREN, error '#', EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let error_count = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(error_count, 2, "Expected 2 error messages");

        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(
                err.to_string().contains("Unexpected character"),
                "Error message should contain 'Unexpected character', got: {}",
                err
            );
        }

        fn assert_token_matches(
            result: &Result<Token, LoxError>,
            expected_type: TokenType,
            expected_lexeme: &str,
        ) {
            match result {
                Ok(token) => {
                    assert_eq!(token.token_type, expected_type);
                    assert_eq!(token.lexeme, expected_lexeme);
                }
                Err(e) => panic!("Expected token but got error: {}", e),
            }
        }
    }

    #[test]
    fn test_multibyte_unexpected_char_is_one_error() {
        let (_, errors) = tokenize("é");
        assert_eq!(errors.len(), 1, "errors: {:?}", errors);
        assert_eq!(errors[0].to_string(), "[line 1] Error: Unexpected character: é");

        let (tokens, errors) = tokenize("a é b");
        let kinds: Vec<&str> = tokens.iter().map(|t| t.token_type.name()).collect();
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();

        assert_eq!(errors.len(), 1);
        assert_eq!(kinds, vec!["IDENTIFIER", "IDENTIFIER", "EOF"]);
        assert_eq!(lexemes, vec!["a", "b", ""]);
    }

    #[test]
    fn test_large_integral_number_display() {
        let (tokens, _) = tokenize("1000000000000000 100000000000000000000");
        let shown: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();

        assert_eq!(shown[0], "NUMBER 1000000000000000 1000000000000000.0");
        assert_eq!(
            shown[1],
            "NUMBER 100000000000000000000 100000000000000000000.0"
        );
    }

    #[test]
    fn test_token_display() {
        let (tokens, _) = tokenize("3 2.5 \"hi\" foo");
        let shown: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();

        assert_eq!(
            shown,
            vec![
                "NUMBER 3 3.0",
                "NUMBER 2.5 2.5",
                "STRING \"hi\" hi",
                "IDENTIFIER foo null",
                "EOF  null",
            ]
        );
    }

    #[test]
    fn test_scanner_is_fused_after_eof() {
        let mut scanner = Scanner::new(b"x");
        assert!(scanner.next().is_some());
        assert!(matches!(scanner.next(), Some(Ok(t)) if t.is_eof()));
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }
}

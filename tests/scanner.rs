#[cfg(test)]
mod scanner_tests {
    use loxwalk::error::Diagnostics;
    use loxwalk::scanner::*;
    use loxwalk::token::*;
    use pretty_assertions::assert_eq;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

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
    fn test_scanner_02_two_char_operators() {
        assert_token_sequence(
            "! != = == < <= > >= /",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::SLASH, "/"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_and_identifiers() {
        assert_token_sequence(
            "var _tmp1 = nil; while break fun funny orchid or",
            &[
                (TokenType::VAR, "var"),
                (TokenType::IDENTIFIER, "_tmp1"),
                (TokenType::EQUAL, "="),
                (TokenType::NIL, "nil"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::WHILE, "while"),
                (TokenType::BREAK, "break"),
                (TokenType::FUN, "fun"),
                (TokenType::IDENTIFIER, "funny"),
                (TokenType::IDENTIFIER, "orchid"),
                (TokenType::OR, "or"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_comments_and_lines() {
        let mut diagnostics = Diagnostics::new();
        let tokens = scan("// lead\nprint 1; // tail\n\n", &mut diagnostics);

        assert!(!diagnostics.had_error());
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].token_type, TokenType::PRINT);
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[3].token_type, TokenType::EOF);
        assert_eq!(tokens[3].line, 4);
    }

    #[test]
    fn test_scanner_05_numbers() {
        let mut diagnostics = Diagnostics::new();
        let tokens = scan("123.45 7 8.", &mut diagnostics);

        let numbers: Vec<f64> = tokens
            .iter()
            .filter_map(|t| match t.token_type {
                TokenType::NUMBER(n) => Some(n),
                _ => None,
            })
            .collect();

        assert_eq!(numbers, vec![123.45, 7.0, 8.0]);

        // The trailing '.' is not part of the number.
        assert_eq!(tokens[3].token_type, TokenType::DOT);
        assert_eq!(tokens[2].lexeme, "8");
    }

    #[test]
    fn test_scanner_06_multiline_string() {
        let mut diagnostics = Diagnostics::new();
        let tokens = scan("\"one\ntwo\" x", &mut diagnostics);

        assert!(!diagnostics.had_error());
        match &tokens[0].token_type {
            TokenType::STRING(s) => assert_eq!(s, "one\ntwo"),
            other => panic!("expected a string, got {:?}", other),
        }

        // The identifier after the string is on the second line.
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_scanner_07_unterminated_string() {
        let mut diagnostics = Diagnostics::new();
        let tokens = scan("print \"never closed", &mut diagnostics);

        assert!(diagnostics.had_error());
        assert_eq!(diagnostics.errors().len(), 1);
        assert_eq!(
            diagnostics.errors()[0].to_string(),
            "[line 1] Error: Unterminated string."
        );

        // The partial string is discarded; PRINT and EOF remain.
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].token_type, TokenType::EOF);
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#";
        let results: Vec<_> = Scanner::new(source).collect();

        // COMMA, DOT, error('$'), LEFT_PAREN, error('#'), EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        let kinds: Vec<Option<TokenType>> = results
            .iter()
            .map(|r| r.as_ref().ok().map(|t| t.token_type.clone()))
            .collect();

        assert_eq!(
            kinds,
            vec![
                Some(TokenType::COMMA),
                Some(TokenType::DOT),
                None,
                Some(TokenType::LEFT_PAREN),
                None,
                Some(TokenType::EOF),
            ]
        );

        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(|e| e.to_string())
            .collect();

        assert_eq!(
            errors,
            vec![
                "[line 1] Error: Unexpected character: $".to_string(),
                "[line 1] Error: Unexpected character: #".to_string(),
            ]
        );
    }

    #[test]
    fn test_unexpected_multibyte_character_reported_once() {
        let mut diagnostics = Diagnostics::new();
        let tokens = scan("a é b", &mut diagnostics);

        assert_eq!(diagnostics.errors().len(), 1);
        assert_eq!(tokens.len(), 3); // a, b, EOF
    }

    #[test]
    fn test_empty_source_yields_only_eof() {
        let mut diagnostics = Diagnostics::new();
        let tokens = scan("", &mut diagnostics);

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::EOF);
        assert_eq!(tokens[0].line, 1);
    }

    #[test]
    fn test_token_display() {
        let mut diagnostics = Diagnostics::new();
        let tokens = scan("3 2.5 \"hi\" x", &mut diagnostics);

        let rendered: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();

        assert_eq!(
            rendered,
            vec![
                "NUMBER 3 3.0",
                "NUMBER 2.5 2.5",
                "STRING \"hi\" hi",
                "IDENTIFIER x null",
                "EOF  null",
            ]
        );
    }
}

#[cfg(test)]
mod parser_tests {
    use loxwalk::ast::{Expr, LiteralValue, Stmt};
    use loxwalk::ast_printer::AstPrinter;
    use loxwalk::error::Diagnostics;
    use loxwalk::parser::{self, Parser};
    use loxwalk::scanner::scan;
    use pretty_assertions::assert_eq;

    fn parse_program(source: &str) -> (Vec<Stmt>, Vec<String>) {
        let mut diagnostics = Diagnostics::new();
        let tokens = scan(source, &mut diagnostics);
        let statements = parser::parse(&tokens, &mut diagnostics);

        let errors = diagnostics.errors().iter().map(|e| e.to_string()).collect();

        (statements, errors)
    }

    fn print_expression(source: &str) -> String {
        let mut diagnostics = Diagnostics::new();
        let tokens = scan(source, &mut diagnostics);
        let expr = Parser::new(&tokens)
            .parse_expression(&mut diagnostics)
            .expect("expression should parse");

        assert!(!diagnostics.had_error());

        AstPrinter.print(&expr)
    }

    #[test]
    fn test_precedence() {
        assert_eq!(print_expression("1 + 2 * 3"), "(+ 1.0 (* 2.0 3.0))");
        assert_eq!(
            print_expression("(1 + 2) * 3 - 4 / 2"),
            "(- (* (group (+ 1.0 2.0)) 3.0) (/ 4.0 2.0))"
        );
        assert_eq!(
            print_expression("-1 < 2 == !false"),
            "(== (< (- 1.0) 2.0) (! false))"
        );
        assert_eq!(print_expression("a or b and c"), "(or a (and b c))");
    }

    #[test]
    fn test_assignment_is_right_associative() {
        assert_eq!(print_expression("a = b = 3"), "(= a (= b 3.0))");
    }

    #[test]
    fn test_call_chains() {
        assert_eq!(
            print_expression("f(1)(2, \"x\")"),
            "(call (call f 1.0) 2.0 x)"
        );
        assert_eq!(print_expression("g()"), "(call g)");
    }

    #[test]
    fn test_anonymous_function_expression() {
        assert_eq!(print_expression("fun (a, b) { return a; }"), "(fun (a b))");

        let (statements, errors) = parse_program("var add = fun (a, b) { return a + b; };");

        assert!(errors.is_empty());
        assert_eq!(statements.len(), 1);

        match &statements[0] {
            Stmt::Var {
                name,
                initializer: Some(Expr::Function(function)),
            } => {
                assert_eq!(name.lexeme, "add");
                assert_eq!(function.arity(), 2);
                assert_eq!(function.body.len(), 1);
            }
            other => panic!("expected a var holding a function, got {:?}", other),
        }
    }

    #[test]
    fn test_function_declaration() {
        let (statements, errors) = parse_program("fun greet(name) { print name; }");

        assert!(errors.is_empty());

        match &statements[0] {
            Stmt::Function { name, function } => {
                assert_eq!(name.lexeme, "greet");
                assert_eq!(function.params[0].lexeme, "name");
                assert!(matches!(function.body[0], Stmt::Print(_)));
            }
            other => panic!("expected a function declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_for_desugars_to_while() {
        let (statements, errors) =
            parse_program("for (var i = 0; i < 3; i = i + 1) print i;");

        assert!(errors.is_empty());
        assert_eq!(statements.len(), 1);

        let Stmt::Block(outer) = &statements[0] else {
            panic!("expected block, got {:?}", statements[0]);
        };

        assert_eq!(outer.len(), 2);
        assert!(matches!(outer[0], Stmt::Var { .. }));

        let Stmt::While { keyword, body, .. } = &outer[1] else {
            panic!("expected while, got {:?}", outer[1]);
        };

        assert_eq!(keyword.lexeme, "for");

        let Stmt::Block(inner) = body.as_ref() else {
            panic!("expected body block, got {:?}", body);
        };

        assert!(matches!(inner[0], Stmt::Print(_)));
        assert!(matches!(inner[1], Stmt::Expression(Expr::Assign { .. })));
    }

    #[test]
    fn test_for_without_clauses_loops_on_true() {
        let (statements, errors) = parse_program("for (;;) break;");

        assert!(errors.is_empty());

        match &statements[0] {
            Stmt::While {
                condition, body, ..
            } => {
                assert_eq!(*condition, Expr::Literal(LiteralValue::True));
                assert!(matches!(body.as_ref(), Stmt::ControlFlow { .. }));
            }
            other => panic!("expected a bare while, got {:?}", other),
        }
    }

    #[test]
    fn test_synchronize_reports_every_error() {
        let (statements, errors) = parse_program("print 1 print 2; var = 3; print 4;");

        assert_eq!(
            errors,
            vec![
                "[line 1] Error at 'print': Expect ';' after value.".to_string(),
                "[line 1] Error at '=': Expect variable name.".to_string(),
            ]
        );

        // Only the final statement survives.
        assert_eq!(statements.len(), 1);
        assert!(matches!(statements[0], Stmt::Print(_)));
    }

    #[test]
    fn test_error_at_end() {
        let (_, errors) = parse_program("print 1");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0], "[line 1] Error at end: Expect ';' after value.");
    }

    #[test]
    fn test_invalid_assignment_target_is_not_fatal() {
        let (statements, errors) = parse_program("1 = 2; print 3;");

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            "[line 1] Error at '=': Invalid assignment target."
        );
        assert_eq!(statements.len(), 2);
    }

    #[test]
    fn test_argument_limit() {
        let args = vec!["0"; 128].join(", ");
        let (statements, errors) = parse_program(&format!("f({});", args));

        assert_eq!(errors.len(), 1);
        assert!(errors[0].ends_with("Can't have more than 127 arguments."));

        // The call still parses.
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_argument_limit_boundary() {
        let args = vec!["0"; 127].join(", ");
        let (_, errors) = parse_program(&format!("f({});", args));

        assert!(errors.is_empty());
    }

    fn declare_with_params(count: usize) -> String {
        let params: Vec<String> = (0..count).map(|i| format!("p{}", i)).collect();

        format!("fun f({}) {{}}", params.join(", "))
    }

    #[test]
    fn test_parameter_limit() {
        let (statements, errors) = parse_program(&declare_with_params(128));

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            "[line 1] Error at 'p127': Can't have more than 127 parameters."
        );

        // The declaration still parses with every parameter kept.
        assert_eq!(statements.len(), 1);

        match &statements[0] {
            Stmt::Function { name, function } => {
                assert_eq!(name.lexeme, "f");
                assert_eq!(function.arity(), 128);
            }
            other => panic!("expected a function declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_parameter_limit_boundary() {
        let (statements, errors) = parse_program(&declare_with_params(127));

        assert!(errors.is_empty());
        assert!(matches!(statements[0], Stmt::Function { .. }));
    }

    #[test]
    fn test_parse_expression_rejects_trailing_tokens() {
        let mut diagnostics = Diagnostics::new();
        let tokens = scan("1 2", &mut diagnostics);
        let expr = Parser::new(&tokens).parse_expression(&mut diagnostics);

        assert!(expr.is_none());
        assert_eq!(
            diagnostics.errors()[0].to_string(),
            "[line 1] Error at '2': Expect end of expression."
        );
    }
}

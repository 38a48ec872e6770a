#[cfg(test)]
mod resolver_tests {
    use loxwalk::ast::{Expr, ExprId, Stmt};
    use loxwalk::error::Diagnostics;
    use loxwalk::interpreter::{Address, Interpreter};
    use loxwalk::parser;
    use loxwalk::resolver::Resolver;
    use loxwalk::scanner::scan;
    use pretty_assertions::assert_eq;

    struct Resolved {
        interpreter: Interpreter<Vec<u8>>,
        printed: Vec<(String, ExprId)>,
        errors: Vec<String>,
    }

    impl Resolved {
        /// Address recorded for the n-th `print <variable>;` in the source.
        fn address(&self, n: usize) -> Option<Address> {
            self.interpreter.resolved(self.printed[n].1)
        }
    }

    /// Ids of every `print <variable>;`, in source order.
    fn printed_variables(statements: &[Stmt], out: &mut Vec<(String, ExprId)>) {
        for stmt in statements {
            match stmt {
                Stmt::Print(Expr::Variable { id, name }) => out.push((name.lexeme.clone(), *id)),
                Stmt::Block(inner) => printed_variables(inner, out),
                Stmt::Function { function, .. } => printed_variables(&function.body, out),
                _ => {}
            }
        }
    }

    fn resolve(source: &str) -> Resolved {
        let mut diagnostics = Diagnostics::new();
        let tokens = scan(source, &mut diagnostics);
        let statements = parser::parse(&tokens, &mut diagnostics);

        assert!(!diagnostics.had_error(), "{:?}", diagnostics.errors());

        let mut interpreter = Interpreter::with_output(Vec::new());
        let mut resolver = Resolver::new(&mut interpreter);
        resolver.resolve(&statements, &mut diagnostics);

        let mut printed = Vec::new();
        printed_variables(&statements, &mut printed);

        Resolved {
            interpreter,
            printed,
            errors: diagnostics.errors().iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn test_local_in_enclosing_block() {
        let r = resolve("{ var a = 1; { print a; } }");

        assert!(r.errors.is_empty());
        assert_eq!(r.address(0), Some(Address { depth: 1, slot: 0 }));
    }

    #[test]
    fn test_slots_follow_declaration_order() {
        let r = resolve("{ var a = 1; var b = 2; print b; print a; }");

        assert_eq!(r.printed[0].0, "b");
        assert_eq!(r.address(0), Some(Address { depth: 0, slot: 1 }));
        assert_eq!(r.address(1), Some(Address { depth: 0, slot: 0 }));
    }

    #[test]
    fn test_parameters_share_the_body_frame() {
        let r = resolve("fun f(x, y) { var z; print y; print z; }");

        assert!(r.errors.is_empty());
        assert_eq!(r.address(0), Some(Address { depth: 0, slot: 1 }));
        assert_eq!(r.address(1), Some(Address { depth: 0, slot: 2 }));
    }

    #[test]
    fn test_closure_reaches_outer_function_frame() {
        let r = resolve("fun outer() { var c = 0; fun inner() { print c; } }");

        assert_eq!(r.address(0), Some(Address { depth: 1, slot: 0 }));
    }

    #[test]
    fn test_globals_are_not_recorded() {
        let r = resolve("var g = 1; print g; { print g; }");

        assert_eq!(r.address(0), None);
        assert_eq!(r.address(1), None);
    }

    #[test]
    fn test_later_local_does_not_capture_earlier_reference() {
        let source = r#"
            var a = "outer";
            {
                fun f() { print a; }
                var a = "inner";
            }
        "#;
        let r = resolve(source);

        assert!(r.errors.is_empty());
        assert_eq!(r.address(0), None);
    }

    #[test]
    fn test_duplicate_local_is_an_error() {
        let r = resolve("{ var a = 1; var a = 2; }");

        assert_eq!(
            r.errors,
            vec!["[line 1] Error at 'a': Already a variable with this name in this scope."]
        );
    }

    #[test]
    fn test_duplicate_parameter_is_an_error() {
        let r = resolve("fun f(a, a) {}");

        assert_eq!(r.errors.len(), 1);
    }

    #[test]
    fn test_duplicate_global_is_allowed() {
        let r = resolve("var a = 1; var a = 2;");

        assert!(r.errors.is_empty());
    }

    #[test]
    fn test_local_self_reference_in_initializer() {
        let r = resolve("{ var a = a; }");

        assert_eq!(
            r.errors,
            vec!["[line 1] Error at 'a': Can't read local variable in its own initializer."]
        );

        let r = resolve("var a = a;");
        assert!(r.errors.is_empty());
    }

    #[test]
    fn test_top_level_return() {
        let r = resolve("return 1;");

        assert_eq!(
            r.errors,
            vec!["[line 1] Error at 'return': Can't return from top-level code."]
        );
    }

    #[test]
    fn test_break_outside_loop() {
        let r = resolve("break;");

        assert_eq!(
            r.errors,
            vec!["[line 1] Error at 'break': Can't use 'break' outside of a loop."]
        );
    }

    #[test]
    fn test_break_does_not_cross_function_boundary() {
        let r = resolve("while (true) { fun f() { break; } }");
        assert_eq!(r.errors.len(), 1);

        let r = resolve("while (true) { if (true) { break; } }");
        assert!(r.errors.is_empty());
    }

    #[test]
    fn test_every_error_is_reported() {
        let r = resolve("{ var a; var a; }\nreturn;\nbreak;");

        assert_eq!(r.errors.len(), 3);
        assert!(r.errors[1].starts_with("[line 2]"));
        assert!(r.errors[2].starts_with("[line 3]"));
    }
}

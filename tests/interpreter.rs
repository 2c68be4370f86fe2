#[cfg(test)]
mod interpreter_tests {
    use std::cell::RefCell;
    use std::io::{self, Write};
    use std::rc::Rc;

    use rox as lox;

    use lox::error::{ErrorKind, LoxError};
    use lox::session::{Failure, Session};
    use lox::value::Value;

    /// `Write` sink whose contents stay readable after the session owns it.
    #[derive(Clone, Default)]
    struct Captured(Rc<RefCell<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn lines(&self) -> Vec<String> {
            String::from_utf8_lossy(&self.0.borrow())
                .lines()
                .map(str::to_owned)
                .collect()
        }
    }

    fn run(source: &str) -> (Vec<String>, Result<(), Failure>) {
        let out = Captured::default();
        let mut session = Session::with_output(Box::new(out.clone()));
        let result = session.run(source);
        (out.lines(), result)
    }

    fn output(source: &str) -> Vec<String> {
        let (lines, result) = run(source);
        if let Err(failure) = result {
            panic!("program failed: {:?}", failure.errors());
        }
        lines
    }

    fn runtime_error(source: &str) -> (Vec<String>, LoxError) {
        match run(source) {
            (lines, Err(Failure::Runtime(error))) => (lines, error),
            (_, other) => panic!("expected a runtime error, got {:?}", other),
        }
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(output("print 1 + 2 * 3;"), vec!["7"]);
        assert_eq!(output("print (1 + 2) * 3;"), vec!["9"]);
        assert_eq!(output("print 10 / 4;"), vec!["2.5"]);
        assert_eq!(output("print -2 - -3;"), vec!["1"]);
    }

    #[test]
    fn test_literal_round_trip() {
        assert_eq!(
            output("print true; print nil; print 3.0; print \"s\"; print false;"),
            vec!["true", "nil", "3", "s", "false"]
        );
    }

    #[test]
    fn test_division_by_zero_is_ieee() {
        assert_eq!(
            output("print 1 / 0; print -1 / 0; print 0 / 0;"),
            vec!["Infinity", "-Infinity", "NaN"]
        );
    }

    #[test]
    fn test_truthiness() {
        assert_eq!(
            output("print !nil; print !0; print !\"\"; print !false;"),
            vec!["true", "false", "false", "true"]
        );
    }

    #[test]
    fn test_equality_without_coercion() {
        assert_eq!(
            output("print nil == nil; print nil == false; print 1 == \"1\"; print \"a\" == \"a\"; print 2 != 3;"),
            vec!["true", "false", "false", "true", "true"]
        );
    }

    #[test]
    fn test_logical_short_circuit_returns_operand() {
        let source = r#"
            var calls = 0;
            fun bump() { calls = calls + 1; return true; }
            print nil or "b";
            print "a" or bump();
            print false and bump();
            print 1 and 2;
            print calls;
        "#;
        assert_eq!(output(source), vec!["b", "a", "false", "2", "0"]);
    }

    #[test]
    fn test_block_scoping_shadows_and_restores() {
        assert_eq!(
            output("var a = 1; { var a = 2; print a; } print a;"),
            vec!["2", "1"]
        );
    }

    #[test]
    fn test_uninitialized_var_is_nil() {
        assert_eq!(output("var a; print a;"), vec!["nil"]);
    }

    #[test]
    fn test_closure_captures_environment() {
        let source = "fun make() { var i = 0; fun inc() { i = i + 1; return i; } return inc; } \
                      var c = make(); print c(); print c();";
        assert_eq!(output(source), vec!["1", "2"]);
    }

    #[test]
    fn test_closures_share_a_frame() {
        let source = r#"
            var get; var set;
            fun pair() {
                var v = "before";
                fun g() { return v; }
                fun s(x) { v = x; }
                get = g; set = s;
            }
            pair();
            set("after");
            print get();
        "#;
        assert_eq!(output(source), vec!["after"]);
    }

    #[test]
    fn test_resolution_is_static() {
        // `a` in show() is the global, even after a local `a` appears
        let source = r#"
            var a = "global";
            {
                fun show() { print a; }
                show();
                var a = "block";
                show();
            }
        "#;
        assert_eq!(output(source), vec!["global", "global"]);
    }

    #[test]
    fn test_for_loop_and_while() {
        assert_eq!(
            output("for (var i = 0; i < 3; i = i + 1) print i;"),
            vec!["0", "1", "2"]
        );
        assert_eq!(
            output("var n = 3; while (n > 0) { print n; n = n - 1; }"),
            vec!["3", "2", "1"]
        );
    }

    #[test]
    fn test_recursion_and_early_return() {
        let source = r#"
            fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }
            print fib(10);
            fun first() { while (true) { return "out"; } }
            print first();
            fun nothing() {}
            print nothing();
        "#;
        assert_eq!(output(source), vec!["55", "out", "nil"]);
    }

    #[test]
    fn test_forward_reference_to_later_global() {
        let source = "fun f() { return g(); } fun g() { return \"g\"; } print f();";
        assert_eq!(output(source), vec!["g"]);
    }

    #[test]
    fn test_inherited_method_binds_subclass_instance() {
        let source = "class A { greet() { return \"hi\"; } } class B < A {} var b = B(); print b.greet();";
        assert_eq!(output(source), vec!["hi"]);
    }

    #[test]
    fn test_super_uses_static_superclass() {
        let source = "class A { who() { return \"A\"; } } \
                      class B < A { who() { return super.who() + \"-B\"; } } \
                      print B().who();";
        assert_eq!(output(source), vec!["A-B"]);

        // deeper chain: super in B still means A when called on a C
        let source = r#"
            class A { m() { return "A"; } }
            class B < A { m() { return "B" + super.m(); } }
            class C < B { m() { return "C" + super.m(); } }
            print C().m();
        "#;
        assert_eq!(output(source), vec!["CBA"]);
    }

    #[test]
    fn test_initializer_and_fields() {
        let source = r#"
            class Point {
                init(x, y) { this.x = x; this.y = y; }
                sum() { return this.x + this.y; }
            }
            var p = Point(1, 2);
            print p.sum();
            p.x = 10;
            print p.sum();
            print p.init(3, 4) == p;
            print p.x;
        "#;
        assert_eq!(output(source), vec!["3", "12", "true", "3"]);
    }

    #[test]
    fn test_early_return_in_initializer_yields_instance() {
        let source = r#"
            class A { init() { this.v = 1; return; this.v = 2; } }
            print A().v;
        "#;
        assert_eq!(output(source), vec!["1"]);
    }

    #[test]
    fn test_method_extracted_keeps_this() {
        let source = r#"
            class Counter {
                init() { this.n = 0; }
                inc() { this.n = this.n + 1; return this.n; }
            }
            var c = Counter();
            var f = c.inc;
            f(); f();
            print c.n;
        "#;
        assert_eq!(output(source), vec!["2"]);
    }

    #[test]
    fn test_stringification() {
        let source = r#"
            fun f() {}
            class K {}
            print f;
            print K;
            print K();
            print clock;
        "#;
        assert_eq!(
            output(source),
            vec!["<fn f>", "K", "K instance", "<native fn>"]
        );
    }

    #[test]
    fn test_clock_returns_a_number() {
        assert_eq!(output("print clock() > 0;"), vec!["true"]);
    }

    #[test]
    fn test_arity_mismatch() {
        let (_, err) = runtime_error("fun f(a) {} f();");
        assert_eq!(err.message(), "Expected 1 arguments but got 0.");

        let (_, err) = runtime_error("fun f(a) {} f(1, 2);");
        assert_eq!(err.message(), "Expected 1 arguments but got 2.");

        let (_, err) = runtime_error("class A { init(a) {} } A();");
        assert_eq!(err.message(), "Expected 1 arguments but got 0.");
    }

    #[test]
    fn test_string_plus_number_is_type_error() {
        let (_, err) = runtime_error("print \"a\" + 1;");
        assert_eq!(err.kind(), ErrorKind::Runtime);
        assert_eq!(err.message(), "Operands must be two numbers or two strings.");
        assert_eq!(err.to_string(), "Operands must be two numbers or two strings.\n[line 1]");
    }

    #[test]
    fn test_operand_type_errors() {
        let (_, err) = runtime_error("print -\"x\";");
        assert_eq!(err.message(), "Operand must be a number.");

        let (_, err) = runtime_error("print 1 < \"2\";");
        assert_eq!(err.message(), "Operands must be numbers.");
        assert!(matches!(err, LoxError::Runtime { ref lexeme, .. } if lexeme == "<"));
    }

    #[test]
    fn test_undefined_names() {
        let (_, err) = runtime_error("print nope;");
        assert_eq!(err.message(), "Undefined variable 'nope'.");

        let (_, err) = runtime_error("nope = 1;");
        assert_eq!(err.message(), "Undefined variable 'nope'.");

        let (_, err) = runtime_error("class A {} print A().missing;");
        assert_eq!(err.message(), "Undefined property 'missing'.");

        let (_, err) = runtime_error("class A {} class B < A { m() { return super.gone(); } } B().m();");
        assert_eq!(err.message(), "Undefined property 'gone'.");
    }

    #[test]
    fn test_bad_callee_and_receivers() {
        let (_, err) = runtime_error("\"str\"();");
        assert_eq!(err.message(), "Can only call functions and classes.");

        let (_, err) = runtime_error("var x = 1; print x.y;");
        assert_eq!(err.message(), "Only instances have properties.");

        let (_, err) = runtime_error("var x = 1; x.y = 2;");
        assert_eq!(err.message(), "Only instances have fields.");

        let (_, err) = runtime_error("var NotClass = 1; class B < NotClass {}");
        assert_eq!(err.message(), "Superclass must be a class.");
    }

    #[test]
    fn test_runtime_error_keeps_earlier_output() {
        let (lines, err) = runtime_error("print 1;\nprint 2;\nprint nil + 1;\nprint 3;");
        assert_eq!(lines, vec!["1", "2"]);
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_runtime_error_inside_call_restores_scope() {
        let out = Captured::default();
        let mut session = Session::with_output(Box::new(out.clone()));

        assert!(session.run("var a = \"global\"; fun f() { var a = 1; a + nil; } f();").is_err());
        session.run("print a;").expect("second unit runs");

        assert_eq!(out.lines(), vec!["global"]);
    }

    #[test]
    fn test_session_keeps_globals_between_units() {
        let out = Captured::default();
        let mut session = Session::with_output(Box::new(out.clone()));

        session
            .run("fun counter() { var n = 0; fun next() { n = n + 1; return n; } return next; }")
            .unwrap();
        session.run("var c = counter();").unwrap();
        session.run("c();").unwrap();
        session.run("print c();").unwrap();

        assert_eq!(out.lines(), vec!["2"]);
    }

    #[test]
    fn test_static_error_prevents_any_output() {
        let (lines, result) = run("print 1;\nprint (;");
        assert!(lines.is_empty());

        let Err(Failure::Static(errors)) = result else {
            panic!("expected static failure");
        };
        assert_eq!(errors[0].kind(), ErrorKind::Parse);
        assert_eq!(errors[0].line(), Some(2));
    }

    #[test]
    fn test_lex_and_parse_errors_reported_together() {
        let (_, result) = run("var a = $;\nprint ;");
        let Err(Failure::Static(errors)) = result else {
            panic!("expected static failure");
        };

        let kinds: Vec<ErrorKind> = errors.iter().map(LoxError::kind).collect();
        assert!(kinds.contains(&ErrorKind::Lex));
        assert!(kinds.contains(&ErrorKind::Parse));
    }

    #[test]
    fn test_host_natives() {
        fn double(args: &[Value]) -> Result<Value, String> {
            match args {
                [Value::Number(n)] => Ok(Value::Number(n * 2.0)),
                _ => Err("double wants a number".to_string()),
            }
        }

        let out = Captured::default();
        let mut session = Session::with_output(Box::new(out.clone()));
        session.interpreter_mut().define_native("double", 1, double);

        session.run("print double(21);").unwrap();
        assert_eq!(out.lines(), vec!["42"]);

        let err = session.run("double(\"x\");").unwrap_err();
        assert!(matches!(err, Failure::Runtime(ref e) if e.message() == "double wants a number"));
    }
}

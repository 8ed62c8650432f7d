use scad_ir::{Assignment, BinaryOp, Expr, SharedExpr};

use super::*;
use crate::config::{EvalConfig, PrintTarget};
use crate::errors::EvalErrorKind;
use crate::timers::TimerError;

fn session() -> EvaluationSession {
    EvaluationSession::builder()
        .config(EvalConfig::default().with_print_target(PrintTarget::Buffer))
        .build()
}

fn try_call(session: &EvaluationSession, name: &str, args: Vec<SharedExpr>) -> EvalResult {
    let expr = Expr::call_named(name, args.into_iter().map(Assignment::positional).collect());
    Evaluator::new(session).eval(&expr, session.builtin_context())
}

fn call(session: &EvaluationSession, name: &str, args: Vec<SharedExpr>) -> Value {
    try_call(session, name, args).unwrap()
}

fn num(n: f64) -> SharedExpr {
    Expr::number(n)
}

fn nums(values: &[f64]) -> SharedExpr {
    Expr::vector(values.iter().copied().map(Expr::number).collect())
}

fn numbers(values: &[f64]) -> Value {
    Value::vector(values.iter().copied().map(Value::Number))
}

fn number(value: &Value) -> f64 {
    value.as_number().unwrap()
}

mod registry {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn experimental_entries_need_the_switch() {
        let registry = BuiltinRegistry::with_defaults();
        assert!(registry.function("sin", false).is_some());
        assert!(registry.function("is_object", false).is_none());
        assert!(registry.function("is_object", true).is_some());
        assert!(registry.function("no_such_function", true).is_none());
    }

    #[test]
    fn flags_availability() {
        assert!(BuiltinFlags::ENABLED.is_available(false));
        assert!(!BuiltinFlags::EXPERIMENTAL.is_available(false));
        assert!(BuiltinFlags::EXPERIMENTAL.is_available(true));
        assert!(!BuiltinFlags::empty().is_available(true));
    }

    #[test]
    fn registering_replaces_entries() {
        let mut registry = BuiltinRegistry::new();
        registry.register_function("answer", |_| Ok(Value::Number(41.0)), BuiltinFlags::ENABLED);
        registry.register_function("answer", |_| Ok(Value::Number(42.0)), BuiltinFlags::ENABLED);
        registry.register_module("cube", BuiltinFlags::ENABLED);
        assert_eq!(registry.function_count(), 1);
        assert_eq!(registry.module_count(), 1);

        let session = EvaluationSession::builder()
            .config(EvalConfig::default().with_print_target(PrintTarget::Buffer))
            .builtins(registry)
            .build();
        assert_eq!(call(&session, "answer", Vec::new()), Value::Number(42.0));
    }

    #[test]
    fn experimental_function_is_unknown_by_default() {
        let session = session();
        let value = call(&session, "is_object", vec![num(1.0)]);
        assert!(value.is_undefined());
        assert_eq!(
            session.output(),
            "WARNING: Ignoring unknown function 'is_object'\n"
        );
    }
}

mod math {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unary_functions() {
        let session = session();
        assert_eq!(call(&session, "abs", vec![num(-3.0)]), Value::Number(3.0));
        assert_eq!(call(&session, "sign", vec![num(-0.5)]), Value::Number(-1.0));
        assert_eq!(call(&session, "sqrt", vec![num(16.0)]), Value::Number(4.0));
        assert_eq!(call(&session, "floor", vec![num(2.7)]), Value::Number(2.0));
        assert_eq!(call(&session, "ceil", vec![num(2.1)]), Value::Number(3.0));
        assert_eq!(call(&session, "round", vec![num(2.5)]), Value::Number(3.0));
        assert_eq!(call(&session, "pow", vec![num(2.0), num(10.0)]), Value::Number(1024.0));
        assert_eq!(session.output(), "");
    }

    #[test]
    fn wrong_type_warns_with_value() {
        let session = session();
        assert!(call(&session, "abs", vec![Expr::string("a")]).is_undefined());
        assert_eq!(
            session.output(),
            "WARNING: abs() parameter could not be converted: argument 0: expected number, found string (\"a\")\n"
        );
    }

    #[test]
    fn wrong_count_warns() {
        let session = session();
        assert!(call(&session, "sqrt", Vec::new()).is_undefined());
        assert_eq!(
            session.output(),
            "WARNING: sqrt() number of parameters does not match: expected 1, found 0\n"
        );
    }

    #[test]
    fn log_bases() {
        let session = session();
        let ten = number(&call(&session, "log", vec![num(1000.0)]));
        assert!((ten - 3.0).abs() < 1e-12);
        let two = number(&call(&session, "log", vec![num(2.0), num(8.0)]));
        assert!((two - 3.0).abs() < 1e-12);
    }

    #[test]
    fn min_max_over_arguments_and_vectors() {
        let session = session();
        assert_eq!(
            call(&session, "min", vec![num(3.0), num(1.0), num(2.0)]),
            Value::Number(1.0)
        );
        assert_eq!(call(&session, "max", vec![nums(&[4.0, 9.0, 2.0])]), Value::Number(9.0));
        assert_eq!(call(&session, "max", vec![num(5.0)]), Value::Number(5.0));
    }

    #[test]
    fn min_without_operands_warns() {
        let session = session();
        assert!(call(&session, "min", Vec::new()).is_undefined());
        assert!(call(&session, "min", vec![nums(&[])]).is_undefined());
        assert_eq!(
            session.output(),
            "WARNING: min() number of parameters does not match: expected at least 1, found 0\n\
             WARNING: min() number of parameters does not match: expected at least 1 vector element, found 0\n"
        );
    }

    #[test]
    fn norm_and_cross() {
        let session = session();
        assert_eq!(call(&session, "norm", vec![nums(&[3.0, 4.0])]), Value::Number(5.0));
        assert_eq!(
            call(&session, "cross", vec![nums(&[1.0, 0.0, 0.0]), nums(&[0.0, 1.0, 0.0])]),
            numbers(&[0.0, 0.0, 1.0])
        );
        assert_eq!(
            call(&session, "cross", vec![nums(&[1.0, 2.0]), nums(&[3.0, 4.0])]),
            Value::Number(-2.0)
        );
        assert_eq!(session.output(), "");
    }

    #[test]
    fn cross_size_mismatch_warns() {
        let session = session();
        let value = call(&session, "cross", vec![nums(&[1.0, 2.0, 3.0]), nums(&[1.0, 2.0])]);
        assert!(value.is_undefined());
        assert_eq!(
            session.output(),
            "WARNING: Invalid vector size of parameter for cross()\n"
        );
    }

    #[test]
    fn norm_of_non_numbers_warns() {
        let session = session();
        let vector = Expr::vector(vec![num(1.0), Expr::string("a")]);
        assert!(call(&session, "norm", vec![vector]).is_undefined());
        assert_eq!(session.output(), "WARNING: Incorrect arguments to norm()\n");
    }

    #[test]
    fn lookup_interpolates_and_clamps() {
        let session = session();
        let table = || {
            Expr::vector(vec![nums(&[1.0, 10.0]), nums(&[2.0, 20.0])])
        };
        assert_eq!(call(&session, "lookup", vec![num(1.5), table()]), Value::Number(15.0));
        assert_eq!(call(&session, "lookup", vec![num(0.0), table()]), Value::Number(10.0));
        assert_eq!(call(&session, "lookup", vec![num(9.0), table()]), Value::Number(20.0));
    }

    #[test]
    fn trig_in_degrees() {
        let session = session();
        assert_eq!(call(&session, "sin", vec![num(30.0)]), Value::Number(0.5));
        assert_eq!(call(&session, "cos", vec![num(180.0)]), Value::Number(-1.0));
        assert_eq!(call(&session, "atan2", vec![num(1.0), num(1.0)]), Value::Number(45.0));
    }
}

mod lists_and_text {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn len_counts_elements_and_graphemes() {
        let session = session();
        assert_eq!(call(&session, "len", vec![nums(&[1.0, 2.0, 3.0])]), Value::Number(3.0));
        assert_eq!(
            call(&session, "len", vec![Expr::string("e\u{301}a")]),
            Value::Number(2.0)
        );
        assert!(call(&session, "len", vec![num(5.0)]).is_undefined());
        assert_eq!(
            session.output(),
            "WARNING: len() parameter could not be converted: argument 0: expected string, found number (5)\n"
        );
    }

    #[test]
    fn concat_splices_vectors() {
        let session = session();
        let value = call(
            &session,
            "concat",
            vec![nums(&[1.0, 2.0]), num(3.0), nums(&[4.0])],
        );
        assert_eq!(value, numbers(&[1.0, 2.0, 3.0, 4.0]));
    }

    #[test]
    fn concat_keeps_nested_vectors() {
        let session = session();
        let nested = Expr::vector(vec![nums(&[1.0]), nums(&[2.0])]);
        let value = call(&session, "concat", vec![nested]);
        assert_eq!(value, Value::vector([numbers(&[1.0]), numbers(&[2.0])]));
    }

    #[test]
    fn str_joins_plain_renderings() {
        let session = session();
        let mixed = Expr::vector(vec![num(1.0), Expr::string("b")]);
        let value = call(&session, "str", vec![Expr::string("a"), num(1.5), mixed]);
        assert_eq!(value, Value::from("a1.5[1, \"b\"]"));
    }

    #[test]
    fn chr_and_ord() {
        let session = session();
        assert_eq!(
            call(&session, "chr", vec![num(65.0), nums(&[66.0, 67.0])]),
            Value::from("ABC")
        );
        assert_eq!(
            call(&session, "chr", vec![Expr::range(num(97.0), None, num(99.0))]),
            Value::from("abc")
        );
        assert_eq!(call(&session, "chr", vec![num(0.0)]), Value::from(""));
        assert_eq!(call(&session, "ord", vec![Expr::string("A")]), Value::Number(65.0));
        assert!(call(&session, "ord", vec![Expr::string("")]).is_undefined());
        assert_eq!(session.output(), "");
    }
}

mod types {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn is_undef_on_unknown_variable_is_silent() {
        let session = session();
        assert_eq!(
            call(&session, "is_undef", vec![Expr::lookup("nope")]),
            Value::Bool(true)
        );
        assert_eq!(call(&session, "is_undef", vec![num(1.0)]), Value::Bool(false));
        assert_eq!(call(&session, "is_undef", vec![Expr::undef()]), Value::Bool(true));
        assert_eq!(session.output(), "");
    }

    #[test]
    fn predicates() {
        let session = session();
        assert_eq!(call(&session, "is_num", vec![num(1.0)]), Value::Bool(true));
        assert_eq!(call(&session, "is_num", vec![Expr::string("1")]), Value::Bool(false));
        assert_eq!(call(&session, "is_bool", vec![Expr::bool(false)]), Value::Bool(true));
        assert_eq!(call(&session, "is_string", vec![Expr::string("")]), Value::Bool(true));
        assert_eq!(call(&session, "is_list", vec![nums(&[])]), Value::Bool(true));
        let function = Expr::function(Vec::<Assignment>::new(), num(1.0));
        assert_eq!(call(&session, "is_function", vec![function]), Value::Bool(true));
    }

    #[test]
    fn is_num_rejects_nan() {
        let session = session();
        let nan = Expr::binary(BinaryOp::Div, num(0.0), num(0.0));
        assert_eq!(call(&session, "is_num", vec![nan]), Value::Bool(false));
    }

    #[test]
    fn version_numbers() {
        let session = session();
        assert_eq!(call(&session, "version", Vec::new()), numbers(&[2021.0, 1.0]));
        assert_eq!(call(&session, "version_num", Vec::new()), Value::Number(20_210_100.0));
        assert_eq!(
            call(&session, "version_num", vec![nums(&[2019.0, 5.0])]),
            Value::Number(20_190_500.0)
        );
        assert!(call(&session, "version_num", vec![nums(&[2019.0])]).is_undefined());
    }
}

mod timers {
    use super::*;
    use pretty_assertions::assert_eq;

    fn let_timer(body: SharedExpr) -> SharedExpr {
        Expr::let_in(
            vec![Assignment::new("t", Expr::call_named("timer_new", Vec::new()))],
            body,
        )
    }

    fn on_timer(name: &str) -> SharedExpr {
        Expr::call_named(name, vec![Assignment::positional(Expr::lookup("t"))])
    }

    #[test]
    fn start_stop_elapsed() {
        let session = session();
        let expr = let_timer(Expr::let_in(
            vec![
                Assignment::new("a", on_timer("timer_start")),
                Assignment::new("b", on_timer("timer_stop")),
            ],
            on_timer("timer_elapsed"),
        ));
        let elapsed = Evaluator::new(&session)
            .eval(&expr, session.builtin_context())
            .unwrap();
        assert!(number(&elapsed) >= 0.0);
        assert_eq!(session.output(), "");
    }

    #[test]
    fn stopping_an_idle_timer_is_fatal() {
        let session = session();
        let expr = let_timer(on_timer("timer_stop"));
        let err = Evaluator::new(&session)
            .eval(&expr, session.builtin_context())
            .unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::Timer(TimerError::NotRunning(0)));
        assert!(err.is_session_fatal());
        assert!(session.output().starts_with("ERROR: timer 0 is not running"));
    }

    #[test]
    fn unknown_timer_is_fatal() {
        let session = session();
        let err = try_call(&session, "timer_delete", vec![num(42.0)]).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::Timer(TimerError::UnknownId(42)));
    }

    #[test]
    fn invalid_timer_id_warns() {
        let session = session();
        assert!(call(&session, "timer_start", vec![num(-1.0)]).is_undefined());
        assert!(call(&session, "timer_start", vec![num(1.5)]).is_undefined());
        assert_eq!(
            session.output(),
            "WARNING: timer_start() invalid timer id -1\n\
             WARNING: timer_start() invalid timer id 1.5\n"
        );
    }
}

mod searching {
    use super::*;
    use pretty_assertions::assert_eq;

    /// `[["a",1],["b",2],["c",3],["d",4],["a",5],["b",6],["c",7],["d",8],["e",9]]`
    fn table() -> SharedExpr {
        let rows = "abcdabcde".chars().zip(1..).map(|(key, n)| {
            Expr::vector(vec![Expr::string(key.to_string()), num(f64::from(n))])
        });
        Expr::vector(rows.collect())
    }

    fn nested(groups: &[&[f64]]) -> Value {
        Value::vector(groups.iter().map(|group| numbers(group)))
    }

    #[test]
    fn number_reports_row_indices() {
        let session = session();
        let list = nums(&[1.0, 3.0, 5.0, 3.0]);
        assert_eq!(call(&session, "search", vec![num(3.0), list.clone()]), numbers(&[1.0]));
        assert_eq!(
            call(&session, "search", vec![num(3.0), list, num(0.0)]),
            numbers(&[1.0, 3.0])
        );
        assert_eq!(
            call(&session, "search", vec![num(3.0), table(), num(0.0), num(1.0)]),
            numbers(&[2.0])
        );
        assert_eq!(call(&session, "search", vec![num(42.0), nums(&[1.0])]), numbers(&[]));
    }

    #[test]
    fn string_in_string_searches_each_character() {
        let session = session();
        let text = || Expr::string("abcdabcd");
        assert_eq!(
            call(&session, "search", vec![Expr::string("a"), text()]),
            numbers(&[0.0])
        );
        assert_eq!(
            call(&session, "search", vec![Expr::string("a"), text(), num(0.0)]),
            nested(&[&[0.0, 4.0]])
        );
        // Without a match a single requested index is left out entirely.
        assert_eq!(
            call(&session, "search", vec![Expr::string("xb"), text()]),
            numbers(&[1.0])
        );
        assert_eq!(
            call(&session, "search", vec![Expr::string("ae"), text(), num(2.0)]),
            nested(&[&[0.0, 4.0], &[]])
        );
    }

    #[test]
    fn string_in_table_matches_the_column() {
        let session = session();
        assert_eq!(
            call(&session, "search", vec![Expr::string("abce"), table()]),
            numbers(&[0.0, 1.0, 2.0, 8.0])
        );
        assert_eq!(
            call(&session, "search", vec![Expr::string("abce"), table(), num(0.0)]),
            nested(&[&[0.0, 4.0], &[1.0, 5.0], &[2.0, 6.0], &[8.0]])
        );
        assert_eq!(session.output(), "");
    }

    #[test]
    fn short_table_row_aborts_the_search() {
        let session = session();
        let table = Expr::vector(vec![Expr::vector(vec![Expr::string("b")]), num(5.0)]);
        assert_eq!(
            call(&session, "search", vec![Expr::string("a"), table]),
            numbers(&[])
        );
        assert_eq!(
            session.output(),
            "WARNING: Invalid entry in search vector at index 1, required number of values in the entry: 1. Invalid entry: 5\n"
        );
    }

    #[test]
    fn vector_searches_each_element() {
        let session = session();
        let find = nums(&[1.0, 7.0, 10.0]);
        assert_eq!(
            call(&session, "search", vec![find.clone(), table(), num(1.0), num(1.0)]),
            Value::vector([Value::Number(0.0), Value::Number(6.0), numbers(&[])])
        );
        assert_eq!(
            call(&session, "search", vec![find, table(), num(0.0), num(1.0)]),
            nested(&[&[0.0], &[6.0], &[]])
        );
    }

    #[test]
    fn wrong_argument_count_warns() {
        let session = session();
        assert!(call(&session, "search", vec![num(1.0)]).is_undefined());
        assert!(call(&session, "search", vec![Expr::bool(true), nums(&[1.0])]).is_undefined());
        assert_eq!(
            session.output(),
            "WARNING: search() number of parameters does not match: expected between 2 and 4, found 1\n"
        );
    }
}

mod random_numbers {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rands(session: &EvaluationSession, args: &[f64]) -> Vec<f64> {
        let value = call(session, "rands", args.iter().copied().map(num).collect());
        value.as_vector().unwrap().iter().map(number).collect()
    }

    #[test]
    fn seed_argument_repeats_the_sequence() {
        let session = session();
        let first = rands(&session, &[0.0, 1.0, 5.0, 42.0]);
        let second = rands(&session, &[0.0, 1.0, 5.0, 42.0]);
        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
        assert!(first.iter().all(|n| (0.0..1.0).contains(n)));
        assert_eq!(rands(&session, &[0.0, 1.0, 2.0, -0.0]), rands(&session, &[0.0, 1.0, 2.0, 0.0]));
    }

    #[test]
    fn configured_seed_makes_sessions_agree() {
        let seeded = || {
            EvaluationSession::builder()
                .config(
                    EvalConfig::default()
                        .with_print_target(PrintTarget::Buffer)
                        .with_random_seed(7),
                )
                .build()
        };
        assert_eq!(rands(&seeded(), &[0.0, 10.0, 3.0]), rands(&seeded(), &[0.0, 10.0, 3.0]));
    }

    #[test]
    fn bounds_are_ordered_and_may_coincide() {
        let session = session();
        assert_eq!(rands(&session, &[2.0, 2.0, 3.0]), vec![2.0, 2.0, 2.0]);
        let swapped = rands(&session, &[5.0, 1.0, 20.0, 1.0]);
        assert_eq!(swapped.len(), 20);
        assert!(swapped.iter().all(|n| (1.0..5.0).contains(n)));
        assert_eq!(rands(&session, &[0.0, 1.0, -2.5]).len(), 2);
        assert_eq!(session.output(), "");
    }

    #[test]
    fn infinite_arguments_are_reset() {
        let session = session();
        assert_eq!(rands(&session, &[0.0, 1.0, f64::INFINITY]).len(), 1);
        let values = rands(&session, &[f64::NEG_INFINITY, 0.0, 4.0]);
        assert!(values.iter().all(|&n| n >= -f64::MAX / 2.0 && n < 0.0));
        assert!(session.output().starts_with(
            "WARNING: rands() cannot create an infinite number of results\n\
             WARNING: resetting number of results to 1\n\
             WARNING: rands() range min cannot be infinite\n\
             WARNING: resetting to -"
        ));
    }

    #[test]
    fn wrong_arguments_warn() {
        let session = session();
        assert!(call(&session, "rands", vec![num(0.0), num(1.0)]).is_undefined());
        assert!(call(&session, "rands", vec![num(0.0), num(1.0), Expr::string("3")]).is_undefined());
        let output = session.output();
        assert!(output.starts_with(
            "WARNING: rands() number of parameters does not match: expected 3 or 4, found 2\n"
        ));
        assert!(output.contains("rands() parameter could not be converted"));
    }
}

mod module_names {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parent_module_walks_the_module_stack() {
        let session = session();
        let _outer = session.push_module("outer".into());
        let _inner = session.push_module("inner".into());
        assert_eq!(call(&session, "parent_module", vec![]), Value::string("outer"));
        assert_eq!(call(&session, "parent_module", vec![num(0.0)]), Value::string("inner"));
        assert_eq!(call(&session, "parent_module", vec![num(1.9)]), Value::string("outer"));
        assert_eq!(session.output(), "");
    }

    #[test]
    fn out_of_range_index_warns() {
        let session = session();
        let _only = session.push_module("only".into());
        assert!(call(&session, "parent_module", vec![]).is_undefined());
        assert!(call(&session, "parent_module", vec![num(-1.0)]).is_undefined());
        assert!(call(&session, "parent_module", vec![Expr::string("x")]).is_undefined());
        let output = session.output();
        assert!(output.starts_with(
            "WARNING: Parent module index (1) greater than the number of modules on the stack\n\
             WARNING: Negative parent module index (-1) not allowed\n"
        ));
        assert!(output.contains("parent_module() parameter could not be converted"));
    }
}

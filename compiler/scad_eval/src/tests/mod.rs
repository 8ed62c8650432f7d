//! End-to-end evaluation scenarios.

use pretty_assertions::assert_eq;
use scad_ir::{Assignment, BinaryOp, Expr, Scope, SharedExpr, SourceFile, UserFunction};

use crate::{EvalConfig, EvalErrorKind, EvaluationSession, Evaluator, PrintTarget, Value};

fn session_with(config: EvalConfig) -> EvaluationSession {
    EvaluationSession::builder()
        .config(config.with_print_target(PrintTarget::Buffer))
        .build()
}

fn session() -> EvaluationSession {
    session_with(EvalConfig::default())
}

fn eval(session: &EvaluationSession, expr: &SharedExpr) -> Value {
    Evaluator::new(session)
        .eval(expr, session.builtin_context())
        .unwrap()
}

#[test]
fn top_level_assignments_see_earlier_ones() {
    let session = session();
    let scope = Scope::new()
        .with_assignment("x", Expr::number(5.0))
        .with_assignment(
            "y",
            Expr::binary(BinaryOp::Add, Expr::lookup("x"), Expr::number(3.0)),
        );
    let file = session.file_context(SourceFile::new("main.scad", scope)).unwrap();
    assert_eq!(
        file.frame().lookup_local_variable("y"),
        Some(&Value::Number(8.0))
    );
    assert_eq!(session.output(), "");
}

#[test]
fn mismatched_operands_name_both_types() {
    let session = session();
    let expr = Expr::binary(
        BinaryOp::Add,
        Expr::vector(vec![Expr::number(1.0), Expr::number(2.0)]),
        Expr::string("a"),
    );
    let value = eval(&session, &expr);
    let reasons = value.as_undef().map(|u| u.reasons().join(" ")).unwrap_or_default();
    assert!(reasons.contains("vector"));
    assert!(reasons.contains("string"));
}

#[test]
fn reversed_range_is_usable_and_deprecated() {
    let session = session();
    let value = eval(&session, &Expr::range(Expr::number(5.0), None, Expr::number(1.0)));
    assert_eq!(value.as_range().map(|r| r.num_values()), Some(5));
    assert!(session.output().starts_with("DEPRECATED: "));
}

#[test]
fn huge_comprehension_stops_with_a_warning() {
    let session = session();
    let expr = Expr::vector(vec![Expr::lc_for(
        vec![Assignment::new(
            "i",
            Expr::range(Expr::number(0.0), None, Expr::number(999_999_999.0)),
        )],
        Expr::lookup("i"),
    )]);
    let value = eval(&session, &expr);
    assert_eq!(value.as_vector().map(|v| v.len()), Some(0));
    assert_eq!(
        session.output(),
        "WARNING: Bad range parameter in for statement: too many elements (1000000000)\n"
    );
}

/// `function f(n) = n <= 1 ? 0 : f(n - 1);`
fn countdown() -> Scope {
    let body = Expr::ternary(
        Expr::binary(BinaryOp::LtEq, Expr::lookup("n"), Expr::number(1.0)),
        Expr::number(0.0),
        Expr::call_named(
            "f",
            vec![Assignment::positional(Expr::binary(
                BinaryOp::Sub,
                Expr::lookup("n"),
                Expr::number(1.0),
            ))],
        ),
    );
    Scope::new().with_function(UserFunction::new("f", vec![Assignment::parameter("n")], body))
}

fn call_f(n: f64) -> SharedExpr {
    Expr::call_named("f", vec![Assignment::positional(Expr::number(n))])
}

#[test]
fn tail_recursion_depth_does_not_use_native_stack() {
    // 100k nested native calls would never fit in this stack.
    let value = std::thread::Builder::new()
        .stack_size(1 << 20)
        .spawn(|| {
            let session = session_with(EvalConfig::default().with_stack_red_zone(64 * 1024));
            let file = session
                .file_context(SourceFile::new("main.scad", countdown()))
                .unwrap();
            Evaluator::new(&session)
                .eval(&call_f(100_000.0), &file)
                .map(|value| value.as_number())
                .map_err(|err| err.message)
        })
        .unwrap()
        .join()
        .unwrap();
    assert_eq!(value, Ok(Some(0.0)));
}

#[test]
fn default_ceiling_allows_a_million_tail_calls() {
    let session = session();
    let file = session
        .file_context(SourceFile::new("main.scad", countdown()))
        .unwrap();
    let evaluator = Evaluator::new(&session);
    assert_eq!(
        evaluator.eval(&call_f(1_000_000.0), &file).unwrap(),
        Value::Number(0.0)
    );
    let err = evaluator.eval(&call_f(1_000_001.0), &file).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::Recursion { name: "f".to_owned() });
    assert_eq!(
        session.output(),
        "ERROR: Recursion detected calling function 'f'\nTRACE: called by 'f'\n"
    );
}

#[test]
fn tail_recursion_past_the_ceiling_is_an_error() {
    let session = session_with(EvalConfig::default().with_recursion_limit(10_000));
    let file = session
        .file_context(SourceFile::new("main.scad", countdown()))
        .unwrap();
    let evaluator = Evaluator::new(&session);
    assert_eq!(
        evaluator.eval(&call_f(10_000.0), &file).unwrap(),
        Value::Number(0.0)
    );
    let err = evaluator.eval(&call_f(10_001.0), &file).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::Recursion { name: "f".to_owned() });
}

#[test]
fn closure_cycles_are_reclaimed_after_evaluation() {
    let session = session();
    let identity = Expr::function(vec![Assignment::parameter("x")], Expr::lookup("x"));
    let expr = Expr::let_in(
        vec![Assignment::new("g", identity)],
        Expr::call_named("g", vec![Assignment::positional(Expr::number(1.0))]),
    );
    assert_eq!(eval(&session, &expr), Value::Number(1.0));

    assert!(session.managed_context_count() > 0);
    session.collect_garbage();
    assert_eq!(session.managed_context_count(), 0);
    assert_eq!(session.accounting().contexts(), 0);
}

#[test]
fn failed_assert_in_a_function_is_traced_to_its_caller() {
    let session = session();
    let body = Expr::assert(
        vec![
            Assignment::positional(Expr::binary(
                BinaryOp::Gt,
                Expr::lookup("x"),
                Expr::number(0.0),
            )),
            Assignment::positional(Expr::string("positive")),
        ],
        Some(Expr::lookup("x")),
    );
    let scope =
        Scope::new().with_function(UserFunction::new("check", vec![Assignment::parameter("x")], body));
    let file = session.file_context(SourceFile::new("main.scad", scope)).unwrap();
    let call = Expr::call_named("check", vec![Assignment::positional(Expr::number(-1.0))]);
    let err = Evaluator::new(&session).eval(&call, &file).unwrap_err();

    assert_eq!(err.message, "Assertion '(x > 0)' failed: \"positive\"");
    assert_eq!(
        session.output(),
        "ERROR: Assertion '(x > 0)' failed: \"positive\"\nTRACE: called by 'check'\n"
    );
}

use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::*;
use crate::Location;

fn num(n: f64) -> SharedExpr {
    Expr::number(n)
}

#[test]
fn test_format_number_integral_and_fractional() {
    assert_eq!(format_number(8.0), "8");
    assert_eq!(format_number(-3.0), "-3");
    assert_eq!(format_number(0.5), "0.5");
    assert_eq!(format_number(0.1), "0.1");
    assert_eq!(format_number(1_000_000.0), "1000000");
}

#[test]
fn test_format_number_special_values() {
    assert_eq!(format_number(f64::NAN), "nan");
    assert_eq!(format_number(f64::INFINITY), "inf");
    assert_eq!(format_number(f64::NEG_INFINITY), "-inf");
    assert_eq!(format_number(0.0), "0");
    assert_eq!(format_number(-0.0), "-0");
}

#[test]
fn test_format_number_exponent() {
    assert_eq!(format_number(1e21), "1e+21");
    assert_eq!(format_number(2.5e-7), "2.5e-07");
    assert_eq!(format_number(-1e100), "-1e+100");
}

#[test]
fn test_display_binary_and_ternary() {
    let expr = Expr::ternary(
        Expr::binary(BinaryOp::Lt, Expr::lookup("n"), num(1.0)),
        num(0.0),
        Expr::binary(BinaryOp::Add, Expr::lookup("n"), num(2.0)),
    );
    assert_eq!(expr.to_string(), "((n < 1) ? 0 : (n + 2))");
}

#[test]
fn test_display_function_literal() {
    let params: ParameterList = Rc::from(vec![
        Assignment::parameter("a"),
        Assignment::new("b", num(1.0)),
    ]);
    let expr = Expr::function(
        params,
        Expr::binary(BinaryOp::Mul, Expr::lookup("a"), Expr::lookup("b")),
    );
    assert_eq!(expr.to_string(), "function(a, b = 1) (a * b)");
}

#[test]
fn test_display_calls() {
    let named = Expr::call_named(
        "f",
        vec![
            Assignment::positional(num(1.0)),
            Assignment::new("x", Expr::string("s")),
        ],
    );
    assert_eq!(named.to_string(), "f(1, x = \"s\")");

    let anonymous = Expr::call(Expr::index(Expr::lookup("fs"), num(0.0)), vec![]);
    assert_eq!(anonymous.to_string(), "(fs[0])()");
}

#[test]
fn test_display_vector_range_and_comprehension() {
    let comprehension = Expr::vector(vec![Expr::lc_for(
        vec![Assignment::new(
            "i",
            Expr::range(num(0.0), Some(num(2.0)), num(10.0)),
        )],
        Expr::lc_if(
            Expr::binary(BinaryOp::Gt, Expr::lookup("i"), num(3.0)),
            Expr::lookup("i"),
            None,
        ),
    )]);
    assert_eq!(
        comprehension.to_string(),
        "[for(i = [0 : 2 : 10]) (if((i > 3)) (i))]"
    );
}

#[test]
fn test_display_escapes_strings() {
    assert_eq!(Expr::string("a\"b\\c\n").to_string(), "\"a\\\"b\\\\c\\n\"");
}

#[test]
fn test_is_literal() {
    assert!(Expr::vector(vec![num(1.0), Expr::string("a")]).is_literal());
    assert!(Expr::range(num(0.0), None, num(3.0)).is_literal());
    assert!(!Expr::vector(vec![Expr::lookup("x")]).is_literal());
    assert!(!Expr::call_named("f", vec![]).is_literal());
}

#[test]
fn test_scope_duplicate_assignment_keeps_position() {
    let mut scope = Scope::new();
    scope.add_assignment(Assignment::new("a", num(1.0)));
    scope.add_assignment(Assignment::new("b", num(2.0)));
    scope.add_assignment(Assignment::new("a", num(3.0)).at(Location::line(None, 9)));

    let names: Vec<&str> = scope.assignments().iter().map(|a| &*a.name).collect();
    assert_eq!(names, vec!["a", "b"]);
    let first = &scope.assignments()[0];
    assert_eq!(first.expr.as_deref(), Some(&*num(3.0)));
    assert_eq!(first.overwrite_location, Some(Location::line(None, 9)));
}

#[test]
fn test_scope_lookup_members() {
    let scope = Scope::new()
        .with_function(UserFunction::new("f", Vec::<Assignment>::new(), num(1.0)))
        .with_module(UserModule::new("m", Vec::<Assignment>::new(), Scope::new()))
        .with_using("lib");
    assert!(scope.lookup_function("f").is_some());
    assert!(scope.lookup_function("m").is_none());
    assert!(scope.lookup_module("m").is_some());
    assert_eq!(scope.usings(), &[Rc::<str>::from("lib")]);
    assert!(!scope.is_empty());
}

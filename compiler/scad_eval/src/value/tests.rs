use super::*;
use pretty_assertions::assert_eq;

fn n(x: f64) -> Value {
    Value::Number(x)
}

fn v(values: &[f64]) -> Value {
    Value::vector(values.iter().copied().map(Value::Number))
}

fn reason(value: &Value) -> String {
    value
        .as_undef()
        .map(|u| u.reasons().join(" / "))
        .unwrap_or_default()
}

mod arithmetic {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers() {
        assert_eq!(n(5.0).plus(&n(3.0)), n(8.0));
        assert_eq!(n(5.0).minus(&n(3.0)), n(2.0));
        assert_eq!(n(5.0).multiply(&n(3.0)), n(15.0));
        assert_eq!(n(6.0).divide(&n(3.0)), n(2.0));
        assert_eq!(n(-7.0).modulo(&n(3.0)), n(-1.0));
        assert_eq!(n(2.0).power(&n(10.0)), n(1024.0));
    }

    #[test]
    fn vectors_truncate_to_shorter() {
        assert_eq!(v(&[1.0, 2.0, 3.0]).plus(&v(&[10.0, 20.0])), v(&[11.0, 22.0]));
        assert_eq!(v(&[1.0, 2.0]).minus(&v(&[1.0, 1.0])), v(&[0.0, 1.0]));
    }

    #[test]
    fn vector_plus_string_is_undefined() {
        let result = v(&[1.0, 2.0]).plus(&Value::from("a"));
        assert!(result.is_undefined());
        assert_eq!(reason(&result), "undefined operation (vector + string)");
    }

    #[test]
    fn scaling() {
        assert_eq!(v(&[1.0, 2.0]).multiply(&n(2.0)), v(&[2.0, 4.0]));
        assert_eq!(n(3.0).multiply(&v(&[1.0, 2.0])), v(&[3.0, 6.0]));
        assert_eq!(v(&[2.0, 4.0]).divide(&n(2.0)), v(&[1.0, 2.0]));
        assert_eq!(n(8.0).divide(&v(&[2.0, 4.0])), v(&[4.0, 2.0]));
    }

    #[test]
    fn dot_product() {
        assert_eq!(v(&[1.0, 2.0, 3.0]).multiply(&v(&[4.0, 5.0, 6.0])), n(32.0));
        let mismatch = v(&[1.0, 2.0]).multiply(&v(&[1.0]));
        assert_eq!(reason(&mismatch), "vector*vector requires matching lengths (2 != 1)");
    }

    #[test]
    fn matrix_products() {
        let identity = Value::vector([v(&[1.0, 0.0]), v(&[0.0, 1.0])]);
        let m = Value::vector([v(&[1.0, 2.0]), v(&[3.0, 4.0])]);
        assert_eq!(m.multiply(&v(&[1.0, 1.0])), v(&[3.0, 7.0]));
        assert_eq!(v(&[1.0, 1.0]).multiply(&m), v(&[4.0, 6.0]));
        assert_eq!(m.multiply(&identity), m);
    }

    #[test]
    fn matrix_errors_carry_row_context() {
        let ragged = Value::vector([v(&[1.0, 2.0]), v(&[3.0])]);
        let m = Value::vector([v(&[1.0, 2.0]), v(&[3.0, 4.0])]);
        assert_eq!(
            reason(&ragged.multiply(&v(&[1.0, 1.0]))),
            "Matrix must be rectangular. Problem at row 1"
        );
        let bad = Value::vector([Value::vector([Value::from("x"), n(1.0)]), v(&[1.0, 2.0])]);
        let product = bad.multiply(&m);
        assert_eq!(
            reason(&product),
            "Vector must contain only numbers. Problem at index 0 / while processing left operand at row 0"
        );
        assert_eq!(
            reason(&Value::vector([]).multiply(&m)),
            "Multiplication is undefined on empty vectors"
        );
    }

    #[test]
    fn negation() {
        assert_eq!(n(2.0).negate(), n(-2.0));
        assert_eq!(v(&[1.0, -2.0]).negate(), v(&[-1.0, 2.0]));
        assert_eq!(reason(&Value::from("s").negate()), "undefined operation (-string)");
        assert_eq!(Value::undefined().logical_not(), Value::Bool(true));
    }
}

mod comparison {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mixed_types_are_unequal() {
        assert_eq!(n(1.0).equals(&Value::from("1")), Value::Bool(false));
        assert_eq!(n(1.0).not_equals(&Value::from("1")), Value::Bool(true));
        assert_eq!(Value::undefined().equals(&Value::undefined()), Value::Bool(true));
    }

    #[test]
    fn vectors_compare_lexicographically() {
        assert_eq!(v(&[1.0, 2.0]).less(&v(&[1.0, 3.0])), Value::Bool(true));
        assert_eq!(v(&[1.0, 2.0]).less(&v(&[1.0, 2.0, 0.0])), Value::Bool(true));
        assert_eq!(v(&[2.0]).less(&v(&[1.0, 5.0])), Value::Bool(false));
        assert_eq!(v(&[1.0, 2.0]).less_equal(&v(&[1.0, 2.0])), Value::Bool(true));
        assert_eq!(v(&[1.0, 2.0]).greater_equal(&v(&[1.0, 3.0])), Value::Bool(false));
        assert_eq!(v(&[1.0, 2.0]).equals(&v(&[1.0, 2.0])), Value::Bool(true));
        assert_eq!(v(&[1.0, 2.0]).equals(&v(&[1.0])), Value::Bool(false));
    }

    #[test]
    fn vector_comparison_reports_failing_index() {
        let a = Value::vector([n(1.0), Value::from("a")]);
        let b = Value::vector([n(1.0), n(2.0)]);
        let result = a.less(&b);
        assert_eq!(
            reason(&result),
            "undefined operation (string < number) / in vector comparison at index 1"
        );
    }

    #[test]
    fn undefined_orderings() {
        assert_eq!(
            reason(&Value::undefined().less(&Value::undefined())),
            "operation undefined (undefined < undefined)"
        );
        assert_eq!(
            reason(&n(1.0).greater_equal(&Value::from("x"))),
            "undefined operation (number >= string)"
        );
        let obj = Value::Object(ObjectBuilder::new().build());
        assert_eq!(reason(&obj.equals(&obj)), "operation undefined (object == object)");
        assert_eq!(reason(&obj.not_equals(&obj)), "operation undefined (object != object)");
    }

    #[test]
    fn strings_and_bools() {
        assert_eq!(Value::from("abc").less(&Value::from("abd")), Value::Bool(true));
        assert_eq!(Value::Bool(false).less(&Value::Bool(true)), Value::Bool(true));
    }

    #[test]
    fn nan_compares_false() {
        assert_eq!(n(f64::NAN).less(&n(1.0)), Value::Bool(false));
        assert_eq!(n(f64::NAN).equals(&n(f64::NAN)), Value::Bool(false));
    }
}

mod indexing {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strings_index_by_grapheme() {
        let s = Value::from("ae\u{301}z");
        assert_eq!(s.index(&n(1.0)), Value::from("e\u{301}"));
        assert_eq!(s.index(&n(2.0)), Value::from("z"));
        assert!(s.index(&n(3.0)).is_undefined());
        assert!(s.index(&n(-1.0)).is_undefined());
    }

    #[test]
    fn vector_out_of_bounds() {
        let result = v(&[1.0, 2.0]).index(&n(5.0));
        assert_eq!(reason(&result), "index 5 out of bounds for vector of size 2");
        assert_eq!(v(&[1.0, 2.0]).index(&n(1.7)), n(2.0));
    }

    #[test]
    fn ranges_and_objects() {
        let r = Value::range(RangeType::new(1.0, 2.0, 9.0));
        assert_eq!(r.index(&n(0.0)), n(1.0));
        assert_eq!(r.index(&n(1.0)), n(2.0));
        assert_eq!(r.index(&n(2.0)), n(9.0));
        assert!(r.index(&n(3.0)).is_undefined());

        let mut builder = ObjectBuilder::new();
        builder.set("a", n(1.0));
        let obj = Value::Object(builder.build());
        assert_eq!(obj.index(&Value::from("a")), n(1.0));
        assert!(obj.index(&Value::from("b")).is_undefined());
    }

    #[test]
    fn mismatched_index() {
        assert_eq!(
            reason(&n(1.0).index(&n(0.0))),
            "undefined operation number[number]"
        );
    }

    #[test]
    fn member_access() {
        let p = v(&[1.0, 2.0, 3.0]);
        assert_eq!(p.member("x"), n(1.0));
        assert_eq!(p.member("b"), n(3.0));
        assert_eq!(p.member("zyx"), v(&[3.0, 2.0, 1.0]));
        assert!(p.member("xg").is_undefined());
        let r = Value::range(RangeType::new(0.0, 5.0, 10.0));
        assert_eq!(r.member("step"), n(5.0));
        assert!(n(1.0).member("x").is_undefined());
    }
}

mod rendering {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scalars() {
        assert_eq!(Value::undefined().to_string(), "undef");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(n(8.0).to_string(), "8");
        assert_eq!(n(0.25).to_string(), "0.25");
        assert_eq!(Value::from("hi").to_string(), "hi");
        assert_eq!(Value::from("hi").to_echo_string(), "\"hi\"");
    }

    #[test]
    fn nested_strings_are_quoted() {
        let value = Value::vector([n(1.0), Value::from("a"), v(&[2.0])]);
        assert_eq!(value.to_string(), "[1, \"a\", [2]]");
    }

    #[test]
    fn ranges_and_objects() {
        assert_eq!(
            Value::range(RangeType::new(0.0, 0.5, 2.0)).to_string(),
            "[0 : 0.5 : 2]"
        );
        let mut builder = ObjectBuilder::new();
        builder.set("a", n(1.0));
        builder.set("b", Value::from("x"));
        builder.set("a", n(2.0));
        assert_eq!(Value::Object(builder.build()).to_string(), "{ a = 2; b = \"x\"; }");
    }
}

mod undef_reports {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn report_is_taken_once() {
        let value = Value::undef("first").with_undef_reason("second");
        assert!(value.is_unchecked_undef());
        assert_eq!(value.take_undef_report().as_deref(), Some("first\n\tsecond"));
        assert!(!value.is_unchecked_undef());
        assert_eq!(value.take_undef_report(), None);
        // The reasons stay readable.
        assert_eq!(value.as_undef().map(|u| u.reasons().len()), Some(2));
    }

    #[test]
    fn plain_undef_has_nothing_to_report() {
        assert_eq!(Value::undefined().take_undef_report(), None);
    }
}

#[test]
fn truthiness() {
    assert!(!Value::undefined().to_bool());
    assert!(!n(0.0).to_bool());
    assert!(n(0.1).to_bool());
    assert!(!Value::from("").to_bool());
    assert!(!Value::vector([]).to_bool());
    assert!(v(&[0.0]).to_bool());
    assert!(Value::range(RangeType::EMPTY).to_bool());
}

#[test]
fn clones_are_equal_and_share_storage() {
    let original = Value::vector([n(1.0), Value::from("s")]);
    let copy = original.clone();
    assert_eq!(copy, original);
    assert!(copy.as_vector().is_some_and(|c| original.as_vector().is_some_and(|o| c.ptr_eq(o))));
}

#[test]
fn type_names() {
    assert_eq!(Value::undefined().type_name(), "undefined");
    assert_eq!(Value::EmbeddedVector(EmbeddedVectorType::empty()).type_name(), "vector");
    assert_eq!(Value::range(RangeType::EMPTY).type_name(), "range");
}

use calculator::{CalcError, Calculator, ErrorKind, evaluate};

fn error_kind(input: &str) -> ErrorKind {
    match evaluate(input) {
        Ok(value) => panic!("{input:?} evaluated to {value}, expected a failure"),
        Err(e) => e.kind(),
    }
}

#[test]
fn matches_native_arithmetic() {
    let cases: &[(&str, f64)] = &[
        ("1 + 2 * 3", 1.0 + 2.0 * 3.0),
        ("1 - 2 - 3", 1.0 - 2.0 - 3.0),
        ("8 / 4 / 2", 8.0 / 4.0 / 2.0),
        ("2 * 3 / 4 * 5", 2.0 * 3.0 / 4.0 * 5.0),
        ("10 - 4 / 8 + 0.5", 10.0 - 4.0 / 8.0 + 0.5),
        ("0.1 + 0.2", 0.1 + 0.2),
        ("1 / 3", 1.0 / 3.0),
        ("1.5e3 - .25", 1.5e3 - 0.25),
        ("-3 * -(2 - 7)", -3.0 * -(2.0 - 7.0)),
    ];
    for &(input, expected) in cases {
        assert_eq!(evaluate(input).unwrap(), expected, "{input}");
    }
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(evaluate("(2+3)*4").unwrap(), 20.0);
    assert_eq!(evaluate("2+3*4").unwrap(), 14.0);
    assert_eq!(evaluate("((((1))))").unwrap(), 1.0);
}

#[test]
fn unary_signs_chain() {
    assert_eq!(evaluate("--5").unwrap(), 5.0);
    assert_eq!(evaluate("-+5").unwrap(), -5.0);
    assert_eq!(evaluate("+-+-5").unwrap(), 5.0);
    assert_eq!(evaluate("2--3").unwrap(), 5.0);
}

#[test]
fn division_by_zero_has_no_result() {
    assert_eq!(error_kind("1/0"), ErrorKind::Arithmetic);
    assert_eq!(error_kind("1/(3-3)"), ErrorKind::Arithmetic);
    assert_eq!(error_kind("1/-0"), ErrorKind::Arithmetic);
    assert_eq!(evaluate("1/0").unwrap_err().to_string(), "divide by zero");
}

#[test]
fn modulo_truncates_to_integers() {
    assert_eq!(evaluate("7.5 % 2").unwrap(), 1.0);
    assert_eq!(evaluate("7 % 2.9").unwrap(), 1.0);
    assert_eq!(evaluate("-7 % 3").unwrap(), -1.0);
    assert_eq!(evaluate("7 % -3").unwrap(), 1.0);
    assert_eq!(evaluate("1 + 10 % 4").unwrap(), 3.0);
}

#[test]
fn modulo_by_truncated_zero_fails() {
    let err = evaluate("5 % 0.5").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Arithmetic);
    assert!(matches!(err, CalcError::ModuloByZero(_)));
    assert_eq!(err.to_string(), "modulo by zero");
    assert_eq!(error_kind("5 % 0"), ErrorKind::Arithmetic);
}

#[test]
fn leading_terminators_are_skipped() {
    assert_eq!(evaluate(";;3+4").unwrap(), 7.0);
    assert_eq!(evaluate(" ; ; 3+4;").unwrap(), 7.0);
}

#[test]
fn bad_tokens_fail_cleanly() {
    let err = evaluate("3+@2").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lexical);
    assert_eq!(err.to_string(), "Bad token '@'");
    assert_eq!(error_kind("2 ^ 3"), ErrorKind::Lexical);
    assert_eq!(error_kind("x"), ErrorKind::Lexical);
}

#[test]
fn unbalanced_parentheses_fail() {
    let err = evaluate("(1+2").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.to_string(), "')' expected");

    assert_eq!(evaluate("(1+2;").unwrap_err().to_string(), "')' expected");
    assert_eq!(evaluate(")").unwrap_err().to_string(), "primary expected");
}

#[test]
fn incomplete_expressions_fail() {
    for input in ["", ";", "1 +", "2 * ", "-", "()"] {
        let err = evaluate(input).unwrap_err();
        assert_eq!(err.to_string(), "primary expected", "{input:?}");
    }
}

#[test]
fn malformed_numbers_are_syntax_errors() {
    let err = evaluate("1 + .").unwrap_err();
    assert!(matches!(err, CalcError::MalformedNumber(_)));
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn trailing_garbage_is_a_syntax_error() {
    assert!(matches!(
        evaluate("2+2)").unwrap_err(),
        CalcError::TrailingInput(_)
    ));
    assert!(matches!(
        evaluate("2 3").unwrap_err(),
        CalcError::TrailingInput(_)
    ));
    assert_eq!(evaluate("2+2;").unwrap(), 4.0);
}

#[test]
fn pushback_never_overflows_on_valid_input() {
    let inputs = [
        "1",
        "-(1)",
        "1+2-3+4",
        "1*2/3%4",
        "((1+2)*(3-4))/-(5%3)",
        "7 % 3 % 2 * 4 + 1",
        ";;;(((1)));;",
        "-+-+-+1 - -2 * +3",
    ];
    for input in inputs {
        match evaluate(input) {
            Ok(_) => {}
            Err(e) => panic!("{input:?} failed: {e}"),
        }
    }

    let invalid = ["(1+2", "1/0", "3+@", "2 2", "*", "5 % 0.1"];
    for input in invalid {
        assert_ne!(error_kind(input), ErrorKind::Internal, "{input:?}");
    }
}

#[test]
fn deep_nesting_is_an_error_not_a_crash() {
    let input = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
    assert!(matches!(
        evaluate(&input).unwrap_err(),
        CalcError::TooDeep(_)
    ));

    let input = format!("{}1", "-".repeat(10_000));
    assert!(matches!(
        evaluate(&input).unwrap_err(),
        CalcError::TooDeep(_)
    ));
}

#[test]
fn long_modulo_chains_hit_the_depth_limit() {
    let input = format!("{}7", "7%".repeat(10_000));
    assert!(matches!(
        evaluate(&input).unwrap_err(),
        CalcError::TooDeep(_)
    ));

    assert_eq!(evaluate("100 % 47 % 9 % 5").unwrap(), 1.0);
}

#[test]
fn calculators_are_independent() {
    let calc = Calculator::new();
    assert_eq!(calc.calculate("(1"), None);
    assert_eq!(calc.calculate("2*3"), Some(6.0));
    assert_eq!(calc.calculate("2*3)"), None);
    assert_eq!(calc.calculate("4"), Some(4.0));
}

#[test]
fn diagnostics_render_with_source() {
    let err = evaluate("1 + (2 * 3").unwrap_err();
    let rendered = format!("{:?}", miette::Report::new(err));
    assert!(rendered.contains("')' expected"), "{rendered}");
    assert!(rendered.contains("1 + (2 * 3"), "{rendered}");
}

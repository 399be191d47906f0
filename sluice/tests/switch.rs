#[macro_use]
mod common;

use sluice::cell::Cell;
use sluice::eval::Error::{DispatchError, InvalidProcedure, InvalidSyntax, InvalidUsePrimitive};
use sluice::eval::Evaluator;
use sluice::parse;
use sluice::switch::Error::UnrecognizedInput;

#[test]
fn negate_or_identity() {
    evals![
        "(switch -3 (negative? negate) (else identity))" => "3",
        "(switch 4 (negative? negate) (else identity))" => "4",
        "(switch 0 (negative? negate) (else identity))" => "0"
    ];
}

#[test]
fn first_matching_clause_wins() {
    evals![
        "(switch 4 (even? (constant 'even)) (positive? (constant 'positive)))" => "even",
        "(switch 3 (even? (constant 'even)) (positive? (constant 'positive)))" => "positive",
        "(switch 3 (else (constant 'first)) (odd? (constant 'second)))" => "first"
    ];
}

#[test]
fn classification() {
    evals![
        "(define (classify n)
           (switch n
             (negative? (constant 'negative))
             (zero? (constant 'zero))
             (positive? (constant 'positive))))" => "#<void>",
        "(classify -5)" => "negative",
        "(classify 0)" => "zero",
        "(classify 7)" => "positive",
        "(map classify '(-1 0 1))" => "(negative zero positive)"
    ];
}

#[test]
fn unrecognized_input() {
    fails![
        "(switch 'a (number? identity))" => DispatchError(UnrecognizedInput("a".into())),
        "(switch '(1 2) (number? identity) (string? identity))" => DispatchError(UnrecognizedInput("(1 2)".into())),
        "(switch 1)" => DispatchError(UnrecognizedInput("1".into()))
    ];

    let evaluator = Evaluator::new();
    assert_eq!(
        evaluator
            .eval(&parse!("(switch 'a (number? identity))"))
            .unwrap_err()
            .to_string(),
        "unrecognized input: a"
    );
}

#[test]
fn subject_is_evaluated_once() {
    evals![
        "(define calls 0)" => "#<void>",
        "(define (next) (set! calls (+ calls 1)) calls)" => "#<void>",
        "(switch (next) (zero? identity) (even? identity) (else identity))" => "1",
        "calls" => "1"
    ];
}

#[test]
fn scanning_stops_at_the_first_match() {
    evals![
        "(define tested '())" => "#<void>",
        "(define (probe name result) (lambda (x) (set! tested (cons name tested)) result))" => "#<void>",
        "(switch 1 ((probe 'a #f) identity) ((probe 'b #t) identity) ((probe 'c #t) identity))" => "1",
        "(reverse tested)" => "(a b)"
    ];
}

#[test]
fn unmatched_consequents_are_never_evaluated() {
    evals![
        "(switch 1 (zero? (error \"not me\")) (else identity))" => "1"
    ];
}

#[test]
fn lambdas_as_clauses() {
    evals![
        "(switch 10 ((lambda (x) (> x 5)) (lambda (x) (* x 2))) (else identity))" => "20",
        "(switch 2 ((lambda (x) (> x 5)) (lambda (x) (* x 2))) (else identity))" => "2",
        "(define big? (lambda (x) (> x 100)))" => "#<void>",
        "(switch 1000 (big? (compose negate (lambda (x) (quotient x 10)))) (else identity))" => "-100"
    ];
}

#[test]
fn switch_in_tail_position() {
    evals![
        "(define (collatz-steps n acc)
           (switch n
             ((lambda (x) (= x 1)) (constant acc))
             (even? (lambda (x) (collatz-steps (quotient x 2) (+ acc 1))))
             (else (lambda (x) (collatz-steps (+ (* 3 x) 1) (+ acc 1))))))" => "#<void>",
        "(collatz-steps 27 0)" => "111",
        "(define (spin n) (switch n (zero? (constant 'done)) (else (lambda (x) (spin (- x 1))))))" => "#<void>",
        "(spin 100000)" => "done"
    ];
}

#[test]
fn malformed_switch() {
    fails![
        "(switch)" => InvalidSyntax("(switch)".into()),
        "(switch 1 (zero?))" => InvalidSyntax("(zero?)".into()),
        "(switch 1 (zero? identity negate))" => InvalidSyntax("(zero? identity negate)".into()),
        "(switch 1 (5 identity))" => InvalidProcedure("5".into()),
        "(switch 1 (else 5))" => InvalidProcedure("5".into()),
        "(define switch 1)" => InvalidUsePrimitive("switch".into())
    ];
}

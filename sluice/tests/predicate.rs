#[macro_use]
mod common;

use sluice::cell::Cell;
use sluice::eval::Error::InvalidNumArgs;
use sluice::eval::Evaluator;
use sluice::parse;

#[test]
fn equivalence() {
    evals![
        "(eq? 'a 'a)" => "#t",
        "(eq? 'a 'b)" => "#f",
        "(eq? '() '())" => "#t",
        "(eq? car car)" => "#t",
        "(eq? car cdr)" => "#f",
        "(define p '(1 2))" => "#<void>",
        "(eq? p p)" => "#t",
        "(eq? '(1) '(1))" => "#f",
        "(eqv? 2 2)" => "#t",
        "(eqv? 2 2.0)" => "#f",
        "(equal? '(1 (2)) '(1 (2)))" => "#t",
        "(equal? '(1 2) '(1 3))" => "#f",
        "(equal? \"abc\" \"abc\")" => "#t"
    ];
    fails!["(eq? 1)" => InvalidNumArgs("eq?".into())];
}

#[test]
fn procedures_are_equal_only_to_themselves() {
    evals![
        "(define (f x) x)" => "#<void>",
        "(define g f)" => "#<void>",
        "(eq? f g)" => "#t",
        "(eq? (lambda (x) x) (lambda (x) x))" => "#f"
    ];
}

#[test]
fn type_predicates() {
    evals![
        "(not #f)" => "#t",
        "(not 0)" => "#f",
        "(not '())" => "#f",
        "(boolean? #f)" => "#t",
        "(boolean? 0)" => "#f",
        "(symbol? 'a)" => "#t",
        "(symbol? \"a\")" => "#f",
        "(string? \"a\")" => "#t",
        "(procedure? car)" => "#t",
        "(procedure? (lambda (x) x))" => "#t",
        "(procedure? 'car)" => "#f"
    ];
}

#[test]
fn equal_on_long_lists() {
    evals![
        "(define (range a b acc) (if (< b a) acc (range a (- b 1) (cons b acc))))" => "#<void>",
        "(equal? (range 1 100000 '()) (range 1 100000 '()))" => "#t",
        "(equal? (range 1 100000 '()) (range 0 100000 '()))" => "#f",
        "(equal? (list (range 1 100000 '())) (list (range 1 100000 '())))" => "#t"
    ];
}

#[macro_use]
mod common;

use sluice::cell::Cell;
use sluice::eval::Evaluator;
use sluice::parse;

#[test]
fn factorial() {
    evals![
        "(define (fact n) (if (= n 0) 1 (* n (fact (- n 1)))))" => "#<void>",
        "(fact 5)" => "120",
        "(fact 20)" => "2432902008176640000",
        "(fact 25)" => "15511210043330985984000000"
    ];
}

#[test]
fn fizzbuzz() {
    evals![
        "(define (divisible-by d) (lambda (x) (zero? (modulo x d))))" => "#<void>",
        "(define (fizzbuzz n)
           (switch n
             ((divisible-by 15) (constant 'fizzbuzz))
             ((divisible-by 3) (constant 'fizz))
             ((divisible-by 5) (constant 'buzz))
             (else identity)))" => "#<void>",
        "(map fizzbuzz '(1 3 5 15 16))" => "(1 fizz buzz fizzbuzz 16)"
    ];
}

#[test]
fn sum_of_squares() {
    evals![
        "(define (range a b acc) (if (< b a) acc (range a (- b 1) (cons b acc))))" => "#<void>",
        "(reduce + (map (lambda (x) (* x x)) (range 1 10 '())))" => "385",
        "(fold-left + 0 (filter even? (range 1 10 '())))" => "30"
    ];
}

#[test]
fn sieve() {
    evals![
        "(define (range a b acc) (if (< b a) acc (range a (- b 1) (cons b acc))))" => "#<void>",
        "(define (sieve xs)
           (if (null? xs)
               '()
               (cons (car xs)
                     (sieve (filter (lambda (x) (not (zero? (modulo x (car xs))))) (cdr xs))))))" => "#<void>",
        "(sieve (range 2 30 '()))" => "(2 3 5 7 11 13 17 19 23 29)"
    ];
}

#[test]
fn fibonacci() {
    evals![
        "(define (fib n) (let loop ((a 0) (b 1) (n n)) (if (= n 0) a (loop b (+ a b) (- n 1)))))" => "#<void>",
        "(fib 10)" => "55",
        "(fib 100)" => "354224848179261915075"
    ];
}

#[test]
fn accumulator() {
    evals![
        "(define (make-accumulator total) (lambda (x) (set! total (+ total x)) total))" => "#<void>",
        "(define acc (make-accumulator 100))" => "#<void>",
        "(acc 10)" => "110",
        "(acc 10)" => "120"
    ];
}

#[test]
fn deep_recursion() {
    evals![
        "(define (sum n) (if (= n 0) 0 (+ n (sum (- n 1)))))" => "#<void>",
        "(sum 1000)" => "500500",
        "(sum 100000)" => "5000050000",
        "(define (build n) (if (= n 0) '() (cons n (build (- n 1)))))" => "#<void>",
        "(length (build 100000))" => "100000",
        "(define (depth n) (switch n (zero? (constant 0)) (else (lambda (n) (+ 1 (depth (- n 1)))))))" => "#<void>",
        "(depth 50000)" => "50000"
    ];
}

use log::error;
use sluice::cell::Cell;
use sluice::eval::Evaluator;
use sluice::{cell, list, parse};

fn main() {
    let evaluator = Evaluator::new();

    evaluator
        .eval(&parse!(
            r#"
    (define (fizzbuzz n)
       (switch n
          ((lambda (x) (zero? (modulo x 15))) (constant 'fizzbuzz))
          ((lambda (x) (zero? (modulo x 3))) (constant 'fizz))
          ((lambda (x) (zero? (modulo x 5))) (constant 'buzz))
          (else identity)))
    "#
        ))
        .unwrap();

    for it in 1..=15i64 {
        match evaluator.eval(&list!["fizzbuzz", it]) {
            Ok(result) => println!("{}", result),
            Err(e) => error!("error: {}", e),
        }
    }

    assert_eq!(evaluator.eval(&list!["fizzbuzz", 15]), Ok(cell!["fizzbuzz"]));
}

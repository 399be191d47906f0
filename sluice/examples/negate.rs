use sluice::switch::Switch;

fn main() {
    let negate_negatives: Switch<i64, (), i64> =
        Switch::new().case(|n| *n < 0, |n| -n).otherwise(|n| *n);

    for it in [-3, 4, 0, -100] {
        match negate_negatives.evaluate(&it) {
            Ok(result) => println!("{} => {}", it, result),
            Err(e) => eprintln!("error: {}", e),
        }
    }

    let positives_only: Switch<i64, (), i64> = Switch::new().case(|n| *n > 0, |n| *n);
    match positives_only.evaluate(&-1) {
        Ok(result) => println!("-1 => {}", result),
        Err(e) => println!("-1 => error: {}", e),
    }
}

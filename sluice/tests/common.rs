#[allow(unused_macros)]
macro_rules! evals {
    ($($lhs:expr => $rhs:expr),+) => {{
        let evaluator = Evaluator::new();
         $(
            assert_eq!(evaluator.eval(&parse!($lhs)), Ok(match $rhs {
                "#<void>" => Cell::Void,
                _ => parse!($rhs)
            }), "evaluating {}", $lhs);
         )+
    }};
}

#[allow(unused_macros)]
macro_rules! prints {
    ($($lhs:expr => $rhs:expr),+) => {{
        let evaluator = Evaluator::new();
         $(
            assert_eq!(evaluator.eval(&parse!($lhs)).unwrap().to_string(), $rhs);
         )+
    }};
}

#[allow(unused_macros)]
macro_rules! fails {
    ($($lhs:expr => $rhs:expr),+) => {{
        let evaluator = Evaluator::new();
         $(
            assert_eq!(evaluator.eval(
                &parse!($lhs)
            ), Err($rhs));
         )+
    }};
}

use crate::cell::Cell;
use crate::eval::builtin::{check_argc, expect_integer, expect_number, load_builtin};
use crate::eval::environment::Environment;
use crate::eval::Error;
use crate::eval::Error::DivideByZero;
use crate::number::Number;

pub fn load_builtins(env: &Environment) {
    load_builtin(env, "*", multiply);
    load_builtin(env, "/", divide);
    load_builtin(env, "+", plus);
    load_builtin(env, "-", minus);
    load_builtin(env, "<", lt);
    load_builtin(env, "<=", lteq);
    load_builtin(env, "=", num_equal);
    load_builtin(env, ">", gt);
    load_builtin(env, ">=", gteq);
    load_builtin(env, "abs", abs);
    load_builtin(env, "even?", even);
    load_builtin(env, "integer?", is_integer);
    load_builtin(env, "modulo", modulo);
    load_builtin(env, "negative?", negative);
    load_builtin(env, "number?", is_number);
    load_builtin(env, "odd?", odd);
    load_builtin(env, "positive?", positive);
    load_builtin(env, "quotient", quotient);
    load_builtin(env, "remainder", remainder);
    load_builtin(env, "zero?", zero);
}

pub fn plus(args: &[Cell]) -> Result<Cell, Error> {
    let mut sum = Number::from(0i64);
    for arg in args {
        sum = &sum + expect_number(arg, "+")?;
    }
    Ok(Cell::Number(sum))
}

pub fn multiply(args: &[Cell]) -> Result<Cell, Error> {
    let mut product = Number::from(1i64);
    for arg in args {
        product = &product * expect_number(arg, "*")?;
    }
    Ok(Cell::Number(product))
}

/// (- x) negates x, (- x y ...) subtracts every y from x.
pub fn minus(args: &[Cell]) -> Result<Cell, Error> {
    check_argc(args, 1, None, "-")?;
    let first = expect_number(&args[0], "-")?;
    if args.len() == 1 {
        return Ok(Cell::Number(-first));
    }
    let mut difference = first.clone();
    for arg in &args[1..] {
        difference = &difference - expect_number(arg, "-")?;
    }
    Ok(Cell::Number(difference))
}

/// (/ x) is the reciprocal of x, (/ x y ...) divides x by every y.
pub fn divide(args: &[Cell]) -> Result<Cell, Error> {
    check_argc(args, 1, None, "/")?;
    let first = expect_number(&args[0], "/")?;
    let (mut quotient, divisors) = match args.len() {
        1 => (Number::from(1i64), args),
        _ => (first.clone(), &args[1..]),
    };
    for arg in divisors {
        quotient = quotient
            .checked_div(expect_number(arg, "/")?)
            .ok_or_else(|| DivideByZero("/".into()))?;
    }
    Ok(Cell::Number(quotient))
}

pub fn num_equal(args: &[Cell]) -> Result<Cell, Error> {
    num_comp(args, "=", |x, y| x == y)
}

pub fn lt(args: &[Cell]) -> Result<Cell, Error> {
    num_comp(args, "<", |x, y| x < y)
}

pub fn gt(args: &[Cell]) -> Result<Cell, Error> {
    num_comp(args, ">", |x, y| x > y)
}

pub fn lteq(args: &[Cell]) -> Result<Cell, Error> {
    num_comp(args, "<=", |x, y| x <= y)
}

pub fn gteq(args: &[Cell]) -> Result<Cell, Error> {
    num_comp(args, ">=", |x, y| x >= y)
}

/// Num Comp
///
/// True if `comp` holds for every adjacent pair of arguments.
fn num_comp(
    args: &[Cell],
    name: &str,
    comp: impl Fn(&Number, &Number) -> bool,
) -> Result<Cell, Error> {
    check_argc(args, 1, None, name)?;
    let nums = args
        .iter()
        .map(|arg| expect_number(arg, name))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(nums.windows(2).all(|it| comp(it[0], it[1])).into())
}

pub fn zero(args: &[Cell]) -> Result<Cell, Error> {
    num_unary_predicate(args, "zero?", Number::is_zero)
}

pub fn positive(args: &[Cell]) -> Result<Cell, Error> {
    num_unary_predicate(args, "positive?", Number::is_positive)
}

pub fn negative(args: &[Cell]) -> Result<Cell, Error> {
    num_unary_predicate(args, "negative?", Number::is_negative)
}

pub fn even(args: &[Cell]) -> Result<Cell, Error> {
    check_argc(args, 1, Some(1), "even?")?;
    let num = expect_integer(&args[0], "even?")?;
    Ok(num.is_even().unwrap_or(false).into())
}

pub fn odd(args: &[Cell]) -> Result<Cell, Error> {
    check_argc(args, 1, Some(1), "odd?")?;
    let num = expect_integer(&args[0], "odd?")?;
    Ok(num.is_even().map(|even| !even).unwrap_or(false).into())
}

fn num_unary_predicate(
    args: &[Cell],
    name: &str,
    predicate: impl Fn(&Number) -> bool,
) -> Result<Cell, Error> {
    check_argc(args, 1, Some(1), name)?;
    Ok(predicate(expect_number(&args[0], name)?).into())
}

pub fn is_number(args: &[Cell]) -> Result<Cell, Error> {
    check_argc(args, 1, Some(1), "number?")?;
    Ok(args[0].is_number().into())
}

pub fn is_integer(args: &[Cell]) -> Result<Cell, Error> {
    check_argc(args, 1, Some(1), "integer?")?;
    Ok(args[0].as_number().is_some_and(Number::is_integer).into())
}

pub fn abs(args: &[Cell]) -> Result<Cell, Error> {
    check_argc(args, 1, Some(1), "abs")?;
    Ok(Cell::Number(expect_number(&args[0], "abs")?.abs()))
}

pub fn quotient(args: &[Cell]) -> Result<Cell, Error> {
    integer_division(args, "quotient", Number::quotient)
}

pub fn remainder(args: &[Cell]) -> Result<Cell, Error> {
    integer_division(args, "remainder", Number::remainder)
}

pub fn modulo(args: &[Cell]) -> Result<Cell, Error> {
    integer_division(args, "modulo", Number::modulo)
}

fn integer_division(
    args: &[Cell],
    name: &str,
    op: impl Fn(&Number, &Number) -> Option<Number>,
) -> Result<Cell, Error> {
    check_argc(args, 2, Some(2), name)?;
    let x = expect_integer(&args[0], name)?;
    let y = expect_integer(&args[1], name)?;
    if y.is_zero() {
        return Err(DivideByZero(name.into()));
    }
    op(x, y)
        .map(Cell::Number)
        .ok_or_else(|| DivideByZero(name.into()))
}

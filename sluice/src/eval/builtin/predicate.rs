use crate::cell::Cell;
use crate::eval::builtin::{check_argc, load_builtin};
use crate::eval::environment::Environment;
use crate::eval::Error;
use std::rc::Rc;

pub fn load_builtins(env: &Environment) {
    load_builtin(env, "boolean?", is_boolean);
    load_builtin(env, "eq?", eq);
    load_builtin(env, "equal?", equal);
    load_builtin(env, "eqv?", eqv);
    load_builtin(env, "not", not);
    load_builtin(env, "procedure?", is_procedure);
    load_builtin(env, "string?", is_string);
    load_builtin(env, "symbol?", is_symbol);
}

fn unary_predicate(
    args: &[Cell],
    name: &str,
    predicate: impl Fn(&Cell) -> bool,
) -> Result<Cell, Error> {
    check_argc(args, 1, Some(1), name)?;
    Ok(predicate(&args[0]).into())
}

fn binary_predicate(
    args: &[Cell],
    name: &str,
    predicate: impl Fn(&Cell, &Cell) -> bool,
) -> Result<Cell, Error> {
    check_argc(args, 2, Some(2), name)?;
    Ok(predicate(&args[0], &args[1]).into())
}

pub fn is_boolean(args: &[Cell]) -> Result<Cell, Error> {
    unary_predicate(args, "boolean?", |cell| matches!(cell, Cell::Bool(_)))
}

pub fn is_procedure(args: &[Cell]) -> Result<Cell, Error> {
    unary_predicate(args, "procedure?", Cell::is_procedure)
}

pub fn is_string(args: &[Cell]) -> Result<Cell, Error> {
    unary_predicate(args, "string?", |cell| matches!(cell, Cell::String(_)))
}

pub fn is_symbol(args: &[Cell]) -> Result<Cell, Error> {
    unary_predicate(args, "symbol?", Cell::is_symbol)
}

pub fn not(args: &[Cell]) -> Result<Cell, Error> {
    unary_predicate(args, "not", |cell| !cell.is_truthy())
}

pub fn eq(args: &[Cell]) -> Result<Cell, Error> {
    binary_predicate(args, "eq?", is_eqv)
}

pub fn eqv(args: &[Cell]) -> Result<Cell, Error> {
    binary_predicate(args, "eqv?", is_eqv)
}

pub fn equal(args: &[Cell]) -> Result<Cell, Error> {
    binary_predicate(args, "equal?", is_equal)
}

/// Is Eqv
///
/// Pairs are eqv only if they are the same pair. Numbers must agree in
/// both value and exactness, so `(eqv? 1 1.0)` is #f. Everything else
/// compares by value, and procedures by identity.
fn is_eqv(lhs: &Cell, rhs: &Cell) -> bool {
    match (lhs, rhs) {
        (Cell::Pair(car1, cdr1), Cell::Pair(car2, cdr2)) => {
            Rc::ptr_eq(car1, car2) && Rc::ptr_eq(cdr1, cdr2)
        }
        (Cell::Number(x), Cell::Number(y)) => x.is_exact() == y.is_exact() && x == y,
        _ => lhs == rhs,
    }
}

/// Is Equal
///
/// Structural equality: pairs are compared element by element, and
/// anything else as by [`is_eqv`]. Only nested cars recurse; the cdr
/// chain is walked in a loop.
fn is_equal(lhs: &Cell, rhs: &Cell) -> bool {
    let (mut lhs, mut rhs) = (lhs, rhs);
    while let (Cell::Pair(car1, cdr1), Cell::Pair(car2, cdr2)) = (lhs, rhs) {
        if !is_equal(car1, car2) {
            return false;
        }
        lhs = cdr1.as_ref();
        rhs = cdr2.as_ref();
    }
    is_eqv(lhs, rhs)
}

use crate::cell::Cell;
use crate::eval::environment::Environment;
use crate::eval::procedure::{Builtin, Procedure, TailBuiltin};
use crate::eval::Error;
use crate::eval::Error::{InvalidArgs, InvalidNumArgs};
use crate::number::Number;

mod control;
mod list;
mod number;
mod predicate;

/// Built Ins
///
/// Built ins are procedures implemented in Rust, either because they
/// must be (type predicates, pair access) or because they sit on every
/// hot path (arithmetic). They are bound in the global environment
/// like any other procedure and may be passed around, used as switch
/// predicates or consequents, or shadowed.
///
/// A builtin receives its already evaluated arguments as a slice and
/// is responsible for checking their count and types.
pub fn load_builtins(env: &Environment) {
    number::load_builtins(env);
    list::load_builtins(env);
    predicate::load_builtins(env);
    control::load_builtins(env);
}

fn load_builtin(env: &Environment, symbol: &'static str, func: Builtin) {
    env.define(symbol, Cell::Procedure(Procedure::new_builtin(symbol, func)));
}

fn load_tail_builtin(env: &Environment, symbol: &'static str, func: TailBuiltin) {
    env.define(symbol, Cell::Procedure(Procedure::new_tail_builtin(symbol, func)));
}

/// Check Argc
///
/// Return an error if the number of arguments applied to a builtin is
/// outside of `min..=max`.
fn check_argc(args: &[Cell], min: usize, max: Option<usize>, name: &str) -> Result<(), Error> {
    let argc = args.len();
    if argc < min || max.is_some_and(|max| argc > max) {
        Err(InvalidNumArgs(name.into()))
    } else {
        Ok(())
    }
}

fn expect_number<'a>(arg: &'a Cell, name: &str) -> Result<&'a Number, Error> {
    arg.as_number()
        .ok_or_else(|| InvalidArgs(name.into(), "number".into(), arg.to_string()))
}

fn expect_integer<'a>(arg: &'a Cell, name: &str) -> Result<&'a Number, Error> {
    match arg.as_number() {
        Some(num) if num.is_integer() => Ok(num),
        _ => Err(InvalidArgs(name.into(), "integer".into(), arg.to_string())),
    }
}

fn expect_index(arg: &Cell, name: &str) -> Result<usize, Error> {
    arg.as_number().and_then(Number::to_usize).ok_or_else(|| {
        InvalidArgs(
            name.into(),
            "non-negative integer".into(),
            arg.to_string(),
        )
    })
}

fn expect_list<'a>(arg: &'a Cell, name: &str) -> Result<Vec<&'a Cell>, Error> {
    match arg {
        Cell::Nil => Ok(vec![]),
        arg if arg.is_list() => Ok(arg.collect_vec()),
        _ => Err(InvalidArgs(name.into(), "list".into(), arg.to_string())),
    }
}

use crate::cell::Cell;
use crate::eval::builtin::{check_argc, expect_list, load_builtin, load_tail_builtin};
use crate::eval::environment::Environment;
use crate::eval::procedure;
use crate::eval::Error::ErrorSignal;
use crate::eval::{Error, Step};

pub fn load_builtins(env: &Environment) {
    load_tail_builtin(env, "apply", apply);
    load_builtin(env, "error", error);
}

/// (apply procedure arg... list)
///
/// Apply procedure to the given arguments followed by the elements of
/// the final list argument. The call is handed back as a step, so
/// `apply` in tail position is a proper tail call.
pub fn apply(args: Vec<Cell>) -> Result<Step, Error> {
    check_argc(&args, 2, None, "apply")?;
    let (procedure, rest) = args.split_at(1);
    let (leading, last) = rest.split_at(rest.len() - 1);
    let mut spread = leading.to_vec();
    spread.extend(expect_list(&last[0], "apply")?.into_iter().cloned());
    procedure::apply_step(&procedure[0], spread)
}

/// (error obj...)
///
/// Abort evaluation with an error carrying every argument.
pub fn error(args: &[Cell]) -> Result<Cell, Error> {
    Err(ErrorSignal(args.to_vec()))
}

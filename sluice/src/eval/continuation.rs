use crate::cell::Cell;
use crate::eval::environment::Environment;
use crate::eval::form::{
    cond_next, connective_next, gather_next, let_star_next, switch_next, Gathered,
};
use crate::eval::procedure::apply_step;
use crate::eval::{eval_body, Error, Step};
use log::{debug, trace};
use std::vec;

/// Continuation
///
/// Work left over once a subexpression has a value. A form that needs
/// the value of a subexpression returns that subexpression as a step
/// followed by a continuation. [`run`](crate::eval::run) keeps pending
/// continuations on a stack and resumes the most recent one with each
/// value produced.
#[derive(Debug)]
pub enum Continuation {
    /// Choose a branch of an `if` by the value of its test.
    If {
        consequent: Cell,
        alternative: Option<Cell>,
        env: Environment,
    },
    Define {
        symbol: String,
        env: Environment,
    },
    Set {
        symbol: String,
        env: Environment,
    },
    /// Discard the value and go on with the rest of a body.
    Body { rest: Cell, env: Environment },
    /// Collect the value and evaluate the next pending expression.
    Gather {
        pending: vec::IntoIter<Cell>,
        values: Vec<Cell>,
        env: Environment,
        then: Gathered,
    },
    LetStar {
        symbol: String,
        pending: vec::IntoIter<(String, Cell)>,
        body: Cell,
        scope: Environment,
    },
    /// Take this clause of a `cond` if the value is true.
    Cond {
        body: Cell,
        rest: Cell,
        env: Environment,
    },
    /// `and` and `or`.
    Connective {
        rest: Cell,
        env: Environment,
        until: bool,
    },
    /// The value is the subject of a `switch`.
    Switch { clauses: Cell, env: Environment },
    /// The value is a clause's predicate, to be applied to the subject.
    SwitchPredicate(SwitchClause),
    /// The value is the predicate's verdict on the subject.
    SwitchTest(SwitchClause),
    /// The value is the chosen consequent, to be applied to the subject.
    SwitchApply { subject: Cell },
}

/// The state of a `switch` while one of its clauses is being tried.
#[derive(Debug)]
pub struct SwitchClause {
    pub subject: Cell,
    pub consequent: Cell,
    pub rest: Cell,
    pub index: usize,
    pub env: Environment,
}

impl Continuation {
    /// Resume
    ///
    /// Continue with `value` as the value of the subexpression this
    /// continuation was waiting on, and return the next step.
    pub fn resume(self, value: Cell) -> Result<Step, Error> {
        match self {
            Continuation::If {
                consequent,
                alternative,
                env,
            } => match (value.is_truthy(), alternative) {
                (true, _) => Ok(Step::Eval(consequent, env)),
                (false, Some(alternative)) => Ok(Step::Eval(alternative, env)),
                (false, None) => Ok(Step::Value(Cell::Void)),
            },
            Continuation::Define { symbol, env } => {
                debug!("define {}", symbol);
                env.define(&symbol, value);
                Ok(Step::Value(Cell::Void))
            }
            Continuation::Set { symbol, env } => {
                env.set(&symbol, value)?;
                Ok(Step::Value(Cell::Void))
            }
            Continuation::Body { rest, env } => Ok(eval_body(&rest, &env)),
            Continuation::Gather {
                pending,
                mut values,
                env,
                then,
            } => {
                values.push(value);
                gather_next(pending, values, env, then)
            }
            Continuation::LetStar {
                symbol,
                pending,
                body,
                scope,
            } => let_star_next(pending, body, scope.extend_with([(symbol, value)])),
            Continuation::Cond { body, rest, env } => match value.is_truthy() {
                true if body.is_nil() => Ok(Step::Value(value)),
                true => Ok(eval_body(&body, &env)),
                false => cond_next(&rest, &env),
            },
            Continuation::Connective { rest, env, until } => match value.is_truthy() == until {
                true => Ok(Step::Value(value)),
                false => Ok(connective_next(&rest, &env, until)),
            },
            Continuation::Switch { clauses, env } => switch_next(value, &clauses, 0, &env),
            Continuation::SwitchPredicate(clause) => {
                let step = apply_step(&value, vec![clause.subject.clone()])?;
                Ok(step.then(Continuation::SwitchTest(clause)))
            }
            Continuation::SwitchTest(clause) => match value.is_truthy() {
                true => {
                    trace!("switch clause {} matched {}", clause.index, clause.subject);
                    Ok(Step::Eval(clause.consequent, clause.env).then(
                        Continuation::SwitchApply {
                            subject: clause.subject,
                        },
                    ))
                }
                false => switch_next(clause.subject, &clause.rest, clause.index + 1, &clause.env),
            },
            Continuation::SwitchApply { subject } => apply_step(&value, vec![subject]),
        }
    }
}

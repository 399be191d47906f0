use crate::cell::Cell;
use crate::eval::continuation::{Continuation, SwitchClause};
use crate::eval::environment::Environment;
use crate::eval::procedure::{apply_step, Lambda, Params, Procedure};
use crate::eval::Error::{
    InvalidDefineSyntax, InvalidSyntax, InvalidUsePrimitive, LambdaMissingExpression, UnquotedNil,
    VariableNotBound,
};
use crate::eval::{eval_body, Error, Step};
use crate::switch::{self, Switch};
use lazy_static::lazy_static;
use log::{debug, trace};
use std::vec;

type Form = Result<Step, Error>;

lazy_static! {
    /// Expression Forms
    ///
    /// The dispatch table classifying every expression the evaluator
    /// sees. Clauses are tried in order and the first match handles
    /// the expression. Special forms are recognized before procedure
    /// application, so a list headed by a keyword is never treated as
    /// a call. A pair matching nothing (e.g. `(1 . 2)`) is reported as
    /// unrecognized input.
    pub static ref FORMS: Switch<Cell, Environment, Form> = Switch::<Cell, Environment, Form>::new()
        .case(is_self_evaluating, |cell| Ok(Step::Value(cell.clone())))
        .case(Cell::is_nil, |_| Err(UnquotedNil))
        .case_with_env(Cell::is_symbol, eval_variable)
        .case(|cell| cell.is_form("quote"), eval_quote)
        .case_with_env(|cell| cell.is_form("if"), eval_if)
        .case_with_env(|cell| cell.is_form("define"), eval_define)
        .case_with_env(|cell| cell.is_form("set!"), eval_set)
        .case_with_env(|cell| cell.is_form("lambda") || cell.is_form("λ"), eval_lambda)
        .case_with_env(|cell| cell.is_form("begin"), eval_begin)
        .case_with_env(|cell| cell.is_form("let"), eval_let)
        .case_with_env(|cell| cell.is_form("let*"), eval_let_star)
        .case_with_env(|cell| cell.is_form("cond"), eval_cond)
        .case_with_env(|cell| cell.is_form("and"), eval_and)
        .case_with_env(|cell| cell.is_form("or"), eval_or)
        .case_with_env(|cell| cell.is_form("switch"), eval_switch)
        .case_with_env(Cell::is_list, eval_application);
}

fn is_self_evaluating(cell: &Cell) -> bool {
    matches!(
        cell,
        Cell::Bool(_) | Cell::Number(_) | Cell::String(_) | Cell::Procedure(_) | Cell::Void
    )
}

/// The operands of a special form, i.e. everything after the keyword.
fn operands(expr: &Cell) -> Vec<&Cell> {
    expr.cdr().map(Cell::collect_vec).unwrap_or_default()
}

fn invalid_syntax(expr: &Cell) -> Error {
    InvalidSyntax(expr.to_string())
}

fn symbol(cell: &Cell) -> Result<&str, Error> {
    match cell {
        Cell::Symbol(_) if cell.is_primitive_symbol() => Err(InvalidUsePrimitive(cell.to_string())),
        Cell::Symbol(sym) => Ok(sym),
        _ => Err(InvalidSyntax(format!("expected symbol, but found {}", cell))),
    }
}

fn eval_variable(cell: &Cell, env: &Environment) -> Form {
    let sym = symbol(cell)?;
    match env.lookup(sym) {
        Some(value) => Ok(Step::Value(value)),
        None => Err(VariableNotBound(sym.into())),
    }
}

/// (quote datum)
fn eval_quote(expr: &Cell) -> Form {
    match operands(expr).as_slice() {
        [datum] => Ok(Step::Value((*datum).clone())),
        _ => Err(invalid_syntax(expr)),
    }
}

/// (if test consequent [alternative])
fn eval_if(expr: &Cell, env: &Environment) -> Form {
    let (test, consequent, alternative) = match operands(expr).as_slice() {
        [test, consequent] => (*test, *consequent, None),
        [test, consequent, alternative] => (*test, *consequent, Some(*alternative)),
        _ => return Err(invalid_syntax(expr)),
    };
    Ok(Step::eval(test, env).then(Continuation::If {
        consequent: consequent.clone(),
        alternative: alternative.cloned(),
        env: env.clone(),
    }))
}

/// (define name expr)
/// (define (name . formals) body...)
fn eval_define(expr: &Cell, env: &Environment) -> Form {
    let invalid = || InvalidDefineSyntax(expr.to_string());
    let target = expr.cadr().ok_or_else(invalid)?;
    let rest = expr.cddr().ok_or_else(invalid)?;
    match (target, rest) {
        (Cell::Symbol(_), Cell::Pair(value, tail)) if tail.is_nil() => {
            let symbol = symbol(target)?.to_string();
            Ok(Step::eval(value, env).then(Continuation::Define {
                symbol,
                env: env.clone(),
            }))
        }
        (Cell::Pair(name, formals), body) if name.is_symbol() => {
            let sym = symbol(name)?;
            let procedure = make_lambda(Some(sym.to_string()), formals, body, env)?;
            debug!("define {}", procedure);
            env.define(sym, procedure);
            Ok(Step::Value(Cell::Void))
        }
        _ => Err(invalid()),
    }
}

/// (set! name expr)
fn eval_set(expr: &Cell, env: &Environment) -> Form {
    match operands(expr).as_slice() {
        [target, value] => {
            let symbol = symbol(target)?.to_string();
            Ok(Step::eval(value, env).then(Continuation::Set {
                symbol,
                env: env.clone(),
            }))
        }
        _ => Err(invalid_syntax(expr)),
    }
}

/// (lambda formals body...)
fn eval_lambda(expr: &Cell, env: &Environment) -> Form {
    match expr.cdr() {
        Some(Cell::Pair(formals, body)) => Ok(Step::Value(make_lambda(None, formals, body, env)?)),
        _ => Err(invalid_syntax(expr)),
    }
}

/// Make Lambda
///
/// Create a closure over `env`. `body` is the list of body
/// expressions, of which there must be at least one.
fn make_lambda(
    name: Option<String>,
    formals: &Cell,
    body: &Cell,
    env: &Environment,
) -> Result<Cell, Error> {
    if !body.is_pair() {
        return Err(LambdaMissingExpression);
    }
    Ok(Cell::Procedure(Procedure::new_lambda(Lambda {
        name,
        params: Params::parse(formals)?,
        body: body.clone(),
        env: env.clone(),
    })))
}

/// (begin expr...)
fn eval_begin(expr: &Cell, env: &Environment) -> Form {
    match expr.cdr() {
        Some(body) => Ok(eval_body(body, env)),
        None => Err(invalid_syntax(expr)),
    }
}

/// Parse Bindings
///
/// Parse a `let` binding list of the form `((name expr) ...)` into
/// names and the expressions bound to them.
fn parse_bindings(bindings: &Cell) -> Result<Vec<(String, Cell)>, Error> {
    if !bindings.is_nil() && !bindings.is_list() {
        return Err(invalid_syntax(bindings));
    }
    bindings
        .iter()
        .map(|binding| match binding.collect_vec().as_slice() {
            [name, value] if binding.is_list() => Ok((symbol(name)?.to_string(), (*value).clone())),
            _ => Err(invalid_syntax(binding)),
        })
        .collect()
}

/// (let ((name expr)...) body...)
/// (let loop ((name expr)...) body...)
///
/// The binding expressions are evaluated in the enclosing environment.
/// A named `let` binds `loop` to a procedure over the bindings' names,
/// visible only inside the body, and calls it with the values.
fn eval_let(expr: &Cell, env: &Environment) -> Form {
    let operands = operands(expr);
    match operands.as_slice() {
        [Cell::Symbol(_), bindings, _, ..] => {
            let name = symbol(operands[0])?.to_string();
            let (names, exprs): (Vec<String>, Vec<Cell>) =
                parse_bindings(bindings)?.into_iter().unzip();
            let body = expr.cddr().and_then(Cell::cdr).cloned().unwrap_or(Cell::Nil);
            gather(exprs, env, Gathered::NamedLet { name, names, body })
        }
        [bindings, _, ..] => {
            let (names, exprs): (Vec<String>, Vec<Cell>) =
                parse_bindings(bindings)?.into_iter().unzip();
            let body = expr.cddr().cloned().unwrap_or(Cell::Nil);
            gather(exprs, env, Gathered::Let { names, body })
        }
        _ => Err(invalid_syntax(expr)),
    }
}

/// (let* ((name expr)...) body...)
fn eval_let_star(expr: &Cell, env: &Environment) -> Form {
    match operands(expr).as_slice() {
        [bindings, _, ..] => {
            let bindings = parse_bindings(bindings)?;
            let body = expr.cddr().cloned().unwrap_or(Cell::Nil);
            let_star_next(bindings.into_iter(), body, env.extend())
        }
        _ => Err(invalid_syntax(expr)),
    }
}

/// Evaluate the next `let*` binding in `scope`, or the body once every
/// binding is made. Each binding gets a frame of its own, so later
/// bindings see earlier ones.
pub(super) fn let_star_next(
    mut pending: vec::IntoIter<(String, Cell)>,
    body: Cell,
    scope: Environment,
) -> Form {
    match pending.next() {
        Some((symbol, expr)) => Ok(Step::Eval(expr, scope.clone()).then(Continuation::LetStar {
            symbol,
            pending,
            body,
            scope,
        })),
        None => Ok(eval_body(&body, &scope)),
    }
}

/// (cond (test expr...)... [(else expr...)])
///
/// A clause with no expressions yields the value of its test. If no
/// clause matches the result is void.
fn eval_cond(expr: &Cell, env: &Environment) -> Form {
    match expr.cdr() {
        Some(clauses) => cond_next(clauses, env),
        None => Err(invalid_syntax(expr)),
    }
}

pub(super) fn cond_next(clauses: &Cell, env: &Environment) -> Form {
    let Cell::Pair(clause, rest) = clauses else {
        return Ok(Step::Value(Cell::Void));
    };
    let (test, body) = match clause.as_ref() {
        Cell::Pair(test, body) if clause.is_list() => (test.as_ref(), body.as_ref()),
        clause => return Err(invalid_syntax(clause)),
    };
    if test.is_symbol_str("else") {
        return match body.is_nil() {
            true => Err(invalid_syntax(clause)),
            false => Ok(eval_body(body, env)),
        };
    }
    Ok(Step::eval(test, env).then(Continuation::Cond {
        body: body.clone(),
        rest: rest.as_ref().clone(),
        env: env.clone(),
    }))
}

/// (and expr...)
fn eval_and(expr: &Cell, env: &Environment) -> Form {
    match expr.cdr() {
        Some(exprs) => Ok(connective_next(exprs, env, false)),
        None => Err(invalid_syntax(expr)),
    }
}

/// (or expr...)
fn eval_or(expr: &Cell, env: &Environment) -> Form {
    match expr.cdr() {
        Some(exprs) => Ok(connective_next(exprs, env, true)),
        None => Err(invalid_syntax(expr)),
    }
}

/// Evaluate `exprs` in order, stopping at the first value whose
/// truthiness is `until`: false for `and`, true for `or`. The last
/// expression is in tail position. With no expressions the result is
/// `(not until)`.
pub(super) fn connective_next(exprs: &Cell, env: &Environment, until: bool) -> Step {
    match exprs {
        Cell::Pair(expr, rest) if !rest.is_nil() => {
            Step::eval(expr, env).then(Continuation::Connective {
                rest: rest.as_ref().clone(),
                env: env.clone(),
                until,
            })
        }
        Cell::Pair(expr, _) => Step::eval(expr, env),
        _ => Step::Value(Cell::Bool(!until)),
    }
}

/// (switch expr (predicate consequent)... [(else consequent)])
///
/// Evaluate `expr` once, then try each clause in order: the predicate
/// procedure is applied to the value, and the first clause whose
/// predicate returns true has its consequent procedure applied to the
/// value. An `else` clause always matches. If nothing matches, the
/// value is reported as unrecognized input.
fn eval_switch(expr: &Cell, env: &Environment) -> Form {
    match expr.cdr() {
        Some(Cell::Pair(subject, clauses)) => Ok(Step::eval(subject, env).then(Continuation::Switch {
            clauses: clauses.as_ref().clone(),
            env: env.clone(),
        })),
        _ => Err(invalid_syntax(expr)),
    }
}

/// Try the switch clause at the head of `clauses` against `subject`.
/// Predicate and consequent expressions are only evaluated once their
/// clause is reached.
pub(super) fn switch_next(subject: Cell, clauses: &Cell, index: usize, env: &Environment) -> Form {
    let Cell::Pair(clause, rest) = clauses else {
        return Err(switch::Error::UnrecognizedInput(subject.to_string()).into());
    };
    let (predicate, consequent) = match clause.collect_vec().as_slice() {
        [predicate, consequent] if clause.is_list() => ((*predicate).clone(), (*consequent).clone()),
        _ => return Err(invalid_syntax(clause)),
    };
    if predicate.is_symbol_str("else") {
        trace!("switch clause {} matched {}", index, subject);
        return Ok(Step::Eval(consequent, env.clone()).then(Continuation::SwitchApply { subject }));
    }
    Ok(Step::Eval(predicate, env.clone()).then(Continuation::SwitchPredicate(SwitchClause {
        subject,
        consequent,
        rest: rest.as_ref().clone(),
        index,
        env: env.clone(),
    })))
}

/// (operator operand...)
fn eval_application(expr: &Cell, env: &Environment) -> Form {
    gather(expr.iter().cloned().collect(), env, Gathered::Application)
}

/// Gathered
///
/// What to do with the values of a list of expressions evaluated left
/// to right by [`gather`].
#[derive(Debug)]
pub enum Gathered {
    /// Apply the first value to the rest.
    Application,
    /// Bind `names` to the values in a new frame and evaluate `body`.
    Let { names: Vec<String>, body: Cell },
    /// Call a procedure named `name` over `names` with the values.
    NamedLet {
        name: String,
        names: Vec<String>,
        body: Cell,
    },
}

impl Gathered {
    fn finish(self, values: Vec<Cell>, env: &Environment) -> Form {
        match self {
            Gathered::Application => {
                let mut values = values.into_iter();
                match values.next() {
                    Some(operator) => apply_step(&operator, values.collect()),
                    None => Err(UnquotedNil),
                }
            }
            Gathered::Let { names, body } => {
                Ok(eval_body(&body, &env.extend_with(names.into_iter().zip(values))))
            }
            Gathered::NamedLet { name, names, body } => {
                let formals = Cell::new_list(names.iter().map(|it| Cell::new_symbol(it)));
                let scope = env.extend();
                let procedure = make_lambda(Some(name.clone()), &formals, &body, &scope)?;
                scope.define(&name, procedure.clone());
                apply_step(&procedure, values)
            }
        }
    }
}

fn gather(exprs: Vec<Cell>, env: &Environment, then: Gathered) -> Form {
    let values = Vec::with_capacity(exprs.len());
    gather_next(exprs.into_iter(), values, env.clone(), then)
}

/// Evaluate the pending expressions in order. Expressions whose first
/// step is already a value (constants, variables, lambdas) are
/// collected on the spot; anything else suspends the gathering behind
/// a continuation.
pub(super) fn gather_next(
    mut pending: vec::IntoIter<Cell>,
    mut values: Vec<Cell>,
    env: Environment,
    then: Gathered,
) -> Form {
    while let Some(expr) = pending.next() {
        match FORMS.try_evaluate_in(&expr, &env)? {
            Step::Value(value) => values.push(value),
            step => {
                return Ok(step.then(Continuation::Gather {
                    pending,
                    values,
                    env,
                    then,
                }))
            }
        }
    }
    then.finish(values, &env)
}

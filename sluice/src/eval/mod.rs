use crate::cell::Cell;
use crate::eval::continuation::Continuation;
use crate::eval::environment::Environment;
use crate::eval::form::FORMS;
use crate::{lex, parse, switch};
use log::{debug, trace};

pub mod builtin;
pub mod continuation;
pub mod environment;
pub mod form;
pub mod procedure;

/// Step
///
/// The outcome of one step of evaluation.
///
/// * `Value` - evaluation finished with a value.
/// * `Eval` - an expression still to be evaluated, and the environment
///   to evaluate it in. Forms hand back their tail expression this way
///   instead of recursing on it.
/// * `Then` - a step whose value is to be passed on to a continuation,
///   e.g. the test of an `if` followed by choosing a branch.
#[derive(Debug)]
pub enum Step {
    Value(Cell),
    Eval(Cell, Environment),
    Then(Box<Step>, Continuation),
}

impl Step {
    pub fn eval(expr: &Cell, env: &Environment) -> Step {
        Step::Eval(expr.clone(), env.clone())
    }

    /// Pass the value of this step on to `continuation`.
    pub fn then(self, continuation: Continuation) -> Step {
        Step::Then(Box::new(self), continuation)
    }
}

/// Eval
///
/// Evaluate `expr` in `env`.
pub fn eval(expr: &Cell, env: &Environment) -> Result<Cell, Error> {
    run(Step::eval(expr, env))
}

/// Run
///
/// Drive `step` until it produces a value.
///
/// Each expression is classified by the expression-form dispatch table
/// (see [`form`]). The matching form's handler returns the next step
/// rather than evaluating its subexpressions itself, and work waiting
/// on a subexpression's value is kept on a heap allocated stack of
/// continuations. Neither tail calls nor nested calls grow the Rust
/// stack, so recursion depth is bounded only by memory.
pub fn run(step: Step) -> Result<Cell, Error> {
    let mut stack: Vec<Continuation> = vec![];
    let mut step = step;
    loop {
        step = match step {
            Step::Value(value) => match stack.pop() {
                Some(continuation) => continuation.resume(value)?,
                None => return Ok(value),
            },
            Step::Eval(expr, env) => {
                trace!("eval {}", expr);
                FORMS.try_evaluate_in(&expr, &env)?
            }
            Step::Then(step, continuation) => {
                stack.push(continuation);
                *step
            }
        };
    }
}

/// Eval Body
///
/// Evaluate the list of expressions `body` in order, returning the
/// value of the last. The last expression is evaluated in tail
/// position. An empty body evaluates to void.
pub fn eval_body(body: &Cell, env: &Environment) -> Step {
    match body {
        Cell::Pair(expr, rest) if rest.is_nil() => Step::eval(expr, env),
        Cell::Pair(expr, rest) => Step::eval(expr, env).then(Continuation::Body {
            rest: rest.as_ref().clone(),
            env: env.clone(),
        }),
        _ => Step::Value(Cell::Void),
    }
}

/// Evaluator
///
/// An evaluator owns a global environment populated with the builtin
/// procedures and, unless created [`bare`](Evaluator::bare), the
/// prelude. Top level definitions persist between calls to
/// [`eval`](Evaluator::eval).
#[derive(Debug)]
pub struct Evaluator {
    globals: Environment,
}

impl Evaluator {
    /// New
    ///
    /// Return a new evaluator with builtins and the prelude loaded.
    pub fn new() -> Evaluator {
        let evaluator = Evaluator::bare();
        evaluator.load_prelude();
        evaluator
    }

    /// Bare
    ///
    /// Return a new evaluator with only the builtin procedures bound.
    pub fn bare() -> Evaluator {
        let globals = Environment::new();
        builtin::load_builtins(&globals);
        Evaluator { globals }
    }

    /// Load Prelude
    ///
    /// Read and evaluate prelude.sl
    fn load_prelude(&self) {
        let prelude_text = include_str!("../../prelude.sl");
        let prelude_tokens = lex::scan(prelude_text).expect("invalid prelude");
        let mut it = prelude_tokens.iter().peekable();
        while it.peek().is_some() {
            let ast = parse::parse(prelude_text, &mut it).expect("invalid prelude");
            self.eval(&ast).expect("invalid prelude");
        }
        debug!("prelude loaded, {} globals", self.globals.symbols().len());
    }

    /// Eval
    ///
    /// Evaluate the expression contained within cell in the global
    /// environment and return the result.
    ///
    /// # Arguments
    /// `cell` - An expression to evaluate
    pub fn eval(&self, cell: &Cell) -> Result<Cell, Error> {
        eval(cell, &self.globals)
    }

    /// Eval Text
    ///
    /// Scan and parse one expression from `text`, evaluate it, and
    /// return the result along with any text following the expression.
    ///
    /// # Arguments
    /// `text` - Source text holding at least one expression
    pub fn eval_text<'a>(&self, text: &'a str) -> Result<(Cell, Option<&'a str>), Error> {
        let tokens = lex::scan(text)?;
        let mut cur = tokens.iter().peekable();
        let cell = parse::parse(text, &mut cur)?;
        let remaining = cur.peek().map(|token| &text[token.span.0..]);
        Ok((self.eval(&cell)?, remaining))
    }

    /// Define
    ///
    /// Bind `symbol` in the global environment.
    pub fn define(&self, symbol: &str, value: Cell) {
        self.globals.define(symbol, value);
    }

    pub fn global_symbols(&self) -> Vec<String> {
        self.globals.symbols()
    }

    pub fn environment(&self) -> &Environment {
        &self.globals
    }
}

// Top level closures over local frames (e.g. a counter returned by a
// procedure) keep the global frame alive through their parent chain.
impl Drop for Evaluator {
    fn drop(&mut self) {
        self.globals.clear();
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum Error {
    #[error("{}", .0.iter().map(|it| it.to_string()).collect::<Vec<_>>().join(" "))]
    ErrorSignal(Vec<Cell>),

    #[error("invalid argument for {0}: expected {1}, but got {2}")]
    InvalidArgs(String, String, String),

    #[error("invalid number of arguments for {0}")]
    InvalidNumArgs(String),

    #[error("invalid define syntax: {0}")]
    InvalidDefineSyntax(String),

    #[error("call of non-procedure: {0}")]
    InvalidProcedure(String),

    #[error("invalid use of primitive {0}")]
    InvalidUsePrimitive(String),

    #[error("invalid syntax: {0}")]
    InvalidSyntax(String),

    #[error("lambda require at least one expression")]
    LambdaMissingExpression,

    #[error("{0} is not bound")]
    VariableNotBound(String),

    #[error("invalid syntax: () must be quoted")]
    UnquotedNil,

    #[error("division by zero in {0}")]
    DivideByZero(String),

    #[error(transparent)]
    DispatchError(#[from] switch::Error),

    #[error(transparent)]
    ParseError(#[from] parse::Error),

    #[error(transparent)]
    LexError(#[from] lex::Error),
}

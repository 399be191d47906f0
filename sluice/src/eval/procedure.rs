use crate::cell::Cell;
use crate::eval::environment::{Environment, WeakEnvironment};
use crate::eval::Error::{InvalidNumArgs, InvalidProcedure};
use crate::eval::{eval_body, run, Error, Step};
use log::trace;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

/// The Rust signature every builtin procedure implements.
pub type Builtin = fn(&[Cell]) -> Result<Cell, Error>;

/// A builtin whose result is another procedure call, such as `apply`.
/// It hands that call back as a step rather than running it.
pub type TailBuiltin = fn(Vec<Cell>) -> Result<Step, Error>;

/// Procedure
///
/// A first class procedure value: either a builtin implemented in
/// Rust, or a closure created by `lambda`. Procedures compare equal
/// only to themselves.
#[derive(Clone)]
pub struct Procedure {
    inner: Rc<Callable>,
    env: Captured,
}

enum Callable {
    Builtin { name: &'static str, func: Builtin },
    TailBuiltin { name: &'static str, func: TailBuiltin },
    Lambda(Code),
}

struct Code {
    name: Option<String>,
    params: Params,
    body: Cell,
}

/// The environment a closure closes over. A closure stored in the frame
/// it captured holds that frame weakly.
#[derive(Clone)]
enum Captured {
    Nothing,
    Strong(Environment),
    Weak(WeakEnvironment),
}

/// Lambda
///
/// A closure: formal parameters, a body of one or more expressions
/// held as a list, and the environment captured when the `lambda` was
/// evaluated.
pub struct Lambda {
    pub name: Option<String>,
    pub params: Params,
    pub body: Cell,
    pub env: Environment,
}

/// Params
///
/// The formal parameter list of a lambda. `rest`, if present, is bound
/// to a list of any arguments beyond the required ones, as in
/// `(lambda (a b . rest) ...)` or `(lambda args ...)`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Params {
    pub required: Vec<String>,
    pub rest: Option<String>,
}

impl Params {
    /// Parse a formal parameter list, e.g. `(a b)`, `(a . rest)` or
    /// `args`.
    pub fn parse(formals: &Cell) -> Result<Params, Error> {
        let mut required = vec![];
        let mut rest = formals;
        while let Cell::Pair(car, cdr) = rest {
            required.push(param_name(car)?);
            rest = cdr.as_ref();
        }
        let rest = match rest {
            Cell::Nil => None,
            cell => Some(param_name(cell)?),
        };
        Ok(Params { required, rest })
    }

    /// Bind `args` to these parameters, checking arity.
    fn bind(&self, desc: &Procedure, mut args: Vec<Cell>) -> Result<Vec<(String, Cell)>, Error> {
        let argc = args.len();
        let required = self.required.len();
        if argc < required || (self.rest.is_none() && argc > required) {
            return Err(InvalidNumArgs(desc.to_string()));
        }
        let extra = args.split_off(required);
        let mut bindings = self
            .required
            .iter()
            .cloned()
            .zip(args)
            .collect::<Vec<_>>();
        if let Some(rest) = &self.rest {
            bindings.push((rest.clone(), Cell::new_list(extra)));
        }
        Ok(bindings)
    }
}

impl Display for Params {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (self.required.is_empty(), &self.rest) {
            (true, Some(rest)) => write!(f, "{}", rest),
            (_, rest) => {
                write!(f, "({}", self.required.join(" "))?;
                if let Some(rest) = rest {
                    write!(f, " . {}", rest)?;
                }
                write!(f, ")")
            }
        }
    }
}

fn param_name(cell: &Cell) -> Result<String, Error> {
    match cell {
        Cell::Symbol(sym) if cell.is_primitive_symbol() => {
            Err(Error::InvalidUsePrimitive(sym.clone()))
        }
        Cell::Symbol(sym) => Ok(sym.clone()),
        cell => Err(Error::InvalidSyntax(format!(
            "{} is not a valid parameter",
            cell
        ))),
    }
}

impl Procedure {
    pub fn new_builtin(name: &'static str, func: Builtin) -> Procedure {
        Procedure {
            inner: Rc::new(Callable::Builtin { name, func }),
            env: Captured::Nothing,
        }
    }

    pub fn new_tail_builtin(name: &'static str, func: TailBuiltin) -> Procedure {
        Procedure {
            inner: Rc::new(Callable::TailBuiltin { name, func }),
            env: Captured::Nothing,
        }
    }

    pub fn new_lambda(lambda: Lambda) -> Procedure {
        let Lambda {
            name,
            params,
            body,
            env,
        } = lambda;
        Procedure {
            inner: Rc::new(Callable::Lambda(Code { name, params, body })),
            env: Captured::Strong(env),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self.inner.as_ref() {
            Callable::Builtin { name, .. } | Callable::TailBuiltin { name, .. } => Some(*name),
            Callable::Lambda(code) => code.name.as_deref(),
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self.inner.as_ref(), Callable::Lambda(_))
    }

    /// True if this is a closure holding `env` as its captured
    /// environment.
    pub fn captures(&self, env: &Environment) -> bool {
        matches!(&self.env, Captured::Strong(captured) if captured.ptr_eq(env))
    }

    /// Downgrade
    ///
    /// Return a handle to the same procedure that does not keep its
    /// captured environment alive.
    pub fn downgrade(&self) -> Procedure {
        let env = match &self.env {
            Captured::Strong(env) => Captured::Weak(env.downgrade()),
            env => env.clone(),
        };
        Procedure {
            inner: self.inner.clone(),
            env,
        }
    }

    /// Upgrade
    ///
    /// Return a handle to the same procedure that keeps its captured
    /// environment alive, if that environment still exists.
    pub fn upgrade(&self) -> Procedure {
        match &self.env {
            Captured::Weak(env) => match env.upgrade() {
                Some(env) => Procedure {
                    inner: self.inner.clone(),
                    env: Captured::Strong(env),
                },
                None => self.clone(),
            },
            _ => self.clone(),
        }
    }

    /// The environment a closure closes over. Builtins get an empty
    /// one.
    pub fn environment(&self) -> Result<Environment, Error> {
        match &self.env {
            Captured::Strong(env) => Ok(env.clone()),
            Captured::Weak(env) => env
                .upgrade()
                .ok_or_else(|| InvalidProcedure(self.to_string())),
            Captured::Nothing => Ok(Environment::new()),
        }
    }

    /// Apply Step
    ///
    /// Apply this procedure to already evaluated arguments. A builtin
    /// runs to completion. A closure binds its arguments and hands its
    /// body back as a step, so calling a closure never grows the Rust
    /// stack.
    pub fn apply_step(&self, args: Vec<Cell>) -> Result<Step, Error> {
        trace!("apply {} to {} argument(s)", self, args.len());
        match self.inner.as_ref() {
            Callable::Builtin { func, .. } => Ok(Step::Value(func(&args)?)),
            Callable::TailBuiltin { func, .. } => func(args),
            Callable::Lambda(code) => {
                let bindings = code.params.bind(self, args)?;
                let env = self.environment()?.extend_with(bindings);
                Ok(eval_body(&code.body, &env))
            }
        }
    }

    /// Apply
    ///
    /// Apply this procedure to already evaluated arguments and return
    /// the result.
    pub fn apply(&self, args: Vec<Cell>) -> Result<Cell, Error> {
        run(self.apply_step(args)?)
    }
}

/// Apply
///
/// Apply `procedure` to `args`, failing if `procedure` is not a
/// procedure.
pub fn apply(procedure: &Cell, args: Vec<Cell>) -> Result<Cell, Error> {
    match procedure {
        Cell::Procedure(procedure) => procedure.apply(args),
        cell => Err(InvalidProcedure(cell.to_string())),
    }
}

pub fn apply_step(procedure: &Cell, args: Vec<Cell>) -> Result<Step, Error> {
    match procedure {
        Cell::Procedure(procedure) => procedure.apply_step(args),
        cell => Err(InvalidProcedure(cell.to_string())),
    }
}

impl PartialEq for Procedure {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Procedure {}

impl Display for Procedure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.inner.as_ref() {
            Callable::Builtin { name, .. } | Callable::TailBuiltin { name, .. } => {
                write!(f, "#<procedure:{}>", name)
            }
            Callable::Lambda(Code {
                name: Some(name), ..
            }) => write!(f, "#<procedure:{}>", name),
            Callable::Lambda(code) => write!(f, "#<procedure:(λ {})>", code.params),
        }
    }
}

impl Debug for Procedure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

use log::trace;
use std::fmt::{Debug, Display, Formatter};

/// Error Type
///
/// The only way a dispatch can fail: no clause matched the value and
/// the switch has no fallback. The offending value is rendered into
/// the error for diagnostics.
#[derive(thiserror::Error, Debug, Eq, PartialEq, Clone)]
pub enum Error {
    #[error("unrecognized input: {0}")]
    UnrecognizedInput(String),
}

type ValueFn<T, R> = Box<dyn Fn(&T) -> R + Send + Sync>;
type EnvFn<T, E, R> = Box<dyn Fn(&T, &E) -> R + Send + Sync>;

/// Predicate
///
/// The test half of a [`Clause`]. A predicate either looks only at
/// the value, or at the value and the environment. `Always` matches
/// unconditionally and is how an `else` clause is spelled inline.
pub enum Predicate<T, E> {
    Always,
    Value(ValueFn<T, bool>),
    WithEnv(EnvFn<T, E, bool>),
}

impl<T, E> Predicate<T, E> {
    pub fn always() -> Self {
        Predicate::Always
    }

    pub fn value<P: Fn(&T) -> bool + Send + Sync + 'static>(predicate: P) -> Self {
        Predicate::Value(Box::new(predicate))
    }

    pub fn with_env<P: Fn(&T, &E) -> bool + Send + Sync + 'static>(predicate: P) -> Self {
        Predicate::WithEnv(Box::new(predicate))
    }

    pub fn needs_env(&self) -> bool {
        matches!(self, Predicate::WithEnv(_))
    }

    /// Test
    ///
    /// Returns None if the predicate requires an environment and none
    /// was supplied, otherwise Some(matched).
    fn test(&self, value: &T, env: Option<&E>) -> Option<bool> {
        match (self, env) {
            (Predicate::Always, _) => Some(true),
            (Predicate::Value(predicate), _) => Some(predicate(value)),
            (Predicate::WithEnv(predicate), Some(env)) => Some(predicate(value, env)),
            (Predicate::WithEnv(_), None) => None,
        }
    }
}

/// Consequent
///
/// The transformation half of a [`Clause`], invoked once its paired
/// predicate has matched.
pub enum Consequent<T, E, R> {
    Value(ValueFn<T, R>),
    WithEnv(EnvFn<T, E, R>),
}

impl<T, E, R> Consequent<T, E, R> {
    pub fn value<C: Fn(&T) -> R + Send + Sync + 'static>(consequent: C) -> Self {
        Consequent::Value(Box::new(consequent))
    }

    pub fn with_env<C: Fn(&T, &E) -> R + Send + Sync + 'static>(consequent: C) -> Self {
        Consequent::WithEnv(Box::new(consequent))
    }

    pub fn needs_env(&self) -> bool {
        matches!(self, Consequent::WithEnv(_))
    }

    fn invoke(&self, value: &T, env: Option<&E>) -> Option<R> {
        match (self, env) {
            (Consequent::Value(consequent), _) => Some(consequent(value)),
            (Consequent::WithEnv(consequent), Some(env)) => Some(consequent(value, env)),
            (Consequent::WithEnv(_), None) => None,
        }
    }
}

/// Clause
///
/// A (predicate, consequent) pair in a dispatch table.
pub struct Clause<T, E, R> {
    predicate: Predicate<T, E>,
    consequent: Consequent<T, E, R>,
}

impl<T, E, R> Clause<T, E, R> {
    pub fn new(predicate: Predicate<T, E>, consequent: Consequent<T, E, R>) -> Self {
        Clause {
            predicate,
            consequent,
        }
    }

    /// A clause that must be given an environment to take part in
    /// dispatch.
    pub fn needs_env(&self) -> bool {
        self.predicate.needs_env() || self.consequent.needs_env()
    }
}

impl<T, E, R> Debug for Clause<T, E, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clause")
            .field("needs_env", &self.needs_env())
            .finish()
    }
}

/// Switch
///
/// An ordered table of clauses dispatched with first-match semantics.
///
/// Evaluating a value scans the clauses in declaration order. The
/// first clause whose predicate returns true has its consequent
/// invoked with the value (and the environment, if the clause asks
/// for it), and the consequent's result is returned. Later clauses
/// are never consulted. If nothing matches, the fallback fires; with
/// no fallback the call fails with [`Error::UnrecognizedInput`].
///
/// A switch is immutable once built and its closures are
/// `Send + Sync`, so one table may be shared between threads and
/// evaluated concurrently.
///
/// # Examples
///
/// ```
/// use sluice::switch::Switch;
///
/// let abs: Switch<i64, (), i64> = Switch::new()
///     .case(|n| *n < 0, |n| -n)
///     .otherwise(|n| *n);
///
/// assert_eq!(abs.evaluate(&-3), Ok(3));
/// assert_eq!(abs.evaluate(&4), Ok(4));
/// ```
pub struct Switch<T, E, R> {
    clauses: Vec<Clause<T, E, R>>,
    fallback: Option<Consequent<T, E, R>>,
}

impl<T, E, R> Switch<T, E, R> {
    pub fn new() -> Self {
        Switch {
            clauses: vec![],
            fallback: None,
        }
    }

    /// Case
    ///
    /// Append a clause whose predicate and consequent only look at the
    /// value being dispatched.
    pub fn case<P, C>(self, predicate: P, consequent: C) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
        C: Fn(&T) -> R + Send + Sync + 'static,
    {
        self.clause(Clause::new(
            Predicate::value(predicate),
            Consequent::value(consequent),
        ))
    }

    /// Case With Env
    ///
    /// Append a clause whose predicate looks at the value and whose
    /// consequent is given the value and the environment.
    pub fn case_with_env<P, C>(self, predicate: P, consequent: C) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
        C: Fn(&T, &E) -> R + Send + Sync + 'static,
    {
        self.clause(Clause::new(
            Predicate::value(predicate),
            Consequent::with_env(consequent),
        ))
    }

    pub fn clause(mut self, clause: Clause<T, E, R>) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn otherwise<C: Fn(&T) -> R + Send + Sync + 'static>(mut self, consequent: C) -> Self {
        self.fallback = Some(Consequent::value(consequent));
        self
    }

    pub fn otherwise_with_env<C: Fn(&T, &E) -> R + Send + Sync + 'static>(
        mut self,
        consequent: C,
    ) -> Self {
        self.fallback = Some(Consequent::with_env(consequent));
        self
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Classify
    ///
    /// Return the index of the first clause matching `value`, without
    /// invoking any consequent. Clauses that need an environment are
    /// skipped when `env` is None.
    pub fn classify(&self, value: &T, env: Option<&E>) -> Option<usize> {
        self.clauses.iter().position(|clause| {
            if env.is_none() && clause.consequent.needs_env() {
                return false;
            }
            clause.predicate.test(value, env).unwrap_or(false)
        })
    }

    /// Evaluate
    ///
    /// Dispatch `value` with no environment.
    pub fn evaluate(&self, value: &T) -> Result<R, Error>
    where
        T: Display,
    {
        self.dispatch(value, None)
    }

    /// Evaluate In
    ///
    /// Dispatch `value`, threading `env` to every predicate and
    /// consequent that asks for it.
    pub fn evaluate_in(&self, value: &T, env: &E) -> Result<R, Error>
    where
        T: Display,
    {
        self.dispatch(value, Some(env))
    }

    fn dispatch(&self, value: &T, env: Option<&E>) -> Result<R, Error>
    where
        T: Display,
    {
        if let Some(idx) = self.classify(value, env) {
            trace!("clause {} matched {}", idx, value);
            if let Some(result) = self.clauses[idx].consequent.invoke(value, env) {
                return Ok(result);
            }
        }

        match self.fallback.as_ref().and_then(|it| it.invoke(value, env)) {
            Some(result) => {
                trace!("fallback matched {}", value);
                Ok(result)
            }
            None => Err(Error::UnrecognizedInput(value.to_string())),
        }
    }
}

impl<T, E, U, X> Switch<T, E, Result<U, X>>
where
    X: From<Error>,
{
    /// Try Evaluate In
    ///
    /// Like [`Switch::evaluate_in`] for tables whose consequents are
    /// themselves fallible, folding a failed dispatch into the
    /// consequents' error type.
    pub fn try_evaluate_in(&self, value: &T, env: &E) -> Result<U, X>
    where
        T: Display,
    {
        self.evaluate_in(value, env)?
    }

    pub fn try_evaluate(&self, value: &T) -> Result<U, X>
    where
        T: Display,
    {
        self.evaluate(value)?
    }
}

impl<T, E, R> Default for Switch<T, E, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E, R> Debug for Switch<T, E, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Switch")
            .field("clauses", &self.clauses)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn negate_or_identity() -> Switch<i64, (), i64> {
        Switch::new().case(|n| *n < 0, |n| -n).otherwise(|n| *n)
    }

    #[test]
    fn negative_or_else() {
        let switch = negate_or_identity();
        assert_eq!(switch.evaluate(&-3), Ok(3));
        assert_eq!(switch.evaluate(&4), Ok(4));
        assert_eq!(switch.evaluate(&0), Ok(0));
    }

    #[test]
    fn unrecognized_input() {
        let switch: Switch<i64, (), &str> = Switch::new()
            .case(|n| *n < 0, |_| "negative")
            .case(|n| *n == 0, |_| "zero");
        assert_eq!(switch.evaluate(&-1), Ok("negative"));
        assert_eq!(switch.evaluate(&0), Ok("zero"));
        assert_eq!(
            switch.evaluate(&42),
            Err(Error::UnrecognizedInput("42".into()))
        );
        assert_eq!(
            switch.evaluate(&42).unwrap_err().to_string(),
            "unrecognized input: 42"
        );
    }

    #[test]
    fn empty_switch_rejects_everything() {
        let switch: Switch<i64, (), i64> = Switch::new();
        assert!(switch.is_empty());
        assert!(!switch.has_fallback());
        assert!(matches!(
            switch.evaluate(&1),
            Err(Error::UnrecognizedInput(_))
        ));
    }

    #[test]
    fn first_match_wins() {
        let even_first: Switch<i64, (), &str> = Switch::new()
            .case(|n| n % 2 == 0, |_| "even")
            .case(|n| *n > 10, |_| "large");
        let large_first: Switch<i64, (), &str> = Switch::new()
            .case(|n| *n > 10, |_| "large")
            .case(|n| n % 2 == 0, |_| "even");

        assert_eq!(even_first.evaluate(&12), Ok("even"));
        assert_eq!(large_first.evaluate(&12), Ok("large"));
        assert_eq!(even_first.classify(&12, None), Some(0));
        assert_eq!(large_first.classify(&11, None), Some(0));
        assert_eq!(even_first.classify(&3, None), None);
    }

    #[test]
    fn consequent_fires_once_and_scan_stops() {
        let tested = Arc::new(AtomicUsize::new(0));
        let fired = Arc::new(AtomicUsize::new(0));

        let (t1, t2, f1, f2) = (tested.clone(), tested.clone(), fired.clone(), fired.clone());
        let switch: Switch<i64, (), i64> = Switch::new()
            .case(
                move |n| {
                    t1.fetch_add(1, Ordering::SeqCst);
                    *n > 0
                },
                move |n| {
                    f1.fetch_add(1, Ordering::SeqCst);
                    *n
                },
            )
            .case(
                move |_| {
                    t2.fetch_add(100, Ordering::SeqCst);
                    true
                },
                move |_| {
                    f2.fetch_add(100, Ordering::SeqCst);
                    0
                },
            );

        assert_eq!(switch.evaluate(&5), Ok(5));
        assert_eq!(tested.load(Ordering::SeqCst), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn environment_is_threaded() {
        let switch: Switch<i64, i64, i64> = Switch::new()
            .clause(Clause::new(
                Predicate::with_env(|n, limit| n > limit),
                Consequent::with_env(|_, limit| *limit),
            ))
            .case_with_env(|n| *n < 0, |n, limit| n + limit)
            .otherwise(|n| *n);

        assert_eq!(switch.evaluate_in(&50, &10), Ok(10));
        assert_eq!(switch.evaluate_in(&-5, &10), Ok(5));
        assert_eq!(switch.evaluate_in(&5, &10), Ok(5));
    }

    #[test]
    fn env_clauses_are_skipped_without_env() {
        let switch: Switch<i64, i64, &str> = Switch::new()
            .case_with_env(|_| true, |_, _| "with env")
            .case(|_| true, |_| "plain");

        assert_eq!(switch.evaluate_in(&1, &0), Ok("with env"));
        assert_eq!(switch.evaluate(&1), Ok("plain"));
        assert_eq!(switch.classify(&1, None), Some(1));
    }

    #[test]
    fn env_fallback_without_env_is_unrecognized() {
        let switch: Switch<i64, i64, i64> = Switch::new().otherwise_with_env(|n, e| n + e);
        assert_eq!(switch.evaluate_in(&1, &2), Ok(3));
        assert_eq!(
            switch.evaluate(&1),
            Err(Error::UnrecognizedInput("1".into()))
        );
    }

    #[test]
    fn always_predicate() {
        let switch: Switch<&str, (), usize> = Switch::new()
            .case(|s: &&str| s.is_empty(), |_| 0)
            .clause(Clause::new(
                Predicate::always(),
                Consequent::value(|s: &&str| s.len()),
            ));
        assert_eq!(switch.evaluate(&""), Ok(0));
        assert_eq!(switch.evaluate(&"flow"), Ok(4));
        assert_eq!(switch.len(), 2);
    }

    #[derive(Debug, PartialEq)]
    enum Failure {
        Dispatch(Error),
        Odd(i64),
    }

    impl From<Error> for Failure {
        fn from(e: Error) -> Self {
            Failure::Dispatch(e)
        }
    }

    #[test]
    fn try_evaluate_flattens_errors() {
        let switch: Switch<i64, (), Result<i64, Failure>> = Switch::new().case(
            |n| *n >= 0,
            |n| if n % 2 == 0 { Ok(n / 2) } else { Err(Failure::Odd(*n)) },
        );

        assert_eq!(switch.try_evaluate(&8), Ok(4));
        assert_eq!(switch.try_evaluate(&7), Err(Failure::Odd(7)));
        assert_eq!(
            switch.try_evaluate(&-1),
            Err(Failure::Dispatch(Error::UnrecognizedInput("-1".into())))
        );
    }

    #[test]
    fn shared_between_threads() {
        let switch = Arc::new(negate_or_identity());
        let handles = (-4..4)
            .map(|n| {
                let switch = switch.clone();
                std::thread::spawn(move || switch.evaluate(&n))
            })
            .collect::<Vec<_>>();
        let results = handles
            .into_iter()
            .map(|it| it.join().unwrap().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(results, vec![4, 3, 2, 1, 0, 1, 2, 3]);
    }
}

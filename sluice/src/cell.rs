use crate::eval::procedure::Procedure;
use crate::number::Number;
use ::lazy_static::lazy_static;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

#[derive(Debug, Eq, Clone)]
pub enum Cell {
    Bool(bool),
    Nil,
    Number(Number),
    Pair(Rc<Cell>, Rc<Cell>),
    String(String),
    Symbol(String),
    Procedure(Procedure),
    Void,
}

impl Cell {
    pub fn new_symbol(val: &str) -> Cell {
        Cell::Symbol(val.into())
    }

    pub fn new_string(val: &str) -> Cell {
        Cell::String(val.into())
    }

    pub fn new_list<T: IntoIterator<Item = Cell>>(iter: T) -> Cell {
        Cell::construct_list(iter, Cell::Nil)
    }

    pub fn new_improper_list<T: IntoIterator<Item = Cell>>(iter: T, cdr: Cell) -> Cell {
        Cell::construct_list(iter, cdr)
    }

    /// Construct List
    ///
    /// Build a chain of pairs with each value in car and the rest of
    /// the list in cdr. The final pair's cdr is `last_cdr`, which is
    /// '() for a proper list:
    ///
    ///```text
    /// [car][cdr]
    ///        `--[car][cdr]
    ///                  `---[car][last_cdr]
    /// ```
    /// Pairs are shared, so the list is assembled back to front.
    fn construct_list<T: IntoIterator<Item = Cell>>(iter: T, last_cdr: Cell) -> Cell {
        iter.into_iter()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .fold(last_cdr, |cdr, car| Cell::new_pair(car, cdr))
    }

    pub fn new_pair(car: Cell, cdr: Cell) -> Cell {
        Cell::Pair(Rc::new(car), Rc::new(cdr))
    }

    pub fn iter(&self) -> IntoIter<'_> {
        IntoIter { next: Some(self) }
    }

    pub fn collect_vec(&self) -> Vec<&Cell> {
        self.iter().collect::<Vec<_>>()
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Cell::Nil)
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, Cell::Pair(_, _))
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Cell::Symbol(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Cell::Number(_))
    }

    pub fn is_procedure(&self) -> bool {
        matches!(self, Cell::Procedure(_))
    }

    /// Anything but #f counts as true.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Cell::Bool(false))
    }

    /// Is List
    ///
    /// True for a non-empty chain of pairs terminated by '().
    pub fn is_list(&self) -> bool {
        let mut rest = self;
        if !rest.is_pair() {
            return false;
        }
        while let Cell::Pair(_, cdr) = rest {
            rest = cdr.as_ref();
        }
        rest.is_nil()
    }

    pub fn is_improper_list(&self) -> bool {
        self.is_pair() && !self.is_list()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_quote(&self) -> bool {
        self.is_symbol_str("quote")
    }

    pub fn is_symbol_str(&self, s: &str) -> bool {
        match self.as_symbol() {
            Some(sym) => sym == s,
            _ => false,
        }
    }

    /// Is Form
    ///
    /// Return true if this cell is a proper list headed by the symbol
    /// `keyword`, e.g. `(if ...)`.
    pub fn is_form(&self, keyword: &str) -> bool {
        match self {
            Cell::Pair(car, _) => car.is_symbol_str(keyword) && self.is_list(),
            _ => false,
        }
    }

    /// Is Primitive Symbol
    ///
    /// Return true if the given cell names a special form, which may not
    /// be referenced or rebound as a variable.
    pub fn is_primitive_symbol(&self) -> bool {
        lazy_static! {
            static ref PRIMITIVE_SYMBOLS: HashSet<&'static str> = HashSet::from([
                "and", "begin", "cond", "define", "if", "lambda", "let", "let*", "or", "quote",
                "set!", "switch", "λ"
            ]);
        }
        match self {
            Cell::Symbol(sym) => PRIMITIVE_SYMBOLS.contains(sym.as_str()),
            _ => false,
        }
    }

    pub fn car(&self) -> Option<&Cell> {
        match self {
            Cell::Pair(car, _) => Some(car.as_ref()),
            _ => None,
        }
    }

    pub fn cdr(&self) -> Option<&Cell> {
        match self {
            Cell::Pair(_, cdr) => Some(cdr.as_ref()),
            _ => None,
        }
    }

    pub fn cadr(&self) -> Option<&Cell> {
        self.cdr().and_then(Cell::car)
    }

    pub fn cddr(&self) -> Option<&Cell> {
        self.cdr().and_then(Cell::cdr)
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Cell::Number(val) => Some(val),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Cell::Symbol(val) => Some(val),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Bool(val) => Some(*val),
            _ => None,
        }
    }

    pub fn as_procedure(&self) -> Option<&Procedure> {
        match self {
            Cell::Procedure(procedure) => Some(procedure),
            _ => None,
        }
    }

    /// A short name for the cell's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Cell::Bool(_) => "boolean",
            Cell::Nil => "null",
            Cell::Number(_) => "number",
            Cell::Pair(_, _) => "pair",
            Cell::String(_) => "string",
            Cell::Symbol(_) => "symbol",
            Cell::Procedure(_) => "procedure",
            Cell::Void => "void",
        }
    }
}

impl From<bool> for Cell {
    fn from(val: bool) -> Self {
        Cell::Bool(val)
    }
}

impl From<&str> for Cell {
    fn from(val: &str) -> Self {
        Cell::Symbol(val.into())
    }
}

impl From<i64> for Cell {
    fn from(val: i64) -> Self {
        Cell::Number(Number::Fixnum(val))
    }
}

impl From<f64> for Cell {
    fn from(val: f64) -> Self {
        Cell::Number(Number::Float(val))
    }
}

impl From<Number> for Cell {
    fn from(val: Number) -> Self {
        Cell::Number(val)
    }
}

impl From<Procedure> for Cell {
    fn from(val: Procedure) -> Self {
        Cell::Procedure(val)
    }
}

impl From<Vec<Cell>> for Cell {
    fn from(val: Vec<Cell>) -> Self {
        Cell::new_list(val)
    }
}

/// Borrowing iterator over a list. Iterating an improper list yields
/// the final cdr as its last item; iterating an atom yields the atom.
pub struct IntoIter<'a> {
    next: Option<&'a Cell>,
}

impl<'a> Iterator for IntoIter<'a> {
    type Item = &'a Cell;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next? {
            Cell::Pair(car, cdr) => {
                self.next = Some(cdr.as_ref());
                Some(car.as_ref())
            }
            Cell::Nil => None,
            cell => {
                self.next = None;
                Some(cell)
            }
        }
    }
}

impl<'a> IntoIterator for &'a Cell {
    type Item = &'a Cell;
    type IntoIter = IntoIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { next: Some(self) }
    }
}

pub struct Iter {
    next: Option<Cell>,
}

impl Iterator for Iter {
    type Item = Cell;

    fn next(&mut self) -> Option<Self::Item> {
        let mut cell = self.next.take()?;
        if let Cell::Pair(car, cdr) = &mut cell {
            self.next = Some(take(cdr));
            return Some(take(car));
        }
        match cell {
            Cell::Nil => None,
            cell => Some(cell),
        }
    }
}

impl IntoIterator for Cell {
    type Item = Cell;
    type IntoIter = Iter;

    fn into_iter(self) -> Self::IntoIter {
        Iter { next: Some(self) }
    }
}

/// Move the cell out of `rc`, cloning it only if it is shared, and
/// leave '() in its place.
fn take(rc: &mut Rc<Cell>) -> Cell {
    Rc::unwrap_or_clone(std::mem::replace(rc, Rc::new(Cell::Nil)))
}

/// Detach the cdr of a pair when it continues the list and nothing else
/// owns it.
fn unlink_tail(cell: &mut Cell) -> Option<Rc<Cell>> {
    match cell {
        Cell::Pair(_, cdr) if cdr.is_pair() && Rc::strong_count(cdr) == 1 => {
            Some(std::mem::replace(cdr, Rc::new(Cell::Nil)))
        }
        _ => None,
    }
}

// Lists are unlinked one pair at a time, otherwise dropping a long list
// recurses once per pair.
impl Drop for Cell {
    fn drop(&mut self) {
        let mut tail = unlink_tail(self);
        while let Some(next) = tail {
            tail = match Rc::try_unwrap(next) {
                Ok(mut pair) => unlink_tail(&mut pair),
                Err(_) => None,
            };
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        let (mut lhs, mut rhs) = (self, other);
        loop {
            match (lhs, rhs) {
                (Cell::Pair(car1, cdr1), Cell::Pair(car2, cdr2)) => {
                    if car1 != car2 {
                        return false;
                    }
                    lhs = cdr1.as_ref();
                    rhs = cdr2.as_ref();
                }
                (Cell::Bool(x), Cell::Bool(y)) => return x == y,
                (Cell::Number(x), Cell::Number(y)) => return x == y,
                (Cell::String(x), Cell::String(y)) => return x == y,
                (Cell::Symbol(x), Cell::Symbol(y)) => return x == y,
                (Cell::Procedure(x), Cell::Procedure(y)) => return x == y,
                (Cell::Nil, Cell::Nil) | (Cell::Void, Cell::Void) => return true,
                _ => return false,
            }
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Pair(car, cdr) => {
                // sugar quote any list in the exact form (quote x)
                if car.is_quote() && cdr.cdr().is_some_and(Cell::is_nil) {
                    if let Some(quoted) = cdr.car() {
                        write!(f, "'")?;
                        return Display::fmt(quoted, f);
                    }
                }
                write!(f, "(")?;
                let mut car = car;
                let mut cdr = cdr;
                loop {
                    Display::fmt(car.as_ref(), f)?;
                    match cdr.as_ref() {
                        Cell::Nil => return write!(f, ")"),
                        Cell::Pair(ncar, ncdr) => {
                            write!(f, " ")?;
                            car = ncar;
                            cdr = ncdr;
                        }
                        _ => {
                            write!(f, " . ")?;
                            Display::fmt(cdr.as_ref(), f)?;
                            return write!(f, ")");
                        }
                    }
                }
            }
            Cell::Bool(val) => {
                write!(f, "{}", if *val { "#t" } else { "#f" })
            }
            Cell::Number(val) => {
                write!(f, "{}", val)
            }
            Cell::String(val) => match f.alternate() {
                false => write!(f, "{}", val),
                true => {
                    write!(f, "\"")?;
                    for it in val.chars() {
                        match it {
                            '"' | '\\' => write!(f, "\\{}", it)?,
                            '\t' => write!(f, "\\t")?,
                            '\n' => write!(f, "\\n")?,
                            '\r' => write!(f, "\\r")?,
                            it => write!(f, "{}", it)?,
                        };
                    }
                    write!(f, "\"")
                }
            },
            Cell::Symbol(val) => {
                write!(f, "{}", val)
            }
            Cell::Nil => {
                write!(f, "()")
            }
            Cell::Procedure(procedure) => {
                write!(f, "{}", procedure)
            }
            Cell::Void => {
                write!(f, "#<void>")
            }
        }
    }
}

#[macro_export]
macro_rules! cell {
    () => {
        Cell::Nil
    };
    ($elt:expr) => {
        Cell::from($elt)
    };
    ($($elt:expr),+) => {{
        let mut v = vec![];
        $(v.push(Cell::from($elt));)+
        Cell::from(v)
    }};
}

#[macro_export]
macro_rules! void {
    () => {
        Cell::Void
    };
}

#[macro_export]
macro_rules! cons {
    () => {
        Cell::new_pair(Cell::Nil, Cell::Nil)
    };
    ($car:expr) => {
        Cell::new_pair(Cell::from($car), Cell::Nil)
    };
    ($car:expr, $cdr:expr) => {
        Cell::new_pair(Cell::from($car), Cell::from($cdr))
    };
}

#[macro_export]
macro_rules! list {
    () => {
        Cell::new_list(vec!())
    };
    ($($elt:expr),+) => {{
        let v = vec![$(Cell::from($elt),)+];
        Cell::from(v)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq() {
        assert_eq!(cell![16], Cell::Number(Number::Fixnum(16)));
        assert_eq!(Cell::new_symbol("foo"), Cell::new_symbol("foo"));
        assert_eq!(list!["foo", "bar"], list!["foo", "bar"]);
        assert_ne!(list!["foo", "bar"], list!["foo"]);
        assert_eq!(Cell::Nil, Cell::Nil);
    }

    #[test]
    fn cell_macro() {
        assert_eq!(cell![], Cell::Nil);
        assert_eq!(cell!["foo"], Cell::Symbol("foo".into()));
        assert_eq!(cell![-42], Cell::Number(Number::Fixnum(-42)));
        assert_eq!(
            cell![0, 1, 2],
            Cell::new_list(vec![cell![0], cell![1], cell![2]])
        );
        assert_eq!(
            cell!["foo", cell![0, 1]],
            Cell::new_list(vec![cell!["foo"], Cell::new_list(vec![cell![0], cell![1]])])
        );
        assert_eq!(list![], Cell::Nil);
    }

    #[test]
    fn proper_and_improper_lists() {
        assert!(list![1, 2, 3].is_list());
        assert!(!Cell::Nil.is_list());
        assert!(!cell![1].is_list());

        let improper = Cell::new_improper_list(vec![cell![1], cell![2]], cell![3]);
        assert!(!improper.is_list());
        assert!(improper.is_improper_list());
        assert_eq!(improper, cons!(1, cons!(2, 3)));
        assert_eq!(format!("{}", improper), "(1 2 . 3)");
    }

    #[test]
    fn forms() {
        assert!(list!["if", 1, 2].is_form("if"));
        assert!(!list!["if", 1, 2].is_form("quote"));
        assert!(!cons!("if", 1).is_form("if"));
        assert!(!cell!["if"].is_form("if"));
        assert!(cell!["lambda"].is_primitive_symbol());
        assert!(cell!["switch"].is_primitive_symbol());
        assert!(!cell!["map"].is_primitive_symbol());
    }

    #[test]
    fn truthiness() {
        assert!(cell![true].is_truthy());
        assert!(!cell![false].is_truthy());
        assert!(Cell::Nil.is_truthy());
        assert!(cell![0].is_truthy());
    }

    #[test]
    fn iter() {
        assert_eq!(
            list![1, 2, 3].iter().cloned().collect::<Vec<Cell>>(),
            vec![cell![1], cell![2], cell![3]]
        );
        assert_eq!(cell![1].iter().collect::<Vec<_>>(), vec![&cell![1]]);
        assert_eq!(
            cons!(1, cons!(2, 3)).iter().collect::<Vec<_>>(),
            vec![&cell![1], &cell![2], &cell![3]]
        );
        assert_eq!(list![1, 2, 3].len(), 3);
    }

    #[test]
    fn into_iter() {
        assert_eq!(
            list![1, 2, 3].into_iter().collect::<Vec<Cell>>(),
            vec![cell![1], cell![2], cell![3]]
        );
        assert_eq!(cell![1].into_iter().collect::<Vec<Cell>>(), vec![cell![1]]);
        assert_eq!(
            list![list![1, 2], list![3]]
                .into_iter()
                .flatten()
                .collect::<Vec<Cell>>(),
            vec![cell![1], cell![2], cell![3]]
        );
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Cell::Nil), "()");
        assert_eq!(format!("{}", cell![true]), "#t");
        assert_eq!(format!("{}", cell![false]), "#f");
        assert_eq!(format!("{}", cell![42]), "42");
        assert_eq!(format!("{}", cell!["foo"]), "foo");
        assert_eq!(format!("{}", list![1, 2, list![5, 6]]), "(1 2 (5 6))");
        assert_eq!(format!("{}", cons!("foo")), "(foo)");
        assert_eq!(format!("{}", cons!("foo", "bar")), "(foo . bar)");
        assert_eq!(format!("{}", cons!(cell!(), 42)), "(() . 42)");
        assert_eq!(format!("{}", Cell::Void), "#<void>");
    }

    #[test]
    fn display_strings() {
        let s = Cell::new_string("say \"hi\"\n");
        assert_eq!(format!("{}", s), "say \"hi\"\n");
        assert_eq!(format!("{:#}", s), r#""say \"hi\"\n""#);
        assert_eq!(format!("{:#}", list![Cell::new_string("a")]), r#"("a")"#);
    }

    #[test]
    fn display_quote() {
        assert_eq!(format!("{}", list!["quote", list![1, 2]]), "'(1 2)");
        assert_eq!(format!("{}", list!["quote", cons!["quote", 1]]), "'(quote . 1)");
        assert_eq!(format!("{}", list!["quote"]), "(quote)");
        assert_eq!(format!("{}", list!["quote", "quote", "quote"]), "(quote quote quote)");
    }

    #[test]
    fn long_lists() {
        let list = Cell::new_list((0..1_000_000i64).map(Cell::from));
        let same = Cell::new_list((0..1_000_000i64).map(Cell::from));
        let other = Cell::new_list((0..1_000_001i64).map(Cell::from));
        assert_eq!(list, same);
        assert_ne!(list, other);
        assert_eq!(list.len(), 1_000_000);

        let shared = list.cdr().cloned().unwrap();
        drop(list);
        assert_eq!(shared.car(), Some(&cell![1]));
        assert_eq!(shared.into_iter().count(), 999_999);
    }

    #[test]
    fn car_and_cdr() {
        assert_eq!(list![1, 2, 3].car(), Some(&cell![1]));
        assert_eq!(list![1, 2, 3].cdr(), Some(&list![2, 3]));
        assert_eq!(list![1, 2, 3].cadr(), Some(&cell![2]));
        assert_eq!(list![1, 2, 3].cddr(), Some(&list![3]));
        assert_eq!(cell![1].car(), None);
    }
}

use crate::cell::Cell;
use crate::eval::builtin::{check_argc, expect_index, expect_list, load_builtin};
use crate::eval::environment::Environment;
use crate::eval::Error;
use crate::eval::Error::InvalidArgs;

pub fn load_builtins(env: &Environment) {
    load_builtin(env, "append", append);
    load_builtin(env, "car", car);
    load_builtin(env, "cdr", cdr);
    load_builtin(env, "cons", cons);
    load_builtin(env, "length", length);
    load_builtin(env, "list", list);
    load_builtin(env, "list-ref", list_ref);
    load_builtin(env, "list-tail", list_tail);
    load_builtin(env, "list?", is_list);
    load_builtin(env, "null?", is_null);
    load_builtin(env, "pair?", is_pair);
    load_builtin(env, "reverse", reverse);
}

fn expect_pair(arg: &Cell, name: &str) -> Result<(), Error> {
    match arg.is_pair() {
        true => Ok(()),
        false => Err(InvalidArgs(name.into(), "pair".into(), arg.to_string())),
    }
}

pub fn car(args: &[Cell]) -> Result<Cell, Error> {
    check_argc(args, 1, Some(1), "car")?;
    expect_pair(&args[0], "car")?;
    Ok(args[0].car().cloned().unwrap_or(Cell::Nil))
}

pub fn cdr(args: &[Cell]) -> Result<Cell, Error> {
    check_argc(args, 1, Some(1), "cdr")?;
    expect_pair(&args[0], "cdr")?;
    Ok(args[0].cdr().cloned().unwrap_or(Cell::Nil))
}

pub fn cons(args: &[Cell]) -> Result<Cell, Error> {
    check_argc(args, 2, Some(2), "cons")?;
    Ok(Cell::new_pair(args[0].clone(), args[1].clone()))
}

pub fn list(args: &[Cell]) -> Result<Cell, Error> {
    Ok(Cell::new_list(args.iter().cloned()))
}

pub fn length(args: &[Cell]) -> Result<Cell, Error> {
    check_argc(args, 1, Some(1), "length")?;
    Ok(Cell::from(expect_list(&args[0], "length")?.len() as i64))
}

/// Append
///
/// Every argument but the last must be a list. The last argument
/// becomes the tail of the result as is, so `(append '(1) 2)` is the
/// improper list `(1 . 2)`.
pub fn append(args: &[Cell]) -> Result<Cell, Error> {
    let Some((last, init)) = args.split_last() else {
        return Ok(Cell::Nil);
    };
    let mut items = vec![];
    for arg in init {
        items.extend(expect_list(arg, "append")?.into_iter().cloned());
    }
    Ok(Cell::new_improper_list(items, last.clone()))
}

pub fn reverse(args: &[Cell]) -> Result<Cell, Error> {
    check_argc(args, 1, Some(1), "reverse")?;
    let items = expect_list(&args[0], "reverse")?;
    Ok(Cell::new_list(items.into_iter().rev().cloned()))
}

pub fn list_ref(args: &[Cell]) -> Result<Cell, Error> {
    check_argc(args, 2, Some(2), "list-ref")?;
    let idx = expect_index(&args[1], "list-ref")?;
    match list_tail_at(&args[0], idx, "list-ref")? {
        Cell::Pair(car, _) => Ok(car.as_ref().clone()),
        _ => Err(out_of_range("list-ref", idx)),
    }
}

pub fn list_tail(args: &[Cell]) -> Result<Cell, Error> {
    check_argc(args, 2, Some(2), "list-tail")?;
    let idx = expect_index(&args[1], "list-tail")?;
    Ok(list_tail_at(&args[0], idx, "list-tail")?.clone())
}

fn list_tail_at<'a>(list: &'a Cell, idx: usize, name: &str) -> Result<&'a Cell, Error> {
    let mut rest = list;
    for _ in 0..idx {
        rest = rest.cdr().ok_or_else(|| out_of_range(name, idx))?;
    }
    Ok(rest)
}

fn out_of_range(name: &str, idx: usize) -> Error {
    InvalidArgs(name.into(), "index within the list".into(), idx.to_string())
}

pub fn is_null(args: &[Cell]) -> Result<Cell, Error> {
    check_argc(args, 1, Some(1), "null?")?;
    Ok(args[0].is_nil().into())
}

pub fn is_pair(args: &[Cell]) -> Result<Cell, Error> {
    check_argc(args, 1, Some(1), "pair?")?;
    Ok(args[0].is_pair().into())
}

pub fn is_list(args: &[Cell]) -> Result<Cell, Error> {
    check_argc(args, 1, Some(1), "list?")?;
    Ok((args[0].is_nil() || args[0].is_list()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cell, cons, list};

    #[test]
    fn pair_access() {
        assert_eq!(car(&[list![1, 2]]), Ok(cell![1]));
        assert_eq!(cdr(&[list![1, 2]]), Ok(list![2]));
        assert_eq!(cdr(&[list![1]]), Ok(Cell::Nil));
        assert_eq!(
            car(&[Cell::Nil]),
            Err(InvalidArgs("car".into(), "pair".into(), "()".into()))
        );
        assert_eq!(cons(&[cell![1], cell![2]]), Ok(cons![1, 2]));
    }

    #[test]
    fn list_construction() {
        assert_eq!(list(&[]), Ok(Cell::Nil));
        assert_eq!(list(&[cell![1], cell![2]]), Ok(list![1, 2]));
        assert_eq!(length(&[list![1, 2, 3]]), Ok(cell![3]));
        assert_eq!(length(&[Cell::Nil]), Ok(cell![0]));
        assert!(length(&[cons![1, 2]]).is_err());
        assert_eq!(reverse(&[list![1, 2, 3]]), Ok(list![3, 2, 1]));
    }

    #[test]
    fn append_lists() {
        assert_eq!(append(&[]), Ok(Cell::Nil));
        assert_eq!(append(&[list![1], list![2, 3]]), Ok(list![1, 2, 3]));
        assert_eq!(append(&[Cell::Nil, list![1]]), Ok(list![1]));
        assert_eq!(append(&[list![1], cell![2]]), Ok(cons![1, 2]));
        assert_eq!(append(&[Cell::Nil, cell![5]]), Ok(cell![5]));
        assert!(append(&[cell![1], list![2]]).is_err());
    }

    #[test]
    fn indexing() {
        assert_eq!(list_ref(&[list![1, 2, 3], cell![1]]), Ok(cell![2]));
        assert!(list_ref(&[list![1, 2, 3], cell![3]]).is_err());
        assert_eq!(list_tail(&[list![1, 2, 3], cell![1]]), Ok(list![2, 3]));
        assert_eq!(list_tail(&[list![1, 2, 3], cell![3]]), Ok(Cell::Nil));
        assert!(list_tail(&[list![1, 2, 3], cell![4]]).is_err());
    }

    #[test]
    fn predicates() {
        assert_eq!(is_null(&[Cell::Nil]), Ok(cell![true]));
        assert_eq!(is_pair(&[cons![1, 2]]), Ok(cell![true]));
        assert_eq!(is_list(&[cons![1, 2]]), Ok(cell![false]));
        assert_eq!(is_list(&[Cell::Nil]), Ok(cell![true]));
    }
}

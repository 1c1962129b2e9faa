//! Reducer combinators (spec.md §4.6, supplemental): small building blocks
//! for writing a rule's reducer, grounded in `original_source/sly/reducers.py`
//! (`nth`, `select`, `append`, `appl`). Python's dynamic tuples let those
//! combinators return whatever shape the caller wants; with a single,
//! statically-typed `V` threaded through every rule, the Rust equivalents
//! take an explicit `combine` closure to produce that `V` instead.

use crate::rule::Reducer;

/// Picks the `n`-th RHS value unchanged. The common case: a rule like
/// `paren -> '(' expr ')'` reduces to `nth(1)`.
pub fn nth<V: Clone + 'static, E: 'static>(n: usize) -> Reducer<V, E> {
    std::rc::Rc::new(move |args: &[V]| Ok(args[n].clone()))
}

/// Alias for `nth(0)`, for single-symbol RHS rules like `expr -> term`.
pub fn identity<V: Clone + 'static, E: 'static>() -> Reducer<V, E> {
    nth(0)
}

/// Picks several RHS values by index and folds them into one `V` via
/// `combine`. Grounded on `reducers.py`'s `select(*positions)`.
pub fn select<V: Clone + 'static, E: 'static>(
    indices: Vec<usize>,
    combine: impl Fn(Vec<V>) -> V + 'static,
) -> Reducer<V, E> {
    std::rc::Rc::new(move |args: &[V]| {
        let picked = indices.iter().map(|&i| args[i].clone()).collect();
        Ok(combine(picked))
    })
}

/// Combines two RHS values at `left`/`right` via `combine`. Grounded on
/// `reducers.py`'s `append`, the usual shape for a left-recursive list rule
/// `items -> items item`.
pub fn append<V: Clone + 'static, E: 'static>(
    left: usize,
    right: usize,
    combine: impl Fn(V, V) -> V + 'static,
) -> Reducer<V, E> {
    std::rc::Rc::new(move |args: &[V]| Ok(combine(args[left].clone(), args[right].clone())))
}

/// Build a `Vec<RowValues>` for positional binding from plain Rust values.
///
/// ```rust
/// use sql_context::{RowValues, sql_params};
///
/// let values = sql_params![1, "x", None::<i64>];
/// assert_eq!(
///     values,
///     vec![RowValues::Int(1), RowValues::Text("x".into()), RowValues::Null]
/// );
/// ```
#[macro_export]
macro_rules! sql_params {
    () => {
        ::std::vec::Vec::<$crate::RowValues>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::RowValues::from($value)),+]
    };
}

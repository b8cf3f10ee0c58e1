//! 宏集合：为 builder 与谓词提供可变参数调用封装。

#[doc(hidden)]
#[macro_export]
macro_rules! __collect_strings {
    () => {
        Vec::<String>::new()
    };
    ($($value:expr),+ $(,)?) => {{
        let mut values = Vec::<String>::new();
        $(
            $crate::extend_into_strings($value, &mut values);
        )*
        values
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __builder_with_strings {
    ($builder:expr, $method:ident $(, $arg:expr)* $(,)?) => {
        $builder.$method($crate::__collect_strings!($($arg),*))
    };
}

pub trait IntoStrings {
    fn extend_into_strings(self, dst: &mut Vec<String>);
}

impl IntoStrings for String {
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.push(self);
    }
}

impl IntoStrings for &str {
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.push(self.to_string());
    }
}

impl<const N: usize, T> IntoStrings for [T; N]
where
    T: Into<String>,
{
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.extend(self.into_iter().map(Into::into));
    }
}

impl<T> IntoStrings for &[T]
where
    T: Into<String> + Clone,
{
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.extend(self.iter().cloned().map(Into::into));
    }
}

impl<T> IntoStrings for Vec<T>
where
    T: Into<String>,
{
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.extend(self.into_iter().map(Into::into));
    }
}

#[doc(hidden)]
pub fn extend_into_strings<T>(value: T, dst: &mut Vec<String>)
where
    T: IntoStrings,
{
    value.extend_into_strings(dst);
}

#[doc(hidden)]
pub fn collect_into_strings<T>(value: T) -> Vec<String>
where
    T: IntoStrings,
{
    let mut dst = Vec::new();
    value.extend_into_strings(&mut dst);
    dst
}

/// 为 `InsertBuilder::columns` 提供可变参数调用。
#[macro_export]
macro_rules! insert_cols {
    ($builder:expr $(, $col:expr)* $(,)?) => {
        $crate::__builder_with_strings!($builder, columns $(, $col)*)
    };
}

/// 为所有 `returning` 调用提供可变参数调用（Insert/Delete）。
#[macro_export]
macro_rules! returning_cols {
    ($builder:expr $(, $col:expr)* $(,)?) => {
        $crate::__builder_with_strings!($builder, returning $(, $col)*)
    };
}

/// `and!(p1, p2, ...)`：等价于 `predicate::and([p1, p2, ...])`。
#[macro_export]
macro_rules! and {
    ($($pred:expr),* $(,)?) => {
        $crate::predicate::and(::std::vec![$($pred),*])
    };
}

/// `or!(p1, p2, ...)`：等价于 `predicate::or([p1, p2, ...])`。
#[macro_export]
macro_rules! or {
    ($($pred:expr),* $(,)?) => {
        $crate::predicate::or(::std::vec![$($pred),*])
    };
}

#[cfg(test)]
mod tests {
    use super::collect_into_strings;
    use pretty_assertions::assert_eq;

    #[test]
    fn collect_from_various_sources() {
        assert_eq!(collect_into_strings("a"), vec!["a".to_string()]);
        assert_eq!(collect_into_strings(["a", "b"]), vec!["a", "b"]);
        assert_eq!(collect_into_strings(&["a", "b"][..]), vec!["a", "b"]);
        assert_eq!(
            collect_into_strings(vec![String::from("x")]),
            vec!["x".to_string()]
        );
        let cols = crate::__collect_strings!("a", ["b", "c"], String::from("d"));
        assert_eq!(cols, vec!["a", "b", "c", "d"]);
    }
}

use std::collections::BTreeMap;

/// Marker carried by [`Value::Skip`].
///
/// It has no public constructor: the only way to obtain one is [`skip()`],
/// so a skip can never be confused with a string or any other argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Skip {
    _private: (),
}

/// Returns the skip sentinel.
///
/// Binding it to a placeholder drops the innermost block that contains the
/// placeholder from the built query.
///
/// ```
/// use sqlx_query_template::{Dialect, skip};
///
/// let sql = Dialect::MySql
///     .template()
///     .build("SELECT * FROM t {WHERE id = ?d}", (skip(),));
/// assert_eq!(sql, "SELECT * FROM t ");
/// ```
pub fn skip() -> Value {
    Value::Skip(Skip { _private: () })
}

/// A template argument.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Plain sequence, rendered as `a, b, c` by `?a`.
    List(Vec<Value>),
    /// Ordered key/value pairs, rendered as `` `k` = v `` by `?a`.
    Map(Vec<(String, Value)>),
    Skip(Skip),
}

impl Value {
    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Builds a [`Value::Map`], keeping the iteration order of `pairs`.
    pub fn map<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Value::Skip(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_))
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Skip(_) => "skip",
        }
    }

    /// Integer coercion applied by `?d`. `None` means SQL `NULL`.
    ///
    /// Strings contribute their leading numeric prefix (`"12abc"` is 12,
    /// `"abc"` is 0), floats truncate toward zero and saturate, collections
    /// are 0 when empty and 1 otherwise.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Value::Null | Value::Skip(_) => None,
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Int(n) => Some(*n),
            Value::Float(f) => Some(float_to_i64(*f)),
            Value::Str(s) => Some(str_to_i64(s)),
            Value::List(items) => Some(i64::from(!items.is_empty())),
            Value::Map(pairs) => Some(i64::from(!pairs.is_empty())),
        }
    }

    /// Float coercion applied by `?f`. `None` means SQL `NULL`.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Null | Value::Skip(_) => None,
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::Str(s) => Some(numeric_prefix(s).0.parse().unwrap_or(0.0)),
            Value::List(items) => Some(if items.is_empty() { 0.0 } else { 1.0 }),
            Value::Map(pairs) => Some(if pairs.is_empty() { 0.0 } else { 1.0 }),
        }
    }
}

fn float_to_i64(f: f64) -> i64 {
    // `as` truncates and saturates
    if f.is_finite() { f as i64 } else { 0 }
}

fn str_to_i64(s: &str) -> i64 {
    let (prefix, integral) = numeric_prefix(s);
    if prefix.is_empty() {
        return 0;
    }
    if integral {
        prefix.parse().unwrap_or(if prefix.starts_with('-') {
            i64::MIN
        } else {
            i64::MAX
        })
    } else {
        float_to_i64(prefix.parse().unwrap_or(0.0))
    }
}

/// Longest leading `[+-]digits[.digits][e[+-]digits]` of `s` after leading
/// whitespace, and whether it has neither fraction nor exponent.
fn numeric_prefix(s: &str) -> (&str, bool) {
    let s = s.trim_start_matches([' ', '\t', '\n', '\r', '\x0b', '\x0c']);
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut has_digits = int_end > end;
    end = int_end;
    let mut integral = true;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if has_digits || frac_end > end + 1 {
            has_digits = true;
            integral = false;
            end = frac_end;
        }
    }
    if !has_digits {
        return ("", true);
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            integral = false;
            end = exp_end;
        }
    }
    (&s[..end], integral)
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(i64::from(v))
            }
        })*
    };
}
impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}
/// Goes through the shortest `f32` text so `0.1f32` stays `0.1` rather than
/// its widened `0.10000000149011612`.
impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v.to_string().parse().unwrap_or(f64::from(v)))
    }
}
impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}
impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}
impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}
impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Str(v.clone())
    }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::list(v)
    }
}
impl<K: Into<String>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(v: BTreeMap<K, V>) -> Self {
        Value::map(v)
    }
}

/// Positional argument list accepted by [`QueryTemplate::build`](crate::QueryTemplate::build).
///
/// Tuples of up to twelve convertible values implement it, so most calls need
/// no explicit `Value`s. Structs can derive it with
/// [`QueryArgs`](crate::QueryArgs).
pub trait IntoArgs {
    fn into_args(self) -> Vec<Value>;
}

impl IntoArgs for Vec<Value> {
    fn into_args(self) -> Vec<Value> {
        self
    }
}
impl IntoArgs for &[Value] {
    fn into_args(self) -> Vec<Value> {
        self.to_vec()
    }
}
impl IntoArgs for &Vec<Value> {
    fn into_args(self) -> Vec<Value> {
        self.clone()
    }
}
impl<const N: usize> IntoArgs for [Value; N] {
    fn into_args(self) -> Vec<Value> {
        self.into()
    }
}
impl IntoArgs for () {
    fn into_args(self) -> Vec<Value> {
        Vec::new()
    }
}

macro_rules! impl_into_args_tuple {
    ($($name:ident),+) => {
        impl<$($name: Into<Value>),+> IntoArgs for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_args(self) -> Vec<Value> {
                let ($($name,)+) = self;
                vec![$($name.into()),+]
            }
        }
    };
}
impl_into_args_tuple!(A);
impl_into_args_tuple!(A, B);
impl_into_args_tuple!(A, B, C);
impl_into_args_tuple!(A, B, C, D);
impl_into_args_tuple!(A, B, C, D, E);
impl_into_args_tuple!(A, B, C, D, E, F);
impl_into_args_tuple!(A, B, C, D, E, F, G);
impl_into_args_tuple!(A, B, C, D, E, F, G, H);
impl_into_args_tuple!(A, B, C, D, E, F, G, H, I);
impl_into_args_tuple!(A, B, C, D, E, F, G, H, I, J);
impl_into_args_tuple!(A, B, C, D, E, F, G, H, I, J, K);
impl_into_args_tuple!(A, B, C, D, E, F, G, H, I, J, K, L);

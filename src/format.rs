use crate::{Escape, Tag, Value};

/// Appends `name` as a backtick-quoted identifier, doubling embedded
/// backticks.
///
/// ```
/// let mut out = String::new();
/// sqlx_query_template::quote_identifier("a`b", &mut out);
/// assert_eq!(out, "`a``b`");
/// ```
pub fn quote_identifier(name: &str, out: &mut String) {
    out.push('`');
    for c in name.chars() {
        if c == '`' {
            out.push('`');
        }
        out.push(c);
    }
    out.push('`');
}

/// Renders one placeholder value as SQL text.
///
/// String literals are escaped through the borrowed [`Escape`]
/// implementation; everything else is produced here.
pub struct Formatter<'e, E: ?Sized> {
    escaper: &'e E,
}

impl<'e, E: Escape + ?Sized> Formatter<'e, E> {
    pub fn new(escaper: &'e E) -> Self {
        Self { escaper }
    }

    pub fn format(&self, tag: Tag, value: &Value) -> String {
        let mut out = String::new();
        self.write(tag, value, &mut out);
        out
    }

    /// Appends the rendering of `value` for a placeholder tagged `tag`.
    pub fn write(&self, tag: Tag, value: &Value, out: &mut String) {
        match tag {
            Tag::Int => match value.to_i64() {
                Some(n) => out.push_str(&n.to_string()),
                None => out.push_str("NULL"),
            },
            Tag::Float => match value.to_f64() {
                Some(f) => write_float(f, out),
                None => out.push_str("NULL"),
            },
            Tag::Array => self.write_array(value, out),
            Tag::Ident => write_identifiers(value, out),
            Tag::Default => self.write_scalar(value, out),
        }
    }

    fn write_array(&self, value: &Value, out: &mut String) {
        match value {
            Value::List(items) => self.write_list(items, out),
            Value::Map(pairs) => {
                for (i, (key, item)) in pairs.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    quote_identifier(key, out);
                    out.push_str(" = ");
                    self.write_scalar(item, out);
                }
            }
            _ => out.push_str("NULL"),
        }
    }

    fn write_list(&self, items: &[Value], out: &mut String) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_scalar(item, out);
        }
    }

    fn write_scalar(&self, value: &Value, out: &mut String) {
        match value {
            Value::Null | Value::Map(_) | Value::Skip(_) => out.push_str("NULL"),
            Value::Bool(b) => out.push(if *b { '1' } else { '0' }),
            Value::Int(n) => out.push_str(&n.to_string()),
            Value::Float(f) => write_float(*f, out),
            Value::Str(s) => {
                out.push('\'');
                out.push_str(&self.escaper.escape_string(s));
                out.push('\'');
            }
            // nested lists become `IN`-ready tuples
            Value::List(items) => {
                out.push('(');
                self.write_list(items, out);
                out.push(')');
            }
        }
    }
}

fn write_float(f: f64, out: &mut String) {
    if f.is_finite() {
        out.push_str(&f.to_string());
    } else {
        out.push_str("NULL");
    }
}

fn write_identifiers(value: &Value, out: &mut String) {
    match value {
        Value::List(names) => write_identifier_list(names.iter(), out),
        // a map names its values, keys are ignored
        Value::Map(pairs) => write_identifier_list(pairs.iter().map(|(_, name)| name), out),
        name => write_identifier(name, out),
    }
}

fn write_identifier_list<'v>(names: impl Iterator<Item = &'v Value>, out: &mut String) {
    for (i, name) in names.enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_identifier(name, out);
    }
}

fn write_identifier(name: &Value, out: &mut String) {
    match name {
        Value::Str(s) => quote_identifier(s, out),
        Value::Int(n) => quote_identifier(&n.to_string(), out),
        Value::Float(f) => quote_identifier(&f.to_string(), out),
        Value::Bool(true) => quote_identifier("1", out),
        // null, false and anything non-scalar name nothing
        _ => quote_identifier("", out),
    }
}

use std::borrow::Cow;

use sqlx::Database;

use crate::{Error, QueryTemplate};

#[cfg(feature = "any")]
mod any;
#[cfg(feature = "any")]
pub use any::*;

/// String-literal escaping supplied by the database side.
///
/// Only the body of a quoted literal is passed in; the formatter adds the
/// surrounding single quotes. Identifiers never go through this trait.
pub trait Escape {
    fn escape_string<'a>(&self, raw: &'a str) -> Cow<'a, str>;
}

impl<T: Escape + ?Sized> Escape for &T {
    fn escape_string<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        (**self).escape_string(raw)
    }
}

impl<T: Escape + ?Sized> Escape for Box<T> {
    fn escape_string<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        (**self).escape_string(raw)
    }
}

/// Database dialect enumeration supporting major database systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// MySQL / MariaDB with backslash escapes enabled (the server default)
    MySql,
    /// MySQL / MariaDB whose `sql_mode` contains `NO_BACKSLASH_ESCAPES`
    MySqlNoBackslashEscapes,
    /// PostgreSQL with `standard_conforming_strings` on
    PostgreSql,
    /// PostgreSQL with `standard_conforming_strings` off, where `\` escapes
    /// inside ordinary string literals
    PostgreSqlBackslashEscapes,
    /// SQLite database
    Sqlite,
}

impl Dialect {
    /// Creates a Dialect from a sqlx backend name
    ///
    /// The server defaults are assumed; use [`with_mysql_sql_mode`](Self::with_mysql_sql_mode)
    /// and [`with_standard_conforming_strings`](Self::with_standard_conforming_strings)
    /// (or `BackendDialect` with the `any` feature) to follow session settings.
    ///
    /// # Arguments
    /// * `db_name` - Database identifier ("PostgreSQL"|"MySQL"|"SQLite")
    ///
    /// # Errors
    /// Returns Error::UnsupportedBackend for any other name
    ///
    /// # Example
    /// ```
    /// use sqlx_query_template::Dialect;
    ///
    /// assert_eq!(Dialect::new("PostgreSQL").unwrap(), Dialect::PostgreSql);
    /// assert!(Dialect::new("Oracle").is_err());
    /// ```
    pub fn new(db_name: &str) -> Result<Self, Error> {
        match db_name {
            "MySQL" => Ok(Self::MySql),
            "PostgreSQL" => Ok(Self::PostgreSql),
            "SQLite" => Ok(Self::Sqlite),
            _ => Err(Error::UnsupportedBackend(db_name.to_string())),
        }
    }

    /// Dialect of a statically known sqlx database.
    ///
    /// `sqlx::Any` only knows its backend at runtime and is rejected here.
    pub fn of<DB: Database>() -> Result<Self, Error> {
        Self::new(DB::NAME)
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::MySql | Self::MySqlNoBackslashEscapes => "MySQL",
            Self::PostgreSql | Self::PostgreSqlBackslashEscapes => "PostgreSQL",
            Self::Sqlite => "SQLite",
        }
    }

    /// Adjusts a MySQL dialect to the session `sql_mode` (comma separated,
    /// as returned by `SELECT @@SESSION.sql_mode`). Other dialects are
    /// returned unchanged.
    pub fn with_mysql_sql_mode(self, sql_mode: &str) -> Self {
        match self {
            Self::MySql | Self::MySqlNoBackslashEscapes => {
                let no_backslash = sql_mode
                    .split(',')
                    .any(|mode| mode.trim().eq_ignore_ascii_case("NO_BACKSLASH_ESCAPES"));
                if no_backslash {
                    Self::MySqlNoBackslashEscapes
                } else {
                    Self::MySql
                }
            }
            other => other,
        }
    }

    /// Adjusts a PostgreSQL dialect to the session value of
    /// `standard_conforming_strings` (`on`/`off`). Other dialects are
    /// returned unchanged.
    pub fn with_standard_conforming_strings(self, setting: &str) -> Self {
        match self {
            Self::PostgreSql | Self::PostgreSqlBackslashEscapes => {
                if setting.trim().eq_ignore_ascii_case("off") {
                    Self::PostgreSqlBackslashEscapes
                } else {
                    Self::PostgreSql
                }
            }
            other => other,
        }
    }

    /// Query template escaping string literals for this dialect.
    pub fn template(self) -> QueryTemplate<Self> {
        QueryTemplate::new(self)
    }
}

impl Escape for Dialect {
    fn escape_string<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        match self {
            Self::MySql => mysql_escape(raw),
            Self::MySqlNoBackslashEscapes | Self::PostgreSql | Self::Sqlite => double_quotes(raw),
            Self::PostgreSqlBackslashEscapes => double_quotes_and_backslashes(raw),
        }
    }
}

/// Same character set as `mysql_real_escape_string`.
fn mysql_escape(raw: &str) -> Cow<'_, str> {
    let needs_escape = |c: char| matches!(c, '\0' | '\n' | '\r' | '\\' | '\'' | '"' | '\x1a');
    if !raw.contains(needs_escape) {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\x1a' => out.push_str("\\Z"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn double_quotes(raw: &str) -> Cow<'_, str> {
    if raw.contains('\'') {
        Cow::Owned(raw.replace('\'', "''"))
    } else {
        Cow::Borrowed(raw)
    }
}

fn double_quotes_and_backslashes(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['\'', '\\']) {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        if c == '\'' || c == '\\' {
            out.push(c);
        }
        out.push(c);
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_names_round_trip() {
        for dialect in [Dialect::MySql, Dialect::PostgreSql, Dialect::Sqlite] {
            assert_eq!(Dialect::new(dialect.backend_name()).unwrap(), dialect);
        }
        assert!(matches!(
            Dialect::new("Any"),
            Err(Error::UnsupportedBackend(name)) if name == "Any"
        ));
    }

    #[test]
    fn test_mysql_escape() {
        let d = Dialect::MySql;
        assert_eq!(d.escape_string("O'Brien"), "O\\'Brien");
        assert_eq!(
            d.escape_string("a\\b\"c\n\r\0\x1a"),
            "a\\\\b\\\"c\\n\\r\\0\\Z"
        );
        assert!(matches!(d.escape_string("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_mysql_sql_mode() {
        let d = Dialect::MySql;
        assert_eq!(
            d.with_mysql_sql_mode("STRICT_TRANS_TABLES,NO_BACKSLASH_ESCAPES"),
            Dialect::MySqlNoBackslashEscapes
        );
        assert_eq!(
            d.with_mysql_sql_mode("no_backslash_escapes"),
            Dialect::MySqlNoBackslashEscapes
        );
        assert_eq!(
            d.with_mysql_sql_mode("ONLY_FULL_GROUP_BY,STRICT_TRANS_TABLES"),
            Dialect::MySql
        );
        assert_eq!(
            Dialect::MySqlNoBackslashEscapes.with_mysql_sql_mode(""),
            Dialect::MySql
        );
        assert_eq!(
            Dialect::Sqlite.with_mysql_sql_mode("NO_BACKSLASH_ESCAPES"),
            Dialect::Sqlite
        );
    }

    #[test]
    fn test_standard_conforming_strings() {
        let d = Dialect::PostgreSql;
        assert_eq!(
            d.with_standard_conforming_strings("off"),
            Dialect::PostgreSqlBackslashEscapes
        );
        assert_eq!(d.with_standard_conforming_strings("on"), Dialect::PostgreSql);
        assert_eq!(
            Dialect::MySql.with_standard_conforming_strings("off"),
            Dialect::MySql
        );
    }

    #[test]
    fn test_mode_dependent_escape() {
        let payload = "x' OR 1=1 -- \\";
        assert_eq!(
            Dialect::MySqlNoBackslashEscapes.escape_string(payload),
            "x'' OR 1=1 -- \\"
        );
        assert_eq!(
            Dialect::PostgreSqlBackslashEscapes.escape_string(payload),
            "x'' OR 1=1 -- \\\\"
        );
        assert_eq!(Dialect::MySqlNoBackslashEscapes.backend_name(), "MySQL");
        assert_eq!(Dialect::PostgreSqlBackslashEscapes.backend_name(), "PostgreSQL");
    }

    #[test]
    fn test_standard_escape() {
        for d in [Dialect::PostgreSql, Dialect::Sqlite] {
            assert_eq!(d.escape_string("O'Brien"), "O''Brien");
            assert_eq!(d.escape_string("back\\slash"), "back\\slash");
        }
    }

    #[test]
    fn test_escape_through_reference() {
        let d = &Dialect::Sqlite;
        assert_eq!(Escape::escape_string(&d, "'"), "''");
    }
}

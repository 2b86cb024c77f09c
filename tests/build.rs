use std::borrow::Cow;

use sqlx_query_template::{Dialect, Error, Escape, QueryTemplate, Value, skip};

struct Identity;

impl Escape for Identity {
    fn escape_string<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(raw)
    }
}

#[test]
fn test_mysql_queries() {
    let tpl = Dialect::MySql.template();

    assert_eq!(
        tpl.build("SELECT name FROM users WHERE user_id = 1", ()),
        "SELECT name FROM users WHERE user_id = 1"
    );
    assert_eq!(
        tpl.build(
            "SELECT * FROM users WHERE name = ? AND block = 0",
            ("Jack",)
        ),
        "SELECT * FROM users WHERE name = 'Jack' AND block = 0"
    );
    assert_eq!(
        tpl.build(
            "SELECT ?# FROM users WHERE user_id = ?d AND block = ?d",
            (vec!["name", "email"], 2, true)
        ),
        "SELECT `name`, `email` FROM users WHERE user_id = 2 AND block = 1"
    );
    assert_eq!(
        tpl.build(
            "UPDATE users SET ?a WHERE user_id = -1",
            (Value::map([
                ("name", Value::from("Jack")),
                ("email", Value::Null)
            ]),)
        ),
        "UPDATE users SET `name` = 'Jack', `email` = NULL WHERE user_id = -1"
    );
}

#[test]
fn test_conditional_blocks() {
    let tpl = Dialect::MySql.template();
    let template = "SELECT name FROM users WHERE ?# IN (?a){ AND block = ?d}";

    assert_eq!(
        tpl.build(template, ("user_id", vec![1, 2, 3], skip())),
        "SELECT name FROM users WHERE `user_id` IN (1, 2, 3)"
    );
    assert_eq!(
        tpl.build(template, ("user_id", vec![1, 2, 3], true)),
        "SELECT name FROM users WHERE `user_id` IN (1, 2, 3) AND block = 1"
    );
}

#[test]
fn test_numeric_placeholders() {
    let tpl = QueryTemplate::new(Identity);
    assert_eq!(tpl.build("?d ?d ?f", (Value::Null, -5, 3.5)), "NULL -5 3.5");
}

#[test]
fn test_string_escaping_per_dialect() {
    assert_eq!(
        Dialect::MySql.template().build("?", ("O'Brien",)),
        "'O\\'Brien'"
    );
    assert_eq!(
        Dialect::PostgreSql.template().build("?", ("O'Brien",)),
        "'O''Brien'"
    );
    assert_eq!(
        QueryTemplate::new(Identity).build("?", ("O'Brien",)),
        "'O'Brien'"
    );
}

#[test]
fn test_identifiers() {
    let tpl = QueryTemplate::new(Identity);
    assert_eq!(tpl.build("?#", ("col",)), "`col`");
    assert_eq!(tpl.build("?#", ("a`b",)), "`a``b`");
}

#[test]
fn test_argument_order_ignores_blocks() {
    let tpl = QueryTemplate::new(Identity);
    let sql = tpl.build(
        "SELECT ?d{ AND a = ?d AND b = ?}{ AND c = ?d} AND d = ?d",
        (1, skip(), "x", 3, 4),
    );
    assert_eq!(sql, "SELECT 1 AND c = 3 AND d = 4");
}

#[test]
fn test_boxed_escaper() {
    let escaper: Box<dyn Escape> = Box::new(Dialect::Sqlite);
    let tpl = QueryTemplate::new(escaper);
    assert_eq!(tpl.build("?", ("it's",)), "'it''s'");
}

#[test]
fn test_unsupported_backend() {
    assert!(matches!(
        Dialect::new("Oracle"),
        Err(Error::UnsupportedBackend(_))
    ));
}

/// Reads the quoted literal at the start of `sql` the way the server parses
/// it and returns its value plus whatever text follows the closing quote.
fn read_literal(sql: &str, backslash_escapes: bool) -> (String, &str) {
    let mut chars = sql.char_indices();
    assert_eq!(chars.next().map(|(_, c)| c), Some('\''));
    let mut value = String::new();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' if backslash_escapes => match chars.next() {
                Some((_, escaped)) => value.push(match escaped {
                    '0' => '\0',
                    'n' => '\n',
                    'r' => '\r',
                    'Z' => '\x1a',
                    other => other,
                }),
                None => break,
            },
            '\'' if sql[i + 1..].starts_with('\'') => {
                chars.next();
                value.push('\'');
            }
            '\'' => return (value, &sql[i + 1..]),
            c => value.push(c),
        }
    }
    panic!("unterminated literal in {sql}");
}

#[test]
fn test_escaped_literals_round_trip_per_server_mode() {
    let payloads = ["x' OR 1=1 -- ", "a\\'b", "\\", "''\\\\", "line\nbreak\0"];
    let modes = [
        (Dialect::MySql, true),
        (Dialect::MySqlNoBackslashEscapes, false),
        (Dialect::PostgreSql, false),
        (Dialect::PostgreSqlBackslashEscapes, true),
        (Dialect::Sqlite, false),
    ];
    for (dialect, backslash_escapes) in modes {
        let tpl = dialect.template();
        for payload in payloads {
            let sql = tpl.build("?", (payload,));
            let (value, rest) = read_literal(&sql, backslash_escapes);
            assert_eq!(value, payload, "{dialect:?} {sql}");
            assert_eq!(rest, "", "{dialect:?} {sql}");
        }
    }
}

#[test]
fn test_sql_mode_selects_mysql_escaping() {
    let payload = "x' OR 1=1 -- ";
    let backslash = Dialect::MySql.template().build("?", (payload,));
    // backslash escaping is not safe once the server stops honouring it
    assert_ne!(read_literal(&backslash, false).1, "");

    let dialect = Dialect::MySql.with_mysql_sql_mode("ANSI_QUOTES,NO_BACKSLASH_ESCAPES");
    let sql = dialect.template().build("name = ?", (payload,));
    assert_eq!(sql, "name = 'x'' OR 1=1 -- '");
    assert_eq!(
        read_literal(&sql["name = ".len()..], false),
        (payload.to_string(), "")
    );
}

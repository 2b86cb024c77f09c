use crate::{Error, Escape, Formatter, IntoArgs, Markers, Tag, Token, Tokens, Value};

/// Builds SQL from templates with typed placeholders and conditional blocks.
///
/// Placeholders:
/// - `?`  - value by its own type: `NULL`, `1`/`0`, numbers, escaped strings
/// - `?d` - integer
/// - `?f` - float
/// - `?a` - list (`1, 2`) or map (`` `k` = v, ... ``)
/// - `?#` - identifier or list of identifiers
///
/// Text between `{` and `}` is a block. A block is dropped when a
/// [`skip()`](crate::skip) argument was bound inside it; otherwise the
/// braces are removed and the content kept.
///
/// # Example
/// ```
/// use sqlx_query_template::{Dialect, skip};
///
/// let tpl = Dialect::MySql.template();
/// let sql = tpl.build(
///     "SELECT ?# FROM users WHERE user_id = ?d{ AND block = ?d}",
///     (vec!["name", "email"], 2, skip()),
/// );
/// assert_eq!(sql, "SELECT `name`, `email` FROM users WHERE user_id = 2");
/// ```
#[derive(Debug, Clone)]
pub struct QueryTemplate<E> {
    escaper: E,
    markers: Markers,
}

impl<E: Escape> QueryTemplate<E> {
    pub fn new(escaper: E) -> Self {
        Self {
            escaper,
            markers: Markers::default(),
        }
    }

    /// Replaces the default `{` `}` block markers.
    pub fn set_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    pub fn markers(&self) -> Markers {
        self.markers
    }

    pub fn escaper(&self) -> &E {
        &self.escaper
    }

    /// Builds the query, tolerating malformed input.
    ///
    /// Missing arguments bind `NULL`, surplus arguments are ignored,
    /// unbalanced markers are dropped. Each such case is reported through
    /// `tracing::warn!`.
    pub fn build(&self, template: &str, args: impl IntoArgs) -> String {
        let (sql, diagnostics) = self.render(template, &args.into_args());
        for diagnostic in &diagnostics {
            tracing::warn!(%diagnostic, "query template tolerated malformed input");
        }
        sql
    }

    /// Builds the query, rejecting anything [`build`](Self::build) would
    /// only warn about.
    ///
    /// # Errors
    /// `MissingArgument`, `UnusedArguments`, `UnmatchedClose`,
    /// `UnclosedBlock` or `NotAnArray`; several at once are returned as
    /// `MultipleErrors`.
    pub fn try_build(&self, template: &str, args: impl IntoArgs) -> Result<String, Error> {
        let (sql, diagnostics) = self.render(template, &args.into_args());
        if diagnostics.is_empty() {
            Ok(sql)
        } else {
            Err(diagnostics.into())
        }
    }

    fn render(&self, template: &str, args: &[Value]) -> (String, Vec<Error>) {
        let formatter = Formatter::new(&self.escaper);
        let mut state = BuildState::new(template.len());

        for token in Tokens::new(template, self.markers) {
            match token {
                Token::Text(text) => state.out().push_str(text),
                Token::Placeholder { tag, .. } => {
                    let index = state.cursor;
                    state.cursor += 1;
                    let value = match args.get(index) {
                        Some(value) => value,
                        None => {
                            state.diagnostics.push(Error::MissingArgument { index });
                            &NULL
                        }
                    };
                    if value.is_skip() {
                        state.suppress = true;
                        state.out().push_str("NULL");
                        continue;
                    }
                    if tag == Tag::Array && !value.is_collection() && !value.is_null() {
                        state.diagnostics.push(Error::NotAnArray {
                            index,
                            tag,
                            found: value.kind(),
                        });
                    }
                    formatter.write(tag, value, state.out());
                }
                Token::Open { offset } => state.open(offset),
                Token::Close { offset } => state.close(offset),
            }
        }

        if state.cursor < args.len() {
            state.diagnostics.push(Error::UnusedArguments {
                consumed: state.cursor,
                given: args.len(),
            });
        }
        let (sql, diagnostics) = state.finish();
        tracing::trace!(%sql, "built query");
        (sql, diagnostics)
    }
}

static NULL: Value = Value::Null;

/// An open block and the output produced inside it so far.
struct Block {
    offset: usize,
    body: String,
}

/// Scan state for one build call.
struct BuildState {
    cursor: usize,
    root: String,
    blocks: Vec<Block>,
    /// Set by a skip argument, cleared by any open marker, consumed by the
    /// next close marker. Only ever suppresses the innermost open block.
    suppress: bool,
    diagnostics: Vec<Error>,
}

impl BuildState {
    fn new(capacity: usize) -> Self {
        Self {
            cursor: 0,
            root: String::with_capacity(capacity),
            blocks: Vec::new(),
            suppress: false,
            diagnostics: Vec::new(),
        }
    }

    fn out(&mut self) -> &mut String {
        match self.blocks.last_mut() {
            Some(block) => &mut block.body,
            None => &mut self.root,
        }
    }

    fn open(&mut self, offset: usize) {
        self.blocks.push(Block {
            offset,
            body: String::new(),
        });
        self.suppress = false;
    }

    fn close(&mut self, offset: usize) {
        let suppress = std::mem::take(&mut self.suppress);
        match self.blocks.pop() {
            Some(block) if suppress => {
                tracing::debug!(offset = block.offset, "suppressed skipped block");
            }
            Some(block) => self.out().push_str(&block.body),
            None => self.diagnostics.push(Error::UnmatchedClose { offset }),
        }
    }

    fn finish(mut self) -> (String, Vec<Error>) {
        // unclosed blocks keep their content
        while let Some(block) = self.blocks.pop() {
            self.diagnostics
                .push(Error::UnclosedBlock { offset: block.offset });
            self.out().push_str(&block.body);
        }
        (self.root, self.diagnostics)
    }
}

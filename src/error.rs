use thiserror::Error;

use crate::Tag;

#[derive(Error, Debug)]
pub enum Error {
    #[error("data base error: {0}")]
    SqlxError(#[from] sqlx::Error),
    #[error("unsupported database backend `{0}`")]
    UnsupportedBackend(String),
    #[error("invalid block markers `{open}` `{close}`: markers must differ and must not be `?`")]
    InvalidMarkers { open: char, close: char },
    #[error("placeholder #{index} has no bound argument")]
    MissingArgument { index: usize },
    #[error("{given} arguments given but the template consumes {consumed}")]
    UnusedArguments { consumed: usize, given: usize },
    #[error("close marker at byte {offset} has no matching open marker")]
    UnmatchedClose { offset: usize },
    #[error("open marker at byte {offset} is never closed")]
    UnclosedBlock { offset: usize },
    #[error("placeholder #{index} `{tag}` expects a list or map, got {found}")]
    NotAnArray {
        index: usize,
        tag: Tag,
        found: &'static str,
    },
    #[error("QueryTemplate MultipleErrors: {0:?}")]
    MultipleErrors(Vec<Error>),
}

/// A single collected error is returned as itself rather than wrapped.
impl From<Vec<Error>> for Error {
    fn from(mut e: Vec<Error>) -> Self {
        if e.len() == 1 {
            if let Some(single) = e.pop() {
                return single;
            }
        }
        Error::MultipleErrors(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_unwraps_single_error() {
        let err = Error::from(vec![Error::MissingArgument { index: 2 }]);
        assert!(matches!(err, Error::MissingArgument { index: 2 }));

        let err = Error::from(vec![
            Error::MissingArgument { index: 0 },
            Error::UnclosedBlock { offset: 4 },
        ]);
        match err {
            Error::MultipleErrors(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_display() {
        let err = Error::NotAnArray {
            index: 1,
            tag: Tag::Array,
            found: "int",
        };
        assert_eq!(
            err.to_string(),
            "placeholder #1 `?a` expects a list or map, got int"
        );
    }
}

use sqlx::{AnyConnection, AnyPool};

use super::Dialect;
use crate::Error;

/// Resolves the [`Dialect`] of a connection whose backend is only known at
/// runtime.
///
/// # Example
/// ```no_run
/// # async fn run(pool: sqlx::AnyPool) -> Result<(), sqlx_query_template::Error> {
/// use sqlx_query_template::BackendDialect;
///
/// let sql = pool
///     .backend_dialect()
///     .await?
///     .template()
///     .build("SELECT * FROM users WHERE name = ?", ("O'Brien",));
/// # Ok(())
/// # }
/// ```
pub trait BackendDialect {
    fn backend_dialect(self) -> impl std::future::Future<Output = Result<Dialect, Error>> + Send;
}

impl BackendDialect for &mut AnyConnection {
    /// Reads the backend name, then the session settings that change how
    /// string literals are parsed: `sql_mode` on MySQL and
    /// `standard_conforming_strings` on PostgreSQL.
    async fn backend_dialect(self) -> Result<Dialect, Error> {
        let dialect = Dialect::new(self.backend_name())?;
        let dialect = match dialect {
            Dialect::MySql | Dialect::MySqlNoBackslashEscapes => {
                let sql_mode: String = sqlx::query_scalar("SELECT @@SESSION.sql_mode")
                    .fetch_one(&mut *self)
                    .await?;
                dialect.with_mysql_sql_mode(&sql_mode)
            }
            Dialect::PostgreSql | Dialect::PostgreSqlBackslashEscapes => {
                let setting: String = sqlx::query_scalar("SHOW standard_conforming_strings")
                    .fetch_one(&mut *self)
                    .await?;
                dialect.with_standard_conforming_strings(&setting)
            }
            Dialect::Sqlite => dialect,
        };
        tracing::debug!(?dialect, "resolved connection dialect");
        Ok(dialect)
    }
}

impl BackendDialect for &AnyPool {
    /// Resolves the dialect on one acquired connection; it returns to the
    /// pool when dropped. Session settings are assumed uniform across the
    /// pool.
    async fn backend_dialect(self) -> Result<Dialect, Error> {
        let mut conn = self.acquire().await?;
        (&mut *conn).backend_dialect().await
    }
}

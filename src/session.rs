//! The embedding-facing side of a connection.
//!
//! The protocol engine decodes commands and encodes results; everything
//! in between (what `SELECT 1` actually *returns*) is the session's
//! business. One session object lives per connection, created by the
//! embedding when it hands the byte stream to [`Server::serve`].
//!
//! [`Server::serve`]: crate::Server::serve

use std::collections::BTreeMap;

use futures_core::future::BoxFuture;

use crate::error::SqlError;
use crate::protocol::ColumnDefinition;
use crate::value::Value;

/// Facts about the connection a session is serving, fixed at
/// authentication time (and refreshed by COM_CHANGE_USER).
#[derive(Debug, Clone, Default)]
pub struct ConnectionInfo {
    pub connection_id: u32,
    pub peer_addr: String,
    pub username: String,
    pub database: Option<String>,
    /// Collation id the client asked for in its handshake response.
    pub collation: u8,
    pub connect_attrs: Vec<(String, String)>,
}

/// One result set: column shapes plus the rows that match them.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub columns: Vec<ColumnDefinition>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<ColumnDefinition>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }
}

/// The row-less outcome of a statement (an UPDATE, a SET, ...).
#[derive(Debug, Clone, Default)]
pub struct OkInfo {
    pub affected_rows: u64,
    pub last_insert_id: u64,
    pub warnings: u16,
    pub info: String,
}

/// What a query or execution produced.
#[derive(Debug, Clone)]
pub enum QueryOutput {
    Ok(OkInfo),
    /// One or more result sets; more than one turns on
    /// SERVER_MORE_RESULTS_EXISTS between them on the wire.
    Results(Vec<ResultSet>),
}

impl QueryOutput {
    pub fn ok() -> Self {
        QueryOutput::Ok(OkInfo::default())
    }

    pub fn result_set(columns: Vec<ColumnDefinition>, rows: Vec<Vec<Value>>) -> Self {
        QueryOutput::Results(vec![ResultSet::new(columns, rows)])
    }
}

/// What COM_STMT_PREPARE reported back.
#[derive(Debug, Clone, Default)]
pub struct PrepareOutput {
    /// One (possibly placeholder) definition per `?` in the statement.
    pub params: Vec<ColumnDefinition>,
    /// Result columns, when the embedding knows them at prepare time.
    pub columns: Vec<ColumnDefinition>,
}

/// Table layout exposed for COM_FIELD_LIST (and whatever the embedding
/// builds on it).
pub type Schema = BTreeMap<String, Vec<ColumnDefinition>>;

/// Query attributes attached to a command, empty unless the client
/// negotiated QUERY_ATTRIBUTES and sent some.
pub type Attributes = [(String, Value)];

/// Computes answers for one connection. Every callback may suspend for as
/// long as it likes; the connection processes one command at a time.
pub trait Session: Send {
    /// Called once, after authentication succeeds.
    fn init<'a>(&'a mut self, info: &'a ConnectionInfo) -> BoxFuture<'a, ()> {
        let _ = info;
        Box::pin(async {})
    }

    /// Answer COM_QUERY. The engine encodes whatever comes back as a text
    /// result set; a [`SqlError`] becomes an ERR packet and the
    /// connection carries on.
    fn query<'a>(
        &'a mut self,
        sql: &'a str,
        attrs: &'a Attributes,
    ) -> BoxFuture<'a, Result<QueryOutput, SqlError>>;

    /// Answer COM_STMT_PREPARE. The default counts `?` placeholders
    /// outside string literals and comments and reports no result
    /// metadata, which satisfies every driver that inspects only the
    /// parameter count.
    fn prepare<'a>(&'a mut self, sql: &'a str) -> BoxFuture<'a, Result<PrepareOutput, SqlError>> {
        let params = (0..count_placeholders(sql))
            .map(|_| ColumnDefinition::parameter())
            .collect();

        Box::pin(async move {
            Ok(PrepareOutput {
                params,
                columns: Vec::new(),
            })
        })
    }

    /// Answer COM_STMT_EXECUTE. Long-data chunks have already been merged
    /// into `params`. Results are encoded as a binary result set.
    fn execute<'a>(
        &'a mut self,
        statement_id: u32,
        sql: &'a str,
        params: &'a [Value],
        attrs: &'a Attributes,
    ) -> BoxFuture<'a, Result<QueryOutput, SqlError>>;

    /// Tables served through COM_FIELD_LIST.
    fn schema(&mut self) -> BoxFuture<'_, Result<Schema, SqlError>> {
        Box::pin(async { Ok(Schema::new()) })
    }

    /// COM_INIT_DB / USE. Rejections should carry error 1049.
    fn use_database<'a>(&'a mut self, database: &'a str) -> BoxFuture<'a, Result<(), SqlError>> {
        let _ = database;
        Box::pin(async { Ok(()) })
    }

    /// COM_RESET_CONNECTION / COM_CHANGE_USER: drop session-scoped state.
    fn reset(&mut self) -> BoxFuture<'_, Result<(), SqlError>> {
        Box::pin(async { Ok(()) })
    }

    /// The connection is going away; always the last call.
    fn close(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async {})
    }
}

/// `?` placeholders outside single/double-quoted literals, backtick
/// identifiers, `-- ` and `#` line comments, and `/* */` block comments.
pub fn count_placeholders(sql: &str) -> u16 {
    let bytes = sql.as_bytes();
    let mut count = 0_u16;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                i += 1;

                while i < bytes.len() {
                    if bytes[i] == b'\\' && quote != b'`' {
                        i += 1;
                    } else if bytes[i] == quote {
                        break;
                    }

                    i += 1;
                }
            }

            b'-' if bytes.get(i + 1) == Some(&b'-')
                && matches!(bytes.get(i + 2), Some(b' ' | b'\t') | None) =>
            {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }

            b'#' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }

            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;

                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }

                i += 1;
            }

            b'?' => count += 1,

            _ => {}
        }

        i += 1;
    }

    count
}

#[cfg(test)]
mod tests {
    use super::count_placeholders;

    #[test]
    fn it_counts_placeholders() {
        assert_eq!(count_placeholders("SELECT ?, ?"), 2);
        assert_eq!(count_placeholders("SELECT 1"), 0);
    }

    #[test]
    fn it_ignores_placeholders_inside_literals_and_comments() {
        assert_eq!(count_placeholders("SELECT '?', \"?\", `a?b`, ?"), 1);
        assert_eq!(count_placeholders("SELECT ? -- and ?\n, ?"), 2);
        assert_eq!(count_placeholders("SELECT ? /* ? */ , ?"), 2);
        assert_eq!(count_placeholders("SELECT '\\'?'"), 0);
        assert_eq!(count_placeholders("SELECT ? # trailing ?"), 1);
    }
}

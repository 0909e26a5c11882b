//! The server half of the MySQL client/server wire protocol.
//!
//! Point a stock MySQL client or driver at an application embedding this
//! crate and it sees a MySQL server: version-10 greeting, pluggable
//! authentication, text and binary result sets, prepared statements. What
//! the "server" answers is entirely up to the embedding; this crate
//! frames, negotiates, sequences, and encodes, and never looks at SQL.
//!
//! ```rust,no_run
//! use futures_core::future::BoxFuture;
//! use mysql_shim::{
//!     ColumnDefinition, QueryOutput, Server, ServerOptions, Session, SqlError, TypeId, Value,
//! };
//!
//! struct One;
//!
//! impl Session for One {
//!     fn query<'a>(
//!         &'a mut self,
//!         _sql: &'a str,
//!         _attrs: &'a mysql_shim::Attributes,
//!     ) -> BoxFuture<'a, Result<QueryOutput, SqlError>> {
//!         Box::pin(async {
//!             Ok(QueryOutput::result_set(
//!                 vec![ColumnDefinition::new("1", TypeId::BIG_INT)],
//!                 vec![vec![Value::Int(1)]],
//!             ))
//!         })
//!     }
//!
//!     fn execute<'a>(
//!         &'a mut self,
//!         _id: u32,
//!         sql: &'a str,
//!         _params: &'a [Value],
//!         attrs: &'a mysql_shim::Attributes,
//!     ) -> BoxFuture<'a, Result<QueryOutput, SqlError>> {
//!         self.query(sql, attrs)
//!     }
//! }
//!
//! # async fn accept_loop(listener: tokio::net::TcpListener) -> mysql_shim::Result<()> {
//! let server = std::sync::Arc::new(Server::new(ServerOptions::new()));
//!
//! loop {
//!     let (socket, peer) = listener.accept().await?;
//!     let server = server.clone();
//!
//!     tokio::spawn(async move { server.serve(One, socket, peer.to_string()).await });
//! }
//! # }
//! ```

#![forbid(unsafe_code)]

#[macro_use]
pub mod error;

mod io;

pub mod auth;
pub mod protocol;

mod connection;
mod identity;
mod options;
mod server;
mod session;
mod statement;
mod value;

pub use connection::Connection;
pub use error::{Error, Result, SqlError};
pub use identity::{AcceptAll, GssContext, GssStep, IdentityProvider, UserEntry};
pub use options::ServerOptions;
pub use protocol::{
    AuthPlugin, Capabilities, ColumnDefinition, FieldFlags, Status, TypeId,
};
pub use server::Server;
pub use session::{
    count_placeholders, Attributes, ConnectionInfo, OkInfo, PrepareOutput, QueryOutput, ResultSet,
    Schema, Session,
};
pub use statement::{PreparedStatement, StatementRegistry};
pub use value::Value;

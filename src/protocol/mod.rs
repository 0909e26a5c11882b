//! Wire shapes of the MySQL client/server protocol, one file per packet.
//!
//! This crate sits on the server side of the conversation, so the
//! handshake, OK/ERR/EOF, column definition, and row packets encode while
//! the handshake response and the `COM_*` command packets decode.

mod encode;

pub use encode::Encode;

mod auth_plugin;
mod capabilities;
mod field;
mod status;
mod r#type;

pub use auth_plugin::AuthPlugin;
pub use capabilities::Capabilities;
pub use field::FieldFlags;
pub use r#type::TypeId;
pub use status::Status;

mod auth;
mod column_def;
mod com_stmt_prepare_ok;
mod eof;
mod err;
mod handshake;
mod ok;
mod row;

pub use auth::{AuthMoreData, AuthSwitchRequest};
pub use column_def::ColumnDefinition;
pub use com_stmt_prepare_ok::ComStmtPrepareOk;
pub use eof::EofPacket;
pub use err::ErrPacket;
pub use handshake::Handshake;
pub(crate) use ok::session_track_schema;
pub use ok::OkPacket;
pub use row::{BinaryRow, TextRow};

mod com_change_user;
mod com_query;
mod com_stmt_execute;
mod command;
mod handshake_response;

pub use com_change_user::ComChangeUser;
pub use com_query::ComQuery;
pub use com_stmt_execute::ComStmtExecute;
pub use command::{
    ComFieldList, ComInitDb, ComStmtClose, ComStmtReset, ComStmtSendLongData, CommandCode,
};
pub use handshake_response::HandshakeResponse;

use byteorder::LittleEndian;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::SqlError;
use crate::io::{Buf, BufMutExt};
use crate::protocol::{
    session_track_schema, BinaryRow, Capabilities, ColumnDefinition, ComChangeUser, ComFieldList,
    ComInitDb, ComQuery, ComStmtClose, ComStmtExecute, ComStmtPrepareOk, ComStmtReset,
    ComStmtSendLongData, CommandCode, EofPacket, ErrPacket, OkPacket, Status, TextRow, TypeId,
};
use crate::session::{OkInfo, QueryOutput, ResultSet, Session};
use crate::value::Value;

use super::{Connection, State};

impl<S, IO> Connection<S, IO>
where
    S: Session,
    IO: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Handle one command packet. Resolves to `false` when the command
    /// loop should end (COM_QUIT).
    pub(super) async fn dispatch(&mut self, packet: &[u8]) -> crate::Result<bool> {
        let mut buf = packet;

        let opcode = buf
            .get_u8()
            .map_err(|_| protocol_err!("empty command packet"))?;

        self.questions += 1;

        let code = CommandCode::from_u8(opcode);

        log::trace!(
            "connection {}: {:?} ({} bytes)",
            self.info.connection_id,
            code,
            packet.len(),
        );

        match code {
            CommandCode::Quit => return Ok(false),

            CommandCode::Ping => self.send_ok(OkInfo::default()).await?,

            CommandCode::InitDb => self.on_init_db(ComInitDb::decode(buf)?).await?,

            CommandCode::Query => {
                let query = ComQuery::decode(buf, self.stream.capabilities)?;

                match self.session.query(&query.sql, &query.attrs).await {
                    Ok(output) => self.send_output(output, false).await?,
                    Err(err) => self.send_err(&err).await?,
                }
            }

            CommandCode::FieldList => self.on_field_list(ComFieldList::decode(buf)?).await?,

            CommandCode::Statistics => self.on_statistics().await?,

            CommandCode::ProcessInfo => self.on_process_info().await?,

            CommandCode::ChangeUser => {
                let change = ComChangeUser::decode(buf, self.stream.capabilities)?;
                self.on_change_user(change).await?;
            }

            CommandCode::StmtPrepare => self.on_stmt_prepare(buf.get_str_eof()?.to_owned()).await?,

            CommandCode::StmtExecute => self.on_stmt_execute(buf).await?,

            CommandCode::StmtSendLongData => {
                let chunk = ComStmtSendLongData::decode(buf)?;

                // no response, not even for an unknown statement
                if let Some(stmt) = self.statements.get_mut(chunk.statement_id) {
                    stmt.append_long_data(chunk.param_index, &chunk.data);
                }
            }

            CommandCode::StmtClose => {
                // deallocation is unacknowledged
                let close = ComStmtClose::decode(buf)?;
                self.statements.remove(close.statement_id);
            }

            CommandCode::StmtReset => {
                let reset = ComStmtReset::decode(buf)?;

                match self.statements.get_mut(reset.statement_id) {
                    Some(stmt) => {
                        stmt.reset();
                        self.send_ok(OkInfo::default()).await?;
                    }

                    None => {
                        let err =
                            SqlError::unknown_statement(reset.statement_id, "mysqld_stmt_reset");
                        self.send_err(&err).await?;
                    }
                }
            }

            CommandCode::ResetConnection => {
                self.statements.clear();

                match self.session.reset().await {
                    Ok(()) => self.send_ok(OkInfo::default()).await?,
                    Err(err) => self.send_err(&err).await?,
                }
            }

            CommandCode::Sleep => {
                return Err(protocol_err!("COM_SLEEP is not a client command"));
            }

            CommandCode::Unknown(opcode) => {
                self.send_err(&SqlError::unknown_command(opcode)).await?;
            }
        }

        Ok(true)
    }

    async fn on_init_db(&mut self, init: ComInitDb) -> crate::Result<()> {
        match self.session.use_database(&init.schema).await {
            Ok(()) => {
                self.info.database = Some(init.schema.clone());

                let mut ok = OkPacket::new(self.status);

                if self
                    .stream
                    .capabilities
                    .contains(Capabilities::SESSION_TRACK)
                {
                    ok.status |= Status::SERVER_SESSION_STATE_CHANGED;
                    ok.session_state = session_track_schema(&init.schema);
                }

                self.stream.send(ok).await
            }

            Err(err) => self.send_err(&err).await,
        }
    }

    async fn on_field_list(&mut self, request: ComFieldList) -> crate::Result<()> {
        let schema = match self.session.schema().await {
            Ok(schema) => schema,
            Err(err) => return self.send_err(&err).await,
        };

        let columns = schema.get(&request.table).cloned().unwrap_or_default();

        for mut column in columns {
            if column.table.is_empty() {
                column.table = request.table.clone();
            }

            self.stream.write(column);
        }

        self.write_terminator(self.status);

        self.stream.flush().await
    }

    async fn on_statistics(&mut self) -> crate::Result<()> {
        let stats = format!(
            "Uptime: {}  Threads: 1  Questions: {}  Slow queries: 0  Opens: 0  \
             Flush tables: 1  Open tables: 1  Queries per second avg: 0.000",
            self.server_started.elapsed().as_secs(),
            self.questions,
        );

        // a bare string, not an OK or result set
        self.stream.send(stats.as_bytes()).await
    }

    async fn on_process_info(&mut self) -> crate::Result<()> {
        let columns = vec![
            ColumnDefinition::new("Id", TypeId::BIG_INT).unsigned(),
            ColumnDefinition::new("User", TypeId::VAR_CHAR),
            ColumnDefinition::new("Host", TypeId::VAR_CHAR),
            ColumnDefinition::new("db", TypeId::VAR_CHAR),
            ColumnDefinition::new("Command", TypeId::VAR_CHAR),
            ColumnDefinition::new("Time", TypeId::BIG_INT),
            ColumnDefinition::new("State", TypeId::VAR_CHAR),
            ColumnDefinition::new("Info", TypeId::VAR_CHAR),
        ];

        let row = vec![
            Value::UInt(u64::from(self.info.connection_id)),
            Value::Text(self.info.username.clone()),
            Value::Text(self.info.peer_addr.clone()),
            self.info
                .database
                .clone()
                .map_or(Value::Null, Value::Text),
            Value::Text("Query".into()),
            Value::Int(0),
            Value::Text(String::new()),
            Value::Null,
        ];

        let output = QueryOutput::result_set(columns, vec![row]);

        self.send_output(output, false).await
    }

    async fn on_change_user(&mut self, change: ComChangeUser) -> crate::Result<()> {
        // authentication starts over; only the connection id and the
        // negotiated capability set survive
        self.state = State::Authenticating;

        let identity = self
            .authenticate(
                &change.username,
                change.auth_response,
                change.auth_plugin.as_deref(),
                None,
            )
            .await?;

        self.statements.clear();

        self.info.username = identity.unwrap_or(change.username);
        self.info.database = change.database;
        self.info.connect_attrs = change.connect_attrs;

        if let Some(collation) = change.collation {
            self.info.collation = collation as u8;
        }

        if let Err(err) = self.session.reset().await {
            self.state = State::CommandLoop;

            return self.send_err(&err).await;
        }

        if let Some(database) = self.info.database.clone() {
            if let Err(err) = self.session.use_database(&database).await {
                self.state = State::CommandLoop;

                return self.send_err(&err).await;
            }
        }

        self.stream.send(OkPacket::new(self.status)).await?;
        self.state = State::CommandLoop;

        Ok(())
    }

    async fn on_stmt_prepare(&mut self, sql: String) -> crate::Result<()> {
        let prepared = match self.session.prepare(&sql).await {
            Ok(prepared) => prepared,
            Err(err) => return self.send_err(&err).await,
        };

        let stmt = self
            .statements
            .insert(sql, prepared.params, prepared.columns);

        let response = ComStmtPrepareOk {
            statement_id: stmt.id,
            columns: stmt.columns.len() as u16,
            params: stmt.params.len() as u16,
            warnings: 0,
        };

        log::trace!(
            "connection {}: prepared statement {} with {} parameters",
            self.info.connection_id,
            stmt.id,
            stmt.params.len(),
        );

        let deprecate_eof = self
            .stream
            .capabilities
            .contains(Capabilities::DEPRECATE_EOF);

        self.stream.write(response);

        for param in &stmt.params {
            self.stream.write(param);
        }

        if !stmt.params.is_empty() && !deprecate_eof {
            self.stream.write(EofPacket {
                warnings: 0,
                status: self.status,
            });
        }

        for column in &stmt.columns {
            self.stream.write(column);
        }

        if !stmt.columns.is_empty() && !deprecate_eof {
            self.stream.write(EofPacket {
                warnings: 0,
                status: self.status,
            });
        }

        self.stream.flush().await
    }

    async fn on_stmt_execute(&mut self, buf: &[u8]) -> crate::Result<()> {
        let mut buf = buf;
        let statement_id = buf.get_u32::<LittleEndian>()?;
        let capabilities = self.stream.capabilities;

        // decode against the statement record, then let go of the
        // registry before the session callback runs
        let decoded = match self.statements.get_mut(statement_id) {
            Some(stmt) => {
                let long_data: Vec<bool> = (0..stmt.param_count())
                    .map(|i| stmt.has_long_data(i))
                    .collect();

                let execute = ComStmtExecute::decode(
                    buf,
                    capabilities,
                    stmt.param_count(),
                    stmt.param_types.as_deref(),
                    &long_data,
                )?;

                if let Some(types) = execute.types {
                    stmt.param_types = Some(types);
                }

                let mut params = execute.params;
                stmt.merge_long_data(&mut params);

                Ok((stmt.sql.clone(), params, execute.attrs))
            }

            None => Err(SqlError::unknown_statement(statement_id, "mysqld_stmt_execute")),
        };

        let (sql, params, attrs) = match decoded {
            Ok(decoded) => decoded,
            Err(err) => return self.send_err(&err).await,
        };

        match self
            .session
            .execute(statement_id, &sql, &params, &attrs)
            .await
        {
            Ok(output) => self.send_output(output, true).await,
            Err(err) => self.send_err(&err).await,
        }
    }

    pub(super) async fn send_ok(&mut self, info: OkInfo) -> crate::Result<()> {
        let mut ok = OkPacket::new(self.status);

        ok.affected_rows = info.affected_rows;
        ok.last_insert_id = info.last_insert_id;
        ok.warnings = info.warnings;
        ok.info = info.info;

        self.stream.send(ok).await
    }

    pub(super) async fn send_err(&mut self, err: &SqlError) -> crate::Result<()> {
        log::trace!(
            "connection {}: error {} ({})",
            self.info.connection_id,
            err.code,
            err.message,
        );

        self.stream.send(ErrPacket::from(err)).await
    }

    /// Emit a whole response: either a bare OK or every result set, text
    /// or binary rows as the command dictates.
    async fn send_output(&mut self, output: QueryOutput, binary: bool) -> crate::Result<()> {
        match output {
            QueryOutput::Ok(info) => self.send_ok(info).await,

            QueryOutput::Results(sets) if sets.is_empty() => {
                self.send_ok(OkInfo::default()).await
            }

            QueryOutput::Results(sets) => {
                let last = sets.len() - 1;

                for (i, set) in sets.iter().enumerate() {
                    self.write_result_set(set, binary, i < last);
                }

                self.stream.flush().await
            }
        }
    }

    // count, definitions, (EOF), rows, OK-or-EOF
    fn write_result_set(&mut self, set: &ResultSet, binary: bool, more: bool) {
        let deprecate_eof = self
            .stream
            .capabilities
            .contains(Capabilities::DEPRECATE_EOF);

        // a row-less "result" degenerates to OK even mid-multi
        if set.columns.is_empty() {
            let mut status = self.status;

            if more {
                status |= Status::SERVER_MORE_RESULTS_EXISTS;
            }

            self.stream.write(OkPacket::new(status));

            return;
        }

        let mut status = self.status;

        if more {
            status |= Status::SERVER_MORE_RESULTS_EXISTS;
        }

        // column count : int<lenenc>, alone in its packet
        let mut count = Vec::with_capacity(4);
        count.put_uint_lenenc::<LittleEndian>(set.columns.len() as u64);
        self.stream.write(count.as_slice());

        for column in &set.columns {
            self.stream.write(column);
        }

        if !deprecate_eof {
            self.stream.write(EofPacket {
                warnings: 0,
                status,
            });
        }

        let types: Vec<TypeId> = set.columns.iter().map(|column| column.type_id).collect();

        for row in &set.rows {
            if binary {
                self.stream.write(BinaryRow {
                    values: row,
                    types: &types,
                });
            } else {
                self.stream.write(TextRow(row));
            }
        }

        self.write_terminator(status);
    }

    fn write_terminator(&mut self, status: Status) {
        if self
            .stream
            .capabilities
            .contains(Capabilities::DEPRECATE_EOF)
        {
            self.stream.write(OkPacket::eof(status, 0));
        } else {
            self.stream.write(EofPacket {
                warnings: 0,
                status,
            });
        }
    }
}

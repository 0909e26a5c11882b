//! Full-connection tests: a scripted client drives the server over an
//! in-memory duplex stream, byte for byte.

use std::collections::HashMap;
use std::sync::Arc;

use futures_core::future::BoxFuture;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;

use mysql_shim::auth::scramble;
use mysql_shim::{
    Attributes, AuthPlugin, Capabilities, ColumnDefinition, GssContext, GssStep,
    IdentityProvider, QueryOutput, ResultSet, Server, ServerOptions, Session, SqlError, TypeId,
    UserEntry, Value,
};

// ---------------------------------------------------------------- sessions

struct TestSession;

impl Session for TestSession {
    fn query<'a>(
        &'a mut self,
        sql: &'a str,
        _attrs: &'a Attributes,
    ) -> BoxFuture<'a, Result<QueryOutput, SqlError>> {
        Box::pin(async move {
            match sql {
                "SELECT 1" => Ok(QueryOutput::result_set(
                    vec![ColumnDefinition::new("1", TypeId::BIG_INT)],
                    vec![vec![Value::Int(1)]],
                )),

                "TWO SETS" => Ok(QueryOutput::Results(vec![
                    ResultSet::new(
                        vec![ColumnDefinition::new("a", TypeId::BIG_INT)],
                        vec![vec![Value::Int(1)]],
                    ),
                    ResultSet::new(
                        vec![ColumnDefinition::new("b", TypeId::BIG_INT)],
                        vec![vec![Value::Int(2)]],
                    ),
                ])),

                sql if sql.starts_with("BAD") => Err(SqlError::new(
                    1064,
                    "42000",
                    "You have an error in your SQL syntax",
                )),

                _ => Ok(QueryOutput::ok()),
            }
        })
    }

    fn execute<'a>(
        &'a mut self,
        _statement_id: u32,
        _sql: &'a str,
        params: &'a [Value],
        _attrs: &'a Attributes,
    ) -> BoxFuture<'a, Result<QueryOutput, SqlError>> {
        // echo the parameters back as one row, typing columns by value
        Box::pin(async move {
            let columns = params
                .iter()
                .enumerate()
                .map(|(i, value)| {
                    let type_id = match value {
                        Value::Bytes(_) => TypeId::TEXT,
                        Value::Text(_) => TypeId::VAR_CHAR,
                        _ => TypeId::INT,
                    };

                    ColumnDefinition::new(format!("c{}", i), type_id)
                })
                .collect();

            Ok(QueryOutput::result_set(columns, vec![params.to_vec()]))
        })
    }

    fn use_database<'a>(&'a mut self, database: &'a str) -> BoxFuture<'a, Result<(), SqlError>> {
        Box::pin(async move {
            if database == "nope" {
                Err(SqlError::unknown_database(database))
            } else {
                Ok(())
            }
        })
    }

    fn schema(&mut self) -> BoxFuture<'_, Result<mysql_shim::Schema, SqlError>> {
        Box::pin(async {
            let mut schema = mysql_shim::Schema::new();

            schema.insert(
                "t".to_owned(),
                vec![
                    ColumnDefinition::new("id", TypeId::BIG_INT),
                    ColumnDefinition::new("name", TypeId::VAR_CHAR),
                ],
            );

            Ok(schema)
        })
    }
}

// --------------------------------------------------------------- providers

struct Users(HashMap<String, UserEntry>);

impl Users {
    fn single(entry: UserEntry) -> Self {
        let mut users = HashMap::new();
        users.insert(entry.username.clone(), entry);
        Users(users)
    }
}

impl IdentityProvider for Users {
    fn get_user(&self, username: &str) -> BoxFuture<'_, mysql_shim::Result<Option<UserEntry>>> {
        let entry = self.0.get(username).cloned();

        Box::pin(async move { Ok(entry) })
    }
}

struct TestGssProvider;

impl IdentityProvider for TestGssProvider {
    fn get_user(&self, username: &str) -> BoxFuture<'_, mysql_shim::Result<Option<UserEntry>>> {
        let entry = UserEntry::kerberos(username);

        Box::pin(async move { Ok(Some(entry)) })
    }

    fn plugins(&self) -> &[AuthPlugin] {
        &[AuthPlugin::AuthenticationKerberos]
    }

    fn gss_accept(&self) -> mysql_shim::Result<Box<dyn GssContext>> {
        Ok(Box::new(TestGssContext { rounds: 0 }))
    }
}

struct TestGssContext {
    rounds: u32,
}

impl GssContext for TestGssContext {
    fn step(&mut self, client_token: &[u8]) -> BoxFuture<'_, mysql_shim::Result<GssStep>> {
        self.rounds += 1;

        let step = match self.rounds {
            1 => {
                assert_eq!(client_token, b"C1");

                GssStep {
                    token: b"S1".to_vec(),
                    done: false,
                    identity: None,
                }
            }

            _ => {
                assert_eq!(client_token, b"C2");

                GssStep {
                    token: Vec::new(),
                    done: true,
                    identity: Some("alice@EXAMPLE.COM".to_owned()),
                }
            }
        };

        Box::pin(async move { Ok(step) })
    }
}

// ------------------------------------------------------------- test client

struct Client {
    io: DuplexStream,
    seq: u8,
}

impl Client {
    async fn recv(&mut self) -> Vec<u8> {
        let mut packet = Vec::new();

        loop {
            let mut header = [0_u8; 4];
            self.io.read_exact(&mut header).await.unwrap();

            let len = u32::from_le_bytes([header[0], header[1], header[2], 0]) as usize;
            assert_eq!(header[3], self.seq, "server broke the sequence chain");
            self.seq = self.seq.wrapping_add(1);

            let mut payload = vec![0_u8; len];
            self.io.read_exact(&mut payload).await.unwrap();
            packet.extend_from_slice(&payload);

            if len < 0xFF_FFFF {
                break;
            }
        }

        packet
    }

    async fn send(&mut self, payload: &[u8]) {
        let mut frame = Vec::with_capacity(payload.len() + 4);
        frame.extend_from_slice(&(payload.len() as u32).to_le_bytes()[..3]);
        frame.push(self.seq);
        self.seq = self.seq.wrapping_add(1);
        frame.extend_from_slice(payload);

        self.io.write_all(&frame).await.unwrap();
    }

    /// Commands restart the sequence chain at 0.
    async fn command(&mut self, payload: &[u8]) {
        self.seq = 0;
        self.send(payload).await;
    }

    async fn quit(mut self) {
        self.command(&[0x01]).await;
    }
}

fn client_capabilities() -> Capabilities {
    Capabilities::PROTOCOL_41
        | Capabilities::SECURE_CONNECTION
        | Capabilities::PLUGIN_AUTH
        | Capabilities::SESSION_TRACK
        | Capabilities::DEPRECATE_EOF
        | Capabilities::CONNECT_WITH_DB
}

fn handshake_response(
    caps: Capabilities,
    username: &str,
    auth: &[u8],
    database: Option<&str>,
    plugin: &str,
) -> Vec<u8> {
    // the flag promises the field
    let caps = if database.is_none() {
        caps - Capabilities::CONNECT_WITH_DB
    } else {
        caps
    };

    let mut buf = Vec::new();

    buf.extend_from_slice(&(caps.bits() as u32).to_le_bytes());
    buf.extend_from_slice(&0x0100_0000_u32.to_le_bytes());
    buf.push(45);
    buf.extend_from_slice(&[0; 23]);
    buf.extend_from_slice(username.as_bytes());
    buf.push(0);

    // SECURE_CONNECTION form: 1-byte length prefix
    buf.push(auth.len() as u8);
    buf.extend_from_slice(auth);

    if let Some(database) = database {
        buf.extend_from_slice(database.as_bytes());
        buf.push(0);
    }

    buf.extend_from_slice(plugin.as_bytes());
    buf.push(0);

    buf
}

struct Greeting {
    nonce: [u8; 20],
    plugin: String,
}

fn parse_greeting(payload: &[u8]) -> Greeting {
    assert_eq!(payload[0], 10, "protocol version");

    let version_end = 1 + payload[1..].iter().position(|b| *b == 0).unwrap();
    let mut at = version_end + 1;

    at += 4; // connection id

    let mut nonce = [0_u8; 20];
    nonce[..8].copy_from_slice(&payload[at..at + 8]);
    at += 8;

    assert_eq!(payload[at], 0, "filler after the first scramble half");
    at += 1;

    at += 2; // capability bits, low
    at += 1; // collation
    at += 2; // status
    at += 2; // capability bits, high

    assert_eq!(payload[at], 21, "announced auth data length");
    at += 1;

    assert_eq!(&payload[at..at + 10], &[0; 10], "reserved block");
    at += 10;

    nonce[8..].copy_from_slice(&payload[at..at + 12]);
    at += 12;

    assert_eq!(payload[at], 0, "scramble terminator");
    at += 1;

    let plugin_end = at + payload[at..].iter().position(|b| *b == 0).unwrap();
    let plugin = String::from_utf8(payload[at..plugin_end].to_vec()).unwrap();

    Greeting { nonce, plugin }
}

struct Err41 {
    code: u16,
    sqlstate: String,
    message: String,
}

fn parse_err(payload: &[u8]) -> Err41 {
    assert_eq!(payload[0], 0xFF);

    let code = u16::from_le_bytes([payload[1], payload[2]]);
    assert_eq!(payload[3], b'#');

    Err41 {
        code,
        sqlstate: String::from_utf8(payload[4..9].to_vec()).unwrap(),
        message: String::from_utf8(payload[9..].to_vec()).unwrap(),
    }
}

/// Status flags out of an OK packet (0x00 or the 0xFE terminator form).
fn ok_status(payload: &[u8]) -> u16 {
    assert!(payload[0] == 0x00 || payload[0] == 0xFE);

    // affected rows and last insert id are single-byte in every test
    assert_eq!(payload[1], 0);
    assert_eq!(payload[2], 0);

    u16::from_le_bytes([payload[3], payload[4]])
}

type ServeHandle = JoinHandle<mysql_shim::Result<()>>;

async fn connect_with(
    server: Arc<Server>,
    caps: Capabilities,
    username: &str,
    auth: &[u8],
    database: Option<&str>,
    plugin: &str,
) -> (Client, ServeHandle) {
    let (client_io, server_io) = tokio::io::duplex(1024 * 1024);

    let handle = tokio::spawn(async move {
        server.serve(TestSession, server_io, "client.test:3306").await
    });

    let mut client = Client {
        io: client_io,
        seq: 0,
    };

    let greeting = client.recv().await;
    parse_greeting(&greeting);

    client
        .send(&handshake_response(caps, username, auth, database, plugin))
        .await;

    (client, handle)
}

/// Handshake as `u` with an empty password against the accept-all
/// provider, leaving the connection in the command loop.
async fn connect(server: Arc<Server>) -> (Client, ServeHandle) {
    let (mut client, handle) = connect_with(
        server,
        client_capabilities(),
        "u",
        b"",
        None,
        "mysql_native_password",
    )
    .await;

    let ok = client.recv().await;
    assert_eq!(ok[0], 0x00);
    assert_ne!(ok_status(&ok) & 0x0002, 0, "autocommit expected");

    (client, handle)
}

fn accept_all_server() -> Arc<Server> {
    Arc::new(Server::new(ServerOptions::new()))
}

// ------------------------------------------------------------------- tests

#[tokio::test]
async fn minimal_query_round_trip() {
    let (mut client, handle) = connect(accept_all_server()).await;

    client.command(b"\x03SELECT 1").await;

    // column count
    assert_eq!(client.recv().await, [0x01]);

    // column definition: catalog "def", name "1", LONGLONG
    let def = client.recv().await;
    assert_eq!(&def[..4], b"\x03def");
    assert!(def.windows(2).any(|w| w == b"\x011"));

    // one text row: "1" length-encoded
    assert_eq!(client.recv().await, b"\x011");

    // DEPRECATE_EOF terminator: OK packet in 0xFE dress, autocommit set
    let terminator = client.recv().await;
    assert_eq!(terminator[0], 0xFE);
    assert_eq!(ok_status(&terminator), 0x0002);

    client.quit().await;
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn legacy_clients_get_eof_packets() {
    let caps = client_capabilities() - Capabilities::DEPRECATE_EOF;
    let (mut client, handle) = connect_with(
        accept_all_server(),
        caps,
        "u",
        b"",
        None,
        "mysql_native_password",
    )
    .await;

    assert_eq!(client.recv().await[0], 0x00);

    client.command(b"\x03SELECT 1").await;

    assert_eq!(client.recv().await, [0x01]);
    client.recv().await; // column definition

    // EOF between definitions and rows
    let eof = client.recv().await;
    assert_eq!(eof.len(), 5);
    assert_eq!(eof[0], 0xFE);

    assert_eq!(client.recv().await, b"\x011");

    // and EOF, not OK, as the terminator
    let terminator = client.recv().await;
    assert_eq!(terminator.len(), 5);
    assert_eq!(terminator[0], 0xFE);

    client.quit().await;
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn multi_result_sets_chain_with_a_status_flag() {
    let (mut client, handle) = connect(accept_all_server()).await;

    client.command(b"\x03TWO SETS").await;

    assert_eq!(client.recv().await, [0x01]);
    client.recv().await; // column a
    client.recv().await; // row 1

    let first_terminator = client.recv().await;
    assert_ne!(
        ok_status(&first_terminator) & 0x0008,
        0,
        "SERVER_MORE_RESULTS_EXISTS"
    );

    assert_eq!(client.recv().await, [0x01]);
    client.recv().await; // column b
    client.recv().await; // row 2

    let last_terminator = client.recv().await;
    assert_eq!(ok_status(&last_terminator) & 0x0008, 0);

    client.quit().await;
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn session_errors_keep_the_connection() {
    let (mut client, handle) = connect(accept_all_server()).await;

    client.command(b"\x03BAD SYNTAX").await;

    let err = parse_err(&client.recv().await);
    assert_eq!(err.code, 1064);
    assert_eq!(err.sqlstate, "42000");

    // still alive
    client.command(&[0x0E]).await;
    assert_eq!(client.recv().await[0], 0x00);

    client.quit().await;
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn unknown_opcodes_answer_1047() {
    let (mut client, handle) = connect(accept_all_server()).await;

    client.command(&[0x2A]).await;

    let err = parse_err(&client.recv().await);
    assert_eq!(err.code, 1047);
    assert_eq!(err.sqlstate, "HY000");
    assert!(err.message.contains("Unknown command"));

    client.command(&[0x0E]).await;
    assert_eq!(client.recv().await[0], 0x00);

    client.quit().await;
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn auth_switch_to_native_password() {
    let server = Arc::new(Server::with_identity(
        ServerOptions::new(),
        Users::single(UserEntry::native("u", Some("secret"))),
    ));

    // the client leads with a plugin this server never drives
    let (mut client, handle) = connect_with(
        server,
        client_capabilities(),
        "u",
        b"\xAA\xBB",
        None,
        "caching_sha2_password",
    )
    .await;

    let switch = client.recv().await;
    assert_eq!(switch[0], 0xFE);
    assert_eq!(&switch[1..22], b"mysql_native_password");
    assert_eq!(switch[22], 0);

    // fresh 20-byte nonce, NUL-terminated
    let nonce = &switch[23..43];
    assert_eq!(switch[43], 0);

    client.send(&scramble("secret", nonce)).await;

    assert_eq!(client.recv().await[0], 0x00);

    client.quit().await;
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn wrong_password_is_1045_and_the_connection_dies() {
    let server = Arc::new(Server::with_identity(
        ServerOptions::new(),
        Users::single(UserEntry::native("u", Some("secret"))),
    ));

    let (mut client, handle) = connect_with(
        server,
        client_capabilities(),
        "u",
        b"",
        None,
        "caching_sha2_password",
    )
    .await;

    let switch = client.recv().await;
    let nonce = &switch[23..43];

    client.send(&scramble("wrong", nonce)).await;

    let err = parse_err(&client.recv().await);
    assert_eq!(err.code, 1045);
    assert_eq!(err.sqlstate, "28000");

    assert!(handle.await.unwrap().is_err());
}

#[tokio::test]
async fn clear_password_strips_the_trailing_nul() {
    let server = Arc::new(Server::with_identity(
        ServerOptions::new(),
        Users::single(UserEntry::cleartext("u", "hunter2")),
    ));

    let (mut client, handle) = connect_with(
        server,
        client_capabilities(),
        "u",
        b"hunter2\x00",
        None,
        "mysql_clear_password",
    )
    .await;

    assert_eq!(client.recv().await[0], 0x00);

    client.quit().await;
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn no_login_accounts_always_fail() {
    let server = Arc::new(Server::with_identity(
        ServerOptions::new(),
        Users::single(UserEntry::no_login("nobody")),
    ));

    let (mut client, _handle) = connect_with(
        server,
        client_capabilities(),
        "nobody",
        b"",
        None,
        "mysql_no_login",
    )
    .await;

    let err = parse_err(&client.recv().await);
    assert_eq!(err.code, 1045);
}

#[tokio::test]
async fn kerberos_relays_tokens_until_done() {
    let server = Arc::new(Server::with_identity(ServerOptions::new(), TestGssProvider));

    let (mut client, handle) = connect_with(
        server,
        client_capabilities(),
        "k",
        b"C1",
        None,
        "authentication_kerberos",
    )
    .await;

    // one relay round: auth-more-data carrying the provider's token
    assert_eq!(client.recv().await, b"\x01S1");

    client.send(b"C2").await;

    assert_eq!(client.recv().await[0], 0x00);

    client.quit().await;
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn prepared_statements_execute_close_and_expire() {
    let (mut client, handle) = connect(accept_all_server()).await;

    client.command(b"\x16SELECT ?, ?").await;

    let prepare_ok = client.recv().await;
    assert_eq!(prepare_ok[0], 0x00);

    let statement_id = u32::from_le_bytes([
        prepare_ok[1],
        prepare_ok[2],
        prepare_ok[3],
        prepare_ok[4],
    ]);
    assert_eq!(statement_id, 1);
    assert_eq!(u16::from_le_bytes([prepare_ok[5], prepare_ok[6]]), 0); // columns
    assert_eq!(u16::from_le_bytes([prepare_ok[7], prepare_ok[8]]), 2); // params

    // two placeholder parameter definitions (no EOF: DEPRECATE_EOF)
    client.recv().await;
    client.recv().await;

    // execute with [NULL, 42]
    let mut execute = vec![0x17];
    execute.extend_from_slice(&statement_id.to_le_bytes());
    execute.push(0); // flags
    execute.extend_from_slice(&1_u32.to_le_bytes());
    execute.push(0b0000_0001); // NULL bitmap: first parameter
    execute.push(1); // new params bound
    execute.extend_from_slice(&[0x06, 0x00]); // NULL
    execute.extend_from_slice(&[0x03, 0x00]); // LONG
    execute.extend_from_slice(&42_u32.to_le_bytes());

    client.command(&execute).await;

    assert_eq!(client.recv().await, [0x02]);
    client.recv().await; // c0
    client.recv().await; // c1

    // binary row: header, NULL bitmap with bit 2 set, 42 as LONG
    assert_eq!(client.recv().await, [0x00, 0x04, 0x2A, 0x00, 0x00, 0x00]);

    let terminator = client.recv().await;
    assert_eq!(terminator[0], 0xFE);

    // close is silent; execution afterwards is an error
    let mut close = vec![0x19];
    close.extend_from_slice(&statement_id.to_le_bytes());
    client.command(&close).await;

    client.command(&execute).await;

    let err = parse_err(&client.recv().await);
    assert_eq!(err.code, 1243);

    client.quit().await;
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn long_data_replaces_the_wire_value() {
    let (mut client, handle) = connect(accept_all_server()).await;

    client.command(b"\x16SELECT ?").await;
    client.recv().await; // prepare ok
    client.recv().await; // parameter definition

    // stream the parameter in two chunks, unacknowledged
    let mut chunk = vec![0x18];
    chunk.extend_from_slice(&1_u32.to_le_bytes());
    chunk.extend_from_slice(&0_u16.to_le_bytes());
    chunk.extend_from_slice(b"hel");
    client.command(&chunk).await;

    let mut chunk = vec![0x18];
    chunk.extend_from_slice(&1_u32.to_le_bytes());
    chunk.extend_from_slice(&0_u16.to_le_bytes());
    chunk.extend_from_slice(b"lo");
    client.command(&chunk).await;

    let mut execute = vec![0x17];
    execute.extend_from_slice(&1_u32.to_le_bytes());
    execute.push(0);
    execute.extend_from_slice(&1_u32.to_le_bytes());
    execute.push(0); // nothing NULL
    execute.push(1); // new params bound
    execute.extend_from_slice(&[0xFC, 0x00]); // BLOB, value streamed

    client.command(&execute).await;

    assert_eq!(client.recv().await, [0x01]);
    client.recv().await; // column

    // echoed back as a blob column carrying the merged chunks
    let row = client.recv().await;
    assert_eq!(row[0], 0x00);
    assert!(row.ends_with(b"hello"));

    client.recv().await; // terminator

    client.quit().await;
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn init_db_tracks_the_schema_change() {
    let (mut client, handle) = connect(accept_all_server()).await;

    client.command(b"\x02testdb").await;

    let ok = client.recv().await;
    assert_eq!(ok[0], 0x00);
    assert_ne!(ok_status(&ok) & 0x4000, 0, "SERVER_SESSION_STATE_CHANGED");
    assert!(ok.windows(6).any(|w| w == b"testdb"));

    client.command(b"\x02nope").await;

    let err = parse_err(&client.recv().await);
    assert_eq!(err.code, 1049);
    assert_eq!(err.sqlstate, "42000");

    client.quit().await;
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn field_list_serves_the_session_schema() {
    let (mut client, handle) = connect(accept_all_server()).await;

    client.command(b"\x04t\x00%").await;

    let id = client.recv().await;
    assert!(id.windows(3).any(|w| w == b"\x02id"));
    assert!(id.windows(2).any(|w| w == b"\x01t"), "table name filled in");

    let name = client.recv().await;
    assert!(name.windows(5).any(|w| w == b"\x04name"));

    assert_eq!(client.recv().await[0], 0xFE);

    client.quit().await;
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn statistics_is_a_bare_string() {
    let (mut client, handle) = connect(accept_all_server()).await;

    client.command(&[0x07]).await;

    let stats = String::from_utf8(client.recv().await).unwrap();
    assert!(stats.starts_with("Uptime: "));
    assert!(stats.contains("Questions: "));

    client.quit().await;
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn change_user_discards_prepared_statements() {
    let server = Arc::new(Server::with_identity(
        ServerOptions::new(),
        Users::single(UserEntry::native("u", None)),
    ));

    let (mut client, handle) = connect_with(
        server,
        client_capabilities(),
        "u",
        b"",
        None,
        "mysql_native_password",
    )
    .await;
    assert_eq!(client.recv().await[0], 0x00);

    client.command(b"\x16SELECT ?").await;
    client.recv().await; // prepare ok
    client.recv().await; // parameter definition

    // COM_CHANGE_USER back to the same user
    let mut change = vec![0x11];
    change.extend_from_slice(b"u\x00");
    change.push(0); // empty auth response
    change.extend_from_slice(b"\x00"); // no database
    change.extend_from_slice(&45_u16.to_le_bytes());
    change.extend_from_slice(b"mysql_native_password\x00");

    client.command(&change).await;

    // authentication restarts with fresh plugin data
    let switch = client.recv().await;
    assert_eq!(switch[0], 0xFE);
    assert_eq!(&switch[1..22], b"mysql_native_password");

    client.send(b"").await;

    assert_eq!(client.recv().await[0], 0x00);

    // the old statement id died with the old session state
    let mut execute = vec![0x17];
    execute.extend_from_slice(&1_u32.to_le_bytes());
    execute.push(0);
    execute.extend_from_slice(&1_u32.to_le_bytes());
    execute.push(0);
    execute.push(1);
    execute.extend_from_slice(&[0x03, 0x00]);
    execute.extend_from_slice(&7_u32.to_le_bytes());

    client.command(&execute).await;

    let err = parse_err(&client.recv().await);
    assert_eq!(err.code, 1243);

    client.quit().await;
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn reset_connection_clears_statements() {
    let (mut client, handle) = connect(accept_all_server()).await;

    client.command(b"\x16SELECT ?").await;
    client.recv().await;
    client.recv().await;

    client.command(&[0x1F]).await;
    assert_eq!(client.recv().await[0], 0x00);

    let mut execute = vec![0x17];
    execute.extend_from_slice(&1_u32.to_le_bytes());
    execute.push(0);
    execute.extend_from_slice(&1_u32.to_le_bytes());
    execute.push(0);
    execute.push(1);
    execute.extend_from_slice(&[0x03, 0x00]);
    execute.extend_from_slice(&7_u32.to_le_bytes());

    client.command(&execute).await;

    assert_eq!(parse_err(&client.recv().await).code, 1243);

    client.quit().await;
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn a_sequence_gap_aborts_the_connection() {
    let (mut client, handle) = connect(accept_all_server()).await;

    // a command must arrive with sequence id 0; send 3 instead
    client.seq = 3;
    client.send(&[0x0E]).await;

    // the parting ERR restarts the chain the server was expecting
    client.seq = 0;

    let err = parse_err(&client.recv().await);
    assert_eq!(err.code, 1152);

    assert!(handle.await.unwrap().is_err());
}

#[tokio::test]
async fn disconnect_without_quit_is_clean() {
    let (client, handle) = connect(accept_all_server()).await;

    drop(client);

    handle.await.unwrap().unwrap();
}

use std::sync::Arc;
use std::time::Instant;

use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::auth::{
    AuthState, AuthStep, AuthVerdict, ClearPassword, Kerberos, NativePassword, NoLogin,
};
use crate::error::{Error, SqlError};
use crate::identity::IdentityProvider;
use crate::options::ServerOptions;
use crate::protocol::{
    AuthMoreData, AuthPlugin, AuthSwitchRequest, Capabilities, ErrPacket, Handshake,
    HandshakeResponse, OkPacket, Status,
};
use crate::session::{ConnectionInfo, Session};
use crate::statement::StatementRegistry;

mod executor;
mod stream;

use stream::PacketStream;

/// Where the connection stands. Fatal errors behave differently on either
/// side of the handshake, and the terminal states make teardown
/// idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Greeting,
    AwaitHandshakeResponse,
    Authenticating,
    CommandLoop,
    Closing,
    Closed,
}

/// One client connection: the packet stream, the negotiated session
/// facts, and the statement registry, driven as a strict request/response
/// alternation.
pub struct Connection<S, IO> {
    stream: PacketStream<IO>,
    session: S,
    identity: Arc<dyn IdentityProvider>,
    options: Arc<ServerOptions>,

    state: State,
    info: ConnectionInfo,
    status: Status,

    statements: StatementRegistry,

    // COM_STATISTICS fodder
    server_started: Instant,
    questions: u64,
}

impl<S, IO> Connection<S, IO>
where
    S: Session,
    IO: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub(crate) fn new(
        io: IO,
        session: S,
        identity: Arc<dyn IdentityProvider>,
        options: Arc<ServerOptions>,
        connection_id: u32,
        peer_addr: String,
        server_started: Instant,
    ) -> Self {
        let collation = options.collation;

        Self {
            // the advertised set governs packet shapes until negotiation
            stream: PacketStream::new(io, options.capabilities),
            session,
            identity,
            options,
            state: State::Greeting,
            info: ConnectionInfo {
                connection_id,
                peer_addr,
                collation,
                ..ConnectionInfo::default()
            },
            status: Status::SERVER_STATUS_AUTOCOMMIT,
            statements: StatementRegistry::new(),
            server_started,
            questions: 0,
        }
    }

    /// Drive the connection to completion: handshake, command loop,
    /// teardown. Resolves once the peer disconnects, quits, or a fatal
    /// error ends the conversation.
    pub async fn run(mut self) -> crate::Result<()> {
        let result = self.drive().await;

        if let Err(err) = &result {
            log::debug!(
                "connection {} ended with error: {}",
                self.info.connection_id,
                err
            );

            self.fail(err).await;
        }

        self.state = State::Closing;
        self.session.close().await;
        self.state = State::Closed;

        result
    }

    async fn drive(&mut self) -> crate::Result<()> {
        self.handshake().await?;

        loop {
            self.stream.reset_seq();

            let packet = match self.stream.try_receive().await? {
                Some(packet) => packet.to_vec(),
                // peer hung up between commands
                None => return Ok(()),
            };

            if !self.dispatch(&packet).await? {
                return Ok(());
            }
        }
    }

    /// Last words, best effort. A protocol error inside the command loop
    /// gets ERR 1152; before or during the handshake the stream just
    /// closes, and transport failures leave nothing to write to (the
    /// attempt below fails harmlessly).
    async fn fail(&mut self, err: &Error) {
        if self.state != State::CommandLoop {
            return;
        }

        let message = match err {
            Error::Protocol(message) => message.as_ref(),

            // a short or garbled command packet surfaces as a decode
            // error; still worth a last ERR in case the peer is alive
            Error::Io(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::InvalidData
                ) =>
            {
                "malformed packet"
            }

            _ => return,
        };

        let err = SqlError::aborting_connection(self.info.connection_id, message);

        let _ = self.stream.send(ErrPacket::from(&err)).await;
    }

    // https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_connection_phase.html
    async fn handshake(&mut self) -> crate::Result<()> {
        let advertised = self.options.capabilities;
        let nonce = fresh_nonce();

        let default_plugin = self
            .identity
            .plugins()
            .first()
            .copied()
            .unwrap_or(AuthPlugin::MySqlNativePassword);

        let greeting = Handshake {
            server_version: &self.options.server_version,
            connection_id: self.info.connection_id,
            collation: self.options.collation,
            status: self.status,
            auth_plugin: default_plugin,
            nonce: &nonce,
        };

        self.stream.write(greeting);
        self.stream.flush().await?;

        self.state = State::AwaitHandshakeResponse;

        let packet = self.stream.receive().await?.to_vec();
        let response = HandshakeResponse::decode(&packet)?;

        let negotiated = advertised & response.capabilities;

        if !negotiated.contains(Capabilities::PROTOCOL_41) {
            let err = SqlError::feature_disabled("pre-4.1 protocol");
            self.stream.send(ErrPacket::from(&err)).await?;

            return Err(protocol_err!("client does not speak the 4.1 protocol"));
        }

        // every packet from here on takes its shape from this set
        self.stream.capabilities = negotiated;
        self.info.collation = response.collation;

        log::debug!(
            "connection {}: {:?} from {} (capabilities {:?})",
            self.info.connection_id,
            response.username,
            self.info.peer_addr,
            negotiated,
        );

        self.state = State::Authenticating;

        let identity = self
            .authenticate(
                &response.username,
                response.auth_response,
                response.auth_plugin.as_deref(),
                Some(nonce),
            )
            .await?;

        self.info.username = identity.unwrap_or(response.username);
        self.info.database = response.database;
        self.info.connect_attrs = response.connect_attrs;

        self.session.init(&self.info).await;

        if let Some(database) = self.info.database.clone() {
            if let Err(err) = self.session.use_database(&database).await {
                self.stream.send(ErrPacket::from(&err)).await?;

                // the ERR packet said everything there is to say; the
                // Authenticating state keeps `fail` quiet
                return Err(Error::access_denied(&self.info.username));
            }
        }

        self.stream.send(OkPacket::new(self.status)).await?;
        self.state = State::CommandLoop;

        log::debug!(
            "connection {}: authenticated as {:?}",
            self.info.connection_id,
            self.info.username,
        );

        Ok(())
    }

    /// Drive one full plugin exchange. `greeting_nonce` is the scramble
    /// the greeting carried; `None` (COM_CHANGE_USER) forces an
    /// auth-switch so the client proves itself against fresh data.
    ///
    /// Resolves to the authenticated identity when a plugin reports one.
    async fn authenticate(
        &mut self,
        username: &str,
        auth_response: Vec<u8>,
        client_plugin: Option<&str>,
        greeting_nonce: Option<[u8; 20]>,
    ) -> crate::Result<Option<String>> {
        let user = match self.identity.get_user(username).await? {
            Some(user) => user,
            None => return Err(self.reject(username).await),
        };

        let mut nonce = greeting_nonce.unwrap_or_default();

        // the greeting's scramble only counts if the client answered with
        // the plugin this user is actually configured for
        let mut reply = auth_response;

        if greeting_nonce.is_none() || client_plugin != Some(user.plugin.as_str()) {
            nonce = fresh_nonce();

            let data = match user.plugin {
                AuthPlugin::MySqlNativePassword => {
                    let mut data = nonce.to_vec();
                    data.push(0);
                    data
                }

                _ => Vec::new(),
            };

            log::debug!(
                "connection {}: switching client to {}",
                self.info.connection_id,
                user.plugin,
            );

            self.stream
                .send(AuthSwitchRequest {
                    plugin: user.plugin,
                    data: &data,
                })
                .await?;

            reply = self.stream.receive().await?.to_vec();
        }

        let mut plugin: Box<dyn AuthState> = match user.plugin {
            AuthPlugin::MySqlNativePassword => {
                Box::new(NativePassword::new(user.double_sha1, nonce))
            }
            AuthPlugin::MySqlClearPassword => Box::new(ClearPassword::new(user.password)),
            AuthPlugin::MySqlNoLogin => Box::new(NoLogin),
            AuthPlugin::AuthenticationKerberos => {
                Box::new(Kerberos::new(self.identity.gss_accept()?))
            }
        };

        loop {
            match plugin.advance(&reply).await? {
                AuthStep::Exchange(data) => {
                    self.stream.send(AuthMoreData { data: &data }).await?;

                    reply = self.stream.receive().await?.to_vec();
                }

                AuthStep::Done(AuthVerdict::Accept { identity, data }) => {
                    if let Some(data) = data {
                        self.stream.send(AuthMoreData { data: &data }).await?;
                    }

                    return Ok(identity);
                }

                AuthStep::Done(AuthVerdict::Reject) => {
                    return Err(self.reject(username).await);
                }
            }
        }
    }

    /// Emit ERR 1045 and produce the error that ends the connection.
    async fn reject(&mut self, username: &str) -> Error {
        log::debug!(
            "connection {}: access denied for {:?}",
            self.info.connection_id,
            username,
        );

        let err = SqlError::access_denied(username, &self.info.peer_addr);

        if let Err(err) = self.stream.send(ErrPacket::from(&err)).await {
            return err;
        }

        Error::access_denied(username)
    }
}

fn fresh_nonce() -> [u8; 20] {
    let mut nonce = [0_u8; 20];

    for byte in &mut nonce {
        *byte = rand::thread_rng().sample(Alphanumeric);
    }

    nonce
}

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/group__group__cs__capabilities__flags.html
// https://mariadb.com/kb/en/connection/#capabilities
bitflags::bitflags! {
    pub struct Capabilities: u64 {
        /// New, more secure password hashing.
        const LONG_PASSWORD = 1;

        /// Report the number of found (matched) rows, not the number of changed rows.
        const FOUND_ROWS = 2;

        /// Get all column flags.
        const LONG_FLAG = 4;

        /// The handshake response may carry an initial database name.
        const CONNECT_WITH_DB = 8;

        /// Don't allow database.table.column.
        const NO_SCHEMA = 16;

        /// Compression protocol supported.
        const COMPRESS = 32;

        const ODBC = 64;

        const LOCAL_FILES = 128;

        /// Ignore spaces before '('.
        const IGNORE_SPACE = 256;

        /// The 4.1+ protocol: 4-byte capability field, SQLSTATE in ERR packets.
        const PROTOCOL_41 = 512;

        const INTERACTIVE = 1024;

        /// Switch to TLS after the initial handshake.
        const SSL = 2048;

        const IGNORE_SIGPIPE = 4096;

        /// Client knows about transactions (status flags in OK packets).
        const TRANSACTIONS = 8192;

        const RESERVED = 16384;

        /// 4.1+ authentication.
        const SECURE_CONNECTION = 32768;

        const MULTI_STATEMENTS = 1 << 16;

        const MULTI_RESULTS = 1 << 17;

        const PS_MULTI_RESULTS = 1 << 18;

        /// The handshake carries a pluggable-auth plugin name.
        const PLUGIN_AUTH = 1 << 19;

        /// The handshake response carries connection attributes.
        const CONNECT_ATTRS = 1 << 20;

        /// The auth response in the handshake response is length-encoded.
        const PLUGIN_AUTH_LENENC_DATA = 1 << 21;

        const CAN_HANDLE_EXPIRED_PASSWORDS = 1 << 22;

        /// OK packets may carry session state change information.
        const SESSION_TRACK = 1 << 23;

        /// Result sets terminate with an OK packet in place of EOF.
        const DEPRECATE_EOF = 1 << 24;

        const OPTIONAL_RESULTSET_METADATA = 1 << 25;

        const ZSTD_COMPRESSION = 1 << 26;

        /// COM_QUERY and COM_STMT_EXECUTE may carry a query attribute block.
        const QUERY_ATTRIBUTES = 1 << 27;

        const MULTI_FACTOR_AUTHENTICATION = 1 << 28;

        const CAPABILITY_EXTENSION = 1 << 29;

        const SSL_VERIFY_SERVER_CERT = 1 << 30;

        const REMEMBER_OPTIONS = 1 << 31;
    }
}

impl Capabilities {
    /// The set this server advertises in its greeting. The negotiated set
    /// for a connection is the bitwise AND of this and whatever the client
    /// reports back.
    pub fn server_default() -> Self {
        Capabilities::LONG_PASSWORD
            | Capabilities::FOUND_ROWS
            | Capabilities::LONG_FLAG
            | Capabilities::CONNECT_WITH_DB
            | Capabilities::PROTOCOL_41
            | Capabilities::TRANSACTIONS
            | Capabilities::SECURE_CONNECTION
            | Capabilities::MULTI_RESULTS
            | Capabilities::PLUGIN_AUTH
            | Capabilities::CONNECT_ATTRS
            | Capabilities::PLUGIN_AUTH_LENENC_DATA
            | Capabilities::SESSION_TRACK
            | Capabilities::DEPRECATE_EOF
            | Capabilities::QUERY_ATTRIBUTES
    }
}

use crate::protocol::Capabilities;

/// Server-wide knobs, shared by every connection.
///
/// ```rust,no_run
/// use mysql_shim::ServerOptions;
///
/// let options = ServerOptions::new()
///     .server_version("8.0.35-analytics")
///     .collation(45);
/// ```
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub(crate) server_version: String,
    pub(crate) collation: u8,
    pub(crate) capabilities: Capabilities,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            server_version: "8.0.35-mysql-shim".into(),
            // utf8mb4_general_ci
            collation: 45,
            capabilities: Capabilities::server_default(),
        }
    }
}

impl ServerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The version string announced in the greeting. Drivers parse this,
    /// so keep it in `major.minor.patch[-suffix]` shape.
    pub fn server_version(mut self, version: impl Into<String>) -> Self {
        self.server_version = version.into();
        self
    }

    /// Default collation id announced in the greeting.
    pub fn collation(mut self, collation: u8) -> Self {
        self.collation = collation;
        self
    }

    /// Advertise additional capability bits on top of the defaults.
    pub fn extra_capabilities(mut self, extra: Capabilities) -> Self {
        self.capabilities |= extra;
        self
    }
}

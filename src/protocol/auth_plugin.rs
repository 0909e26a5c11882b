use std::fmt;

/// The pluggable-authentication methods this server can drive.
///
/// The client's advertised plugin is kept as a raw string (it may name
/// anything, e.g. `caching_sha2_password`); when it differs from the plugin
/// selected for the user the server issues an auth-switch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPlugin {
    MySqlNativePassword,
    MySqlClearPassword,
    MySqlNoLogin,
    AuthenticationKerberos,
}

impl AuthPlugin {
    pub fn from_str(s: &str) -> Option<AuthPlugin> {
        match s {
            "mysql_native_password" => Some(AuthPlugin::MySqlNativePassword),
            "mysql_clear_password" => Some(AuthPlugin::MySqlClearPassword),
            "mysql_no_login" => Some(AuthPlugin::MySqlNoLogin),
            "authentication_kerberos" => Some(AuthPlugin::AuthenticationKerberos),

            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthPlugin::MySqlNativePassword => "mysql_native_password",
            AuthPlugin::MySqlClearPassword => "mysql_clear_password",
            AuthPlugin::MySqlNoLogin => "mysql_no_login",
            AuthPlugin::AuthenticationKerberos => "authentication_kerberos",
        }
    }
}

impl fmt::Display for AuthPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Connection establishment.

use mongodb::bson::doc;
use mongodb::options::{ClientOptions, Credential, ServerAddress, Tls, TlsOptions};
use mongodb::Client;
use std::fmt;
use std::time::Duration;

use crate::{MongoError, MongoStore};

/// Database that credentials are authenticated against.
const AUTH_SOURCE: &str = "admin";

/// Username and password for authenticating the connection.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything needed to reach the database.
#[derive(Clone, Debug)]
pub struct DialInfo {
    pub host: String,
    pub port: u16,
    pub credentials: Option<Credentials>,
    /// Connect over TLS. Server certificates are not validated: the tool is
    /// pointed at a server by its operator, usually one with a self-signed
    /// certificate.
    pub tls: bool,
    /// Database holding the transaction collections.
    pub database: String,
    pub connect_timeout: Option<Duration>,
}

impl DialInfo {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Driver options for this dial. Does no I/O.
    pub fn client_options(&self) -> ClientOptions {
        let mut options = ClientOptions::default();
        options.hosts = vec![ServerAddress::Tcp {
            host: self.host.clone(),
            port: Some(self.port),
        }];
        options.app_name = Some("txnstats".to_string());
        options.connect_timeout = self.connect_timeout;
        options.server_selection_timeout = self.connect_timeout;

        if let Some(creds) = &self.credentials {
            let mut credential = Credential::default();
            credential.username = Some(creds.username.clone());
            credential.password = Some(creds.password.clone());
            credential.source = Some(AUTH_SOURCE.to_string());
            options.credential = Some(credential);
        }

        if self.tls {
            let mut tls = TlsOptions::default();
            tls.allow_invalid_certificates = Some(true);
            options.tls = Some(Tls::Enabled(tls));
        }

        options
    }
}

/// Open a pooled connection and check it answers a `ping`.
///
/// The driver connects lazily, so the ping is what surfaces bad addresses,
/// failed TLS handshakes and rejected credentials.
pub async fn dial(info: &DialInfo) -> Result<MongoStore, MongoError> {
    let connect_err = |e: mongodb::error::Error| MongoError::Connect {
        addr: info.addr(),
        reason: e.to_string(),
    };

    tracing::debug!(addr = %info.addr(), tls = info.tls, "dialing MongoDB");
    let client = Client::with_options(info.client_options()).map_err(connect_err)?;
    client
        .database(AUTH_SOURCE)
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(connect_err)?;
    tracing::info!(addr = %info.addr(), database = %info.database, "connected");

    Ok(MongoStore::new(&client, &info.database))
}

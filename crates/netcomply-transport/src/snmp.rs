//! SNMP attribute queries using the snmp2 crate
//!
//! Supports SNMPv3 with USM (SHA authentication, AES-128 privacy) and
//! community-based SNMPv2c.

use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use snmp2::v3::{Auth, AuthProtocol, Cipher, Security};
use snmp2::{AsyncSession, Oid, Value};
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::error::QueryError;
use crate::oid::parse_oid;
use crate::traits::TelemetryTransport;

/// `noSuchName` error-status (RFC 1157)
const ERR_NO_SUCH_NAME: u32 = 2;
/// `noAccess` error-status (RFC 3416)
const ERR_NO_ACCESS: u32 = 6;
/// `authorizationError` error-status (RFC 3416)
const ERR_AUTHORIZATION: u32 = 16;

/// SNMPv3 user-based security credentials
#[derive(Clone)]
pub struct UsmCredentials {
    pub user: Vec<u8>,
    pub auth_password: Vec<u8>,
    pub priv_password: Vec<u8>,
}

impl UsmCredentials {
    pub fn new(
        user: impl Into<Vec<u8>>,
        auth_password: impl Into<Vec<u8>>,
        priv_password: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            user: user.into(),
            auth_password: auth_password.into(),
            priv_password: priv_password.into(),
        }
    }

    /// authPriv security context: SHA-1 digest, AES-128 encryption
    fn security(&self) -> Security {
        Security::new(&self.user, &self.auth_password)
            .with_auth_protocol(AuthProtocol::Sha1)
            .with_auth(Auth::AuthPriv {
                cipher: Cipher::Aes128,
                privacy_password: self.priv_password.clone(),
            })
    }
}

/// How requests are authenticated
#[derive(Clone)]
pub enum SnmpSecurity {
    /// SNMPv2c community string
    Community(Vec<u8>),
    /// SNMPv3 user-based security model
    Usm(UsmCredentials),
}

impl SnmpSecurity {
    /// Protocol version label
    #[must_use]
    pub fn version(&self) -> &'static str {
        match self {
            SnmpSecurity::Community(_) => "v2c",
            SnmpSecurity::Usm(_) => "v3",
        }
    }
}

/// Connection settings shared by every device
#[derive(Clone)]
pub struct SnmpSettings {
    /// UDP port of the agent
    pub port: u16,
    pub security: SnmpSecurity,
}

impl std::fmt::Debug for SnmpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("SnmpSettings");
        debug
            .field("port", &self.port)
            .field("version", &self.security.version());
        if let SnmpSecurity::Usm(credentials) = &self.security {
            debug.field("user", &String::from_utf8_lossy(&credentials.user));
        }
        debug.finish_non_exhaustive()
    }
}

impl SnmpSettings {
    /// SNMPv2c settings for the default agent port
    pub fn new(community: impl Into<Vec<u8>>) -> Self {
        Self {
            port: 161,
            security: SnmpSecurity::Community(community.into()),
        }
    }

    /// SNMPv3 settings for the default agent port
    #[must_use]
    pub fn v3(credentials: UsmCredentials) -> Self {
        Self {
            port: 161,
            security: SnmpSecurity::Usm(credentials),
        }
    }

    /// Set custom port
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

/// SNMP GET transport
///
/// Opens a short-lived session per query so that concurrent device passes
/// never share socket state.
#[derive(Debug, Clone)]
pub struct SnmpTransport {
    settings: SnmpSettings,
}

impl SnmpTransport {
    /// Create a new SNMP transport
    #[must_use]
    pub fn new(settings: SnmpSettings) -> Self {
        Self { settings }
    }

    async fn open_session(&self, target: SocketAddr) -> Result<AsyncSession, QueryError> {
        let target = target.to_string();
        match &self.settings.security {
            SnmpSecurity::Community(community) => {
                AsyncSession::new_v2c(target.as_str(), community, 1)
                    .await
                    .map_err(session_error)
            }
            SnmpSecurity::Usm(credentials) => {
                let mut session =
                    AsyncSession::new_v3(target.as_str(), 1, credentials.security())
                        .await
                        .map_err(session_error)?;
                // Engine discovery
                session.init().await.map_err(classify_error)?;
                Ok(session)
            }
        }
    }

    async fn get(
        &self,
        target: SocketAddr,
        oid: &Oid<'_>,
        identifier: &str,
    ) -> Result<String, QueryError> {
        let mut session = self.open_session(target).await?;

        let response = session.get(oid).await.map_err(classify_error)?;

        if response.error_status != 0 {
            return Err(classify_status(response.error_status, identifier));
        }

        let (_, value) = response
            .varbinds
            .into_iter()
            .next()
            .ok_or_else(|| QueryError::Other("empty SNMP response".to_string()))?;

        render_value(&value, identifier)
    }
}

#[async_trait]
impl TelemetryTransport for SnmpTransport {
    #[instrument(skip(self), level = "debug")]
    async fn query(
        &self,
        address: IpAddr,
        identifier: &str,
        timeout_duration: Duration,
    ) -> Result<String, QueryError> {
        let oid = parse_oid(identifier)?;
        let target = SocketAddr::new(address, self.settings.port);
        let start = Instant::now();

        match timeout(timeout_duration, self.get(target, &oid, identifier)).await {
            Ok(Ok(value)) => {
                debug!(elapsed = ?start.elapsed(), "SNMP GET completed");
                Ok(value)
            }
            Ok(Err(e)) => {
                debug!(error = %e, "SNMP GET failed");
                Err(e)
            }
            Err(_) => {
                warn!(
                    %address,
                    identifier,
                    timeout = ?timeout_duration,
                    "SNMP GET timed out"
                );
                Err(QueryError::Timeout {
                    timeout: timeout_duration,
                })
            }
        }
    }

    fn transport_type(&self) -> &'static str {
        match self.settings.security {
            SnmpSecurity::Community(_) => "snmp-v2c",
            SnmpSecurity::Usm(_) => "snmp-v3",
        }
    }
}

/// Turn a varbind value into its text form
///
/// Only display strings and time ticks are meaningful for compliance checks.
fn render_value(value: &Value<'_>, identifier: &str) -> Result<String, QueryError> {
    match value {
        Value::OctetString(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        Value::Timeticks(ticks) => Ok(ticks.to_string()),
        Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => {
            Err(QueryError::NoSuchObject(identifier.to_string()))
        }
        other => Err(QueryError::Other(format!(
            "unexpected value type for {identifier}: {other:?}"
        ))),
    }
}

fn classify_status(status: u32, identifier: &str) -> QueryError {
    match status {
        ERR_NO_SUCH_NAME => QueryError::NoSuchObject(identifier.to_string()),
        ERR_NO_ACCESS | ERR_AUTHORIZATION => {
            QueryError::AuthFailure(format!("agent returned error-status {status}"))
        }
        _ => QueryError::Other(format!("agent returned error-status {status}")),
    }
}

fn session_error(e: std::io::Error) -> QueryError {
    QueryError::Other(format!("failed to open SNMP session: {e}"))
}

fn classify_error(e: snmp2::Error) -> QueryError {
    match e {
        snmp2::Error::CommunityMismatch => {
            QueryError::AuthFailure("community mismatch in response".to_string())
        }
        // Digest, user and engine checks all land here
        snmp2::Error::AuthFailure(kind) => QueryError::AuthFailure(kind.to_string()),
        other => QueryError::Other(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYS_NAME: &str = "1.3.6.1.2.1.1.5.0";

    #[test]
    fn test_render_octet_string() {
        let value = Value::OctetString(b"sw01.example.net");
        assert_eq!(render_value(&value, SYS_NAME).unwrap(), "sw01.example.net");
    }

    #[test]
    fn test_render_timeticks() {
        let value = Value::Timeticks(123_456);
        assert_eq!(render_value(&value, "1.3.6.1.2.1.1.3.0").unwrap(), "123456");
    }

    #[test]
    fn test_render_missing_object() {
        for value in [Value::NoSuchObject, Value::NoSuchInstance, Value::EndOfMibView] {
            assert_eq!(
                render_value(&value, SYS_NAME),
                Err(QueryError::NoSuchObject(SYS_NAME.to_string()))
            );
        }
    }

    #[test]
    fn test_render_unexpected_type() {
        let value = Value::Integer(7);
        assert!(matches!(
            render_value(&value, SYS_NAME),
            Err(QueryError::Other(_))
        ));
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(ERR_NO_SUCH_NAME, SYS_NAME),
            QueryError::NoSuchObject(_)
        ));
        assert!(matches!(
            classify_status(ERR_AUTHORIZATION, SYS_NAME),
            QueryError::AuthFailure(_)
        ));
        assert!(matches!(classify_status(5, SYS_NAME), QueryError::Other(_)));
    }

    #[tokio::test]
    async fn test_invalid_identifier_never_hits_network() {
        let transport = SnmpTransport::new(SnmpSettings::new("public"));
        let result = transport
            .query(
                "192.0.2.1".parse().unwrap(),
                "sysName.0",
                Duration::from_millis(50),
            )
            .await;

        assert!(matches!(result, Err(QueryError::InvalidIdentifier(_))));
    }

    #[test]
    fn test_classify_v3_auth_errors() {
        use snmp2::v3::AuthErrorKind;

        for kind in [
            AuthErrorKind::SignatureMismatch,
            AuthErrorKind::UsernameMismatch,
            AuthErrorKind::NotAuthenticated,
        ] {
            assert!(matches!(
                classify_error(snmp2::Error::AuthFailure(kind)),
                QueryError::AuthFailure(_)
            ));
        }

        let err = classify_error(snmp2::Error::AuthFailure(AuthErrorKind::SignatureMismatch));
        assert_eq!(
            err,
            QueryError::AuthFailure("HMAC signature mismatch".to_string())
        );
    }

    #[test]
    fn test_classify_other_errors() {
        assert!(matches!(
            classify_error(snmp2::Error::CommunityMismatch),
            QueryError::AuthFailure(_)
        ));
        assert!(matches!(
            classify_error(snmp2::Error::Crypto("bad padding".to_string())),
            QueryError::Other(_)
        ));
        assert!(matches!(
            classify_error(snmp2::Error::AsnParse),
            QueryError::Other(_)
        ));
    }

    #[tokio::test]
    async fn test_v3_silent_agent_times_out() {
        // Bound but never answers, so engine discovery hangs
        let agent = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = agent.local_addr().unwrap().port();

        let settings =
            SnmpSettings::v3(UsmCredentials::new("netops", "authpass1", "privpass1"))
                .with_port(port);
        let transport = SnmpTransport::new(settings);
        assert_eq!(transport.transport_type(), "snmp-v3");

        let result = transport
            .query(
                "127.0.0.1".parse().unwrap(),
                "1.3.6.1.2.1.1.5.0",
                Duration::from_millis(100),
            )
            .await;

        assert_eq!(
            result,
            Err(QueryError::Timeout {
                timeout: Duration::from_millis(100)
            })
        );
    }

    #[test]
    fn test_v3_settings_debug_hides_keys() {
        let settings = SnmpSettings::v3(UsmCredentials::new("netops", "authpass1", "privpass1"));
        let debug = format!("{settings:?}");
        assert!(debug.contains("v3"));
        assert!(debug.contains("netops"));
        assert!(!debug.contains("authpass1"));
        assert!(!debug.contains("privpass1"));
    }

    #[test]
    fn test_settings_debug_hides_community() {
        let settings = SnmpSettings::new("s3cr3t").with_port(1161);
        let debug = format!("{settings:?}");
        assert!(debug.contains("1161"));
        assert!(!debug.contains("s3cr3t"));
    }
}

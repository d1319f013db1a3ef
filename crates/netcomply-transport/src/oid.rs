//! Object identifier parsing

use snmp2::Oid;

use crate::error::QueryError;

/// Parse a dotted numeric OID such as `1.3.6.1.2.1.1.5.0`
///
/// A leading dot is accepted. Any non-numeric component makes the whole
/// identifier invalid.
///
/// # Errors
/// Returns `QueryError::InvalidIdentifier` if the text is not a numeric OID.
pub fn parse_oid(s: &str) -> Result<Oid<'static>, QueryError> {
    let trimmed = s.trim();
    let trimmed = trimmed.strip_prefix('.').unwrap_or(trimmed);

    if trimmed.is_empty() {
        return Err(QueryError::InvalidIdentifier(s.to_string()));
    }

    let parts = trimmed
        .split('.')
        .map(str::parse::<u64>)
        .collect::<Result<Vec<u64>, _>>()
        .map_err(|_| QueryError::InvalidIdentifier(s.to_string()))?;

    if parts.len() < 2 {
        return Err(QueryError::InvalidIdentifier(s.to_string()));
    }

    Oid::from(&parts).map_err(|e| QueryError::InvalidIdentifier(format!("{s}: {e:?}")))
}

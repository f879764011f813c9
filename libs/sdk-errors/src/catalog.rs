//! Static catalog of the SDK core error codes and their taxonomy.
use serde::Serialize;

/// Error domain used when the caller does not supply one.
pub const CORE_ERROR_DOMAIN: &str = "identity_sdk.core";

/// Coarse classification of a constructed error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Raised by the network transport; surfaced to the caller verbatim.
    TransportFailure,
    /// Raised by the dedicated invalid-argument constructor.
    InvalidArgument,
    /// Any other domain/code pair.
    GeneralFailure,
}

/// Static error definition from the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrDef {
    pub code: i64,
    pub title: &'static str,
    pub kind: ErrorKind,
}

pub const INVALID_ARGUMENT: ErrDef = ErrDef {
    code: 2,
    title: "Invalid Argument",
    kind: ErrorKind::InvalidArgument,
};

pub const UNKNOWN: ErrDef = ErrDef {
    code: 3,
    title: "Unknown",
    kind: ErrorKind::GeneralFailure,
};

pub const NETWORK: ErrDef = ErrDef {
    code: 4,
    title: "Network",
    kind: ErrorKind::TransportFailure,
};

pub const GRAPH_REQUEST_NON_TEXT_MIME_TYPE: ErrDef = ErrDef {
    code: 6,
    title: "Graph Request Non-Text Mime Type Returned",
    kind: ErrorKind::TransportFailure,
};

pub const GRAPH_REQUEST_PROTOCOL_MISMATCH: ErrDef = ErrDef {
    code: 7,
    title: "Graph Request Protocol Mismatch",
    kind: ErrorKind::TransportFailure,
};

pub const GRAPH_REQUEST_GRAPH_API: ErrDef = ErrDef {
    code: 8,
    title: "Graph API Error",
    kind: ErrorKind::TransportFailure,
};

/// Every catalog entry, ordered by code.
pub const ALL: &[ErrDef] = &[
    INVALID_ARGUMENT,
    UNKNOWN,
    NETWORK,
    GRAPH_REQUEST_NON_TEXT_MIME_TYPE,
    GRAPH_REQUEST_PROTOCOL_MISMATCH,
    GRAPH_REQUEST_GRAPH_API,
];

/// Find the catalog entry for a core-domain code.
pub fn lookup(code: i64) -> Option<&'static ErrDef> {
    ALL.iter().find(|def| def.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_unique() {
        for (i, a) in ALL.iter().enumerate() {
            for b in &ALL[i + 1..] {
                assert_ne!(a.code, b.code, "{} and {} share a code", a.title, b.title);
            }
        }
    }

    #[test]
    fn lookup_finds_known_codes() {
        assert_eq!(lookup(2), Some(&INVALID_ARGUMENT));
        assert_eq!(lookup(4).map(|d| d.kind), Some(ErrorKind::TransportFailure));
        assert!(lookup(999).is_none());
    }
}

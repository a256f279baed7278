//! Error types and service error classification

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::sdb::codec::CodecError;

pub const AUTH_ERROR_CODES: &[&str] = &[
    "AuthFailure",
    "AuthMissingFailure",
    "InvalidHTTPAuthHeader",
    "OptInRequired",
];

pub const ACCESS_ERROR_CODES: &[&str] = &["AccessFailure"];

pub const PARAMETER_ERROR_CODES: &[&str] = &[
    "InvalidAction",
    "InvalidNextToken",
    "InvalidParameterError",
    "InvalidParameterCombination",
    "InvalidParameterValue",
    "MissingAction",
    "MissingParameter",
    "NoSuchDomain",
];

pub const QUERY_ERROR_CODES: &[&str] = &[
    "InvalidNumberPredicates",
    "InvalidNumberValueTests",
    "InvalidQueryExpression",
];

// "NumberDomainBytesExceeeded" is the misspelling some service versions send
pub const LIMIT_ERROR_CODES: &[&str] = &[
    "NumberDomainsExceeded",
    "NumberDomainAttributesExceeded",
    "NumberDomainBytesExceeded",
    "NumberDomainBytesExceeeded",
    "URITooLong",
];

pub const REQUEST_ERROR_CODES: &[&str] = &[
    "InvalidHttpRequest",
    "InvalidSOAPRequest",
    "InvalidURI",
    "InvalidService",
    "UnsupportedHttpVerb",
];

pub const SERVER_ERROR_CODES: &[&str] = &["InternalError", "ServiceOverload", "ServiceUnavailable"];

pub const TIMEOUT_ERROR_CODES: &[&str] = &["RequestExpired", "RequestTimeout", "RequestThrottled"];

pub const VERSION_ERROR_CODES: &[&str] = &["FeatureDeprecated", "NoSuchVersion", "NotYetImplemented"];

/// Category of a service error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Credentials rejected
    Auth,
    /// Access denied
    Access,
    /// Malformed or missing parameter, including unknown domain
    Parameter,
    /// Malformed query expression
    QuerySyntax,
    /// Account or domain quota exceeded
    Limit,
    /// Malformed HTTP-level request
    Request,
    /// Remote internal error or unavailability
    Server,
    /// Request expired or throttled
    Timeout,
    /// Unsupported or deprecated API version
    Version,
    Unknown,
}

/// Lookup order; the first table containing the code wins
const CATEGORY_TABLES: &[(ErrorCategory, &[&str])] = &[
    (ErrorCategory::Auth, AUTH_ERROR_CODES),
    (ErrorCategory::Access, ACCESS_ERROR_CODES),
    (ErrorCategory::Parameter, PARAMETER_ERROR_CODES),
    (ErrorCategory::QuerySyntax, QUERY_ERROR_CODES),
    (ErrorCategory::Limit, LIMIT_ERROR_CODES),
    (ErrorCategory::Request, REQUEST_ERROR_CODES),
    (ErrorCategory::Server, SERVER_ERROR_CODES),
    (ErrorCategory::Timeout, TIMEOUT_ERROR_CODES),
    (ErrorCategory::Version, VERSION_ERROR_CODES),
];

impl ErrorCategory {
    /// Classify a machine error code
    pub fn classify(code: &str) -> Self {
        CATEGORY_TABLES
            .iter()
            .find(|(_, codes)| codes.contains(&code))
            .map(|(category, _)| *category)
            .unwrap_or(ErrorCategory::Unknown)
    }

    /// Every code this category is assigned (empty for `Unknown`)
    pub fn codes(self) -> &'static [&'static str] {
        CATEGORY_TABLES
            .iter()
            .find(|(category, _)| *category == self)
            .map(|(_, codes)| *codes)
            .unwrap_or(&[])
    }

    pub fn name(self) -> &'static str {
        match self {
            ErrorCategory::Auth => "auth",
            ErrorCategory::Access => "access",
            ErrorCategory::Parameter => "parameter",
            ErrorCategory::QuerySyntax => "query_syntax",
            ErrorCategory::Limit => "limit",
            ErrorCategory::Request => "request",
            ErrorCategory::Server => "server",
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::Version => "version",
            ErrorCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified error reported by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub category: ErrorCategory,
    pub code: String,
    pub message: String,
}

impl ServiceError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            category: ErrorCategory::classify(&code),
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ServiceError {}

/// Client errors
#[derive(Error, Debug)]
pub enum SdbError {
    #[error("{category} error: {0}", category = .0.category)]
    Service(ServiceError),

    /// GetAttributes matched nothing
    #[error("No record was found for key={key} in domain {domain}")]
    RecordNotFound { domain: String, key: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP error: {status} - {body}")]
    Http { status: u16, body: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("XML parse error: {0}")]
    XmlParse(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Listing exceeded {pages} pages")]
    PageLimitExceeded { pages: usize },
}

impl SdbError {
    /// Category of a classified service error
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            SdbError::Service(e) => Some(e.category),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SdbError::RecordNotFound { .. })
    }
}

impl From<ServiceError> for SdbError {
    fn from(err: ServiceError) -> Self {
        SdbError::Service(err)
    }
}

impl From<quick_xml::Error> for SdbError {
    fn from(err: quick_xml::Error) -> Self {
        SdbError::XmlParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SdbError>;

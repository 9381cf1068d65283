/// Fatal failure of one refresh; the caller keeps its previous beacon list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload is not valid Base64.
    Encoding(String),
    /// Deobfuscated bytes are not UTF-8.
    TextEncoding { valid_up_to: usize },
    /// Text is not the expected JSON document.
    MalformedStructure(String),
}

impl DecodeError {
    /// Pipeline stage that failed, for log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            DecodeError::Encoding(_) => "base64",
            DecodeError::TextEncoding { .. } => "utf8",
            DecodeError::MalformedStructure(_) => "json",
        }
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Encoding(msg) => write!(f, "payload is not valid base64: {msg}"),
            DecodeError::TextEncoding { valid_up_to } => {
                write!(f, "payload is not valid utf-8 after byte {valid_up_to}")
            }
            DecodeError::MalformedStructure(msg) => write!(f, "payload structure invalid: {msg}"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Why a single situation record's geometry was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    Missing,
    NoBracket,
    Unterminated,
    WrongArity(usize),
    Number(String),
    OutOfRange,
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::Missing => write!(f, "geometry missing"),
            GeometryError::NoBracket => write!(f, "geometry has no coordinate array"),
            GeometryError::Unterminated => write!(f, "geometry coordinate array not closed"),
            GeometryError::WrongArity(n) => {
                write!(f, "expected two coordinate values, found {n}")
            }
            GeometryError::Number(raw) => write!(f, "invalid coordinate number: {raw:?}"),
            GeometryError::OutOfRange => write!(f, "coordinate outside WGS84 range"),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Why a single situation record was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The element is not a situation object (null, array, wrong field types).
    Shape(String),
    Geometry(GeometryError),
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::Shape(msg) => write!(f, "malformed record: {msg}"),
            RecordError::Geometry(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RecordError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecordError::Shape(_) => None,
            RecordError::Geometry(e) => Some(e),
        }
    }
}

impl From<GeometryError> for RecordError {
    fn from(e: GeometryError) -> Self {
        RecordError::Geometry(e)
    }
}

/// A situation record dropped from an otherwise successful batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub id: Option<String>,
    pub error: RecordError,
}

impl std::fmt::Display for SkippedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.id {
            Some(id) => write!(f, "situation record {id}: {}", self.error),
            None => write!(f, "situation record without id: {}", self.error),
        }
    }
}

/// Decoder settings and environment-driven configuration.
pub mod config;
/// Packed-collection decoders (ziplist, listpack, intset, zipmap, quicklist) and element types.
pub mod database;
/// Byte source, format primitives and the streaming decoder.
pub mod engine;
/// Logging setup (formatting, filters).
pub mod logging;
/// JSON output of decoded events.
pub mod printer;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Decoder configuration.
pub use config::{ChecksumPolicy, DecoderConfig, Settings, SettingsError};
/// Element values.
pub use database::{HashField, Scalar, ScoredValue};
/// Decoder and its events.
pub use engine::{
    ChecksumStatus, CollectionData, CollectionEntry, CollectionHead, DecodeStats, Decoder, Event,
    RecordKey, ResizeHint, StringData,
};
/// Errors and result type.
pub use rdbstream_error::{ErrorKind, RdbError, RdbResult, StackError};

use thiserror::Error;

/// Errors the query engine can produce. Every variant's `Display` text is
/// the cause clause printed after the wire protocol's `error: ` prefix.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
  #[error("multiple operators")]
  MultipleOperators,
  #[error("path traverses a non-mapping")]
  NotAMapping,
  #[error("cannot append to dict")]
  AppendToDict,
  #[error("cannot remove from dict")]
  RemoveFromDict,
  #[error("value not found")]
  ValueNotFound,
  #[error("malformed json")]
  MalformedJson,
  #[error("path required")]
  EmptyPath,
  #[error("search takes no path")]
  UnexpectedSearchPrefix,
  #[error("search requires exactly one value")]
  SearchArity,
  #[error("missing value")]
  MissingValue,
  #[error("unexpected value")]
  UnexpectedPayload,
}

use std::borrow::Cow;

/// Name of a chain data source (e.g. "getEraLength") - mostly static constants
pub type SourceName = Cow<'static, str>;

/// Invocation parameter passed through to the chain data source
pub type Param = serde_json::Value;

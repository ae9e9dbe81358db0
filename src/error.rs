use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("failed to read config file")]
    ReadFile,
    #[display("failed to parse config: {reason}")]
    Parse { reason: String },
    #[display("invalid config: {field}")]
    Validation { field: String },
    #[display("failed to load symbol list")]
    SymbolList,
}

#[derive(Debug, Display, Error)]
pub enum SourceError {
    #[display("failed to build HTTP client for {provider}")]
    Client { provider: String },
    #[display("request to {provider} failed: {reason}")]
    Request { provider: String, reason: String },
    #[display("{provider} returned HTTP {status}")]
    Status { provider: String, status: u16 },
    #[display("{provider} rejected the request ({code}): {description}")]
    Provider {
        provider: String,
        code: String,
        description: String,
    },
    #[display("failed to parse response from {provider}")]
    ResponseParse { provider: String },
    #[display("symbol not found: {symbol}")]
    NotFound { symbol: String },
}

#[derive(Debug, Display, Error)]
pub enum IndicatorError {
    #[display("insufficient data: need {required}, got {available}")]
    InsufficientData { required: usize, available: usize },
    #[display("invalid parameter: {name}")]
    InvalidParameter { name: String },
}

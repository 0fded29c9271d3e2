//! Unified error types for the tracker firmware.
//!
//! Each subsystem has its own small `Copy` enum; all of them funnel into
//! [`Error`] so the boot path and the telemetry loop handle failures
//! uniformly.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    Identity(IdentityError),
    Link(LinkError),
    Publish(PublishError),
    Codec(CodecError),
    Gate(GateError),
    Sensor(SensorError),
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity(e) => write!(f, "identity: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Publish(e) => write!(f, "publish: {e}"),
            Self::Codec(e) => write!(f, "codec: {e}"),
            Self::Gate(e) => write!(f, "gate: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Identity errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityError {
    /// The eFuse MAC read returned a non-OK status.
    Unavailable(i32),
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(code) => write!(f, "hardware address unavailable (0x{code:x})"),
        }
    }
}

impl From<IdentityError> for Error {
    fn from(e: IdentityError) -> Self {
        Self::Identity(e)
    }
}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// Operation is not legal in the current link/session state.
    InvalidState,
    /// A radio or network driver call failed.
    Driver(i32),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidState => write!(f, "invalid state"),
            Self::Driver(code) => write!(f, "driver call failed (0x{code:x})"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Publish errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishError {
    /// Link or session is not ready; the message is dropped.
    NotReady,
    /// The underlying client or socket failed.
    Transport(i32),
    /// The endpoint answered with a non-2xx status.
    Rejected(u16),
    /// The envelope could not be serialized.
    Encode,
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "transport not ready"),
            Self::Transport(code) => write!(f, "transport failure (0x{code:x})"),
            Self::Rejected(status) => write!(f, "endpoint rejected request (status {status})"),
            Self::Encode => write!(f, "envelope serialization failed"),
        }
    }
}

impl From<PublishError> for Error {
    fn from(e: PublishError) -> Self {
        Self::Publish(e)
    }
}

// ---------------------------------------------------------------------------
// Codec errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Payload text is not exactly 10 hexadecimal digits.
    MalformedPayload,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedPayload => write!(f, "payload must be exactly 10 hex characters"),
        }
    }
}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}

// ---------------------------------------------------------------------------
// Establishment gate errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    /// No establishment signal arrived within the startup deadline.
    Timeout,
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "network establishment timed out"),
        }
    }
}

impl From<GateError> for Error {
    fn from(e: GateError) -> Self {
        Self::Gate(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// GPS fix could not be read.
    LocationUnavailable,
    /// Battery gauge could not be read.
    BatteryUnavailable,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocationUnavailable => write!(f, "location unavailable"),
            Self::BatteryUnavailable => write!(f, "battery level unavailable"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    InvalidTransport,
    InvalidSsid,
    InvalidPassword,
    InvalidUrl,
    InvalidInterval,
    InvalidSntpServer,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTransport => {
                write!(f, "transport must be mqtt/persistent or http/connectionless")
            }
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::InvalidUrl => {
                write!(f, "URL too long or scheme does not match the selected transport")
            }
            Self::InvalidInterval => write!(f, "publish interval must be non-zero"),
            Self::InvalidSntpServer => write!(f, "SNTP server name longer than 64 bytes"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Ingestion errors (consumer side)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestError {
    /// Message body is not a JSON object.
    InvalidJson,
    /// A required envelope field is absent or not a string.
    MissingField(&'static str),
    /// The `payload` field failed to decode.
    MalformedPayload,
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson => write!(f, "invalid JSON"),
            Self::MissingField(name) => write!(f, "missing required field: {name}"),
            Self::MalformedPayload => write!(f, "invalid hex payload"),
        }
    }
}

impl From<CodecError> for IngestError {
    fn from(_: CodecError) -> Self {
        Self::MalformedPayload
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

use core::fmt;
use embedded_hal::i2c::{self, NoAcknowledgeSource};

/// The only way a bus transaction can fail: the peer left the data line
/// floating when an acknowledgment was expected.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Address or data byte was not acknowledged (SDA read high on the 9th
    /// clock).
    NotAcknowledged,
}

impl Error {
    fn as_str(&self) -> &'static str {
        match self {
            Error::NotAcknowledged => "byte was not acknowledged by the addressed device",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}", self.as_str())
    }
}

impl i2c::Error for Error {
    fn kind(&self) -> i2c::ErrorKind {
        match self {
            Error::NotAcknowledged => i2c::ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
        }
    }
}

/// An error type representing M24SR tag failures on top of a bus error `E`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TagError<E> {
    /// The underlying I2C bus reported an error.
    Bus(E),
    /// A frame could not be built or the response was malformed.
    Kind(ErrorKind),
    /// The tag answered with a status word other than 0x9000.
    Status(u16),
}

impl<E> From<ErrorKind> for TagError<E> {
    fn from(kind: ErrorKind) -> Self {
        TagError::Kind(kind)
    }
}

impl<E: fmt::Debug> fmt::Display for TagError<E> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagError::Bus(e) => write!(fmt, "bus error: {:?}", e),
            TagError::Kind(kind) => write!(fmt, "{}", kind.as_str()),
            TagError::Status(sw) => write!(fmt, "tag returned status word {:#06x}", sw),
        }
    }
}

/// A list of specific tag error causes. Each kind is converted into
/// `TagError`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// bad argument (zero or oversized length, offset out of range)
    BadParam,
    /// Crc error in data received from device
    RxCrcError,
    /// Response is shorter than the minimal frame
    RxFail,
    /// Supplied buffer is too small for data required
    SmallBuffer,
}

impl ErrorKind {
    fn as_str(&self) -> &'static str {
        use ErrorKind::*;
        match self {
            BadParam => "bad argument (zero or oversized length, offset out of range)",
            RxCrcError => "crc error in data received from device",
            RxFail => "response is shorter than the minimal frame",
            SmallBuffer => "supplied buffer is too small for data required",
        }
    }
}

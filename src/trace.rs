//! Wires for observing the bus instead of, or on top of, real hardware.

use super::config::Line;
use super::wire::Wire;

/// One call made through the [`Wire`] interface.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WireCall {
    SetInput(Line),
    SetOutput(Line),
    WriteLow(Line),
    ReadLevel(Line),
}

/// Forwards to an inner wire and logs every call at trace level.
pub struct LoggingWire<W> {
    inner: W,
}

impl<W> LoggingWire<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn inner(&mut self) -> &mut W {
        &mut self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Wire> Wire for LoggingWire<W> {
    fn set_input(&mut self, line: Line) {
        trace!("wire: {:?}", WireCall::SetInput(line));
        self.inner.set_input(line)
    }

    fn set_output(&mut self, line: Line) {
        trace!("wire: {:?}", WireCall::SetOutput(line));
        self.inner.set_output(line)
    }

    fn write_low(&mut self, line: Line) {
        trace!("wire: {:?}", WireCall::WriteLow(line));
        self.inner.write_low(line)
    }

    fn read_level(&mut self, line: Line) -> bool {
        let level = self.inner.read_level(line);
        trace!("wire: {:?} -> {}", WireCall::ReadLevel(line), level);
        level
    }
}

/// A wire attached to nothing. Writes are dropped and every read returns the
/// same level.
///
/// The default level is low, so a dry run sees every byte acknowledged and
/// reads back zeros.
#[derive(Copy, Clone, Debug, Default)]
pub struct DetachedWire {
    level: bool,
}

impl DetachedWire {
    pub const fn new() -> Self {
        Self { level: false }
    }

    /// Every read returns `level`.
    pub const fn reading(level: bool) -> Self {
        Self { level }
    }
}

impl Wire for DetachedWire {
    fn set_input(&mut self, _line: Line) {}

    fn set_output(&mut self, _line: Line) {}

    fn write_low(&mut self, _line: Line) {}

    fn read_level(&mut self, _line: Line) -> bool {
        self.level
    }
}

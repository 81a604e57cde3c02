use core::time::Duration;

/// Identifies one physical wire, usually by its GPIO number.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Line(pub u8);

impl Line {
    /// SCL on the Raspberry Pi rev 2 header.
    pub const RPI_SCL: Line = Line(3);
    /// SDA on the Raspberry Pi rev 2 header.
    pub const RPI_SDA: Line = Line(2);
}

/// Default interval between wire changes.
const T_SETTLE: Duration = Duration::from_nanos(1);
const T_HOLD: Duration = Duration::from_nanos(1);
const T_PERIOD: Duration = Duration::from_nanos(1);

/// Per-bus parameters.
///
/// `settle` is waited after every change of wire state. `hold` and `period`
/// are carried for device-specific protocols and are not consumed by the bus
/// primitives.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BusConfig {
    pub scl: Line,
    pub sda: Line,
    /// Emit a START before every block transfer.
    pub auto_start: bool,
    /// Emit a STOP after every block transfer, including aborted ones.
    pub auto_stop: bool,
    pub settle: Duration,
    pub hold: Duration,
    pub period: Duration,
}

impl BusConfig {
    pub const fn new(scl: Line, sda: Line) -> Self {
        Self {
            scl,
            sda,
            auto_start: true,
            auto_stop: true,
            settle: T_SETTLE,
            hold: T_HOLD,
            period: T_PERIOD,
        }
    }

    pub const fn auto_start(mut self, enabled: bool) -> Self {
        self.auto_start = enabled;
        self
    }

    pub const fn auto_stop(mut self, enabled: bool) -> Self {
        self.auto_stop = enabled;
        self
    }

    pub const fn settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub const fn hold(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }

    pub const fn period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Settle time in whole nanoseconds, saturated to what `DelayNs` takes.
    pub(crate) fn settle_ns(&self) -> u32 {
        u32::try_from(self.settle.as_nanos()).unwrap_or(u32::MAX)
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::new(Line::RPI_SCL, Line::RPI_SDA)
    }
}

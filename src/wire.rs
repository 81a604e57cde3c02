use super::config::{BusConfig, Line};
use core::convert::Infallible;
use embedded_hal::digital::{InputPin, OutputPin};

/// Software access to the open-drain lines of the bus.
///
/// A floating line reads as 1 through the external pull-up. A line is pulled
/// to 0 only while it is in output mode with its latch written low.
pub trait Wire {
    /// Release the line so it floats high.
    fn set_input(&mut self, line: Line);
    /// Put the line into output mode, driving whatever its latch holds.
    fn set_output(&mut self, line: Line);
    /// Latch the line's output value low.
    fn write_low(&mut self, line: Line);
    /// Sample the line's logic level.
    fn read_level(&mut self, line: Line) -> bool;
}

impl<T: Wire + ?Sized> Wire for &mut T {
    fn set_input(&mut self, line: Line) {
        T::set_input(self, line)
    }

    fn set_output(&mut self, line: Line) {
        T::set_output(self, line)
    }

    fn write_low(&mut self, line: Line) {
        T::write_low(self, line)
    }

    fn read_level(&mut self, line: Line) -> bool {
        T::read_level(self, line)
    }
}

/// One open-drain pin with emulated direction and latch.
struct OpenDrain<P> {
    pin: P,
    line: Line,
    output: bool,
    latch_low: bool,
}

impl<P> OpenDrain<P>
where
    P: OutputPin<Error = Infallible> + InputPin<Error = Infallible>,
{
    fn new(pin: P, line: Line) -> Self {
        let mut this = Self {
            pin,
            line,
            output: false,
            latch_low: false,
        };
        this.apply();
        this
    }

    fn apply(&mut self) {
        let result = if self.output && self.latch_low {
            self.pin.set_low()
        } else {
            self.pin.set_high()
        };
        result.unwrap_or_else(|e| match e {})
    }

    fn is_high(&mut self) -> bool {
        self.pin.is_high().unwrap_or_else(|e| match e {})
    }
}

/// [`Wire`] over two `embedded-hal` open-drain pins.
///
/// The pins must release the line when set high, which is how open-drain
/// outputs behave on most HALs.
pub struct PinWire<SCL, SDA> {
    scl: OpenDrain<SCL>,
    sda: OpenDrain<SDA>,
}

impl<SCL, SDA> PinWire<SCL, SDA>
where
    SCL: OutputPin<Error = Infallible> + InputPin<Error = Infallible>,
    SDA: OutputPin<Error = Infallible> + InputPin<Error = Infallible>,
{
    /// Binds the pins to the lines named in `config`. Both start released.
    pub fn new(config: &BusConfig, scl: SCL, sda: SDA) -> Self {
        Self {
            scl: OpenDrain::new(scl, config.scl),
            sda: OpenDrain::new(sda, config.sda),
        }
    }

    pub fn release(self) -> (SCL, SDA) {
        (self.scl.pin, self.sda.pin)
    }

    fn with_line<R>(
        &mut self,
        line: Line,
        scl: impl FnOnce(&mut OpenDrain<SCL>) -> R,
        sda: impl FnOnce(&mut OpenDrain<SDA>) -> R,
    ) -> Option<R> {
        if line == self.scl.line {
            Some(scl(&mut self.scl))
        } else if line == self.sda.line {
            Some(sda(&mut self.sda))
        } else {
            warn!("no pin bound to line {:?}", line);
            None
        }
    }
}

impl<SCL, SDA> Wire for PinWire<SCL, SDA>
where
    SCL: OutputPin<Error = Infallible> + InputPin<Error = Infallible>,
    SDA: OutputPin<Error = Infallible> + InputPin<Error = Infallible>,
{
    fn set_input(&mut self, line: Line) {
        self.with_line(
            line,
            |pin| {
                pin.output = false;
                pin.apply()
            },
            |pin| {
                pin.output = false;
                pin.apply()
            },
        );
    }

    fn set_output(&mut self, line: Line) {
        self.with_line(
            line,
            |pin| {
                pin.output = true;
                pin.apply()
            },
            |pin| {
                pin.output = true;
                pin.apply()
            },
        );
    }

    fn write_low(&mut self, line: Line) {
        self.with_line(
            line,
            |pin| {
                pin.latch_low = true;
                pin.apply()
            },
            |pin| {
                pin.latch_low = true;
                pin.apply()
            },
        );
    }

    fn read_level(&mut self, line: Line) -> bool {
        // An unbound line is not driven by us, so it reads as floating.
        self.with_line(line, OpenDrain::is_high, OpenDrain::is_high)
            .unwrap_or(true)
    }
}

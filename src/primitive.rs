use super::config::Line;
use super::wire::Wire;
use embedded_hal::delay::DelayNs;

/// Bus transitions built from wire calls.
///
/// Lines are pulled low by switching them to output (their latches are set low
/// once by [`Signals::init`]) and released by switching them to input. The
/// rising edge of SCL is the instant data is sampled. Apart from `init`,
/// `idle` and `stop`, every transition leaves SCL driven low so transitions
/// can be chained without tracking wire state.
pub(crate) struct Signals<'a, W, D> {
    pub(crate) wire: &'a mut W,
    pub(crate) delay: &'a mut D,
    pub(crate) scl: Line,
    pub(crate) sda: Line,
    pub(crate) settle_ns: u32,
}

impl<'a, W, D> Signals<'a, W, D>
where
    W: Wire,
    D: DelayNs,
{
    /// Both lines released, output latches low.
    pub(crate) fn init(&mut self) {
        trace!("i2c: init");
        self.wire.set_input(self.sda);
        self.wire.write_low(self.sda);
        self.wire.set_input(self.scl);
        self.wire.write_low(self.scl);
    }

    pub(crate) fn idle(&mut self) {
        trace!("i2c: idle");
        self.none();
    }

    /// SDA falls while SCL is high.
    /// Expects both lines floating, leaves both driven low.
    pub(crate) fn start(&mut self) {
        trace!("i2c: start");
        self.sda_only();
        self.settle();
        self.both();
        self.settle();
    }

    /// Releases both lines from the middle of a transfer, then starts again.
    /// Expects SCL low and SDA released by the peer.
    pub(crate) fn restart(&mut self) {
        trace!("i2c: restart");
        self.none();
        self.settle();
        self.start();
    }

    /// SDA rises while SCL is high.
    /// Expects SCL driven low, leaves both floating.
    pub(crate) fn stop(&mut self) {
        trace!("i2c: stop");
        self.sda_only();
        self.settle();
        self.none();
        self.settle();
    }

    /// Expects SCL driven low, leaves SCL driven low.
    pub(crate) fn write_bit(&mut self, bit: bool) {
        if bit {
            trace!("i2c: write1");
            self.scl_only();
            self.settle();
            // rising edge of SCL captures SDA
            self.none();
            self.settle();
            self.scl_only();
            self.settle();
        } else {
            trace!("i2c: write0");
            self.both();
            self.settle();
            self.sda_only();
            self.settle();
            self.both();
            self.settle();
        }
    }

    /// Releases SDA so the peer can drive it, samples it with SCL high.
    /// Expects SCL driven low, leaves SCL driven low.
    pub(crate) fn read_bit(&mut self) -> bool {
        self.scl_only();
        self.settle();
        self.none();
        self.settle();
        let bit = self.wire.read_level(self.sda);
        self.scl_only();
        self.settle();
        trace!("i2c: read {}", bit);
        bit
    }

    fn settle(&mut self) {
        self.delay.delay_ns(self.settle_ns);
    }

    // Drive patterns, SDA is always switched before SCL.

    fn none(&mut self) {
        self.wire.set_input(self.sda);
        self.wire.set_input(self.scl);
    }

    fn sda_only(&mut self) {
        self.wire.set_output(self.sda);
        self.wire.set_input(self.scl);
    }

    fn scl_only(&mut self) {
        self.wire.set_input(self.sda);
        self.wire.set_output(self.scl);
    }

    fn both(&mut self) {
        self.wire.set_output(self.sda);
        self.wire.set_output(self.scl);
    }
}

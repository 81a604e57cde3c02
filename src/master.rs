use super::config::BusConfig;
use super::error::Error;
use super::primitive::Signals;
use super::wire::Wire;
use embedded_hal::delay::DelayNs;

/// R/W bit appended to the 7-bit address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    Write = 0x00,
    Read = 0x01,
}

impl Direction {
    /// Address in the high 7 bits, direction in bit 0.
    pub(crate) fn address_byte(self, address: u8) -> u8 {
        address << 1 | self as u8
    }
}

/// Bit-banged I2C master.
///
/// Owns its [`BusConfig`] together with the wire and the delay it drives the
/// bus with. Pass `&mut` references to lend them for the master's lifetime and
/// take them back with [`I2cMaster::release`].
///
/// Every operation takes `&mut self`, so a transaction runs to completion
/// before anything else can touch the bus through this master. Callers sharing
/// one bus between contexts must hold their own lock across each full
/// transaction.
pub struct I2cMaster<W, D> {
    wire: W,
    delay: D,
    config: BusConfig,
}

impl<W, D> I2cMaster<W, D>
where
    W: Wire,
    D: DelayNs,
{
    /// Stores `config` and releases both lines.
    pub fn new(wire: W, delay: D, config: BusConfig) -> Self {
        let mut master = Self {
            wire,
            delay,
            config,
        };
        master.init(config);
        master
    }

    pub fn with_defaults(wire: W, delay: D) -> Self {
        Self::new(wire, delay, BusConfig::default())
    }

    /// Replaces the configuration and puts the bus back into its initial idle
    /// state.
    pub fn init(&mut self, config: BusConfig) {
        debug!(
            "i2c: init scl {:?} sda {:?} settle {}ns",
            config.scl,
            config.sda,
            config.settle_ns()
        );
        self.config = config;
        self.signals().init();
    }

    pub fn init_defaults(&mut self) {
        self.init(BusConfig::default())
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Selects whether block transfers frame themselves with START and STOP.
    pub fn set_mode(&mut self, auto_start: bool, auto_stop: bool) {
        self.config.auto_start = auto_start;
        self.config.auto_stop = auto_stop;
    }

    /// Generates a START condition. Both lines must be floating.
    pub fn start(&mut self) {
        self.signals().start()
    }

    /// Generates a STOP condition, leaving both lines floating.
    pub fn stop(&mut self) {
        self.signals().stop()
    }

    /// Releases both lines.
    pub fn finished(&mut self) {
        self.signals().idle()
    }

    pub fn release(self) -> (W, D) {
        (self.wire, self.delay)
    }

    /// Sends `byte` MSB first and samples the 9th bit. No START or STOP.
    pub fn transmit_byte(&mut self, byte: u8) -> Result<(), Error> {
        let mut signals = self.signals();
        for i in 0..8 {
            signals.write_bit(byte & (0x80 >> i) != 0);
        }

        // A peer that takes the byte pulls SDA low; a floating line is a NACK.
        if signals.read_bit() {
            Err(Error::NotAcknowledged)
        } else {
            Ok(())
        }
    }

    /// Receives a byte MSB first. With `ack` the 9th bit is driven low to ask
    /// for more; without it the bus is left alone so the peer stops sending.
    /// No START or STOP.
    pub fn receive_byte(&mut self, ack: bool) -> u8 {
        let mut signals = self.signals();
        let mut byte = 0u8;
        for _ in 0..8 {
            byte = byte << 1 | u8::from(signals.read_bit());
        }
        if ack {
            signals.write_bit(false);
        }
        byte
    }

    /// Writes `data` to the 7-bit `address`.
    ///
    /// The address byte is sent even when `data` is empty. A NACK aborts the
    /// transfer: no further bytes are sent, a STOP follows if `auto_stop` is
    /// set and the error is returned.
    pub fn write_block(&mut self, address: u8, data: &[u8]) -> Result<(), Error> {
        if self.config.auto_start {
            self.start();
        }
        let result = self.write_frames(address, data);
        self.end_block(result)
    }

    /// Fills `buffer` from the 7-bit `address`, acknowledging every byte but
    /// the last.
    ///
    /// Only the address byte can be refused; a NACK there aborts the transfer
    /// like in [`I2cMaster::write_block`].
    pub fn read_block(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Error> {
        if self.config.auto_start {
            self.start();
        }
        let result = self.read_frames(address, buffer);
        self.end_block(result)
    }

    fn write_frames(&mut self, address: u8, data: &[u8]) -> Result<(), Error> {
        self.send_address(address, Direction::Write)?;
        for (i, &byte) in data.iter().enumerate() {
            self.transmit_byte(byte).map_err(|e| {
                debug!("i2c: data byte {} to {:#x} not acknowledged", i, address);
                e
            })?;
        }
        Ok(())
    }

    fn read_frames(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Error> {
        self.send_address(address, Direction::Read)?;
        self.receive_into(buffer, false);
        Ok(())
    }

    /// Receives into `buffer`. The last byte is acknowledged only when
    /// `ack_last` is set.
    pub(crate) fn receive_into(&mut self, buffer: &mut [u8], ack_last: bool) {
        let last = buffer.len().saturating_sub(1);
        for (i, slot) in buffer.iter_mut().enumerate() {
            *slot = self.receive_byte(i < last || ack_last);
        }
    }

    pub(crate) fn send_address(&mut self, address: u8, direction: Direction) -> Result<(), Error> {
        self.transmit_byte(direction.address_byte(address))
            .map_err(|e| {
                debug!("i2c: address {:#x} not acknowledged", address);
                e
            })
    }

    pub(crate) fn restart(&mut self) {
        self.signals().restart()
    }

    fn end_block(&mut self, result: Result<(), Error>) -> Result<(), Error> {
        if self.config.auto_stop {
            self.stop();
        }
        result
    }

    fn signals(&mut self) -> Signals<'_, W, D> {
        Signals {
            wire: &mut self.wire,
            delay: &mut self.delay,
            scl: self.config.scl,
            sda: self.config.sda,
            settle_ns: self.config.settle_ns(),
        }
    }
}

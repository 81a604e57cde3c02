//! Simulated bus for the unit tests.
//!
//! `Peer` is a [`Wire`] that models both open-drain lines, decodes what the
//! master does into [`Symbol`]s and optionally plays an addressed target that
//! acknowledges, stores written bytes and serves bytes to read.

use crate::config::Line;
use crate::trace::WireCall;
use crate::wire::Wire;
use embedded_hal::delay::DelayNs;

/// Counts settle delays instead of sleeping.
#[derive(Debug, Default)]
pub(crate) struct NoDelay {
    pub(crate) calls: usize,
    pub(crate) total_ns: u64,
}

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.total_ns += u64::from(ns);
    }
}

/// What happened on the bus, as seen by a receiver.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Symbol {
    Start,
    Stop,
    /// A clock pulse during which the master did not sample SDA.
    Write(bool),
    /// A clock pulse during which the master sampled SDA.
    Read(bool),
}

/// Symbols of a byte written by the master followed by the target's
/// acknowledgment.
pub(crate) fn tx(byte: u8, ack: bool) -> Vec<Symbol> {
    let mut symbols: Vec<Symbol> = (0..8)
        .map(|i| Symbol::Write(byte & (0x80 >> i) != 0))
        .collect();
    symbols.push(Symbol::Read(!ack));
    symbols
}

/// Symbols of a byte read by the master, followed by its ACK when `ack`.
pub(crate) fn rx(byte: u8, ack: bool) -> Vec<Symbol> {
    let mut symbols: Vec<Symbol> = (0..8)
        .map(|i| Symbol::Read(byte & (0x80 >> i) != 0))
        .collect();
    if ack {
        symbols.push(Symbol::Write(false));
    }
    symbols
}

#[derive(Copy, Clone, Debug)]
struct Bit {
    level: bool,
    sampled: bool,
}

#[derive(Copy, Clone, Debug)]
enum State {
    /// Waiting for a START.
    Idle,
    Address { shift: u8, count: u8 },
    AddressAck { read: bool },
    Receiving { shift: u8, count: u8 },
    DataAck,
    Sending { byte: u8, count: u8 },
    MasterAck,
    /// Not addressed, or the master ended the read.
    Ignore,
}

#[derive(Debug, Default)]
struct Target {
    address: u8,
    nack_address: bool,
    nack_data_at: Option<usize>,
    to_send: Vec<u8>,
    sent: usize,
    received: Vec<u8>,
}

pub(crate) struct Peer {
    scl: Line,
    sda: Line,
    scl_output: bool,
    scl_latch_low: bool,
    sda_output: bool,
    sda_latch_low: bool,
    /// The target is pulling SDA low.
    holding_sda: bool,
    prev_scl: bool,
    prev_sda: bool,
    bit: Option<Bit>,
    state: State,
    target: Option<Target>,
    addresses: Vec<u8>,
    symbols: Vec<Symbol>,
    calls: Vec<WireCall>,
}

impl Peer {
    /// A bus with pull-ups and nothing else on it.
    pub(crate) fn new() -> Self {
        Self {
            scl: Line(3),
            sda: Line(2),
            scl_output: false,
            scl_latch_low: false,
            sda_output: false,
            sda_latch_low: false,
            holding_sda: false,
            prev_scl: true,
            prev_sda: true,
            bit: None,
            state: State::Idle,
            target: None,
            addresses: Vec::new(),
            symbols: Vec::new(),
            calls: Vec::new(),
        }
    }

    /// A bus with a target answering at `address`.
    pub(crate) fn with_target(address: u8) -> Self {
        let mut peer = Self::new();
        peer.target = Some(Target {
            address,
            ..Target::default()
        });
        peer
    }

    /// Bytes the target hands out on reads, in order.
    pub(crate) fn serving(mut self, data: &[u8]) -> Self {
        self.target_mut().to_send = data.to_vec();
        self
    }

    pub(crate) fn nack_address(mut self) -> Self {
        self.target_mut().nack_address = true;
        self
    }

    /// Leave the `index`th written data byte unacknowledged.
    pub(crate) fn nack_data_at(mut self, index: usize) -> Self {
        self.target_mut().nack_data_at = Some(index);
        self
    }

    pub(crate) fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub(crate) fn calls(&self) -> &[WireCall] {
        &self.calls
    }

    /// Every address byte seen after a START, direction bit included.
    pub(crate) fn addresses(&self) -> &[u8] {
        &self.addresses
    }

    pub(crate) fn received(&self) -> &[u8] {
        self.target.as_ref().map_or(&[][..], |t| t.received.as_slice())
    }

    pub(crate) fn count(&self, symbol: Symbol) -> usize {
        self.symbols.iter().filter(|&&s| s == symbol).count()
    }

    pub(crate) fn scl_level(&self) -> bool {
        !(self.scl_output && self.scl_latch_low)
    }

    pub(crate) fn sda_level(&self) -> bool {
        !(self.sda_output && self.sda_latch_low) && !self.holding_sda
    }

    fn target_mut(&mut self) -> &mut Target {
        self.target.as_mut().expect("peer has no target")
    }

    fn level(&self, line: Line) -> bool {
        if line == self.scl {
            self.scl_level()
        } else if line == self.sda {
            self.sda_level()
        } else {
            panic!("unexpected line {:?}", line)
        }
    }

    fn update(&mut self) {
        let scl = self.scl_level();
        let sda = self.sda_level();

        if self.prev_scl && scl && self.prev_sda != sda {
            if sda {
                self.on_stop();
            } else {
                self.on_start();
            }
        } else if !self.prev_scl && scl {
            self.bit = Some(Bit {
                level: sda,
                sampled: false,
            });
        } else if self.prev_scl && !scl {
            if let Some(bit) = self.bit.take() {
                self.on_bit(bit);
            }
        }

        self.prev_scl = scl;
        // the target may have changed what it drives
        self.prev_sda = self.sda_level();
    }

    fn on_start(&mut self) {
        self.symbols.push(Symbol::Start);
        self.bit = None;
        self.holding_sda = false;
        self.state = State::Address { shift: 0, count: 0 };
    }

    fn on_stop(&mut self) {
        self.symbols.push(Symbol::Stop);
        self.bit = None;
        self.holding_sda = false;
        self.state = State::Idle;
    }

    fn on_bit(&mut self, bit: Bit) {
        self.symbols.push(if bit.sampled {
            Symbol::Read(bit.level)
        } else {
            Symbol::Write(bit.level)
        });

        let level = u8::from(bit.level);
        self.state = match self.state {
            State::Idle => State::Idle,
            State::Address { shift, count } => {
                let shift = shift << 1 | level;
                if count < 7 {
                    State::Address {
                        shift,
                        count: count + 1,
                    }
                } else {
                    self.addresses.push(shift);
                    let matches = self
                        .target
                        .as_ref()
                        .map_or(false, |t| t.address == shift >> 1 && !t.nack_address);
                    if matches {
                        self.holding_sda = true;
                        State::AddressAck {
                            read: shift & 1 == 1,
                        }
                    } else {
                        State::Ignore
                    }
                }
            }
            State::AddressAck { read } => {
                self.holding_sda = false;
                if read {
                    self.next_to_send()
                } else {
                    State::Receiving { shift: 0, count: 0 }
                }
            }
            State::Receiving { shift, count } => {
                let shift = shift << 1 | level;
                if count < 7 {
                    State::Receiving {
                        shift,
                        count: count + 1,
                    }
                } else {
                    let target = self.target_mut();
                    target.received.push(shift);
                    let index = target.received.len() - 1;
                    let ack = target.nack_data_at != Some(index);
                    self.holding_sda = ack;
                    State::DataAck
                }
            }
            State::DataAck => {
                self.holding_sda = false;
                State::Receiving { shift: 0, count: 0 }
            }
            State::Sending { byte, count } => {
                let count = count + 1;
                if count < 8 {
                    self.holding_sda = byte & (0x80 >> count) == 0;
                    State::Sending { byte, count }
                } else {
                    self.holding_sda = false;
                    State::MasterAck
                }
            }
            State::MasterAck => {
                if bit.level {
                    State::Ignore
                } else {
                    self.next_to_send()
                }
            }
            State::Ignore => State::Ignore,
        };
    }

    /// Puts the MSB of the next byte to serve on SDA.
    fn next_to_send(&mut self) -> State {
        let target = self.target_mut();
        let byte = target.to_send.get(target.sent).copied().unwrap_or(0xff);
        target.sent += 1;
        self.holding_sda = byte & 0x80 == 0;
        State::Sending { byte, count: 0 }
    }
}

impl Wire for Peer {
    fn set_input(&mut self, line: Line) {
        self.calls.push(WireCall::SetInput(line));
        if line == self.scl {
            self.scl_output = false;
        } else {
            self.sda_output = false;
        }
        self.update();
    }

    fn set_output(&mut self, line: Line) {
        self.calls.push(WireCall::SetOutput(line));
        if line == self.scl {
            self.scl_output = true;
        } else {
            self.sda_output = true;
        }
        self.update();
    }

    fn write_low(&mut self, line: Line) {
        self.calls.push(WireCall::WriteLow(line));
        if line == self.scl {
            self.scl_latch_low = true;
        } else {
            self.sda_latch_low = true;
        }
        self.update();
    }

    fn read_level(&mut self, line: Line) -> bool {
        self.calls.push(WireCall::ReadLevel(line));
        let level = self.level(line);
        if line == self.sda && self.scl_level() {
            if let Some(bit) = self.bit.as_mut() {
                bit.sampled = true;
                bit.level = level;
            }
        }
        level
    }
}

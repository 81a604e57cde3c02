//! Driver for the ST M24SR dynamic NFC tag over I2C.
//!
//! The tag speaks ISO/IEC 7816-4 APDUs wrapped in ISO/IEC 14443-4 style
//! blocks: every command frame starts with a protocol control byte (PCB) and
//! ends with a CRC-A. The I2C host has to take the session token from the RF
//! side with [`NfcTag::kill_rf_session`] before anything else, and should give
//! it back with [`NfcTag::deselect`] when done.
//!
//! ```ignore
//! let mut tag = NfcTag::new(i2c);
//! tag.kill_rf_session()?;
//! tag.select_application()?;
//! let mut message = [0u8; 128];
//! let length = tag.read_ndef(&mut message)?;
//! tag.deselect()?;
//! ```
mod frame;

pub use frame::CRC_A;

use crate::error::{ErrorKind, TagError};
use embedded_hal::i2c::I2c;
use frame::{FrameBuffer, FrameBuilder, Response, READ_SIZE_MAX, RSP_SIZE_MIN};
use hex_literal::hex;

/// Default 7-bit I2C address.
pub const ADDRESS: u8 = 0x56;

const KILL_RF_SESSION: u8 = 0x52;
// S-block DESELECT
const S_DESELECT: u8 = 0xC2;
// I-block, block number in bit 0
const I_BLOCK: u8 = 0x02;

const CLA: u8 = 0x00;
const INS_SELECT: u8 = 0xA4;
const INS_READ_BINARY: u8 = 0xB0;

const NDEF_APPLICATION: [u8; 7] = hex!("D2 76 00 00 85 01 01");
// The NDEF file starts with the message length.
const NDEF_LENGTH_SIZE: usize = 2;

/// Files that can be selected within the NDEF application.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum FileId {
    System = 0xE101,
    CapabilityContainer = 0xE103,
    Ndef = 0x0001,
}

pub struct NfcTag<I2C> {
    i2c: I2C,
    address: u8,
    block: u8,
    buffer: FrameBuffer,
}

impl<I2C> NfcTag<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, ADDRESS)
    }

    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            block: 0,
            buffer: FrameBuffer::new(),
        }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> NfcTag<I2C>
where
    I2C: I2c,
{
    /// Opens an I2C session, terminating any RF session in progress.
    pub fn kill_rf_session(&mut self) -> Result<(), TagError<I2C::Error>> {
        debug!("m24sr: kill rf session");
        self.block = 0;
        self.i2c
            .write(self.address, &[KILL_RF_SESSION])
            .map_err(TagError::Bus)
    }

    pub fn select_application(&mut self) -> Result<(), TagError<I2C::Error>> {
        let header = [CLA, INS_SELECT, 0x04, 0x00, NDEF_APPLICATION.len() as u8];
        let apdu: [&[u8]; 3] = [&header, &NDEF_APPLICATION, &[0x00]];
        self.exchange(&apdu, 0)?;
        Ok(())
    }

    pub fn select_file(&mut self, file: FileId) -> Result<(), TagError<I2C::Error>> {
        let header = [CLA, INS_SELECT, 0x00, 0x0C, 0x02];
        let id = (file as u16).to_be_bytes();
        let apdu: [&[u8]; 2] = [&header, &id];
        self.exchange(&apdu, 0)?;
        Ok(())
    }

    /// Reads `buffer.len()` bytes at `offset` of the selected file.
    ///
    /// At most 0xF6 bytes fit in one response.
    pub fn read_binary(&mut self, offset: u16, buffer: &mut [u8]) -> Result<(), TagError<I2C::Error>> {
        if buffer.is_empty() || buffer.len() > READ_SIZE_MAX {
            return Err(ErrorKind::BadParam.into());
        }

        let header = [CLA, INS_READ_BINARY];
        let offset = offset.to_be_bytes();
        let length = [buffer.len() as u8];
        let apdu: [&[u8]; 3] = [&header, &offset, &length];
        let data = self.exchange(&apdu, buffer.len())?;
        buffer.copy_from_slice(data);
        Ok(())
    }

    /// Selects the NDEF file and reads the whole message into `buffer`,
    /// returning its length.
    pub fn read_ndef(&mut self, buffer: &mut [u8]) -> Result<usize, TagError<I2C::Error>> {
        self.select_file(FileId::Ndef)?;

        let mut length = [0u8; NDEF_LENGTH_SIZE];
        self.read_binary(0x0000, &mut length)?;
        let length = usize::from(u16::from_be_bytes(length));
        debug!("m24sr: ndef message of {} bytes", length);

        let message = buffer.get_mut(..length).ok_or(ErrorKind::SmallBuffer)?;
        for (i, chunk) in message.chunks_mut(READ_SIZE_MAX).enumerate() {
            let offset = u16::try_from(NDEF_LENGTH_SIZE + i * READ_SIZE_MAX)
                .map_err(|_| ErrorKind::BadParam)?;
            self.read_binary(offset, chunk)?;
        }
        Ok(length)
    }

    /// Ends the I2C session so the RF side can take over.
    pub fn deselect(&mut self) -> Result<(), TagError<I2C::Error>> {
        debug!("m24sr: deselect");
        let mut frame = FrameBuilder::new(&mut self.buffer);
        frame.push(&[S_DESELECT])?;
        frame.seal()?;
        self.i2c
            .write(self.address, &self.buffer)
            .map_err(TagError::Bus)?;
        // The tag answers with an address-only read.
        self.i2c.read(self.address, &mut []).map_err(TagError::Bus)?;
        self.block = 0;
        Ok(())
    }

    /// Sends an I-block carrying `apdu` and reads back a response with
    /// `length` data bytes.
    fn exchange(&mut self, apdu: &[&[u8]], length: usize) -> Result<&[u8], TagError<I2C::Error>> {
        let pcb = I_BLOCK | self.block;
        let mut frame = FrameBuilder::new(&mut self.buffer);
        frame.push(&[pcb])?;
        for field in apdu {
            frame.push(field)?;
        }
        frame.seal()?;
        trace!("m24sr: command {:?}", self.buffer.as_slice());
        self.i2c
            .write(self.address, &self.buffer)
            .map_err(TagError::Bus)?;

        self.buffer.clear();
        self.buffer
            .resize(length + RSP_SIZE_MIN, 0)
            .map_err(|_| ErrorKind::SmallBuffer)?;
        self.i2c
            .read(self.address, &mut self.buffer)
            .map_err(TagError::Bus)?;
        trace!("m24sr: response {:?}", self.buffer.as_slice());

        let response = Response::new::<I2C::Error>(&self.buffer)?;
        if response.pcb() != pcb {
            warn!("m24sr: sent pcb {:#x}, tag answered {:#x}", pcb, response.pcb());
        }
        self.block ^= 1;
        Ok(response.data())
    }
}

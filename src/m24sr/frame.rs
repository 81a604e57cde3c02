use crate::error::{ErrorKind, TagError};
use core::mem::size_of;
use crc::{Algorithm, Crc};
use heapless::Vec;

// PCB (1 byte), status word (2 bytes), crc (2 bytes)
pub(crate) const RSP_SIZE_MIN: usize = 5;
// Largest READ BINARY payload the tag hands out in one frame.
pub(crate) const READ_SIZE_MAX: usize = 0xF6;
pub(crate) const FRAME_SIZE_MAX: usize = READ_SIZE_MAX + RSP_SIZE_MIN;

const SW_OK: u16 = 0x9000;

// ISO/IEC 14443-3 type A. The register preset 0x6363 appears reflected.
const CRC_A_ALG: Algorithm<u16> = Algorithm {
    width: 16,
    poly: 0x1021,
    init: 0xc6c6,
    refin: true,
    refout: true,
    xorout: 0x0000,
    check: 0xbf05,
    residue: 0x0000,
};

// CRC memoise table
pub const CRC_A: Crc<u16> = Crc::<u16>::new(&CRC_A_ALG);

pub(crate) type FrameBuffer = Vec<u8, FRAME_SIZE_MAX>;

/// Appends fields to a cleared frame buffer. `seal` closes the frame with its
/// CRC, low byte first.
#[derive(Debug)]
pub(crate) struct FrameBuilder<'a> {
    buffer: &'a mut FrameBuffer,
}

impl<'a> FrameBuilder<'a> {
    pub(crate) fn new(buffer: &'a mut FrameBuffer) -> Self {
        buffer.clear();
        Self { buffer }
    }

    pub(crate) fn push(&mut self, bytes: &[u8]) -> Result<&mut Self, ErrorKind> {
        self.buffer
            .extend_from_slice(bytes)
            .map_err(|_| ErrorKind::SmallBuffer)?;
        Ok(self)
    }

    pub(crate) fn seal(&mut self) -> Result<(), ErrorKind> {
        let crc = CRC_A.checksum(self.buffer.as_slice());
        self.push(crc.to_le_bytes().as_ref())?;
        Ok(())
    }
}

/// A validated `[PCB] [data] [SW1 SW2] [CRC]` frame from the tag.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Response<'a> {
    pcb: u8,
    data: &'a [u8],
}

impl<'a> Response<'a> {
    pub(crate) fn new<E>(buffer: &'a [u8]) -> Result<Self, TagError<E>> {
        match Self::parse(buffer) {
            // A refused command is answered with a bare status frame, the rest
            // of the read clocks in idle bytes.
            Err(TagError::Kind(ErrorKind::RxCrcError)) if buffer.len() > RSP_SIZE_MIN => {
                match Self::parse::<E>(&buffer[..RSP_SIZE_MIN]) {
                    Err(TagError::Status(sw)) => Err(TagError::Status(sw)),
                    _ => Err(ErrorKind::RxCrcError.into()),
                }
            }
            result => result,
        }
    }

    fn parse<E>(buffer: &'a [u8]) -> Result<Self, TagError<E>> {
        let [pcb, data @ .., sw1, sw2, crc0, crc1] = buffer else {
            return Err(ErrorKind::RxFail.into());
        };

        let payload = &buffer[..buffer.len() - size_of::<u16>()];
        if u16::from_le_bytes([*crc0, *crc1]) != CRC_A.checksum(payload) {
            return Err(ErrorKind::RxCrcError.into());
        }

        let sw = u16::from_be_bytes([*sw1, *sw2]);
        if sw != SW_OK {
            return Err(TagError::Status(sw));
        }

        Ok(Self { pcb: *pcb, data })
    }

    pub(crate) fn pcb(&self) -> u8 {
        self.pcb
    }

    pub(crate) fn data(&self) -> &'a [u8] {
        self.data
    }
}

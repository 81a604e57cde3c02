use super::error::Error;
use super::master::{Direction, I2cMaster};
use super::wire::Wire;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};

impl<W, D> ErrorType for I2cMaster<W, D> {
    type Error = Error;
}

/// Follows the `embedded-hal` transaction contract, independent of the
/// `auto_start`/`auto_stop` flags: START first, repeated START with a fresh
/// address byte whenever the direction changes, STOP at the end or after a
/// NACK.
impl<W, D> I2c<SevenBitAddress> for I2cMaster<W, D>
where
    W: Wire,
    D: DelayNs,
{
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if operations.is_empty() {
            return Ok(());
        }
        let result = self.run_operations(address, operations);
        self.stop();
        result
    }
}

impl<W, D> I2cMaster<W, D>
where
    W: Wire,
    D: DelayNs,
{
    fn run_operations(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Error> {
        let mut current: Option<Direction> = None;
        for i in 0..operations.len() {
            // Reads merge with following reads, so their last byte is ACKed
            // when more bytes are still to come.
            let read_follows = operations[i + 1..]
                .iter()
                .take_while(|op| matches!(op, Operation::Read(_)))
                .any(|op| matches!(op, Operation::Read(buffer) if !buffer.is_empty()));
            let direction = match operations[i] {
                Operation::Read(_) => Direction::Read,
                Operation::Write(_) => Direction::Write,
            };

            if current != Some(direction) {
                match current {
                    None => self.start(),
                    Some(_) => self.restart(),
                }
                self.send_address(address, direction)?;
                current = Some(direction);
            }

            match &mut operations[i] {
                Operation::Read(buffer) => self.receive_into(buffer, read_follows),
                Operation::Write(bytes) => {
                    for &byte in bytes.iter() {
                        self.transmit_byte(byte)?;
                    }
                }
            }
        }
        Ok(())
    }
}

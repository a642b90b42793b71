use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiBus};

/// Settle time between asserting chip-select and the first clock edge.
///
/// The original firmware used a short uncalibrated busy loop here; the exact
/// minimum is a datasheet figure, any short non-zero wait works in practice.
const CS_SETTLE_US: u32 = 1;

device_driver::create_device! {
  device_name: Device,
  dsl: {
    config {
      type RegisterAddressType = u8;
    }
    /// Raw X-position conversion (12-bit, differential).
    ///
    /// The "address" is the XPT2046 control byte that selects the channel.
    /// The conversion arrives left-justified across the two response bytes
    /// with 3 don't-care low bits, so the 12-bit result sits in bits 3..15
    /// of the big-endian pair.
    register Xpos {
      type Access = RO;
      type ByteOrder = BE;
      const ADDRESS = 0xD0;
      const SIZE_BITS = 16;

      value: uint = 3..15,
    },
    /// Raw Y-position conversion (12-bit, differential).
    register Ypos {
      type Access = RO;
      type ByteOrder = BE;
      const ADDRESS = 0x90;
      const SIZE_BITS = 16;

      value: uint = 3..15,
    },
    /// First pressure-plate conversion (the chip calls this Z1).
    ///
    /// Floats low when nothing touches the panel.
    register PressureA {
      type Access = RO;
      type ByteOrder = BE;
      const ADDRESS = 0xB0;
      const SIZE_BITS = 16;

      value: uint = 3..15,
    },
    /// Second pressure-plate conversion (the chip calls this Z2).
    ///
    /// Sits near full scale when nothing touches the panel.
    register PressureB {
      type Access = RO;
      type ByteOrder = BE;
      const ADDRESS = 0xC0;
      const SIZE_BITS = 16;

      value: uint = 3..15,
    },
  }
}

pub struct DeviceInterface<SPI, CS, DELAY> {
    spi: SPI,
    cs: CS,
    delay: DELAY,
}

impl<SPI, CS, DELAY> DeviceInterface<SPI, CS, DELAY> {
    pub(crate) const fn new(spi: SPI, cs: CS, delay: DELAY) -> Self {
        Self { spi, cs, delay }
    }
}

impl<SPI, CS, DELAY> device_driver::RegisterInterface for DeviceInterface<SPI, CS, DELAY>
where
    SPI: SpiBus,
    CS: OutputPin,
    DELAY: DelayNs,
{
    type Error = DeviceError<SPI::Error, CS::Error>;

    type AddressType = u8;

    fn write_register(
        &mut self,
        _address: Self::AddressType,
        _size_bits: u32,
        _data: &[u8],
    ) -> Result<(), Self::Error> {
        // Every channel on this chip is read-only, so nothing dispatches here.
        Ok(())
    }

    fn read_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        data: &mut [u8],
    ) -> Result<(), Self::Error> {
        let tx = [address, 0x00, 0x00];
        let mut rx = [0u8; 3];

        self.cs.set_low().map_err(DeviceError::Pin)?;
        self.delay.delay_us(CS_SETTLE_US);
        // SpiBus operations may return while the words are still buffered;
        // the frame has to be flushed onto the wire before the chip is
        // deselected, or the conversion is cut short.
        let transferred = self
            .spi
            .transfer(&mut rx, &tx)
            .and_then(|_| self.spi.flush())
            .map_err(DeviceError::Spi);
        // Deselect even when the transfer failed, the chip must not be left
        // holding the bus.
        self.cs.set_high().map_err(DeviceError::Pin)?;
        transferred?;

        // Byte 0 arrives while the command is still shifting out.
        data.copy_from_slice(&rx[1..]);
        Ok(())
    }
}

/// Low level interface error wrapping the SPI bus error or the chip-select
/// pin error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum DeviceError<SpiE, PinE> {
    /// The full-duplex transfer failed.
    Spi(SpiE),
    /// Driving the chip-select line failed.
    Pin(PinE),
}

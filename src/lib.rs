#![cfg_attr(not(test), no_std)]

use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiBus};

mod device;
use device::{Device, DeviceInterface};
pub use device::DeviceError;

/// Raw pressure reading a touch must exceed to count as pressed.
const MIN_PRESSURE: u16 = 100;

/// Full scale of the 12-bit ADC.
const ADC_MAX: u16 = 4095;

/// Number of X/Y conversions averaged per touch sample.
const AVG_SAMPLES: u32 = 4;

/// One averaged touch reading.
///
/// Coordinates are raw ADC counts, not display pixels. Mapping them onto a
/// screen is left to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct TouchSample {
    pub x: u16,
    pub y: u16,
    /// Raw Z1 pressure reading.
    pub z: u16,
    pub pressed: bool,
}

/// Driver for the XPT2046 resistive touch-screen controller.
///
/// The chip shares the SPI bus with other devices, so the driver owns the
/// chip-select pin and frames every 3-byte transaction with it. Construction
/// drives the pin high (deselected).
pub struct Xpt2046<SPI, CS, DELAY> {
    device: Device<DeviceInterface<SPI, CS, DELAY>>,
}

impl<SPI, CS, DELAY> Xpt2046<SPI, CS, DELAY>
where
    SPI: SpiBus,
    CS: OutputPin,
    DELAY: DelayNs,
{
    pub fn new(spi: SPI, mut cs: CS, delay: DELAY) -> Self {
        // The pin can arrive in any state; the chip must start deselected.
        // A pin fault this early has nowhere to surface and the next
        // transaction reports it anyway.
        let _ = cs.set_high();
        Self {
            device: Device::new(DeviceInterface::new(spi, cs, delay)),
        }
    }

    /// Primes the controller with one discarded X conversion.
    ///
    /// The select line ends up high (deselected) before this returns.
    pub fn init(&mut self) -> Result<(), DeviceError<SPI::Error, CS::Error>> {
        self.device.xpos().read()?;
        Ok(())
    }

    /// Reads the raw X position. Always within 0..=4095.
    pub fn read_x(&mut self) -> Result<u16, DeviceError<SPI::Error, CS::Error>> {
        Ok(self.device.xpos().read()?.value())
    }

    /// Reads the raw Y position. Always within 0..=4095.
    pub fn read_y(&mut self) -> Result<u16, DeviceError<SPI::Error, CS::Error>> {
        Ok(self.device.ypos().read()?.value())
    }

    /// Reads the raw Z1 pressure channel.
    pub fn read_z1(&mut self) -> Result<u16, DeviceError<SPI::Error, CS::Error>> {
        Ok(self.device.pressure_a().read()?.value())
    }

    /// Reads the raw Z2 pressure channel.
    pub fn read_z2(&mut self) -> Result<u16, DeviceError<SPI::Error, CS::Error>> {
        Ok(self.device.pressure_b().read()?.value())
    }

    /// Checks both pressure plates for a touch.
    ///
    /// Z1 must rise above the threshold and Z2 must drop away from full
    /// scale, which rejects a floating line as well as a shorted one.
    pub fn is_touched(&mut self) -> Result<bool, DeviceError<SPI::Error, CS::Error>> {
        let z1 = self.read_z1()?;
        let z2 = self.read_z2()?;
        Ok(z1 > MIN_PRESSURE && z2 < ADC_MAX - MIN_PRESSURE)
    }

    /// Reads a touch sample, averaging 4 conversions per axis.
    ///
    /// When the pressure reading is below the threshold no X/Y conversions
    /// are made and the sample comes back with `pressed` false and zeroed
    /// coordinates.
    pub fn read_touch(&mut self) -> Result<TouchSample, DeviceError<SPI::Error, CS::Error>> {
        let z = self.read_z1()?;

        if z < MIN_PRESSURE {
            return Ok(TouchSample {
                x: 0,
                y: 0,
                z,
                pressed: false,
            });
        }

        let mut x_sum: u32 = 0;
        let mut y_sum: u32 = 0;
        for _ in 0..AVG_SAMPLES {
            x_sum += u32::from(self.read_x()?);
            y_sum += u32::from(self.read_y()?);
        }

        Ok(TouchSample {
            x: (x_sum / AVG_SAMPLES) as u16,
            y: (y_sum / AVG_SAMPLES) as u16,
            z,
            pressed: true,
        })
    }
}

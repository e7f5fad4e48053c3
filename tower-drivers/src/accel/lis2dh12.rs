//! ST LIS2DH12 accelerometer
//!
//! Runs in low-power 8-bit mode at 10 Hz, full scale ±2 g. The alarm uses
//! the INT1 "high event on any axis" detector behind the high-pass filter,
//! so gravity does not trigger it and only a change in motion does. The
//! interrupt is latched until INT1_SRC is read.

use embedded_hal::i2c::I2c;

use tower_core::traits::AccelAlarm;

/// SA0 pulled high
pub const DEFAULT_ADDRESS: u8 = 0x19;

const WHO_AM_I_VALUE: u8 = 0x33;

/// Register addresses
#[allow(dead_code)]
mod reg {
    pub const WHO_AM_I: u8 = 0x0F;
    pub const CTRL_REG1: u8 = 0x20;
    pub const CTRL_REG2: u8 = 0x21;
    pub const CTRL_REG3: u8 = 0x22;
    pub const CTRL_REG4: u8 = 0x23;
    pub const CTRL_REG5: u8 = 0x24;
    pub const REFERENCE: u8 = 0x26;
    pub const OUT_X_L: u8 = 0x28;
    pub const INT1_CFG: u8 = 0x30;
    pub const INT1_SRC: u8 = 0x31;
    pub const INT1_THS: u8 = 0x32;
    pub const INT1_DURATION: u8 = 0x33;

    /// Register address auto-increment for multi-byte reads
    pub const AUTO_INCREMENT: u8 = 0x80;
}

/// 10 Hz, low-power mode, X/Y/Z enabled
const CTRL_REG1_LP_10HZ: u8 = 0x2F;
/// High-pass filter on the INT1 detector
const CTRL_REG2_HPIS1: u8 = 0x01;
/// Route IA1 to the INT1 pin
const CTRL_REG3_I1_IA1: u8 = 0x40;
/// Latch INT1 until INT1_SRC is read
const CTRL_REG5_LIR_INT1: u8 = 0x08;
/// OR of the X, Y and Z high events
const INT1_CFG_XYZ_HIGH: u8 = 0x2A;
/// Interrupt active flag in INT1_SRC
const INT1_SRC_IA: u8 = 0x40;

/// Threshold LSB at ±2 g
const THRESHOLD_MG_PER_LSB: u16 = 16;
/// Duration LSB at 10 Hz
const DURATION_MS_PER_LSB: u16 = 100;
/// Output LSB in 8-bit mode at ±2 g
const OUTPUT_MG_PER_LSB: i16 = 16;

/// Accelerometer error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelError<E> {
    /// Bus error
    I2c(E),
    /// WHO_AM_I did not match
    WrongDevice(u8),
}

/// One acceleration sample in milli-g
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Acceleration {
    pub x_mg: i16,
    pub y_mg: i16,
    pub z_mg: i16,
}

/// LIS2DH12 driver
pub struct Lis2dh12<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Lis2dh12<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Check that a LIS2DH12 answers on the bus
    pub fn probe(&mut self) -> Result<(), AccelError<I2C::Error>> {
        let id = self.read_register(reg::WHO_AM_I)?;
        if id != WHO_AM_I_VALUE {
            return Err(AccelError::WrongDevice(id));
        }
        Ok(())
    }

    /// Probe and start measuring
    pub fn init(&mut self) -> Result<(), AccelError<I2C::Error>> {
        self.probe()?;
        self.write_register(reg::CTRL_REG4, 0x00)?;
        self.write_register(reg::CTRL_REG1, CTRL_REG1_LP_10HZ)?;
        Ok(())
    }

    /// Read the latest sample
    pub fn read(&mut self) -> Result<Acceleration, AccelError<I2C::Error>> {
        let mut raw = [0u8; 6];
        self.i2c
            .write_read(
                self.address,
                &[reg::OUT_X_L | reg::AUTO_INCREMENT],
                &mut raw,
            )
            .map_err(AccelError::I2c)?;

        // 8-bit data is left justified in each 16-bit register pair
        let axis = |lo: u8, hi: u8| (i16::from_le_bytes([lo, hi]) >> 8) * OUTPUT_MG_PER_LSB;
        Ok(Acceleration {
            x_mg: axis(raw[0], raw[1]),
            y_mg: axis(raw[2], raw[3]),
            z_mg: axis(raw[4], raw[5]),
        })
    }

    /// Arm the motion alarm on INT1
    pub fn enable_alarm(&mut self, alarm: AccelAlarm) -> Result<(), AccelError<I2C::Error>> {
        self.write_register(reg::CTRL_REG2, CTRL_REG2_HPIS1)?;
        self.write_register(reg::CTRL_REG3, CTRL_REG3_I1_IA1)?;
        self.write_register(reg::CTRL_REG5, CTRL_REG5_LIR_INT1)?;
        self.write_register(reg::INT1_THS, threshold_register(alarm.threshold_mg))?;
        self.write_register(reg::INT1_DURATION, duration_register(alarm.duration_ms))?;
        self.write_register(reg::INT1_CFG, INT1_CFG_XYZ_HIGH)?;

        // Settle the high-pass filter on the current orientation, then drop
        // anything latched while reconfiguring
        self.read_register(reg::REFERENCE)?;
        self.clear_interrupt()?;
        Ok(())
    }

    /// Stop the motion alarm
    pub fn disable_alarm(&mut self) -> Result<(), AccelError<I2C::Error>> {
        self.write_register(reg::INT1_CFG, 0x00)?;
        self.write_register(reg::CTRL_REG3, 0x00)?;
        self.clear_interrupt()?;
        Ok(())
    }

    /// Read and release the latched interrupt
    ///
    /// Returns true if the alarm had fired.
    pub fn clear_interrupt(&mut self) -> Result<bool, AccelError<I2C::Error>> {
        let src = self.read_register(reg::INT1_SRC)?;
        Ok(src & INT1_SRC_IA != 0)
    }

    /// Release the bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn read_register(&mut self, register: u8) -> Result<u8, AccelError<I2C::Error>> {
        let mut value = [0u8];
        self.i2c
            .write_read(self.address, &[register], &mut value)
            .map_err(AccelError::I2c)?;
        Ok(value[0])
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), AccelError<I2C::Error>> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(AccelError::I2c)
    }
}

/// INT1_THS value for a threshold in mg, at least one LSB
fn threshold_register(threshold_mg: u16) -> u8 {
    (threshold_mg / THRESHOLD_MG_PER_LSB).clamp(1, 0x7F) as u8
}

/// INT1_DURATION value for a duration in ms
fn duration_register(duration_ms: u16) -> u8 {
    (duration_ms / DURATION_MS_PER_LSB).min(0x7F) as u8
}

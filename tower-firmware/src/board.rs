//! Core module + LCD module pin map and peripheral setup
//!
//! | Function            | Pin        | Peripheral         |
//! |---------------------|------------|--------------------|
//! | LCD SCK / MOSI      | PB13/PB15  | SPI2 (tx only)     |
//! | LCD chip select     | PB12       | GPIO, active high  |
//! | LCD red LED         | PB4        | GPIO               |
//! | Core module LED     | PH1        | GPIO               |
//! | Left / right button | PA4 / PA5  | EXTI4 / EXTI5      |
//! | Accel SCL / SDA     | PB10/PB11  | I2C2               |
//! | Accel INT1          | PB6        | EXTI6              |
//! | Battery sense       | PA0        | ADC_IN0            |
//! | Gateway TX / RX     | PA2 / PA3  | USART2             |

use embassy_stm32::adc::{self, Adc, AdcChannel, AnyAdcChannel, Vref};
use embassy_stm32::exti::{self, ExtiInput};
use embassy_stm32::gpio::{Level, Output, Pull, Speed};
use embassy_stm32::i2c::{self, I2c};
use embassy_stm32::mode::Blocking;
use embassy_stm32::peripherals::{ADC1, USART2};
use embassy_stm32::spi::{self, Spi};
use embassy_stm32::time::Hertz;
use embassy_stm32::usart::{self, BufferedUart};
use embassy_stm32::{bind_interrupts, Peripherals};
use static_cell::StaticCell;

use tower_drivers::accel::{Lis2dh12, DEFAULT_ADDRESS};
use tower_drivers::lcd::{Canvas, Ls013b7dh03};
use tower_drivers::led::PatternLed;

bind_interrupts!(pub struct Irqs {
    USART2 => usart::BufferedInterruptHandler<USART2>;
    ADC1_COMP => adc::InterruptHandler<ADC1>;
    EXTI4_15 => exti::InterruptHandler<embassy_stm32::interrupt::typelevel::EXTI4_15>;
});

/// Gateway link baud rate
const GATEWAY_BAUD: u32 = 115_200;

/// Sharp panels accept up to 1 MHz
const LCD_SPI_HZ: u32 = 1_000_000;

// Static cells for UART buffers (must live forever)
static UART_TX_BUF: StaticCell<[u8; 128]> = StaticCell::new();
static UART_RX_BUF: StaticCell<[u8; 128]> = StaticCell::new();

pub type Display = Canvas<Ls013b7dh03<Spi<'static, Blocking>, Output<'static>>>;
pub type Accel = Lis2dh12<I2c<'static, Blocking, i2c::Master>>;
pub type BoardLed = PatternLed<Output<'static>>;

/// Everything the tasks need, built from the raw peripherals
pub struct Board {
    pub display: Display,
    pub led: BoardLed,
    pub lcd_led: BoardLed,
    pub left: ExtiInput<'static>,
    pub right: ExtiInput<'static>,
    pub accel: Accel,
    pub accel_int: ExtiInput<'static>,
    pub adc: Adc<'static, ADC1>,
    pub vref: Vref,
    pub battery_sense: AnyAdcChannel<ADC1>,
    pub gateway: BufferedUart<'static>,
}

impl Board {
    pub fn init(p: Peripherals) -> Result<Self, usart::ConfigError> {
        // LCD on SPI2, MSB first, mode 0
        let mut spi_config = spi::Config::default();
        spi_config.frequency = Hertz(LCD_SPI_HZ);
        let spi = Spi::new_blocking_txonly(p.SPI2, p.PB13, p.PB15, spi_config);
        let lcd_cs = Output::new(p.PB12, Level::Low, Speed::Low);
        let display = Canvas::new(Ls013b7dh03::new(spi, lcd_cs));

        let led = PatternLed::new(Output::new(p.PH1, Level::Low, Speed::Low), false);
        let lcd_led = PatternLed::new(Output::new(p.PB4, Level::Low, Speed::Low), false);

        // Buttons pull to ground
        let left = ExtiInput::new(p.PA4, p.EXTI4, Pull::Up, Irqs);
        let right = ExtiInput::new(p.PA5, p.EXTI5, Pull::Up, Irqs);

        let i2c = I2c::new_blocking(p.I2C2, p.PB10, p.PB11, i2c::Config::default());
        let accel = Lis2dh12::new(i2c, DEFAULT_ADDRESS);
        let accel_int = ExtiInput::new(p.PB6, p.EXTI6, Pull::None, Irqs);

        let adc = Adc::new(p.ADC1, Irqs);
        let vref = adc.enable_vref();
        let battery_sense = p.PA0.degrade_adc();

        let mut uart_config = usart::Config::default();
        uart_config.baudrate = GATEWAY_BAUD;
        let gateway = BufferedUart::new(
            p.USART2,
            p.PA3, // RX
            p.PA2, // TX
            UART_TX_BUF.init([0; 128]),
            UART_RX_BUF.init([0; 128]),
            Irqs,
            uart_config,
        )?;

        Ok(Self {
            display,
            led,
            lcd_led,
            left,
            right,
            accel,
            accel_int,
            adc,
            vref,
            battery_sense,
            gateway,
        })
    }
}

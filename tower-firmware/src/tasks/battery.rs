//! Battery measurement task
//!
//! Samples the battery divider and the internal reference at the configured
//! interval and posts the gauge events.

use defmt::*;
use embassy_stm32::adc::{Adc, AnyAdcChannel, Vref};
use embassy_stm32::peripherals::ADC1;
use embassy_time::{Duration, Ticker};

use tower_core::app::AppEvent;
use tower_drivers::battery::BatteryGauge;

use crate::channels::post;

/// Battery task - first measurement right after boot
#[embassy_executor::task]
pub async fn battery_task(
    mut adc: Adc<'static, ADC1>,
    mut vref: Vref,
    mut sense: AnyAdcChannel<ADC1>,
    mut gauge: BatteryGauge,
    interval_ms: u32,
) {
    let profile = gauge.profile();
    info!(
        "Battery task started, interval {} ms, low {} V, critical {} V",
        interval_ms, profile.low_v, profile.critical_v
    );

    let mut ticker = Ticker::every(Duration::from_millis(interval_ms as u64));

    loop {
        let vref_counts = adc.read(&mut vref).await;
        let counts = adc.read(&mut sense).await;
        let voltage = gauge.voltage_from_counts(counts, vref_counts);

        match voltage {
            Some(v) => debug!("Battery: {} V ({} / vref {})", v, counts, vref_counts),
            None => warn!("Battery: unusable reference reading"),
        }

        for event in gauge.measure(voltage) {
            post(AppEvent::Battery(event, gauge.voltage()));
        }

        ticker.next().await;
    }
}

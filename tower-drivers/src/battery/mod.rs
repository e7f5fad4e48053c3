//! Battery gauge
//!
//! Converts ADC readings of the battery divider into a pack voltage and
//! turns a series of measurements into [`BatteryEvent`]s. Supply voltage
//! follows the battery on this board, so every reading is paired with a
//! reading of the internal reference to recover VDDA.

use heapless::Vec;

use tower_core::config::BatteryPack;
use tower_core::traits::BatteryEvent;

/// Full-scale count of the 12-bit ADC
const ADC_FULL_SCALE: f32 = 4095.0;

/// Typical internal reference voltage
const VREFINT_V: f32 = 1.224;

/// Voltage a level must recover by before it is reported again
const REARM_HYSTERESIS_V: f32 = 0.1;

/// Electrical profile of a battery pack
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PackProfile {
    /// Pack voltage per volt at the ADC pin
    pub divider_ratio: f32,
    pub low_v: f32,
    pub critical_v: f32,
    /// Voltage reported as 0 %
    pub empty_v: f32,
    /// Voltage reported as 100 %
    pub full_v: f32,
}

impl PackProfile {
    pub const fn for_pack(pack: BatteryPack) -> Self {
        match pack {
            // 2x AAA through a 10k/5k divider
            BatteryPack::Mini => Self {
                divider_ratio: 3.0,
                low_v: 2.5,
                critical_v: 2.3,
                empty_v: 2.0,
                full_v: 3.0,
            },
            // 4x AAA through a 0.13 divider
            BatteryPack::Standard => Self {
                divider_ratio: 1.0 / 0.13,
                low_v: 5.0,
                critical_v: 4.6,
                empty_v: 4.0,
                full_v: 6.0,
            },
        }
    }
}

/// Events from a single measurement
pub type GaugeEvents = Vec<BatteryEvent, 2>;

/// Battery gauge with once-per-crossing level reporting
#[derive(Debug, Clone)]
pub struct BatteryGauge {
    profile: PackProfile,
    low_reported: bool,
    critical_reported: bool,
    voltage: Option<f32>,
}

impl BatteryGauge {
    pub fn new(pack: BatteryPack) -> Self {
        Self::with_profile(PackProfile::for_pack(pack))
    }

    pub fn with_profile(profile: PackProfile) -> Self {
        Self {
            profile,
            low_reported: false,
            critical_reported: false,
            voltage: None,
        }
    }

    pub fn profile(&self) -> &PackProfile {
        &self.profile
    }

    /// Last good measurement
    pub fn voltage(&self) -> Option<f32> {
        self.voltage
    }

    /// Pack voltage from a divider reading and an internal reference reading
    ///
    /// Returns `None` if the reference reading is unusable.
    pub fn voltage_from_counts(&self, counts: u16, vrefint_counts: u16) -> Option<f32> {
        if vrefint_counts == 0 {
            return None;
        }
        let vdda = VREFINT_V * ADC_FULL_SCALE / vrefint_counts as f32;
        let pin = counts as f32 * vdda / ADC_FULL_SCALE;
        Some(pin * self.profile.divider_ratio)
    }

    /// Feed one measurement, `None` if it failed
    ///
    /// Always yields `Update` (or `Error`), followed by `LevelCritical` or
    /// `LevelLow` the first time the voltage falls below that threshold.
    /// A level is reported again only after the voltage has recovered
    /// 0.1 V above its threshold.
    pub fn measure(&mut self, voltage: Option<f32>) -> GaugeEvents {
        let mut events = GaugeEvents::new();

        let Some(v) = voltage else {
            self.voltage = None;
            let _ = events.push(BatteryEvent::Error);
            return events;
        };

        self.voltage = Some(v);
        let _ = events.push(BatteryEvent::Update);

        let p = self.profile;
        if v >= p.critical_v + REARM_HYSTERESIS_V {
            self.critical_reported = false;
        }
        if v >= p.low_v + REARM_HYSTERESIS_V {
            self.low_reported = false;
        }

        if v < p.critical_v {
            if !self.critical_reported {
                self.critical_reported = true;
                self.low_reported = true;
                let _ = events.push(BatteryEvent::LevelCritical);
            }
        } else if v < p.low_v && !self.low_reported {
            self.low_reported = true;
            let _ = events.push(BatteryEvent::LevelLow);
        }

        events
    }

    /// Rough charge estimate, linear between empty and full
    pub fn percent(&self, voltage: f32) -> u8 {
        let p = &self.profile;
        let span = p.full_v - p.empty_v;
        if span <= 0.0 {
            return 0;
        }
        let fraction = ((voltage - p.empty_v) / span).clamp(0.0, 1.0);
        (fraction * 100.0 + 0.5) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gauge() -> BatteryGauge {
        BatteryGauge::new(BatteryPack::Mini)
    }

    fn events(gauge: &mut BatteryGauge, v: f32) -> std::vec::Vec<BatteryEvent> {
        gauge.measure(Some(v)).into_iter().collect()
    }

    #[test]
    fn test_good_battery_only_updates() {
        let mut gauge = gauge();
        assert_eq!(events(&mut gauge, 2.9), vec![BatteryEvent::Update]);
        assert_eq!(gauge.voltage(), Some(2.9));
    }

    #[test]
    fn test_low_reported_once() {
        let mut gauge = gauge();
        assert_eq!(
            events(&mut gauge, 2.45),
            vec![BatteryEvent::Update, BatteryEvent::LevelLow]
        );
        assert_eq!(events(&mut gauge, 2.44), vec![BatteryEvent::Update]);
    }

    #[test]
    fn test_critical_after_low() {
        let mut gauge = gauge();
        events(&mut gauge, 2.45);
        assert_eq!(
            events(&mut gauge, 2.2),
            vec![BatteryEvent::Update, BatteryEvent::LevelCritical]
        );
        assert_eq!(events(&mut gauge, 2.1), vec![BatteryEvent::Update]);
    }

    #[test]
    fn test_straight_to_critical_skips_low() {
        let mut gauge = gauge();
        assert_eq!(
            events(&mut gauge, 2.2),
            vec![BatteryEvent::Update, BatteryEvent::LevelCritical]
        );
        // Recovering into the low band does not report low again
        assert_eq!(events(&mut gauge, 2.45), vec![BatteryEvent::Update]);
    }

    #[test]
    fn test_rearm_needs_hysteresis() {
        let mut gauge = gauge();
        events(&mut gauge, 2.45);

        // Just above the threshold is not enough to re-arm
        events(&mut gauge, 2.55);
        assert_eq!(events(&mut gauge, 2.45), vec![BatteryEvent::Update]);

        // Recovered past the hysteresis band
        events(&mut gauge, 2.65);
        assert_eq!(
            events(&mut gauge, 2.45),
            vec![BatteryEvent::Update, BatteryEvent::LevelLow]
        );
    }

    #[test]
    fn test_failed_measurement() {
        let mut gauge = gauge();
        events(&mut gauge, 2.9);
        let ev: std::vec::Vec<_> = gauge.measure(None).into_iter().collect();
        assert_eq!(ev, vec![BatteryEvent::Error]);
        assert_eq!(gauge.voltage(), None);
    }

    #[test]
    fn test_pack_selects_profile() {
        assert_eq!(
            gauge().profile(),
            &PackProfile::for_pack(BatteryPack::Mini)
        );
        let standard = BatteryGauge::new(BatteryPack::Standard);
        assert!(standard.profile().low_v > gauge().profile().low_v);
        assert!(standard.profile().critical_v < standard.profile().low_v);
    }

    #[test]
    fn test_standard_pack_thresholds() {
        let mut gauge = BatteryGauge::new(BatteryPack::Standard);
        assert_eq!(events(&mut gauge, 5.5), vec![BatteryEvent::Update]);
        assert_eq!(
            events(&mut gauge, 4.8),
            vec![BatteryEvent::Update, BatteryEvent::LevelLow]
        );
        assert_eq!(
            events(&mut gauge, 4.5),
            vec![BatteryEvent::Update, BatteryEvent::LevelCritical]
        );
    }

    #[test]
    fn test_voltage_from_counts() {
        let gauge = gauge();
        // VDDA = 3.0 V when the reference reads 1.224 / 3.0 of full scale
        let vref = (1.224 / 3.0 * 4095.0) as u16;
        let v = gauge.voltage_from_counts(3276, vref).unwrap();
        // 3276 counts at 3.0 V is 2.4 V at the pin, 7.2 V before the divider
        assert!((v - 7.2).abs() < 0.02, "got {}", v);

        assert_eq!(gauge.voltage_from_counts(1000, 0), None);
    }

    #[test]
    fn test_percent() {
        let gauge = gauge();
        assert_eq!(gauge.percent(3.3), 100);
        assert_eq!(gauge.percent(2.5), 50);
        assert_eq!(gauge.percent(1.5), 0);
    }

    proptest! {
        #[test]
        fn percent_never_exceeds_100(v in -10.0f32..20.0) {
            prop_assert!(gauge().percent(v) <= 100);
        }

        #[test]
        fn every_measurement_starts_with_update(values in proptest::collection::vec(0.0f32..4.0, 1..20)) {
            let mut gauge = gauge();
            for v in values {
                let ev = gauge.measure(Some(v));
                prop_assert_eq!(ev[0], BatteryEvent::Update);
                prop_assert!(ev.len() <= 2);
            }
        }
    }
}

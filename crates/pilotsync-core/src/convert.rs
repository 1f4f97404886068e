// ── Unit and clock converters ──
//
// Pure functions turning raw metric readings and 24-hour times into
// display values. Factors follow the NIST approximate conversions.

use std::fmt;

// ── Raw conversions ──────────────────────────────────────────────────

pub fn kilometers_to_miles(kilometers: f64) -> f64 {
    kilometers * 0.621_371_2
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * (9.0 / 5.0) + 32.0
}

pub fn liters_to_gallons(liters: f64) -> f64 {
    liters / 3.79
}

pub fn grams_to_ounces(grams: f64) -> f64 {
    grams / 28.35
}

pub fn kilograms_to_pounds(kilograms: f64) -> f64 {
    kilograms / 0.45
}

// ── Unit system ──────────────────────────────────────────────────────

/// Which unit family readings are displayed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum UnitSystem {
    Metric,
    #[default]
    Imperial,
}

/// Display unit attached to a [`Measurement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
pub enum Unit {
    #[strum(serialize = "km")]
    Kilometers,
    #[strum(serialize = "mi")]
    Miles,
    #[strum(serialize = "km/h")]
    KilometersPerHour,
    #[strum(serialize = "mph")]
    MilesPerHour,
    #[strum(serialize = "L")]
    Liters,
    #[strum(serialize = "gal")]
    Gallons,
    #[strum(serialize = "g")]
    Grams,
    #[strum(serialize = "oz")]
    Ounces,
    #[strum(serialize = "kg")]
    Kilograms,
    #[strum(serialize = "lb")]
    Pounds,
    #[strum(serialize = "°C")]
    Celsius,
    #[strum(serialize = "°F")]
    Fahrenheit,
}

/// A value paired with the unit it is expressed in.
///
/// `Display` honors precision: `format!("{:.1}", m)` gives `"62.1 mi"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub value: f64,
    pub unit: Unit,
}

impl Measurement {
    pub const fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(precision) => write!(f, "{:.*} {}", precision, self.value, self.unit),
            None => write!(f, "{} {}", self.value, self.unit),
        }
    }
}

impl UnitSystem {
    /// Map the settings flag (`metricUnits`) to a unit system.
    pub const fn from_metric_flag(metric: bool) -> Self {
        if metric { Self::Metric } else { Self::Imperial }
    }

    pub fn distance(self, kilometers: f64) -> Measurement {
        match self {
            Self::Metric => Measurement::new(kilometers, Unit::Kilometers),
            Self::Imperial => Measurement::new(kilometers_to_miles(kilometers), Unit::Miles),
        }
    }

    pub fn speed(self, kilometers_per_hour: f64) -> Measurement {
        match self {
            Self::Metric => Measurement::new(kilometers_per_hour, Unit::KilometersPerHour),
            Self::Imperial => Measurement::new(
                kilometers_to_miles(kilometers_per_hour),
                Unit::MilesPerHour,
            ),
        }
    }

    pub fn volume(self, liters: f64) -> Measurement {
        match self {
            Self::Metric => Measurement::new(liters, Unit::Liters),
            Self::Imperial => Measurement::new(liters_to_gallons(liters), Unit::Gallons),
        }
    }

    /// Small masses: grams or ounces.
    pub fn mass_grams(self, grams: f64) -> Measurement {
        match self {
            Self::Metric => Measurement::new(grams, Unit::Grams),
            Self::Imperial => Measurement::new(grams_to_ounces(grams), Unit::Ounces),
        }
    }

    /// Large masses: kilograms or pounds.
    pub fn mass_kilograms(self, kilograms: f64) -> Measurement {
        match self {
            Self::Metric => Measurement::new(kilograms, Unit::Kilograms),
            Self::Imperial => Measurement::new(kilograms_to_pounds(kilograms), Unit::Pounds),
        }
    }

    pub fn temperature(self, celsius: f64) -> Measurement {
        match self {
            Self::Metric => Measurement::new(celsius, Unit::Celsius),
            Self::Imperial => Measurement::new(celsius_to_fahrenheit(celsius), Unit::Fahrenheit),
        }
    }
}

// ── Clock ────────────────────────────────────────────────────────────

/// 12-hour or 24-hour clock display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display)]
pub enum ClockFormat {
    #[default]
    #[strum(serialize = "12h")]
    TwelveHour,
    #[strum(serialize = "24h")]
    TwentyFourHour,
}

impl ClockFormat {
    /// Map the settings flag (`tfHourTime`) to a clock format.
    pub const fn from_24h_flag(twenty_four_hour: bool) -> Self {
        if twenty_four_hour {
            Self::TwentyFourHour
        } else {
            Self::TwelveHour
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Meridiem {
    #[strum(serialize = "AM")]
    Am,
    #[strum(serialize = "PM")]
    Pm,
}

/// A formatted time of day, split so views can style the parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: String,
    pub minute: String,
    /// Present only in 12-hour mode.
    pub meridiem: Option<Meridiem>,
}

impl ClockTime {
    /// `"h:mm"` without the meridiem.
    pub fn digits(&self) -> String {
        format!("{}:{}", self.hour, self.minute)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hour, self.minute)?;
        if let Some(meridiem) = self.meridiem {
            write!(f, " {meridiem}")?;
        }
        Ok(())
    }
}

/// Format a 24-hour time of day.
///
/// Hour 0 is 12 AM and hour 12 is 12 PM. Hours are zero-padded only in
/// 24-hour mode; minutes always are. Out-of-range input wraps.
pub fn format_clock(hour: u32, minute: u32, format: ClockFormat) -> ClockTime {
    let hour = hour % 24;
    let minute = format!("{:02}", minute % 60);

    match format {
        ClockFormat::TwentyFourHour => ClockTime {
            hour: format!("{hour:02}"),
            minute,
            meridiem: None,
        },
        ClockFormat::TwelveHour => {
            let (display, meridiem) = match hour {
                0 => (12, Meridiem::Am),
                1..=11 => (hour, Meridiem::Am),
                12 => (12, Meridiem::Pm),
                _ => (hour - 12, Meridiem::Pm),
            };
            ClockTime {
                hour: display.to_string(),
                minute,
                meridiem: Some(meridiem),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn unit_conversions() {
        assert!(close(kilometers_to_miles(100.0), 62.137));
        assert!(close(celsius_to_fahrenheit(0.0), 32.0));
        assert!(close(celsius_to_fahrenheit(100.0), 212.0));
        assert!(close(liters_to_gallons(3.79), 1.0));
        assert!(close(grams_to_ounces(28.35), 1.0));
        assert!(close(kilograms_to_pounds(0.45), 1.0));
    }

    #[test]
    fn unit_system_picks_display_unit() {
        assert_eq!(UnitSystem::from_metric_flag(true), UnitSystem::Metric);
        assert_eq!(
            UnitSystem::Metric.speed(88.0),
            Measurement::new(88.0, Unit::KilometersPerHour)
        );

        let mph = UnitSystem::Imperial.speed(100.0);
        assert_eq!(mph.unit, Unit::MilesPerHour);
        assert_eq!(format!("{mph:.1}"), "62.1 mph");

        assert_eq!(UnitSystem::Imperial.temperature(0.0).to_string(), "32 °F");
        assert_eq!(UnitSystem::Metric.volume(40.0).to_string(), "40 L");
    }

    #[test]
    fn midnight_is_twelve_am() {
        let time = format_clock(0, 5, ClockFormat::TwelveHour);
        assert_eq!(time.digits(), "12:05");
        assert_eq!(time.meridiem, Some(Meridiem::Am));
        assert_eq!(time.to_string(), "12:05 AM");
    }

    #[test]
    fn afternoon_drops_twelve() {
        let time = format_clock(13, 0, ClockFormat::TwelveHour);
        assert_eq!(time.digits(), "1:00");
        assert_eq!(time.meridiem, Some(Meridiem::Pm));
    }

    #[test]
    fn noon_is_twelve_pm() {
        let time = format_clock(12, 30, ClockFormat::TwelveHour);
        assert_eq!(time.to_string(), "12:30 PM");
        assert_eq!(format_clock(11, 59, ClockFormat::TwelveHour).to_string(), "11:59 AM");
    }

    #[test]
    fn twenty_four_hour_is_zero_padded() {
        let time = format_clock(9, 3, ClockFormat::TwentyFourHour);
        assert_eq!(time.to_string(), "09:03");
        assert_eq!(time.meridiem, None);
        assert_eq!(format_clock(0, 0, ClockFormat::TwentyFourHour).to_string(), "00:00");
        assert_eq!(format_clock(23, 59, ClockFormat::TwentyFourHour).to_string(), "23:59");
    }

    #[test]
    fn every_hour_has_a_twelve_hour_rendering() {
        for hour in 0..24 {
            let time = format_clock(hour, 0, ClockFormat::TwelveHour);
            let shown: u32 = time.hour.parse().unwrap_or(0);
            assert!((1..=12).contains(&shown), "hour {hour} -> {time}");
            assert_eq!(time.meridiem == Some(Meridiem::Pm), hour >= 12);
        }
    }

    #[test]
    fn out_of_range_input_wraps() {
        assert_eq!(format_clock(24, 60, ClockFormat::TwentyFourHour).to_string(), "00:00");
        assert_eq!(format_clock(37, 75, ClockFormat::TwelveHour).to_string(), "1:15 PM");
    }
}

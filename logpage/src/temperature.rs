use std::fmt;

/// A temperature as reported by the controller, in whole Kelvin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Kelvin(pub u16);

impl Kelvin {
    pub fn kelvin(self) -> u16 {
        self.0
    }

    pub fn celsius(self) -> f64 {
        f64::from(self.0) - 273.15
    }

    pub fn fahrenheit(self) -> f64 {
        f64::from(self.0) * 9.0 / 5.0 - 459.67
    }
}

impl From<u16> for Kelvin {
    fn from(value: u16) -> Self {
        Kelvin(value)
    }
}

impl fmt::Display for Kelvin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} K, {:.2} C, {:.2} F",
            self.0,
            self.celsius(),
            self.fahrenheit()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn just_below_freezing() {
        let t = Kelvin(273);
        assert_eq!(format!("{:.2}", t.celsius()), "-0.15");
        assert_eq!(format!("{:.2}", t.fahrenheit()), "31.73");
        assert_eq!(t.to_string(), "273 K, -0.15 C, 31.73 F");
    }

    #[test]
    fn typical_drive_temperature() {
        assert_eq!(Kelvin(310).to_string(), "310 K, 36.85 C, 98.33 F");
    }

    #[test]
    fn zero_kelvin() {
        assert_eq!(Kelvin(0).to_string(), "0 K, -273.15 C, -459.67 F");
    }
}

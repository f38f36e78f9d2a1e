use hal::ntc::Thermistor;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    Normal,
    Overheat,
}

/// Trips once the temperature reaches `limit` and clears below `limit - hysteresis`.
pub struct ThermalGuard<T> {
    sensor: T,
    limit: f32,
    hysteresis: f32,
    condition: Condition,
    last: Option<f32>,
}

impl<T: Thermistor> ThermalGuard<T> {
    pub fn new(sensor: T, limit: f32, hysteresis: f32) -> Self {
        Self { sensor, limit, hysteresis, condition: Condition::Normal, last: None }
    }

    pub fn poll(&mut self) -> Result<Condition, T::Error> {
        let celsius = self.sensor.temperature()?;
        self.last = Some(celsius);
        self.condition = match self.condition {
            Condition::Normal if celsius >= self.limit => {
                warn!("Temperature {:.1}C reached limit {:.1}C", celsius, self.limit);
                Condition::Overheat
            }
            Condition::Overheat if celsius <= self.limit - self.hysteresis => {
                info!("Temperature back to {:.1}C", celsius);
                Condition::Normal
            }
            condition => condition,
        };
        Ok(self.condition)
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn last(&self) -> Option<f32> {
        self.last
    }
}

#[cfg(test)]
mod test {
    use hal::ntc::Thermistor;

    struct Samples(&'static [f32]);

    impl Thermistor for Samples {
        type Error = ();

        fn temperature(&mut self) -> Result<f32, ()> {
            let (first, rest) = self.0.split_first().ok_or(())?;
            self.0 = rest;
            Ok(*first)
        }
    }

    #[test]
    fn test_hysteresis() {
        use super::{Condition, ThermalGuard};

        let samples = Samples(&[25.0, 60.0, 57.0, 55.0, 59.9]);
        let mut guard = ThermalGuard::new(samples, 60.0, 5.0);
        assert_eq!(guard.last(), None);
        assert_eq!(guard.poll(), Ok(Condition::Normal));
        assert_eq!(guard.poll(), Ok(Condition::Overheat));
        assert_eq!(guard.poll(), Ok(Condition::Overheat));
        assert_eq!(guard.poll(), Ok(Condition::Normal));
        assert_eq!(guard.poll(), Ok(Condition::Normal));
        assert_eq!(guard.last(), Some(59.9));
        assert_eq!(guard.poll(), Err(()));
        assert_eq!(guard.condition(), Condition::Normal);
    }
}

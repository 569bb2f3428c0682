use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// 64-bit OSC-style timetag: high 32 bits are seconds since the epoch, low
/// 32 bits are a binary fraction of a second (`1 << 32` == 1 second). Zero
/// is reserved to mean "immediate".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timetag(pub u64);

impl Timetag {
    pub const IMMEDIATE: Timetag = Timetag(0);

    pub fn new(seconds: u32, fraction: u32) -> Timetag {
        Timetag(((seconds as u64) << 32) | fraction as u64)
    }

    pub fn seconds(self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub fn fraction(self) -> u32 {
        (self.0 & 0xFFFF_FFFF) as u32
    }

    pub fn is_immediate(self) -> bool {
        self.0 == 0
    }

    pub fn from_duration_since_epoch(d: Duration) -> Timetag {
        let seconds = d.as_secs() as u32;
        let fraction = ((d.subsec_nanos() as u64) << 32) / 1_000_000_000;
        Timetag::new(seconds, fraction as u32)
    }

    pub fn now() -> Timetag {
        let d = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        Timetag::from_duration_since_epoch(d)
    }

    pub fn as_secs_f64(self) -> f64 {
        self.seconds() as f64 + self.fraction() as f64 / (u32::MAX as f64 + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_is_zero() {
        assert!(Timetag::IMMEDIATE.is_immediate());
        assert!(!Timetag::now().is_immediate());
    }

    #[test]
    fn seconds_and_fraction_round_trip() {
        let tt = Timetag::new(1_700_000_000, 1 << 31);
        assert_eq!(tt.seconds(), 1_700_000_000);
        assert_eq!(tt.fraction(), 1 << 31);
        assert!((tt.as_secs_f64() - 1_700_000_000.5).abs() < 1e-6);
    }
}

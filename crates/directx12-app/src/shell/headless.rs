use super::MessagePump;
use super::PumpStatus;
use crate::app_error::AppResult;

/// Stands in for a window: lets a fixed number of iterations through, then
/// reports exit.
pub struct FramePump {
    remaining: u64,
    pumped: u64,
}

impl FramePump {
    pub fn new(iterations: u64) -> Self {
        Self {
            remaining: iterations,
            pumped: 0,
        }
    }

    pub fn pumped(&self) -> u64 {
        self.pumped
    }
}

impl MessagePump for FramePump {
    fn pump(&mut self) -> AppResult<PumpStatus> {
        self.pumped += 1;
        if self.remaining == 0 {
            return Ok(PumpStatus::Exit);
        }
        self.remaining -= 1;
        Ok(PumpStatus::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exits_after_the_configured_iterations() {
        let mut pump = FramePump::new(2);
        assert_eq!(pump.pump().unwrap(), PumpStatus::Continue);
        assert_eq!(pump.pump().unwrap(), PumpStatus::Continue);
        assert_eq!(pump.pump().unwrap(), PumpStatus::Exit);
        assert_eq!(pump.pumped(), 3);
    }
}

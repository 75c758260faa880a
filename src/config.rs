use crate::common::{InferenceError, Result};

pub const DEFAULT_BOARD_SIZE: usize = 10;

/// Carrier, battleship, cruiser, submarine, destroyer.
pub const CLASSIC_FLEET: [usize; 5] = [5, 4, 3, 3, 2];

/// Reduced fleet for the 6×6 practice board.
pub const MINI_FLEET: [usize; 3] = [5, 4, 3];

/// Default ceiling on the number of fleets a session will materialize.
pub const DEFAULT_FLEET_LIMIT: usize = 2_000_000;

/// Default number of fleets drawn per heatmap when the fleet set is too large
/// to hold.
pub const DEFAULT_SAMPLE_COUNT: usize = 512;

/// Board size and fleet list for one session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FleetConfig {
    board_size: usize,
    fleet: Vec<usize>,
    fleet_limit: usize,
    sample_count: usize,
}

impl FleetConfig {
    /// Build and validate a configuration.
    pub fn new(board_size: usize, fleet: impl Into<Vec<usize>>) -> Result<Self> {
        let config = Self {
            board_size,
            fleet: fleet.into(),
            fleet_limit: DEFAULT_FLEET_LIMIT,
            sample_count: DEFAULT_SAMPLE_COUNT,
        };
        config.validate()?;
        Ok(config)
    }

    /// Override the maximum number of fleets enumerated eagerly.
    pub fn with_fleet_limit(mut self, limit: usize) -> Self {
        self.fleet_limit = limit;
        self
    }

    /// Override how many fleets are drawn per heatmap once the fleet set is
    /// held as constraints only.
    pub fn with_sample_count(mut self, samples: usize) -> Self {
        self.sample_count = samples;
        self
    }

    pub fn board_size(&self) -> usize {
        self.board_size
    }

    /// Boat lengths, one entry per boat, in fleet list order.
    pub fn fleet(&self) -> &[usize] {
        &self.fleet
    }

    pub fn fleet_limit(&self) -> usize {
        self.fleet_limit
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Total number of boat cells in a complete fleet.
    pub fn total_cells(&self) -> usize {
        self.fleet.iter().sum()
    }

    /// Check that every boat can fit on the board at all.
    pub fn validate(&self) -> Result<()> {
        if self.board_size == 0 {
            return Err(InferenceError::Configuration(
                "board size must be positive".into(),
            ));
        }
        if self.sample_count == 0 {
            return Err(InferenceError::Configuration(
                "sample count must be positive".into(),
            ));
        }
        if self.fleet.is_empty() {
            return Err(InferenceError::Configuration(
                "fleet list is empty".into(),
            ));
        }
        for &len in &self.fleet {
            if len == 0 {
                return Err(InferenceError::Configuration(
                    "boat length must be positive".into(),
                ));
            }
            if len > self.board_size {
                return Err(InferenceError::Configuration(format!(
                    "boat of length {} does not fit on a {}x{} board",
                    len, self.board_size, self.board_size
                )));
            }
        }
        Ok(())
    }
}

impl Default for FleetConfig {
    /// The classic 10×10 game with five boats.
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            fleet: CLASSIC_FLEET.to_vec(),
            fleet_limit: DEFAULT_FLEET_LIMIT,
            sample_count: DEFAULT_SAMPLE_COUNT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_classic() {
        let config = FleetConfig::default();
        assert_eq!(config.board_size(), 10);
        assert_eq!(config.total_cells(), 17);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_oversized_boat() {
        let err = FleetConfig::new(4, vec![5]).unwrap_err();
        assert!(matches!(err, InferenceError::Configuration(_)));
    }

    #[test]
    fn rejects_zero_samples() {
        let config = FleetConfig::new(6, vec![3]).unwrap().with_sample_count(0);
        assert!(matches!(
            config.validate(),
            Err(InferenceError::Configuration(_))
        ));
    }

    #[test]
    fn rejects_empty_fleet() {
        let err = FleetConfig::new(6, Vec::new()).unwrap_err();
        assert_eq!(
            err,
            InferenceError::Configuration("fleet list is empty".into())
        );
    }
}

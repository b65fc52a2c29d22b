//! Bounds on counts read from event records
//!
//! Every count is checked before anything is allocated for it, so a
//! corrupted count field cannot make the reader reserve unbounded memory.

/// Maximum weights per event or vertex (4096)
pub const MAX_WEIGHTS: usize = 4096;

/// Maximum random-number states per event (4096)
pub const MAX_RANDOM_STATES: usize = 4096;

/// Maximum colour-flow codes per particle (64)
pub const MAX_FLOW_CODES: usize = 64;

/// Maximum particles listed under one vertex (1,000,000)
pub const MAX_PARTICLES_PER_VERTEX: usize = 1_000_000;

/// Maximum vertices per event (10,000,000)
pub const MAX_VERTICES_PER_EVENT: usize = 10_000_000;

/// Maximum output precision: digits after the decimal point of the
/// mantissa (32)
pub const MAX_PRECISION: usize = 32;

/// Limit violation
#[derive(Debug, Clone, PartialEq)]
pub enum LimitError {
    TooManyWeights { count: usize, max: usize },
    TooManyRandomStates { count: usize, max: usize },
    TooManyFlowCodes { count: usize, max: usize },
    TooManyParticles { count: usize, max: usize },
    TooManyVertices { count: usize, max: usize },
    PrecisionTooLarge { precision: usize, max: usize },
}

impl std::fmt::Display for LimitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooManyWeights { count, max } => {
                write!(f, "Too many weights: {} (max {})", count, max)
            }
            Self::TooManyRandomStates { count, max } => {
                write!(f, "Too many random states: {} (max {})", count, max)
            }
            Self::TooManyFlowCodes { count, max } => {
                write!(f, "Too many flow codes: {} (max {})", count, max)
            }
            Self::TooManyParticles { count, max } => {
                write!(f, "Too many particles at one vertex: {} (max {})", count, max)
            }
            Self::TooManyVertices { count, max } => {
                write!(f, "Too many vertices in event: {} (max {})", count, max)
            }
            Self::PrecisionTooLarge { precision, max } => {
                write!(f, "Precision too large: {} (max {})", precision, max)
            }
        }
    }
}

impl std::error::Error for LimitError {}

pub fn validate_weight_count(count: usize) -> Result<(), LimitError> {
    if count > MAX_WEIGHTS {
        return Err(LimitError::TooManyWeights {
            count,
            max: MAX_WEIGHTS,
        });
    }
    Ok(())
}

pub fn validate_random_state_count(count: usize) -> Result<(), LimitError> {
    if count > MAX_RANDOM_STATES {
        return Err(LimitError::TooManyRandomStates {
            count,
            max: MAX_RANDOM_STATES,
        });
    }
    Ok(())
}

pub fn validate_flow_count(count: usize) -> Result<(), LimitError> {
    if count > MAX_FLOW_CODES {
        return Err(LimitError::TooManyFlowCodes {
            count,
            max: MAX_FLOW_CODES,
        });
    }
    Ok(())
}

/// Validate the particle count announced by a vertex record
pub fn validate_particle_count(count: usize) -> Result<(), LimitError> {
    if count > MAX_PARTICLES_PER_VERTEX {
        return Err(LimitError::TooManyParticles {
            count,
            max: MAX_PARTICLES_PER_VERTEX,
        });
    }
    Ok(())
}

pub fn validate_vertex_count(count: usize) -> Result<(), LimitError> {
    if count > MAX_VERTICES_PER_EVENT {
        return Err(LimitError::TooManyVertices {
            count,
            max: MAX_VERTICES_PER_EVENT,
        });
    }
    Ok(())
}

pub fn validate_precision(precision: usize) -> Result<(), LimitError> {
    if precision > MAX_PRECISION {
        return Err(LimitError::PrecisionTooLarge {
            precision,
            max: MAX_PRECISION,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_count() {
        assert!(validate_weight_count(0).is_ok());
        assert!(validate_weight_count(MAX_WEIGHTS).is_ok());
        assert_eq!(
            validate_weight_count(MAX_WEIGHTS + 1),
            Err(LimitError::TooManyWeights {
                count: MAX_WEIGHTS + 1,
                max: MAX_WEIGHTS
            })
        );
    }

    #[test]
    fn test_particle_and_vertex_counts() {
        assert!(validate_particle_count(10).is_ok());
        assert!(validate_particle_count(MAX_PARTICLES_PER_VERTEX + 1).is_err());
        assert!(validate_vertex_count(MAX_VERTICES_PER_EVENT).is_ok());
        assert!(validate_vertex_count(usize::MAX).is_err());
    }

    #[test]
    fn test_flow_and_random_counts() {
        assert!(validate_flow_count(2).is_ok());
        assert!(validate_flow_count(MAX_FLOW_CODES + 1).is_err());
        assert!(validate_random_state_count(MAX_RANDOM_STATES + 1).is_err());
    }

    #[test]
    fn test_precision() {
        assert!(validate_precision(16).is_ok());
        let err = validate_precision(40).unwrap_err();
        assert_eq!(err.to_string(), "Precision too large: 40 (max 32)");
    }
}

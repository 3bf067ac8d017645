//! Caller-side contract violations

use thiserror::Error;

use crate::MIN_CLUSTERS;

/// Invalid input, rejected before any external call is attempted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("cluster count must be at least {min}, got {k}")]
    ClusterCount { k: usize, min: usize },
}

/// Validate a requested cluster count
pub fn validate_cluster_count(k: usize) -> Result<(), InputError> {
    if k < MIN_CLUSTERS {
        return Err(InputError::ClusterCount {
            k,
            min: MIN_CLUSTERS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_count_validation() {
        assert!(validate_cluster_count(2).is_ok());
        assert_eq!(
            validate_cluster_count(1),
            Err(InputError::ClusterCount { k: 1, min: 2 })
        );
    }
}

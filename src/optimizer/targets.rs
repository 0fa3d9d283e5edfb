use crate::error::{PortionError, Result};
use crate::models::{Axis, Targets};

/// Accepted `[min, max]` interval around a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    /// Band produced by applying `tolerance` on both sides of `target`.
    pub fn around(target: f64, tolerance: f64) -> Self {
        Self {
            min: target * (1.0 - tolerance),
            max: target * (1.0 + tolerance),
        }
    }

    /// Whether `value` lies in the band, widened by `slack` on each side.
    #[inline]
    pub fn contains(&self, value: f64, slack: f64) -> bool {
        value >= self.min - slack && value <= self.max + slack
    }
}

/// An axis included in the objective and constraints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveAxis {
    pub axis: Axis,
    pub target: f64,
    pub band: Band,
}

/// Active axes and their bands for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSpec {
    pub tolerance: f64,
    pub axes: Vec<ActiveAxis>,
}

impl TargetSpec {
    /// Build the active axis set. Targets <= 0 are left out entirely.
    pub fn build(targets: &Targets, tolerance: f64) -> Result<Self> {
        if !tolerance.is_finite() || tolerance <= 0.0 || tolerance > 1.0 {
            return Err(PortionError::validation(format!(
                "tolerance must be in (0, 1], got {tolerance}"
            )));
        }

        let mut axes = Vec::new();
        for axis in Axis::ALL {
            let target = targets.get(axis);
            if target.is_nan() || target.is_infinite() {
                return Err(PortionError::validation(format!(
                    "{axis} target must be a finite number"
                )));
            }
            if target > 0.0 {
                axes.push(ActiveAxis {
                    axis,
                    target,
                    band: Band::around(target, tolerance),
                });
            }
        }

        if axes.is_empty() {
            return Err(PortionError::validation(
                "set at least one target (calories, protein, carb or fat)",
            ));
        }

        Ok(Self { tolerance, axes })
    }

    pub fn get(&self, axis: Axis) -> Option<&ActiveAxis> {
        self.axes.iter().find(|a| a.axis == axis)
    }

    pub fn is_active(&self, axis: Axis) -> bool {
        self.get(axis).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Nutrients;

    #[test]
    fn test_band_width() {
        let spec = TargetSpec::build(&Nutrients::new(2000.0, 150.0, 0.0, 60.0), 0.10).unwrap();
        assert_eq!(spec.axes.len(), 3);

        let cal = spec.get(Axis::Calories).unwrap();
        assert!((cal.band.min - 1800.0).abs() < 1e-9);
        assert!((cal.band.max - 2200.0).abs() < 1e-9);
        assert!(!spec.is_active(Axis::Carb));
    }

    #[test]
    fn test_negative_target_inactive() {
        let spec = TargetSpec::build(&Nutrients::new(500.0, -10.0, 0.0, 0.0), 0.05).unwrap();
        assert_eq!(spec.axes.len(), 1);
        assert!(!spec.is_active(Axis::Protein));
    }

    #[test]
    fn test_no_active_axis() {
        let err = TargetSpec::build(&Nutrients::default(), 0.1).unwrap_err();
        assert!(matches!(err, PortionError::Validation(_)));
    }

    #[test]
    fn test_tolerance_range() {
        let targets = Nutrients::new(500.0, 0.0, 0.0, 0.0);
        assert!(TargetSpec::build(&targets, 0.0).is_err());
        assert!(TargetSpec::build(&targets, -0.1).is_err());
        assert!(TargetSpec::build(&targets, 1.01).is_err());
        assert!(TargetSpec::build(&targets, f64::NAN).is_err());
        assert!(TargetSpec::build(&targets, 1.0).is_ok());
    }

    #[test]
    fn test_non_finite_target() {
        let targets = Nutrients::new(f64::NAN, 10.0, 0.0, 0.0);
        assert!(TargetSpec::build(&targets, 0.1).is_err());
    }
}

//! Version transition planning.
//!
//! Moving from one version to another is always a walk of single steps:
//! up steps enter `current + 1 ..= target`, down steps vacate
//! `current ..= target + 1`. Nothing is skipped or batched.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::error::{MigrateError, Result};
use crate::migration::{Direction, Migration};

/// One single-version application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub migration: Migration,
    pub direction: Direction,
}

impl Step {
    /// Script file this step runs.
    pub fn filename(&self) -> String {
        self.migration.filename(self.direction)
    }

    /// Version the database is at once this step has been applied.
    pub fn resulting_version(&self) -> i64 {
        match self.direction {
            Direction::Up => self.migration.version,
            Direction::Down => self.migration.version - 1,
        }
    }
}

/// Steps needed to go from `current` to `target`.
///
/// Fails with `BadVersion` when `target` is outside `0..=catalog.len()`;
/// an equal target yields no steps.
pub fn plan(current: i64, target: i64, catalog: &Catalog) -> Result<Vec<Step>> {
    if target < 0 {
        return Err(MigrateError::BadVersion {
            version: target,
            problem: "version must be 0 or higher".to_string(),
        });
    }

    let max = catalog.latest_version();
    if target > max {
        return Err(MigrateError::BadVersion {
            version: target,
            problem: format!("max version is {}", max),
        });
    }

    if target == current {
        return Ok(Vec::new());
    }

    let (direction, versions): (Direction, Vec<i64>) = if target > current {
        (Direction::Up, (current + 1..=target).collect())
    } else {
        (Direction::Down, (target + 1..=current).rev().collect())
    };

    versions
        .into_iter()
        .map(|version| -> Result<Step> {
            let migration = catalog
                .get(version)
                .cloned()
                .ok_or(MigrateError::FilesystemMissingDbMigration { version })?;
            Ok(Step {
                migration,
                direction,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn catalog(n: i64) -> Catalog {
        let names: Vec<String> = (1..=n)
            .flat_map(|v| {
                [
                    Migration::new(v, format!("v{v}")).filename(Direction::Up),
                    Migration::new(v, format!("v{v}")).filename(Direction::Down),
                ]
            })
            .collect();
        Catalog::from_filenames(names).unwrap()
    }

    fn versions(steps: &[Step]) -> Vec<i64> {
        steps.iter().map(|s| s.migration.version).collect()
    }

    #[test]
    fn test_plan_up() {
        let steps = plan(1, 3, &catalog(3)).unwrap();
        assert_eq!(versions(&steps), vec![2, 3]);
        assert!(steps.iter().all(|s| s.direction == Direction::Up));
        assert_eq!(steps[0].filename(), "0002_v2.up.sql");
        assert_eq!(steps[1].resulting_version(), 3);
    }

    #[test]
    fn test_plan_down() {
        let steps = plan(3, 0, &catalog(3)).unwrap();
        assert_eq!(versions(&steps), vec![3, 2, 1]);
        assert!(steps.iter().all(|s| s.direction == Direction::Down));
        assert_eq!(steps[2].filename(), "0001_v1.down.sql");
        assert_eq!(steps[2].resulting_version(), 0);
    }

    #[test]
    fn test_plan_step_count_matches_distance() {
        let catalog = catalog(5);
        for from in 0..=5 {
            for to in 0..=5 {
                let steps = plan(from, to, &catalog).unwrap();
                assert_eq!(steps.len() as i64, (to - from).abs());
                let vs = versions(&steps);
                if to > from {
                    assert!(vs.windows(2).all(|w| w[0] < w[1]));
                } else {
                    assert!(vs.windows(2).all(|w| w[0] > w[1]));
                }
            }
        }
    }

    #[test]
    fn test_plan_same_version_is_noop() {
        assert!(plan(2, 2, &catalog(3)).unwrap().is_empty());
        assert!(plan(0, 0, &Catalog::default()).unwrap().is_empty());
    }

    #[test]
    fn test_plan_negative_target() {
        let err = plan(0, -1, &catalog(3)).unwrap_err();
        match err {
            MigrateError::BadVersion { version, problem } => {
                assert_eq!(version, -1);
                assert_eq!(problem, "version must be 0 or higher");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_plan_target_past_catalog() {
        let err = plan(0, 4, &catalog(3)).unwrap_err();
        match err {
            MigrateError::BadVersion { version, problem } => {
                assert_eq!(version, 4);
                assert_eq!(problem, "max version is 3");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_plan_current_beyond_catalog() {
        let err = plan(5, 1, &catalog(3)).unwrap_err();
        assert!(matches!(
            err,
            MigrateError::FilesystemMissingDbMigration { version: 5 }
        ));
    }
}

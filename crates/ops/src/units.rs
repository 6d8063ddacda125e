//! Collecting results of concurrently spawned units

use shdeps_errors::{Error, OpsError};
use tokio::task::JoinSet;

/// Await every unit and return their results in spawn order.
///
/// Units report their index alongside the result. The first failed unit
/// ends collection; dropping the set aborts whatever is still running.
pub(crate) async fn join_ordered<T: 'static>(
    mut units: JoinSet<(usize, Result<T, Error>)>,
    count: usize,
    label: &str,
) -> Result<Vec<T>, Error> {
    let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(count).collect();

    while let Some(joined) = units.join_next().await {
        let (index, result) = joined.map_err(|e| OpsError::TaskFailed {
            unit: label.to_string(),
            message: e.to_string(),
        })?;
        if let Some(slot) = slots.get_mut(index) {
            *slot = Some(result?);
        }
    }

    Ok(slots.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_results_come_back_in_spawn_order() {
        let mut units = JoinSet::new();
        for (index, delay) in [30u64, 0, 10].into_iter().enumerate() {
            units.spawn(async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                (index, Ok::<_, Error>(index))
            });
        }

        let results = join_ordered(units, 3, "test").await.unwrap();
        assert_eq!(results, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_first_failure_is_returned() {
        let mut units = JoinSet::new();
        units.spawn(async { (0, Ok::<u32, Error>(1)) });
        units.spawn(async { (1, Err(Error::internal("boom"))) });

        let err = join_ordered(units, 2, "test").await.unwrap_err();
        assert_eq!(err.to_string(), "internal error: boom");
    }
}

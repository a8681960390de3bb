//! Turns the recorded partition start times of a time-keyed table into a
//! non-overlapping set of query windows covering everything up to "now".

use std::collections::BTreeMap;

use datasource::{DataSourceError, PartitionsDao};

/// Ordered map from interval start to inclusive interval end, both epoch
/// milliseconds. Intervals never overlap; the last one ends at "now".
pub type PartitionMap = BTreeMap<i64, i64>;

/// Plan query windows from a set of distinct partition start times. Each
/// window ends right before the next partition starts; the last window ends
/// at `now_ms`. An empty input yields an empty map and the caller skips the
/// table entirely. Duplicate start times are a precondition violation of the
/// partition source and produce an unspecified window set.
pub fn plan_partitions(start_times: &[i64], now_ms: i64) -> PartitionMap {
    let mut starts: Vec<i64> = start_times.to_vec();
    starts.sort_unstable();

    let mut partitions = PartitionMap::new();
    for (i, &start) in starts.iter().enumerate() {
        let end = match starts.get(i + 1) {
            Some(&next_start) => next_start - 1,
            None => now_ms,
        };
        partitions.insert(start, end);
    }
    partitions
}

/// Fetch the partition start times for a table and plan against the current
/// wall clock.
pub async fn collect_partitions(
    dao: &dyn PartitionsDao,
    table: &str,
) -> Result<PartitionMap, DataSourceError> {
    let start_times = dao.fetch_partitions(table).await?;
    Ok(plan_partitions(
        &start_times,
        chrono::Utc::now().timestamp_millis(),
    ))
}

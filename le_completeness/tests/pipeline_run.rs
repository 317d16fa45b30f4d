mod common;

use std::io::Write;

use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Australia::Sydney;
use chrono_tz::Tz;
use common::{config_for, run_of_intervals, FakeApi};
use le_completeness::devices::DeviceSelection;
use le_completeness::run::run;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// First interval end of a perfect UTC day: 00:05:00.
fn first_end_utc(y: i32, m: u32, d: u32) -> i64 {
    Utc.with_ymd_and_hms(y, m, d, 0, 5, 0).unwrap().timestamp()
}

#[tokio::test]
async fn one_day_two_devices_matches_the_reference_numbers() {
    let first_end = first_end_utc(2024, 6, 1);
    let api = FakeApi::new()
        .with_roster(&["B000000000001", "C000000000002"])
        .with_device("B000000000001", run_of_intervals(first_end, 288))
        .with_device("C000000000002", run_of_intervals(first_end, 144));
    let config = config_for(date(2024, 6, 1), date(2024, 6, 1), Tz::UTC, 99, DeviceSelection::Roster);

    let report = run(&config, &api).await.unwrap();

    insta::assert_json_snapshot!(report.summary, @r###"
    {
      "num_devices": 2,
      "num_intervals_expected": 288,
      "num_intervals_expected_per_day": 288,
      "threshold_percent": 99,
      "overall_completeness_pct": 75.0,
      "num_no_data": 0,
      "num_missing_data": 1,
      "num_below_threshold": 1,
      "num_complete": 1,
      "num_failed": 0
    }
    "###);

    // Worst device first.
    assert_eq!(report.device_table.len(), 2);
    assert_eq!(report.device_table[0].device_id, "C000000000002");
    assert_eq!(report.device_table[0].num_intervals_observed, 144);
    assert_eq!(report.device_table[0].num_intervals_missing, 144);
    assert_eq!(report.device_table[0].completeness_ratio, 0.5);
    assert_eq!(report.device_table[1].device_id, "B000000000001");
    assert_eq!(report.device_table[1].completeness_ratio, 1.0);

    // One day bucket per device, device order.
    let daily: Vec<(&str, NaiveDate, i64)> = report
        .daily_table
        .iter()
        .map(|r| (r.device_id.as_str(), r.date, r.num_intervals_observed))
        .collect();
    assert_eq!(
        daily,
        vec![
            ("B000000000001", date(2024, 6, 1), 288),
            ("C000000000002", date(2024, 6, 1), 144),
        ]
    );

    // Every observed interval became a row.
    assert_eq!(report.rows.rows.len(), 432);
    assert_eq!(report.rows.columns[..3], ["device_id", "timestamp", "duration_secs"]);
}

#[tokio::test]
async fn failed_device_counts_in_scalars_but_not_in_tables() {
    let first_end = first_end_utc(2024, 6, 1);
    let api = FakeApi::new()
        .with_roster(&["B000000000001", "C000000000002", "D000000000003"])
        .with_device("B000000000001", run_of_intervals(first_end, 288))
        .with_device("C000000000002", run_of_intervals(first_end, 200))
        .with_failure("D000000000003", "503 from upstream");
    let config = config_for(date(2024, 6, 1), date(2024, 6, 1), Tz::UTC, 99, DeviceSelection::Roster);

    let report = run(&config, &api).await.unwrap();

    assert_eq!(report.summary.num_devices, 3);
    assert_eq!(report.summary.num_failed, 1);
    assert!(report.device_table.iter().all(|r| r.device_id != "D000000000003"));
    assert!(report.daily_table.iter().all(|r| r.device_id != "D000000000003"));
    assert!(report.roster_error.is_none());
}

#[tokio::test]
async fn roster_failure_yields_a_degenerate_report() {
    let api = FakeApi::new().with_roster_failure("credential expired");
    let config = config_for(date(2024, 6, 1), date(2024, 6, 1), Tz::UTC, 99, DeviceSelection::Roster);

    let report = run(&config, &api).await.unwrap();

    let message = report.roster_error.as_deref().unwrap();
    assert!(message.contains("credential expired"), "got: {message}");
    assert_eq!(report.summary.num_devices, 0);
    assert_eq!(report.summary.overall_completeness_pct, 0.0);
    assert!(report.device_table.is_empty());
    assert!(report.daily_table.is_empty());
    assert!(report.rows.rows.is_empty());
}

#[tokio::test]
async fn list_file_selection_drops_malformed_ids() {
    let first_end = first_end_utc(2024, 6, 1);
    let api = FakeApi::new().with_device("B000000000001", run_of_intervals(first_end, 288));

    let mut list = tempfile::NamedTempFile::new().unwrap();
    writeln!(list, "B000000000001").unwrap();
    writeln!(list, "this is not a device").unwrap();
    writeln!(list, "C000000000002").unwrap();
    let config = config_for(
        date(2024, 6, 1),
        date(2024, 6, 1),
        Tz::UTC,
        99,
        DeviceSelection::ListFile(list.path().to_path_buf()),
    );

    let report = run(&config, &api).await.unwrap();

    // The malformed line is gone; the unknown-but-valid id fetched empty.
    assert_eq!(report.summary.num_devices, 2);
    assert_eq!(report.summary.num_no_data, 1);
    assert_eq!(report.device_table.len(), 1);
    assert_eq!(report.device_table[0].device_id, "B000000000001");
}

#[tokio::test]
async fn empty_device_is_zero_filled_across_the_window() {
    let day1_first_end = first_end_utc(2024, 6, 1);
    let day2_first_end = first_end_utc(2024, 6, 2);
    let mut day1_and_partial_day2 = run_of_intervals(day1_first_end, 288);
    day1_and_partial_day2.extend(run_of_intervals(day2_first_end, 100));

    let api = FakeApi::new()
        .with_roster(&["B000000000001", "C000000000002"])
        .with_device("B000000000001", vec![])
        .with_device("C000000000002", day1_and_partial_day2);
    let config = config_for(date(2024, 6, 1), date(2024, 6, 2), Tz::UTC, 99, DeviceSelection::Roster);

    let report = run(&config, &api).await.unwrap();

    let daily: Vec<(&str, NaiveDate, i64)> = report
        .daily_table
        .iter()
        .map(|r| (r.device_id.as_str(), r.date, r.num_intervals_observed))
        .collect();
    assert_eq!(
        daily,
        vec![
            ("B000000000001", date(2024, 6, 1), 0),
            ("B000000000001", date(2024, 6, 2), 0),
            ("C000000000002", date(2024, 6, 1), 288),
            ("C000000000002", date(2024, 6, 2), 100),
        ]
    );

    // Day sums reconcile with the whole-period record when the window
    // aligns with day boundaries.
    let whole_period = report
        .device_table
        .iter()
        .find(|r| r.device_id == "C000000000002")
        .unwrap();
    let day_sum: i64 = report
        .daily_table
        .iter()
        .filter(|r| r.device_id == "C000000000002")
        .map(|r| r.num_intervals_observed)
        .sum();
    assert_eq!(whole_period.num_intervals_observed, 388);
    assert_eq!(day_sum, 388);
}

#[tokio::test]
async fn identical_inputs_produce_identical_reports() {
    let first_end = first_end_utc(2024, 6, 1);
    let api = FakeApi::new()
        .with_roster(&["C000000000002", "B000000000001"])
        .with_device("C000000000002", run_of_intervals(first_end, 17))
        .with_device("B000000000001", run_of_intervals(first_end, 288));
    let config = config_for(date(2024, 6, 1), date(2024, 6, 1), Tz::UTC, 95, DeviceSelection::Roster);

    let first = run(&config, &api).await.unwrap();
    let second = run(&config, &api).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn day_buckets_follow_the_configured_timezone() {
    // A perfect Sydney winter day starts at 2024-05-31T14:00:00Z.
    let first_end = Utc.with_ymd_and_hms(2024, 5, 31, 14, 5, 0).unwrap().timestamp();
    let api = FakeApi::new()
        .with_roster(&["B000000000001"])
        .with_device("B000000000001", run_of_intervals(first_end, 288));
    let config = config_for(date(2024, 6, 1), date(2024, 6, 1), Sydney, 99, DeviceSelection::Roster);

    let report = run(&config, &api).await.unwrap();

    assert_eq!(report.summary.num_complete, 1);
    assert_eq!(report.daily_table.len(), 1);
    assert_eq!(report.daily_table[0].date, date(2024, 6, 1));
    assert_eq!(report.daily_table[0].num_intervals_observed, 288);
}

#[tokio::test]
async fn impossible_window_aborts_the_run() {
    let api = FakeApi::new().with_roster(&["B000000000001"]);
    // Bypasses config-file validation on purpose.
    let config = config_for(date(2024, 6, 2), date(2024, 6, 1), Tz::UTC, 99, DeviceSelection::Roster);

    let err = run(&config, &api).await.unwrap_err();
    assert!(err.to_string().contains("invalid run window"), "got: {err:#}");
}

// src/aggregator_tests.rs

#[cfg(test)]
mod tests {
    use crate::aggregator::*;
    use crate::duration_format::{format_duration, parse_duration};
    use crate::expected_table::ExpectedDurationTable;
    use crate::model::*;
    use chrono::{Duration, NaiveDate};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn d(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .unwrap_or_else(|_| panic!("Invalid date string format: {}", date_str))
    }

    fn hms(text: &str) -> Duration {
        parse_duration(text).unwrap_or_else(|| panic!("Invalid duration: {}", text))
    }

    // Helper function to create a test transaction
    fn create_test_transaction(
        processor: &str,
        process: &str,
        date: &str,
        actual: &str,
        expected: Option<&str>,
    ) -> Transaction {
        let transaction = Transaction::new(processor, process)
            .on(d(date))
            .actual(hms(actual));
        match expected {
            Some(expected) => transaction.expected(hms(expected)),
            None => transaction,
        }
    }

    fn may_log() -> Vec<Transaction> {
        vec![
            create_test_transaction("A", "Confirmation", "2024-05-01", "0:05:00", Some("0:04:37")),
            create_test_transaction("A", "Confirmation", "2024-05-02", "0:04:00", Some("0:04:37")),
            create_test_transaction("A", "Break", "2024-05-02", "0:30:00", None),
            create_test_transaction("A", "Line-Item", "2024-05-06", "0:02:00", Some("0:01:53")),
            create_test_transaction("B", "Order Entry", "2024-05-06", "0:04:10", Some("0:04:10")),
            create_test_transaction("B", "Unknown", "2024-05-12", "0:03:00", None),
            create_test_transaction("B", "Unknown", "2024-05-12", "0:02:30", None),
            create_test_transaction("B", "Unknown", "2024-05-13", "0:03:30", None),
            create_test_transaction("A", "Confirmation", "2024-06-03", "0:05:00", Some("0:04:37")),
        ]
    }

    // --- Filter ---

    #[test]
    fn filter_selects_month_employee_and_drops_breaks() {
        let log = may_log();
        let selected =
            TransactionFilter::new("2024-05", EmployeeSelection::One("A".into())).apply(&log);
        assert_eq!(selected.len(), 3);
        assert!(selected.iter().all(|t| t.processor == "A" && t.process != "Break"));
        assert!(selected.iter().all(|t| t.in_month("2024-05")));
    }

    #[test]
    fn filter_all_employees_spans_everyone() {
        let log = may_log();
        let selected = TransactionFilter::new("2024-05", EmployeeSelection::All).apply(&log);
        assert_eq!(selected.len(), 7);
    }

    #[test]
    fn keep_breaks_retains_break_rows() {
        let log = may_log();
        let selected = TransactionFilter::new("2024-05", EmployeeSelection::One("A".into()))
            .keep_breaks()
            .apply(&log);
        assert_eq!(selected.len(), 4);
    }

    #[test]
    fn custom_exclusions_replace_the_default() {
        let log = may_log();
        let selected = TransactionFilter::new("2024-05", EmployeeSelection::All)
            .excluding(&["Unknown".to_string()])
            .apply(&log);
        assert_eq!(selected.len(), 5);
        assert!(selected.iter().any(|t| t.process == "Break"));
    }

    #[test]
    fn filter_skips_undated_rows() {
        let mut log = may_log();
        log.push(Transaction::new("A", "Confirmation").actual(Duration::minutes(5)));
        let selected = TransactionFilter::new("2024-05", EmployeeSelection::All).apply(&log);
        assert_eq!(selected.len(), 7);
    }

    // --- SummarizeTotals ---

    #[test]
    fn single_confirmation_scenario() {
        let log = vec![create_test_transaction(
            "A",
            "Confirmation",
            "2024-05-01",
            "0:05:00",
            Some("0:04:37"),
        )];
        let selected =
            TransactionFilter::new("2024-05", EmployeeSelection::One("A".into())).apply(&log);
        let totals = summarize_totals(&selected);

        assert_eq!(format_duration(totals.actual), "00:05:00");
        assert_eq!(format_duration(totals.expected), "00:04:37");
        assert_eq!(format_duration(totals.difference), "00:00:23");
        assert_eq!(totals.working_days, 1);
        assert_eq!(totals.item_count, 1);
        assert_eq!(totals.efficiency.round(), dec!(92));
    }

    #[test]
    fn empty_month_yields_zero_totals() {
        let log = may_log();
        let selected = TransactionFilter::new("2099-01", EmployeeSelection::All).apply(&log);
        assert!(selected.is_empty());

        let totals = summarize_totals(&selected);
        assert!(totals.is_empty());
        assert_eq!(totals.actual, Duration::zero());
        assert_eq!(totals.expected, Duration::zero());
        assert_eq!(totals.difference, Duration::zero());
        assert_eq!(totals.working_days, 0);
        assert_eq!(totals.efficiency, Decimal::ZERO);
        assert!(group_by_week(&selected).is_empty());
    }

    #[test]
    fn efficiency_is_zero_when_no_actual_time_logged() {
        let log = vec![Transaction::new("A", "MOV")
            .on(d("2024-05-01"))
            .actual(Duration::zero())
            .expected(Duration::minutes(7))];
        let selected: Vec<&Transaction> = log.iter().collect();
        let totals = summarize_totals(&selected);
        assert_eq!(totals.efficiency, Decimal::ZERO);
        assert_eq!(format_duration(totals.difference), "-00:07:00");
    }

    #[test]
    fn missing_durations_count_as_items_but_not_time() {
        let log = vec![
            create_test_transaction("A", "MOV", "2024-05-01", "0:07:00", Some("0:07:00")),
            Transaction::new("A", "MOV").on(d("2024-05-01")),
        ];
        let selected: Vec<&Transaction> = log.iter().collect();
        let totals = summarize_totals(&selected);
        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.actual, Duration::minutes(7));
        assert_eq!(totals.efficiency, dec!(100));
    }

    #[test]
    fn working_days_never_exceed_record_count_and_actual_is_non_negative() {
        let log = may_log();
        for month in ["2024-05", "2024-06", "2099-01"] {
            for employee in [EmployeeSelection::All, EmployeeSelection::One("B".into())] {
                let selected = TransactionFilter::new(month, employee).apply(&log);
                let totals = summarize_totals(&selected);
                assert!(totals.actual >= Duration::zero());
                assert!(totals.working_days <= selected.len());
                assert!(totals.efficiency >= Decimal::ZERO);
            }
        }
    }

    #[test]
    fn sub_second_shortfall_keeps_negative_sign() {
        let log = vec![create_test_transaction(
            "A",
            "MOV",
            "2024-05-01",
            "0:07:00.0",
            Some("0:07:00.4"),
        )];
        let selected = TransactionFilter::new("2024-05", EmployeeSelection::All).apply(&log);
        let totals = summarize_totals(&selected);

        assert_eq!(totals.difference, -Duration::milliseconds(400));
        assert_eq!(format_duration(totals.difference), "-00:00:00");
    }

    #[test]
    fn oversized_durations_saturate_instead_of_overflowing() {
        let log = vec![
            Transaction::new("A", "MOV").on(d("2024-05-01")).actual(Duration::MAX),
            Transaction::new("A", "MOV").on(d("2024-05-02")).actual(Duration::MAX),
        ];
        let selected = TransactionFilter::new("2024-05", EmployeeSelection::All).apply(&log);
        let totals = summarize_totals(&selected);

        assert_eq!(totals.actual, Duration::MAX);
        assert_eq!(totals.item_count, 2);
    }

    // --- GroupByWeek ---

    #[test]
    fn weeks_start_on_monday_and_are_ordered() {
        let log = may_log();
        let selected = TransactionFilter::new("2024-05", EmployeeSelection::All).apply(&log);
        let weeks = group_by_week(&selected);

        let starts: Vec<NaiveDate> = weeks.iter().map(|w| w.week_start).collect();
        // 2024-05-01 is a Wednesday, 2024-05-12 a Sunday
        assert_eq!(starts, vec![d("2024-04-29"), d("2024-05-06"), d("2024-05-13")]);

        assert_eq!(weeks[0].totals.item_count, 2);
        assert_eq!(weeks[0].totals.working_days, 2);
        assert_eq!(weeks[1].totals.item_count, 4);
        assert_eq!(weeks[1].totals.working_days, 2);
    }

    #[test]
    fn weekly_totals_add_up_to_monthly_totals() {
        let log = may_log();
        let selected = TransactionFilter::new("2024-05", EmployeeSelection::All).apply(&log);
        let month = summarize_totals(&selected);
        let weeks = group_by_week(&selected);

        let actual = weeks.iter().fold(Duration::zero(), |acc, w| acc + w.totals.actual);
        let expected = weeks.iter().fold(Duration::zero(), |acc, w| acc + w.totals.expected);
        let items: usize = weeks.iter().map(|w| w.totals.item_count).sum();
        let days: usize = weeks.iter().map(|w| w.totals.working_days).sum();

        assert_eq!(actual, month.actual);
        assert_eq!(expected, month.expected);
        assert_eq!(items, month.item_count);
        assert_eq!(days, month.working_days);
    }

    // --- GroupByProcess ---

    #[test]
    fn known_process_production_is_standard_times_items() {
        let log = may_log();
        let selected =
            TransactionFilter::new("2024-05", EmployeeSelection::One("A".into())).apply(&log);
        let processes = group_by_process(&selected, &ExpectedDurationTable::standard());

        let confirmation = processes
            .iter()
            .find(|p| p.process == "Confirmation")
            .expect("Confirmation group");
        assert_eq!(confirmation.item_count, 2);
        assert_eq!(format_duration(confirmation.total_actual), "00:09:00");
        assert_eq!(format_duration(confirmation.average), "00:04:30");
        assert_eq!(confirmation.expected_per_unit, Some(hms("0:04:37")));
        assert_eq!(format_duration(confirmation.production), "00:09:14");
    }

    #[test]
    fn unknown_process_production_falls_back_to_actual_time() {
        let log = may_log();
        let selected =
            TransactionFilter::new("2024-05", EmployeeSelection::One("B".into())).apply(&log);
        let processes = group_by_process(&selected, &ExpectedDurationTable::standard());

        let unknown = processes
            .iter()
            .find(|p| p.process == "Unknown")
            .expect("Unknown group");
        assert_eq!(unknown.item_count, 3);
        assert_eq!(format_duration(unknown.total_actual), "00:09:00");
        assert_eq!(unknown.expected_per_unit, None);
        assert_eq!(unknown.production, unknown.total_actual);
        assert_eq!(format_duration(unknown.production), "00:09:00");
    }

    #[test]
    fn process_groups_are_sorted_by_name() {
        let log = may_log();
        let selected = TransactionFilter::new("2024-05", EmployeeSelection::All)
            .keep_breaks()
            .apply(&log);
        let names: Vec<String> = group_by_process(&selected, &ExpectedDurationTable::standard())
            .into_iter()
            .map(|p| p.process)
            .collect();
        assert_eq!(
            names,
            vec!["Break", "Confirmation", "Line-Item", "Order Entry", "Unknown"]
        );
    }

    #[test]
    fn average_truncates_to_whole_seconds_when_displayed() {
        let log = vec![
            create_test_transaction("A", "MOV", "2024-05-01", "0:00:01", None),
            create_test_transaction("A", "MOV", "2024-05-01", "0:00:01", None),
            create_test_transaction("A", "MOV", "2024-05-01", "0:00:00", None),
        ];
        let selected: Vec<&Transaction> = log.iter().collect();
        let processes = group_by_process(&selected, &ExpectedDurationTable::empty());
        assert_eq!(format_duration(processes[0].average), "00:00:00");
    }

    #[test]
    fn blank_process_names_form_no_group() {
        let log = vec![
            create_test_transaction("A", "Confirmation", "2024-05-01", "0:05:00", None),
            create_test_transaction("A", "", "2024-05-01", "0:02:00", None),
            create_test_transaction("A", "  ", "2024-05-01", "0:01:00", None),
        ];
        let selected = TransactionFilter::new("2024-05", EmployeeSelection::All).apply(&log);
        let processes = group_by_process(&selected, &ExpectedDurationTable::standard());

        let names: Vec<&str> = processes.iter().map(|p| p.process.as_str()).collect();
        assert_eq!(names, vec!["Confirmation"]);
    }

    // --- GroupByDate ---

    #[test]
    fn day_summary_sums_production_across_processes() {
        let log = may_log();
        let (processes, day) = group_by_date(
            &log,
            d("2024-05-06"),
            &EmployeeSelection::All,
            &ExpectedDurationTable::standard(),
        );
        assert_eq!(processes.len(), 2);
        assert_eq!(format_duration(day.total_actual), "00:06:10");
        // Line-Item 0:01:53 + Order Entry 0:04:10
        assert_eq!(format_duration(day.total_production), "00:06:03");
        assert_eq!(day.efficiency.round(), dec!(98));
    }

    #[test]
    fn day_with_only_unknown_processes_is_fully_efficient() {
        let log = may_log();
        let (processes, day) = group_by_date(
            &log,
            d("2024-05-12"),
            &EmployeeSelection::One("B".into()),
            &ExpectedDurationTable::standard(),
        );
        assert_eq!(processes.len(), 1);
        assert_eq!(day.total_production, day.total_actual);
        assert_eq!(day.efficiency, dec!(100));
    }

    #[test]
    fn day_without_data_is_all_zero() {
        let log = may_log();
        let (processes, day) = group_by_date(
            &log,
            d("2024-05-20"),
            &EmployeeSelection::All,
            &ExpectedDurationTable::standard(),
        );
        assert!(processes.is_empty());
        assert_eq!(day.total_actual, Duration::zero());
        assert_eq!(day.total_production, Duration::zero());
        assert_eq!(day.efficiency, Decimal::ZERO);
    }

    // --- Attendance ---

    fn attendance(processor: &str, month: &str, days: Option<Decimal>) -> AttendanceRecord {
        AttendanceRecord {
            processor: ProcessorId::parse(processor).expect("valid processor"),
            month: Some(month.to_string()),
            working_days: days,
            extra: Vec::new(),
        }
    }

    #[test]
    fn attendance_filters_by_month_and_processor() {
        let records = vec![
            attendance("Anita", "2024-05", Some(dec!(21))),
            attendance("Ravi", "2024-05", Some(dec!(20))),
            attendance("Anita", "2024-06", Some(dec!(19))),
        ];

        assert_eq!(filter_attendance(&records, None, &EmployeeSelection::All).len(), 3);
        assert_eq!(
            filter_attendance(&records, Some("2024-05"), &EmployeeSelection::All).len(),
            2
        );
        let anita_june = filter_attendance(
            &records,
            Some("2024-06"),
            &EmployeeSelection::One("Anita".into()),
        );
        assert_eq!(anita_june.len(), 1);
        assert_eq!(anita_june[0].working_days, Some(dec!(19)));
        assert!(filter_attendance(&records, Some("2099-01"), &EmployeeSelection::All).is_empty());
    }

    #[test]
    fn total_working_days_skips_blank_counts() {
        let records = vec![
            attendance("Anita", "2024-05", Some(dec!(21))),
            attendance("Ravi", "2024-05", None),
            attendance("Anita", "2024-06", Some(dec!(19.5))),
        ];
        assert_eq!(total_working_days(&records), dec!(40.5));
    }

    // --- Filter options ---

    #[test]
    fn option_lists_are_sorted_and_deduplicated() {
        let log = may_log();
        assert_eq!(available_months(&log), vec!["2024-05", "2024-06"]);
        assert_eq!(available_employees(&log), vec!["A", "B", "All"]);
        assert_eq!(
            dates_in_month(&log, "2024-05"),
            vec![
                d("2024-05-01"),
                d("2024-05-02"),
                d("2024-05-06"),
                d("2024-05-12"),
                d("2024-05-13")
            ]
        );

        let records = vec![
            attendance("Ravi", "2024-06", None),
            attendance("Anita", "2024-05", None),
            attendance("Ravi", "2024-05", None),
        ];
        assert_eq!(attendance_months(&records), vec!["2024-05", "2024-06"]);
        assert_eq!(attendance_processors(&records), vec!["All", "Anita", "Ravi"]);
    }

    #[test]
    fn efficiency_percent_is_exact_ratio() {
        let ratio = efficiency_percent(Duration::seconds(277), Duration::seconds(300));
        assert_eq!(ratio.round_dp(4), dec!(92.3333));
        assert_eq!(efficiency_percent(Duration::minutes(5), Duration::zero()), Decimal::ZERO);
        assert_eq!(efficiency_percent(Duration::zero(), Duration::minutes(5)), Decimal::ZERO);
    }
}

//! Plain-text rendering for command output.
//!
//! Everything a command prints goes through [`emit`] so that stdout only
//! carries results and logs stay on stderr.

use std::io::{self, Write};

use petalbox_core::{NormalizedStatus, Price, StatusSummary};
use rust_decimal::Decimal;

/// Write `text` and a newline to stdout.
pub fn emit(text: impl std::fmt::Display) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{text}")
}

/// Amount in the storefront currency.
pub fn money(amount: Decimal) -> String {
    Price::of(amount).display()
}

/// Left-aligned table with a header rule. Columns size to their widest cell.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = headers.iter().map(|h| (*h).to_string()).collect();
    push_row(&mut out, &widths, &header);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &widths, &rule);
    for row in rows {
        push_row(&mut out, &widths, row);
    }
    out.truncate(out.trim_end().len());
    out
}

fn push_row(out: &mut String, widths: &[usize], cells: &[String]) {
    let line: Vec<String> = widths
        .iter()
        .zip(cells)
        .map(|(width, cell)| format!("{cell:<width$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

/// One-line header statistics: total, then each status with its count.
pub fn summary_line<S: NormalizedStatus>(summary: &StatusSummary<S>) -> String {
    let parts: Vec<String> = summary
        .counts()
        .iter()
        .map(|(status, count)| format!("{} {count}", status.label()))
        .collect();
    format!("{} total | {}", summary.total(), parts.join(" | "))
}

#[cfg(test)]
mod tests {
    use petalbox_core::{DeliveryStatus, HasStatus};

    use super::*;

    #[test]
    fn test_table_aligns_columns() {
        let rows = vec![
            vec!["1".to_string(), "Weekly Bloom".to_string()],
            vec!["22".to_string(), "Rose".to_string()],
        ];
        let text = table(&["ID", "NAME"], &rows);
        assert_eq!(
            text,
            "ID  NAME\n--  ------------\n1   Weekly Bloom\n22  Rose"
        );
    }

    #[test]
    fn test_table_without_rows() {
        assert_eq!(table(&["ID"], &[]), "ID\n--");
    }

    struct Row(DeliveryStatus);

    impl HasStatus for Row {
        type Status = DeliveryStatus;

        fn id(&self) -> &str {
            "x"
        }

        fn status(&self) -> DeliveryStatus {
            self.0
        }

        fn set_status(&mut self, status: DeliveryStatus) {
            self.0 = status;
        }
    }

    #[test]
    fn test_summary_line_lists_every_status() {
        let rows = [Row(DeliveryStatus::Pending), Row(DeliveryStatus::InProgress)];
        let summary = StatusSummary::compute(&rows, |_| Decimal::ZERO);
        let line = summary_line(&summary);
        assert!(line.starts_with("2 total | "));
        for status in DeliveryStatus::ALL {
            assert!(line.contains(status.label()));
        }
    }
}

use chrono::NaiveDate;

use crate::group_name_parser::*;
use crate::scenario::*;
use crate::types::*;
use crate::utilities::*;

const CATEGORY_COLUMNS: [&str; 5] = ["Category Name", "Budgeted", "Frequency", "Priority", "Type"];
const SCENARIO_COLUMNS: [&str; 6] = [
    "Id",
    "Category Name",
    "Budgeted",
    "Type",
    "Enabled",
    "Amount",
];
const TRANSACTION_COLUMNS: [&str; 5] = ["Date", "Amount", "Memo", "Cleared", "Approved"];

#[derive(Debug)]
pub struct BudgetFormatter {
    group_separator: String,
    decimal_separator: String,
}

impl BudgetFormatter {
    pub fn new() -> BudgetFormatter {
        BudgetFormatter::with_separators(",", ".")
    }

    pub fn with_separators(group_separator: &str, decimal_separator: &str) -> BudgetFormatter {
        BudgetFormatter {
            group_separator: group_separator.to_string(),
            decimal_separator: decimal_separator.to_string(),
        }
    }

    /// Formats YNAB milliunits with two decimal digits, rounding half away from zero.
    pub fn format_milliunits(&self, amount: i64) -> String {
        let abs_cents = (amount.unsigned_abs() + 5) / 10;
        format!(
            "{}{}{}{:02}",
            if amount < 0 && abs_cents != 0 { "-" } else { "" },
            self.add_group_separators(&(abs_cents / 100).to_string()),
            self.decimal_separator,
            abs_cents % 100
        )
    }

    pub fn format_scenario_amount(&self, amount: f64) -> String {
        self.format_milliunits(amount.round() as i64)
    }

    pub fn format_date(&self, date: NaiveDate) -> String {
        format_iso_date(date)
    }

    pub fn format_categories(&self, categories: &[Category]) -> String {
        let rows: Vec<Vec<String>> = categories
            .iter()
            .map(|category| {
                let attributes = resolve_display_attributes(category);
                vec![
                    category.name.clone(),
                    self.format_milliunits(category.budgeted),
                    attributes.frequency.unwrap_or_default(),
                    attributes.priority.unwrap_or_default(),
                    attributes.category_type.unwrap_or_default(),
                ]
            })
            .collect();
        format_table(&CATEGORY_COLUMNS, &rows)
    }

    pub fn format_scenario(&self, categories: &[Category], engine: &ScenarioEngine) -> String {
        let rows: Vec<Vec<String>> = categories
            .iter()
            .map(|category| {
                let enabled = engine
                    .state(&category.id)
                    .map_or(true, |state| state.enabled);
                vec![
                    category.id.to_string(),
                    category.name.clone(),
                    self.format_milliunits(category.budgeted),
                    resolve_display_attributes(category)
                        .category_type
                        .unwrap_or_default(),
                    format_yes_no(enabled).to_string(),
                    self.format_scenario_amount(engine.contribution(category)),
                ]
            })
            .collect();
        format!(
            "{}\nTotal: {}",
            format_table(&SCENARIO_COLUMNS, &rows),
            self.format_scenario_amount(engine.total(categories))
        )
    }

    pub fn format_transactions_page(
        &self,
        page: &TransactionsPage,
        page_number: usize,
        page_size: usize,
    ) -> String {
        let rows: Vec<Vec<String>> = page
            .items
            .iter()
            .map(|transaction| {
                vec![
                    self.format_date(transaction.date),
                    self.format_milliunits(transaction.amount),
                    transaction.memo.clone().unwrap_or_default(),
                    transaction.cleared.clone(),
                    format_yes_no(transaction.approved).to_string(),
                ]
            })
            .collect();
        format!(
            "{}\nPage {} of {} ({} transactions)",
            format_table(&TRANSACTION_COLUMNS, &rows),
            page_number,
            page.total_pages(page_size),
            page.total
        )
    }

    fn add_group_separators(&self, before_decimal: &str) -> String {
        before_decimal
            .chars()
            .rev()
            .collect::<Vec<char>>()
            .chunks(3)
            .map(|chunk| chunk.iter().collect())
            .collect::<Vec<String>>()
            .join(&self.group_separator.chars().rev().collect::<String>())
            .chars()
            .rev()
            .collect()
    }
}

impl Default for BudgetFormatter {
    fn default() -> BudgetFormatter {
        BudgetFormatter::new()
    }
}

fn format_yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

fn format_table(columns: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = columns.iter().map(|column| column.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = std::cmp::max(*width, cell.chars().count());
        }
    }
    let mut lines = vec![
        format_row(columns, &widths),
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<String>>()
            .join("  "),
    ];
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        lines.push(format_row(&cells, &widths));
    }
    lines.join("\n")
}

fn format_row(cells: &[&str], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<String>>()
        .join("  ")
        .trim_end()
        .to_string()
}

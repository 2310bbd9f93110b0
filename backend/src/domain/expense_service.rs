//! Expense and VIP sale tracking.
//!
//! Totals are pure reductions over the stored entries and are recomputed on
//! every read, so they never drift from the list.

use chrono::{Local, NaiveDate};
use log::{info, warn};
use shared::{CategoryTotal, Expense, ExpenseCategory, ExpenseTotals, ExpenseType, StationConfig};

use crate::domain::commands::expenses::AddExpenseCommand;
use crate::domain::errors::{StationError, StationResult};
use crate::domain::money;

/// VIP, operational and overall totals; independent of input order
pub fn expense_totals(expenses: &[Expense]) -> ExpenseTotals {
    let sum_of = |wanted: ExpenseType| {
        money::sum_currency(
            expenses
                .iter()
                .filter(|e| e.expense_type == wanted)
                .map(|e| e.amount),
        )
    };
    let vip = sum_of(ExpenseType::Vip);
    let operational = sum_of(ExpenseType::Operational);
    ExpenseTotals {
        vip,
        operational,
        total: money::sum_currency([vip, operational]),
    }
}

/// Per-category totals in picker order, omitting categories with no entries
pub fn totals_by_category(expenses: &[Expense]) -> Vec<CategoryTotal> {
    ExpenseCategory::ALL
        .iter()
        .filter(|category| expenses.iter().any(|e| e.category == **category))
        .map(|category| CategoryTotal {
            category: *category,
            label: category.label().to_string(),
            amount: money::sum_currency(
                expenses
                    .iter()
                    .filter(|e| e.category == *category)
                    .map(|e| e.amount),
            ),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct ExpenseService {
    config: StationConfig,
    expenses: Vec<Expense>,
}

impl ExpenseService {
    pub fn new(config: StationConfig) -> Self {
        Self::with_expenses(config, Vec::new())
    }

    pub fn with_expenses(config: StationConfig, mut expenses: Vec<Expense>) -> Self {
        expenses.sort_by(|a, b| b.date.cmp(&a.date));
        Self { config, expenses }
    }

    /// All entries, newest first
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn expenses_of_type(&self, expense_type: ExpenseType) -> Vec<&Expense> {
        self.expenses
            .iter()
            .filter(|e| e.expense_type == expense_type)
            .collect()
    }

    pub fn totals(&self) -> ExpenseTotals {
        expense_totals(&self.expenses)
    }

    pub fn category_totals(&self) -> Vec<CategoryTotal> {
        totals_by_category(&self.expenses)
    }

    pub fn add_expense(&mut self, cmd: AddExpenseCommand) -> StationResult<Expense> {
        self.add_expense_on(cmd, Local::now().date_naive())
    }

    pub fn add_expense_on(&mut self, cmd: AddExpenseCommand, date: NaiveDate) -> StationResult<Expense> {
        if let Err(e) = self.validate(&cmd) {
            warn!("Rejected expense '{}': {}", cmd.description, e);
            return Err(e);
        }

        // Validated above
        let (Some(amount), Some(category)) = (cmd.amount, cmd.category) else {
            return Err(StationError::validation("Amount and category are required"));
        };

        let expense = Expense {
            id: Expense::generate_id(),
            date,
            description: cmd.description.trim().to_string(),
            amount: money::round_currency(amount),
            category,
            expense_type: cmd.expense_type,
            approved_by: cmd
                .approved_by
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
            receipt: cmd.receipt,
        };
        self.expenses.insert(0, expense.clone());

        info!(
            "Recorded {} expense '{}' of {} ({})",
            expense.expense_type.label(),
            expense.description,
            money::format_currency(&self.config.currency_symbol, expense.amount),
            expense.category.label()
        );
        Ok(expense)
    }

    fn validate(&self, cmd: &AddExpenseCommand) -> StationResult<()> {
        let description = cmd.description.trim();
        if description.is_empty() {
            return Err(StationError::validation("Description is required"));
        }
        if description.chars().count() > self.config.max_description_length {
            return Err(StationError::validation(format!(
                "Description cannot exceed {} characters",
                self.config.max_description_length
            )));
        }

        // Checked at the precision it is stored with
        money::require_positive("Amount", cmd.amount.map(money::round_currency))?;

        match cmd.category {
            None => Err(StationError::validation("Category is required")),
            Some(category) if !self.config.allows_category(category) => Err(StationError::validation(format!(
                "Category '{}' is not enabled for this station",
                category.label()
            ))),
            Some(_) => Ok(()),
        }
    }
}

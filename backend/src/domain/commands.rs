//! Domain-level command types.
//!
//! The presentation layer parses raw form input into these structs (see
//! `money::parse_amount`) before calling a service. Optional fields model
//! inputs the user may have left blank; the services reject them with
//! `ValidationFailed`.

pub mod prices {
    use serde::{Deserialize, Serialize};

    /// Input for recording a new price for a product.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct RecordPriceChangeCommand {
        pub product: String,
        pub new_price: Option<f64>,
        pub reason: String,
        pub changed_by: String,
    }
}

pub mod expenses {
    use serde::{Deserialize, Serialize};
    use shared::{ExpenseCategory, ExpenseType, ReceiptRef};

    /// Input for recording an expense or VIP sale.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct AddExpenseCommand {
        pub description: String,
        pub amount: Option<f64>,
        pub category: Option<ExpenseCategory>,
        pub expense_type: ExpenseType,
        pub approved_by: Option<String>,
        pub receipt: Option<ReceiptRef>,
    }
}

pub mod admin {
    use serde::{Deserialize, Serialize};
    use shared::Role;

    /// Input for creating a user account.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct AddUserCommand {
        pub name: String,
        pub email: String,
        pub role: Role,
        pub station: String,
    }

    /// Input for registering a station.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct AddStationCommand {
        pub name: String,
        pub location: String,
        pub manager: String,
    }
}

mod aggregate;
mod list;
mod write;

pub(crate) use aggregate::spend_by_type_on;
pub use list::{DEFAULT_PAGE_SIZE, ExpenseFilter};
pub use write::{ExpenseUpdate, NewExpense};

pub mod audit_logs;
pub mod cars;
pub mod contracts;
pub mod customers;
pub mod user_preferences;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use cars::Entity as Cars;
pub use contracts::Entity as Contracts;
pub use customers::Entity as Customers;
pub use user_preferences::Entity as UserPreferences;
pub use users::Entity as Users;

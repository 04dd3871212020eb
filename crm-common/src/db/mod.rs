//! Database schema, models and row access

pub mod companies;
pub mod init;
pub mod people;
pub mod views;
pub mod workspaces;

pub use companies::Company;
pub use init::*;
pub use people::Person;
pub use views::{ViewField, ViewSort};
pub use workspaces::{ActivationStatus, Workspace};

//! UUID utilities

use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Generate a new UUIDv4 in the string form stored in id columns
pub fn generate_string() -> String {
    generate().to_string()
}

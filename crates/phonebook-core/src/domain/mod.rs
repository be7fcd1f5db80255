//! Domain model (IDs, entries, errors).

pub mod entry;
pub mod errors;
pub mod ids;

pub use self::entry::{Entry, EntryFields, MAX_NAME_LEN, MAX_PHONE_NUMBER_LEN, is_phone_number, name_key};
pub use self::errors::{FieldError, PhonebookError, ValidationErrors};
pub use self::ids::EntryId;

use uuid::Uuid;

/// Generate a fresh object identifier in the upper-case hyphenated form used
/// by `do_objectID`, e.g. `5A2C9C5B-7B31-4E1A-9B7E-3C61F0B1D2E4`.
pub fn new_object_id() -> String {
    Uuid::new_v4().hyphenated().to_string().to_uppercase()
}

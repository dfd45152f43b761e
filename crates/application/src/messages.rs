//! User-facing failure messages.

/// Messages for expected business outcomes.
pub mod error_message {
    pub const NOT_FOUND: &str = "Resource not found";
    pub const INVALID_USER: &str = "Invalid User";
    pub const UNAUTHORIZED_ACTION: &str = "Unauthorized Action";
    pub const INVALID_USER_INPUTS: &str = "Invalid User Inputs";
    pub const SOMETHING_WENT_WRONG: &str = "Something went wrong";
}

/// Messages for request validation failures.
pub mod validator_message {
    pub const INVALID_ID: &str = "You have provided wrong Id(s).";

    /// Used when a request fails validation without saying why.
    pub const VALIDATION_FAILED: &str = "Validation failed for the request.";

    pub fn min_value(property: &str, min: i64) -> String {
        format!("The field '{property}' must be more than {min}.")
    }

    pub fn max_value(property: &str, max: i64) -> String {
        format!("The field '{property}' must be less than {max}.")
    }

    pub fn min_length(property: &str, min: usize) -> String {
        format!("The field '{property}' must be more than {min} characters.")
    }

    pub fn max_length(property: &str, max: usize) -> String {
        format!("The field '{property}' must be less than {max} characters.")
    }

    pub fn min_count(property: &str, min: usize) -> String {
        format!("The field '{property}' must have more than {min} entries.")
    }

    pub fn max_count(property: &str, max: usize) -> String {
        format!("The field '{property}' must have less than {max} entries.")
    }
}

#[cfg(test)]
mod tests {
    use super::validator_message::*;

    #[test]
    fn length_messages_name_the_field() {
        assert_eq!(
            min_length("Title", 1),
            "The field 'Title' must be more than 1 characters."
        );
        assert_eq!(
            max_length("Note", 500),
            "The field 'Note' must be less than 500 characters."
        );
    }

    #[test]
    fn value_and_count_messages() {
        assert_eq!(min_value("Priority", 0), "The field 'Priority' must be more than 0.");
        assert_eq!(max_value("Priority", 10), "The field 'Priority' must be less than 10.");
        assert_eq!(min_count("Tags", 1), "The field 'Tags' must have more than 1 entries.");
        assert_eq!(max_count("Tags", 5), "The field 'Tags' must have less than 5 entries.");
    }
}

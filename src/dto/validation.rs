//! Validation helpers for upload DTOs.

use std::collections::HashSet;

use validator::ValidationError;

use crate::dto::quiz::UploadQuestionInput;

/// Minimum number of options a question must offer.
const MIN_OPTIONS: usize = 2;

/// Validates that options are non-blank, unique and at least [`MIN_OPTIONS`] long.
///
/// # Examples
///
/// ```ignore
/// validate_options(&["Brazil".into(), "Peru".into()]) // Ok
/// validate_options(&["Brazil".into(), "Brazil".into()]) // Err - duplicate
/// validate_options(&["Brazil".into()]) // Err - too few
/// ```
pub fn validate_options(options: &Vec<String>) -> Result<(), ValidationError> {
    if options.len() < MIN_OPTIONS {
        let mut err = ValidationError::new("options_count");
        err.message = Some(
            format!(
                "a question needs at least {MIN_OPTIONS} options (got {})",
                options.len()
            )
            .into(),
        );
        return Err(err);
    }

    if options.iter().any(|option| option.trim().is_empty()) {
        let mut err = ValidationError::new("options_blank");
        err.message = Some("options must not be blank".into());
        return Err(err);
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = options.iter().find(|option| !seen.insert(option.as_str())) {
        let mut err = ValidationError::new("options_unique");
        err.message = Some(format!("option `{duplicate}` appears more than once").into());
        return Err(err);
    }

    Ok(())
}

/// Validates that the correct answer is literally one of the options.
pub fn validate_question(question: &UploadQuestionInput) -> Result<(), ValidationError> {
    if question
        .options
        .iter()
        .any(|option| option == &question.correct_answer)
    {
        return Ok(());
    }

    let mut err = ValidationError::new("correct_answer_not_an_option");
    err.message = Some(
        format!(
            "correct answer `{}` is not one of the options",
            question.correct_answer
        )
        .into(),
    );
    Err(err)
}

use std::collections::HashSet;
use uuid::Uuid;
use crate::models::{CreatePollRequest, NewPoll, PollOption, UserId};

pub const MIN_TITLE_LENGTH: usize = 3;
pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;
pub const MAX_OPTION_LENGTH: usize = 100;
pub const MAX_OPTIONS: usize = 10;
pub const MIN_OPTIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Title must be at least {MIN_TITLE_LENGTH} characters")]
    TitleTooShort,
    #[error("Title exceeds maximum length of {MAX_TITLE_LENGTH}")]
    TitleTooLong,
    #[error("Description exceeds maximum length of {MAX_DESCRIPTION_LENGTH}")]
    DescriptionTooLong,
    #[error("Option text exceeds maximum length of {MAX_OPTION_LENGTH}")]
    OptionTooLong,
    #[error("Too many options (maximum {MAX_OPTIONS})")]
    TooManyOptions,
    #[error("Too few options (minimum {MIN_OPTIONS})")]
    TooFewOptions,
    #[error("Duplicate option: {0}")]
    DuplicateOption(String),
    #[error("Empty option text")]
    EmptyOption,
    #[error("Poll must end after it starts")]
    InvalidWindow,
    #[error("Option does not belong to this poll")]
    UnknownOption,
}

/// Checks a creation request and returns the trimmed poll to persist.
pub fn validate_poll_request(request: &CreatePollRequest, created_by: UserId) -> Result<NewPoll, ValidationError> {
    let title = request.title.trim();
    if title.chars().count() < MIN_TITLE_LENGTH { return Err(ValidationError::TitleTooShort); }
    if title.chars().count() > MAX_TITLE_LENGTH { return Err(ValidationError::TitleTooLong); }

    let description = request.description.as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    if description.is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH) {
        return Err(ValidationError::DescriptionTooLong);
    }

    if request.options.len() > MAX_OPTIONS { return Err(ValidationError::TooManyOptions); }
    if request.options.len() < MIN_OPTIONS { return Err(ValidationError::TooFewOptions); }

    let options: Vec<String> = request.options.iter().map(|opt| opt.trim().to_string()).collect();
    if options.iter().any(|opt| opt.is_empty()) { return Err(ValidationError::EmptyOption); }
    if options.iter().any(|opt| opt.chars().count() > MAX_OPTION_LENGTH) { return Err(ValidationError::OptionTooLong); }

    let mut seen = HashSet::with_capacity(options.len());
    if let Some(duplicate) = options.iter().find(|opt| !seen.insert(opt.to_lowercase())) {
        return Err(ValidationError::DuplicateOption(duplicate.clone()));
    }

    if let (Some(start), Some(end)) = (request.starts_at, request.ends_at) {
        if end <= start { return Err(ValidationError::InvalidWindow); }
    }

    Ok(NewPoll {
        title: title.to_string(),
        description: description.map(str::to_string),
        starts_at: request.starts_at,
        ends_at: request.ends_at,
        created_by,
        options,
    })
}

pub fn validate_option_choice(option_id: Uuid, options: &[PollOption]) -> Result<(), ValidationError> {
    if options.iter().any(|opt| opt.id == option_id) {
        Ok(())
    } else {
        Err(ValidationError::UnknownOption)
    }
}

use std::fmt;
use std::time::Duration;

/// All errors produced while editing a carousel.
///
/// Every variant is recoverable: the store turns it into the single
/// user-visible message held in `CarouselState::error`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoopError {
    /// The URL field was empty after trimming.
    #[error("please enter an image URL")]
    EmptyInput,
    /// The URL failed to parse, is not http(s), or is too long.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    /// The probe could not decode the image, or did not answer in time.
    #[error("failed to load image: {0}")]
    ImageLoadFailure(LoadFailure),
    /// The variant already holds as many images as it accepts.
    #[error("{}", count_limit_message(.max))]
    CountLimitExceeded { max: usize },
    /// The same URL is already part of the image list.
    #[error("this image has already been added")]
    DuplicateImage,
    /// A numeric or color setting that could not be clamped into range.
    #[error("{field}: {detail}")]
    OutOfRangeSetting { field: &'static str, detail: String },
}

/// Why a probe-load did not produce an image.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadFailure {
    /// The response could not be fetched or decoded as an image.
    Decode(String),
    /// No outcome before the caller's cutoff.
    Timeout(Duration),
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadFailure::Decode(reason) => write!(f, "{reason}, check the URL"),
            LoadFailure::Timeout(after) => {
                write!(f, "timed out after {} ms", after.as_millis())
            }
        }
    }
}

fn count_limit_message(max: &usize) -> String {
    if *max == 0 {
        "this variant does not take images".to_string()
    } else {
        format!("at most {max} image(s) can be added")
    }
}

pub type Result<T> = std::result::Result<T, LoopError>;

/// Shorthand constructors.
impl LoopError {
    pub fn out_of_range(field: &'static str, detail: impl Into<String>) -> Self {
        Self::OutOfRangeSetting {
            field,
            detail: detail.into(),
        }
    }

    /// Whether this error came out of a probe rather than input validation.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, LoopError::ImageLoadFailure(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(LoopError::EmptyInput.to_string(), "please enter an image URL");
        assert_eq!(
            LoopError::CountLimitExceeded { max: 6 }.to_string(),
            "at most 6 image(s) can be added"
        );
        assert_eq!(
            LoopError::CountLimitExceeded { max: 0 }.to_string(),
            "this variant does not take images"
        );
        let timeout = LoopError::ImageLoadFailure(LoadFailure::Timeout(Duration::from_secs(10)));
        assert_eq!(timeout.to_string(), "failed to load image: timed out after 10000 ms");
        assert!(timeout.is_load_failure());
    }

    #[test]
    fn out_of_range_names_the_field() {
        let err = LoopError::out_of_range("width", "must be between 100 and 1000 (got 5)");
        assert_eq!(err.to_string(), "width: must be between 100 and 1000 (got 5)");
    }
}

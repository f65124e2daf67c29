use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of an executed call: a decoded payload, the API's error envelope, or nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum CallResponse<T> {
    Success(T),
    Failure(ErrorList),
    /// Success status with an empty body.
    Empty,
}

impl<T> CallResponse<T> {
    pub fn response_body(&self) -> Option<&T> {
        match self {
            CallResponse::Success(body) => Some(body),
            _ => None,
        }
    }

    pub fn error_list(&self) -> Option<&ErrorList> {
        match self {
            CallResponse::Failure(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CallResponse::Empty)
    }

    /// Collapses the response into a `Result`, keeping an empty success as `Ok(None)`.
    pub fn into_result(self) -> Result<Option<T>, ErrorList> {
        match self {
            CallResponse::Success(body) => Ok(Some(body)),
            CallResponse::Failure(errors) => Err(errors),
            CallResponse::Empty => Ok(None),
        }
    }
}

/// Error envelope returned by the API on failure statuses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorList {
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oops() -> ErrorList {
        ErrorList {
            errors: vec![ApiError {
                code: "4711".into(),
                message: "Oooops".into(),
                details: None,
            }],
        }
    }

    #[test]
    fn accessors_expose_only_the_populated_side() {
        let success: CallResponse<u32> = CallResponse::Success(7);
        assert_eq!(success.response_body(), Some(&7));
        assert!(success.error_list().is_none());

        let failure: CallResponse<u32> = CallResponse::Failure(oops());
        assert!(failure.response_body().is_none());
        assert_eq!(failure.error_list(), Some(&oops()));

        let empty: CallResponse<u32> = CallResponse::Empty;
        assert!(empty.is_empty());
        assert_eq!(empty.into_result(), Ok(None));
    }

    #[test]
    fn error_list_decodes_without_details() {
        let list: ErrorList =
            serde_json::from_str(r#"{"errors":[{"code":"4711","message":"Oooops"}]}"#).unwrap();
        assert_eq!(list, oops());
    }

    #[test]
    fn error_list_display_joins_entries() {
        let mut list = oops();
        list.errors.push(ApiError {
            code: "InvalidInput".into(),
            message: "bad marketplace".into(),
            details: Some("ATVPDKIKX0DER".into()),
        });
        assert_eq!(
            list.to_string(),
            "4711: Oooops; InvalidInput: bad marketplace (ATVPDKIKX0DER)"
        );
    }
}

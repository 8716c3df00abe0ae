//! Status codes shared by local validation and remote-reported failures

use serde::{Deserialize, Serialize};

use crate::error::InvalidStatusCode;

/// Result taxonomy of every vehicle hardware call
///
/// The discriminants are the values carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum StatusCode {
    #[default]
    Ok = 0,
    /// Transient failure, the caller may retry
    TryAgain = 1,
    InvalidArg = 2,
    /// Property is not available for an unspecified reason
    NotAvailable = 3,
    AccessDenied = 4,
    InternalError = 5,
    NotAvailableDisabled = 6,
    NotAvailableSpeedLow = 7,
    NotAvailableSpeedHigh = 8,
    NotAvailablePoorVisibility = 9,
    NotAvailableSafety = 10,
}

impl StatusCode {
    /// Decode a status received from a remote peer.
    ///
    /// Values outside the taxonomy are reported as `InternalError`.
    pub fn from_wire(value: i32) -> Self {
        Self::try_from(value).unwrap_or(StatusCode::InternalError)
    }

    pub fn is_ok(self) -> bool {
        self == StatusCode::Ok
    }
}

impl TryFrom<i32> for StatusCode {
    type Error = InvalidStatusCode;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        let code = match value {
            0 => StatusCode::Ok,
            1 => StatusCode::TryAgain,
            2 => StatusCode::InvalidArg,
            3 => StatusCode::NotAvailable,
            4 => StatusCode::AccessDenied,
            5 => StatusCode::InternalError,
            6 => StatusCode::NotAvailableDisabled,
            7 => StatusCode::NotAvailableSpeedLow,
            8 => StatusCode::NotAvailableSpeedHigh,
            9 => StatusCode::NotAvailablePoorVisibility,
            10 => StatusCode::NotAvailableSafety,
            other => return Err(InvalidStatusCode(other)),
        };
        Ok(code)
    }
}

impl From<StatusCode> for i32 {
    fn from(code: StatusCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StatusCode::Ok => "OK",
            StatusCode::TryAgain => "TRY_AGAIN",
            StatusCode::InvalidArg => "INVALID_ARG",
            StatusCode::NotAvailable => "NOT_AVAILABLE",
            StatusCode::AccessDenied => "ACCESS_DENIED",
            StatusCode::InternalError => "INTERNAL_ERROR",
            StatusCode::NotAvailableDisabled => "NOT_AVAILABLE_DISABLED",
            StatusCode::NotAvailableSpeedLow => "NOT_AVAILABLE_SPEED_LOW",
            StatusCode::NotAvailableSpeedHigh => "NOT_AVAILABLE_SPEED_HIGH",
            StatusCode::NotAvailablePoorVisibility => "NOT_AVAILABLE_POOR_VISIBILITY",
            StatusCode::NotAvailableSafety => "NOT_AVAILABLE_SAFETY",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, StatusCode::Ok)]
    #[case(1, StatusCode::TryAgain)]
    #[case(5, StatusCode::InternalError)]
    #[case(7, StatusCode::NotAvailableSpeedLow)]
    #[case(10, StatusCode::NotAvailableSafety)]
    fn test_known_wire_values(#[case] wire: i32, #[case] expected: StatusCode) {
        assert_eq!(StatusCode::try_from(wire), Ok(expected));
        assert_eq!(i32::from(expected), wire);
    }

    #[rstest]
    #[case(-1)]
    #[case(11)]
    #[case(i32::MAX)]
    fn test_unknown_wire_values(#[case] wire: i32) {
        assert_eq!(StatusCode::try_from(wire), Err(InvalidStatusCode(wire)));
        assert_eq!(StatusCode::from_wire(wire), StatusCode::InternalError);
    }

    #[test]
    fn test_serializes_as_contract_name() {
        let json = serde_json::to_string(&StatusCode::NotAvailableSpeedLow).unwrap();
        assert_eq!(json, "\"NOT_AVAILABLE_SPEED_LOW\"");
        assert_eq!(StatusCode::NotAvailableSpeedLow.to_string(), "NOT_AVAILABLE_SPEED_LOW");
    }
}

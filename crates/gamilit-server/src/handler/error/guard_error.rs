//! Guard denials mapped to HTTP errors.

use crate::guard::GuardDenial;
use crate::handler::{Error, ErrorKind};

impl From<GuardDenial> for Error<'static> {
    fn from(denial: GuardDenial) -> Self {
        match denial {
            GuardDenial::Unauthenticated
            | GuardDenial::InsufficientRole { .. }
            | GuardDenial::MissingPermission { .. }
            | GuardDenial::MissingTenant
            | GuardDenial::NotOwner { .. } => {
                ErrorKind::Forbidden.with_context(denial.to_string())
            }
            GuardDenial::MissingPathParam { ref param } => ErrorKind::MissingPathParam
                .with_resource(param.clone())
                .with_context(denial.to_string()),
            GuardDenial::InvalidPathParam { ref param } => ErrorKind::BadRequest
                .with_resource(param.clone())
                .with_context(denial.to_string()),
            GuardDenial::Infrastructure(error) => error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use gamilit_postgres::PgError;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn access_denials_are_forbidden() {
        let denials = [
            GuardDenial::Unauthenticated,
            GuardDenial::InsufficientRole {
                role: "student".into(),
            },
            GuardDenial::MissingPermission {
                permission: "content:write".into(),
            },
            GuardDenial::MissingTenant,
            GuardDenial::NotOwner {
                principal: Uuid::from_u128(1),
                resource: Uuid::from_u128(99),
            },
        ];

        for denial in denials {
            assert!(denial.is_access_denied());
            let error = Error::from(denial);
            assert_eq!(error.kind(), ErrorKind::Forbidden);
            assert_eq!(error.message(), None);
        }
    }

    #[test]
    fn malformed_requests_are_bad_requests() {
        let error = Error::from(GuardDenial::MissingPathParam {
            param: "classroomId".into(),
        });
        assert_eq!(error.kind().status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(error.kind(), ErrorKind::MissingPathParam);

        let error = Error::from(GuardDenial::InvalidPathParam {
            param: "classroomId".into(),
        });
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.resource(), Some("classroomId"));
    }

    #[test]
    fn infrastructure_failures_are_internal() {
        let denial = GuardDenial::from(PgError::Unexpected("pool closed".into()));
        assert!(!denial.is_access_denied());

        let response = Error::from(denial).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

// src/middleware/query.rs

use axum::{
    extract::{rejection::QueryRejection, FromRef, FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
};

/// `Query<T>` com a rejeição no formato de erro da API (traduzido),
/// em vez do texto puro do axum.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidQuery<T>(pub T);

pub fn query_rejection(rejection: QueryRejection) -> AppError {
    AppError::InvalidQuery(rejection.body_text())
}

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    AppState: FromRef<S>,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ValidQuery(value)),
            Err(rejection) => {
                let locale = Locale::from_request_parts(parts, state)
                    .await
                    .unwrap_or_default();
                let app_state = AppState::from_ref(state);
                tracing::debug!("Query string rejeitada: {}", rejection.body_text());
                Err(query_rejection(rejection).to_api_error(&locale, &app_state.i18n_store))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{StatusCode, Uri};

    use crate::models::referral::{ExportFormat, ExportQuery, ReferralFilter, ReferralStatus};

    fn parse<T: DeserializeOwned>(uri: &str) -> Result<T, AppError> {
        let uri: Uri = uri.parse().unwrap();
        Query::<T>::try_from_uri(&uri).map(|Query(v)| v).map_err(query_rejection)
    }

    #[test]
    fn unknown_status_becomes_invalid_query() {
        let err = parse::<ReferralFilter>("/api/referrals?status=foo").unwrap_err();
        assert_eq!(err.code(), "invalid_query");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, AppError::InvalidQuery(ref reason) if reason.contains("foo")));
    }

    #[test]
    fn unknown_export_format_becomes_invalid_query() {
        let err = parse::<ExportQuery>("/api/referrals/export?format=pdf").unwrap_err();
        assert!(matches!(err, AppError::InvalidQuery(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn valid_values_still_parse() {
        let filter = parse::<ReferralFilter>("/api/referrals?status=Aprovado&page=2").unwrap();
        assert_eq!(filter.status, Some(ReferralStatus::Aprovado));
        assert_eq!(filter.page, Some(2));

        let export = parse::<ExportQuery>("/api/referrals/export?format=csv").unwrap();
        assert!(matches!(export.format, Some(ExportFormat::Csv)));
    }
}

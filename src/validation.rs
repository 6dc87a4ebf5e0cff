use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use validator::Validate;

use crate::errors::AppError;

/// JSON body that has been deserialized and passed its `validator` rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.starts_with("application/json"))
            .unwrap_or(false);

        if !is_json {
            return Err(AppError::validation("expected 'Content-Type: application/json'"));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.to_string()))?;

        let value = parse_body::<T>(&bytes)?;
        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    let deserializer = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(deserializer).map_err(|err| {
        let path = err.path().to_string();
        if path == "." {
            AppError::validation(err.inner().to_string())
        } else {
            AppError::validation(format!("{}: {}", path, err.inner()))
        }
    })
}

/// Path parameters whose rejection is reported as a `validation_error` body
/// instead of axum's plain-text 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| ValidatedPath(value))
            .map_err(|rejection| AppError::validation(rejection.body_text()))
    }
}

/// Query string counterpart of [`ValidatedPath`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| ValidatedQuery(value))
            .map_err(|rejection| AppError::validation(rejection.body_text()))
    }
}

/// `deserialize_with` helper: surrounding whitespace is dropped before the
/// `validator` rules see the value.
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|value| value.trim().to_string())
}

pub fn trimmed_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|value| value.map(|v| v.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[allow(dead_code)]
        inner: Inner,
    }

    #[derive(Debug, Deserialize)]
    struct Inner {
        #[allow(dead_code)]
        count: u32,
    }

    #[test]
    fn reports_path_of_bad_field() {
        let err = parse_body::<Sample>(br#"{"inner":{"count":"x"}}"#).unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.starts_with("inner.count"), "{msg}"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Named {
        #[serde(deserialize_with = "trimmed")]
        #[validate(length(min = 3))]
        name: String,
        #[serde(default, deserialize_with = "trimmed_opt")]
        #[validate(length(min = 1))]
        nick: Option<String>,
    }

    #[test]
    fn blank_strings_are_trimmed_before_rules_run() {
        let named = parse_body::<Named>(br#"{"name":"  ada  ","nick":" x "}"#).unwrap();
        assert_eq!(named.name, "ada");
        assert_eq!(named.nick.as_deref(), Some("x"));

        let blank = parse_body::<Named>(br#"{"name":"     "}"#).unwrap();
        assert!(blank.validate().is_err());

        let blank_nick = parse_body::<Named>(br#"{"name":"ada","nick":"   "}"#).unwrap();
        assert!(blank_nick.validate().is_err());

        let absent = parse_body::<Named>(br#"{"name":"ada"}"#).unwrap();
        assert!(absent.nick.is_none());
    }

    #[test]
    fn reports_missing_field() {
        let err = parse_body::<Sample>(br#"{}"#).unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("missing field `inner`"), "{msg}"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}

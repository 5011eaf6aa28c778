//! JSON exchanges with the catalog and deployment history APIs.
//!
//! The entry point is a macro so that log events carry the module path of the
//! client making the request instead of this module's.

use {
    reqwest::{Method, RequestBuilder, StatusCode, Url},
    serde::de::DeserializeOwned,
};

/// Sends a request and decodes its JSON response as `$t`. Requests are logged
/// at `DEBUG`, bodies at `TRACE`.
macro_rules! roundtrip {
    (<$t:ty>; $request:expr) => {
        $crate::infra::http::exchange::<$t>($request, |event| match event {
            $crate::infra::http::Event::Request { method, url, body } => {
                tracing::debug!(%method, %url, "HTTP request");
                if let Some(body) = body {
                    tracing::trace!(%body, "HTTP request body");
                }
            }
            $crate::infra::http::Event::Response { status, body } => {
                tracing::debug!(%status, "HTTP response");
                tracing::trace!(%body, "HTTP response body");
            }
        })
    };
}
pub(crate) use roundtrip;

#[doc(hidden)]
pub enum Event<'a> {
    Request {
        method: &'a Method,
        url: &'a Url,
        body: Option<&'a str>,
    },
    Response {
        status: StatusCode,
        body: &'a str,
    },
}

#[doc(hidden)]
pub async fn exchange<T>(request: RequestBuilder, mut log: impl FnMut(Event)) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    let (client, request) = request.build_split();
    let request = request?;
    log(Event::Request {
        method: request.method(),
        url: request.url(),
        body: request
            .body()
            .and_then(|body| body.as_bytes())
            .and_then(|bytes| std::str::from_utf8(bytes).ok()),
    });

    let response = client.execute(request).await?;
    let status = response.status();
    let body = response.text().await?;
    log(Event::Response {
        status,
        body: &body,
    });

    if !status.is_success() {
        return Err(Error::Status(status, body));
    }
    Ok(serde_json::from_str(&body)?)
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request could not be sent or the response could not be read.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// The API answered with a non-2xx status.
    #[error("HTTP {0}: {1}")]
    Status(StatusCode, String),
    /// The response is not the expected JSON document.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use {super::*, crate::tests::mock, serde_json::json};

    #[tokio::test]
    async fn unexpected_body_is_a_json_error() {
        let addr = mock::setup(vec![mock::Expectation::Get {
            path: "/catalog".to_string(),
            res: json!(["not", "an", "object"]),
        }])
        .await;

        let result: Result<std::collections::BTreeMap<String, u64>, _> =
            roundtrip!(<_>; reqwest::Client::new().get(format!("http://{addr}/catalog"))).await;
        assert!(matches!(result, Err(Error::Json(_))));
    }
}

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::{Client, StatusCode};
use tracing::trace;
use url::Url;

use crate::{
    ByteStream,
    error::{NetError, NetResult},
    traits::Net,
    types::{Headers, NetOptions, RangeSpec},
};

#[derive(Clone, Debug)]
pub struct HttpClient {
    inner: Client,
    options: NetOptions,
}

impl HttpClient {
    /// # Panics
    ///
    /// Panics if the `reqwest::Client` builder fails to build.
    #[must_use]
    pub fn new(options: NetOptions) -> Self {
        Self::try_new(options).expect("failed to build reqwest client")
    }

    /// # Errors
    ///
    /// Returns [`NetError::Build`] if the TLS backend or resolver cannot be
    /// initialised.
    pub fn try_new(options: NetOptions) -> NetResult<Self> {
        let inner = Client::builder()
            .pool_max_idle_per_host(options.pool_max_idle_per_host)
            .user_agent(options.user_agent.clone())
            // A redirect is not the object itself; surface the 3xx.
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| NetError::Build(e.to_string()))?;
        Ok(Self { inner, options })
    }

    pub fn options(&self) -> &NetOptions {
        &self.options
    }

    fn apply_headers(
        mut req: reqwest::RequestBuilder,
        headers: Option<Headers>,
    ) -> reqwest::RequestBuilder {
        if let Some(headers) = headers {
            for (k, v) in headers.iter() {
                req = req.header(k, v);
            }
        }
        req
    }

    fn collect_headers(resp: &reqwest::Response) -> Headers {
        let mut out = Headers::new();
        for (name, value) in resp.headers() {
            if let Ok(v) = value.to_str() {
                out.insert(name.as_str(), v);
            }
        }
        out
    }
}

#[async_trait]
impl Net for HttpClient {
    async fn head(&self, url: Url, headers: Option<Headers>) -> Result<Headers, NetError> {
        let req = self.inner.head(url.clone());
        let req = Self::apply_headers(req, headers);
        let req = req.timeout(self.options.request_timeout);

        let resp = req.send().await.map_err(NetError::from)?;
        let status = resp.status();
        trace!(%url, status = status.as_u16(), "HEAD");

        if !status.is_success() {
            // HEAD responses carry no body.
            return Err(NetError::http_error(status.as_u16(), url, None));
        }

        Ok(Self::collect_headers(&resp))
    }

    async fn get_range(
        &self,
        url: Url,
        range: RangeSpec,
        headers: Option<Headers>,
    ) -> Result<ByteStream, NetError> {
        let req = self
            .inner
            .get(url.clone())
            .header("Range", range.to_header_value());
        let req = Self::apply_headers(req, headers);
        let req = req.timeout(self.options.request_timeout);

        let resp = req.send().await.map_err(NetError::from)?;
        let status = resp.status();
        trace!(%url, status = status.as_u16(), range = %range.to_header_value(), "GET");

        if !(status.is_success() || status == StatusCode::PARTIAL_CONTENT) {
            return Err(NetError::http_error(status.as_u16(), url, None));
        }

        let stream = resp.bytes_stream().map_err(NetError::from);
        Ok(Box::pin(stream))
    }
}

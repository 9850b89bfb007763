use serde::Serialize;
use serde::de::DeserializeOwned;
use sweepview_protocol::{ApiError, Endpoint, Result, decode_reply};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCredentials, RequestInit, Response};

/// JSON-over-`fetch` client for the game server.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ApiClient {
    base: String,
}

impl ApiClient {
    pub(crate) fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_owned(),
        }
    }

    pub(crate) fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base, endpoint.path())
    }

    pub(crate) async fn post<B, T>(&self, endpoint: Endpoint, body: &B) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_string(body)?;
        let url = self.url(endpoint);
        log::trace!("POST {} {}", url, payload);

        let text = fetch_text(&url, &payload).await.map_err(transport_error)?;
        log::trace!("reply from {}: {}", url, text);
        decode_reply(&text)
    }
}

fn transport_error(err: JsValue) -> ApiError {
    ApiError::Transport(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

/// Posts `payload` and returns the body text whatever the HTTP status; the
/// `status` field of the body decides success.
async fn fetch_text(url: &str, payload: &str) -> core::result::Result<String, JsValue> {
    let init = RequestInit::new();
    init.set_method("POST");
    // the server keys the game on a session cookie
    init.set_credentials(RequestCredentials::SameOrigin);
    init.set_body(&JsValue::from_str(payload));

    let request = Request::new_with_str_and_init(url, &init)?;
    request.headers().set("Content-Type", "application/json")?;

    let response: Response = JsFuture::from(gloo::utils::window().fetch_with_request(&request))
        .await?
        .dyn_into()?;
    let text = JsFuture::from(response.text()?).await?;
    text.as_string()
        .ok_or_else(|| JsValue::from_str("response body is not text"))
}

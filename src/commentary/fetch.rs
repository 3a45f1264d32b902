//! Browser transport using the Fetch API

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

use super::{CommentaryError, CommentaryTransport};

fn js_error(e: JsValue) -> CommentaryError {
    CommentaryError::Transport(format!("{:?}", e))
}

/// `window.fetch` transport
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

impl CommentaryTransport for FetchTransport {
    async fn post_json(&self, url: &str, api_key: &str, body: String) -> Result<String, CommentaryError> {
        let window = web_sys::window().ok_or_else(|| CommentaryError::Transport("no window".to_string()))?;

        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_body(&JsValue::from_str(&body));

        let request = Request::new_with_str_and_init(url, &opts).map_err(js_error)?;
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(js_error)?;
        request.headers().set("x-goog-api-key", api_key).map_err(js_error)?;

        let response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_error)?;
        let response: Response = response.dyn_into().map_err(js_error)?;

        if !response.ok() {
            return Err(CommentaryError::Status(response.status()));
        }

        let text = JsFuture::from(response.text().map_err(js_error)?)
            .await
            .map_err(js_error)?;
        text.as_string()
            .ok_or_else(|| CommentaryError::Decode("response body is not text".to_string()))
    }
}

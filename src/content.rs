use async_trait::async_trait;
use recueil_core::content::sanity::{self, SanityProject};
use recueil_core::{ContentItem, ContentLookup, ContentSource, InMemoryCatalog, LookupError};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// Catalog served by a Sanity project over HTTP.
pub struct SanityCatalog {
    project: SanityProject,
}

impl SanityCatalog {
    pub fn new(project: SanityProject) -> Self {
        Self { project }
    }

    fn query_url(&self, query: &str, params: &[(&str, String)]) -> String {
        let encode = |s: &str| String::from(js_sys::encode_uri_component(s));
        let mut url = format!("{}?query={}", self.project.query_endpoint(), encode(query));
        for (name, value) in params {
            url.push_str(&format!("&${}={}", name, encode(value)));
        }
        url
    }

    async fn get_text(&self, url: &str) -> Result<String, LookupError> {
        let window = web::window().ok_or_else(|| LookupError::Transport("no window".into()))?;
        let init = web::RequestInit::new();
        init.set_method("GET");
        init.set_mode(web::RequestMode::Cors);
        let request = web::Request::new_with_str_and_init(url, &init)
            .map_err(|e| LookupError::Transport(format!("{:?}", e)))?;
        let response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| LookupError::Transport(format!("{:?}", e)))?;
        let response: web::Response = response
            .dyn_into()
            .map_err(|e| LookupError::Transport(format!("{:?}", e)))?;
        if !response.ok() {
            return Err(LookupError::Status(response.status()));
        }
        let text = response
            .text()
            .map_err(|e| LookupError::Transport(format!("{:?}", e)))?;
        let text = JsFuture::from(text)
            .await
            .map_err(|e| LookupError::Transport(format!("{:?}", e)))?;
        text.as_string()
            .ok_or_else(|| LookupError::Transport("response body is not text".into()))
    }
}

#[async_trait(?Send)]
impl ContentLookup for SanityCatalog {
    async fn fetch_all(&self) -> Result<Vec<ContentItem>, LookupError> {
        let url = self.query_url(&sanity::all_poems_query(), &[]);
        let body = self.get_text(&url).await?;
        sanity::decode_all(&body)
    }

    async fn fetch_by_slug(&self, slug: &str) -> Result<Option<ContentItem>, LookupError> {
        let url = self.query_url(
            &sanity::poem_by_slug_query(),
            &[("slug", sanity::encode_param(slug)?)],
        );
        let body = self.get_text(&url).await?;
        sanity::decode_one(&body)
    }
}

pub fn lookup_for(source: &ContentSource) -> Box<dyn ContentLookup> {
    match source {
        ContentSource::InMemory => Box::new(InMemoryCatalog::with_default_poems()),
        ContentSource::Sanity(project) => {
            log::info!(
                "[content] using Sanity project {} ({})",
                project.project_id,
                project.dataset
            );
            Box::new(SanityCatalog::new(project.clone()))
        }
    }
}

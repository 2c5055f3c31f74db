//! Image (Glance v2) API client

use super::context::{join_url, OpenStackContext};
use super::error::ApiError;
use super::operations::ImageLookup;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ImageList {
    images: Vec<ImageSummary>,
}

#[derive(Debug, Deserialize)]
struct ImageSummary {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

/// Glance client for resolving image names
#[derive(Debug, Clone)]
pub struct ImageClient {
    ctx: OpenStackContext,
    endpoint: String,
}

impl ImageClient {
    /// Create a Glance client from a shared context and the image endpoint.
    pub fn from_context(ctx: &OpenStackContext, endpoint: impl Into<String>) -> Self {
        Self {
            ctx: ctx.clone(),
            endpoint: endpoint.into(),
        }
    }
}

impl ImageLookup for ImageClient {
    async fn find_image_id(&self, name: &str) -> Result<Option<String>, ApiError> {
        let url = join_url(&self.endpoint, "v2/images");
        let list: ImageList = self
            .ctx
            .get_json(
                &url,
                &[("name", name), ("member_status", "all")],
                "glance",
                "image",
                name,
            )
            .await?;

        let id = list
            .images
            .into_iter()
            .find(|image| image.name.as_deref() == Some(name))
            .map(|image| image.id);
        debug!(image = %name, id = ?id, "Resolved image");
        Ok(id)
    }
}

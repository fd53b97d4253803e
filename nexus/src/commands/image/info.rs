use super::{connect, emit, fail};
use crate::context::{AppContext, VerbosityLevel};
use crate::format::{self, Formattable, OutputFormat};
use libnexus::format::format_size;
use libnexus::{LayerSummary, RegistryApi};
use serde::Serialize;

/// Size breakdown of one tag.
#[derive(Debug, Clone, Serialize)]
pub struct ImageInfo {
    pub image: String,
    pub tag: String,
    pub digest: String,
    pub config_size: u64,
    pub total_size: u64,
    pub is_index: bool,
    pub layers: Vec<LayerSummary>,
}

impl Formattable for ImageInfo {
    fn format_pretty(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Image:  {}:{}\n", self.image, self.tag));
        output.push_str(&format!("Digest: {}\n", self.digest));

        if self.is_index {
            output.push_str(&format!("Platform manifests ({}):\n", self.layers.len()));
        } else {
            output.push_str(&format!("Config: {}\n", format_size(self.config_size)));
            output.push_str(&format!(
                "Size:   {} in {} layers\n",
                format_size(self.total_size),
                self.layers.len()
            ));
            output.push_str("Layers:\n");
        }

        for layer in &self.layers {
            output.push_str(&format!("  {}  {}\n", layer.digest, format_size(layer.size)));
        }

        output
    }
}

/// Digest and manifest summary of `image:tag`.
pub(crate) async fn image_info<R: RegistryApi>(
    registry: &R,
    image: &str,
    tag: &str,
) -> Result<ImageInfo, String> {
    let digest = registry
        .get_image_digest(image, tag)
        .await
        .map_err(|e| format!("Failed to resolve {}:{}: {}", image, tag, e))?;

    let summary = registry
        .get_manifest(image, tag)
        .await
        .map_err(|e| format!("Failed to fetch manifest of {}:{}: {}", image, tag, e))?;

    Ok(ImageInfo {
        image: image.to_string(),
        tag: tag.to_string(),
        digest: digest.to_string(),
        config_size: summary.config_size,
        total_size: summary.total_size(),
        is_index: summary.is_index,
        layers: summary.layers,
    })
}

/// Handle the image info command
pub async fn handle_image_info(ctx: &AppContext, image: &str, tag: &str, format: OutputFormat) {
    format::print(
        ctx,
        VerbosityLevel::Verbose,
        &format!("Fetching details for {}:{}", image, tag),
    );

    let registry = connect(ctx).unwrap_or_else(|e| fail(ctx, &e));
    let info = image_info(&registry, image, tag)
        .await
        .unwrap_or_else(|e| fail(ctx, &e));

    emit(ctx, format::format_output(&info, format));
}

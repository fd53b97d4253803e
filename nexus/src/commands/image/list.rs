use super::{connect, emit, fail};
use crate::context::{AppContext, VerbosityLevel};
use crate::format::{self, OutputFormat};
use libnexus::RegistryApi;
use serde::Serialize;
use tabled::Tabled;

/// One image (repository) of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct ImageItem {
    #[tabled(rename = "IMAGE")]
    pub name: String,
}

/// Images of the registry, sorted by name.
pub(crate) async fn list_images<R: RegistryApi>(registry: &R) -> Result<Vec<ImageItem>, String> {
    let mut names = registry
        .list_images()
        .await
        .map_err(|e| format!("Failed to list images: {}", e))?;
    names.sort();

    Ok(names.into_iter().map(|name| ImageItem { name }).collect())
}

/// Handle the image list command
pub async fn handle_image_list(ctx: &AppContext, format: OutputFormat, quiet: bool) {
    format::print(ctx, VerbosityLevel::Verbose, "Listing images from registry...");

    let registry = connect(ctx).unwrap_or_else(|e| fail(ctx, &e));

    let formatter = format::create_formatter(ctx);
    let spinner = formatter.spinner("Fetching images...");
    let result = list_images(&registry).await;
    formatter.finish_progress(spinner);

    let images = result.unwrap_or_else(|e| fail(ctx, &e));

    if quiet {
        for image in images {
            println!("{}", image.name);
        }
        return;
    }

    if images.is_empty() && format == OutputFormat::Pretty {
        println!("No images found.");
        return;
    }

    emit(ctx, format::format_table(&images, format));
    if format == OutputFormat::Pretty {
        println!("Total images: {}", images.len());
    }
}

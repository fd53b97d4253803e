use super::{connect, emit, fail, resolve_excludes, resolve_strategy, with_implicit_exclude};
use crate::context::{AppContext, VerbosityLevel};
use crate::format::{self, OutputFormat};
use libnexus::RegistryApi;
use libnexus::retention::{SortStrategy, sort_tags};
use serde::Serialize;
use tabled::Tabled;

/// One tag of an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct TagItem {
    #[tabled(rename = "TAG")]
    pub tag: String,
}

/// Tags of `image`, oldest first under `strategy`.
///
/// Names in `protected` sort after every other tag.
pub(crate) async fn list_tags<R: RegistryApi>(
    registry: &R,
    image: &str,
    strategy: SortStrategy,
    protected: &[String],
) -> Result<Vec<TagItem>, String> {
    let mut tags = registry
        .list_tags_by_image(image)
        .await
        .map_err(|e| format!("Failed to list tags for {}: {}", image, e))?;

    sort_tags(&mut tags, strategy, protected);

    Ok(tags.into_iter().map(|tag| TagItem { tag }).collect())
}

/// Handle the image tags command
pub async fn handle_image_tags(
    ctx: &AppContext,
    image: &str,
    sort: Option<&str>,
    exclude: &[String],
    format: OutputFormat,
    quiet: bool,
) {
    let strategy = resolve_strategy(ctx, sort);
    let protected = with_implicit_exclude(resolve_excludes(ctx, exclude));

    format::print(
        ctx,
        VerbosityLevel::Verbose,
        &format!("Listing tags for image: {} (sort: {})", image, strategy),
    );

    let registry = connect(ctx).unwrap_or_else(|e| fail(ctx, &e));

    let formatter = format::create_formatter(ctx);
    let spinner = formatter.spinner(&format!("Fetching tags for {}...", image));
    let result = list_tags(&registry, image, strategy, &protected).await;
    formatter.finish_progress(spinner);

    let tags = result.unwrap_or_else(|e| fail(ctx, &e));

    if quiet {
        for item in tags {
            println!("{}", item.tag);
        }
        return;
    }

    if tags.is_empty() && format == OutputFormat::Pretty {
        println!("No tags found for {}.", image);
        return;
    }

    emit(ctx, format::format_table(&tags, format));
    if format == OutputFormat::Pretty {
        println!("There are {} tags for {}", tags.len(), image);
    }
}

use super::{connect, emit, fail, resolve_excludes, resolve_strategy};
use crate::context::{AppContext, VerbosityLevel};
use crate::format::{self, Formattable, OutputFormat};
use libnexus::retention::{
    DeletionState, KeepSpec, RetentionPolicy, RetentionReport, RetentionRequest,
    SingleTagDeletion, SortStrategy, apply_retention, parse_keep_specs,
};
use libnexus::{NexusError, RegistryApi};
use serde::Serialize;
use tabled::Tabled;

/// Flags of `nexus image delete`.
#[derive(Debug, Clone, Default)]
pub struct DeleteOptions {
    /// Delete exactly this tag
    pub tag: Option<String>,
    /// Keep list such as `prod,stage:3,others:5`
    pub keep: Option<String>,
    /// `semver` or `nosemver`
    pub sort: Option<String>,
    /// Tags never to delete
    pub exclude: Vec<String>,
    /// Print the plan without deleting
    pub dry_run: bool,
}

/// A tag chosen for deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct PlannedRow {
    #[tabled(rename = "TAG")]
    pub tag: String,
    #[tabled(rename = "GROUP")]
    pub group: String,
    #[tabled(rename = "DIGEST")]
    pub digest: String,
}

/// Outcome of `nexus image delete`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeleteSummary {
    pub image: String,
    pub dry_run: bool,
    pub planned: Vec<PlannedRow>,
    pub retained: Vec<String>,
    pub deleted: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
    pub warnings: Vec<String>,
}

impl DeleteSummary {
    /// Builds the summary of a retention run.
    pub fn from_report(
        image: &str,
        dry_run: bool,
        report: &RetentionReport,
        spec_errors: &[NexusError],
    ) -> Self {
        let planned = report
            .planned()
            .entries()
            .iter()
            .map(|entry| PlannedRow {
                tag: entry.tag.clone(),
                group: entry.group.clone(),
                digest: entry.digest.to_string(),
            })
            .collect();

        let retained = report
            .plans
            .iter()
            .flat_map(|plan| plan.retain.iter().cloned())
            .collect();

        let warnings = spec_errors
            .iter()
            .chain(report.exclusion_warnings.iter())
            .map(ToString::to_string)
            .collect();

        let mut failed: Vec<String> = report
            .exclusion_failures
            .iter()
            .map(ToString::to_string)
            .collect();
        failed.extend(
            report
                .group_failures
                .iter()
                .map(|(group, e)| format!("group '{}': {}", group, e)),
        );

        let (deleted, skipped) = match &report.deletions {
            Some(deletions) => {
                failed.extend(deletions.failed.iter().map(ToString::to_string));
                (deletions.deleted.clone(), deletions.skipped.clone())
            }
            None => (Vec::new(), Vec::new()),
        };

        Self {
            image: image.to_string(),
            dry_run,
            planned,
            retained,
            deleted,
            skipped,
            failed,
            warnings,
        }
    }

    /// Returns true if an exclusion, a group or a tag failed.
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

impl Formattable for DeleteSummary {
    fn format_pretty(&self) -> String {
        let mut output = String::new();

        if self.planned.is_empty() {
            output.push_str(&format!("Nothing to delete for {}\n", self.image));
        } else {
            use tabled::{Table, settings::Style};
            output.push_str(&Table::new(&self.planned).with(Style::empty()).to_string());
            output.push('\n');
        }

        if !self.retained.is_empty() {
            output.push_str(&format!("Retained: {}\n", self.retained.join(", ")));
        }

        if self.dry_run {
            output.push_str(&format!(
                "Dry run: {} tags of {} would be deleted\n",
                self.planned.len(),
                self.image
            ));
        } else {
            output.push_str(&format!(
                "Deleted {} of {} planned tags of {}\n",
                self.deleted.len(),
                self.planned.len(),
                self.image
            ));
            if !self.skipped.is_empty() {
                output.push_str(&format!("Skipped (protected): {}\n", self.skipped.join(", ")));
            }
        }

        output
    }
}

/// Applies the keep list `keep` to `image`.
///
/// Fails when no keep spec survives parsing, so a typo cannot turn into
/// "keep nothing".
pub(crate) async fn run_retention<R: RegistryApi>(
    registry: &R,
    image: &str,
    keep: &str,
    policy: impl FnOnce(Vec<KeepSpec>) -> RetentionPolicy,
    strategy: SortStrategy,
    exclude: Vec<String>,
    dry_run: bool,
) -> Result<DeleteSummary, String> {
    let (specs, spec_errors) = parse_keep_specs(keep);
    if specs.is_empty() {
        let reasons: Vec<String> = spec_errors.iter().map(ToString::to_string).collect();
        return Err(format!(
            "No usable keep specification in '{}'{}",
            keep,
            if reasons.is_empty() {
                String::new()
            } else {
                format!(": {}", reasons.join("; "))
            }
        ));
    }

    let request = RetentionRequest {
        policy: policy(specs),
        strategy,
        exclude,
        dry_run,
    };

    let report = apply_retention(registry, image, &request)
        .await
        .map_err(|e| format!("Failed to apply retention to {}: {}", image, e))?;

    Ok(DeleteSummary::from_report(image, dry_run, &report, &spec_errors))
}

/// Deletes the single tag `image:tag`, exclusions notwithstanding.
///
/// The tag must be listed on the image before anything else happens; a dry
/// run stops right before the delete request.
pub(crate) async fn delete_tag<R: RegistryApi>(
    registry: &R,
    image: &str,
    tag: &str,
    dry_run: bool,
) -> Result<DeleteSummary, String> {
    let mut deletion = SingleTagDeletion::new(image, tag);
    while !deletion.state().is_terminal()
        && !matches!(deletion.state(), DeletionState::IssueDelete)
    {
        deletion.step(registry).await;
    }
    if let DeletionState::Failed(e) = deletion.state() {
        return Err(format!("Cannot delete {}:{}: {}", image, tag, e));
    }

    let digest = registry
        .get_image_digest(image, tag)
        .await
        .map_err(|e| format!("Failed to resolve {}:{}: {}", image, tag, e))?;

    let mut summary = DeleteSummary {
        image: image.to_string(),
        dry_run,
        planned: vec![PlannedRow {
            tag: tag.to_string(),
            group: "-".to_string(),
            digest: digest.to_string(),
        }],
        ..Default::default()
    };

    if dry_run {
        return Ok(summary);
    }

    match deletion.run(registry).await {
        Ok(()) => summary.deleted.push(tag.to_string()),
        Err(e) => summary.failed.push(e.to_string()),
    }

    Ok(summary)
}

/// Handle the image delete command
pub async fn handle_image_delete(
    ctx: &AppContext,
    image: &str,
    options: DeleteOptions,
    format: OutputFormat,
) {
    let registry = connect(ctx).unwrap_or_else(|e| fail(ctx, &e));

    let result = match (&options.tag, &options.keep) {
        (Some(tag), _) => {
            format::print(
                ctx,
                VerbosityLevel::Verbose,
                &format!("Deleting {}:{}", image, tag),
            );
            delete_tag(&registry, image, tag, options.dry_run).await
        }
        (None, Some(keep)) => {
            let strategy = resolve_strategy(ctx, options.sort.as_deref());
            let exclude = resolve_excludes(ctx, &options.exclude);
            format::print(
                ctx,
                VerbosityLevel::Verbose,
                &format!(
                    "Applying keep '{}' to {} (sort: {}, exclude: {})",
                    keep,
                    image,
                    strategy,
                    if exclude.is_empty() {
                        "latest".to_string()
                    } else {
                        exclude.join(",")
                    }
                ),
            );

            let formatter = format::create_formatter(ctx);
            let spinner = formatter.spinner(&format!("Planning deletions for {}...", image));
            let result = run_retention(
                &registry,
                image,
                keep,
                |specs| ctx.config.retention_policy(specs),
                strategy,
                exclude,
                options.dry_run,
            )
            .await;
            formatter.finish_progress(spinner);
            result
        }
        (None, None) => Err("Specify either --tag or --keep".to_string()),
    };

    let summary = result.unwrap_or_else(|e| fail(ctx, &e));

    if format == OutputFormat::Pretty {
        for warning in &summary.warnings {
            format::warning(ctx, warning);
        }
    }

    emit(ctx, format::format_output(&summary, format));

    if summary.has_failures() {
        if format == OutputFormat::Pretty {
            for failure in &summary.failed {
                format::error(ctx, failure);
            }
        }
        std::process::exit(1);
    }
}

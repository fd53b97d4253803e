//! Dry run of a retention policy against a live registry.
//!
//! Prints, per image, which tags a `prod,stage:3,others:5` policy would
//! delete. Nothing is deleted.
//!
//! Run with: cargo run --example retention_dry_run -- http://localhost:8081/repository/docker-hosted

use libnexus::retention::{RetentionPolicy, RetentionRequest, apply_retention, parse_keep_specs};
use libnexus::{RegistryApi, RegistryBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:5000".to_string());

    let registry = RegistryBuilder::new().registry_url(&url).build()?;

    let images = match registry.list_images().await {
        Ok(images) => images,
        Err(e) => {
            eprintln!("✗ Failed to list images: {}", e);
            eprintln!("  Make sure a registry is running at {}", url);
            return Ok(());
        }
    };
    println!("✓ Connected to registry: {}\n", registry.url());

    let (specs, errors) = parse_keep_specs("prod,stage:3,others:5");
    for error in errors {
        eprintln!("✗ {}", error);
    }
    let request = RetentionRequest {
        policy: RetentionPolicy::new(specs),
        dry_run: true,
        ..Default::default()
    };

    for image in images {
        match apply_retention(&registry, &image, &request).await {
            Ok(report) => {
                let plan = report.planned();
                println!("{}: {} tag(s) would be deleted", image, plan.len());
                for entry in plan.entries() {
                    println!("  - {}:{} ({})", image, entry.tag, entry.group);
                }
                for (group, error) in &report.group_failures {
                    println!("  ✗ group {}: {}", group, error);
                }
            }
            Err(e) => println!("✗ {}: {}", image, e),
        }
    }

    Ok(())
}

//! Deleting one named tag.

use super::RegistryApi;
use crate::error::{NexusError, Result};

/// Where a [`SingleTagDeletion`] is.
#[derive(Debug)]
pub enum DeletionState {
    /// Checking that an image name was given
    ResolveImageName,
    /// Checking that the tag exists on the image
    ValidateTagPresent,
    /// Sending the delete request
    IssueDelete,
    /// The tag was deleted
    Done,
    /// The deletion stopped with an error
    Failed(NexusError),
}

impl DeletionState {
    /// Returns true for `Done` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeletionState::Done | DeletionState::Failed(_))
    }
}

/// Deletes `image:tag` without applying any retention logic.
///
/// # Examples
///
/// ```no_run
/// # use libnexus::{Client, Registry};
/// # use libnexus::retention::SingleTagDeletion;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = Registry::new(Client::new("localhost:8081/repository/docker", None)?);
/// SingleTagDeletion::new("app", "1.0.0").run(&registry).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SingleTagDeletion {
    image: String,
    tag: String,
    state: DeletionState,
}

impl SingleTagDeletion {
    /// Creates a deletion in the `ResolveImageName` state.
    pub fn new(image: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            tag: tag.into(),
            state: DeletionState::ResolveImageName,
        }
    }

    /// Current state.
    pub fn state(&self) -> &DeletionState {
        &self.state
    }

    /// Advances one state. Terminal states stay where they are.
    pub async fn step<R: RegistryApi>(&mut self, registry: &R) {
        let next = match &self.state {
            DeletionState::ResolveImageName => {
                if self.image.trim().is_empty() {
                    DeletionState::Failed(NexusError::validation("Image name must not be empty"))
                } else if self.tag.trim().is_empty() {
                    DeletionState::Failed(NexusError::validation("Tag must not be empty"))
                } else {
                    DeletionState::ValidateTagPresent
                }
            }
            DeletionState::ValidateTagPresent => {
                match registry.list_tags_by_image(&self.image).await {
                    Ok(tags) if tags.iter().any(|t| t == &self.tag) => DeletionState::IssueDelete,
                    Ok(_) => DeletionState::Failed(NexusError::not_found(
                        "tag",
                        format!("{}:{}", self.image, self.tag),
                    )),
                    Err(e) => DeletionState::Failed(e),
                }
            }
            DeletionState::IssueDelete => {
                match registry.delete_image_by_tag(&self.image, &self.tag).await {
                    Ok(()) => {
                        tracing::info!(image = %self.image, tag = %self.tag, "deleted");
                        DeletionState::Done
                    }
                    Err(e) => DeletionState::Failed(NexusError::delete(self.tag.as_str(), e)),
                }
            }
            DeletionState::Done | DeletionState::Failed(_) => return,
        };

        self.state = next;
    }

    /// Runs to a terminal state.
    pub async fn run<R: RegistryApi>(mut self, registry: &R) -> Result<()> {
        while !self.state.is_terminal() {
            self.step(registry).await;
        }

        match self.state {
            DeletionState::Failed(e) => Err(e),
            _ => Ok(()),
        }
    }
}

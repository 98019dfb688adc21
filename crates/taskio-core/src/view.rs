use std::rc::Rc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::FetchError;

/// Read access to the static view fragments.
#[async_trait(?Send)]
pub trait FragmentSource {
    async fn fetch(&self, name: &str) -> Result<String, FetchError>;
}

/// Fragment used for the task create/edit form, in the modal and on the
/// `taskNew` page.
pub const TASK_FORM_FRAGMENT: &str = "taskNew";

/// Relative URL of a fragment under the configured views directory.
pub fn fragment_path(base_path: &str, name: &str) -> String {
    let base = base_path.trim_end_matches('/');
    if base.is_empty() {
        format!("{name}.html")
    } else {
        format!("{base}/{name}.html")
    }
}

/// Loads fragments without caching; every activation refetches.
#[derive(Clone)]
pub struct ViewLoader {
    source: Rc<dyn FragmentSource>,
}

impl ViewLoader {
    pub fn new(source: Rc<dyn FragmentSource>) -> Self {
        Self { source }
    }

    #[tracing::instrument(skip(self))]
    pub async fn load_fragment(&self, name: &str) -> Result<String, FetchError> {
        let text = self.source.fetch(name).await?;
        debug!(bytes = text.len(), "fragment loaded");
        Ok(text)
    }
}

/// A storage unit owned by a stack.
///
/// Never created directly: the bucket name is resolved from the owning
/// stack's outputs, and the handle exists only so teardown can purge the
/// bucket before the stack itself is deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageUnit {
    /// Output key of the owning stack whose value is the bucket name.
    pub output_key: String,

    /// Whether the bucket keeps object versions. A versioned bucket holds
    /// delete markers in addition to payload versions; both block deletion.
    pub versioned: bool,

    /// Object retention in days, where the template configures expiry.
    pub retention_days: Option<u32>,
}

impl StorageUnit {
    pub fn new(output_key: impl Into<String>) -> Self {
        Self {
            output_key: output_key.into(),
            versioned: true,
            retention_days: None,
        }
    }

    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = Some(days);
        self
    }
}

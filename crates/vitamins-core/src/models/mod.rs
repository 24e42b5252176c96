pub mod crumb;
pub mod node;
pub mod raw_error;

pub use crumb::{Metadata, MetadataValue, TrailEntry};
pub use node::{ErrorDetails, ErrorNode};
pub use raw_error::{RawError, Reportable};

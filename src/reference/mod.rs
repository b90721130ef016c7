//! Reference resolution: detectors and their priority cascade

mod cascade;
mod detector;
mod identity_name;

pub use cascade::CascadingReferenceDetector;
pub use detector::{MappedReferenceDetector, ReferenceDetector};
pub use identity_name::IdentityNameReferenceDetector;

pub mod volume_grouper;
pub mod volume_pattern;

pub use volume_grouper::{GroupReport, VolumeGroup, VolumeGrouper};
pub use volume_pattern::VolumePattern;

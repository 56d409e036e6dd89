pub mod corner_extractor;
pub mod geometry;
pub mod grouping_orchestrator;
pub mod image_helper;
pub mod mbr;
pub mod naming;
pub mod proximity_grouper;

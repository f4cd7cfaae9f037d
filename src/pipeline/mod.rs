pub mod stage1_percentile;
pub mod stage2_distribution;
pub mod stage3_layout;
pub mod stage4_report;

use std::sync::LazyLock;
use target_panel::TargetPanel;

pub use plate384_protocol as protocol;

pub mod about;
pub mod coordinate_mapper;
pub mod empty_well_filler;
pub mod error;
pub mod parameters;
pub mod plate_converter;
pub mod plate_template;
pub mod results_average;
pub mod sample_setup;
pub mod target_panel;
pub mod well_record;

// Built-in target/reporter panel
pub static DEFAULT_TARGET_PANEL: LazyLock<TargetPanel> = LazyLock::new(TargetPanel::default);

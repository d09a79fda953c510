mod dataset;
mod filter;
mod loader;
mod record;
mod selection;
#[cfg(test)]
pub(crate) mod testdata;
mod view;

pub use dataset::Dataset;
pub use filter::{derive_sub_areas, filter_records, top_areas};
pub use record::{AreaKind, PopulationRecord, RegionMode};
pub use selection::SelectionState;
pub use view::{
    PyramidChart, PyramidFrame, TrendChart, TrendPoint, TrendSeries, compose_pyramid,
    compose_trend,
};

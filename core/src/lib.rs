mod dashboard;
mod population;
mod reactive;

pub use dashboard::{
    ControlTree, Dashboard, InputEvent, MunicipalControls, OutputKind, OutputUpdate,
    PrefectureControls, SubAreaOptions, ViewPayload,
};
pub use population::{
    AreaKind, Dataset, PopulationRecord, PyramidChart, PyramidFrame, RegionMode, SelectionState,
    TrendChart, TrendPoint, TrendSeries, compose_pyramid, compose_trend, derive_sub_areas,
    filter_records, top_areas,
};
pub use reactive::{NodeId, ReactiveGraph, Recompute};

// Domain layer: dataset rows, filter selections, page reports and ports (interfaces).

pub mod model;
pub mod ports;
pub mod report;
pub mod selection;

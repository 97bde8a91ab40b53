// Domain layer: layout/project models and the ports the export pipeline is written against.

pub mod model;
pub mod ports;

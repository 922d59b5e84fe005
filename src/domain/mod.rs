// Domain layer: record model, filter/aggregation specs and ports.
// No dependencies beyond std/serde.

pub mod model;
pub mod ports;

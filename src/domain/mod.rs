// Domain layer: models, typed preferences and ports. The engine in `core` only talks to
// the catalog through these traits.

pub mod model;
pub mod ports;
pub mod preferences;

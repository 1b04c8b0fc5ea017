// Domain layer: vacancy models and the ports the core implements.

pub mod model;
pub mod ports;

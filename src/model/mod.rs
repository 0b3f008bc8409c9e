//! Resolved harness model

mod appearance;
mod cable;
mod component;
mod connection;
mod connector;
mod harness;
mod part;
mod quantity;

pub use appearance::Appearance;
pub use cable::{Cable, CableCategory, PinRef, Wire, WireLink, SHIELD_ID};
pub(crate) use cable::cable_scope;
pub use component::{build_components, AdditionalComponent, OwnerKind, QtyMultiplier};
pub use connection::{ComponentKind, Connection, Endpoint};
pub use connector::{Connector, ConnectorStyle, Loop, Pin, Side};
pub(crate) use connector::connector_scope;
pub use harness::Harness;
pub use part::PartNumber;
pub use quantity::Quantity;

//! bop-sim: boundary records, ports, the per-module run loop and the module
//! network.
//!
//! - `boundary`: the record passed between neighbors
//! - `port` + `sync`: single-slot channel pairs and the three-phase handshake
//! - `module`: the `Module` trait every plant component implements
//! - `run`: run configuration and the per-module loop
//! - `network`: wiring, schedule checks, one thread per module
//! - `modules`: water heater, steamer, turbine, pipe, cooling tower, source

pub mod boundary;
pub mod error;
pub mod module;
pub mod modules;
pub mod network;
pub mod port;
pub mod run;
pub mod sync;

pub use boundary::{BoundaryCondition, Field, RecordDefect};
pub use error::{SimError, SimResult};
pub use module::{Module, publish_from_phase};
pub use network::{Connection, ModuleReport, Network, NetworkReport};
pub use port::{PortDirection, PortSpec, Reply, SyncPolicy};
pub use run::{LoopOrder, RunConfig, RunSummary, ShowTime, run_module};
pub use sync::PortSet;

//! Port declarations and the channel pair behind each bound link.
//!
//! A link joins one outflow port (the producer) to one inflow port (the
//! consumer) with two single-slot channels: requests carry the consumer's
//! local time upstream, replies carry `(row_time, record)` downstream.

use crate::boundary::{BoundaryCondition, Field};
use bop_core::numeric::TIME_TOLERANCE;
use crossbeam::channel::{Receiver, Sender, bounded};

/// Reply times may exceed the request by at most this much under `Lagging`
/// (history row matching tolerance).
pub const ORDER_TOLERANCE: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortDirection {
    Inflow,
    Outflow,
}

/// How an inflow port checks the time stamp of a reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SyncPolicy {
    /// Both sides advance together: |t_reply - t_request| <= 1e-6.
    #[default]
    Lockstep,
    /// The producer may trail the consumer: t_reply <= t_request.
    Lagging,
}

impl SyncPolicy {
    pub fn accepts(self, requested: f64, replied: f64) -> bool {
        match self {
            SyncPolicy::Lockstep => (replied - requested).abs() <= TIME_TOLERANCE,
            SyncPolicy::Lagging => replied <= requested + ORDER_TOLERANCE,
        }
    }
}

/// A port a module expects, in the order it will be visited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortSpec {
    pub name: &'static str,
    pub direction: PortDirection,
    pub policy: SyncPolicy,
    /// Optional fields an inflow record must carry.
    pub requires: &'static [Field],
}

impl PortSpec {
    pub const fn inflow(name: &'static str) -> Self {
        Self {
            name,
            direction: PortDirection::Inflow,
            policy: SyncPolicy::Lockstep,
            requires: &[],
        }
    }

    pub const fn outflow(name: &'static str) -> Self {
        Self {
            name,
            direction: PortDirection::Outflow,
            policy: SyncPolicy::Lockstep,
            requires: &[],
        }
    }

    pub const fn lagging(mut self) -> Self {
        self.policy = SyncPolicy::Lagging;
        self
    }

    pub const fn requiring(mut self, fields: &'static [Field]) -> Self {
        self.requires = fields;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reply {
    /// Time of the history row the record was taken from.
    pub time: f64,
    pub record: BoundaryCondition,
}

/// Consumer end of a link.
#[derive(Debug)]
pub struct InflowEndpoint {
    pub(crate) requests: Sender<f64>,
    pub(crate) replies: Receiver<Reply>,
}

/// Producer end of a link.
#[derive(Debug)]
pub struct OutflowEndpoint {
    pub(crate) requests: Receiver<f64>,
    pub(crate) replies: Sender<Reply>,
}

/// Create the two ends of one link.
pub fn link() -> (InflowEndpoint, OutflowEndpoint) {
    let (req_tx, req_rx) = bounded(1);
    let (rep_tx, rep_rx) = bounded(1);
    (
        InflowEndpoint {
            requests: req_tx,
            replies: rep_rx,
        },
        OutflowEndpoint {
            requests: req_rx,
            replies: rep_tx,
        },
    )
}

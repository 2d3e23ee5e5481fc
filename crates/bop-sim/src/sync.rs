//! Three-phase port synchronization.
//!
//! Every call visits all bound ports of one module:
//! 1. post the local time as a request on every inflow port,
//! 2. answer the request waiting on every outflow port,
//! 3. receive, validate and apply the reply on every inflow port.
//!
//! Requests are all posted before any reply is awaited, so any connection
//! graph, cyclic ones included, advances without deadlock.

use crate::boundary::RecordDefect;
use crate::error::{SimError, SimResult};
use crate::module::Module;
use crate::port::{InflowEndpoint, ORDER_TOLERANCE, OutflowEndpoint, PortSpec, Reply};
use bop_results::HistoryError;

#[derive(Debug)]
struct BoundInflow {
    spec: PortSpec,
    peer: String,
    end: InflowEndpoint,
}

#[derive(Debug)]
struct BoundOutflow {
    spec: PortSpec,
    peer: String,
    end: OutflowEndpoint,
}

/// The bound ports of one module.
#[derive(Debug, Default)]
pub struct PortSet {
    inflows: Vec<BoundInflow>,
    outflows: Vec<BoundOutflow>,
}

impl PortSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_inflow(&mut self, spec: PortSpec, peer: impl Into<String>, end: InflowEndpoint) {
        self.inflows.push(BoundInflow {
            spec,
            peer: peer.into(),
            end,
        });
    }

    pub fn bind_outflow(&mut self, spec: PortSpec, peer: impl Into<String>, end: OutflowEndpoint) {
        self.outflows.push(BoundOutflow {
            spec,
            peer: peer.into(),
            end,
        });
    }

    /// Order bound ports like the module declares them.
    pub fn sort_by(&mut self, declared: &[PortSpec]) {
        let rank = |name: &str| declared.iter().position(|p| p.name == name).unwrap_or(usize::MAX);
        self.inflows.sort_by_key(|p| rank(p.spec.name));
        self.outflows.sort_by_key(|p| rank(p.spec.name));
    }

    pub fn is_empty(&self) -> bool {
        self.inflows.is_empty() && self.outflows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inflows.len() + self.outflows.len()
    }

    /// Exchange boundary records with every neighbor at local `time`.
    pub fn sync(&self, module: &mut dyn Module, time: f64) -> SimResult<()> {
        if self.is_empty() {
            return Ok(());
        }
        let name = module.name().to_string();

        for port in &self.inflows {
            port.end
                .requests
                .send(time)
                .map_err(|_| disconnected(&name, port.spec.name))?;
        }

        for port in &self.outflows {
            let requested = port
                .end
                .requests
                .recv()
                .map_err(|_| disconnected(&name, port.spec.name))?;
            let reply = module
                .publish(port.spec.name, requested)
                .map_err(|e| serve_error(e, &name, port))?;
            if reply.time > requested + ORDER_TOLERANCE {
                return Err(SimError::SynchronizationMismatch {
                    module: name,
                    port: port.spec.name.to_string(),
                    message: format!(
                        "served row at t={} for a request at t={requested}",
                        reply.time
                    ),
                });
            }
            tracing::trace!(module = %name, port = port.spec.name, requested, row = reply.time, "served");
            port.end
                .replies
                .send(reply)
                .map_err(|_| disconnected(&name, port.spec.name))?;
        }

        for port in &self.inflows {
            let Reply { time: replied, record } = port
                .end
                .replies
                .recv()
                .map_err(|_| disconnected(&name, port.spec.name))?;
            if !port.spec.policy.accepts(time, replied) {
                return Err(SimError::SynchronizationMismatch {
                    module: name,
                    port: port.spec.name.to_string(),
                    message: format!(
                        "requested t={time}, {} replied with t={replied} ({:?})",
                        port.peer, port.spec.policy
                    ),
                });
            }
            record.check(port.spec.requires).map_err(|defect| match defect {
                RecordDefect::Missing(field) => SimError::MissingField {
                    module: name.clone(),
                    port: port.spec.name.to_string(),
                    field,
                },
                RecordDefect::Invalid(what) => SimError::InvalidRecord {
                    module: name.clone(),
                    port: port.spec.name.to_string(),
                    what,
                },
            })?;
            module.accept(port.spec.name, record)?;
        }
        Ok(())
    }
}

fn disconnected(module: &str, port: &str) -> SimError {
    SimError::PeerDisconnected {
        module: module.to_string(),
        port: port.to_string(),
    }
}

fn serve_error(err: SimError, module: &str, port: &BoundOutflow) -> SimError {
    match err {
        SimError::History(HistoryError::NoRowAtOrBefore { time, first }) => {
            SimError::SynchronizationMismatch {
                module: module.to_string(),
                port: port.spec.name.to_string(),
                message: format!(
                    "{} requested t={time}, history starts at t={first}",
                    port.peer
                ),
            }
        }
        other => other,
    }
}

//! Module network: wiring, schedule checks and the threaded run.
//!
//! Each module runs its own loop on a scoped thread; the only shared state is
//! the property oracle behind an `Arc`. A failing module drops its ports,
//! which unblocks and stops its neighbors with `PeerDisconnected`. The error
//! reported for the run is the first one that is not such a disconnect.

use crate::error::{SimError, SimResult};
use crate::module::Module;
use crate::port::{PortDirection, PortSpec, link};
use crate::run::{RunSummary, run_module};
use crate::sync::PortSet;
use bop_results::Phase;
use std::collections::HashSet;
use std::thread;

/// One directed producer → consumer binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connection {
    pub producer: usize,
    pub outflow: &'static str,
    pub consumer: usize,
    pub inflow: &'static str,
}

#[derive(Default)]
pub struct Network {
    modules: Vec<Box<dyn Module>>,
    connections: Vec<Connection>,
    bound: HashSet<(usize, &'static str)>,
}

#[derive(Clone, Debug)]
pub struct ModuleReport {
    pub name: String,
    pub kind: String,
    pub summary: RunSummary,
    pub phases: Vec<(String, Phase)>,
}

impl ModuleReport {
    fn capture(module: &dyn Module, summary: RunSummary) -> Self {
        Self {
            name: module.name().to_string(),
            kind: module.kind().to_string(),
            summary,
            phases: module
                .phases()
                .into_iter()
                .map(|(name, phase)| (name.to_string(), phase.clone()))
                .collect(),
        }
    }

    pub fn phase(&self, name: &str) -> Option<&Phase> {
        self.phases.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }
}

#[derive(Clone, Debug, Default)]
pub struct NetworkReport {
    pub modules: Vec<ModuleReport>,
}

impl NetworkReport {
    pub fn module(&self, name: &str) -> Option<&ModuleReport> {
        self.modules.iter().find(|m| m.name == name)
    }
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_module(&mut self, module: Box<dyn Module>) -> SimResult<usize> {
        if self.index_of(module.name()).is_ok() {
            return Err(SimError::DuplicateModule {
                name: module.name().to_string(),
            });
        }
        self.modules.push(module);
        Ok(self.modules.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    fn index_of(&self, name: &str) -> SimResult<usize> {
        self.modules
            .iter()
            .position(|m| m.name() == name)
            .ok_or_else(|| SimError::UnknownModule {
                name: name.to_string(),
            })
    }

    fn port_of(&self, module: usize, port: &str) -> SimResult<PortSpec> {
        let m = &self.modules[module];
        m.ports()
            .iter()
            .find(|p| p.name == port)
            .copied()
            .ok_or_else(|| SimError::UnknownPort {
                module: m.name().to_string(),
                port: port.to_string(),
            })
    }

    /// Bind an outflow port to an inflow port.
    ///
    /// The two ends may be given in either order; each port binds once.
    pub fn connect(&mut self, a: (&str, &str), b: (&str, &str)) -> SimResult<()> {
        let (ia, ib) = (self.index_of(a.0)?, self.index_of(b.0)?);
        if ia == ib {
            return Err(SimError::InvalidConnection {
                from: endpoint(a),
                to: endpoint(b),
                what: "a module cannot feed itself",
            });
        }
        let (pa, pb) = (self.port_of(ia, a.1)?, self.port_of(ib, b.1)?);
        let (producer, outflow, consumer, inflow) = match (pa.direction, pb.direction) {
            (PortDirection::Outflow, PortDirection::Inflow) => (ia, pa, ib, pb),
            (PortDirection::Inflow, PortDirection::Outflow) => (ib, pb, ia, pa),
            _ => {
                return Err(SimError::InvalidConnection {
                    from: endpoint(a),
                    to: endpoint(b),
                    what: "one end must be an outflow and the other an inflow",
                });
            }
        };
        for (module, port) in [(producer, outflow.name), (consumer, inflow.name)] {
            if self.bound.contains(&(module, port)) {
                return Err(SimError::PortAlreadyBound {
                    module: self.modules[module].name().to_string(),
                    port: port.to_string(),
                });
            }
        }
        self.bound.insert((producer, outflow.name));
        self.bound.insert((consumer, inflow.name));
        tracing::debug!(
            from = %endpoint((self.modules[producer].name(), outflow.name)),
            to = %endpoint((self.modules[consumer].name(), inflow.name)),
            "connected"
        );
        self.connections.push(Connection {
            producer,
            outflow: outflow.name,
            consumer,
            inflow: inflow.name,
        });
        Ok(())
    }

    /// Connected modules must run the same number of steps, or one of them
    /// would block forever on a handshake the other never makes.
    pub fn check_schedules(&self) -> SimResult<()> {
        for module in &self.modules {
            module.config().validate()?;
        }
        for c in &self.connections {
            let a = &self.modules[c.producer];
            let b = &self.modules[c.consumer];
            let (a_steps, b_steps) = (a.config().step_count(), b.config().step_count());
            if a_steps != b_steps {
                return Err(SimError::ScheduleMismatch {
                    a: a.name().to_string(),
                    a_steps,
                    b: b.name().to_string(),
                    b_steps,
                });
            }
        }
        Ok(())
    }

    /// Run every module to its end time and collect the histories.
    pub fn run(self) -> SimResult<NetworkReport> {
        self.check_schedules()?;
        let Network {
            modules,
            connections,
            ..
        } = self;

        let mut port_sets: Vec<PortSet> = modules.iter().map(|_| PortSet::new()).collect();
        for c in &connections {
            let (inflow_end, outflow_end) = link();
            let outflow_spec = port_spec(modules[c.producer].as_ref(), c.outflow);
            let inflow_spec = port_spec(modules[c.consumer].as_ref(), c.inflow);
            if let (Some(out_spec), Some(in_spec)) = (outflow_spec, inflow_spec) {
                port_sets[c.producer].bind_outflow(out_spec, modules[c.consumer].name(), outflow_end);
                port_sets[c.consumer].bind_inflow(in_spec, modules[c.producer].name(), inflow_end);
            }
        }
        for (module, ports) in modules.iter().zip(port_sets.iter_mut()) {
            ports.sort_by(module.ports());
        }

        tracing::info!(
            modules = modules.len(),
            connections = connections.len(),
            "starting network run"
        );

        let outcomes = thread::scope(|scope| {
            let handles: Vec<_> = modules
                .into_iter()
                .zip(port_sets)
                .map(|(mut module, ports)| {
                    let name = module.name().to_string();
                    let handle = scope.spawn(move || {
                        let result = run_module(module.as_mut(), &ports);
                        drop(ports);
                        (module, result)
                    });
                    (name, handle)
                })
                .collect();
            handles
                .into_iter()
                .map(|(name, handle)| (name, handle.join()))
                .collect::<Vec<_>>()
        });

        let mut reports = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (name, outcome) in outcomes {
            match outcome {
                Ok((module, Ok(summary))) => {
                    reports.push(ModuleReport::capture(module.as_ref(), summary));
                }
                Ok((_, Err(source))) => {
                    tracing::debug!(module = %name, error = %source, "module stopped");
                    failures.push(SimError::ModuleFailed {
                        module: name,
                        source: Box::new(source),
                    });
                }
                Err(_) => failures.push(SimError::ModulePanicked { module: name }),
            }
        }

        if !failures.is_empty() {
            let root = failures.iter().position(|e| !e.is_disconnect()).unwrap_or(0);
            let err = failures.swap_remove(root);
            tracing::error!(error = %err, "network run failed");
            return Err(err);
        }
        tracing::info!(modules = reports.len(), "network run finished");
        Ok(NetworkReport { modules: reports })
    }
}

fn endpoint((module, port): (&str, &str)) -> String {
    format!("{module}.{port}")
}

fn port_spec(module: &dyn Module, name: &str) -> Option<PortSpec> {
    module.ports().iter().find(|p| p.name == name).copied()
}

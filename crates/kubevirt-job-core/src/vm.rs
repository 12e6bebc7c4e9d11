use std::collections::BTreeMap;
use std::fmt;

/// How KubeVirt is asked to keep a virtual machine running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStrategy {
    Always,
    RerunOnFailure,
    Manual,
    Halted,
    Once,
    WaitAsReceiver,
    Other(String),
}

impl RunStrategy {
    /// Whether the strategy keeps (or leaves) the instance running. Unknown
    /// strategies are treated as not running.
    pub fn wants_running(&self) -> bool {
        !matches!(self, Self::Halted | Self::Other(_))
    }
}

impl From<&str> for RunStrategy {
    fn from(value: &str) -> Self {
        match value {
            "Always" => Self::Always,
            "RerunOnFailure" => Self::RerunOnFailure,
            "Manual" => Self::Manual,
            "Halted" => Self::Halted,
            "Once" => Self::Once,
            "WaitAsReceiver" => Self::WaitAsReceiver,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RunStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "Always"),
            Self::RerunOnFailure => write!(f, "RerunOnFailure"),
            Self::Manual => write!(f, "Manual"),
            Self::Halted => write!(f, "Halted"),
            Self::Once => write!(f, "Once"),
            Self::WaitAsReceiver => write!(f, "WaitAsReceiver"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// The `status.printableStatus` of a virtual machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintableStatus {
    Stopped,
    Provisioning,
    Starting,
    Running,
    Paused,
    Stopping,
    Terminating,
    CrashLoopBackOff,
    Migrating,
    Unknown,
    Other(String),
}

impl From<&str> for PrintableStatus {
    fn from(value: &str) -> Self {
        match value {
            "Stopped" => Self::Stopped,
            "Provisioning" => Self::Provisioning,
            "Starting" => Self::Starting,
            "Running" => Self::Running,
            "Paused" => Self::Paused,
            "Stopping" => Self::Stopping,
            "Terminating" => Self::Terminating,
            "CrashLoopBackOff" => Self::CrashLoopBackOff,
            "Migrating" => Self::Migrating,
            "Unknown" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PrintableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(s) => write!(f, "{s}"),
            known => write!(f, "{known:?}"),
        }
    }
}

/// The parts of a KubeVirt `VirtualMachine` the updater looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualMachine {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    /// `spec.template.spec.domain.machine.type`, if pinned.
    pub machine_type: Option<String>,
    pub run_strategy: RunStrategy,
    pub printable_status: PrintableStatus,
}

impl VirtualMachine {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            labels: BTreeMap::new(),
            machine_type: None,
            run_strategy: RunStrategy::Halted,
            printable_status: PrintableStatus::Stopped,
        }
    }

    pub fn with_machine_type(mut self, machine_type: impl Into<String>) -> Self {
        self.machine_type = Some(machine_type.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_run_strategy(mut self, run_strategy: RunStrategy) -> Self {
        self.run_strategy = run_strategy;
        self
    }

    pub fn with_printable_status(mut self, printable_status: PrintableStatus) -> Self {
        self.printable_status = printable_status;
        self
    }

    /// The pinned machine type, ignoring an empty value.
    pub fn pinned_machine_type(&self) -> Option<&str> {
        self.machine_type.as_deref().filter(|m| !m.is_empty())
    }

    pub fn is_running(&self) -> bool {
        self.run_strategy.wants_running() && self.printable_status == PrintableStatus::Running
    }
}

impl fmt::Display for VirtualMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

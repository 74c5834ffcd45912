//! Fatal errors and the exit codes they map to

use fwa_watcher::{LoopError, QueueError, RegisterError};
use std::fmt;
use thiserror::Error;

/// Exit status for each class of fatal error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitStatus {
    /// Event queue could not be created
    QueueCreate,
    /// Notification buffer could not be allocated
    EventMemory,
    /// Descriptor table could not be allocated
    DescriptorAllocation,
    /// A requested file could not be opened or registered at startup
    OpenFile,
    /// The blocking wait failed
    Wait,
    /// Privileges could not be dropped
    Privilege,
    /// Report lines could not be written
    Output,
    /// Bad command line
    Usage,
}

impl ExitStatus {
    pub const ALL: [ExitStatus; 8] = [
        ExitStatus::QueueCreate,
        ExitStatus::EventMemory,
        ExitStatus::DescriptorAllocation,
        ExitStatus::OpenFile,
        ExitStatus::Wait,
        ExitStatus::Privilege,
        ExitStatus::Output,
        ExitStatus::Usage,
    ];

    pub const fn code(self) -> i32 {
        match self {
            ExitStatus::QueueCreate => 1,
            ExitStatus::EventMemory => 2,
            ExitStatus::DescriptorAllocation => 3,
            ExitStatus::OpenFile => 4,
            ExitStatus::Wait => 5,
            ExitStatus::Privilege => 6,
            ExitStatus::Output => 7,
            // EX_USAGE from sysexits(3)
            ExitStatus::Usage => 64,
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// An error that ends the process
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Fatal {
    pub status: ExitStatus,
    pub message: String,
}

impl Fatal {
    pub fn new(status: ExitStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn code(&self) -> i32 {
        self.status.code()
    }
}

impl From<QueueError> for Fatal {
    fn from(err: QueueError) -> Self {
        let status = match &err {
            QueueError::Create(_) => ExitStatus::QueueCreate,
            QueueError::EventMemory(_) => ExitStatus::EventMemory,
            QueueError::Register { .. } | QueueError::Deregister { .. } => ExitStatus::OpenFile,
            QueueError::Wait(_) | QueueError::Disconnected => ExitStatus::Wait,
        };
        Fatal::new(status, err.to_string())
    }
}

impl From<RegisterError> for Fatal {
    fn from(err: RegisterError) -> Self {
        match err {
            RegisterError::NoPaths => Fatal::new(ExitStatus::Usage, err.to_string()),
            RegisterError::TableAllocation { .. } => {
                Fatal::new(ExitStatus::DescriptorAllocation, err.to_string())
            }
            RegisterError::Open { .. } => Fatal::new(ExitStatus::OpenFile, err.to_string()),
            RegisterError::Queue(queue) => queue.into(),
        }
    }
}

impl From<LoopError> for Fatal {
    fn from(err: LoopError) -> Self {
        match err {
            LoopError::Queue(queue) => {
                let message = queue.to_string();
                Fatal::new(ExitStatus::Wait, message)
            }
            LoopError::Output(_) => Fatal::new(ExitStatus::Output, err.to_string()),
        }
    }
}

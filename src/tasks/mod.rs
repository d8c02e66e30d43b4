//! Built-in task families.
//!
//! - `push-to-target`: push a puck into a target region
//! - `motion2d-p{n}`: navigate through `n` narrow wall passages
//! - `storage2d-b{n}`: grasp `n` blocks and store them on a shelf

pub mod motion2d;
pub mod push_to_target;
pub mod storage2d;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::GeneratorError;
use crate::geom2d::SE2Pose;
use crate::task::{ParameterAssignment, TaskDefinition, TaskSpec};

pub use motion2d::Motion2D;
pub use push_to_target::{PushToTarget, OBJECT, PUSH_TO_TARGET_ID, TARGET};
pub use storage2d::Storage2D;

/// Reads the shared `robot_x`, `robot_y`, `robot_theta` parameters.
pub(crate) fn robot_pose(parameters: &ParameterAssignment) -> Result<SE2Pose, GeneratorError> {
    Ok(SE2Pose::new(
        parameters.get_f64("robot_x")?,
        parameters.get_f64("robot_y")?,
        parameters.get_f64("robot_theta")?,
    ))
}

/// Which built-in family a task variant is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskKind {
    PushToTarget,
    Motion2d { passages: usize },
    Storage2d { blocks: usize },
}

impl TaskKind {
    /// Builds the task, letting `customize` edit its spec before it is frozen.
    pub fn instantiate<F>(&self, customize: F) -> Result<Arc<dyn TaskDefinition>, GeneratorError>
    where
        F: FnOnce(&mut TaskSpec) -> Result<(), GeneratorError>,
    {
        let task: Arc<dyn TaskDefinition> = match *self {
            TaskKind::PushToTarget => {
                let mut task = PushToTarget::new();
                customize(task.spec_mut())?;
                Arc::new(task)
            }
            TaskKind::Motion2d { passages } => {
                let mut task = Motion2D::new(passages);
                customize(task.spec_mut())?;
                Arc::new(task)
            }
            TaskKind::Storage2d { blocks } => {
                if blocks == 0 || blocks % 2 == 0 {
                    return Err(GeneratorError::invalid("blocks", "storage2d needs an odd number of blocks"));
                }
                let mut task = Storage2D::new(blocks);
                customize(task.spec_mut())?;
                Arc::new(task)
            }
        };
        task.spec().validate()?;
        Ok(task)
    }
}

/// The default suite, in registration order.
pub fn builtin_tasks() -> Vec<Arc<dyn TaskDefinition>> {
    vec![
        Arc::new(PushToTarget::new()),
        Arc::new(Motion2D::new(1)),
        Arc::new(Motion2D::new(2)),
        Arc::new(Motion2D::new(3)),
        Arc::new(Storage2D::new(1)),
        Arc::new(Storage2D::new(3)),
    ]
}

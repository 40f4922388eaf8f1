//! Solver interface shared by every solver kind in a rig
//!
//! A rig runs an ordered stack of solvers against one pose each frame. Each
//! solver borrows the pose mutably for the duration of its solve; none of
//! them keep a reference to it afterwards.

use hashbrown::HashMap;

use crate::pose::Pose;
use crate::skeleton::Skeleton;
use crate::transform::Transform;

/// Named effector target
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub bone: String,
    pub transform: Transform,
}

/// Goals available to solvers this frame, keyed by goal name
#[derive(Debug, Clone, Default)]
pub struct GoalContainer {
    goals: HashMap<String, Goal>,
}

impl GoalContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_goal(&mut self, name: impl Into<String>, goal: Goal) {
        self.goals.insert(name.into(), goal);
    }

    pub fn goal(&self, name: &str) -> Option<&Goal> {
        self.goals.get(name)
    }

    pub fn remove_goal(&mut self, name: &str) -> Option<Goal> {
        self.goals.remove(name)
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }
}

/// Capabilities of a rig solver
///
/// Goal and bone-setting hooks default to no-ops for solvers that do not use
/// them.
pub trait RigSolver: Send {
    /// Bind to a skeleton. Called before the first solve and on every rebind.
    fn initialize(&mut self, skeleton: &Skeleton);

    /// Modify `pose` in place
    fn solve(&mut self, skeleton: &Skeleton, pose: &mut Pose, goals: &GoalContainer);

    /// Display name for editors
    fn nice_name(&self) -> &str;

    fn root_bone(&self) -> Option<&str> {
        None
    }

    fn set_root_bone(&mut self, _bone: &str) {}

    fn requires_root_bone(&self) -> bool {
        false
    }

    /// Whether the solver writes to `bone`
    fn is_bone_affected(&self, bone: &str, skeleton: &Skeleton) -> bool;

    /// Advisory message when the solver is misconfigured
    fn warning_message(&self) -> Option<&str> {
        None
    }

    fn add_goal(&mut self, _goal_name: &str, _bone: &str) {}

    fn remove_goal(&mut self, _goal_name: &str) {}

    fn rename_goal(&mut self, _old_name: &str, _new_name: &str) {}

    fn set_goal_bone(&mut self, _goal_name: &str, _bone: &str) {}

    fn uses_bone_settings(&self) -> bool {
        false
    }

    fn add_bone_setting(&mut self, _bone: &str) {}

    fn remove_bone_setting(&mut self, _bone: &str) {}

    fn has_bone_setting(&self, _bone: &str) -> bool {
        false
    }
}

struct StackEntry {
    solver: Box<dyn RigSolver>,
    enabled: bool,
}

/// Ordered list of solvers run one after another on the same pose
#[derive(Default)]
pub struct SolverStack {
    entries: Vec<StackEntry>,
}

impl SolverStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a solver, enabled. Returns its index in the stack.
    pub fn push(&mut self, solver: Box<dyn RigSolver>) -> usize {
        self.entries.push(StackEntry {
            solver,
            enabled: true,
        });
        self.entries.len() - 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn set_enabled(&mut self, index: usize, enabled: bool) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.enabled = enabled;
        }
    }

    pub fn is_enabled(&self, index: usize) -> bool {
        self.entries.get(index).is_some_and(|e| e.enabled)
    }

    pub fn solver(&self, index: usize) -> Option<&dyn RigSolver> {
        self.entries.get(index).map(|e| e.solver.as_ref())
    }

    pub fn solver_mut(&mut self, index: usize) -> Option<&mut (dyn RigSolver + 'static)> {
        self.entries.get_mut(index).map(|e| e.solver.as_mut())
    }

    /// Initialize every solver, enabled or not
    pub fn initialize(&mut self, skeleton: &Skeleton) {
        for entry in &mut self.entries {
            entry.solver.initialize(skeleton);
        }
    }

    /// Run enabled solvers in order
    pub fn solve(&mut self, skeleton: &Skeleton, pose: &mut Pose, goals: &GoalContainer) {
        for entry in self.entries.iter_mut().filter(|e| e.enabled) {
            entry.solver.solve(skeleton, pose, goals);
        }
    }

    /// Warning messages of all solvers, with their stack index
    pub fn warnings(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.solver.warning_message().map(|msg| (i, msg)))
    }
}

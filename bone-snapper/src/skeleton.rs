//! Skeleton topology
//!
//! Bones are stored in index order with parents always preceding their
//! children. Forward kinematics relies on that ordering, so it is checked
//! once here and never again at solve time.

use hashbrown::HashMap;

/// Errors raised while building a [`Skeleton`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkeletonError {
    #[error("Bone name and parent arrays differ in length ({names} names, {parents} parents)")]
    LengthMismatch { names: usize, parents: usize },

    #[error("Duplicate bone name '{0}'")]
    DuplicateBone(String),

    #[error("Bone '{name}' (index {index}) has parent index {parent}, parents must precede children")]
    ParentAfterChild {
        name: String,
        index: usize,
        parent: usize,
    },
}

/// Bone hierarchy: names, parent links and a name lookup
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    bone_names: Vec<String>,
    parent_indices: Vec<Option<usize>>,
    name_lookup: HashMap<String, usize>,
}

impl Skeleton {
    /// Build a skeleton from parallel name and parent arrays.
    ///
    /// Every parent index must be strictly less than its child's index. This
    /// also rules out cycles.
    pub fn new(
        bone_names: Vec<String>,
        parent_indices: Vec<Option<usize>>,
    ) -> Result<Self, SkeletonError> {
        if bone_names.len() != parent_indices.len() {
            return Err(SkeletonError::LengthMismatch {
                names: bone_names.len(),
                parents: parent_indices.len(),
            });
        }

        let mut name_lookup = HashMap::with_capacity(bone_names.len());
        for (index, name) in bone_names.iter().enumerate() {
            if name_lookup.insert(name.clone(), index).is_some() {
                return Err(SkeletonError::DuplicateBone(name.clone()));
            }
            if let Some(parent) = parent_indices[index]
                && parent >= index
            {
                return Err(SkeletonError::ParentAfterChild {
                    name: name.clone(),
                    index,
                    parent,
                });
            }
        }

        Ok(Self {
            bone_names,
            parent_indices,
            name_lookup,
        })
    }

    /// Number of bones
    pub fn len(&self) -> usize {
        self.bone_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bone_names.is_empty()
    }

    pub fn bone_names(&self) -> &[String] {
        &self.bone_names
    }

    pub fn bone_name(&self, index: usize) -> Option<&str> {
        self.bone_names.get(index).map(String::as_str)
    }

    pub fn parent_indices(&self) -> &[Option<usize>] {
        &self.parent_indices
    }

    pub fn parent(&self, index: usize) -> Option<usize> {
        self.parent_indices.get(index).copied().flatten()
    }

    /// Index of the bone called `name`, if any
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.name_lookup.get(name).copied()
    }
}

/// Ancestor count for every bone (roots are depth 0)
///
/// Walks each bone's parent chain to its root. The parent array must be
/// acyclic; [`Skeleton::new`] guarantees this.
pub fn compute_bone_depths(parent_indices: &[Option<usize>]) -> Vec<usize> {
    parent_indices
        .iter()
        .map(|&parent| {
            let mut depth = 0;
            let mut current = parent;
            while let Some(index) = current {
                depth += 1;
                current = parent_indices[index];
            }
            depth
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_skeleton_lookup() {
        let skeleton = Skeleton::new(
            names(&["root", "hip", "foot"]),
            vec![None, Some(0), Some(1)],
        )
        .unwrap();

        assert_eq!(skeleton.len(), 3);
        assert_eq!(skeleton.bone_index("hip"), Some(1));
        assert_eq!(skeleton.bone_index("hand"), None);
        assert_eq!(skeleton.bone_name(2), Some("foot"));
        assert_eq!(skeleton.parent(0), None);
        assert_eq!(skeleton.parent(2), Some(1));
        assert_eq!(skeleton.parent(99), None);
    }

    #[test]
    fn test_skeleton_rejects_parent_after_child() {
        let err = Skeleton::new(names(&["a", "b"]), vec![Some(1), None]).unwrap_err();
        assert_eq!(
            err,
            SkeletonError::ParentAfterChild {
                name: "a".to_string(),
                index: 0,
                parent: 1,
            }
        );
    }

    #[test]
    fn test_skeleton_rejects_self_parent() {
        let err = Skeleton::new(names(&["a"]), vec![Some(0)]).unwrap_err();
        assert!(matches!(err, SkeletonError::ParentAfterChild { index: 0, .. }));
    }

    #[test]
    fn test_skeleton_rejects_duplicate_names() {
        let err = Skeleton::new(names(&["a", "a"]), vec![None, Some(0)]).unwrap_err();
        assert_eq!(err, SkeletonError::DuplicateBone("a".to_string()));
    }

    #[test]
    fn test_skeleton_rejects_length_mismatch() {
        let err = Skeleton::new(names(&["a", "b"]), vec![None]).unwrap_err();
        assert_eq!(err, SkeletonError::LengthMismatch { names: 2, parents: 1 });
    }

    #[test]
    fn test_depths_chain() {
        let depths = compute_bone_depths(&[None, Some(0), Some(1), Some(2)]);
        assert_eq!(depths, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_depths_branching_and_multiple_roots() {
        // 0 root, 1 and 2 children of 0, 3 child of 2, 4 a second root, 5 child of 4
        let parents = [None, Some(0), Some(0), Some(2), None, Some(4)];
        let depths = compute_bone_depths(&parents);
        assert_eq!(depths, vec![0, 1, 1, 2, 0, 1]);

        for (index, parent) in parents.iter().enumerate() {
            match parent {
                None => assert_eq!(depths[index], 0),
                Some(p) => assert_eq!(depths[index], depths[*p] + 1),
            }
        }
    }

    #[test]
    fn test_depths_empty() {
        assert!(compute_bone_depths(&[]).is_empty());
    }
}

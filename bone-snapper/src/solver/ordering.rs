//! Depth ordering of snap settings

use tracing::trace;

use crate::settings::SnapSetting;
use crate::skeleton::Skeleton;

/// Stable-sort `settings` so shallower source bones snap first
///
/// Settings whose source bone is not in `skeleton` (or lies outside `depths`)
/// move to the end, keeping their relative order.
pub fn reorder(settings: &mut [SnapSetting], skeleton: &Skeleton, depths: &[usize]) {
    settings.sort_by_cached_key(|setting| {
        let depth = skeleton
            .bone_index(&setting.source_bone)
            .and_then(|index| depths.get(index).copied());
        (depth.is_none(), depth.unwrap_or_default())
    });

    for setting in settings.iter() {
        trace!(
            "Snap {} to {}",
            setting.source_bone, setting.destination_bone
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::compute_bone_depths;

    // root(0) -> spine(1) -> chest(2) -> hand(3), root -> hip(4) -> foot(5)
    fn skeleton() -> Skeleton {
        Skeleton::new(
            ["root", "spine", "chest", "hand", "hip", "foot"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            vec![None, Some(0), Some(1), Some(2), Some(0), Some(4)],
        )
        .unwrap()
    }

    fn sources(settings: &[SnapSetting]) -> Vec<&str> {
        settings.iter().map(|s| s.source_bone.as_str()).collect()
    }

    #[test]
    fn test_reorder_shallow_first() {
        let skeleton = skeleton();
        let depths = compute_bone_depths(skeleton.parent_indices());
        let mut settings = vec![
            SnapSetting::new("hand"),
            SnapSetting::new("foot"),
            SnapSetting::new("spine"),
        ];

        reorder(&mut settings, &skeleton, &depths);
        assert_eq!(sources(&settings), vec!["spine", "foot", "hand"]);
    }

    #[test]
    fn test_reorder_is_stable_for_equal_depths() {
        let skeleton = skeleton();
        let depths = compute_bone_depths(skeleton.parent_indices());
        // chest and foot are both depth 2, spine and hip both depth 1
        let mut settings = vec![
            SnapSetting::new("foot"),
            SnapSetting::new("hip"),
            SnapSetting::new("chest"),
            SnapSetting::new("spine"),
        ];

        reorder(&mut settings, &skeleton, &depths);
        assert_eq!(sources(&settings), vec!["hip", "spine", "foot", "chest"]);
    }

    #[test]
    fn test_reorder_unresolved_last_in_original_order() {
        let skeleton = skeleton();
        let depths = compute_bone_depths(skeleton.parent_indices());
        let mut settings = vec![
            SnapSetting::new("ghost_b"),
            SnapSetting::new("hand"),
            SnapSetting::new("ghost_a"),
            SnapSetting::new("root"),
        ];

        reorder(&mut settings, &skeleton, &depths);
        assert_eq!(sources(&settings), vec!["root", "hand", "ghost_b", "ghost_a"]);
    }

    #[test]
    fn test_reorder_without_depth_cache_treats_all_as_unresolved() {
        let skeleton = skeleton();
        let mut settings = vec![SnapSetting::new("hand"), SnapSetting::new("root")];

        reorder(&mut settings, &skeleton, &[]);
        assert_eq!(sources(&settings), vec!["hand", "root"]);
    }
}

use std::path::{Component, Path, PathBuf};

/// Turn a user-supplied path into an absolute one anchored at `cwd`.
///
/// `.` and `..` are removed lexically; the path does not need to exist.
pub fn resolve_local_path(raw: &Path, cwd: &Path) -> PathBuf {
    normalize(&cwd.join(raw))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_is_anchored_at_cwd() {
        assert_eq!(
            resolve_local_path(Path::new("./templates"), Path::new("/work/site")),
            PathBuf::from("/work/site/templates")
        );
    }

    #[test]
    fn test_parent_components_are_collapsed() {
        assert_eq!(
            resolve_local_path(Path::new("../shared/./partials/"), Path::new("/work/site")),
            PathBuf::from("/work/shared/partials")
        );
    }

    #[test]
    fn test_absolute_path_ignores_cwd() {
        assert_eq!(
            resolve_local_path(Path::new("/srv/theme/../theme2"), Path::new("/work")),
            PathBuf::from("/srv/theme2")
        );
    }

    #[test]
    fn test_parent_of_root_stays_at_root() {
        assert_eq!(
            resolve_local_path(Path::new("../../x"), Path::new("/")),
            PathBuf::from("/x")
        );
    }

    #[test]
    fn test_dot_resolves_to_cwd() {
        assert_eq!(
            resolve_local_path(Path::new("."), Path::new("/work/site")),
            PathBuf::from("/work/site")
        );
    }
}

use anyhow::Result;
use base64::{Engine, engine::general_purpose::STANDARD};
use log::trace;
use std::path::{Component, Path, PathBuf};
use url::Url;

use oxistyle_core::SourceMap;

const INLINE_MAP_PREFIX: &str = "data:application/json;charset=utf-8;base64,";

/// Create a relative path from `base` to `target`
fn make_relative(target: &Path, base: &Path) -> Option<PathBuf> {
    let target_parts: Vec<Component> = target.components().collect();
    let base_parts: Vec<Component> = base.components().collect();

    // Paths on different roots (or drives) can't be related
    if target_parts.first() != base_parts.first() {
        return None;
    }

    let common = target_parts.iter().zip(&base_parts).take_while(|(t, b)| t == b).count();

    let mut result = PathBuf::new();
    for _ in &base_parts[common..] {
        result.push("..");
    }
    for component in &target_parts[common..] {
        result.push(component.as_os_str());
    }

    if result.as_os_str().is_empty() { Some(PathBuf::from(".")) } else { Some(result) }
}

/// Filesystem path of a source map entry. Inline `data:` sources belong to
/// the entry file.
fn source_path(source: &str, entry: &Path, entry_dir: &Path) -> PathBuf {
    if source.starts_with("data:") {
        return entry.to_path_buf();
    }
    if let Ok(url) = Url::parse(source)
        && let Ok(path) = url.to_file_path()
    {
        return path;
    }
    entry_dir.join(source)
}

/// Points the map's root at the entry directory and makes every source
/// relative to it.
pub fn rewrite_source_map(map: &mut SourceMap, entry: &Path) {
    let entry_dir = entry.parent().unwrap_or(entry);
    map.source_root = Some(entry_dir.to_string_lossy().into_owned());

    for source in map.sources.iter_mut() {
        let path = source_path(source, entry, entry_dir);
        let relative = make_relative(&path, entry_dir).unwrap_or(path);
        trace!("Rewrote source map source '{}' to {}", source, relative.display());
        *source = relative.to_string_lossy().into_owned();
    }
}

/// `/*# sourceMappingURL=data:...;base64,... */` carrying the whole map.
pub fn inline_source_map_comment(map: &SourceMap) -> Result<String> {
    let json = serde_json::to_vec(map)?;
    Ok(format!("/*# sourceMappingURL={}{} */", INLINE_MAP_PREFIX, STANDARD.encode(json)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_relative_same_dir() {
        let result = make_relative(Path::new("/project/src/a.scss"), Path::new("/project/src"));
        assert_eq!(result, Some(PathBuf::from("a.scss")));
    }

    #[test]
    fn test_make_relative_child_dir() {
        let target = Path::new("/project/src/components/_button.scss");
        let result = make_relative(target, Path::new("/project/src"));
        assert_eq!(result, Some(PathBuf::from("components/_button.scss")));
    }

    #[test]
    fn test_make_relative_sibling_dir() {
        let target = Path::new("/project/node_modules/bootstrap/scss/_functions.scss");
        let result = make_relative(target, Path::new("/project/src/styles"));
        assert_eq!(result, Some(PathBuf::from("../../node_modules/bootstrap/scss/_functions.scss")));
    }

    #[test]
    fn test_make_relative_same_path() {
        let result = make_relative(Path::new("/project/src"), Path::new("/project/src"));
        assert_eq!(result, Some(PathBuf::from(".")));
    }

    #[test]
    fn test_make_relative_relative_base() {
        assert_eq!(make_relative(Path::new("/project/a.scss"), Path::new("src")), None);
    }

    #[test]
    fn test_rewrite_source_map() {
        let mut map = SourceMap {
            version: 3,
            source_root: Some(String::new()),
            sources: vec![
                "file:///app/src/main.scss".to_string(),
                "file:///app/src/partials/_a.scss".to_string(),
                "file:///app/shared/_b.scss".to_string(),
                "data:;charset=utf-8,a%20%7B%7D".to_string(),
            ],
            mappings: "AAAA".to_string(),
            ..Default::default()
        };
        rewrite_source_map(&mut map, Path::new("/app/src/main.scss"));

        assert_eq!(map.source_root.as_deref(), Some("/app/src"));
        assert_eq!(map.sources, vec!["main.scss", "partials/_a.scss", "../shared/_b.scss", "main.scss"]);
    }

    #[test]
    fn test_inline_comment_round_trips() {
        let map = SourceMap {
            version: 3,
            sources: vec!["main.scss".to_string()],
            mappings: "AAAA".to_string(),
            ..Default::default()
        };
        let comment = inline_source_map_comment(&map).unwrap();
        assert!(comment.starts_with("/*# sourceMappingURL=data:application/json;"));
        assert!(comment.ends_with(" */"));

        let encoded = comment
            .trim_start_matches("/*# sourceMappingURL=")
            .trim_start_matches(INLINE_MAP_PREFIX)
            .trim_end_matches(" */");
        let decoded: SourceMap = serde_json::from_slice(&STANDARD.decode(encoded).unwrap()).unwrap();
        assert_eq!(decoded, map);
    }
}

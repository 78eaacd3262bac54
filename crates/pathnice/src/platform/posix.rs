use super::{ParsedPath, PathApi, PlatformHandle, collapse_dots};

/// POSIX-flavor path algorithms: forward-slash separated, a single `/` root.
#[derive(Debug)]
pub struct PosixPlatform;

impl PosixPlatform {
    fn cwd() -> String {
        std::env::current_dir()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "/".to_string())
    }
}

impl PathApi for PosixPlatform {
    fn sep(&self) -> &'static str {
        "/"
    }

    fn delimiter(&self) -> &'static str {
        ":"
    }

    fn join(&self, parts: &[&str]) -> String {
        let nonempty: Vec<&str> = parts.iter().copied().filter(|p| !p.is_empty()).collect();
        if nonempty.is_empty() {
            return ".".to_string();
        }
        self.normalize(&nonempty.join("/"))
    }

    fn normalize(&self, path: &str) -> String {
        if path.is_empty() {
            return ".".to_string();
        }
        let rooted = path.starts_with('/');
        let trailing = path.len() > 1 && path.ends_with('/');
        let stack = collapse_dots(path.split('/'), rooted);
        let mut out = String::new();
        if rooted {
            out.push('/');
        }
        out.push_str(&stack.join("/"));
        if out.is_empty() {
            out.push('.');
        }
        if trailing && !out.ends_with('/') {
            out.push('/');
        }
        out
    }

    fn resolve(&self, parts: &[&str]) -> String {
        let mut resolved = String::new();
        let mut absolute = false;
        for part in parts.iter().rev() {
            if part.is_empty() {
                continue;
            }
            resolved = if resolved.is_empty() {
                (*part).to_string()
            } else {
                format!("{}/{}", part, resolved)
            };
            if self.is_absolute(part) {
                absolute = true;
                break;
            }
        }
        if !absolute {
            let cwd = Self::cwd();
            resolved = if resolved.is_empty() {
                cwd
            } else {
                format!("{}/{}", cwd, resolved)
            };
        }
        let normalized = self.normalize(&resolved);
        if normalized.len() > 1 && normalized.ends_with('/') {
            normalized.trim_end_matches('/').to_string()
        } else {
            normalized
        }
    }

    fn relative(&self, from: &str, to: &str) -> String {
        let from_resolved = self.resolve(&[from]);
        let to_resolved = self.resolve(&[to]);
        if from_resolved == to_resolved {
            return String::new();
        }
        let from_parts: Vec<&str> = from_resolved.split('/').filter(|c| !c.is_empty()).collect();
        let to_parts: Vec<&str> = to_resolved.split('/').filter(|c| !c.is_empty()).collect();
        let common = from_parts
            .iter()
            .zip(to_parts.iter())
            .take_while(|(a, b)| a == b)
            .count();
        let mut out: Vec<&str> = vec![".."; from_parts.len() - common];
        out.extend_from_slice(&to_parts[common..]);
        out.join("/")
    }

    fn dirname(&self, path: &str) -> String {
        if path.is_empty() {
            return ".".to_string();
        }
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            // The path consisted of separators only.
            return "/".to_string();
        }
        match trimmed.rfind('/') {
            None => ".".to_string(),
            Some(0) => "/".to_string(),
            Some(idx) => {
                let parent = trimmed[..idx].trim_end_matches('/');
                if parent.is_empty() {
                    "/".to_string()
                } else {
                    parent.to_string()
                }
            }
        }
    }

    fn basename(&self, path: &str) -> String {
        let trimmed = path.trim_end_matches('/');
        match trimmed.rfind('/') {
            None => trimmed.to_string(),
            Some(idx) => trimmed[idx + 1..].to_string(),
        }
    }

    fn extname(&self, path: &str) -> String {
        let base = self.basename(path);
        match base.rfind('.') {
            Some(idx) if idx > 0 => base[idx..].to_string(),
            _ => String::new(),
        }
    }

    fn is_absolute(&self, path: &str) -> bool {
        path.starts_with('/')
    }

    fn parse(&self, path: &str) -> ParsedPath {
        let root = if path.starts_with('/') {
            "/".to_string()
        } else {
            String::new()
        };
        let base = self.basename(path);
        let ext = self.extname(path);
        let name = base[..base.len() - ext.len()].to_string();
        let trimmed = path.trim_end_matches('/');
        let mut dir = match trimmed.rfind('/') {
            None => String::new(),
            Some(0) => "/".to_string(),
            Some(idx) => trimmed[..idx].to_string(),
        };
        if dir.is_empty() {
            dir = root.clone();
        }
        ParsedPath {
            root,
            dir,
            base,
            ext,
            name,
        }
    }

    fn format(&self, parsed: &ParsedPath) -> String {
        let dir = if !parsed.dir.is_empty() {
            parsed.dir.as_str()
        } else {
            parsed.root.as_str()
        };
        let base = if !parsed.base.is_empty() {
            parsed.base.clone()
        } else {
            format!("{}{}", parsed.name, parsed.ext)
        };
        if dir.is_empty() {
            return base;
        }
        if dir == parsed.root {
            return format!("{}{}", dir, base);
        }
        format!("{}/{}", dir, base)
    }

    fn to_namespaced_path(&self, path: &str) -> String {
        path.to_string()
    }

    fn posix(&self) -> PlatformHandle {
        super::posix()
    }

    fn win32(&self) -> PlatformHandle {
        super::win32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> PosixPlatform {
        PosixPlatform
    }

    #[test]
    fn test_join_segments() {
        assert_eq!(api().join(&["a", "b", "c"]), "a/b/c");
        assert_eq!(api().join(&["/a", "b"]), "/a/b");
        assert_eq!(api().join(&["a", "", "c"]), "a/c");
        assert_eq!(api().join(&["a", "..", "c"]), "c");
        assert_eq!(api().join(&[]), ".");
        assert_eq!(api().join(&["", ""]), ".");
    }

    #[test]
    fn test_normalize_collapses_dots_and_separators() {
        assert_eq!(api().normalize("/a/b/../c"), "/a/c");
        assert_eq!(api().normalize("a//b"), "a/b");
        assert_eq!(api().normalize("./a"), "a");
        assert_eq!(api().normalize("a/.."), ".");
        assert_eq!(api().normalize(""), ".");
        assert_eq!(api().normalize("/"), "/");
        assert_eq!(api().normalize("/../a"), "/a");
        assert_eq!(api().normalize("../../a"), "../../a");
    }

    #[test]
    fn test_normalize_preserves_trailing_separator() {
        assert_eq!(api().normalize("a/b/"), "a/b/");
        assert_eq!(api().normalize("a/b//"), "a/b/");
    }

    #[test]
    fn test_resolve_rightmost_absolute_wins() {
        assert_eq!(api().resolve(&["/a", "b", "c"]), "/a/b/c");
        assert_eq!(api().resolve(&["/a", "/b", "c"]), "/b/c");
        assert_eq!(api().resolve(&["/a/b", "../c"]), "/a/c");
        assert_eq!(api().resolve(&["/a/b/"]), "/a/b");
    }

    #[test]
    fn test_resolve_relative_uses_cwd() {
        let cwd = std::env::current_dir().unwrap();
        let expected = api().normalize(&format!("{}/x", cwd.to_string_lossy()));
        assert_eq!(api().resolve(&["x"]), expected);
    }

    #[test]
    fn test_relative_paths() {
        assert_eq!(api().relative("/a/b", "/a/b"), "");
        assert_eq!(api().relative("/a/b", "/a/c"), "../c");
        assert_eq!(api().relative("/a", "/a/b/c"), "b/c");
        assert_eq!(api().relative("/a/b/c", "/a"), "../..");
    }

    #[test]
    fn test_dirname() {
        assert_eq!(api().dirname("/a/b"), "/a");
        assert_eq!(api().dirname("/a/b/"), "/a");
        assert_eq!(api().dirname("/a"), "/");
        assert_eq!(api().dirname("/"), "/");
        assert_eq!(api().dirname("a/b"), "a");
        assert_eq!(api().dirname("a"), ".");
        assert_eq!(api().dirname(""), ".");
    }

    #[test]
    fn test_basename() {
        assert_eq!(api().basename("/a/b.txt"), "b.txt");
        assert_eq!(api().basename("/a/b/"), "b");
        assert_eq!(api().basename("b.txt"), "b.txt");
        assert_eq!(api().basename("/"), "");
    }

    #[test]
    fn test_extname() {
        assert_eq!(api().extname("index.html"), ".html");
        assert_eq!(api().extname("index.coffee.md"), ".md");
        assert_eq!(api().extname("index."), ".");
        assert_eq!(api().extname("index"), "");
        assert_eq!(api().extname(".bashrc"), "");
        assert_eq!(api().extname("/a/b/.bashrc"), "");
    }

    #[test]
    fn test_is_absolute() {
        assert!(api().is_absolute("/a"));
        assert!(!api().is_absolute("a/b"));
        assert!(!api().is_absolute(""));
    }

    #[test]
    fn test_parse_and_format_round_trip() {
        let parsed = api().parse("/home/user/file.txt");
        assert_eq!(parsed.root, "/");
        assert_eq!(parsed.dir, "/home/user");
        assert_eq!(parsed.base, "file.txt");
        assert_eq!(parsed.ext, ".txt");
        assert_eq!(parsed.name, "file");
        assert_eq!(api().format(&parsed), "/home/user/file.txt");
    }

    #[test]
    fn test_parse_debug_snapshot() {
        use expect_test::expect;

        let parsed = api().parse("/home/user/file.txt");
        expect![[r#"
            ParsedPath {
                root: "/",
                dir: "/home/user",
                base: "file.txt",
                ext: ".txt",
                name: "file",
            }
        "#]]
        .assert_debug_eq(&parsed);
    }

    #[test]
    fn test_parse_relative_path() {
        let parsed = api().parse("file.txt");
        assert_eq!(parsed.root, "");
        assert_eq!(parsed.dir, "");
        assert_eq!(parsed.base, "file.txt");
        assert_eq!(api().format(&parsed), "file.txt");
    }

    #[test]
    fn test_parse_root_only() {
        let parsed = api().parse("/");
        assert_eq!(parsed.root, "/");
        assert_eq!(parsed.dir, "/");
        assert_eq!(parsed.base, "");
    }

    #[test]
    fn test_format_from_name_and_ext() {
        let parsed = ParsedPath {
            root: "/".to_string(),
            dir: "/tmp".to_string(),
            base: String::new(),
            ext: ".log".to_string(),
            name: "build".to_string(),
        };
        assert_eq!(api().format(&parsed), "/tmp/build.log");
    }

    #[test]
    fn test_namespaced_path_is_identity() {
        assert_eq!(api().to_namespaced_path("/a/b"), "/a/b");
    }

    #[test]
    fn test_constants() {
        assert_eq!(api().sep(), "/");
        assert_eq!(api().delimiter(), ":");
    }
}

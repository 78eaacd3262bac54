use super::{ParsedPath, PathApi, PlatformHandle, collapse_dots};

/// Windows-flavor path algorithms: both separators accepted on input,
/// backslash on output, drive and UNC roots.
#[derive(Debug)]
pub struct Win32Platform;

fn is_sep(b: u8) -> bool {
    b == b'/' || b == b'\\'
}

/// Length in bytes of the path's root: `C:\`, `C:`, `\\server\share\`,
/// a single leading separator, or nothing.
fn root_len(path: &str) -> usize {
    let b = path.as_bytes();
    if b.len() >= 2 && b[1] == b':' && b[0].is_ascii_alphabetic() {
        if b.len() >= 3 && is_sep(b[2]) { 3 } else { 2 }
    } else if b.len() >= 2 && is_sep(b[0]) && is_sep(b[1]) {
        let mut i = 2;
        while i < b.len() && !is_sep(b[i]) {
            i += 1;
        }
        if i == 2 {
            // Separators only, no server name.
            return 1;
        }
        if i == b.len() {
            // "\\server" with no share.
            return i;
        }
        let mut j = i + 1;
        while j < b.len() && !is_sep(b[j]) {
            j += 1;
        }
        if j == i + 1 {
            // "\\server\" with no share name.
            i + 1
        } else if j < b.len() {
            j + 1
        } else {
            j
        }
    } else if !b.is_empty() && is_sep(b[0]) {
        1
    } else {
        0
    }
}

impl Win32Platform {
    fn cwd() -> String {
        std::env::current_dir()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "\\".to_string())
    }
}

impl PathApi for Win32Platform {
    fn sep(&self) -> &'static str {
        "\\"
    }

    fn delimiter(&self) -> &'static str {
        ";"
    }

    fn join(&self, parts: &[&str]) -> String {
        let nonempty: Vec<&str> = parts.iter().copied().filter(|p| !p.is_empty()).collect();
        if nonempty.is_empty() {
            return ".".to_string();
        }
        self.normalize(&nonempty.join("\\"))
    }

    fn normalize(&self, path: &str) -> String {
        if path.is_empty() {
            return ".".to_string();
        }
        let rl = root_len(path);
        let root = path[..rl].replace('/', "\\");
        let tail = &path[rl..];
        let rooted = root.ends_with('\\');
        let trailing = path.len() > rl && (path.ends_with('/') || path.ends_with('\\'));
        let stack = collapse_dots(tail.split(|c| c == '/' || c == '\\'), rooted);
        let mut out = root;
        out.push_str(&stack.join("\\"));
        if out.is_empty() {
            out.push('.');
        }
        if trailing && !out.ends_with('\\') {
            out.push('\\');
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
                format!("{}\\{}", part, resolved)
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
                format!("{}\\{}", cwd, resolved)
            };
        }
        let mut normalized = self.normalize(&resolved);
        let rl = root_len(&normalized);
        while normalized.len() > rl && normalized.ends_with('\\') {
            normalized.pop();
        }
        normalized
    }

    fn relative(&self, from: &str, to: &str) -> String {
        let from_resolved = self.resolve(&[from]);
        let to_resolved = self.resolve(&[to]);
        if from_resolved.eq_ignore_ascii_case(&to_resolved) {
            return String::new();
        }
        let split = |p: &str| -> Vec<String> {
            p.split(|c| c == '/' || c == '\\')
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect()
        };
        let from_parts = split(&from_resolved);
        let to_parts = split(&to_resolved);
        let common = from_parts
            .iter()
            .zip(to_parts.iter())
            .take_while(|(a, b)| a.eq_ignore_ascii_case(b))
            .count();
        if common == 0 {
            // Nothing shared, not even a drive or server: the target is the
            // only way to address it.
            return to_resolved;
        }
        let mut out: Vec<&str> = vec![".."; from_parts.len() - common];
        let tail: Vec<&str> = to_parts[common..].iter().map(String::as_str).collect();
        out.extend_from_slice(&tail);
        out.join("\\")
    }

    fn dirname(&self, path: &str) -> String {
        if path.is_empty() {
            return ".".to_string();
        }
        let rl = root_len(path);
        let b = path.as_bytes();
        let mut end = path.len();
        while end > rl && is_sep(b[end - 1]) {
            end -= 1;
        }
        let mut last_sep = None;
        let mut i = end;
        while i > rl {
            i -= 1;
            if is_sep(b[i]) {
                last_sep = Some(i);
                break;
            }
        }
        match last_sep {
            None => {
                if rl > 0 {
                    path[..rl].to_string()
                } else {
                    ".".to_string()
                }
            }
            Some(p) => {
                let mut cut = p;
                while cut > rl && is_sep(b[cut - 1]) {
                    cut -= 1;
                }
                if cut == 0 {
                    ".".to_string()
                } else {
                    path[..cut].to_string()
                }
            }
        }
    }

    fn basename(&self, path: &str) -> String {
        let rl = root_len(path);
        let b = path.as_bytes();
        let mut end = path.len();
        while end > rl && is_sep(b[end - 1]) {
            end -= 1;
        }
        let mut start = end;
        while start > rl && !is_sep(b[start - 1]) {
            start -= 1;
        }
        path[start..end].to_string()
    }

    fn extname(&self, path: &str) -> String {
        let base = self.basename(path);
        match base.rfind('.') {
            Some(idx) if idx > 0 => base[idx..].to_string(),
            _ => String::new(),
        }
    }

    fn is_absolute(&self, path: &str) -> bool {
        let b = path.as_bytes();
        if b.is_empty() {
            return false;
        }
        if is_sep(b[0]) {
            return true;
        }
        b.len() >= 3 && b[1] == b':' && b[0].is_ascii_alphabetic() && is_sep(b[2])
    }

    fn parse(&self, path: &str) -> ParsedPath {
        let rl = root_len(path);
        let root = path[..rl].to_string();
        let base = self.basename(path);
        let ext = self.extname(path);
        let name = base[..base.len() - ext.len()].to_string();
        let b = path.as_bytes();
        let mut end = path.len();
        while end > rl && is_sep(b[end - 1]) {
            end -= 1;
        }
        let mut last_sep = None;
        let mut i = end;
        while i > rl {
            i -= 1;
            if is_sep(b[i]) {
                last_sep = Some(i);
                break;
            }
        }
        let dir = match last_sep {
            Some(p) => path[..p].to_string(),
            None => root.clone(),
        };
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
        format!("{}\\{}", dir, base)
    }

    fn to_namespaced_path(&self, path: &str) -> String {
        if path.is_empty() {
            return String::new();
        }
        let resolved = self.resolve(&[path]);
        let b = resolved.as_bytes();
        if b.len() > 3 && is_sep(b[0]) && is_sep(b[1]) && b[2] != b'?' && b[2] != b'.' {
            format!("\\\\?\\UNC\\{}", &resolved[2..])
        } else if b.len() >= 3 && b[1] == b':' && b[0].is_ascii_alphabetic() && is_sep(b[2]) {
            format!("\\\\?\\{}", resolved)
        } else {
            resolved
        }
    }

    fn posix(&self) -> PlatformHandle {
        super::posix()
    }

    fn win32(&self) -> PlatformHandle {
        super::win32()
    }
}

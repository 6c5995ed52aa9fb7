use std::path::{Component, Path};

use anyhow::bail;

/// Normalizes a storage key to `a/b/c` form. Keys never escape the store
/// root: parent components, drive prefixes and empty keys are rejected.
pub fn normalize_key(path: &str) -> anyhow::Result<String> {
    let unified = path.replace('\\', "/");
    let mut parts: Vec<&str> = Vec::new();
    for part in unified.split('/') {
        match part {
            "" | "." => continue,
            ".." => bail!("storage key escapes root: {path}"),
            p if p.contains(':') || p.contains('\0') => {
                bail!("invalid storage key segment: {path}")
            }
            p => parts.push(p),
        }
    }
    if parts.is_empty() {
        bail!("empty storage key");
    }
    Ok(parts.join("/"))
}

/// Turns a configured root such as `./uploads/` into an object key prefix.
pub fn normalize_prefix(root: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    for comp in root.components() {
        if let Component::Normal(os) = comp {
            let s = os.to_string_lossy();
            if !s.is_empty() && s != "." {
                parts.push(s.replace('\\', "/"));
            }
        }
    }
    parts.join("/")
}

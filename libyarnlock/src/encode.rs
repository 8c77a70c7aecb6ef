//! Phase 3: Encoder
//!
//! Walks the typed document and emits indented, sorted, comma-grouped
//! key/value text. Entries with structurally equal content collapse
//! onto one multi-key line; every scalar passes through the scalar
//! formatter so the output tokenizes back to the same document, byte
//! for byte when the document came from a parse of valid input.

use crate::format::wrap_scalar;
use crate::lockfile::{Entry, Lockfile};
use std::collections::HashMap;
use std::io::{self, Write};

/// Header emitted ahead of the entry blocks.
const HEADER: &str =
    "# THIS IS AN AUTOGENERATED FILE. DO NOT EDIT THIS FILE DIRECTLY.\n# yarn lockfile v1\n";

impl Lockfile {
    /// Serialize back to lockfile text. I/O failures surface unmodified.
    pub fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(HEADER.as_bytes())?;
        w.write_all(b"\n")?;

        for (joined_keys, entry) in group_entries(self) {
            w.write_all(b"\n")?;
            writeln!(w, "{}:", joined_keys)?;
            for line in encode_entry(entry) {
                writeln!(w, "{}", line)?;
            }
        }

        Ok(())
    }
}

/// Collapse content-equal entries into output groups. Each group's keys
/// are wrapped and sorted, then groups are sorted by their joined key
/// line.
fn group_entries(lockfile: &Lockfile) -> Vec<(String, &Entry)> {
    let mut keys: Vec<&String> = lockfile.entries.keys().collect();
    keys.sort();

    let mut groups: Vec<(Vec<&String>, &Entry)> = Vec::new();
    for key in keys {
        let entry = &lockfile.entries[key];
        match groups.iter_mut().find(|(_, e)| *e == entry) {
            Some((members, _)) => members.push(key),
            None => groups.push((vec![key], entry)),
        }
    }

    let mut out: Vec<(String, &Entry)> = groups
        .into_iter()
        .map(|(members, entry)| {
            let mut wrapped: Vec<String> = members.iter().map(|k| wrap_scalar(k)).collect();
            wrapped.sort();
            (wrapped.join(", "), entry)
        })
        .collect();
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}

/// Emit one entry body as indented lines, fields in fixed order.
fn encode_entry(entry: &Entry) -> Vec<String> {
    let mut lines = Vec::new();

    let scalars = [
        ("name", &entry.name),
        ("version", &entry.version),
        ("uid", &entry.uid),
        ("resolved", &entry.resolved),
        ("integrity", &entry.integrity),
        ("registry", &entry.registry),
    ];
    for (field, value) in scalars {
        if !value.is_empty() {
            lines.push(format!("  {} {}", wrap_scalar(field), wrap_scalar(value)));
        }
    }

    if !entry.dependencies.is_empty() {
        lines.extend(encode_map(&entry.dependencies, "dependencies", "  "));
    }
    if !entry.optional_dependencies.is_empty() {
        lines.extend(encode_map(
            &entry.optional_dependencies,
            "optionalDependencies",
            "  ",
        ));
    }

    lines
}

/// Emit a dependency map as a nested block: one line per name, sorted
/// by the wrapped name (one key per dependency, never grouped).
fn encode_map(map: &HashMap<String, String>, name: &str, pad: &str) -> Vec<String> {
    let mut lines = vec![format!("{}{}:", pad, wrap_scalar(name))];

    let mut items: Vec<(String, &String)> = map
        .iter()
        .map(|(k, v)| (wrap_scalar(k), v))
        .collect();
    items.sort_by(|a, b| a.0.cmp(&b.0));

    for (wrapped_key, value) in items {
        lines.push(format!("{}  {} {}", pad, wrapped_key, wrap_scalar(value)));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(version: &str, deps: &[(&str, &str)]) -> Entry {
        Entry {
            version: version.to_string(),
            dependencies: deps
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Entry::default()
        }
    }

    fn lockfile(entries: &[(&str, Entry)]) -> Lockfile {
        Lockfile {
            entries: entries
                .iter()
                .map(|(k, e)| (k.to_string(), e.clone()))
                .collect(),
        }
    }

    fn encode_to_string(lf: &Lockfile) -> String {
        let mut buf = Vec::new();
        lf.encode(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_encode_map_sorts_by_wrapped_key() {
        let map: HashMap<String, String> = [
            ("foo", "1.2.3"),
            ("true", "1.2.3"),
            ("@foo/bar", "1.2.3"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        assert_eq!(
            encode_map(&map, "test", ""),
            vec![
                "test:",
                "  \"@foo/bar\" \"1.2.3\"",
                "  \"true\" \"1.2.3\"",
                "  foo \"1.2.3\"",
            ]
        );
    }

    #[test]
    fn test_single_entry_layout() {
        let mut e = entry("1.0.1", &[("bar", "^2.0.0")]);
        e.resolved = "https://registry.test/foo-1.0.1.tgz".to_string();
        let lf = lockfile(&[("foo@^1.0.0", e)]);

        assert_eq!(
            encode_to_string(&lf),
            "# THIS IS AN AUTOGENERATED FILE. DO NOT EDIT THIS FILE DIRECTLY.\n\
             # yarn lockfile v1\n\
             \n\
             \n\
             foo@^1.0.0:\n  \
               version \"1.0.1\"\n  \
               resolved \"https://registry.test/foo-1.0.1.tgz\"\n  \
               dependencies:\n    \
                 bar \"^2.0.0\"\n"
        );
    }

    #[test]
    fn test_content_equal_entries_share_one_line() {
        let lf = lockfile(&[
            ("a@1.0.0", entry("1.0.0", &[])),
            ("b@1.0.0", entry("1.0.0", &[])),
        ]);

        let text = encode_to_string(&lf);
        assert!(text.contains("a@1.0.0, b@1.0.0:\n  version \"1.0.0\"\n"));
        // One shared body, not two.
        assert_eq!(text.matches("version").count(), 1);
    }

    #[test]
    fn test_grouped_keys_quoted_when_needed() {
        let lf = lockfile(&[
            ("@scope/a@^1.0.0", entry("1.0.0", &[])),
            ("@scope/b@^1.0.0", entry("1.0.0", &[])),
        ]);

        let text = encode_to_string(&lf);
        assert!(text.contains("\"@scope/a@^1.0.0\", \"@scope/b@^1.0.0\":\n"));
    }

    #[test]
    fn test_distinct_entries_stay_separate() {
        let lf = lockfile(&[
            ("a@1.0.0", entry("1.0.0", &[])),
            ("b@2.0.0", entry("2.0.0", &[])),
        ]);

        let text = encode_to_string(&lf);
        assert!(text.contains("a@1.0.0:\n  version \"1.0.0\"\n"));
        assert!(text.contains("b@2.0.0:\n  version \"2.0.0\"\n"));
    }

    #[test]
    fn test_blocks_sorted_and_blank_line_separated() {
        let lf = lockfile(&[
            ("z@1.0.0", entry("1.0.0", &[])),
            ("a@2.0.0", entry("2.0.0", &[])),
        ]);

        let text = encode_to_string(&lf);
        let a = text.find("a@2.0.0:").unwrap();
        let z = text.find("z@1.0.0:").unwrap();
        assert!(a < z);
        assert!(text.contains("version \"2.0.0\"\n\nz@1.0.0:"));
        assert!(text.ends_with("\n"));
        assert!(!text.ends_with("\n\n"));
    }

    #[test]
    fn test_optional_dependencies_block() {
        let mut e = entry("3.0.0", &[]);
        e.optional_dependencies
            .insert("fsevents".to_string(), "^2.3.2".to_string());
        let lf = lockfile(&[("chokidar@^3.0.0", e)]);

        let text = encode_to_string(&lf);
        assert!(text.contains("  optionalDependencies:\n    fsevents \"^2.3.2\"\n"));
    }

    #[test]
    fn test_empty_lockfile_is_header_only() {
        let text = encode_to_string(&Lockfile::default());
        assert_eq!(
            text,
            "# THIS IS AN AUTOGENERATED FILE. DO NOT EDIT THIS FILE DIRECTLY.\n\
             # yarn lockfile v1\n\n"
        );
    }
}

//! Boot-classpath auto-discovery (§6).
//!
//! The documented procedure: materialize a bundled helper jar to a temp
//! file, run `java -jar <tmp>`, parse `Boot-Class-Path:`/
//! `Class-Path-Separator:` lines out of its stdout, then delete the temp
//! file whether the probe succeeded or not.
//!
//! This repository does not bundle a prebuilt helper jar (doing so would
//! mean checking in a compiled binary produced by a toolchain this crate
//! cannot invoke); `HELPER_JAR` is therefore empty and [`probe`] always
//! takes the "no helper jar available" branch straight to the documented
//! fallback. The temp-file/subprocess/parse plumbing below is real and
//! would light up unmodified the day a real helper jar is added here.
const HELPER_JAR: &[u8] = &[];

/// On success, the discovered boot classpath entries and the separator the
/// helper reported (defaults to `:` per §6).
pub fn probe() -> Option<(Vec<String>, char)> {
    if HELPER_JAR.is_empty() {
        return None;
    }

    let mut tmp = tempfile::NamedTempFile::new().ok()?;
    std::io::Write::write_all(&mut tmp, HELPER_JAR).ok()?;
    let path = tmp.path().to_path_buf();

    let output = std::process::Command::new("java").arg("-jar").arg(&path).output().ok();
    // `tmp` is a `NamedTempFile`; it removes the temp file on drop
    // regardless of whether the probe above succeeded.
    drop(tmp);

    let output = output?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_probe_output(&stdout)
}

fn parse_probe_output(stdout: &str) -> Option<(Vec<String>, char)> {
    let mut separator = ':';
    let mut paths = None;
    for line in stdout.lines() {
        if let Some(rest) = line.strip_prefix("Class-Path-Separator: ") {
            separator = rest.chars().next().unwrap_or(':');
        } else if let Some(rest) = line.strip_prefix("Boot-Class-Path: ") {
            paths = Some(rest.to_string());
        }
    }
    let paths = paths?;
    Some((paths.split(separator).map(str::to_string).collect(), separator))
}

/// Darwin fallback list (§6): a fixed set of jars under the bundled JDK 6
/// runtime, used only when the helper-jar probe fails and the host looks
/// like macOS.
pub fn darwin_fallback() -> Vec<String> {
    const BASE: &str = "/System/Library/Java/JavaVirtualMachines/1.6.0.jdk/Contents/Classes";
    ["jsfd", "classes", "ui", "laf", "sunrsasign", "jsse", "jce", "charsets"]
        .iter()
        .map(|name| format!("{BASE}/{name}.jar"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_boot_class_path_and_separator() {
        let stdout = "Boot-Class-Path: /a/rt.jar:/a/charsets.jar\nClass-Path-Separator: :\n";
        let (paths, sep) = parse_probe_output(stdout).unwrap();
        assert_eq!(paths, vec!["/a/rt.jar".to_string(), "/a/charsets.jar".to_string()]);
        assert_eq!(sep, ':');
    }

    #[test]
    fn missing_boot_class_path_line_is_none() {
        assert!(parse_probe_output("Class-Path-Separator: :\n").is_none());
    }

    #[test]
    fn darwin_fallback_lists_eight_jars() {
        assert_eq!(darwin_fallback().len(), 8);
    }
}

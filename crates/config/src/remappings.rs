//! `remappings.txt` (or the toolchain's "remappings" command output),
//! consumed read-only as `context:path` pairs (§6).

use std::path::Path;

pub fn parse(text: &str) -> Vec<(String, String)> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(a, b)| (a.trim().to_string(), b.trim().to_string()))
        .collect()
}

pub fn load(path: &Path) -> std::io::Result<Vec<(String, String)>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = std::fs::read_to_string(path)?;
    Ok(parse(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_context_path_pairs() {
        let text = "@openzeppelin/=lib/openzeppelin-contracts/\nforge-std/=lib/forge-std/src/\n";
        let remaps = parse(text);
        assert_eq!(remaps.len(), 2);
        assert_eq!(remaps[0], ("@openzeppelin/".to_string(), "lib/openzeppelin-contracts/".to_string()));
    }

    #[test]
    fn skips_blank_lines_and_comments() {
        let text = "\n# a comment\nforge-std/=lib/forge-std/src/\n\n";
        assert_eq!(parse(text).len(), 1);
    }
}

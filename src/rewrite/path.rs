//! Lexical path cleaning.

/// Return the shortest path equivalent to `path` by purely lexical processing.
///
/// - repeated `/` collapse into one
/// - `.` segments are dropped
/// - `..` removes the preceding segment; at the root it is dropped
/// - a trailing `/` is removed, except for the root itself
///
/// An empty path cleans to `.`. Relative paths stay relative, keeping any
/// leading `..` segments they cannot resolve.
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            s => segments.push(s),
        }
    }

    let joined = segments.join("/");
    if rooted {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_rooted() {
        let cases = [
            ("/", "/"),
            ("/a/b", "/a/b"),
            ("/a/b/", "/a/b"),
            ("//a//b//", "/a/b"),
            ("/a/./b/.", "/a/b"),
            ("/a/../b", "/b"),
            ("/a/b/../../c", "/c"),
            ("/../a", "/a"),
            ("/..", "/"),
            ("/a/..", "/"),
        ];
        for (input, expected) in cases {
            assert_eq!(clean(input), expected, "clean({:?})", input);
        }
    }

    #[test]
    fn test_clean_relative() {
        assert_eq!(clean(""), ".");
        assert_eq!(clean("."), ".");
        assert_eq!(clean("a/"), "a");
        assert_eq!(clean("a/.."), ".");
        assert_eq!(clean("../a"), "../a");
        assert_eq!(clean("a/../../b"), "../b");
    }

    #[test]
    fn test_clean_is_idempotent() {
        for input in ["/x//y/../z/", "a/./b/../../..", "/p/q/./r"] {
            let once = clean(input);
            assert_eq!(clean(&once), once);
        }
    }
}

/// Canonical form of a URL path, used before fixed-path redirects.
///
/// Applied until nothing changes:
/// 1. Repeated slashes collapse to one.
/// 2. `.` elements are dropped.
/// 3. Each `..` removes itself and the element before it.
/// 4. A `..` at the root is dropped.
///
/// The result always starts with `/`. A trailing slash (or a final `.`
/// element) is kept unless the result is the root.
#[must_use]
pub fn clean_path(p: &str) -> String {
    let mut trailing = false;
    let mut segments: Vec<&str> = Vec::new();

    for seg in p.split('/') {
        match seg {
            "" => {}
            "." => trailing = true,
            ".." => {
                trailing = false;
                segments.pop();
            }
            s => {
                trailing = false;
                segments.push(s);
            }
        }
    }
    if p.ends_with('/') && p.len() > 1 {
        trailing = true;
    }

    let mut out = String::with_capacity(p.len() + 1);
    out.push('/');
    out.push_str(&segments.join("/"));
    if trailing && !segments.is_empty() {
        out.push('/');
    }
    out
}

//! Radix tree implementation for HTTP route matching
//!
//! A compressed prefix tree over the raw bytes of route patterns. Chains of
//! single-child nodes are merged, so `/users/new` and `/users/:id` share one
//! `/users/` node and lookups cost O(k) in the path length, independent of
//! the number of registered routes.
//!
//! ## Pattern syntax
//!
//! ```text
//!  Syntax    Type
//!  :name     named parameter, matches up to the next '/' or the path end
//!  *name     catch-all, matches the rest of the path including the leading '/'
//! ```
//!
//! A position in the tree holds either static children or exactly one
//! wildcard child, never both. `/users/new` and `/users/:id` therefore
//! conflict, which keeps every request path matching at most one route.
//!
//! ## Example
//!
//! ```rust
//! use radixroute::router::RadixTree;
//!
//! let mut tree = RadixTree::new();
//! tree.insert("/blog/:category/:post", "show_post").unwrap();
//! tree.insert("/files/*filepath", "serve_file").unwrap();
//!
//! let hit = tree.find("/blog/rust/routers").unwrap();
//! assert_eq!(hit.value, Some(&"show_post"));
//! assert_eq!(hit.params.get("post"), Some("routers"));
//!
//! // no match, but the route exists without the trailing slash
//! let miss = tree.find("/blog/rust/routers/").unwrap();
//! assert!(miss.value.is_none());
//! assert!(miss.redirect_trailing_slash);
//! ```
//!
//! ## Build / serve split
//!
//! [`RadixTree::insert`] takes `&mut self` and [`RadixTree::find`] takes
//! `&self`: once the build phase hands out shared references the tree is
//! immutable and any number of threads can query it without locking. Each
//! lookup allocates its own [`PathParams`].

use std::mem;

use super::error::{ConflictKind, RouterError};
use super::params::PathParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeType {
    Static,
    Root,
    Param,
    CatchAll,
}

/// Node in the radix tree
///
/// `priority` is the number of values registered in the subtree. Children
/// are kept sorted by it (descending) so branchier prefixes are scanned
/// first.
#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    path: Vec<u8>,
    wild_child: bool,
    node_type: NodeType,
    max_params: u8,
    indices: Vec<u8>,
    children: Vec<Node<T>>,
    value: Option<T>,
    priority: u32,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            path: Vec::new(),
            wild_child: false,
            node_type: NodeType::Static,
            max_params: 0,
            indices: Vec::new(),
            children: Vec::new(),
            value: None,
            priority: 0,
        }
    }
}

/// Result of [`RadixTree::find`]
#[derive(Debug)]
pub struct Lookup<'t, T> {
    /// Value bound to the matched route
    pub value: Option<&'t T>,
    /// Wildcard values in left-to-right path order
    pub params: PathParams,
    /// No match, but the path with a trailing slash added or removed would match
    pub redirect_trailing_slash: bool,
}

impl<'t, T> Lookup<'t, T> {
    fn hit(value: &'t T, params: Option<PathParams>) -> Self {
        Self {
            value: Some(value),
            params: params.unwrap_or_default(),
            redirect_trailing_slash: false,
        }
    }

    fn miss(params: Option<PathParams>, tsr: bool) -> Self {
        Self {
            value: None,
            params: params.unwrap_or_default(),
            redirect_trailing_slash: tsr,
        }
    }

    #[must_use]
    pub fn is_match(&self) -> bool {
        self.value.is_some()
    }
}

/// Radix tree mapping route patterns to values of type `T`
#[derive(Debug, Clone)]
pub struct RadixTree<T> {
    root: Node<T>,
    len: usize,
}

impl<T> Default for RadixTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RadixTree<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::default(),
            len: 0,
        }
    }

    /// Number of registered values
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Register `value` under the route pattern `path`.
    ///
    /// On error every previously registered route still resolves as before;
    /// edges may have been split and priorities bumped along the way.
    ///
    /// # Errors
    ///
    /// [`RouterError::Conflict`] when a wildcard is malformed or collides with
    /// existing routes, [`RouterError::DuplicateRoute`] when the pattern is
    /// already registered.
    pub fn insert(&mut self, path: &str, value: T) -> Result<(), RouterError> {
        validate_pattern(path)?;
        self.root.add_route(path, value)?;
        self.len += 1;
        Ok(())
    }

    /// Look up the value registered for a concrete request path.
    ///
    /// # Errors
    ///
    /// [`RouterError::InvalidNodeType`] if the tree is internally inconsistent.
    pub fn find(&self, path: &str) -> Result<Lookup<'_, T>, RouterError> {
        self.root.get_value(path.as_bytes())
    }

    /// Case-insensitive lookup returning the registered spelling of `path`.
    ///
    /// With `fix_trailing_slash` a missing or superfluous trailing slash is
    /// also corrected. Returns `Ok(None)` when nothing matches.
    ///
    /// # Errors
    ///
    /// [`RouterError::InvalidNodeType`] if the tree is internally inconsistent.
    pub fn find_case_insensitive(
        &self,
        path: &str,
        fix_trailing_slash: bool,
    ) -> Result<Option<String>, RouterError> {
        let (ci_path, found) = self.root.find_case_insensitive_rec(
            path.as_bytes(),
            Vec::with_capacity(path.len() + 1),
            [0; 4],
            fix_trailing_slash,
            false,
        )?;
        Ok(found.then(|| String::from_utf8_lossy(&ci_path).into_owned()))
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> &Node<T> {
        &self.root
    }
}

fn is_wildcard(c: u8) -> bool {
    c == b':' || c == b'*'
}

fn count_params(path: &[u8]) -> u8 {
    let n = path.iter().filter(|&&c| is_wildcard(c)).count();
    u8::try_from(n).unwrap_or(u8::MAX)
}

fn longest_common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Pattern-local checks, done before the tree is touched.
fn validate_pattern(full_path: &str) -> Result<(), RouterError> {
    let path = full_path.as_bytes();
    let mut i = 0;
    while i < path.len() {
        let c = path[i];
        if !is_wildcard(c) {
            i += 1;
            continue;
        }

        let mut end = i + 1;
        while end < path.len() && path[end] != b'/' {
            if is_wildcard(path[end]) {
                return Err(RouterError::conflict(
                    full_path,
                    ConflictKind::MultipleWildcards,
                ));
            }
            end += 1;
        }

        if end - i < 2 {
            return Err(RouterError::conflict(
                full_path,
                ConflictKind::UnnamedWildcard,
            ));
        }

        if c == b'*' {
            if end != path.len() {
                return Err(RouterError::conflict(
                    full_path,
                    ConflictKind::CatchAllNotAtEnd,
                ));
            }
            if i == 0 || path[i - 1] != b'/' {
                return Err(RouterError::conflict(full_path, ConflictKind::MissingSlash));
            }
        }
        i = end;
    }
    Ok(())
}

impl<T> Node<T> {
    /// Bump the priority of child `pos` and move it in front of siblings
    /// with a lower priority. Returns the new position.
    fn increment_child_prio(&mut self, pos: usize) -> usize {
        self.children[pos].priority += 1;
        let prio = self.children[pos].priority;

        let mut new_pos = pos;
        while new_pos > 0 && self.children[new_pos - 1].priority < prio {
            self.children.swap(new_pos - 1, new_pos);
            new_pos -= 1;
        }

        if new_pos != pos {
            let c = self.indices.remove(pos);
            self.indices.insert(new_pos, c);
        }
        new_pos
    }

    fn add_route(&mut self, full_path: &str, value: T) -> Result<(), RouterError> {
        let mut path = full_path.as_bytes();
        let mut num_params = count_params(path);
        let mut n = self;
        n.priority += 1;

        // empty tree
        if n.path.is_empty() && n.children.is_empty() {
            n.max_params = num_params;
            n.insert_child(num_params, path, full_path, value)?;
            n.node_type = NodeType::Root;
            return Ok(());
        }

        'walk: loop {
            if num_params > n.max_params {
                n.max_params = num_params;
            }

            // The common prefix never contains ':' or '*' since static node
            // paths can't.
            let i = longest_common_prefix(path, &n.path);

            // split edge
            if i < n.path.len() {
                let mut child = Node {
                    path: n.path[i..].to_vec(),
                    wild_child: n.wild_child,
                    node_type: NodeType::Static,
                    max_params: 0,
                    indices: mem::take(&mut n.indices),
                    children: mem::take(&mut n.children),
                    value: n.value.take(),
                    priority: n.priority.saturating_sub(1),
                };
                child.max_params = child
                    .children
                    .iter()
                    .map(|c| c.max_params)
                    .max()
                    .unwrap_or(0);

                n.indices = vec![n.path[i]];
                n.path.truncate(i);
                n.children = vec![child];
                n.wild_child = false;
            }

            if i == path.len() {
                // the node itself terminates the route
                if n.value.is_some() {
                    return Err(RouterError::DuplicateRoute {
                        path: full_path.to_string(),
                    });
                }
                n.value = Some(value);
                return Ok(());
            }

            path = &path[i..];

            if n.wild_child {
                n = &mut n.children[0];
                n.priority += 1;

                if num_params > n.max_params {
                    n.max_params = num_params;
                }
                num_params = num_params.saturating_sub(1);

                // The wildcard must match exactly; a longer name such as
                // `:names` against `:name` is a conflict, and nothing can be
                // added below a catch-all.
                let wildcard_matches = path.len() >= n.path.len()
                    && n.path[..] == path[..n.path.len()]
                    && n.node_type != NodeType::CatchAll
                    && (n.path.len() >= path.len() || path[n.path.len()] == b'/');
                if wildcard_matches {
                    continue 'walk;
                }

                let segment = if n.node_type == NodeType::CatchAll {
                    path
                } else {
                    path.split(|&b| b == b'/').next().unwrap_or(path)
                };
                return Err(RouterError::conflict(
                    full_path,
                    ConflictKind::WildcardMismatch {
                        segment: String::from_utf8_lossy(segment).into_owned(),
                        existing: String::from_utf8_lossy(&n.path).into_owned(),
                    },
                ));
            }

            let c = path[0];

            // slash after param
            if n.node_type == NodeType::Param && c == b'/' && n.children.len() == 1 {
                n = &mut n.children[0];
                n.priority += 1;
                continue 'walk;
            }

            if let Some(pos) = n.indices.iter().position(|&b| b == c) {
                let pos = n.increment_child_prio(pos);
                n = &mut n.children[pos];
                continue 'walk;
            }

            if !is_wildcard(c) {
                n.indices.push(c);
                n.children.push(Node {
                    max_params: num_params,
                    ..Node::default()
                });
                let pos = n.increment_child_prio(n.indices.len() - 1);
                n = &mut n.children[pos];
            }
            return n.insert_child(num_params, path, full_path, value);
        }
    }

    /// Append `path` (which may contain wildcards) below this node.
    /// The pattern has already passed [`validate_pattern`].
    fn insert_child(
        &mut self,
        mut num_params: u8,
        path: &[u8],
        full_path: &str,
        value: T,
    ) -> Result<(), RouterError> {
        let mut n = self;
        let mut offset = 0;
        let max = path.len();
        let mut i = 0;

        while num_params > 0 && i < max {
            let c = path[i];
            if !is_wildcard(c) {
                i += 1;
                continue;
            }

            let end = path[i..]
                .iter()
                .position(|&b| b == b'/')
                .map_or(max, |p| i + p);

            // existing children would become unreachable
            if !n.children.is_empty() {
                return Err(RouterError::conflict(
                    full_path,
                    ConflictKind::StaticChildren,
                ));
            }

            if c == b':' {
                if i > 0 {
                    n.path = path[offset..i].to_vec();
                    offset = i;
                }

                n.children = vec![Node {
                    node_type: NodeType::Param,
                    max_params: num_params,
                    ..Node::default()
                }];
                n.wild_child = true;
                n = &mut n.children[0];
                n.priority += 1;
                num_params -= 1;

                // more path follows the parameter, starting with '/'
                if end < max {
                    n.path = path[offset..end].to_vec();
                    offset = end;

                    n.children = vec![Node {
                        max_params: num_params,
                        priority: 1,
                        ..Node::default()
                    }];
                    n = &mut n.children[0];
                }
                i = end;
                continue;
            }

            // catch-all
            if n.path.last() == Some(&b'/') {
                return Err(RouterError::conflict(full_path, ConflictKind::CatchAllRoot));
            }
            if i == 0 || path[i - 1] != b'/' {
                return Err(RouterError::conflict(full_path, ConflictKind::MissingSlash));
            }
            let slash = i - 1;

            n.path = path[offset..slash].to_vec();
            n.max_params = n.max_params.max(1);
            n.indices = vec![b'/'];

            // first node: empty catch-all marker, second node: holds the name
            n.children = vec![Node {
                wild_child: true,
                node_type: NodeType::CatchAll,
                max_params: 1,
                priority: 1,
                children: vec![Node {
                    path: path[slash..].to_vec(),
                    node_type: NodeType::CatchAll,
                    max_params: 1,
                    value: Some(value),
                    priority: 1,
                    ..Node::default()
                }],
                ..Node::default()
            }];
            return Ok(());
        }

        n.path = path[offset..].to_vec();
        n.value = Some(value);
        Ok(())
    }

    fn get_value(&self, path: &[u8]) -> Result<Lookup<'_, T>, RouterError> {
        let mut n = self;
        let mut path = path;
        let mut params: Option<PathParams> = None;
        // whether the path consumed before `n` is itself a route
        let mut parent_has_value = false;

        'walk: loop {
            let prefix = &n.path[..];

            if path.len() > prefix.len() {
                if &path[..prefix.len()] != prefix {
                    break 'walk;
                }
                path = &path[prefix.len()..];

                if !n.wild_child {
                    let c = path[0];
                    if let Some(i) = n.indices.iter().position(|&b| b == c) {
                        parent_has_value = n.value.is_some();
                        n = &n.children[i];
                        continue 'walk;
                    }

                    // a route exists for the path without the trailing slash
                    let tsr = path == b"/" && n.value.is_some();
                    return Ok(Lookup::miss(params, tsr));
                }

                n = &n.children[0];
                match n.node_type {
                    NodeType::Param => {
                        let end = path.iter().position(|&b| b == b'/').unwrap_or(path.len());

                        params
                            .get_or_insert_with(|| PathParams::with_capacity(n.max_params.into()))
                            .push_bytes(&n.path[1..], &path[..end]);

                        if end < path.len() {
                            if let Some(child) = n.children.first() {
                                path = &path[end..];
                                parent_has_value = n.value.is_some();
                                n = child;
                                continue 'walk;
                            }
                            return Ok(Lookup::miss(params, path.len() == end + 1));
                        }

                        if let Some(value) = n.value.as_ref() {
                            return Ok(Lookup::hit(value, params));
                        }
                        let tsr = n.children.len() == 1
                            && n.children[0].path == b"/"
                            && n.children[0].value.is_some();
                        return Ok(Lookup::miss(params, tsr));
                    }
                    NodeType::CatchAll => {
                        params
                            .get_or_insert_with(|| PathParams::with_capacity(n.max_params.into()))
                            .push_bytes(&n.path[2..], path);

                        return Ok(match n.value.as_ref() {
                            Some(value) => Lookup::hit(value, params),
                            None => Lookup::miss(params, false),
                        });
                    }
                    NodeType::Static | NodeType::Root => return Err(RouterError::InvalidNodeType),
                }
            }

            if path == prefix {
                if let Some(value) = n.value.as_ref() {
                    return Ok(Lookup::hit(value, params));
                }

                if path == b"/" && n.wild_child && parent_has_value {
                    return Ok(Lookup::miss(params, true));
                }

                // a route exists for the path with a trailing slash
                let tsr = n
                    .indices
                    .iter()
                    .position(|&b| b == b'/')
                    .map(|i| &n.children[i])
                    .is_some_and(|child| {
                        (child.path.len() == 1 && child.value.is_some())
                            || (child.node_type == NodeType::CatchAll
                                && child.children.first().is_some_and(|c| c.value.is_some()))
                    });
                return Ok(Lookup::miss(params, tsr));
            }

            break 'walk;
        }

        // Nothing found. Recommend dropping a lone '/' remainder if the parent
        // holds a value, or adding one if the node path is the request path
        // plus '/'.
        let prefix = &n.path[..];
        let tsr = (path == b"/" && parent_has_value)
            || (prefix.len() == path.len() + 1
                && prefix[path.len()] == b'/'
                && path == &prefix[..path.len()]
                && n.value.is_some());
        Ok(Lookup::miss(params, tsr))
    }

    fn find_case_insensitive_rec(
        &self,
        path: &[u8],
        mut ci_path: Vec<u8>,
        mut rb: [u8; 4],
        fix_trailing_slash: bool,
        mut parent_has_value: bool,
    ) -> Result<(Vec<u8>, bool), RouterError> {
        let mut n = self;
        let mut path = path;
        let mut np_len = n.path.len();

        'walk: while path.len() >= np_len
            && (np_len == 0 || eq_fold(&path[1..np_len], &n.path[1..]))
        {
            let old_path = path;
            path = &path[np_len..];
            ci_path.extend_from_slice(&n.path);

            if path.is_empty() {
                if n.value.is_some() {
                    return Ok((ci_path, true));
                }

                // try adding a trailing slash
                if fix_trailing_slash {
                    if let Some(i) = n.indices.iter().position(|&b| b == b'/') {
                        let child = &n.children[i];
                        if (child.path.len() == 1 && child.value.is_some())
                            || (child.node_type == NodeType::CatchAll
                                && child.children.first().is_some_and(|c| c.value.is_some()))
                        {
                            ci_path.push(b'/');
                            return Ok((ci_path, true));
                        }
                    }
                }
                return Ok((ci_path, false));
            }

            if !n.wild_child {
                // skip rune bytes already matched by the node path
                rb = shift_rune_bytes(rb, np_len);

                if rb[0] != 0 {
                    // continue an unfinished rune
                    if let Some(i) = n.indices.iter().position(|&b| b == rb[0]) {
                        parent_has_value = n.value.is_some();
                        n = &n.children[i];
                        np_len = n.path.len();
                        continue 'walk;
                    }
                } else {
                    // Find the start of the current rune; it may begin up to
                    // three bytes before the node boundary.
                    let mut rv = '\0';
                    let mut off = 0;
                    while off <= np_len.min(3) {
                        let i = np_len - off;
                        if is_rune_start(old_path[i]) {
                            rv = decode_rune(&old_path[i..]);
                            break;
                        }
                        off += 1;
                    }

                    let lo = rv.to_lowercase().next().unwrap_or(rv);
                    rb = shift_rune_bytes(encode_rune(lo), off);

                    // Both the lower- and upper-case byte may exist as an
                    // index, so the lower-case branch is tried recursively.
                    if let Some(i) = n.indices.iter().position(|&b| b == rb[0]) {
                        let (out, found) = n.children[i].find_case_insensitive_rec(
                            path,
                            ci_path.clone(),
                            rb,
                            fix_trailing_slash,
                            n.value.is_some(),
                        )?;
                        if found {
                            return Ok((out, true));
                        }
                    }

                    let up = rv.to_uppercase().next().unwrap_or(rv);
                    if up != lo {
                        rb = shift_rune_bytes(encode_rune(up), off);
                        if let Some(i) = n.indices.iter().position(|&b| b == rb[0]) {
                            parent_has_value = n.value.is_some();
                            n = &n.children[i];
                            np_len = n.path.len();
                            continue 'walk;
                        }
                    }
                }

                let tsr = fix_trailing_slash && path == b"/" && n.value.is_some();
                return Ok((ci_path, tsr));
            }

            n = &n.children[0];
            match n.node_type {
                NodeType::Param => {
                    let k = path.iter().position(|&b| b == b'/').unwrap_or(path.len());
                    ci_path.extend_from_slice(&path[..k]);

                    if k < path.len() {
                        if let Some(child) = n.children.first() {
                            parent_has_value = n.value.is_some();
                            n = child;
                            np_len = n.path.len();
                            path = &path[k..];
                            continue 'walk;
                        }
                        return Ok((ci_path, fix_trailing_slash && path.len() == k + 1));
                    }

                    if n.value.is_some() {
                        return Ok((ci_path, true));
                    }
                    if fix_trailing_slash && n.children.len() == 1 {
                        let child = &n.children[0];
                        if child.path == b"/" && child.value.is_some() {
                            ci_path.push(b'/');
                            return Ok((ci_path, true));
                        }
                    }
                    return Ok((ci_path, false));
                }
                NodeType::CatchAll => {
                    ci_path.extend_from_slice(path);
                    return Ok((ci_path, true));
                }
                NodeType::Static | NodeType::Root => return Err(RouterError::InvalidNodeType),
            }
        }

        // Nothing found. Try adding / removing a trailing slash.
        if fix_trailing_slash {
            if path == b"/" && parent_has_value {
                return Ok((ci_path, true));
            }
            if !path.is_empty()
                && path.len() + 1 == np_len
                && n.path[path.len()] == b'/'
                && eq_fold(&path[1..], &n.path[1..path.len()])
                && n.value.is_some()
            {
                ci_path.extend_from_slice(&n.path);
                return Ok((ci_path, true));
            }
        }
        Ok((ci_path, false))
    }

    #[cfg(test)]
    pub(crate) fn check_priorities(&self) -> Result<u32, (u32, u32)> {
        let mut prio = 0;
        for child in &self.children {
            prio += child.check_priorities()?;
        }
        if self.value.is_some() {
            prio += 1;
        }
        if self.priority != prio {
            return Err((self.priority, prio));
        }
        Ok(prio)
    }

    #[cfg(test)]
    pub(crate) fn check_max_params(&self) -> u8 {
        let mut max = 0;
        for child in &self.children {
            max = max.max(child.check_max_params());
        }
        if matches!(self.node_type, NodeType::Param | NodeType::CatchAll) && !self.wild_child {
            max += 1;
        }
        assert!(
            self.max_params == max,
            "max_params mismatch for node '{}': is {}, should be {}",
            String::from_utf8_lossy(&self.path),
            self.max_params,
            max
        );
        max
    }
}

fn is_rune_start(b: u8) -> bool {
    b & 0xC0 != 0x80
}

fn decode_rune(bytes: &[u8]) -> char {
    for len in 1..=bytes.len().min(4) {
        if let Ok(s) = std::str::from_utf8(&bytes[..len]) {
            if let Some(c) = s.chars().next() {
                return c;
            }
        }
    }
    char::REPLACEMENT_CHARACTER
}

fn encode_rune(c: char) -> [u8; 4] {
    let mut buf = [0; 4];
    c.encode_utf8(&mut buf);
    buf
}

fn shift_rune_bytes(rb: [u8; 4], n: usize) -> [u8; 4] {
    match n {
        0 => rb,
        1 => [rb[1], rb[2], rb[3], 0],
        2 => [rb[2], rb[3], 0, 0],
        3 => [rb[3], 0, 0, 0],
        _ => [0; 4],
    }
}

/// Unicode case-insensitive comparison. Node boundaries may cut through a
/// multi-byte sequence; such fragments decode to U+FFFD on both sides.
fn eq_fold(a: &[u8], b: &[u8]) -> bool {
    let a = String::from_utf8_lossy(a);
    let b = String::from_utf8_lossy(b);
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

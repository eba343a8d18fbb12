use std::collections::HashMap;
use std::sync::RwLock;

/// Thread-safe trie routing state paths to subscription entries.
///
/// Patterns are `/`-separated with two wildcards:
/// - `+` matches exactly one segment
/// - `#` matches all remaining segments (terminal)
///
/// `"auth/+"` matches `"auth/session"` but not `"auth/a/b"`;
/// `"data/#"` matches every path under `data`, including `"data"` itself.
pub struct PatternTrie<T> {
    root: RwLock<Node<T>>,
}

struct Node<T> {
    children: HashMap<String, Node<T>>,
    /// `+` child.
    one: Option<Box<Node<T>>>,
    /// Values bound to a `#` terminating at this level.
    rest: Vec<T>,
    /// Values bound to a pattern terminating at this level.
    values: Vec<T>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            children: HashMap::new(),
            one: None,
            rest: Vec::new(),
            values: Vec::new(),
        }
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').collect()
}

impl<T: Clone> PatternTrie<T> {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(Node::default()),
        }
    }

    pub fn add(&self, pattern: &str, value: T) {
        self.root.write().unwrap().add(&segments(pattern), value);
    }

    /// Collect every value whose pattern matches the concrete path.
    pub fn matches(&self, path: &str) -> Vec<T> {
        if path.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::new();
        self.root
            .read()
            .unwrap()
            .collect(&segments(path), &mut out);
        out
    }

    /// Remove values under the exact pattern for which the predicate
    /// holds. Returns whether anything was removed.
    pub fn remove_where<F>(&self, pattern: &str, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        self.root
            .write()
            .unwrap()
            .remove_where(&segments(pattern), &predicate)
    }
}

impl<T: Clone> Default for PatternTrie<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Node<T> {
    fn add(&mut self, pattern: &[&str], value: T) {
        match pattern.split_first() {
            None => self.values.push(value),
            Some((&"#", _)) => self.rest.push(value),
            Some((&"+", tail)) => self
                .one
                .get_or_insert_with(|| Box::new(Node::default()))
                .add(tail, value),
            Some((&seg, tail)) => self
                .children
                .entry(seg.to_string())
                .or_default()
                .add(tail, value),
        }
    }

    fn collect(&self, path: &[&str], out: &mut Vec<T>) {
        // `#` bound here matches whatever remains, including nothing.
        out.extend(self.rest.iter().cloned());

        let Some((&seg, tail)) = path.split_first() else {
            out.extend(self.values.iter().cloned());
            return;
        };
        if let Some(child) = self.children.get(seg) {
            child.collect(tail, out);
        }
        if let Some(one) = &self.one {
            one.collect(tail, out);
        }
    }

    fn remove_where<F>(&mut self, pattern: &[&str], predicate: &F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        let drain = |values: &mut Vec<T>| {
            let before = values.len();
            values.retain(|v| !predicate(v));
            values.len() < before
        };
        match pattern.split_first() {
            None => drain(&mut self.values),
            Some((&"#", _)) => drain(&mut self.rest),
            Some((&"+", tail)) => self
                .one
                .as_mut()
                .is_some_and(|child| child.remove_where(tail, predicate)),
            Some((&seg, tail)) => self
                .children
                .get_mut(seg)
                .is_some_and(|child| child.remove_where(tail, predicate)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_patterns_route_by_path() {
        let trie = PatternTrie::new();
        trie.add("auth/session", 1);
        trie.add("app/route", 2);

        assert_eq!(trie.matches("auth/session"), vec![1]);
        assert_eq!(trie.matches("app/route"), vec![2]);
        assert!(trie.matches("app/theme").is_empty());
        assert!(trie.matches("auth").is_empty());
    }

    #[test]
    fn plus_matches_exactly_one_segment() {
        let trie = PatternTrie::new();
        trie.add("auth/+", 10);

        assert_eq!(trie.matches("auth/session"), vec![10]);
        assert!(trie.matches("auth").is_empty());
        assert!(trie.matches("auth/a/b").is_empty());
        assert!(trie.matches("app/session").is_empty());
    }

    #[test]
    fn plus_in_the_middle() {
        let trie = PatternTrie::new();
        trie.add("data/+/page", 10);

        assert_eq!(trie.matches("data/leads/page"), vec![10]);
        assert_eq!(trie.matches("data/users/page"), vec![10]);
        assert!(trie.matches("data/leads/options").is_empty());
    }

    #[test]
    fn hash_matches_any_depth_including_zero() {
        let trie = PatternTrie::new();
        trie.add("data/#", 20);

        assert_eq!(trie.matches("data"), vec![20]);
        assert_eq!(trie.matches("data/leads"), vec![20]);
        assert_eq!(trie.matches("data/leads/page/3"), vec![20]);
        assert!(trie.matches("auth/session").is_empty());
    }

    #[test]
    fn root_hash_matches_everything() {
        let trie = PatternTrie::new();
        trie.add("#", 99);

        assert_eq!(trie.matches("x"), vec![99]);
        assert_eq!(trie.matches("auth/session"), vec![99]);
        assert!(trie.matches("").is_empty());
    }

    #[test]
    fn overlapping_patterns_all_fire() {
        let trie = PatternTrie::new();
        trie.add("auth/session", 1);
        trie.add("auth/+", 2);
        trie.add("auth/#", 3);
        trie.add("#", 4);

        let mut got = trie.matches("auth/session");
        got.sort();
        assert_eq!(got, vec![1, 2, 3, 4]);
    }

    #[test]
    fn similar_prefixes_do_not_bleed() {
        let trie = PatternTrie::new();
        trie.add("auth/session", 1);
        trie.add("author/session", 2);

        assert_eq!(trie.matches("auth/session"), vec![1]);
        assert_eq!(trie.matches("author/session"), vec![2]);
    }

    #[test]
    fn multiple_values_on_one_pattern() {
        let trie = PatternTrie::new();
        trie.add("app/route", 1);
        trie.add("app/route", 2);

        let got = trie.matches("app/route");
        assert_eq!(got.len(), 2);
    }

    #[test]
    fn remove_where_targets_the_exact_pattern() {
        let trie = PatternTrie::new();
        trie.add("app/route", 1);
        trie.add("app/route", 2);
        trie.add("app/+", 3);

        assert!(trie.remove_where("app/route", |v| *v == 1));
        let mut got = trie.matches("app/route");
        got.sort();
        assert_eq!(got, vec![2, 3]);

        assert!(trie.remove_where("app/+", |v| *v == 3));
        assert_eq!(trie.matches("app/route"), vec![2]);
    }

    #[test]
    fn remove_where_missing_is_false() {
        let trie = PatternTrie::new();
        trie.add("auth/session", 1);

        assert!(!trie.remove_where("auth/session", |v| *v == 9));
        assert!(!trie.remove_where("nope/session", |_| true));
        assert!(!trie.remove_where("auth/#", |_| true));
    }

    #[test]
    fn remove_where_hash_pattern() {
        let trie = PatternTrie::new();
        trie.add("data/#", 10);
        trie.add("data/#", 20);

        assert!(trie.remove_where("data/#", |v| *v == 10));
        assert_eq!(trie.matches("data/leads"), vec![20]);
    }

    #[test]
    fn concurrent_add_and_match() {
        use std::sync::Arc;
        use std::thread;

        let trie = Arc::new(PatternTrie::new());
        let mut handles = vec![];
        for i in 0..8 {
            let trie = Arc::clone(&trie);
            handles.push(thread::spawn(move || {
                trie.add(&format!("data/{i}"), i);
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        for i in 0..8 {
            assert_eq!(trie.matches(&format!("data/{i}")), vec![i]);
        }
    }
}

use std::collections::{BTreeMap, VecDeque};
use std::iter::FusedIterator;
use std::str::Chars;

const ROOT: usize = 0;

#[derive(Debug, Clone, Default)]
struct Node {
    transitions: BTreeMap<char, usize>,
    failure: usize,
    /// Keyword spelled by the path from the root to this node
    keyword: Option<usize>,
    /// Own keyword first, then everything reachable through the failure link
    outputs: Vec<usize>,
}

/// Aho-Corasick automaton over a fixed keyword set.
///
/// Built once, then queried with a single pass over the text per call. An
/// automaton without keywords matches nothing.
#[derive(Debug, Clone)]
pub struct AhoCorasickTree {
    nodes: Vec<Node>,
    keywords: Vec<String>,
}

impl Default for AhoCorasickTree {
    fn default() -> Self {
        Self {
            nodes: vec![Node::default()],
            keywords: Vec::new(),
        }
    }
}

impl AhoCorasickTree {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::default();
        for keyword in keywords {
            tree.insert(keyword.as_ref());
        }
        tree.link_failures();
        tree
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Whether any keyword occurs anywhere in `text`
    pub fn contains(&self, text: &str) -> bool {
        let mut state = ROOT;
        for c in text.chars() {
            state = self.step(state, c);
            if !self.nodes[state].outputs.is_empty() {
                return true;
            }
        }
        false
    }

    /// Whether `text` starts with one of the keywords
    pub fn contains_that_start(&self, text: &str) -> bool {
        let mut state = ROOT;
        for c in text.chars() {
            match self.nodes[state].transitions.get(&c) {
                Some(&next) => state = next,
                None => return false,
            }
            if self.nodes[state].keyword.is_some() {
                return true;
            }
        }
        false
    }

    /// Every keyword occurrence in `text`, in the order their last character
    /// is reached
    pub fn find_all<'a>(&'a self, text: &'a str) -> FindAll<'a> {
        FindAll {
            tree: self,
            chars: text.chars(),
            state: ROOT,
            pending: Default::default(),
        }
    }

    fn insert(&mut self, keyword: &str) {
        if keyword.is_empty() {
            return;
        }
        let mut state = ROOT;
        for c in keyword.chars() {
            state = match self.nodes[state].transitions.get(&c) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[state].transitions.insert(c, next);
                    next
                }
            };
        }

        let node = &mut self.nodes[state];
        if node.keyword.is_none() {
            let id = self.keywords.len();
            self.keywords.push(keyword.to_string());
            node.keyword = Some(id);
            node.outputs.push(id);
        }
    }

    /// Breadth-first so every failure target is complete before it is used.
    fn link_failures(&mut self) {
        let mut queue: VecDeque<usize> = self.nodes[ROOT].transitions.values().copied().collect();
        for &child in &queue {
            self.nodes[child].failure = ROOT;
        }

        while let Some(parent) = queue.pop_front() {
            let edges: Vec<(char, usize)> = self.nodes[parent]
                .transitions
                .iter()
                .map(|(&c, &child)| (c, child))
                .collect();

            for (c, child) in edges {
                let mut candidate = self.nodes[parent].failure;
                let target = loop {
                    if let Some(&next) = self.nodes[candidate].transitions.get(&c) {
                        break next;
                    }
                    if candidate == ROOT {
                        break ROOT;
                    }
                    candidate = self.nodes[candidate].failure;
                };

                self.nodes[child].failure = target;
                let inherited = self.nodes[target].outputs.clone();
                self.nodes[child].outputs.extend(inherited);
                queue.push_back(child);
            }
        }
    }

    fn step(&self, mut state: usize, c: char) -> usize {
        loop {
            if let Some(&next) = self.nodes[state].transitions.get(&c) {
                return next;
            }
            if state == ROOT {
                return ROOT;
            }
            state = self.nodes[state].failure;
        }
    }
}

/// Lazy iterator returned by [`AhoCorasickTree::find_all`]
#[derive(Debug, Clone)]
pub struct FindAll<'a> {
    tree: &'a AhoCorasickTree,
    chars: Chars<'a>,
    state: usize,
    pending: std::slice::Iter<'a, usize>,
}

impl<'a> Iterator for FindAll<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(&id) = self.pending.next() {
                return Some(self.tree.keywords[id].as_str());
            }
            let c = self.chars.next()?;
            self.state = self.tree.step(self.state, c);
            self.pending = self.tree.nodes[self.state].outputs.iter();
        }
    }
}

impl FusedIterator for FindAll<'_> {}

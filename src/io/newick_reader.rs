use crate::trees::{PhylogeneticTree, TaxonSet};
use anyhow::{anyhow, Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::io::Read;

lazy_static! {
    static ref TAXON_LABEL_PATTERN: Regex = Regex::new(r"^[_A-Za-z][-_.A-Za-z\d]*$").unwrap();
    static ref BRANCH_LENGTH_PATTERN: Regex =
        Regex::new(r"^-?\d+(\.\d+)?([eE][-+]?\d+)?$").unwrap();
}

/// The type of callback functions to call when warnings are raised while
/// parsing a tree file. The first argument is the index of the tree being
/// read.
pub type WarningHandler = Box<dyn Fn(usize, String)>;

/// A reader for the Newick tree format.
///
/// This object reads any number of semicolon-terminated rooted binary trees,
/// e.g. `((a,b),c); (a,(b,c));`. Branch lengths and internal node labels are
/// accepted but ignored (a warning is raised for each tree carrying them).
///
/// The first tree fixes the taxon set; every following tree must be built on
/// exactly the same taxa, else the read fails. All trees must be strictly
/// binary.
///
/// # Example
///
/// ```
/// # use phylocnf::io::NewickReader;
/// let mut input = "((a,b),c);".as_bytes();
/// let (taxa, trees) = NewickReader::default().read(&mut input).unwrap();
/// assert_eq!(3, taxa.len());
/// assert_eq!(1, trees.len());
/// ```
#[derive(Default)]
pub struct NewickReader {
    warning_handlers: Vec<WarningHandler>,
}

enum RawTree {
    Leaf(String),
    Internal(Vec<RawTree>),
}

struct ByteCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.bytes.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn expect(&mut self, expected: u8) -> Result<()> {
        match self.peek() {
            Some(b) if b == expected => {
                self.advance();
                Ok(())
            }
            Some(b) => Err(anyhow!(
                r#"expected "{}" but found "{}" at byte {}"#,
                expected as char,
                b as char,
                self.pos
            )),
            None => Err(anyhow!(
                r#"expected "{}" but found the end of the input"#,
                expected as char
            )),
        }
    }

    // reads until a Newick delimiter or whitespace
    fn take_word(&mut self) -> &'a str {
        self.skip_whitespace();
        let start = self.pos;
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b.is_ascii_whitespace() || b"(),:;".contains(&b) {
                break;
            }
            self.pos += 1;
        }
        std::str::from_utf8(&self.bytes[start..self.pos]).unwrap_or("")
    }
}

struct TreeWarnings {
    branch_lengths: bool,
    internal_labels: bool,
}

impl NewickReader {
    /// Reads the taxon set and the trees of a Newick stream.
    ///
    /// In case warnings are raised, the callback functions registered by
    /// [add_warning_handler](Self::add_warning_handler) are triggered.
    pub fn read(&self, reader: &mut dyn Read) -> Result<(TaxonSet<String>, Vec<PhylogeneticTree>)> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .context("while reading the tree file")?;
        let mut cursor = ByteCursor::new(content.as_bytes());
        let mut taxa = TaxonSet::default();
        let mut trees = Vec::new();
        while cursor.peek().is_some() {
            let tree_index = trees.len();
            let context = || format!("while reading tree with index {}", tree_index);
            let mut warnings = TreeWarnings {
                branch_lengths: false,
                internal_labels: false,
            };
            let raw = self
                .parse_subtree(&mut cursor, &mut warnings)
                .with_context(context)?;
            cursor.expect(b';').with_context(context)?;
            self.emit_warnings(tree_index, &warnings);
            let tree = raw_to_tree(&raw, tree_index, &mut taxa).with_context(context)?;
            trees.push(tree);
        }
        if trees.is_empty() {
            return Err(anyhow!("no tree found in the input"));
        }
        Ok((taxa, trees))
    }

    /// Adds a callback function to call when warnings are raised while
    /// parsing a tree file.
    pub fn add_warning_handler(&mut self, h: WarningHandler) {
        self.warning_handlers.push(h);
    }

    fn emit_warnings(&self, tree_index: usize, warnings: &TreeWarnings) {
        let mut emit = |msg: &str| {
            self.warning_handlers
                .iter()
                .for_each(|h| (h)(tree_index, msg.to_string()));
        };
        if warnings.branch_lengths {
            emit("branch lengths are ignored");
        }
        if warnings.internal_labels {
            emit("internal node labels are ignored");
        }
    }

    fn parse_subtree(&self, cursor: &mut ByteCursor, warnings: &mut TreeWarnings) -> Result<RawTree> {
        let raw = match cursor.peek() {
            Some(b'(') => {
                cursor.advance();
                let mut children = vec![self.parse_subtree(cursor, warnings)?];
                while cursor.peek() == Some(b',') {
                    cursor.advance();
                    children.push(self.parse_subtree(cursor, warnings)?);
                }
                cursor.expect(b')')?;
                if let Some(b) = cursor.peek() {
                    if !b"(),:;".contains(&b) {
                        cursor.take_word();
                        warnings.internal_labels = true;
                    }
                }
                RawTree::Internal(children)
            }
            Some(_) => {
                let label = cursor.take_word();
                if !TAXON_LABEL_PATTERN.is_match(label) {
                    return Err(anyhow!(r#"invalid taxon label "{}""#, label));
                }
                RawTree::Leaf(label.to_string())
            }
            None => return Err(anyhow!("unexpected end of input in a tree")),
        };
        if cursor.peek() == Some(b':') {
            cursor.advance();
            let length = cursor.take_word();
            if !BRANCH_LENGTH_PATTERN.is_match(length) {
                return Err(anyhow!(r#"invalid branch length "{}""#, length));
            }
            warnings.branch_lengths = true;
        }
        Ok(raw)
    }
}

fn raw_to_tree(
    raw: &RawTree,
    tree_index: usize,
    taxa: &mut TaxonSet<String>,
) -> Result<PhylogeneticTree> {
    let mut labels = Vec::new();
    collect_leaf_labels(raw, &mut labels);
    if tree_index == 0 {
        labels.iter().for_each(|l| {
            taxa.new_taxon(l.to_string());
        });
        if taxa.len() != labels.len() {
            return Err(anyhow!("a taxon appears on more than one leaf"));
        }
    } else if labels.len() != taxa.len() {
        return Err(anyhow!(
            "the tree has {} taxa while the first tree has {}",
            labels.len(),
            taxa.len()
        ));
    }
    let n_taxa = taxa.len();
    let mut parents = vec![None; 2 * n_taxa - 1];
    let mut seen = vec![false; n_taxa];
    let mut next_internal = n_taxa;
    link_nodes(raw, taxa, &mut parents, &mut seen, &mut next_internal)?;
    PhylogeneticTree::new_with_parent_links(n_taxa, parents)
}

fn collect_leaf_labels<'a>(raw: &'a RawTree, labels: &mut Vec<&'a str>) {
    match raw {
        RawTree::Leaf(label) => labels.push(label),
        RawTree::Internal(children) => {
            children.iter().for_each(|c| collect_leaf_labels(c, labels))
        }
    }
}

// assigns leaf ids from the taxon set and internal ids in post order, so
// that the root always gets the highest id
fn link_nodes(
    raw: &RawTree,
    taxa: &TaxonSet<String>,
    parents: &mut Vec<Option<usize>>,
    seen: &mut [bool],
    next_internal: &mut usize,
) -> Result<usize> {
    match raw {
        RawTree::Leaf(label) => {
            let id = taxa.get_taxon(label)?.id();
            if seen[id] {
                return Err(anyhow!(r#"taxon "{}" appears on more than one leaf"#, label));
            }
            seen[id] = true;
            Ok(id)
        }
        RawTree::Internal(children) => {
            if children.len() != 2 {
                return Err(anyhow!(
                    "an internal node has {} children; trees must be binary",
                    children.len()
                ));
            }
            let child_ids = children
                .iter()
                .map(|c| link_nodes(c, taxa, parents, seen, next_internal))
                .collect::<Result<Vec<usize>>>()?;
            let id = *next_internal;
            *next_internal += 1;
            if id >= parents.len() {
                return Err(anyhow!("too many internal nodes for the taxon count"));
            }
            child_ids.iter().for_each(|c| parents[*c] = Some(id));
            Ok(id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    fn read_str(s: &str) -> Result<(TaxonSet<String>, Vec<PhylogeneticTree>)> {
        NewickReader::default().read(&mut s.as_bytes())
    }

    #[test]
    fn test_read_single_tree() {
        let (taxa, trees) = read_str("((a,b),c);").unwrap();
        assert_eq!(3, taxa.len());
        assert_eq!(0, taxa.get_taxon(&"a".to_string()).unwrap().id());
        assert_eq!(2, taxa.get_taxon(&"c".to_string()).unwrap().id());
        assert_eq!(1, trees.len());
        let t = &trees[0];
        assert_eq!(5, t.node_count());
        assert_eq!(Some(3), t.parent(0));
        assert_eq!(Some(3), t.parent(1));
        assert_eq!(Some(4), t.parent(2));
        assert_eq!(Some(4), t.parent(3));
        assert_eq!(None, t.parent(4));
    }

    #[test]
    fn test_read_multiple_trees() {
        let (taxa, trees) = read_str("((a,b),c);\n(a,(b,c));\n").unwrap();
        assert_eq!(3, taxa.len());
        assert_eq!(2, trees.len());
        // in the second tree the cherry holds taxa 1 and 2
        assert_eq!(&[1, 2], trees[1].taxa_in_subtree(3));
    }

    #[test]
    fn test_nested_tree() {
        let (taxa, trees) = read_str("(((a,b),(c,d)),e);").unwrap();
        assert_eq!(5, taxa.len());
        assert_eq!(9, trees[0].node_count());
        assert_eq!(8, trees[0].root());
        assert_eq!(&[0, 1, 2, 3], trees[0].taxa_in_subtree(7));
    }

    #[test]
    fn test_branch_lengths_ignored_with_warning() {
        let warnings = Rc::new(RefCell::new(vec![]));
        let warnings_clone = Rc::clone(&warnings);
        let mut reader = NewickReader::default();
        reader.add_warning_handler(Box::new(move |i, w| {
            warnings_clone.borrow_mut().push((i, w))
        }));
        let (_, trees) = reader
            .read(&mut "((a:1.5,b:0.2):3,c:1e-2);".as_bytes())
            .unwrap();
        assert_eq!(1, trees.len());
        assert_eq!(
            vec![(0, "branch lengths are ignored".to_string())],
            warnings.borrow().clone()
        );
    }

    #[test]
    fn test_internal_labels_ignored_with_warning() {
        let warnings = Rc::new(RefCell::new(vec![]));
        let warnings_clone = Rc::clone(&warnings);
        let mut reader = NewickReader::default();
        reader.add_warning_handler(Box::new(move |i, w| {
            warnings_clone.borrow_mut().push((i, w))
        }));
        reader
            .read(&mut "((a,b)cherry,c)root;".as_bytes())
            .unwrap();
        assert_eq!(
            vec![(0, "internal node labels are ignored".to_string())],
            warnings.borrow().clone()
        );
    }

    #[test]
    fn test_read_empty() {
        assert!(read_str("").is_err());
        assert!(read_str("  \n ").is_err());
    }

    #[test]
    fn test_non_binary_tree() {
        assert!(read_str("(a,b,c);").is_err());
    }

    #[test]
    fn test_single_leaf_tree() {
        assert!(read_str("a;").is_err());
    }

    #[test]
    fn test_missing_semicolon() {
        assert!(read_str("((a,b),c)").is_err());
    }

    #[test]
    fn test_unbalanced_parenthesis() {
        assert!(read_str("((a,b,(c);").is_err());
    }

    #[test]
    fn test_invalid_label() {
        assert!(read_str("((a,1?),c);").is_err());
    }

    #[test]
    fn test_invalid_branch_length() {
        assert!(read_str("((a:x,b),c);").is_err());
    }

    #[test]
    fn test_duplicated_taxon() {
        assert!(read_str("((a,a),c);").is_err());
    }

    #[test]
    fn test_second_tree_with_unknown_taxon() {
        assert!(read_str("((a,b),c);((a,b),d);").is_err());
    }

    #[test]
    fn test_second_tree_with_fewer_taxa() {
        assert!(read_str("((a,b),c);(a,b);").is_err());
    }

    #[test]
    fn test_second_tree_with_duplicated_taxon() {
        assert!(read_str("((a,b),c);((a,a),c);").is_err());
    }
}

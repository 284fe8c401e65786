//! Adaptive Huffman coding tree.
//!
//! The LZH streams carry no code table. Encoder and decoder instead
//! build the identical tree: both sides start from a balanced tree with
//! every symbol count at 1 and rebalance after every decoded symbol, so
//! the codes track the observed symbol distribution in lockstep.
//!
//! The tree is stored as flat arenas. Leaves occupy the low indices,
//! internal nodes the high ones, the root is always the last node, and
//! siblings are always adjacent (right child = left child + 1). The
//! rebalancing in [`HuffmanTree::update_count`] preserves the classic
//! sibling property: scanning the arena left to right, counts never
//! decrease, and every parent sits at a higher index than its children.

/// Number of coded symbols in an LZH stream: 256 literal bytes plus 58
/// run-length codes (lengths 3 through 60).
pub const LZH_SYMBOLS: usize = 314;

/// A coded symbol: `0..256` are literal bytes, `256..314` are run
/// lengths (`symbol - 253`).
pub type Symbol = u16;

/// Index of a node within the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// The raw arena position.
    pub fn get(self) -> usize {
        self.0
    }
}

/// What a node points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeContent {
    /// Internal node; holds the left child. The right child is always
    /// the next arena slot.
    Children(NodeIndex),
    /// Terminal node holding a symbol.
    Leaf(Symbol),
}

#[derive(Debug, Clone, Copy)]
struct TreeNode {
    count: u32,
    content: NodeContent,
}

/// An adaptive Huffman tree over a fixed symbol alphabet.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    /// Leaves first, then internal nodes, root last.
    nodes: Vec<TreeNode>,
    /// Node index to parent index. The root's entry is itself.
    parent: Vec<NodeIndex>,
    /// Symbol to the leaf currently holding it.
    leaf_of: Vec<NodeIndex>,
}

impl HuffmanTree {
    /// Build the balanced starting tree with every symbol count at 1.
    pub fn new(symbol_count: usize) -> Self {
        assert!(symbol_count >= 2, "tree needs at least two symbols");
        let node_count = symbol_count * 2 - 1;

        let mut nodes = Vec::with_capacity(node_count);
        let mut parent = vec![NodeIndex(0); node_count];
        let mut leaf_of = Vec::with_capacity(symbol_count);

        for symbol in 0..symbol_count {
            nodes.push(TreeNode {
                count: 1,
                content: NodeContent::Leaf(symbol as Symbol),
            });
            leaf_of.push(NodeIndex(symbol));
        }

        // Internal node j owns the adjacent pair starting at 2*(j - n).
        // Pairing left to right keeps counts non-decreasing from the start.
        for node in symbol_count..node_count {
            let left = 2 * (node - symbol_count);
            nodes.push(TreeNode {
                count: nodes[left].count + nodes[left + 1].count,
                content: NodeContent::Children(NodeIndex(left)),
            });
            parent[left] = NodeIndex(node);
            parent[left + 1] = NodeIndex(node);
        }
        parent[node_count - 1] = NodeIndex(node_count - 1);

        Self {
            nodes,
            parent,
            leaf_of,
        }
    }

    /// The tree sized for LZH streams (314 symbols).
    pub fn lzh() -> Self {
        Self::new(LZH_SYMBOLS)
    }

    /// Number of symbols in the alphabet.
    pub fn symbol_count(&self) -> usize {
        self.leaf_of.len()
    }

    /// The root node.
    pub fn root(&self) -> NodeIndex {
        NodeIndex(self.nodes.len() - 1)
    }

    /// Whether the node is a leaf.
    pub fn is_leaf(&self, node: NodeIndex) -> bool {
        matches!(self.nodes[node.0].content, NodeContent::Leaf(_))
    }

    /// Descend one level: the left child for a 0 bit, the right for a 1.
    ///
    /// # Panics
    ///
    /// Panics if `node` is a leaf (logic error in the caller's walk).
    pub fn child(&self, node: NodeIndex, go_right: bool) -> NodeIndex {
        match self.nodes[node.0].content {
            NodeContent::Children(left) => NodeIndex(left.0 + go_right as usize),
            NodeContent::Leaf(_) => panic!("child() on a terminal node"),
        }
    }

    /// The symbol held by a leaf.
    ///
    /// # Panics
    ///
    /// Panics if `node` is an internal node.
    pub fn symbol_of(&self, node: NodeIndex) -> Symbol {
        match self.nodes[node.0].content {
            NodeContent::Leaf(symbol) => symbol,
            NodeContent::Children(_) => panic!("symbol_of() on an internal node"),
        }
    }

    /// Record one more occurrence of `symbol` and rebalance.
    ///
    /// Walks from the symbol's leaf to the root. At each level the node's
    /// count is incremented; if that breaks the left-to-right ordering,
    /// the node is swapped with the rightmost node whose count is still
    /// below the new value (the leader of its count block), which
    /// restores the sibling property in O(1) structural work per level.
    pub fn update_count(&mut self, symbol: Symbol) {
        let root = self.root().0;
        let mut current = self.leaf_of[symbol as usize].0;

        loop {
            self.nodes[current].count += 1;
            if current == root {
                break;
            }
            let updated = self.nodes[current].count;

            if self.nodes[current + 1].count < updated {
                let mut leader = current + 1;
                while leader + 1 < self.nodes.len() && self.nodes[leader + 1].count < updated {
                    leader += 1;
                }
                self.swap_nodes(current, leader);
                current = leader;
            }

            current = self.parent[current].0;
        }
    }

    /// Exchange two arena slots, repairing the links of whatever each
    /// slot now holds. Parent links of the slots themselves stay put:
    /// positions keep their place in the tree shape, only the contents
    /// (and therefore the subtrees hanging off them) move.
    fn swap_nodes(&mut self, a: usize, b: usize) {
        self.nodes.swap(a, b);
        self.relink(a);
        self.relink(b);
    }

    fn relink(&mut self, node: usize) {
        match self.nodes[node].content {
            NodeContent::Children(left) => {
                self.parent[left.0] = NodeIndex(node);
                self.parent[left.0 + 1] = NodeIndex(node);
            }
            NodeContent::Leaf(symbol) => {
                self.leaf_of[symbol as usize] = NodeIndex(node);
            }
        }
    }

    /// The current code for `symbol`, as branch bits collected from the
    /// leaf up to the root.
    ///
    /// Bit 0 of the returned value is the branch taken at the leaf's own
    /// parent; an encoder emits the bits from position `len - 1` down to
    /// 0 to produce the root-to-leaf path the decoder walks.
    pub fn encoded_path(&self, symbol: Symbol) -> (u32, u8) {
        let root = self.root().0;
        let mut bits = 0u32;
        let mut len = 0u8;
        let mut node = self.leaf_of[symbol as usize].0;

        while node != root {
            let up = self.parent[node].0;
            let went_right = match self.nodes[up].content {
                NodeContent::Children(left) => node == left.0 + 1,
                NodeContent::Leaf(_) => unreachable!("leaf recorded as a parent"),
            };
            bits |= (went_right as u32) << len;
            len += 1;
            node = up;
        }
        (bits, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Left-to-right counts non-decreasing, parents above children,
    /// every parent's count the sum of its children's.
    fn assert_sibling_property(tree: &HuffmanTree) {
        for i in 0..tree.nodes.len() - 1 {
            assert!(
                tree.nodes[i].count <= tree.nodes[i + 1].count,
                "count order broken between {} and {}",
                i,
                i + 1
            );
        }
        for (i, node) in tree.nodes.iter().enumerate() {
            if let NodeContent::Children(left) = node.content {
                assert!(left.0 + 1 < i, "parent {} not above children", i);
                assert_eq!(
                    node.count,
                    tree.nodes[left.0].count + tree.nodes[left.0 + 1].count,
                    "parent {} count is not the sum of its children",
                    i
                );
                assert_eq!(tree.parent[left.0].0, i);
                assert_eq!(tree.parent[left.0 + 1].0, i);
            }
        }
    }

    #[test]
    fn test_initial_tree_shape() {
        let tree = HuffmanTree::lzh();
        assert_eq!(tree.symbol_count(), 314);
        assert_eq!(tree.root().get(), 314 * 2 - 2);
        assert_eq!(tree.nodes[tree.root().get()].count, 314);
        assert_sibling_property(&tree);

        // Every symbol starts on its own leaf.
        for symbol in 0..314u16 {
            let leaf = tree.leaf_of[symbol as usize];
            assert!(tree.is_leaf(leaf));
            assert_eq!(tree.symbol_of(leaf), symbol);
        }
    }

    #[test]
    fn test_update_preserves_sibling_property() {
        let mut tree = HuffmanTree::lzh();
        // A skewed drip of updates forces plenty of block-leader swaps.
        for round in 0..200u32 {
            let symbol = (round * round % 7) as Symbol;
            tree.update_count(symbol);
            assert_sibling_property(&tree);
        }
        tree.update_count(300);
        tree.update_count(300);
        assert_sibling_property(&tree);
    }

    #[test]
    fn test_hot_symbol_code_shortens() {
        let mut tree = HuffmanTree::lzh();
        let (_, cold_len) = tree.encoded_path(65);
        for _ in 0..500 {
            tree.update_count(65);
        }
        let (_, hot_len) = tree.encoded_path(65);
        assert!(
            hot_len < cold_len,
            "a frequent symbol must earn a shorter code ({} -> {})",
            cold_len,
            hot_len
        );
        // Root count tracks total updates plus the initial weight.
        assert_eq!(tree.nodes[tree.root().get()].count, 314 + 500);
    }

    #[test]
    fn test_encoded_path_round_trips_through_walk() {
        let mut tree = HuffmanTree::lzh();
        for &symbol in &[0u16, 17, 255, 256, 313] {
            tree.update_count(symbol);
        }

        for &symbol in &[0u16, 17, 255, 256, 313, 100] {
            let (bits, len) = tree.encoded_path(symbol);
            let mut node = tree.root();
            for i in (0..len).rev() {
                let go_right = bits >> i & 1 == 1;
                node = tree.child(node, go_right);
            }
            assert!(tree.is_leaf(node));
            assert_eq!(tree.symbol_of(node), symbol);
        }
    }

    #[test]
    #[should_panic(expected = "terminal node")]
    fn test_child_of_leaf_panics() {
        let tree = HuffmanTree::new(4);
        let leaf = tree.leaf_of[0];
        let _ = tree.child(leaf, false);
    }

    #[test]
    #[should_panic(expected = "internal node")]
    fn test_symbol_of_internal_panics() {
        let tree = HuffmanTree::new(4);
        let _ = tree.symbol_of(tree.root());
    }
}
